// Formula DSL - Type Definitions
//
// Tagged-variant AST for admin-authored incentive formulas.
// Trees are built by the parser, shared through the formula cache and never
// persisted.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ALLOW-LISTS
// ============================================================================

/// Variables a formula may reference
pub const ALLOWED_VARIABLES: [&str; 7] = [
    "personalSales",
    "totalSales",
    "teamSales",
    "sales",
    "baseSalary",
    "years",
    "performance",
];

/// True if `name` is on the variable allow-list
pub fn is_allowed_variable(name: &str) -> bool {
    ALLOWED_VARIABLES.contains(&name)
}

/// Functions a formula may call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    Max,
    Min,
    Round,
}

impl Function {
    /// Resolve a call name (e.g. "Math.max") against the allow-list
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Math.max" => Some(Function::Max),
            "Math.min" => Some(Function::Min),
            "Math.round" => Some(Function::Round),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::Max => "Math.max",
            Function::Min => "Math.min",
            Function::Round => "Math.round",
        }
    }

    /// Exact number of arguments the function takes
    pub fn arity(&self) -> usize {
        match self {
            Function::Max | Function::Min => 2,
            Function::Round => 1,
        }
    }
}

// ============================================================================
// OPERATORS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Subtract,
    #[serde(rename = "*")]
    Multiply,
    #[serde(rename = "/")]
    Divide,
    #[serde(rename = "%")]
    Remainder,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "==")]
    Equal,
    #[serde(rename = "!=")]
    NotEqual,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Remainder => "%",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessThan => "<",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
        }
    }

    pub fn is_comparison(&self) -> bool {
        !matches!(
            self,
            BinaryOp::Add
                | BinaryOp::Subtract
                | BinaryOp::Multiply
                | BinaryOp::Divide
                | BinaryOp::Remainder
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    #[serde(rename = "-")]
    Negate,
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

/// Formula AST node
///
/// Comparisons evaluate to 1.0 / 0.0 so every node yields a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Expr {
    Literal {
        value: f64,
    },

    Variable {
        name: String,
    },

    BinaryOp {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    UnaryOp {
        op: UnaryOp,
        expr: Box<Expr>,
    },

    Ternary {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },

    Call {
        name: String,
        args: Vec<Expr>,
    },
}

impl Expr {
    pub fn literal(value: f64) -> Self {
        Expr::Literal { value }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expr::Variable { name: name.into() }
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn negate(expr: Expr) -> Self {
        Expr::UnaryOp {
            op: UnaryOp::Negate,
            expr: Box::new(expr),
        }
    }

    pub fn ternary(condition: Expr, then_expr: Expr, else_expr: Expr) -> Self {
        Expr::Ternary {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }
    }

    pub fn call(function: Function, args: Vec<Expr>) -> Self {
        Expr::Call {
            name: function.name().to_string(),
            args,
        }
    }
}

impl fmt::Display for Expr {
    /// Fully parenthesized rendering, re-parseable by `parse_formula`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal { value } => write!(f, "{}", value),
            Expr::Variable { name } => f.write_str(name),
            Expr::BinaryOp { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::UnaryOp { expr, .. } => write!(f, "-({})", expr),
            Expr::Ternary {
                condition,
                then_expr,
                else_expr,
            } => write!(f, "({} ? {} : {})", condition, then_expr, else_expr),
            Expr::Call { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
        }
    }
}
