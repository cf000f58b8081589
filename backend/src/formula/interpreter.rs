// Formula DSL - Sandboxed Interpreter
//
// Tree-walking evaluation of a formula AST against variable bindings.
// The only operations available are the ones matched below; there is no
// path from a formula to host code.
//
// Division and remainder by zero follow IEEE-754 (inf / NaN). Detecting
// non-finite results is the caller's job.

use crate::formula::context::Bindings;
use crate::formula::parser::MAX_FORMULA_LENGTH;
use crate::formula::types::{is_allowed_variable, BinaryOp, Expr, Function, UnaryOp};
use thiserror::Error;

/// Errors that can occur during formula evaluation
#[derive(Debug, Error, PartialEq)]
pub enum EvalError {
    #[error("Variable '{0}' is not allowed in formulas")]
    VariableNotAllowed(String),

    #[error("Variable '{0}' has no value")]
    UnboundVariable(String),

    #[error("Call to '{0}' is not allowed")]
    DisallowedCall(String),

    #[error("Function '{name}' expects {expected} argument(s), found {found}")]
    WrongArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Formula evaluation exceeded maximum depth ({0})")]
    MaxDepthExceeded(usize),
}

/// Recursion bound for hand-built trees
///
/// Parsed trees can never reach it: every level of a parsed tree consumes
/// at least one input character.
const MAX_EVAL_DEPTH: usize = MAX_FORMULA_LENGTH;

/// Evaluate a formula AST
///
/// # Arguments
///
/// * `expr` - Parsed (or hand-built) formula
/// * `bindings` - Values for the variables the formula references
///
/// # Returns
///
/// Ok(f64) on success, which may be non-finite; Err otherwise
///
/// # Example
///
/// ```rust
/// use incentive_engine_core_rs::formula::{evaluate, parse_formula, Bindings};
/// use incentive_engine_core_rs::models::SalesData;
///
/// let ast = parse_formula("personalSales > 5000000 ? 1 : 0").unwrap();
/// let bindings = Bindings::from_sales(&SalesData::new(8_000_000.0, 0.0));
/// assert_eq!(evaluate(&ast, &bindings).unwrap(), 1.0);
/// ```
pub fn evaluate(expr: &Expr, bindings: &Bindings) -> Result<f64, EvalError> {
    eval_node(expr, bindings, 0)
}

fn eval_node(expr: &Expr, bindings: &Bindings, depth: usize) -> Result<f64, EvalError> {
    if depth >= MAX_EVAL_DEPTH {
        return Err(EvalError::MaxDepthExceeded(MAX_EVAL_DEPTH));
    }
    let next = depth + 1;

    match expr {
        Expr::Literal { value } => Ok(*value),

        Expr::Variable { name } => {
            // Hand-built trees can name anything; parsed trees cannot
            if !is_allowed_variable(name) {
                return Err(EvalError::VariableNotAllowed(name.clone()));
            }
            bindings
                .get(name)
                .ok_or_else(|| EvalError::UnboundVariable(name.clone()))
        }

        Expr::BinaryOp { op, left, right } => {
            let left_val = eval_node(left, bindings, next)?;
            let right_val = eval_node(right, bindings, next)?;
            Ok(apply_binary(*op, left_val, right_val))
        }

        Expr::UnaryOp { op, expr } => {
            let val = eval_node(expr, bindings, next)?;
            match op {
                UnaryOp::Negate => Ok(-val),
            }
        }

        Expr::Ternary {
            condition,
            then_expr,
            else_expr,
        } => {
            // Only the selected branch is evaluated
            if is_truthy(eval_node(condition, bindings, next)?) {
                eval_node(then_expr, bindings, next)
            } else {
                eval_node(else_expr, bindings, next)
            }
        }

        Expr::Call { name, args } => {
            let function =
                Function::from_name(name).ok_or_else(|| EvalError::DisallowedCall(name.clone()))?;
            if args.len() != function.arity() {
                return Err(EvalError::WrongArgumentCount {
                    name: name.clone(),
                    expected: function.arity(),
                    found: args.len(),
                });
            }

            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(eval_node(arg, bindings, next)?);
            }

            Ok(match function {
                Function::Max => nan_aware_max(values[0], values[1]),
                Function::Min => nan_aware_min(values[0], values[1]),
                Function::Round => round_half_up(values[0]),
            })
        }
    }
}

fn apply_binary(op: BinaryOp, left: f64, right: f64) -> f64 {
    match op {
        BinaryOp::Add => left + right,
        BinaryOp::Subtract => left - right,
        BinaryOp::Multiply => left * right,
        BinaryOp::Divide => left / right,
        BinaryOp::Remainder => left % right,
        BinaryOp::GreaterThan => bool_to_f64(left > right),
        BinaryOp::LessThan => bool_to_f64(left < right),
        BinaryOp::GreaterOrEqual => bool_to_f64(left >= right),
        BinaryOp::LessOrEqual => bool_to_f64(left <= right),
        BinaryOp::Equal => bool_to_f64(left == right),
        BinaryOp::NotEqual => bool_to_f64(left != right),
    }
}

fn bool_to_f64(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

/// Non-zero and not NaN
fn is_truthy(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

/// Max that propagates NaN (`f64::max` would drop it)
fn nan_aware_max(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.max(b)
    }
}

fn nan_aware_min(a: f64, b: f64) -> f64 {
    if a.is_nan() || b.is_nan() {
        f64::NAN
    } else {
        a.min(b)
    }
}

/// Round to nearest integer, halves toward +infinity (2.5 → 3, -2.5 → -2)
fn round_half_up(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let floor = value.floor();
    if value - floor >= 0.5 {
        floor + 1.0
    } else {
        floor
    }
}
