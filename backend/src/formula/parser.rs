// Formula DSL - Recursive-Descent Parser
//
// Grammar (standard precedence, left-associative unless noted):
//
//   ternary        := comparison ('?' ternary ':' ternary)?     right-assoc
//   comparison     := additive (('>'|'<'|'>='|'<='|'=='|'!=') additive)*
//   additive       := multiplicative (('+'|'-') multiplicative)*
//   multiplicative := unary (('*'|'/'|'%') unary)*
//   unary          := '-'? primary
//   primary        := number | variable | call | '(' ternary ')'
//   call           := ('Math.max'|'Math.min') '(' ternary ',' ternary ')'
//                   | 'Math.round' '(' ternary ')'
//
// Length and nesting caps are checked before any token is produced.

use crate::formula::lexer::{tokenize, Token, TokenKind};
use crate::formula::types::{is_allowed_variable, BinaryOp, Expr, Function};
use serde::Serialize;
use thiserror::Error;

/// Maximum formula length in characters
pub const MAX_FORMULA_LENGTH: usize = 2000;

/// Maximum nesting depth
///
/// Parentheses, function calls and ternaries draw on one shared budget, so
/// `(`*50 around a ternary is too deep while `(`*49 around `Math.max(1, 2)`
/// is not.
pub const MAX_NESTING_DEPTH: usize = 50;

/// What went wrong while tokenizing or parsing
#[derive(Debug, Clone, Error, PartialEq, Serialize)]
pub enum ParseErrorKind {
    #[error("Formula is empty")]
    Empty,

    #[error("Formula length {actual} exceeds maximum {max}")]
    TooLong { actual: usize, max: usize },

    #[error("Nesting depth exceeds maximum {max}")]
    TooDeep { max: usize },

    #[error("Unexpected character '{0}'")]
    UnexpectedChar(char),

    #[error("String literals are not allowed")]
    StringLiteral,

    #[error("Invalid number '{0}'")]
    InvalidNumber(String),

    #[error("Unknown identifier '{0}'")]
    UnknownIdentifier(String),

    #[error("Function '{0}' is not allowed")]
    UnknownFunction(String),

    #[error("Function '{name}' must be called with parentheses")]
    FunctionNotCalled { name: String },

    #[error("Function '{name}' expects {expected} argument(s), found {found}")]
    WrongArgumentCount {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Unexpected {found}, expected {expected}")]
    UnexpectedToken { found: String, expected: String },

    #[error("Unexpected end of formula, expected {0}")]
    UnexpectedEnd(String),

    #[error("Unexpected trailing {0}")]
    TrailingInput(String),
}

/// Syntax error with the character position where it was detected
#[derive(Debug, Clone, Error, PartialEq, Serialize)]
#[error("{kind} at position {position}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: usize,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, position: usize) -> Self {
        Self { kind, position }
    }

    /// Human-readable message without the position
    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

/// Parse formula text into an AST
///
/// # Example
///
/// ```rust
/// use incentive_engine_core_rs::formula::{parse_formula, Expr};
///
/// let ast = parse_formula("personalSales * 0.05").unwrap();
/// assert!(matches!(ast, Expr::BinaryOp { .. }));
///
/// let err = parse_formula("personalSales + process.exit(1)").unwrap_err();
/// assert_eq!(err.position, 16);
/// ```
pub fn parse_formula(text: &str) -> Result<Expr, ParseError> {
    check_limits(text)?;

    let tokens = tokenize(text)?;
    let end_position = text.chars().count();
    let mut parser = Parser {
        tokens,
        cursor: 0,
        depth: 0,
        end_position,
    };

    let expr = parser.ternary()?;
    if let Some(token) = parser.peek() {
        return Err(ParseError::new(
            ParseErrorKind::TrailingInput(token.kind.to_string()),
            token.position,
        ));
    }
    Ok(expr)
}

/// Fast rejection of empty, oversized or over-nested input
fn check_limits(text: &str) -> Result<(), ParseError> {
    let length = text.chars().count();
    if length > MAX_FORMULA_LENGTH {
        return Err(ParseError::new(
            ParseErrorKind::TooLong {
                actual: length,
                max: MAX_FORMULA_LENGTH,
            },
            MAX_FORMULA_LENGTH,
        ));
    }
    if text.trim().is_empty() {
        return Err(ParseError::new(ParseErrorKind::Empty, 0));
    }

    let mut depth = 0usize;
    for (position, c) in text.chars().enumerate() {
        match c {
            '(' => {
                depth += 1;
                if depth > MAX_NESTING_DEPTH {
                    return Err(ParseError::new(
                        ParseErrorKind::TooDeep {
                            max: MAX_NESTING_DEPTH,
                        },
                        position,
                    ));
                }
            }
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
    /// Current recursion nesting (parens, calls, ternary branches)
    depth: usize,
    /// Character length of the input, reported for end-of-input errors
    end_position: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.cursor)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.cursor).cloned();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek().is_some_and(|t| &t.kind == kind)
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        match self.advance() {
            Some(token) if token.kind == kind => Ok(token),
            Some(token) => Err(ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    found: token.kind.to_string(),
                    expected: kind.to_string(),
                },
                token.position,
            )),
            None => Err(ParseError::new(
                ParseErrorKind::UnexpectedEnd(kind.to_string()),
                self.end_position,
            )),
        }
    }

    fn enter(&mut self, position: usize) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ParseError::new(
                ParseErrorKind::TooDeep {
                    max: MAX_NESTING_DEPTH,
                },
                position,
            ));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn current_position(&self) -> usize {
        self.peek().map_or(self.end_position, |t| t.position)
    }

    // ------------------------------------------------------------------------
    // Grammar rules
    // ------------------------------------------------------------------------

    fn ternary(&mut self) -> Result<Expr, ParseError> {
        let condition = self.comparison()?;
        if !self.check(&TokenKind::Question) {
            return Ok(condition);
        }
        let question = self.advance().map_or(self.end_position, |t| t.position);

        self.enter(question)?;
        let then_expr = self.ternary()?;
        self.expect(TokenKind::Colon)?;
        let else_expr = self.ternary()?;
        self.leave();

        Ok(Expr::ternary(condition, then_expr, else_expr))
    }

    fn comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.additive()?;
        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Greater) => BinaryOp::GreaterThan,
                Some(TokenKind::Less) => BinaryOp::LessThan,
                Some(TokenKind::GreaterEqual) => BinaryOp::GreaterOrEqual,
                Some(TokenKind::LessEqual) => BinaryOp::LessOrEqual,
                Some(TokenKind::EqualEqual) => BinaryOp::Equal,
                Some(TokenKind::NotEqual) => BinaryOp::NotEqual,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.additive()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.multiplicative()?;
        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Plus) => BinaryOp::Add,
                Some(TokenKind::Minus) => BinaryOp::Subtract,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.multiplicative()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;
        loop {
            let op = match self.peek().map(|t| &t.kind) {
                Some(TokenKind::Star) => BinaryOp::Multiply,
                Some(TokenKind::Slash) => BinaryOp::Divide,
                Some(TokenKind::Percent) => BinaryOp::Remainder,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.unary()?;
            left = Expr::binary(op, left, right);
        }
    }

    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Minus) {
            self.advance();
            let operand = self.primary()?;
            return Ok(Expr::negate(operand));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = match self.advance() {
            Some(token) => token,
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedEnd("a number, variable, call or '('".to_string()),
                    self.end_position,
                ))
            }
        };

        match token.kind {
            TokenKind::Number(value) => Ok(Expr::literal(value)),

            TokenKind::LeftParen => {
                self.enter(token.position)?;
                let inner = self.ternary()?;
                self.expect(TokenKind::RightParen)?;
                self.leave();
                Ok(inner)
            }

            TokenKind::Ident(name) => {
                if is_allowed_variable(&name) {
                    return Ok(Expr::variable(name));
                }
                match Function::from_name(&name) {
                    Some(function) => self.call(function, token.position),
                    None if self.check(&TokenKind::LeftParen) => Err(ParseError::new(
                        ParseErrorKind::UnknownFunction(name),
                        token.position,
                    )),
                    None => Err(ParseError::new(
                        ParseErrorKind::UnknownIdentifier(name),
                        token.position,
                    )),
                }
            }

            other => Err(ParseError::new(
                ParseErrorKind::UnexpectedToken {
                    found: other.to_string(),
                    expected: "a number, variable, call or '('".to_string(),
                },
                token.position,
            )),
        }
    }

    fn call(&mut self, function: Function, position: usize) -> Result<Expr, ParseError> {
        if !self.check(&TokenKind::LeftParen) {
            return Err(ParseError::new(
                ParseErrorKind::FunctionNotCalled {
                    name: function.name().to_string(),
                },
                position,
            ));
        }
        self.advance();
        self.enter(position)?;

        let mut args = Vec::new();
        if !self.check(&TokenKind::RightParen) {
            args.push(self.ternary()?);
            while self.check(&TokenKind::Comma) {
                self.advance();
                args.push(self.ternary()?);
            }
        }
        let close_position = self.current_position();
        self.expect(TokenKind::RightParen)?;
        self.leave();

        if args.len() != function.arity() {
            return Err(ParseError::new(
                ParseErrorKind::WrongArgumentCount {
                    name: function.name().to_string(),
                    expected: function.arity(),
                    found: args.len(),
                },
                close_position,
            ));
        }
        Ok(Expr::call(function, args))
    }
}
