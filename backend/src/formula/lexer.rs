// Formula DSL - Tokenizer
//
// Splits formula text into tokens tagged with their character position.
// Anything outside the grammar's alphabet (quotes, backticks, brackets,
// braces, assignment, logical operators) is rejected here.

use crate::formula::parser::{ParseError, ParseErrorKind};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    /// Identifier, possibly dotted (e.g. "Math.max")
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    EqualEqual,
    NotEqual,
    Question,
    Colon,
    LeftParen,
    RightParen,
    Comma,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Number(n) => write!(f, "number {}", n),
            TokenKind::Ident(name) => write!(f, "identifier '{}'", name),
            TokenKind::Plus => f.write_str("'+'"),
            TokenKind::Minus => f.write_str("'-'"),
            TokenKind::Star => f.write_str("'*'"),
            TokenKind::Slash => f.write_str("'/'"),
            TokenKind::Percent => f.write_str("'%'"),
            TokenKind::Greater => f.write_str("'>'"),
            TokenKind::Less => f.write_str("'<'"),
            TokenKind::GreaterEqual => f.write_str("'>='"),
            TokenKind::LessEqual => f.write_str("'<='"),
            TokenKind::EqualEqual => f.write_str("'=='"),
            TokenKind::NotEqual => f.write_str("'!='"),
            TokenKind::Question => f.write_str("'?'"),
            TokenKind::Colon => f.write_str("':'"),
            TokenKind::LeftParen => f.write_str("'('"),
            TokenKind::RightParen => f.write_str("')'"),
            TokenKind::Comma => f.write_str("','"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Character offset of the token's first character
    pub position: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Tokenize formula text
pub fn tokenize(text: &str) -> Result<Vec<Token>, ParseError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let start = i;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit()
            || (c == '.' && chars.get(i + 1).is_some_and(|n| n.is_ascii_digit()))
        {
            let (value, end) = lex_number(&chars, i)?;
            tokens.push(Token {
                kind: TokenKind::Number(value),
                position: start,
            });
            i = end;
            continue;
        }

        if is_ident_start(c) {
            let mut end = i + 1;
            loop {
                match chars.get(end) {
                    Some(&n) if is_ident_continue(n) => end += 1,
                    // Member access only as part of a dotted name ("Math.max")
                    Some('.') if chars.get(end + 1).is_some_and(|&n| is_ident_start(n)) => {
                        end += 1
                    }
                    _ => break,
                }
            }
            let name: String = chars[i..end].iter().collect();
            tokens.push(Token {
                kind: TokenKind::Ident(name),
                position: start,
            });
            i = end;
            continue;
        }

        let next = chars.get(i + 1).copied();
        let (kind, width) = match (c, next) {
            ('>', Some('=')) => (TokenKind::GreaterEqual, 2),
            ('<', Some('=')) => (TokenKind::LessEqual, 2),
            ('=', Some('=')) => (TokenKind::EqualEqual, 2),
            ('!', Some('=')) => (TokenKind::NotEqual, 2),
            ('>', _) => (TokenKind::Greater, 1),
            ('<', _) => (TokenKind::Less, 1),
            ('+', _) => (TokenKind::Plus, 1),
            ('-', _) => (TokenKind::Minus, 1),
            ('*', _) => (TokenKind::Star, 1),
            ('/', _) => (TokenKind::Slash, 1),
            ('%', _) => (TokenKind::Percent, 1),
            ('?', _) => (TokenKind::Question, 1),
            (':', _) => (TokenKind::Colon, 1),
            ('(', _) => (TokenKind::LeftParen, 1),
            (')', _) => (TokenKind::RightParen, 1),
            (',', _) => (TokenKind::Comma, 1),
            ('"', _) | ('\'', _) | ('`', _) => {
                return Err(ParseError::new(ParseErrorKind::StringLiteral, start));
            }
            (other, _) => {
                return Err(ParseError::new(ParseErrorKind::UnexpectedChar(other), start));
            }
        };

        // "===" / "!==" are not part of the grammar
        if matches!(kind, TokenKind::EqualEqual | TokenKind::NotEqual)
            && chars.get(i + 2) == Some(&'=')
        {
            return Err(ParseError::new(ParseErrorKind::UnexpectedChar('='), i + 2));
        }

        tokens.push(Token {
            kind,
            position: start,
        });
        i += width;
    }

    Ok(tokens)
}

/// Lex `digits [. digits] [e [+-] digits]` starting at `start`
fn lex_number(chars: &[char], start: usize) -> Result<(f64, usize), ParseError> {
    let mut end = start;
    let digits = |end: &mut usize| {
        while chars.get(*end).is_some_and(|c| c.is_ascii_digit()) {
            *end += 1;
        }
    };

    digits(&mut end);
    if chars.get(end) == Some(&'.') {
        end += 1;
        digits(&mut end);
    }
    if matches!(chars.get(end), Some('e') | Some('E')) {
        let mut exp_end = end + 1;
        if matches!(chars.get(exp_end), Some('+') | Some('-')) {
            exp_end += 1;
        }
        if chars.get(exp_end).is_some_and(|c| c.is_ascii_digit()) {
            end = exp_end;
            digits(&mut end);
        }
    }

    // "5abc", "1.2.3", "1e" are malformed, not a number followed by a name
    if chars.get(end).is_some_and(|&c| is_ident_continue(c) || c == '.') {
        let mut bad_end = end;
        while chars.get(bad_end).is_some_and(|&c| is_ident_continue(c) || c == '.') {
            bad_end += 1;
        }
        let text: String = chars[start..bad_end].iter().collect();
        return Err(ParseError::new(ParseErrorKind::InvalidNumber(text), start));
    }

    let text: String = chars[start..end].iter().collect();
    let value: f64 = text
        .parse()
        .map_err(|_| ParseError::new(ParseErrorKind::InvalidNumber(text.clone()), start))?;
    if !value.is_finite() {
        return Err(ParseError::new(ParseErrorKind::InvalidNumber(text), start));
    }
    Ok((value, end))
}
