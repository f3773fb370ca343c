//! Text encoding of PUSH operands.
//!
//! A PUSH operand is a single string that is one of:
//!
//! ```text
//! nil | true | false         keyword literals
//! 42, 0.5, 1e3               decimal numbers
//! "hello\n"                  double-quoted string, escapes: \" \\ \n \t \r
//! counter                    anything else that is a plain name
//! ```
//!
//! [`Literal::parse`] and [`Literal::to_operand`] are inverses for every
//! literal the compiler emits.

use crate::error::LiteralError;

/// A decoded PUSH operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Nil,
    Boolean(bool),
    Number(f64),
    String(String),
    /// A reference to a binding, resolved at the point of use.
    Name(String),
}

impl Literal {
    /// Decode operand text.
    pub fn parse(text: &str) -> Result<Literal, LiteralError> {
        match text {
            "" => return Err(LiteralError::Empty),
            "nil" => return Ok(Literal::Nil),
            "true" => return Ok(Literal::Boolean(true)),
            "false" => return Ok(Literal::Boolean(false)),
            _ => {}
        }

        if text.starts_with('"') {
            return unquote(text).map(Literal::String);
        }

        if looks_numeric(text) {
            return text
                .parse::<f64>()
                .map(Literal::Number)
                .map_err(|_| LiteralError::Malformed(text.to_string()));
        }

        if is_name(text) {
            Ok(Literal::Name(text.to_string()))
        } else {
            Err(LiteralError::Malformed(text.to_string()))
        }
    }

    /// Encode as PUSH operand text.
    pub fn to_operand(&self) -> String {
        match self {
            Literal::Nil => "nil".to_string(),
            Literal::Boolean(b) => b.to_string(),
            Literal::Number(n) => n.to_string(),
            Literal::String(s) => quote(s),
            Literal::Name(name) => name.clone(),
        }
    }
}

/// True if `text` is a valid binding name: `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_name(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn looks_numeric(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let digits = digits.strip_prefix('.').unwrap_or(digits);
    digits.as_bytes().first().is_some_and(|b| b.is_ascii_digit())
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn unquote(text: &str) -> Result<String, LiteralError> {
    let unterminated = || LiteralError::UnterminatedString(text.to_string());

    let inner = text
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .ok_or_else(unterminated)?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escape = chars.next().ok_or_else(unterminated)?;
                out.push(match escape {
                    '"' => '"',
                    '\\' => '\\',
                    'n' => '\n',
                    't' => '\t',
                    'r' => '\r',
                    other => {
                        return Err(LiteralError::InvalidEscape {
                            text: text.to_string(),
                            escape: other,
                        })
                    }
                });
            }
            // An unescaped quote inside means the literal ended early.
            '"' => return Err(LiteralError::Malformed(text.to_string())),
            c => out.push(c),
        }
    }

    Ok(out)
}
