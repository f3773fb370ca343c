//! Errors for malformed instructions and PUSH literals.

use crate::opcode::{ArgKind, Opcode};
use thiserror::Error;

/// An instruction whose operands do not match its opcode's shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OpcodeValidationError {
    /// Wrong number of operands.
    #[error("{opcode} at address {at} expects {expected} argument(s), found {found}")]
    ArgumentCount {
        at: usize,
        opcode: Opcode,
        expected: usize,
        found: usize,
    },

    /// An operand of the wrong kind.
    #[error("{opcode} at address {at}: argument {index} must be {kind}", kind = .expected.name())]
    ArgumentType {
        at: usize,
        opcode: Opcode,
        index: usize,
        expected: ArgKind,
    },
}

/// A PUSH operand that is not a valid literal or name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    /// Empty operand text.
    #[error("empty literal")]
    Empty,

    /// A string literal without its closing quote.
    #[error("unterminated string literal: {0}")]
    UnterminatedString(String),

    /// A backslash escape that is not recognized.
    #[error("invalid escape '\\{escape}' in string literal {text}")]
    InvalidEscape { text: String, escape: char },

    /// Something that is neither a literal nor a plain name.
    #[error("malformed literal: {0}")]
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_argument_count() {
        let e = OpcodeValidationError::ArgumentCount {
            at: 3,
            opcode: Opcode::Call,
            expected: 1,
            found: 0,
        };
        assert_eq!(
            e.to_string(),
            "CALL at address 3 expects 1 argument(s), found 0"
        );
    }

    #[test]
    fn display_argument_type() {
        let e = OpcodeValidationError::ArgumentType {
            at: 0,
            opcode: Opcode::Jump,
            index: 0,
            expected: ArgKind::Int,
        };
        assert_eq!(
            e.to_string(),
            "JUMP at address 0: argument 0 must be integer"
        );
    }

    #[test]
    fn display_unterminated_string() {
        assert_eq!(
            LiteralError::UnterminatedString("\"abc".to_string()).to_string(),
            "unterminated string literal: \"abc"
        );
    }
}
