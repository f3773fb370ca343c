//! Error types for the Moonlet assembler.

use thiserror::Error;

/// Errors produced while parsing a listing back into a program.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AsmError {
    /// An unrecognized opcode mnemonic was encountered.
    #[error("line {line}: unknown opcode '{token}'")]
    UnknownOpcode { line: usize, token: String },

    /// An opcode did not have enough operands.
    #[error("line {line}: {opcode} expects {expected} argument(s)")]
    MissingArgument {
        line: usize,
        opcode: &'static str,
        expected: usize,
    },

    /// An integer operand could not be parsed.
    #[error("line {line}: invalid number '{token}'")]
    InvalidNumber { line: usize, token: String },

    /// A token appeared where it was not expected.
    #[error("line {line}: unexpected token '{token}'")]
    UnexpectedToken { line: usize, token: String },

    /// The `N:` prefix disagrees with the instruction's position.
    #[error("line {line}: address {found} out of sequence, expected {expected}")]
    AddressMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
}
