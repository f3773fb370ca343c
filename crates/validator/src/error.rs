//! Validation errors for Moonlet bytecode.
//!
//! Every error carries the address (`at`) of the offending instruction. The
//! validator collects all of them rather than stopping at the first.

use moonlet_common::{LiteralError, Opcode, OpcodeValidationError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    // --- Shape ---
    /// Wrong operand count or operand kind.
    #[error(transparent)]
    Shape(#[from] OpcodeValidationError),

    // --- Operands ---
    /// A jump target outside `0..=len`.
    #[error("jump target {target} at address {at} is outside the program (length {len})")]
    JumpOutOfRange { at: usize, target: i64, len: usize },

    /// A negative CALL/RETURN/FUNCTION count.
    #[error("{opcode} at address {at} has negative count {count}")]
    NegativeCount { at: usize, opcode: Opcode, count: i64 },

    /// A CALL/RETURN/FUNCTION count above the VM's limit.
    #[error("{opcode} at address {at} has count {count}, limit is {limit}")]
    CountTooLarge {
        at: usize,
        opcode: Opcode,
        count: i64,
        limit: i64,
    },

    #[error("PUSH operand at address {at} does not decode: {source}")]
    InvalidLiteral {
        at: usize,
        #[source]
        source: LiteralError,
    },

    /// ASSIGN, DECLARE_LOCAL or FUNCTION with a name that is not an identifier.
    #[error("{opcode} at address {at} has invalid name {name:?}")]
    InvalidName {
        at: usize,
        opcode: Opcode,
        name: String,
    },

    // --- Structure ---
    #[error("END_SCOPE at address {at} has no matching BEGIN_SCOPE")]
    UnmatchedEndScope { at: usize },

    #[error("BEGIN_SCOPE at address {at} is never closed")]
    UnclosedScope { at: usize },

    /// FUNCTION not immediately followed by BEGIN_SCOPE.
    #[error("FUNCTION at address {at} is not followed by BEGIN_SCOPE")]
    FunctionWithoutBody { at: usize },
}
