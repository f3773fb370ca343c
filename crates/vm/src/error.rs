//! Runtime errors for the Moonlet VM.
//!
//! [`OperationError`] is raised by value operators and host callbacks, which
//! know nothing about addresses. The dispatch loop wraps it into a
//! [`RuntimeError`] that records where it happened.

use moonlet_common::{LiteralError, OpcodeValidationError};
use thiserror::Error;

/// A value-level failure: an operator applied to unsupported operands, a
/// call on a non-callable value, or a host function failing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("invalid operands for '{op}' operation: {left} and {right}")]
    InvalidOperands {
        op: &'static str,
        left: String,
        right: String,
    },

    #[error("invalid operand for {op} operation: {operand}")]
    InvalidOperand { op: &'static str, operand: String },

    #[error("impossible to call value: {0}")]
    NotCallable(String),

    #[error("{function}: {message}")]
    Host { function: String, message: String },
}

/// Errors that abort execution.
///
/// Every address-carrying variant names the instruction that was executing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The program contains an instruction with a malformed operand list.
    #[error(transparent)]
    Validation(#[from] OpcodeValidationError),

    /// A PUSH operand could not be decoded.
    #[error("invalid PUSH operand at address {at}: {source}")]
    InvalidLiteral {
        at: usize,
        #[source]
        source: LiteralError,
    },

    /// An instruction that is well-shaped but cannot run as written.
    #[error("invalid instruction at address {at} ({instruction}): {reason}")]
    InvalidInstruction {
        at: usize,
        instruction: String,
        reason: String,
    },

    #[error("invalid operation at address {at} ({instruction}): {source}")]
    InvalidOperation {
        at: usize,
        instruction: String,
        #[source]
        source: OperationError,
    },

    /// Scope or call-context bookkeeping was violated.
    #[error("scope order violation at address {at} ({instruction}): {reason}")]
    ScopeOrder {
        at: usize,
        instruction: String,
        reason: &'static str,
    },

    #[error("stack underflow at address {at} ({instruction})")]
    StackUnderflow { at: usize, instruction: String },

    #[error("stack overflow at address {at}: limit is {limit} values")]
    StackOverflow { at: usize, limit: usize },

    #[error("call depth exceeded limit {limit} at address {at}")]
    CallDepthExceeded { at: usize, limit: usize },

    #[error("builtin '{name}' is already registered")]
    BuiltinAlreadyRegistered { name: String },
}
