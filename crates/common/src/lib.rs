//! Moonlet common types: the bytecode instruction set.
//!
//! This crate provides the foundational data structures shared by the
//! compiler, the validator, the assembler and the virtual machine:
//!
//! - [`Opcode`] — the 27 opcodes and their operand shapes
//! - [`Instruction`] — an opcode plus its ordered operands ([`Arg`])
//! - [`Program`] — an addressable instruction sequence
//! - [`Literal`] — the text encoding of PUSH operands
//! - [`OpcodeValidationError`] — malformed instruction operands
//!
//! # Dependencies
//!
//! This crate uses `thiserror` (compile-time proc-macro, zero runtime cost)
//! and has no other dependencies.

pub mod error;
pub mod instruction;
pub mod literal;
pub mod opcode;
pub mod program;

// Re-export commonly used types at the crate root.
pub use error::{LiteralError, OpcodeValidationError};
pub use instruction::{Arg, Instruction};
pub use literal::Literal;
pub use opcode::{ArgKind, Opcode};
pub use program::Program;
