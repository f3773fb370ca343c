//! Instructions: an opcode plus its ordered operand list.

use std::fmt;

use crate::error::OpcodeValidationError;
use crate::literal::Literal;
use crate::opcode::{ArgKind, Opcode};

/// A single instruction operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arg {
    Str(String),
    Int(i64),
}

impl Arg {
    /// The kind of this operand.
    pub fn kind(&self) -> ArgKind {
        match self {
            Arg::Str(_) => ArgKind::Str,
            Arg::Int(_) => ArgKind::Int,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s),
            Arg::Int(_) => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Arg::Int(n) => Some(*n),
            Arg::Str(_) => None,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => f.write_str(s),
            Arg::Int(n) => write!(f, "{n}"),
        }
    }
}

/// A single Moonlet instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// Operands, in order. Their kinds must match [`Opcode::arg_kinds`].
    pub args: Vec<Arg>,
}

impl Instruction {
    /// Create a new instruction. The operands are not checked here; see
    /// [`Instruction::check_shape`].
    pub fn new(opcode: Opcode, args: Vec<Arg>) -> Self {
        Self { opcode, args }
    }

    /// An instruction with no operands.
    pub fn bare(opcode: Opcode) -> Self {
        Self::new(opcode, Vec::new())
    }

    /// `PUSH` of an already-encoded operand (see [`crate::literal`]).
    pub fn push(operand: impl Into<String>) -> Self {
        Self::new(Opcode::Push, vec![Arg::Str(operand.into())])
    }

    /// `PUSH` of a literal.
    pub fn push_literal(literal: &Literal) -> Self {
        Self::push(literal.to_operand())
    }

    /// An opcode taking one name operand (`ASSIGN`, `DECLARE_LOCAL`).
    pub fn named(opcode: Opcode, name: impl Into<String>) -> Self {
        Self::new(opcode, vec![Arg::Str(name.into())])
    }

    /// An opcode taking one integer operand (`CALL`, `RETURN`, jumps).
    pub fn with_int(opcode: Opcode, value: i64) -> Self {
        Self::new(opcode, vec![Arg::Int(value)])
    }

    /// `FUNCTION name param_count`.
    pub fn function(name: impl Into<String>, param_count: usize) -> Self {
        Self::new(
            Opcode::Function,
            vec![Arg::Str(name.into()), Arg::Int(param_count as i64)],
        )
    }

    /// The string operand at `index`, if present and a string.
    pub fn str_arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).and_then(Arg::as_str)
    }

    /// The integer operand at `index`, if present and an integer.
    pub fn int_arg(&self, index: usize) -> Option<i64> {
        self.args.get(index).and_then(Arg::as_int)
    }

    /// Check the operand count and kinds against the opcode's shape.
    ///
    /// `at` is the instruction's address, used only for error reporting.
    pub fn check_shape(&self, at: usize) -> Result<(), OpcodeValidationError> {
        let kinds = self.opcode.arg_kinds();
        if self.args.len() != kinds.len() {
            return Err(OpcodeValidationError::ArgumentCount {
                at,
                opcode: self.opcode,
                expected: kinds.len(),
                found: self.args.len(),
            });
        }

        for (index, (arg, &expected)) in self.args.iter().zip(kinds).enumerate() {
            if arg.kind() != expected {
                return Err(OpcodeValidationError::ArgumentType {
                    at,
                    opcode: self.opcode,
                    index,
                    expected,
                });
            }
        }

        Ok(())
    }
}

/// Renders `OPCODE arg1 arg2 …`, the text form used in listings.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode.mnemonic())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}
