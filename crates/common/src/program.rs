//! Program representation: an ordered instruction sequence.
//!
//! Addresses are 0-based positions. `len()` is the halt address: execution
//! stops when the instruction pointer reaches it.

use std::fmt;

use crate::error::OpcodeValidationError;
use crate::instruction::Instruction;

/// A Moonlet program: a sequence of instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// The instruction stream.
    pub instructions: Vec<Instruction>,
}

impl Program {
    /// Create a new program from a vector of instructions.
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Number of instructions in the program.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the program has no instructions.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The instruction at `address`, or `None` past the end.
    pub fn get(&self, address: usize) -> Option<&Instruction> {
        self.instructions.get(address)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Instruction> {
        self.instructions.iter()
    }

    /// Check every instruction's operand shape, stopping at the first bad one.
    pub fn check_shapes(&self) -> Result<(), OpcodeValidationError> {
        self.instructions
            .iter()
            .enumerate()
            .try_for_each(|(at, instr)| instr.check_shape(at))
    }
}

impl<'a> IntoIterator for &'a Program {
    type Item = &'a Instruction;
    type IntoIter = std::slice::Iter<'a, Instruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.instructions.iter()
    }
}

/// Writes the program as numbered listing lines (`address:\t OPCODE args`).
///
/// No shape check happens here; `moonlet_assembler::listing` is the checked
/// entry point.
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (address, instr) in self.instructions.iter().enumerate() {
            writeln!(f, "{address}:\t {instr}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Arg;
    use crate::opcode::Opcode;

    #[test]
    fn empty_program() {
        let program = Program::new(vec![]);
        assert!(program.is_empty());
        assert_eq!(program.len(), 0);
        assert_eq!(program.to_string(), "");
        assert!(program.check_shapes().is_ok());
    }

    #[test]
    fn display_numbers_lines() {
        let program = Program::new(vec![
            Instruction::push("1"),
            Instruction::named(Opcode::Assign, "x"),
        ]);
        assert_eq!(program.to_string(), "0:\t PUSH 1\n1:\t ASSIGN x\n");
    }

    #[test]
    fn check_shapes_reports_address() {
        let program = Program::new(vec![
            Instruction::push("1"),
            Instruction::new(Opcode::Assign, vec![Arg::Int(3)]),
        ]);
        assert!(matches!(
            program.check_shapes(),
            Err(OpcodeValidationError::ArgumentType { at: 1, .. })
        ));
    }

    #[test]
    fn get_past_end() {
        let program = Program::new(vec![Instruction::bare(Opcode::Pop)]);
        assert!(program.get(0).is_some());
        assert!(program.get(1).is_none());
    }
}
