//! Operand pass: jump targets, counts, PUSH literals and binding names.
//!
//! Assumes shapes are already valid; instructions with missing operands are
//! skipped here.

use crate::error::ValidationError;
use moonlet_common::literal::is_name;
use moonlet_common::{Instruction, Literal, Opcode};

/// Run the operand checks.
pub fn check_operands(instrs: &[Instruction]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let len = instrs.len();

    for (at, instr) in instrs.iter().enumerate() {
        match instr.opcode {
            Opcode::Jump | Opcode::JumpNeg | Opcode::JumpPos => {
                if let Some(target) = instr.int_arg(0) {
                    if target < 0 || target as u64 > len as u64 {
                        errors.push(ValidationError::JumpOutOfRange { at, target, len });
                    }
                }
            }
            Opcode::Call | Opcode::Return => check_count(instr, 0, at, &mut errors),
            Opcode::Function => {
                check_name(instr, at, &mut errors);
                check_count(instr, 1, at, &mut errors);
            }
            Opcode::Assign | Opcode::DeclareLocal => check_name(instr, at, &mut errors),
            Opcode::Push => {
                if let Some(text) = instr.str_arg(0) {
                    if let Err(source) = Literal::parse(text) {
                        errors.push(ValidationError::InvalidLiteral { at, source });
                    }
                }
            }
            _ => {}
        }
    }

    errors
}

fn check_count(instr: &Instruction, index: usize, at: usize, errors: &mut Vec<ValidationError>) {
    if let Some(count) = instr.int_arg(index) {
        if count < 0 {
            errors.push(ValidationError::NegativeCount {
                at,
                opcode: instr.opcode,
                count,
            });
        }
    }
}

fn check_name(instr: &Instruction, at: usize, errors: &mut Vec<ValidationError>) {
    if let Some(name) = instr.str_arg(0) {
        if !is_name(name) {
            errors.push(ValidationError::InvalidName {
                at,
                opcode: instr.opcode,
                name: name.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jump_to_end_is_allowed() {
        let instrs = [
            Instruction::with_int(Opcode::Jump, 2),
            Instruction::push("1"),
        ];
        assert!(check_operands(&instrs).is_empty());
    }

    #[test]
    fn jump_past_end_rejected() {
        let instrs = [Instruction::with_int(Opcode::JumpNeg, 2)];
        assert_eq!(
            check_operands(&instrs),
            vec![ValidationError::JumpOutOfRange {
                at: 0,
                target: 2,
                len: 1
            }]
        );
    }

    #[test]
    fn negative_counts_rejected() {
        let instrs = [
            Instruction::with_int(Opcode::Call, -1),
            Instruction::with_int(Opcode::Return, -2),
        ];
        assert_eq!(check_operands(&instrs).len(), 2);
    }

    #[test]
    fn bad_literal_and_name() {
        let instrs = [
            Instruction::push("\"open"),
            Instruction::named(Opcode::DeclareLocal, "two words"),
        ];
        let errors = check_operands(&instrs);
        assert!(matches!(errors[0], ValidationError::InvalidLiteral { at: 0, .. }));
        assert!(matches!(errors[1], ValidationError::InvalidName { at: 1, .. }));
    }
}
