//! Limits pass: operand counts the VM is willing to honour.
//!
//! A count above [`MAX_COUNT`] would make a call or return move an
//! unbounded number of values, so it is rejected before execution.

use crate::error::ValidationError;
use moonlet_common::opcode::MAX_COUNT;
use moonlet_common::{Instruction, Opcode};

/// Run the limits check.
pub fn check_limits(instrs: &[Instruction]) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for (at, instr) in instrs.iter().enumerate() {
        let count = match instr.opcode {
            Opcode::Call | Opcode::Return => instr.int_arg(0),
            Opcode::Function => instr.int_arg(1),
            _ => None,
        };

        if let Some(count) = count.filter(|&n| n > MAX_COUNT) {
            errors.push(ValidationError::CountTooLarge {
                at,
                opcode: instr.opcode,
                count,
                limit: MAX_COUNT,
            });
        }
    }

    errors
}
