//! Shape pass: operand count and kind for every instruction.

use crate::error::ValidationError;
use moonlet_common::Instruction;

/// Run the shape check over every instruction.
pub fn check_shapes(instrs: &[Instruction]) -> Vec<ValidationError> {
    instrs
        .iter()
        .enumerate()
        .filter_map(|(at, instr)| instr.check_shape(at).err())
        .map(ValidationError::from)
        .collect()
}
