//! Structural pass: static scope balance and function bodies.
//!
//! Compiled code always closes scopes in program order, so a single linear
//! scan is enough. A body that ends in `RETURN` still has its `END_SCOPE`.

use crate::error::ValidationError;
use moonlet_common::{Instruction, Opcode};

/// Run the structural checks.
pub fn check_structure(instrs: &[Instruction]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut open: Vec<usize> = Vec::new();

    for (at, instr) in instrs.iter().enumerate() {
        match instr.opcode {
            Opcode::BeginScope => open.push(at),
            Opcode::EndScope => {
                if open.pop().is_none() {
                    errors.push(ValidationError::UnmatchedEndScope { at });
                }
            }
            Opcode::Function => {
                let has_body = instrs
                    .get(at + 1)
                    .is_some_and(|next| next.opcode == Opcode::BeginScope);
                if !has_body {
                    errors.push(ValidationError::FunctionWithoutBody { at });
                }
            }
            _ => {}
        }
    }

    errors.extend(open.into_iter().map(|at| ValidationError::UnclosedScope { at }));
    errors
}
