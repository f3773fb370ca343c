//! Moonlet validator: static checks for bytecode programs.
//!
//! The validator checks a `Program` BEFORE execution. It collects ALL errors
//! (not just the first) and returns them.
//!
//! # Usage
//!
//! ```
//! use moonlet_common::{Instruction, Opcode, Program};
//! use moonlet_validator::validate;
//!
//! let program = Program::new(vec![
//!     Instruction::push("42"),
//!     Instruction::named(Opcode::Assign, "answer"),
//! ]);
//!
//! assert!(validate(&program).is_ok());
//! ```
//!
//! # Passes
//!
//! 1. **Shape** — operand count and kinds per opcode
//! 2. **Operands** — jump targets, counts, PUSH literals, binding names
//! 3. **Limits** — CALL/RETURN/FUNCTION counts within bounds
//! 4. **Structure** — BEGIN/END balance, FUNCTION bodies
//!
//! Passes 2 to 4 only run when every instruction is well-shaped.

pub mod error;
pub mod limits;
pub mod shape;
pub mod structure;
pub mod targets;

pub use error::ValidationError;

use moonlet_common::Program;

/// Validate a program.
///
/// Returns `Ok(())` if every check passes, or `Err(Vec<ValidationError>)`
/// with all errors found.
pub fn validate(program: &Program) -> Result<(), Vec<ValidationError>> {
    let instrs = &program.instructions;

    let mut all_errors = shape::check_shapes(instrs);
    if all_errors.is_empty() {
        all_errors.extend(targets::check_operands(instrs));
        all_errors.extend(limits::check_limits(instrs));
        all_errors.extend(structure::check_structure(instrs));
    }

    if all_errors.is_empty() {
        Ok(())
    } else {
        Err(all_errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use moonlet_common::{Arg, Instruction, Opcode};

    #[test]
    fn empty_program_is_valid() {
        assert!(validate(&Program::default()).is_ok());
    }

    #[test]
    fn shape_errors_suppress_later_passes() {
        let program = Program::new(vec![
            Instruction::new(Opcode::Call, vec![]),
            Instruction::bare(Opcode::EndScope),
        ]);
        let errors = validate(&program).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], ValidationError::Shape(_)));
    }

    #[test]
    fn oversized_call_is_rejected() {
        let program = Program::new(vec![
            Instruction::push("print"),
            Instruction::with_int(Opcode::Call, i64::MAX / 16),
        ]);
        let errors = validate(&program).unwrap_err();
        assert!(matches!(errors[..], [ValidationError::CountTooLarge { at: 1, .. }]));
    }

    #[test]
    fn multiple_errors_collected() {
        let program = Program::new(vec![
            Instruction::with_int(Opcode::Jump, 99),
            Instruction::bare(Opcode::EndScope),
            Instruction::new(Opcode::Call, vec![Arg::Int(-3)]),
        ]);
        let errors = validate(&program).unwrap_err();
        assert_eq!(errors.len(), 3, "got: {errors:?}");
    }
}
