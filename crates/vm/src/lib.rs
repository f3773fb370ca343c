//! Moonlet virtual machine: executes bytecode programs.
//!
//! The VM is a stack-based machine with:
//! - An operand stack for intermediate values
//! - Lexical scopes linked to a parent, with assignment falling back to the
//!   global scope
//! - A call stack of [`CallContext`]s, one per active function call
//!
//! # Usage
//!
//! ```
//! use moonlet_common::{Instruction, Opcode, Program};
//! use moonlet_vm::{Value, VM};
//!
//! let program = Program::new(vec![
//!     Instruction::push("40"),
//!     Instruction::push("2"),
//!     Instruction::bare(Opcode::Sum),
//!     Instruction::named(Opcode::Assign, "answer"),
//! ]);
//!
//! let mut vm = VM::new(&program);
//! vm.execute().unwrap();
//! assert_eq!(vm.global_scope().lookup("answer"), Some(Value::Number(42.0)));
//! ```

pub mod config;
pub mod error;
pub mod execute;
pub mod machine;
pub mod scope;
pub mod stdlib;
pub mod value;

pub use config::{Scoping, VmConfig};
pub use error::{OperationError, RuntimeError};
pub use machine::{CallContext, VM};
pub use scope::Scope;
pub use stdlib::StandardLibrary;
pub use value::{BuiltinFunction, CustomFunction, Value};

use moonlet_common::Program;

/// Execute a program with the standard library bound to stdio.
///
/// # Errors
///
/// Returns [`RuntimeError`] if the program is malformed or fails while
/// running (invalid operands, calling a non-function, scope misuse, limits).
pub fn run(program: &Program) -> Result<(), RuntimeError> {
    run_with_config(program, VmConfig::default())
}

pub fn run_with_config(program: &Program, config: VmConfig) -> Result<(), RuntimeError> {
    let mut vm = VM::with_config(program, config);
    vm.load_standard_library()?;
    vm.execute()
}
