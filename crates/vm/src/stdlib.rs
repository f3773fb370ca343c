//! Host builtins: `print`, `write`, `read`, `tostring`.
//!
//! Streams are injectable so embedders and tests can capture output or feed
//! input.

use std::cell::RefCell;
use std::io::{self, BufRead, BufReader, Write};
use std::rc::Rc;

use crate::error::{OperationError, RuntimeError};
use crate::machine::VM;
use crate::value::Value;

pub type SharedOutput = Rc<RefCell<dyn Write>>;
pub type SharedInput = Rc<RefCell<dyn BufRead>>;

/// The standard builtins bound to a pair of streams.
#[derive(Clone)]
pub struct StandardLibrary {
    output: SharedOutput,
    input: SharedInput,
}

impl StandardLibrary {
    pub fn new(output: SharedOutput, input: SharedInput) -> Self {
        Self { output, input }
    }

    /// Process stdout and stdin.
    pub fn stdio() -> Self {
        Self::new(
            Rc::new(RefCell::new(io::stdout())),
            Rc::new(RefCell::new(BufReader::new(io::stdin()))),
        )
    }

    /// Register every builtin into `vm`'s global scope.
    pub fn install(&self, vm: &mut VM<'_>) -> Result<(), RuntimeError> {
        let output = Rc::clone(&self.output);
        vm.register("print", move |args| {
            emit(&output, args, true).map_err(|e| host_error("print", e))?;
            Ok(Value::Nil)
        })?;

        let output = Rc::clone(&self.output);
        vm.register("write", move |args| {
            emit(&output, args, false).map_err(|e| host_error("write", e))?;
            Ok(Value::Nil)
        })?;

        let input = Rc::clone(&self.input);
        vm.register("read", move |_| {
            let mut line = String::new();
            let read = input
                .borrow_mut()
                .read_line(&mut line)
                .map_err(|e| host_error("read", e))?;
            if read == 0 {
                return Ok(Value::Nil);
            }
            let trimmed = line.strip_suffix('\n').unwrap_or(&line);
            let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
            Ok(Value::String(trimmed.to_string()))
        })?;

        vm.register("tostring", |args| {
            let text = args.first().map(Value::to_string).unwrap_or_else(|| "nil".to_string());
            Ok(Value::String(text))
        })?;

        Ok(())
    }
}

/// Write display forms separated by single spaces.
fn emit(output: &SharedOutput, args: &[Value], newline: bool) -> io::Result<()> {
    let mut out = output.borrow_mut();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            out.write_all(b" ")?;
        }
        write!(out, "{arg}")?;
    }
    if newline {
        out.write_all(b"\n")?;
    }
    out.flush()
}

fn host_error(function: &str, err: io::Error) -> OperationError {
    OperationError::Host {
        function: function.to_string(),
        message: err.to_string(),
    }
}
