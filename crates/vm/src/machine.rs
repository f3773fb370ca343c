//! VM state management: operand stack, call contexts, global scope.

use tracing::debug;

use crate::config::VmConfig;
use crate::error::{OperationError, RuntimeError};
use crate::scope::Scope;
use crate::stdlib::StandardLibrary;
use crate::value::{BuiltinFunction, Value};
use moonlet_common::{Instruction, Program};

/// The scope stack of one activation: the script body or a function call.
#[derive(Debug)]
pub struct CallContext {
    /// Innermost last. Never empty.
    scopes: Vec<Scope>,
    /// Address to continue at after `RETURN`.
    pub return_address: usize,
    /// Operand stack height to restore on `RETURN`.
    pub stack_base: usize,
}

impl CallContext {
    pub fn new(root: Scope, return_address: usize, stack_base: usize) -> Self {
        Self {
            scopes: vec![root],
            return_address,
            stack_base,
        }
    }

    pub fn current_scope(&self) -> &Scope {
        self.scopes
            .last()
            .expect("a call context always holds its root scope")
    }

    pub fn begin_scope(&mut self) {
        let child = self.current_scope().child();
        self.scopes.push(child);
    }

    /// Close the innermost scope. Returns false when only the root is left.
    pub fn end_scope(&mut self) -> bool {
        if self.scopes.len() <= 1 {
            return false;
        }
        self.scopes.pop();
        true
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

/// The Moonlet virtual machine.
pub struct VM<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    pub(crate) config: VmConfig,
    /// Root of every scope chain; builtins live here.
    pub(crate) global: Scope,
    /// Operand stack.
    pub(crate) stack: Vec<Value>,
    /// The script context at the bottom, one more per active call.
    pub(crate) call_stack: Vec<CallContext>,
    /// Address of the next instruction.
    pub(crate) ip: usize,
    /// Address of the instruction being executed.
    pub(crate) at: usize,
}

impl<'a> VM<'a> {
    /// Create a new VM for the given program with default limits.
    pub fn new(program: &'a Program) -> Self {
        Self::with_config(program, VmConfig::default())
    }

    pub fn with_config(program: &'a Program, config: VmConfig) -> Self {
        let global = Scope::global();
        Self {
            program,
            config,
            call_stack: vec![CallContext::new(global.clone(), program.len(), 0)],
            global,
            stack: Vec::new(),
            ip: 0,
            at: 0,
        }
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// The root scope. Top-level assignments are visible here after
    /// execution.
    pub fn global_scope(&self) -> &Scope {
        &self.global
    }

    /// The operand stack, bottom first.
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    /// Register a host function under `name` in the global scope.
    pub fn register(
        &mut self,
        name: &str,
        callback: impl Fn(&[Value]) -> Result<Value, OperationError> + 'static,
    ) -> Result<(), RuntimeError> {
        self.register_builtin(BuiltinFunction::new(name, callback))
    }

    pub fn register_builtin(&mut self, builtin: BuiltinFunction) -> Result<(), RuntimeError> {
        if self.global.has_local(builtin.name()) {
            return Err(RuntimeError::BuiltinAlreadyRegistered {
                name: builtin.name().to_string(),
            });
        }
        let name = builtin.name().to_string();
        debug!(%name, "registering builtin");
        self.global
            .declare_local(&name, Value::BuiltinFunction(builtin));
        Ok(())
    }

    /// Register `print`, `write`, `read` and `tostring` over stdio.
    pub fn load_standard_library(&mut self) -> Result<(), RuntimeError> {
        StandardLibrary::stdio().install(self)
    }

    // ---- Operand stack ----

    /// Push a value onto the stack, checking for overflow.
    pub(crate) fn push(&mut self, value: Value) -> Result<(), RuntimeError> {
        if self.stack.len() >= self.config.max_stack_depth {
            return Err(RuntimeError::StackOverflow {
                at: self.at,
                limit: self.config.max_stack_depth,
            });
        }
        self.stack.push(value);
        Ok(())
    }

    /// Pop a value from the stack.
    pub(crate) fn pop(&mut self) -> Result<Value, RuntimeError> {
        match self.stack.pop() {
            Some(value) => Ok(value),
            None => Err(RuntimeError::StackUnderflow {
                at: self.at,
                instruction: self.describe(),
            }),
        }
    }

    /// Pop a value and resolve it if it is an identifier.
    pub(crate) fn pop_resolved(&mut self) -> Result<Value, RuntimeError> {
        let value = self.pop()?;
        Ok(self.resolve(value))
    }

    /// Pop `count` resolved values and return them in push order.
    pub(crate) fn pop_args(&mut self, count: usize) -> Result<Vec<Value>, RuntimeError> {
        if count > self.stack.len() {
            return Err(RuntimeError::StackUnderflow {
                at: self.at,
                instruction: self.describe(),
            });
        }
        let mut args = Vec::with_capacity(count);
        for _ in 0..count {
            args.push(self.pop_resolved()?);
        }
        args.reverse();
        Ok(args)
    }

    /// Identifiers resolve through the current scope chain; unbound names
    /// are `nil`. Every other value resolves to itself.
    pub(crate) fn resolve(&self, value: Value) -> Value {
        match value {
            Value::Identifier(name) => self.current_scope().lookup(&name).unwrap_or(Value::Nil),
            other => other,
        }
    }

    /// Replace pending identifiers of the current call context with their
    /// current values. With `only`, just the identifiers naming that binding.
    ///
    /// Runs before a binding can change, so values already on the stack keep
    /// the meaning they had when they were pushed.
    pub(crate) fn settle_pending(&mut self, only: Option<&str>) {
        let base = self.context().stack_base;
        let scope = self.current_scope().clone();
        for slot in self.stack.iter_mut().skip(base) {
            let Value::Identifier(name) = slot else {
                continue;
            };
            if only.is_some_and(|only| only != name.as_str()) {
                continue;
            }
            let value = scope.lookup(name).unwrap_or(Value::Nil);
            *slot = value;
        }
    }

    // ---- Scopes and contexts ----

    pub(crate) fn context(&self) -> &CallContext {
        self.call_stack
            .last()
            .expect("the script context is never popped")
    }

    pub(crate) fn context_mut(&mut self) -> &mut CallContext {
        self.call_stack
            .last_mut()
            .expect("the script context is never popped")
    }

    pub(crate) fn current_scope(&self) -> &Scope {
        self.context().current_scope()
    }

    // ---- Error helpers ----

    /// The executing instruction's listing text.
    pub(crate) fn describe(&self) -> String {
        self.current_instruction()
            .map(Instruction::to_string)
            .unwrap_or_default()
    }

    pub(crate) fn current_instruction(&self) -> Option<&'a Instruction> {
        self.program.get(self.at)
    }

    pub(crate) fn invalid_operation(&self, source: OperationError) -> RuntimeError {
        RuntimeError::InvalidOperation {
            at: self.at,
            instruction: self.describe(),
            source,
        }
    }

    pub(crate) fn invalid_instruction(&self, reason: impl Into<String>) -> RuntimeError {
        RuntimeError::InvalidInstruction {
            at: self.at,
            instruction: self.describe(),
            reason: reason.into(),
        }
    }

    pub(crate) fn scope_order(&self, reason: &'static str) -> RuntimeError {
        RuntimeError::ScopeOrder {
            at: self.at,
            instruction: self.describe(),
            reason,
        }
    }
}
