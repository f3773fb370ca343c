//! Main execution loop and opcode dispatch for the Moonlet VM.

use std::rc::Rc;

use tracing::{debug, trace};

use crate::config::Scoping;
use crate::error::{OperationError, RuntimeError};
use crate::machine::{CallContext, VM};
use crate::value::{CustomFunction, Value};
use moonlet_common::{Instruction, Literal, Opcode};

/// What the dispatch loop does after an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    /// Continue at the following address.
    Next,
    Jump(usize),
    /// Continue after the scope block opened at the given address.
    SkipBlock(usize),
}

type BinaryOp = fn(&Value, &Value) -> Result<Value, OperationError>;
type UnaryOp = fn(&Value) -> Result<Value, OperationError>;

impl<'a> VM<'a> {
    /// Execute the program from address 0 until the instruction pointer
    /// reaches the end.
    #[tracing::instrument(level = "debug", skip_all, fields(len = self.program.len()))]
    pub fn execute(&mut self) -> Result<(), RuntimeError> {
        self.program.check_shapes()?;
        let program = self.program;

        while let Some(instr) = program.get(self.ip) {
            self.at = self.ip;
            self.ip += 1;
            trace!(at = self.at, %instr, depth = self.stack.len(), "dispatch");

            match self.dispatch(instr)? {
                Flow::Next => {}
                Flow::Jump(target) => self.ip = target,
                Flow::SkipBlock(begin) => self.ip = self.block_end(begin)?,
            }
        }

        debug!(stack = self.stack.len(), "halted");
        Ok(())
    }

    fn dispatch(&mut self, instr: &'a Instruction) -> Result<Flow, RuntimeError> {
        match instr.opcode {
            // Stack and bindings
            Opcode::Push => self.exec_push(instr)?,
            Opcode::Pop => {
                self.pop()?;
            }
            Opcode::Assign => {
                let name = self.name_operand(instr)?;
                let value = self.pop_resolved()?;
                self.settle_pending(Some(name));
                self.current_scope().assign(name, value);
            }
            Opcode::DeclareLocal => {
                let name = self.name_operand(instr)?;
                self.current_scope().declare_local(name, Value::Nil);
            }

            // Operators
            Opcode::Sum => self.exec_binary(Value::add)?,
            Opcode::Subtract => self.exec_binary(Value::subtract)?,
            Opcode::Multiply => self.exec_binary(Value::multiply)?,
            Opcode::Divide => self.exec_binary(Value::divide)?,
            Opcode::Concat => self.exec_binary(Value::concat)?,
            Opcode::BooleanAnd => self.exec_binary(Value::boolean_and)?,
            Opcode::BooleanOr => self.exec_binary(Value::boolean_or)?,
            Opcode::CmpEq => self.exec_binary(Value::equal)?,
            Opcode::CmpNe => self.exec_binary(Value::not_equal)?,
            Opcode::CmpLt => self.exec_binary(Value::less_than)?,
            Opcode::CmpGt => self.exec_binary(Value::greater_than)?,
            Opcode::CmpLe => self.exec_binary(Value::less_equal)?,
            Opcode::CmpGe => self.exec_binary(Value::greater_equal)?,
            Opcode::Minus => self.exec_unary(Value::negate)?,
            Opcode::BooleanNot => self.exec_unary(Value::boolean_not)?,

            // Functions
            Opcode::Function => return self.exec_function(instr),
            Opcode::Call => return self.exec_call(instr),
            Opcode::Return => return self.exec_return(instr),

            // Scopes
            Opcode::BeginScope => self.context_mut().begin_scope(),
            Opcode::EndScope => {
                if !self.context_mut().end_scope() {
                    return Err(self.scope_order("END_SCOPE without a matching BEGIN_SCOPE"));
                }
            }

            // Control flow
            Opcode::Jump => return Ok(Flow::Jump(self.jump_target(instr)?)),
            Opcode::JumpNeg => {
                let target = self.jump_target(instr)?;
                if !self.pop_resolved()?.is_truthy() {
                    return Ok(Flow::Jump(target));
                }
            }
            Opcode::JumpPos => {
                let target = self.jump_target(instr)?;
                if self.pop_resolved()?.is_truthy() {
                    return Ok(Flow::Jump(target));
                }
            }
        }

        Ok(Flow::Next)
    }

    // ---- Operands ----

    fn name_operand(&self, instr: &'a Instruction) -> Result<&'a str, RuntimeError> {
        instr
            .str_arg(0)
            .ok_or_else(|| self.invalid_instruction("missing name operand"))
    }

    /// A non-negative integer operand.
    fn count_operand(&self, instr: &'a Instruction, index: usize) -> Result<usize, RuntimeError> {
        instr
            .int_arg(index)
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(|| self.invalid_instruction("count operand must be a non-negative integer"))
    }

    fn jump_target(&self, instr: &'a Instruction) -> Result<usize, RuntimeError> {
        let target = self.count_operand(instr, 0)?;
        if target > self.program.len() {
            return Err(self.invalid_instruction(format!(
                "jump target {target} is outside the program (length {})",
                self.program.len()
            )));
        }
        Ok(target)
    }

    // ---- Stack and operators ----

    fn exec_push(&mut self, instr: &'a Instruction) -> Result<(), RuntimeError> {
        let text = self.name_operand(instr)?;
        let literal = Literal::parse(text)
            .map_err(|source| RuntimeError::InvalidLiteral { at: self.at, source })?;
        let value = match literal {
            Literal::Nil => Value::Nil,
            Literal::Boolean(b) => Value::Boolean(b),
            Literal::Number(n) => Value::Number(n),
            Literal::String(s) => Value::String(s),
            Literal::Name(name) => Value::Identifier(name),
        };
        self.push(value)
    }

    /// Pop right then left, resolve both, push `op(left, right)`.
    fn exec_binary(&mut self, op: BinaryOp) -> Result<(), RuntimeError> {
        let right = self.pop_resolved()?;
        let left = self.pop_resolved()?;
        let result = op(&left, &right).map_err(|e| self.invalid_operation(e))?;
        self.push(result)
    }

    fn exec_unary(&mut self, op: UnaryOp) -> Result<(), RuntimeError> {
        let operand = self.pop_resolved()?;
        let result = op(&operand).map_err(|e| self.invalid_operation(e))?;
        self.push(result)
    }

    // ---- Functions ----

    /// Bind a function value in the current scope and skip its body. The
    /// body is the scope block starting right after `FUNCTION`.
    fn exec_function(&mut self, instr: &'a Instruction) -> Result<Flow, RuntimeError> {
        let name = self.name_operand(instr)?;
        let arity = self.count_operand(instr, 1)?;
        let entry = self.ip;

        match self.program.get(entry) {
            Some(next) if next.opcode == Opcode::BeginScope => {}
            _ => return Err(self.invalid_instruction("FUNCTION must be followed by BEGIN_SCOPE")),
        }

        let scope = self.current_scope().clone();
        let function = CustomFunction {
            name: name.to_string(),
            entry,
            arity,
            captured: scope.clone(),
        };
        debug!(name, entry, arity, "declaring function");
        scope.declare_local(name, Value::CustomFunction(Rc::new(function)));

        Ok(Flow::SkipBlock(entry))
    }

    fn exec_call(&mut self, instr: &'a Instruction) -> Result<Flow, RuntimeError> {
        let argc = self.count_operand(instr, 0)?;
        let callee = self.pop_resolved()?;

        match callee {
            Value::BuiltinFunction(builtin) => {
                let args = self.pop_args(argc)?;
                trace!(name = builtin.name(), argc, "calling builtin");
                let result = builtin.call(&args).map_err(|e| self.invalid_operation(e))?;
                self.push(result)?;
                Ok(Flow::Next)
            }
            Value::CustomFunction(function) => {
                let depth = self.call_stack.len() - 1;
                if depth >= self.config.max_call_depth {
                    return Err(RuntimeError::CallDepthExceeded {
                        at: self.at,
                        limit: self.config.max_call_depth,
                    });
                }

                let mut args = self.pop_args(argc)?;
                let stack_base = self.stack.len();
                if stack_base.saturating_add(function.arity) > self.config.max_stack_depth {
                    return Err(RuntimeError::StackOverflow {
                        at: self.at,
                        limit: self.config.max_stack_depth,
                    });
                }
                args.resize(function.arity, Value::Nil);

                // The callee may rebind names the caller has pushed but not
                // consumed yet.
                self.settle_pending(None);

                for arg in args {
                    self.push(arg)?;
                }

                let parent = match self.config.scoping {
                    Scoping::Lexical => function.captured.clone(),
                    Scoping::Dynamic => self.current_scope().clone(),
                };
                trace!(name = %function.name, argc, depth = depth + 1, "calling function");
                self.call_stack
                    .push(CallContext::new(parent.child(), self.ip, stack_base));

                Ok(Flow::Jump(function.entry))
            }
            other => Err(self.invalid_operation(OperationError::NotCallable(format!("{other:?}")))),
        }
    }

    /// Pop the declared values in the callee's scope, leave the call and
    /// push the first value (or `nil`) for the caller.
    fn exec_return(&mut self, instr: &'a Instruction) -> Result<Flow, RuntimeError> {
        let count = self.count_operand(instr, 0)?;
        if self.call_stack.len() <= 1 {
            return Err(self.scope_order("RETURN outside of a function call"));
        }

        let result = self
            .pop_args(count)?
            .into_iter()
            .next()
            .unwrap_or(Value::Nil);

        let context = match self.call_stack.pop() {
            Some(context) => context,
            None => return Err(self.scope_order("RETURN outside of a function call")),
        };
        self.stack.truncate(context.stack_base);
        self.push(result)?;

        Ok(Flow::Jump(context.return_address))
    }

    /// Address just past the `END_SCOPE` matching the `BEGIN_SCOPE` at
    /// `begin`.
    fn block_end(&self, begin: usize) -> Result<usize, RuntimeError> {
        let mut depth = 0usize;
        for (address, instr) in self.program.iter().enumerate().skip(begin) {
            match instr.opcode {
                Opcode::BeginScope => depth += 1,
                Opcode::EndScope => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Ok(address + 1);
                    }
                }
                _ => {}
            }
        }
        Err(self.scope_order("function body has no matching END_SCOPE"))
    }
}
