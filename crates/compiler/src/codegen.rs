//! Lowering of the syntax tree into bytecode.
//!
//! Every expression leaves exactly one value on the operand stack. Names are
//! pushed unresolved and looked up by the instruction that consumes them.

use moonlet_common::{Instruction, Literal, Opcode};
use tracing::trace;

use crate::ast::{BinOp, Block, Call, Expr, FunctionDecl, Stat, UnOp};
use crate::context::CompilationContext;

/// A syntax node that can write itself into a program.
pub trait Emit {
    fn emit(&self, ctx: &mut CompilationContext);
}

impl Emit for Block {
    fn emit(&self, ctx: &mut CompilationContext) {
        for stat in &self.stats {
            stat.emit(ctx);
        }
    }
}

/// `BEGIN_SCOPE`, the block, `END_SCOPE`.
fn emit_scoped(block: &Block, ctx: &mut CompilationContext) {
    ctx.emit(Instruction::bare(Opcode::BeginScope));
    block.emit(ctx);
    ctx.emit(Instruction::bare(Opcode::EndScope));
}

/// Emit `values` so that exactly `count` remain on the stack: missing ones
/// are `nil`, extra ones are evaluated and discarded.
fn emit_adjusted(values: &[Expr], count: usize, ctx: &mut CompilationContext) {
    for value in values {
        value.emit(ctx);
    }
    for _ in values.len()..count {
        ctx.emit(Instruction::push_literal(&Literal::Nil));
    }
    for _ in count..values.len() {
        ctx.emit(Instruction::bare(Opcode::Pop));
    }
}

/// One `ASSIGN` per name, last name first.
fn emit_assign_reversed(names: &[String], ctx: &mut CompilationContext) {
    for name in names.iter().rev() {
        ctx.emit(Instruction::named(Opcode::Assign, name.as_str()));
    }
}

fn emit_nil_return(ctx: &mut CompilationContext) {
    ctx.emit(Instruction::push_literal(&Literal::Nil));
    ctx.emit(Instruction::with_int(Opcode::Return, 1));
}

impl Emit for Stat {
    fn emit(&self, ctx: &mut CompilationContext) {
        match self {
            Stat::Assign { targets, values } => {
                emit_adjusted(values, targets.len(), ctx);
                emit_assign_reversed(targets, ctx);
            }
            Stat::Local { names, values } => {
                for name in names {
                    ctx.emit(Instruction::named(Opcode::DeclareLocal, name.as_str()));
                }
                emit_adjusted(values, names.len(), ctx);
                emit_assign_reversed(names, ctx);
            }
            Stat::Call(call) => {
                call.emit(ctx);
                ctx.emit(Instruction::bare(Opcode::Pop));
            }
            Stat::Function(decl) => decl.emit(ctx),
            Stat::Return(values) => {
                if values.is_empty() {
                    emit_nil_return(ctx);
                } else {
                    for value in values {
                        value.emit(ctx);
                    }
                    ctx.emit(Instruction::with_int(Opcode::Return, values.len() as i64));
                }
            }
            Stat::If {
                branches,
                else_block,
            } => emit_if(branches, else_block.as_ref(), ctx),
            Stat::NumericFor {
                var,
                start,
                end,
                step,
                body,
            } => emit_numeric_for(var, start, end, step.as_ref(), body, ctx),
            Stat::While { cond, body } => {
                let top = ctx.next_address();
                cond.emit(ctx);
                let exit = ctx.emit_jump(Opcode::JumpNeg);
                emit_scoped(body, ctx);
                ctx.emit_jump_to(Opcode::Jump, top);
                ctx.patch_here(exit);
                trace!(top, end = ctx.next_address(), "lowered while loop");
            }
            Stat::Do(body) => emit_scoped(body, ctx),
        }
    }
}

fn emit_if(branches: &[(Expr, Block)], else_block: Option<&Block>, ctx: &mut CompilationContext) {
    let start = ctx.next_address();
    let mut end_jumps = Vec::with_capacity(branches.len());

    for (cond, block) in branches {
        cond.emit(ctx);
        let next_branch = ctx.emit_jump(Opcode::JumpNeg);
        emit_scoped(block, ctx);
        end_jumps.push(ctx.emit_jump(Opcode::Jump));
        ctx.patch_here(next_branch);
    }

    if let Some(block) = else_block {
        emit_scoped(block, ctx);
    }

    let end = ctx.next_address();
    for site in end_jumps {
        ctx.patch(site, end);
    }
    trace!(start, end, branches = branches.len(), "lowered conditional");
}

fn emit_numeric_for(
    var: &str,
    start: &Expr,
    end: &Expr,
    step: Option<&Expr>,
    body: &Block,
    ctx: &mut CompilationContext,
) {
    ctx.emit(Instruction::bare(Opcode::BeginScope));
    ctx.emit(Instruction::named(Opcode::DeclareLocal, var));
    start.emit(ctx);
    ctx.emit(Instruction::named(Opcode::Assign, var));

    let iteration = ctx.next_address();
    ctx.emit(Instruction::push(var));
    end.emit(ctx);
    ctx.emit(Instruction::bare(Opcode::CmpGt));
    let exit = ctx.emit_jump(Opcode::JumpPos);

    emit_scoped(body, ctx);

    match step {
        Some(step) => step.emit(ctx),
        None => {
            ctx.emit(Instruction::push_literal(&Literal::Number(1.0)));
        }
    }
    ctx.emit(Instruction::push(var));
    ctx.emit(Instruction::bare(Opcode::Sum));
    ctx.emit(Instruction::named(Opcode::Assign, var));
    ctx.emit_jump_to(Opcode::Jump, iteration);

    ctx.patch_here(exit);
    ctx.emit(Instruction::bare(Opcode::EndScope));
    trace!(var, iteration, "lowered numeric for");
}

impl Emit for FunctionDecl {
    fn emit(&self, ctx: &mut CompilationContext) {
        let at = ctx.emit(Instruction::function(self.name.as_str(), self.params.len()));
        ctx.enter_function(&self.name);

        ctx.emit(Instruction::bare(Opcode::BeginScope));
        for param in &self.params {
            ctx.emit(Instruction::named(Opcode::DeclareLocal, param.as_str()));
        }
        emit_assign_reversed(&self.params, ctx);

        self.body.emit(ctx);
        if !self.body.ends_with_return() {
            emit_nil_return(ctx);
        }
        ctx.emit(Instruction::bare(Opcode::EndScope));

        ctx.exit_function();
        trace!(name = %self.name, at, local = self.local, "lowered function");
    }
}

impl Emit for Call {
    fn emit(&self, ctx: &mut CompilationContext) {
        for arg in &self.args {
            arg.emit(ctx);
        }
        self.callee.emit(ctx);
        ctx.emit(Instruction::with_int(Opcode::Call, self.args.len() as i64));
    }
}

impl Emit for Expr {
    fn emit(&self, ctx: &mut CompilationContext) {
        let literal = match self {
            Expr::Nil => Literal::Nil,
            Expr::True => Literal::Boolean(true),
            Expr::False => Literal::Boolean(false),
            Expr::Number(n) => Literal::Number(*n),
            Expr::Str(s) => Literal::String(s.clone()),
            Expr::Name(name) => Literal::Name(name.clone()),
            Expr::Call(call) => return call.emit(ctx),
            Expr::Binary { op, lhs, rhs } => {
                lhs.emit(ctx);
                rhs.emit(ctx);
                ctx.emit(Instruction::bare(op.opcode()));
                return;
            }
            Expr::Unary { op, operand } => {
                operand.emit(ctx);
                ctx.emit(Instruction::bare(op.opcode()));
                return;
            }
        };
        ctx.emit(Instruction::push_literal(&literal));
    }
}

impl BinOp {
    pub fn opcode(self) -> Opcode {
        match self {
            BinOp::Add => Opcode::Sum,
            BinOp::Sub => Opcode::Subtract,
            BinOp::Mul => Opcode::Multiply,
            BinOp::Div => Opcode::Divide,
            BinOp::Concat => Opcode::Concat,
            BinOp::Eq => Opcode::CmpEq,
            BinOp::Ne => Opcode::CmpNe,
            BinOp::Lt => Opcode::CmpLt,
            BinOp::Le => Opcode::CmpLe,
            BinOp::Gt => Opcode::CmpGt,
            BinOp::Ge => Opcode::CmpGe,
            BinOp::And => Opcode::BooleanAnd,
            BinOp::Or => Opcode::BooleanOr,
        }
    }
}

impl UnOp {
    pub fn opcode(self) -> Opcode {
        match self {
            UnOp::Neg => Opcode::Minus,
            UnOp::Not => Opcode::BooleanNot,
        }
    }
}
