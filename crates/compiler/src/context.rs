//! Instruction buffer with backpatching for forward jumps.

use moonlet_common::{Arg, Instruction, Opcode, Program};

/// Jump operand emitted before the target is known.
const UNPATCHED: i64 = -1;

/// A jump emitted with a placeholder target, to be fixed by
/// [`CompilationContext::patch`].
#[derive(Debug)]
#[must_use = "an unpatched jump leaves a -1 target in the program"]
pub struct PatchSite(usize);

/// The program being generated.
#[derive(Debug, Default)]
pub struct CompilationContext {
    instructions: Vec<Instruction>,
    /// Enclosing function names, innermost last. Only used for tracing.
    functions: Vec<String>,
}

impl CompilationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instruction and return its address.
    pub fn emit(&mut self, instr: Instruction) -> usize {
        let at = self.instructions.len();
        tracing::trace!(at, %instr, function = self.functions.last().map(String::as_str), "emit");
        self.instructions.push(instr);
        at
    }

    /// Address of the most recently emitted instruction.
    pub fn current_address(&self) -> Option<usize> {
        self.instructions.len().checked_sub(1)
    }

    /// Address the next emitted instruction will get.
    pub fn next_address(&self) -> usize {
        self.instructions.len()
    }

    /// Emit a jump to an already-known address.
    pub fn emit_jump_to(&mut self, opcode: Opcode, target: usize) -> usize {
        debug_assert!(opcode.is_jump());
        self.emit(Instruction::with_int(opcode, target as i64))
    }

    /// Emit a forward jump whose target is patched later.
    pub fn emit_jump(&mut self, opcode: Opcode) -> PatchSite {
        debug_assert!(opcode.is_jump());
        PatchSite(self.emit(Instruction::with_int(opcode, UNPATCHED)))
    }

    /// Point a previously emitted jump at `target`.
    pub fn patch(&mut self, site: PatchSite, target: usize) {
        let instr = &mut self.instructions[site.0];
        debug_assert_eq!(instr.int_arg(0), Some(UNPATCHED), "jump patched twice");
        instr.args[0] = Arg::Int(target as i64);
    }

    /// Point a previously emitted jump at the next address.
    pub fn patch_here(&mut self, site: PatchSite) {
        let target = self.next_address();
        self.patch(site, target);
    }

    pub fn enter_function(&mut self, name: &str) {
        self.functions.push(name.to_string());
    }

    pub fn exit_function(&mut self) {
        self.functions.pop();
    }

    pub fn into_program(self) -> Program {
        Program::new(self.instructions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses() {
        let mut ctx = CompilationContext::new();
        assert_eq!(ctx.current_address(), None);
        assert_eq!(ctx.next_address(), 0);
        assert_eq!(ctx.emit(Instruction::push("1")), 0);
        assert_eq!(ctx.current_address(), Some(0));
        assert_eq!(ctx.next_address(), 1);
    }

    #[test]
    fn forward_jump_is_patched() {
        let mut ctx = CompilationContext::new();
        let site = ctx.emit_jump(Opcode::JumpNeg);
        ctx.emit(Instruction::push("1"));
        ctx.emit(Instruction::bare(Opcode::Pop));
        ctx.patch_here(site);

        let program = ctx.into_program();
        assert_eq!(
            program.instructions[0],
            Instruction::with_int(Opcode::JumpNeg, 3)
        );
    }

    #[test]
    fn backward_jump() {
        let mut ctx = CompilationContext::new();
        let top = ctx.next_address();
        ctx.emit(Instruction::push("x"));
        ctx.emit_jump_to(Opcode::Jump, top);
        assert_eq!(
            ctx.into_program().instructions[1],
            Instruction::with_int(Opcode::Jump, 0)
        );
    }
}
