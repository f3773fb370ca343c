//! Opcode definitions for the Moonlet instruction set.
//!
//! Each opcode declares the shape of its operand list (see [`ArgKind`]).
//! The shape is what the validator checks and what the listing parser uses
//! to decode operands back from text.

/// The kind of a single instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    /// A string operand: a name, or a PUSH literal.
    Str,
    /// An integer operand: an address or a count.
    Int,
}

impl ArgKind {
    /// Human-readable name used in error messages.
    pub fn name(&self) -> &'static str {
        match self {
            ArgKind::Str => "string",
            ArgKind::Int => "integer",
        }
    }
}

/// Identifies the operation to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Stack & bindings
    /// Push a literal value, or an identifier placeholder for a name.
    Push,
    /// Discard the top of the operand stack.
    Pop,
    /// Pop and resolve a value, assign it to the named binding.
    Assign,
    /// Declare a `nil` binding in the innermost scope.
    DeclareLocal,

    // Arithmetic & concatenation
    /// Pop right, pop left, push `left + right`.
    Sum,
    /// Pop right, pop left, push `left - right`.
    Subtract,
    /// Pop right, pop left, push `left * right`.
    Multiply,
    /// Pop right, pop left, push `left / right`.
    Divide,
    /// Pop right, pop left, push `left .. right`.
    Concat,

    // Logic & comparison
    /// Pop right, pop left, push `left and right`.
    BooleanAnd,
    /// Pop right, pop left, push `left or right`.
    BooleanOr,
    /// Pop right, pop left, push `left == right`.
    CmpEq,
    /// Pop right, pop left, push `left ~= right`.
    CmpNe,
    /// Pop right, pop left, push `left < right`.
    CmpLt,
    /// Pop right, pop left, push `left > right`.
    CmpGt,
    /// Pop right, pop left, push `left <= right`.
    CmpLe,
    /// Pop right, pop left, push `left >= right`.
    CmpGe,

    // Unary
    /// Pop one value, push its numeric negation.
    Minus,
    /// Pop one value, push its boolean negation.
    BooleanNot,

    // Functions
    /// Pop the callee and `arg1` arguments, invoke.
    Call,
    /// Return `arg1` values to the caller.
    Return,
    /// Declare a function named `arg1` taking `arg2` parameters; skip its body.
    Function,

    // Scopes
    /// Push a nested scope onto the current call context.
    BeginScope,
    /// Pop the innermost scope of the current call context.
    EndScope,

    // Control flow
    /// Jump to address `arg1`.
    Jump,
    /// Pop the test value, jump to `arg1` if it is falsy.
    JumpNeg,
    /// Pop the test value, jump to `arg1` if it is truthy.
    JumpPos,
}

/// Largest CALL/RETURN argument count and FUNCTION parameter count.
pub const MAX_COUNT: i64 = 255;

/// All opcodes, in definition order. Useful for exhaustive testing.
pub const ALL_OPCODES: [Opcode; 27] = [
    Opcode::Push,
    Opcode::Pop,
    Opcode::Assign,
    Opcode::DeclareLocal,
    Opcode::Sum,
    Opcode::Subtract,
    Opcode::Multiply,
    Opcode::Divide,
    Opcode::Concat,
    Opcode::BooleanAnd,
    Opcode::BooleanOr,
    Opcode::CmpEq,
    Opcode::CmpNe,
    Opcode::CmpLt,
    Opcode::CmpGt,
    Opcode::CmpLe,
    Opcode::CmpGe,
    Opcode::Minus,
    Opcode::BooleanNot,
    Opcode::Call,
    Opcode::Return,
    Opcode::Function,
    Opcode::BeginScope,
    Opcode::EndScope,
    Opcode::Jump,
    Opcode::JumpNeg,
    Opcode::JumpPos,
];

impl Opcode {
    /// Returns the listing mnemonic for this opcode.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Assign => "ASSIGN",
            Opcode::DeclareLocal => "DECLARE_LOCAL",
            Opcode::Sum => "SUM",
            Opcode::Subtract => "SUBTRACT",
            Opcode::Multiply => "MULTIPLY",
            Opcode::Divide => "DIVIDE",
            Opcode::Concat => "CONCAT",
            Opcode::BooleanAnd => "BOOLEAN_AND",
            Opcode::BooleanOr => "BOOLEAN_OR",
            Opcode::CmpEq => "CMP_EQ",
            Opcode::CmpNe => "CMP_NE",
            Opcode::CmpLt => "CMP_LT",
            Opcode::CmpGt => "CMP_GT",
            Opcode::CmpLe => "CMP_LE",
            Opcode::CmpGe => "CMP_GE",
            Opcode::Minus => "MINUS",
            Opcode::BooleanNot => "BOOLEAN_NOT",
            Opcode::Call => "CALL",
            Opcode::Return => "RETURN",
            Opcode::Function => "FUNCTION",
            Opcode::BeginScope => "BEGIN_SCOPE",
            Opcode::EndScope => "END_SCOPE",
            Opcode::Jump => "JUMP",
            Opcode::JumpNeg => "JUMP_NEG",
            Opcode::JumpPos => "JUMP_POS",
        }
    }

    /// Look up an opcode by its mnemonic. Case-sensitive.
    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        ALL_OPCODES
            .iter()
            .find(|op| op.mnemonic() == mnemonic)
            .copied()
    }

    /// The operand shape this opcode requires.
    pub fn arg_kinds(&self) -> &'static [ArgKind] {
        match self {
            Opcode::Push | Opcode::Assign | Opcode::DeclareLocal => &[ArgKind::Str],
            Opcode::Call
            | Opcode::Return
            | Opcode::Jump
            | Opcode::JumpNeg
            | Opcode::JumpPos => &[ArgKind::Int],
            Opcode::Function => &[ArgKind::Str, ArgKind::Int],
            Opcode::Pop
            | Opcode::Sum
            | Opcode::Subtract
            | Opcode::Multiply
            | Opcode::Divide
            | Opcode::Concat
            | Opcode::BooleanAnd
            | Opcode::BooleanOr
            | Opcode::CmpEq
            | Opcode::CmpNe
            | Opcode::CmpLt
            | Opcode::CmpGt
            | Opcode::CmpLe
            | Opcode::CmpGe
            | Opcode::Minus
            | Opcode::BooleanNot
            | Opcode::BeginScope
            | Opcode::EndScope => &[],
        }
    }

    /// True for opcodes whose integer operand is an instruction address.
    pub fn is_jump(&self) -> bool {
        matches!(self, Opcode::Jump | Opcode::JumpNeg | Opcode::JumpPos)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
