//! Syntax tree for the supported Lua subset.

/// A sequence of statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stats: Vec<Stat>,
}

impl Block {
    pub fn new(stats: Vec<Stat>) -> Self {
        Self { stats }
    }

    /// True if the last statement is a `return`.
    pub fn ends_with_return(&self) -> bool {
        matches!(self.stats.last(), Some(Stat::Return(_)))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stat {
    /// `a, b = e1, e2`
    Assign { targets: Vec<String>, values: Vec<Expr> },
    /// `local a, b = e1, e2`
    Local { names: Vec<String>, values: Vec<Expr> },
    /// A call whose results are discarded.
    Call(Call),
    /// `function f(...) ... end` and `local function f(...) ... end`
    Function(FunctionDecl),
    Return(Vec<Expr>),
    If {
        /// `if`/`elseif` conditions with their blocks, in source order.
        branches: Vec<(Expr, Block)>,
        else_block: Option<Block>,
    },
    /// `for var = start, end [, step] do ... end`
    NumericFor {
        var: String,
        start: Expr,
        end: Expr,
        step: Option<Expr>,
        body: Block,
    },
    While { cond: Expr, body: Block },
    Do(Block),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Vec<String>,
    pub body: Block,
    pub local: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Nil,
    True,
    False,
    Number(f64),
    Str(String),
    Name(String),
    Call(Call),
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary { op: UnOp, operand: Box<Expr> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Concat,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinOp {
    /// Left and right binding power. Right below left means right-associative.
    pub fn priority(self) -> (u8, u8) {
        match self {
            BinOp::Or => (1, 1),
            BinOp::And => (2, 2),
            BinOp::Eq | BinOp::Ne | BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => (3, 3),
            BinOp::Concat => (9, 8),
            BinOp::Add | BinOp::Sub => (10, 10),
            BinOp::Mul | BinOp::Div => (11, 11),
        }
    }
}

/// Binding power of unary operators.
pub const UNARY_PRIORITY: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Not,
}
