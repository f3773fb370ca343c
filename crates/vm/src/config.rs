//! Execution limits and scoping mode.

/// Default operand stack limit.
pub const MAX_STACK_DEPTH: usize = 4096;

/// Default limit on nested custom-function calls.
pub const MAX_CALL_DEPTH: usize = 1024;

/// Which scope a function body's root scope descends from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scoping {
    /// The scope the function was declared in (closures).
    #[default]
    Lexical,
    /// The caller's current scope at the moment of the call.
    Dynamic,
}

/// VM configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmConfig {
    pub max_stack_depth: usize,
    pub max_call_depth: usize,
    pub scoping: Scoping,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_stack_depth: MAX_STACK_DEPTH,
            max_call_depth: MAX_CALL_DEPTH,
            scoping: Scoping::Lexical,
        }
    }
}

impl VmConfig {
    pub fn with_scoping(mut self, scoping: Scoping) -> Self {
        self.scoping = scoping;
        self
    }

    pub fn with_max_call_depth(mut self, limit: usize) -> Self {
        self.max_call_depth = limit;
        self
    }

    pub fn with_max_stack_depth(mut self, limit: usize) -> Self {
        self.max_stack_depth = limit;
        self
    }
}
