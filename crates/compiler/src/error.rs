//! Compile errors. Every variant carries the 1-based source line.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Input the lexer could not turn into a token.
    #[error("line {line}: unexpected input '{text}'")]
    Lex { line: usize, text: String },

    #[error("line {line}: expected {expected}, found {found}")]
    Expected {
        line: usize,
        expected: &'static str,
        found: String,
    },

    /// The left side of `=` was not a plain name.
    #[error("line {line}: cannot assign to this expression")]
    InvalidAssignmentTarget { line: usize },

    /// An expression used as a statement that is not a call.
    #[error("line {line}: syntax error near {found}: expected a call or an assignment")]
    NotAStatement { line: usize, found: String },

    #[error("line {line}: 'return' outside of a function")]
    ReturnOutsideFunction { line: usize },

    #[error("line {line}: {feature} are not supported")]
    Unsupported { line: usize, feature: &'static str },

    /// Blocks or expressions nested beyond the parser's limit.
    #[error("line {line}: nesting is too deep (limit {limit})")]
    TooDeep { line: usize, limit: usize },

    /// An argument, parameter or return list longer than one instruction can carry.
    #[error("line {line}: too many {what} (limit {limit})")]
    TooMany {
        line: usize,
        what: &'static str,
        limit: usize,
    },
}

impl CompileError {
    pub fn line(&self) -> usize {
        match self {
            CompileError::Lex { line, .. }
            | CompileError::Expected { line, .. }
            | CompileError::InvalidAssignmentTarget { line }
            | CompileError::NotAStatement { line, .. }
            | CompileError::ReturnOutsideFunction { line }
            | CompileError::Unsupported { line, .. }
            | CompileError::TooDeep { line, .. }
            | CompileError::TooMany { line, .. } => *line,
        }
    }
}
