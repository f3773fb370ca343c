//! Moonlet compiler: Lua-subset source to bytecode.
//!
//! Compilation runs in three stages:
//!
//! 1. [`lexer::tokenize`] turns source text into line-numbered tokens
//! 2. [`parser::parse`] builds the [`ast::Block`] for the whole chunk
//! 3. [`codegen::Emit`] lowers the tree into a [`Program`], backpatching
//!    forward jumps through the [`CompilationContext`]
//!
//! # Usage
//!
//! ```
//! use moonlet_compiler::compile;
//!
//! let program = compile("local a = 1\nb = a + 2").unwrap();
//! assert_eq!(program.instructions[0].to_string(), "DECLARE_LOCAL a");
//! ```

pub mod ast;
pub mod codegen;
pub mod context;
pub mod error;
pub mod lexer;
pub mod parser;

pub use codegen::Emit;
pub use context::{CompilationContext, PatchSite};
pub use error::CompileError;

use moonlet_common::Program;
use tracing::debug;

/// Compile a chunk of source text into a program.
///
/// # Errors
///
/// Returns the first [`CompileError`] found: unknown input, a syntax error,
/// `return` outside a function, or a construct outside the supported subset.
#[tracing::instrument(level = "debug", skip_all, fields(bytes = source.len()))]
pub fn compile(source: &str) -> Result<Program, CompileError> {
    let tokens = lexer::tokenize(source)?;
    debug!(tokens = tokens.len(), "lexed");

    let chunk = parser::parse(tokens)?;
    debug!(statements = chunk.stats.len(), "parsed");

    let mut ctx = CompilationContext::new();
    chunk.emit(&mut ctx);
    let program = ctx.into_program();
    debug!(instructions = program.len(), "generated");

    Ok(program)
}
