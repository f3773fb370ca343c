//! Moonlet assembler: listing text ↔ program.
//!
//! The listing is the canonical human-readable form of a program: one
//! `address:\t OPCODE operands` line per instruction.
//!
//! # Usage
//!
//! ```
//! use moonlet_assembler::{assemble, listing};
//! use moonlet_common::{Instruction, Opcode, Program};
//!
//! let program = Program::new(vec![
//!     Instruction::push("\"hi\""),
//!     Instruction::named(Opcode::Assign, "greeting"),
//! ]);
//! let text = listing(&program).unwrap();
//! assert_eq!(text, "0:\t PUSH \"hi\"\n1:\t ASSIGN greeting\n");
//! assert_eq!(assemble(&text).unwrap(), program);
//! ```
//!
//! # Roundtrip Guarantee
//!
//! `assemble(listing(program)) == program` for every well-shaped program
//! whose string operands contain no whitespace (PUSH excepted). The
//! assembler also accepts lines without the address prefix, blank lines and
//! `;` comment lines.

pub mod error;

mod lexer;
mod parser;

pub use error::AsmError;

use lexer::tokenize_line;
use moonlet_common::{OpcodeValidationError, Program};
use parser::parse_line;

/// Render the canonical listing, checking every instruction's shape first.
pub fn listing(program: &Program) -> Result<String, OpcodeValidationError> {
    program.check_shapes()?;
    Ok(program.to_string())
}

/// Parse listing text into a program.
///
/// Returns the first error encountered. Fix one error at a time.
pub fn assemble(text: &str) -> Result<Program, AsmError> {
    let mut instructions = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let Some(tokens) = tokenize_line(line, line_num)? else {
            continue;
        };

        if let Some(found) = tokens.address {
            if found != instructions.len() {
                return Err(AsmError::AddressMismatch {
                    line: line_num,
                    expected: instructions.len(),
                    found,
                });
            }
        }

        instructions.push(parse_line(&tokens, line_num)?);
    }

    Ok(Program::new(instructions))
}

/// Hex blake3 digest of the canonical listing.
///
/// Two compilations of the same source produce the same fingerprint.
pub fn fingerprint(program: &Program) -> String {
    blake3::hash(program.to_string().as_bytes())
        .to_hex()
        .to_string()
}
