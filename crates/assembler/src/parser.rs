//! Parser for listing lines → instructions.
//!
//! Operands are read according to [`Opcode::arg_kinds`]. `PUSH` is the one
//! exception: its single operand is the rest of the line verbatim, since a
//! string literal may contain spaces.

use crate::error::AsmError;
use crate::lexer::LineTokens;
use moonlet_common::{Arg, ArgKind, Instruction, Opcode};

/// Parse one tokenized line into an instruction.
pub(crate) fn parse_line(tokens: &LineTokens<'_>, line_num: usize) -> Result<Instruction, AsmError> {
    let opcode = Opcode::from_mnemonic(&tokens.mnemonic.to_ascii_uppercase()).ok_or_else(|| {
        AsmError::UnknownOpcode {
            line: line_num,
            token: tokens.mnemonic.to_string(),
        }
    })?;

    let kinds = opcode.arg_kinds();
    let missing = || AsmError::MissingArgument {
        line: line_num,
        opcode: opcode.mnemonic(),
        expected: kinds.len(),
    };

    if opcode == Opcode::Push {
        if tokens.rest.is_empty() {
            return Err(missing());
        }
        return Ok(Instruction::push(tokens.rest));
    }

    let words: Vec<&str> = tokens.rest.split_whitespace().collect();
    if words.len() < kinds.len() {
        return Err(missing());
    }
    if let Some(extra) = words.get(kinds.len()) {
        return Err(AsmError::UnexpectedToken {
            line: line_num,
            token: extra.to_string(),
        });
    }

    let args = words
        .iter()
        .zip(kinds)
        .map(|(word, kind)| match kind {
            ArgKind::Str => Ok(Arg::Str(word.to_string())),
            ArgKind::Int => word
                .parse::<i64>()
                .map(Arg::Int)
                .map_err(|_| AsmError::InvalidNumber {
                    line: line_num,
                    token: word.to_string(),
                }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Instruction::new(opcode, args))
}
