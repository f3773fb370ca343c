//! Line splitter for listing text.
//!
//! A listing line is `[N:] OPCODE [operands]`. Blank lines and lines whose
//! first non-blank character is `;` carry no instruction. Comments are not
//! stripped elsewhere because `;` may appear inside a PUSH string.

use crate::error::AsmError;

/// The pieces of one instruction line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineTokens<'a> {
    /// The `N:` address prefix, if present.
    pub address: Option<usize>,
    pub mnemonic: &'a str,
    /// Everything after the mnemonic, trimmed.
    pub rest: &'a str,
}

/// Split a single line of listing text.
///
/// Returns `Ok(None)` for blank and comment-only lines.
pub(crate) fn tokenize_line(line: &str, line_num: usize) -> Result<Option<LineTokens<'_>>, AsmError> {
    let mut text = line.trim();
    if text.is_empty() || text.starts_with(';') {
        return Ok(None);
    }

    let mut address = None;
    if let Some((prefix, after)) = text.split_once(':') {
        if !prefix.is_empty() && prefix.bytes().all(|b| b.is_ascii_digit()) {
            let value = prefix.parse().map_err(|_| AsmError::InvalidNumber {
                line: line_num,
                token: prefix.to_string(),
            })?;
            address = Some(value);
            text = after.trim_start();
        }
    }

    let (mnemonic, rest) = match text.split_once(char::is_whitespace) {
        Some((mnemonic, rest)) => (mnemonic, rest.trim()),
        None => (text, ""),
    };

    if mnemonic.is_empty() {
        return Err(AsmError::UnexpectedToken {
            line: line_num,
            token: line.trim().to_string(),
        });
    }

    Ok(Some(LineTokens {
        address,
        mnemonic,
        rest,
    }))
}
