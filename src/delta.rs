//! Compact character deltas between two texts.
//!
//! A delta is a tab-separated list of operations against the source text:
//!
//! - `=N` keep the next `N` characters
//! - `-N` drop the next `N` characters
//! - `+text` insert `text` (`%`, tab, CR and LF are percent-escaped)
//!
//! Counts are in Unicode scalar values. Diffing is done by [`similar`].

use similar::{DiffTag, TextDiff};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeltaError {
    #[error("invalid delta operation {0:?}")]
    InvalidOperation(String),

    #[error("invalid escape in delta insert {0:?}")]
    InvalidEscape(String),

    #[error("delta covers {covered} characters but the source has {source_len}")]
    LengthMismatch { covered: usize, source_len: usize },
}

/// Encode the changes that turn `old` into `new`.
pub fn generate_delta(old: &str, new: &str) -> String {
    let diff = TextDiff::from_chars(old, new);
    let new_chars: Vec<char> = new.chars().collect();
    let mut ops: Vec<String> = Vec::new();

    for op in diff.ops() {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => ops.push(format!("={}", old_range.len())),
            DiffTag::Delete => ops.push(format!("-{}", old_range.len())),
            DiffTag::Insert => ops.push(format!("+{}", escape(&new_chars[new_range]))),
            DiffTag::Replace => {
                ops.push(format!("-{}", old_range.len()));
                ops.push(format!("+{}", escape(&new_chars[new_range])));
            }
        }
    }

    ops.join("\t")
}

/// Rebuild the target text from `old` and a delta produced by
/// [`generate_delta`] against the same `old`.
pub fn apply_delta(old: &str, delta: &str) -> Result<String, DeltaError> {
    let source: Vec<char> = old.chars().collect();
    let mut out = String::with_capacity(old.len());
    let mut pos = 0usize;

    if !delta.is_empty() {
        for token in delta.split('\t') {
            let mut chars = token.chars();
            let op = chars.next();
            let rest = chars.as_str();
            match op {
                Some('+') => out.push_str(&unescape(rest)?),
                Some(op @ ('=' | '-')) => {
                    let count: usize = rest
                        .parse()
                        .map_err(|_| DeltaError::InvalidOperation(token.to_string()))?;
                    let end = pos
                        .checked_add(count)
                        .filter(|&end| end <= source.len())
                        .ok_or(DeltaError::LengthMismatch {
                            covered: pos.saturating_add(count),
                            source_len: source.len(),
                        })?;
                    if op == '=' {
                        out.extend(&source[pos..end]);
                    }
                    pos = end;
                }
                _ => return Err(DeltaError::InvalidOperation(token.to_string())),
            }
        }
    }

    if pos != source.len() {
        return Err(DeltaError::LengthMismatch {
            covered: pos,
            source_len: source.len(),
        });
    }
    Ok(out)
}

fn escape(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len());
    for &c in chars {
        match c {
            '%' => out.push_str("%25"),
            '\t' => out.push_str("%09"),
            '\n' => out.push_str("%0A"),
            '\r' => out.push_str("%0D"),
            c => out.push(c),
        }
    }
    out
}

fn unescape(text: &str) -> Result<String, DeltaError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find('%') {
        out.push_str(&rest[..idx]);
        let code = rest
            .get(idx + 1..idx + 3)
            .and_then(|hex| u8::from_str_radix(hex, 16).ok())
            .filter(u8::is_ascii)
            .ok_or_else(|| DeltaError::InvalidEscape(text.to_string()))?;
        out.push(char::from(code));
        rest = &rest[idx + 3..];
    }
    out.push_str(rest);
    Ok(out)
}
