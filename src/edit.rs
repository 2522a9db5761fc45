use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// What an edit does at its target line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditAction {
    /// Overwrite the target line with the new content
    Replace,
    /// Place the new content before the target line, shifting it down
    Insert,
}

impl EditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditAction::Replace => "replace",
            EditAction::Insert => "insert",
        }
    }
}

impl fmt::Display for EditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditAction {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace" => Ok(EditAction::Replace),
            "insert" => Ok(EditAction::Insert),
            other => Err(EditError::InvalidAction {
                action: other.to_string(),
            }),
        }
    }
}

/// A single structured edit as it arrives on the wire.
///
/// The action is kept as a raw string so that an unknown action surfaces as a
/// validation error carrying the offending instruction, not a decode failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditInstruction {
    /// `"replace"` or `"insert"`
    pub action: String,
    /// 1-based target line
    pub line_number: i64,
    /// Content to write; may span several lines
    pub new_content: String,
}

impl EditInstruction {
    pub fn new(action: EditAction, line_number: i64, new_content: impl Into<String>) -> Self {
        Self {
            action: action.as_str().to_string(),
            line_number,
            new_content: new_content.into(),
        }
    }

    pub fn replace(line_number: i64, new_content: impl Into<String>) -> Self {
        Self::new(EditAction::Replace, line_number, new_content)
    }

    pub fn insert(line_number: i64, new_content: impl Into<String>) -> Self {
        Self::new(EditAction::Insert, line_number, new_content)
    }

    /// Check this instruction against a file of `line_count` lines.
    ///
    /// Inserts may target `1..=line_count + 1` (the last slot appends).
    /// Replaces must target an existing line.
    pub fn validate(&self, line_count: usize) -> Result<Edit, EditError> {
        let action: EditAction = self.action.parse()?;

        let max = match action {
            EditAction::Insert => line_count + 1,
            EditAction::Replace => line_count,
        };

        let line = usize::try_from(self.line_number)
            .ok()
            .filter(|n| (1..=max).contains(n))
            .ok_or(EditError::InvalidLineNumber {
                line_number: self.line_number,
                action,
                line_count,
            })?;

        Ok(Edit {
            line,
            action,
            content: self.new_content.clone(),
        })
    }
}

/// Structured edit request for one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEditRequest {
    pub file_path: PathBuf,
    pub edits: Vec<EditInstruction>,
}

impl FileEditRequest {
    pub fn new(file_path: impl Into<PathBuf>, edits: Vec<EditInstruction>) -> Self {
        Self {
            file_path: file_path.into(),
            edits,
        }
    }

    pub fn from_json(input: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(input)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("invalid action {action:?} (expected \"replace\" or \"insert\")")]
    InvalidAction { action: String },

    #[error("invalid line number {line_number} for {action} (file has {line_count} lines)")]
    InvalidLineNumber {
        line_number: i64,
        action: EditAction,
        line_count: usize,
    },
}

/// A validated edit: the unit every edit representation lowers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    /// 1-based target position
    pub line: usize,
    pub action: EditAction,
    pub content: String,
}

impl Edit {
    pub fn new(line: usize, action: EditAction, content: impl Into<String>) -> Self {
        Self {
            line,
            action,
            content: content.into(),
        }
    }
}

/// Edits ordered by target line. Equal targets keep their input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    pub fn new(mut edits: Vec<Edit>) -> Self {
        // sort_by_key is stable
        edits.sort_by_key(|edit| edit.line);
        Self { edits }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Edit> {
        self.edits.iter()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Apply the set to `lines` and return the resulting line sequence.
    pub fn merge<'a>(&'a self, lines: &[&'a str], addressing: Addressing) -> Vec<&'a str> {
        merge(lines, self, addressing)
    }
}

impl<'a> IntoIterator for &'a EditSet {
    type Item = &'a Edit;
    type IntoIter = std::slice::Iter<'a, Edit>;

    fn into_iter(self) -> Self::IntoIter {
        self.edits.iter()
    }
}

/// How an edit's line number is interpreted by [`merge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// Line numbers name positions in the unedited input. Edits never
    /// disturb each other's targets. Used by structured edit requests.
    Original,
    /// Line numbers name positions in the output. Every emitted edit takes
    /// one slot and pushes the remaining input down; gaps past the end are
    /// padded with blank lines. Used by adding patches.
    Output,
}

/// Single forward cursor merge of `edits` into `lines`.
///
/// Each edit's content is emitted as one element; multi-line content expands
/// when the result is joined. Edits whose target is already behind the
/// cursor are emitted at the current position.
pub fn merge<'a>(lines: &[&'a str], edits: &'a EditSet, addressing: Addressing) -> Vec<&'a str> {
    let mut out = Vec::with_capacity(lines.len() + edits.len());
    let mut pending = edits.iter().peekable();
    let mut originals = lines.iter().copied();
    let mut slot = 1usize;
    let mut replaced = false;

    loop {
        if let Some(edit) = pending.next_if(|edit| edit.line <= slot) {
            out.push(edit.content.as_str());
            match addressing {
                Addressing::Output => slot += 1,
                Addressing::Original => replaced |= edit.action == EditAction::Replace,
            }
            continue;
        }

        match originals.next() {
            Some(line) => {
                if !replaced {
                    out.push(line);
                }
                replaced = false;
                slot += 1;
            }
            None if pending.peek().is_none() => break,
            None => {
                if addressing == Addressing::Output {
                    out.push("");
                }
                slot += 1;
            }
        }
    }

    out
}
