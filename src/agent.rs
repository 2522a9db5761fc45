//! Applying change suggestions produced by an automated agent.

use crate::delta::{apply_delta, generate_delta, DeltaError};
use crate::fs::{atomic_write, read_file};
use crate::patch::{apply_patch, PatchError, PatchType};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A proposed change to one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub file_path: PathBuf,
    #[serde(flatten)]
    pub change: SuggestedChange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuggestedChange {
    /// Full replacement content. Applied through a character delta so the
    /// write only happens if the delta reproduces the suggestion exactly.
    WholeFile { new_content: String },
    /// A JSON line-map patch
    LineChanges {
        line_changes: String,
        #[serde(default)]
        patch_type: PatchType,
    },
}

impl Suggestion {
    pub fn whole_file(file_path: impl Into<PathBuf>, new_content: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            change: SuggestedChange::WholeFile {
                new_content: new_content.into(),
            },
        }
    }

    pub fn line_changes(
        file_path: impl Into<PathBuf>,
        line_changes: impl Into<String>,
        patch_type: PatchType,
    ) -> Self {
        Self {
            file_path: file_path.into(),
            change: SuggestedChange::LineChanges {
                line_changes: line_changes.into(),
                patch_type,
            },
        }
    }
}

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file {path} is not valid UTF-8")]
    NotUtf8 { path: PathBuf },

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error(transparent)]
    Delta(#[from] DeltaError),

    #[error("delta for {path} did not reproduce the suggested content")]
    DeltaMismatch { path: PathBuf },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Apply a suggestion to its file and return the new content.
///
/// Nothing is written unless the new content was computed successfully.
pub fn apply_suggestion(suggestion: &Suggestion) -> Result<String, AgentError> {
    let path = &suggestion.file_path;
    let bytes = read_file(path).map_err(|source| AgentError::Read {
        path: path.clone(),
        source,
    })?;
    let original =
        String::from_utf8(bytes).map_err(|_| AgentError::NotUtf8 { path: path.clone() })?;

    let updated = match &suggestion.change {
        SuggestedChange::WholeFile { new_content } => {
            let delta = generate_delta(&original, new_content);
            let patched = apply_delta(&original, &delta)?;
            if &patched != new_content {
                return Err(AgentError::DeltaMismatch { path: path.clone() });
            }
            patched
        }
        SuggestedChange::LineChanges {
            line_changes,
            patch_type,
        } => apply_patch(&original, line_changes, *patch_type)?,
    };

    atomic_write(path, updated.as_bytes()).map_err(|source| AgentError::Write {
        path: path.clone(),
        source,
    })?;

    tracing::info!(path = %path.display(), "suggestion applied");
    Ok(updated)
}
