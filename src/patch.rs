//! Line-map patches: `{"<line>": "<content>", ...}` applied to file content.
//!
//! Two semantics share the same wire format:
//!
//! - [`PatchType::Replacing`] overwrites the keyed lines in place.
//! - [`PatchType::Adding`] inserts each entry so it lands at its keyed line in
//!   the output, pushing everything after it down.
//!
//! A patch is decoded in full before any line is touched, so a malformed
//! patch never yields partial output.

use crate::edit::{Addressing, Edit, EditAction, EditSet};
use crate::lines::{from_line_map, join_lines, parse_line_key, split_lines, to_line_map, LineMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Patch semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchType {
    #[default]
    Replacing,
    Adding,
}

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("malformed patch JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid line key {key:?} in adding patch")]
    InvalidLineKey { key: String },
}

/// Decode a patch object. Values must be strings.
pub fn parse_patch(patch_json: &str) -> Result<LineMap, PatchError> {
    Ok(serde_json::from_str(patch_json)?)
}

/// Decode `patch_json` and apply it to `original` under `patch_type`.
pub fn apply_patch(
    original: &str,
    patch_json: &str,
    patch_type: PatchType,
) -> Result<String, PatchError> {
    let patch = parse_patch(patch_json)?;
    match patch_type {
        PatchType::Replacing => Ok(apply_replacing(original, &patch)),
        PatchType::Adding => apply_adding(original, &patch),
    }
}

/// Overwrite the keyed lines.
///
/// Keys past the end extend the file in numeric order without padding.
/// Keys that are not integers are ignored.
pub fn apply_replacing(original: &str, patch: &LineMap) -> String {
    let mut lines = to_line_map(original);
    lines.extend(patch.iter().map(|(k, v)| (k.clone(), v.clone())));
    from_line_map(&lines)
}

/// Insert every entry at its keyed output position.
///
/// Targets beyond the end are reached by padding with one blank line per
/// missing position. Keys are not bounded, so a key such as `"9999999999"`
/// allocates that many blank lines; callers taking patches from untrusted
/// sources should cap keys before applying.
pub fn apply_adding(original: &str, patch: &LineMap) -> Result<String, PatchError> {
    let set = adding_edit_set(patch)?;
    let lines = split_lines(original);
    Ok(join_lines(&set.merge(&lines, Addressing::Output)))
}

/// Lower an adding patch to an edit set. Every key must be a non-negative
/// integer.
pub fn adding_edit_set(patch: &LineMap) -> Result<EditSet, PatchError> {
    let edits = patch
        .iter()
        .map(|(key, content)| {
            let line = parse_line_key(key)
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| PatchError::InvalidLineKey { key: key.clone() })?;
            Ok(Edit::new(line, EditAction::Insert, content.as_str()))
        })
        .collect::<Result<Vec<_>, PatchError>>()?;
    Ok(EditSet::new(edits))
}
