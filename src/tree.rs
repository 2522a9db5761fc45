//! Directory tree snapshots with glob include/exclude filtering.

use crate::fs::is_binary;
use glob::Pattern;
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// One node of a directory tree. Directories report the summed size of the
/// children that survived filtering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryTree {
    pub path: String,
    pub name: String,
    pub is_file: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_binary: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DirectoryTree>,
    pub size: u64,
}

#[derive(Error, Debug)]
pub enum TreeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid glob pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("could not determine working directory: {0}")]
    WorkingDirectory(#[source] io::Error),

    #[error("could not encode directory tree: {0}")]
    Json(#[from] serde_json::Error),
}

struct Filters {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl Filters {
    fn compile(include: &[String], exclude: &[String]) -> Result<Self, TreeError> {
        Ok(Self {
            include: compile_patterns(include)?,
            exclude: compile_patterns(exclude)?,
        })
    }

    fn excluded(&self, name: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(name))
    }

    fn included(&self, name: &str) -> bool {
        self.include.is_empty() || self.include.iter().any(|p| p.matches(name))
    }
}

/// Compile glob patterns, failing on the first invalid one.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>, TreeError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|source| TreeError::Pattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// Build the tree rooted at `path`.
///
/// `exclude` globs are matched against the base name of every entry and drop
/// whole subtrees. `include` globs are matched against file base names; with
/// at least one include pattern, directories left without children are
/// pruned. Returns `None` when the root itself is filtered out.
///
/// Errors reading the root are returned. Errors below the root are logged
/// and the offending entry is skipped.
pub fn build_tree(
    path: impl AsRef<Path>,
    include: &[String],
    exclude: &[String],
) -> Result<Option<DirectoryTree>, TreeError> {
    let filters = Filters::compile(include, exclude)?;
    build_node(path.as_ref(), &filters)
}

/// Build the tree of the current working directory.
pub fn working_directory_tree(
    include: &[String],
    exclude: &[String],
) -> Result<Option<DirectoryTree>, TreeError> {
    let dir = std::env::current_dir().map_err(TreeError::WorkingDirectory)?;
    build_tree(dir, include, exclude)
}

fn build_node(path: &Path, filters: &Filters) -> Result<Option<DirectoryTree>, TreeError> {
    let io_err = |source| TreeError::Io {
        path: path.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(path).map_err(io_err)?;
    let name = base_name(path);

    if filters.excluded(&name) {
        return Ok(None);
    }

    if !metadata.is_dir() {
        if !filters.included(&name) {
            return Ok(None);
        }
        return Ok(Some(DirectoryTree {
            path: path.to_string_lossy().into_owned(),
            name,
            is_file: true,
            is_binary: is_binary(path),
            children: Vec::new(),
            size: metadata.len(),
        }));
    }

    let mut entries = fs::read_dir(path)
        .map_err(io_err)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(io_err)?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut children = Vec::new();
    let mut size = 0;
    for entry in entries {
        let child_path = entry.path();
        match build_node(&child_path, filters) {
            Ok(Some(child)) => {
                size += child.size;
                children.push(child);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(path = %child_path.display(), error = %e, "skipping tree entry");
            }
        }
    }

    if children.is_empty() && !filters.include.is_empty() {
        return Ok(None);
    }

    Ok(Some(DirectoryTree {
        path: path.to_string_lossy().into_owned(),
        name,
        is_file: false,
        is_binary: false,
        children,
        size,
    }))
}

fn base_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        // "/" or ".."
        None => path.to_string_lossy().into_owned(),
    }
}

/// Render the children of `tree` with box-drawing connectors, one per line.
pub fn render_text(tree: &DirectoryTree) -> String {
    let mut out = String::new();
    render_children(&tree.children, "", &mut out);
    out
}

fn render_children(children: &[DirectoryTree], prefix: &str, out: &mut String) {
    for (i, child) in children.iter().enumerate() {
        let last = i + 1 == children.len();
        let (connector, extension) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };

        let _ = writeln!(out, "{prefix}{connector}{}", child.name);

        if !child.children.is_empty() {
            render_children(&child.children, &format!("{prefix}{extension}"), out);
        }
    }
}

pub fn to_json_minified(tree: &DirectoryTree) -> Result<String, TreeError> {
    Ok(serde_json::to_string(tree)?)
}

pub fn to_json_pretty(tree: &DirectoryTree) -> Result<String, TreeError> {
    Ok(serde_json::to_string_pretty(tree)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("file1.txt"), "file1").unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();
        fs::write(dir.path().join("subdir/file2.txt"), "file2").unwrap();
        fs::write(dir.path().join("subdir/image.png"), b"\x89PNG\0\0").unwrap();
        dir
    }

    #[test]
    fn test_build_tree_unfiltered() {
        let dir = fixture();
        let tree = build_tree(dir.path(), &[], &[]).unwrap().unwrap();

        assert!(!tree.is_file);
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].name, "file1.txt");
        assert_eq!(tree.children[1].name, "subdir");
        assert_eq!(tree.size, 5 + 5 + 6);

        let png = &tree.children[1].children[1];
        assert_eq!(png.name, "image.png");
        assert!(png.is_binary);
    }

    #[test]
    fn test_build_tree_include() {
        let dir = fixture();
        let tree = build_tree(dir.path(), &strings(&["*.txt"]), &[])
            .unwrap()
            .unwrap();
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[1].children.len(), 1);
        assert_eq!(tree.size, 10);
    }

    #[test]
    fn test_build_tree_include_prunes_empty_dirs() {
        let dir = fixture();
        let tree = build_tree(dir.path(), &strings(&["file1.*"]), &[])
            .unwrap()
            .unwrap();
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].name, "file1.txt");

        assert!(build_tree(dir.path(), &strings(&["*.rs"]), &[])
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_build_tree_exclude() {
        let dir = fixture();
        let tree = build_tree(dir.path(), &[], &strings(&["subdir"]))
            .unwrap()
            .unwrap();
        assert_eq!(tree.children.len(), 1);
    }

    #[test]
    fn test_empty_dir_kept_without_include() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        let tree = build_tree(dir.path(), &[], &[]).unwrap().unwrap();
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].size, 0);
    }

    #[test]
    fn test_build_tree_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_tree(dir.path().join("missing"), &[], &[]).unwrap_err();
        assert!(matches!(err, TreeError::Io { .. }));
    }

    #[test]
    fn test_build_tree_invalid_pattern() {
        let dir = fixture();
        let err = build_tree(dir.path(), &strings(&["[unclosed"]), &[]).unwrap_err();
        assert!(matches!(err, TreeError::Pattern { .. }));
    }

    #[test]
    fn test_render_text() {
        let tree = DirectoryTree {
            name: "root".to_string(),
            children: vec![
                DirectoryTree {
                    name: "file1.txt".to_string(),
                    is_file: true,
                    ..Default::default()
                },
                DirectoryTree {
                    name: "subdir".to_string(),
                    children: vec![DirectoryTree {
                        name: "file2.txt".to_string(),
                        is_file: true,
                        ..Default::default()
                    }],
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        assert_eq!(
            render_text(&tree),
            "├── file1.txt\n└── subdir\n    └── file2.txt\n"
        );
    }

    #[test]
    fn test_json_minified_omits_empty_fields() {
        let tree = DirectoryTree {
            path: "root".to_string(),
            name: "root".to_string(),
            is_file: false,
            is_binary: false,
            children: vec![DirectoryTree {
                path: "root/file.txt".to_string(),
                name: "file.txt".to_string(),
                is_file: true,
                is_binary: false,
                children: Vec::new(),
                size: 123,
            }],
            size: 123,
        };

        assert_eq!(
            to_json_minified(&tree).unwrap(),
            r#"{"path":"root","name":"root","is_file":false,"children":[{"path":"root/file.txt","name":"file.txt","is_file":true,"size":123}],"size":123}"#
        );
    }

    #[test]
    fn test_json_pretty() {
        let tree = DirectoryTree {
            path: "root/file1.txt".to_string(),
            name: "file1.txt".to_string(),
            is_file: true,
            is_binary: true,
            ..Default::default()
        };
        let json = to_json_pretty(&tree).unwrap();
        assert!(json.contains(r#""path": "root/file1.txt""#));
        assert!(json.contains(r#""is_binary": true"#));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name_is_replaced() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempfile::tempdir().unwrap();
        let name = OsStr::from_bytes(&[b'a', 0xff]);
        if fs::write(dir.path().join(name), "x").is_err() {
            // Some file systems refuse non-UTF-8 names
            return;
        }

        let tree = build_tree(dir.path(), &[], &[]).unwrap().unwrap();
        let json = to_json_minified(&tree).unwrap();
        assert!(json.contains('\u{FFFD}'));
    }
}
