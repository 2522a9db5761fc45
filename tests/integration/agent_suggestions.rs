//! Agent suggestions applied to files on disk

use ffs::{apply_suggestion, PatchType, Suggestion};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_whole_file_suggestion_from_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("main.rs");
    fs::write(&path, "fn main() {}\n").unwrap();

    let json = format!(
        r#"{{"file_path": {:?}, "kind": "whole_file", "new_content": "fn main() {{\n    run();\n}}\n"}}"#,
        path.display().to_string()
    );
    let suggestion: Suggestion = serde_json::from_str(&json).unwrap();
    let updated = apply_suggestion(&suggestion).unwrap();

    assert_eq!(updated, "fn main() {\n    run();\n}\n");
    assert_eq!(fs::read_to_string(&path).unwrap(), updated);
}

#[test]
fn test_line_change_suggestion() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "a\nc").unwrap();

    let suggestion = Suggestion::line_changes(&path, r#"{"2": "b"}"#, PatchType::Adding);
    apply_suggestion(&suggestion).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\nc");
}
