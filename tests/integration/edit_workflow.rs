//! Structured edit requests run through the confirmation workflow

use ffs::workflow::apply_request;
use ffs::{
    EditInstruction, EditOutcome, EditWorkflow, FileEditRequest, RenderMode, WorkflowError,
    WorkflowOptions,
};
use std::fs;
use tempfile::TempDir;

fn write_fixture(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("target.txt");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_request_from_json_applies() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "one\ntwo\nthree\nfour");

    let json = format!(
        r#"{{"file_path": {:?}, "edits": [
            {{"action": "replace", "line_number": 4, "new_content": "FOUR"}},
            {{"action": "insert", "line_number": 1, "new_content": "zero"}}
        ]}}"#,
        path.display().to_string()
    );
    let request = FileEditRequest::from_json(&json).unwrap();

    let outcome = apply_request(&request).unwrap();
    assert_eq!(
        outcome,
        EditOutcome::Applied {
            file: path.clone(),
            lines_before: 4,
            lines_after: 5,
        }
    );
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "zero\none\ntwo\nthree\nFOUR"
    );
}

#[test]
fn test_append_after_last_line() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "one\ntwo");

    let request = FileEditRequest::new(&path, vec![EditInstruction::insert(3, "three")]);
    apply_request(&request).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\nthree");
}

#[test]
fn test_declined_edit_shows_preview_and_keeps_file() {
    colored::control::set_override(false);
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "a\nb\nc\nd\ne");

    let request = FileEditRequest::new(&path, vec![EditInstruction::replace(3, "C")]);
    let mut asked = Vec::new();
    let mut confirm = |question: &str| {
        asked.push(question.to_string());
        false
    };
    let mut out = Vec::new();

    let outcome = EditWorkflow::new(WorkflowOptions::default(), &mut confirm, &mut out)
        .run(&request)
        .unwrap();

    assert_eq!(outcome, EditOutcome::Aborted { file: path.clone() });
    assert_eq!(asked.len(), 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\nc\nd\ne");

    let preview = String::from_utf8(out).unwrap();
    assert!(preview.starts_with("Proposed changes for"));
    assert!(preview.contains("Edit at line 3 (replace)"));
    assert!(preview.contains("- c"));
    assert!(preview.contains("+ C"));
}

#[test]
fn test_highlight_mode_still_applies() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "a\nb");

    let request = FileEditRequest::new(&path, vec![EditInstruction::replace(1, "A")]);
    let options = WorkflowOptions {
        render_mode: RenderMode::Highlight,
        ..WorkflowOptions::default()
    };
    let mut confirm = |_: &str| true;
    let mut out = Vec::new();

    EditWorkflow::new(options, &mut confirm, &mut out)
        .run(&request)
        .unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "A\nb");
}

#[test]
fn test_one_bad_edit_rejects_the_whole_request() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(&dir, "a\nb");

    let request = FileEditRequest::new(
        &path,
        vec![
            EditInstruction::replace(1, "A"),
            EditInstruction::replace(3, "C"),
        ],
    );
    let err = apply_request(&request).unwrap_err();

    assert!(matches!(err, WorkflowError::InvalidEdit { index: 1, .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb");
}

#[test]
fn test_missing_file_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let request = FileEditRequest::new(
        dir.path().join("missing.txt"),
        vec![EditInstruction::replace(1, "x")],
    );
    assert!(matches!(
        apply_request(&request).unwrap_err(),
        WorkflowError::Read { .. }
    ));
}
