//! JSON line-map patches applied to files on disk

use ffs::fs::{atomic_write, file_to_line_map};
use ffs::{apply_patch, from_line_map, PatchError, PatchType};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_replacing_patch_round_trips_through_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.txt");
    fs::write(&path, "name = a\nport = 80\ndebug = false").unwrap();

    let original = fs::read_to_string(&path).unwrap();
    let updated = apply_patch(
        &original,
        r#"{"2": "port = 8080", "3": "debug = true"}"#,
        PatchType::Replacing,
    )
    .unwrap();
    atomic_write(&path, updated.as_bytes()).unwrap();

    let map = file_to_line_map(&path).unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map["2"], "port = 8080");
    assert_eq!(from_line_map(&map), "name = a\nport = 8080\ndebug = true");
}

#[test]
fn test_adding_patch_on_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("list.txt");
    fs::write(&path, "alpha\ngamma").unwrap();

    let original = fs::read_to_string(&path).unwrap();
    let updated = apply_patch(
        &original,
        r#"{"2": "beta", "4": "delta"}"#,
        PatchType::Adding,
    )
    .unwrap();
    atomic_write(&path, updated.as_bytes()).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "alpha\nbeta\ngamma\ndelta"
    );
}

#[test]
fn test_failed_patch_leaves_file_alone() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("list.txt");
    fs::write(&path, "alpha\nbeta").unwrap();

    let original = fs::read_to_string(&path).unwrap();
    let err = apply_patch(&original, r#"{"x": "nope"}"#, PatchType::Adding).unwrap_err();
    assert!(matches!(err, PatchError::InvalidLineKey { .. }));
    assert_eq!(fs::read_to_string(&path).unwrap(), "alpha\nbeta");
}
