//! Concurrent search over a generated directory tree

use ffs::{search, CancellationToken, SearchEngine, SearchError, SearchOptions};
use std::fs;
use tempfile::TempDir;

fn setup_tree(files: usize) -> TempDir {
    let dir = TempDir::new().unwrap();
    for i in 0..files {
        let sub = dir.path().join(format!("dir{}", i % 4));
        fs::create_dir_all(&sub).unwrap();
        fs::write(
            sub.join(format!("file{i}.txt")),
            format!("header {i}\nneedle in file {i}\nfooter\n"),
        )
        .unwrap();
    }
    dir
}

#[test]
fn test_every_file_is_searched_once() {
    let dir = setup_tree(40);
    let engine = SearchEngine::with_workers(3);

    let results = engine
        .search(
            dir.path(),
            "needle",
            SearchOptions::default(),
            &CancellationToken::new(),
        )
        .unwrap();

    assert_eq!(results.len(), 40);
    let mut paths: Vec<_> = results.iter().map(|r| r.file_path.clone()).collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), 40);
    assert!(results.iter().all(|r| r.line_number == 2));
}

#[test]
fn test_worker_count_does_not_change_results() {
    let dir = setup_tree(12);
    let options = SearchOptions {
        use_regex: true,
        ..SearchOptions::default()
    };

    let mut single = SearchEngine::with_workers(1)
        .search(dir.path(), r"file \d+$", options, &CancellationToken::new())
        .unwrap();
    let mut many = SearchEngine::with_workers(8)
        .search(dir.path(), r"file \d+$", options, &CancellationToken::new())
        .unwrap();

    single.sort_by(|a, b| a.file_path.cmp(&b.file_path));
    many.sort_by(|a, b| a.file_path.cmp(&b.file_path));
    assert_eq!(single, many);
}

#[test]
fn test_missing_root_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = search(dir.path().join("nope"), "x", SearchOptions::default()).unwrap_err();
    assert!(matches!(err, SearchError::Root { .. }));
}
