//! Concurrent line search over a directory tree.
//!
//! One producer walks the tree and feeds file paths into a bounded
//! multi-consumer channel. A fixed pool of workers, sized to the available
//! parallelism and created per call, drains it, scans each file line by line
//! and streams matches back. The result stream closes once the last worker
//! has dropped its sender.
//!
//! Results carry no ordering guarantee across files.

use crate::fs::is_binary;
use crossbeam_channel::{Receiver, Sender};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use walkdir::WalkDir;

/// How a query is matched against each line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchOptions {
    pub match_case: bool,
    pub match_whole_word: bool,
    /// Treat the query as a regular expression; wins over `match_whole_word`
    pub use_regex: bool,
}

/// A matching line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchResult {
    pub file_path: String,
    pub file_name: String,
    /// 1-based
    pub line_number: usize,
    pub line_content: String,
}

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("invalid regular expression {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("cannot search {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Compiled line predicate.
#[derive(Debug, Clone)]
pub enum Matcher {
    Contains(String),
    /// Holds the lower-cased query
    ContainsIgnoreCase(String),
    Regex(Regex),
}

impl Matcher {
    pub fn compile(query: &str, options: SearchOptions) -> Result<Self, SearchError> {
        let pattern = if options.use_regex {
            query.to_string()
        } else if options.match_whole_word {
            format!(r"\b{}\b", regex::escape(query))
        } else if options.match_case {
            return Ok(Matcher::Contains(query.to_string()));
        } else {
            return Ok(Matcher::ContainsIgnoreCase(query.to_lowercase()));
        };

        let pattern = if options.match_case {
            pattern
        } else {
            format!("(?i){pattern}")
        };

        Regex::new(&pattern)
            .map(Matcher::Regex)
            .map_err(|source| SearchError::Pattern {
                pattern: query.to_string(),
                source,
            })
    }

    pub fn is_match(&self, line: &str) -> bool {
        match self {
            Matcher::Contains(query) => line.contains(query.as_str()),
            Matcher::ContainsIgnoreCase(query) => line.to_lowercase().contains(query.as_str()),
            Matcher::Regex(re) => re.is_match(line),
        }
    }
}

/// Shared cancellation flag. Cloning yields a handle to the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Worker-pool search configuration.
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine {
    workers: usize,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    /// One worker per available hardware thread.
    pub fn new() -> Self {
        let workers = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self { workers }
    }

    /// Use exactly `workers` workers (at least one).
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Search every file below `root` for lines matching `query`.
    ///
    /// An invalid pattern or an unreadable root fails before any file is
    /// opened. Files that cannot be opened or read are skipped. When
    /// `cancel` fires, the walk stops and the matches found so far are
    /// returned.
    pub fn search(
        &self,
        root: impl AsRef<Path>,
        query: &str,
        options: SearchOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let mut results = Vec::new();
        self.for_each_match(root, query, options, cancel, |result| results.push(result))?;
        Ok(results)
    }

    /// Like [`search`](Self::search), but hands each match to `on_match` on
    /// the calling thread as it arrives. Returns the number of matches.
    ///
    /// `on_match` may cancel `cancel`; matches already in flight are still
    /// delivered.
    pub fn for_each_match<F>(
        &self,
        root: impl AsRef<Path>,
        query: &str,
        options: SearchOptions,
        cancel: &CancellationToken,
        mut on_match: F,
    ) -> Result<usize, SearchError>
    where
        F: FnMut(SearchResult),
    {
        let root = root.as_ref();
        let matcher = Matcher::compile(query, options)?;
        std::fs::metadata(root).map_err(|source| SearchError::Root {
            path: root.to_path_buf(),
            source,
        })?;

        tracing::debug!(
            root = %root.display(),
            query,
            workers = self.workers,
            "search started"
        );

        let (path_tx, path_rx) = crossbeam_channel::bounded::<PathBuf>(self.workers);
        let (result_tx, result_rx) = crossbeam_channel::unbounded::<SearchResult>();

        let matches = thread::scope(|scope| {
            let matcher = &matcher;

            scope.spawn(move || produce(root, path_tx, cancel));

            for _ in 0..self.workers {
                let paths = path_rx.clone();
                let results = result_tx.clone();
                scope.spawn(move || work(paths, results, matcher, cancel));
            }
            // The queue closes when the producer finishes
            drop(path_rx);
            // Workers hold the only senders; the stream ends when they finish
            drop(result_tx);

            let mut matches = 0;
            for result in result_rx.iter() {
                matches += 1;
                on_match(result);
            }
            matches
        });

        tracing::info!(
            root = %root.display(),
            matches,
            cancelled = cancel.is_cancelled(),
            "search finished"
        );
        Ok(matches)
    }
}

/// Search `root` with a fresh worker pool and no cancellation.
pub fn search(
    root: impl AsRef<Path>,
    query: &str,
    options: SearchOptions,
) -> Result<Vec<SearchResult>, SearchError> {
    SearchEngine::new().search(root, query, options, &CancellationToken::new())
}

/// Walk depth-first and enqueue every non-directory entry.
fn produce(root: &Path, queue: Sender<PathBuf>, cancel: &CancellationToken) {
    for entry in WalkDir::new(root).sort_by_file_name() {
        if cancel.is_cancelled() {
            break;
        }
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(error = %e, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        if queue.send(entry.into_path()).is_err() {
            break;
        }
    }
}

fn work(
    paths: Receiver<PathBuf>,
    results: Sender<SearchResult>,
    matcher: &Matcher,
    cancel: &CancellationToken,
) {
    for path in paths.iter() {
        // Keep draining after cancellation so the producer never blocks
        if cancel.is_cancelled() || is_binary(&path) {
            continue;
        }
        if let Err(e) = scan_file(&path, matcher, &results, cancel) {
            tracing::debug!(path = %path.display(), error = %e, "skipping file");
        }
    }
}

fn scan_file(
    path: &Path,
    matcher: &Matcher,
    results: &Sender<SearchResult>,
    cancel: &CancellationToken,
) -> io::Result<()> {
    let mut reader = BufReader::new(File::open(path)?);
    let file_path = path.to_string_lossy().into_owned();
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_path.clone());

    let mut buf = Vec::new();
    let mut line_number = 0;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 || cancel.is_cancelled() {
            return Ok(());
        }
        line_number += 1;

        let line = String::from_utf8_lossy(trim_line_ending(&buf));
        if matcher.is_match(&line) {
            let result = SearchResult {
                file_path: file_path.clone(),
                file_name: file_name.clone(),
                line_number,
                line_content: line.into_owned(),
            };
            if results.send(result).is_err() {
                return Ok(());
            }
        }
    }
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
