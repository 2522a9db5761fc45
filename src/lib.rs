//! ffs: line-addressed file patching and concurrent search
//!
//! Lets an automated agent edit text files by line number, review the edits
//! as bounded previews, and search a directory tree for matching lines.
//!
//! # Architecture
//!
//! Every edit representation (JSON line-map patches, structured
//! replace/insert requests) lowers to an [`EditSet`] and is applied by one
//! forward cursor merge, [`edit::merge`]. The two addressing modes differ
//! only in what a line number refers to: a position in the original file or
//! a position in the output.
//!
//! Search compiles a [`Matcher`] once, then fans file paths out to a
//! per-call worker pool and fans matches back in over channels.
//!
//! # Safety
//!
//! - Edits are validated in full before anything is written
//! - Atomic file writes (tempfile + fsync + rename)
//! - Declined confirmations leave the file untouched
//!
//! # Example
//!
//! ```no_run
//! use ffs::{EditInstruction, FileEditRequest};
//!
//! let request = FileEditRequest::new(
//!     "notes.txt",
//!     vec![EditInstruction::insert(2, "a new second line")],
//! );
//!
//! match ffs::workflow::apply_request(&request) {
//!     Ok(outcome) => println!("{:?}", outcome),
//!     Err(e) => eprintln!("Edit failed: {}", e),
//! }
//! ```

pub mod agent;
pub mod config;
pub mod delta;
pub mod edit;
pub mod fs;
pub mod lines;
pub mod logging;
pub mod patch;
pub mod preview;
pub mod search;
pub mod tree;
pub mod workflow;

// Re-exports
pub use agent::{apply_suggestion, AgentError, SuggestedChange, Suggestion};
pub use config::{ConfigError, Settings};
pub use delta::{apply_delta, generate_delta, DeltaError};
pub use edit::{
    Addressing, Edit, EditAction, EditError, EditInstruction, EditSet, FileEditRequest,
};
pub use lines::{from_line_map, to_line_map, LineMap};
pub use patch::{apply_adding, apply_patch, apply_replacing, PatchError, PatchType};
pub use preview::{render_text_diff, DiffWindows, RenderMode};
pub use search::{
    search, CancellationToken, Matcher, SearchEngine, SearchError, SearchOptions, SearchResult,
};
pub use tree::{build_tree, working_directory_tree, DirectoryTree, TreeError};
pub use workflow::{
    Confirm, EditOutcome, EditPlan, EditWorkflow, StdinConfirm, WorkflowError, WorkflowOptions,
};
