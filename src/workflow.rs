//! Structured edit workflow: validate, preview, confirm, apply, persist.
//!
//! Every step before the final write is side-effect free on disk. Any
//! failure, or a declined confirmation, leaves the file untouched.

use crate::edit::{Addressing, EditError, EditInstruction, EditSet, FileEditRequest};
use crate::fs::{atomic_write, read_file};
use crate::lines::{join_lines, split_lines};
use crate::preview::{render_edit, RenderMode};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use thiserror::Error;

/// Asks the user a yes/no question.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, question: &str) -> bool {
        self(question)
    }
}

/// Prompts on stdout and reads one line from stdin. See [`ask`].
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, question: &str) -> bool {
        ask(question, &mut io::stdin().lock(), &mut io::stdout().lock())
    }
}

/// Write `question` to `output` and read one answer line from `input`.
///
/// Only `y` and `yes` (any case) count as agreement. A failed prompt write,
/// EOF or a read error declines.
pub fn ask(question: &str, input: &mut impl BufRead, output: &mut impl Write) -> bool {
    if write!(output, "{question} (y/n): ")
        .and_then(|()| output.flush())
        .is_err()
    {
        return false;
    }

    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(0) | Err(_) => false,
        Ok(_) => is_affirmative(&answer),
    }
}

pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("failed to read file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file {path} is not valid UTF-8")]
    NotUtf8 { path: PathBuf },

    #[error("edit #{index} for {path}: {source}")]
    InvalidEdit {
        path: PathBuf,
        /// Position of the offending instruction in the request (0-based)
        index: usize,
        #[source]
        source: EditError,
    },

    #[error("failed to write preview: {0}")]
    Output(#[source] io::Error),

    #[error("failed to write file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result of a workflow run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "EditOutcome reports whether the file was changed"]
pub enum EditOutcome {
    Applied {
        file: PathBuf,
        lines_before: usize,
        lines_after: usize,
    },
    /// Confirmation was declined; the file was not touched
    Aborted { file: PathBuf },
}

/// Validated, sorted edits against one file's content.
#[derive(Debug, Clone)]
pub struct EditPlan<'a> {
    lines: Vec<&'a str>,
    edits: EditSet,
}

impl<'a> EditPlan<'a> {
    /// Validate `instructions` against `content` in request order. The
    /// first invalid instruction is reported with its index.
    pub fn new(
        content: &'a str,
        instructions: &[EditInstruction],
    ) -> Result<Self, (usize, EditError)> {
        let lines = split_lines(content);
        let edits = instructions
            .iter()
            .enumerate()
            .map(|(index, instruction)| {
                instruction
                    .validate(lines.len())
                    .map_err(|error| (index, error))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            lines,
            edits: EditSet::new(edits),
        })
    }

    pub fn edits(&self) -> &EditSet {
        &self.edits
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Previews for every edit, in application order.
    pub fn preview(&self, mode: RenderMode) -> String {
        self.edits
            .iter()
            .map(|edit| render_edit(edit, &self.lines, mode))
            .collect()
    }

    /// Merge the edits into the original lines.
    pub fn apply(&self) -> Vec<&str> {
        self.edits.merge(&self.lines, Addressing::Original)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowOptions {
    /// Print a preview of every edit before applying
    pub preview: bool,
    /// Ask for confirmation before writing
    pub prompt: bool,
    pub render_mode: RenderMode,
}

impl Default for WorkflowOptions {
    fn default() -> Self {
        Self {
            preview: true,
            prompt: true,
            render_mode: RenderMode::Markers,
        }
    }
}

/// Runs edit requests with injected confirmation and preview output.
pub struct EditWorkflow<'a> {
    options: WorkflowOptions,
    confirm: &'a mut dyn Confirm,
    out: &'a mut dyn Write,
}

impl<'a> EditWorkflow<'a> {
    pub fn new(
        options: WorkflowOptions,
        confirm: &'a mut dyn Confirm,
        out: &'a mut dyn Write,
    ) -> Self {
        Self {
            options,
            confirm,
            out,
        }
    }

    pub fn run(&mut self, request: &FileEditRequest) -> Result<EditOutcome, WorkflowError> {
        let path = &request.file_path;

        let bytes = read_file(path).map_err(|source| WorkflowError::Read {
            path: path.clone(),
            source,
        })?;
        let content =
            String::from_utf8(bytes).map_err(|_| WorkflowError::NotUtf8 { path: path.clone() })?;

        let plan = EditPlan::new(&content, &request.edits).map_err(|(index, source)| {
            WorkflowError::InvalidEdit {
                path: path.clone(),
                index,
                source,
            }
        })?;

        if self.options.preview {
            write!(
                self.out,
                "Proposed changes for {}:\n{}",
                path.display(),
                plan.preview(self.options.render_mode)
            )
            .map_err(WorkflowError::Output)?;
        }

        if self.options.prompt && !self.confirm.confirm("\nApply these changes?") {
            tracing::info!(path = %path.display(), "edit declined");
            return Ok(EditOutcome::Aborted { file: path.clone() });
        }

        let updated = join_lines(&plan.apply());
        let lines_after = split_lines(&updated).len();
        atomic_write(path, updated.as_bytes()).map_err(|source| {
            WorkflowError::Write {
                path: path.clone(),
                source,
            }
        })?;

        tracing::info!(
            path = %path.display(),
            edits = plan.edits().len(),
            lines_before = plan.line_count(),
            lines_after,
            "edits applied"
        );

        Ok(EditOutcome::Applied {
            file: path.clone(),
            lines_before: plan.line_count(),
            lines_after,
        })
    }
}

/// Apply `request` without preview or confirmation.
pub fn apply_request(request: &FileEditRequest) -> Result<EditOutcome, WorkflowError> {
    let options = WorkflowOptions {
        preview: false,
        prompt: false,
        render_mode: RenderMode::Markers,
    };
    let mut confirm = |_: &str| true;
    let mut sink = io::sink();
    EditWorkflow::new(options, &mut confirm, &mut sink).run(request)
}
