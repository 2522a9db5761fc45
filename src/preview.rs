//! Human-readable previews of pending edits.
//!
//! [`DiffWindows::compute`] cuts the context around one edit; [`render`]
//! turns it into colored text. The render mode changes presentation only.

use crate::edit::{Edit, EditAction};
use crate::lines::split_lines;
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::fmt::Write as _;

/// Lines of context shown on each side of an edit.
pub const CONTEXT_LINES: usize = 2;

/// A numbered line in a preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberedLine {
    pub number: usize,
    pub text: String,
}

/// Context and change windows around a single edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffWindows {
    pub top: Vec<NumberedLine>,
    pub removed: Vec<NumberedLine>,
    pub added: Vec<NumberedLine>,
    pub bottom: Vec<NumberedLine>,
}

impl DiffWindows {
    /// Cut the preview windows for `edit` out of `lines`.
    ///
    /// `edit` must already be validated against `lines`. Original line
    /// numbers are kept for context and removed lines; added lines count up
    /// from the edit's target line.
    pub fn compute(edit: &Edit, lines: &[&str]) -> Self {
        let added = numbered(edit.line, split_lines(&edit.content));

        if lines.len() == 1 {
            return Self {
                top: numbered(1, lines.iter().copied()),
                removed: Vec::new(),
                added,
                bottom: Vec::new(),
            };
        }

        let target = edit.line.min(lines.len() + 1);
        let top_start = target.saturating_sub(CONTEXT_LINES).max(1);
        let top = numbered(top_start, lines[top_start - 1..target - 1].iter().copied());

        let (removed, bottom_start) = match edit.action {
            EditAction::Replace if target <= lines.len() => {
                (numbered(target, [lines[target - 1]]), target + 1)
            }
            _ => (Vec::new(), target),
        };

        let bottom_end = (bottom_start + CONTEXT_LINES - 1).min(lines.len());
        let bottom = if bottom_start <= bottom_end {
            numbered(
                bottom_start,
                lines[bottom_start - 1..bottom_end].iter().copied(),
            )
        } else {
            Vec::new()
        };

        Self {
            top,
            removed,
            added,
            bottom,
        }
    }
}

fn numbered<'a>(start: usize, lines: impl IntoIterator<Item = &'a str>) -> Vec<NumberedLine> {
    lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| NumberedLine {
            number: start + i,
            text: text.to_string(),
        })
        .collect()
}

/// How changed lines are emphasised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Red `-` / green `+` text
    #[default]
    Markers,
    /// Red / green background behind the changed lines
    Highlight,
}

/// Render preview windows, one line per entry, each ending in `\n`.
pub fn render(windows: &DiffWindows, mode: RenderMode) -> String {
    let mut out = String::new();

    for line in &windows.top {
        let _ = writeln!(out, "{} {}", gutter(line.number), line.text.bright_black());
    }
    for line in &windows.removed {
        let text = format!("- {}", line.text);
        let text = match mode {
            RenderMode::Markers => text.red(),
            RenderMode::Highlight => text.bright_white().on_red(),
        };
        let _ = writeln!(out, "{} {}", gutter(line.number), text);
    }
    for line in &windows.added {
        let text = format!("+ {}", line.text);
        let text = match mode {
            RenderMode::Markers => text.bright_green(),
            RenderMode::Highlight => text.bright_white().on_green(),
        };
        let _ = writeln!(out, "{} {}", gutter(line.number), text);
    }
    for line in &windows.bottom {
        let _ = writeln!(out, "{} {}", gutter(line.number), line.text.bright_black());
    }

    out
}

fn gutter(number: usize) -> colored::ColoredString {
    format!("{number:>3}|").bright_blue()
}

/// Render the header and windows for one edit.
pub fn render_edit(edit: &Edit, lines: &[&str], mode: RenderMode) -> String {
    let windows = DiffWindows::compute(edit, lines);
    format!(
        "\nEdit at line {} ({}):\n{}",
        edit.line,
        edit.action,
        render(&windows, mode)
    )
}

/// Line diff of two whole contents: `-` removed, `+` added, unchanged lines
/// indented by one space.
pub fn render_text_diff(original: &str, updated: &str) -> String {
    let diff = TextDiff::from_lines(original, updated);
    let mut out = String::new();

    for change in diff.iter_all_changes() {
        let value = change.value().trim_end_matches('\n');
        let line = match change.tag() {
            ChangeTag::Delete => format!("-{value}").red(),
            ChangeTag::Insert => format!("+{value}").green(),
            ChangeTag::Equal => format!(" {value}").normal(),
        };
        let _ = writeln!(out, "{line}");
    }

    out
}
