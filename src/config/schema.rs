use crate::search::SearchOptions;
use crate::tree::compile_patterns;
use serde::Deserialize;
use thiserror::Error;

/// Settings read from `ffs.toml`. Every section and key is optional.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub edit: EditSettings,
    pub search: SearchOptions,
    pub tree: TreeSettings,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EditSettings {
    /// Show a preview of every edit before applying
    pub preview: bool,
    /// Ask before writing
    pub confirm: bool,
    /// Background highlight instead of `-`/`+` markers
    pub highlight: bool,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            preview: true,
            confirm: true,
            highlight: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TreeSettings {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            include: Vec::new(),
            exclude: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                ".DS_Store".to_string(),
            ],
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        for (field, patterns) in [
            ("tree.include", &self.tree.include),
            ("tree.exclude", &self.tree.exclude),
        ] {
            for pattern in patterns {
                if pattern.trim().is_empty() {
                    issues.push(ValidationIssue::EmptyPattern { field });
                } else if let Err(e) = compile_patterns(std::slice::from_ref(pattern)) {
                    issues.push(ValidationIssue::InvalidPattern {
                        field,
                        message: e.to_string(),
                    });
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

/// Every problem found in a settings file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    #[error("{field}: empty glob pattern")]
    EmptyPattern { field: &'static str },

    #[error("{field}: {message}")]
    InvalidPattern {
        field: &'static str,
        message: String,
    },
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
