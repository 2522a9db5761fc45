//! Settings file discovery and parsing.

use crate::config::schema::{Settings, ValidationError};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming a settings file.
pub const CONFIG_ENV: &str = "FFS_CONFIG";

/// File name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "ffs.toml";

/// Settings that could not be loaded. Parse and validation errors carry the
/// file they came from, if any.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse settings TOML{}: {source}", origin(.path))]
    Toml {
        path: Option<PathBuf>,
        #[source]
        source: toml_edit::de::Error,
    },

    #[error("invalid settings{}: {source}", origin(.path))]
    Validation {
        path: Option<PathBuf>,
        #[source]
        source: ValidationError,
    },
}

fn origin(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|path| format!(" ({})", path.display()))
        .unwrap_or_default()
}

pub fn load_from_str(input: &str) -> Result<Settings, ConfigError> {
    parse(input, None)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Settings, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&contents, Some(path))
}

fn parse(input: &str, path: Option<&Path>) -> Result<Settings, ConfigError> {
    let settings: Settings =
        toml_edit::de::from_str(input).map_err(|source| ConfigError::Toml {
            path: path.map(Path::to_path_buf),
            source,
        })?;
    settings
        .validate()
        .map_err(|source| ConfigError::Validation {
            path: path.map(Path::to_path_buf),
            source,
        })?;
    Ok(settings)
}

/// Find the settings file to use.
///
/// Priority order:
/// 1. Explicit path (from `--config`)
/// 2. `FFS_CONFIG` environment variable
/// 3. `./ffs.toml`
/// 4. `~/.config/ffs/ffs.toml`
///
/// Only the explicit path and the environment variable are returned when
/// missing, so that a typo surfaces as a read error.
pub fn discover(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(path) = env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(path));
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    home::home_dir()
        .map(|home| home.join(".config").join("ffs").join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

/// Load settings from the discovered file, or defaults when there is none.
pub fn load(explicit: Option<&Path>) -> Result<Settings, ConfigError> {
    match discover(explicit) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading settings");
            load_from_path(path)
        }
        None => Ok(Settings::default()),
    }
}
