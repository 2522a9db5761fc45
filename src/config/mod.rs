pub mod loader;
pub mod schema;

pub use loader::{discover, load, load_from_path, load_from_str, ConfigError, CONFIG_ENV};
pub use schema::{EditSettings, Settings, TreeSettings, ValidationError, ValidationIssue};
