//! Library-level integration tests
//!
//! Exercise the public API across module boundaries against real files

mod agent_suggestions;
mod edit_workflow;
mod line_patches;
mod search_engine;
