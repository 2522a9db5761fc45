//! Tracing subscriber setup for the command-line tool.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, checked before
/// `RUST_LOG`.
pub const LOG_ENV: &str = "FFS_LOG";

/// Filter directive for a `-v` count: 0 warn, 1 info, 2 debug, 3+ trace.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a stderr `fmt` subscriber. Calling it twice is harmless.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
