//! Logging setup for the command-line tool.
//!
//! Events go to stderr so they never mix with a script being filtered
//! from stdin to stdout.
//!
//! ```bash
//! # Per-file progress
//! elvish-upgrade -vv lib/*.elv
//!
//! # Fine-grained filtering
//! ELVISH_UPGRADE_LOG="elvish_upgrade::driver=trace" elvish-upgrade x.elv
//! ```

use tracing_subscriber::{fmt, EnvFilter};

/// Name of the variable that overrides the level picked from `-v`.
pub const LOG_ENV: &str = "ELVISH_UPGRADE_LOG";

/// Level directive for a repeat count of `-v`.
pub fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Build an `EnvFilter` from `ELVISH_UPGRADE_LOG`, then `RUST_LOG`, and
/// finally from the verbosity flag.
fn build_filter(verbosity: u8) -> EnvFilter {
    if let Ok(val) = std::env::var(LOG_ENV) {
        EnvFilter::builder().parse_lossy(val)
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(level_for(verbosity))
    }
}

/// Install the global subscriber. Safe to call more than once; later
/// calls are ignored.
pub fn init_tracing(verbosity: u8) {
    let _ = fmt()
        .with_env_filter(build_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
