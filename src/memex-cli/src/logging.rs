//! Log output setup
//!
//! Logs go to stderr so stdout stays free for the completion notice and
//! `--json` summaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for a `-v` count
///
/// The binary and the library are both the `memex` crate, so one directive
/// covers events from either.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "memex=info",
        1 => "memex=debug",
        _ => "memex=trace",
    }
}

/// `RUST_LOG` when set, otherwise the `-v` default
pub fn filter(verbosity: u8) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)))
}

/// Install the global subscriber
pub fn init(verbosity: u8) {
    tracing_subscriber::registry()
        .with(filter(verbosity))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
