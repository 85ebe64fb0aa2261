//! Diagnostic logging to stderr.
//!
//! Stdout carries command output only, so logs never mix into `--json`.
//! `RUST_LOG` overrides the verbosity flags when set.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Filter directive for a `-v` count: warn, info, then debug.
fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "cookie_lens=warn",
        1 => "cookie_lens=info",
        _ => "cookie_lens=debug",
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbosity: u8, use_color: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(use_color)
                .with_target(false),
        )
        .try_init();
}
