//! Logging and tracing setup
//!
//! The binary calls [`init_tracing`] once at startup. Libraries only emit
//! `tracing` events and never install a subscriber themselves.

use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset or unparsable
pub const DEFAULT_FILTER: &str = "info";

/// Install the global subscriber
///
/// Logs go to stderr so that stdout stays free for command output. `json`
/// switches the formatter to one JSON object per line.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(json: bool) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).try_init()
    } else {
        registry.with(fmt::layer().with_target(false).with_writer(std::io::stderr)).try_init()
    };

    result.is_ok()
}
