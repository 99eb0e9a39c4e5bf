//! Log output setup
//!
//! Logs go to stderr so command output on stdout (registry JSON, manager
//! responses) can be piped. `RUST_LOG` overrides the level chosen by flags.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber; later calls are no-ops
pub fn init(verbose: bool, json: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let result = if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("log subscriber already installed");
    }
}
