//! Rebate CLI
//!
//! Loads a fixture set, evaluates one cart against its discounts and validates a list of
//! discount codes.

use std::process;

use tracing::error;

use crate::config::CliConfig;

mod config;
mod error;
mod logging;
mod run;

/// Rebate CLI entry point
pub fn main() {
    let config = CliConfig::load().unwrap_or_else(|e| {
        #[expect(
            clippy::print_stderr,
            reason = "logging not initialized yet, must use eprintln for config errors"
        )]
        {
            eprintln!("Configuration error: {e}");
        }

        process::exit(1);
    });

    if let Err(source) = logging::init(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, must use eprintln"
        )]
        {
            eprintln!("{source}");
        }

        process::exit(1);
    }

    if let Err(source) = run::run(&config) {
        error!("{source}");

        process::exit(1);
    }
}
