//! CLI errors

use rebate::{engine::EngineError, fixtures::FixtureError, receipt::ReceiptError};
use thiserror::Error;

/// Errors that end a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    /// Failed to initialise the tracing subscriber
    #[error("failed to initialise tracing subscriber: {0}")]
    TracingSubscriber(#[from] tracing_subscriber::util::TryInitError),

    /// Failed to load the fixture set
    #[error("failed to load fixtures: {0}")]
    Fixture(#[from] FixtureError),

    /// Evaluating the cart failed
    #[error("failed to evaluate cart: {0}")]
    Engine(#[from] EngineError),

    /// Rendering the receipt failed
    #[error("failed to render receipt: {0}")]
    Receipt(#[from] ReceiptError),

    /// Display currency is not a known ISO code
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Writing output failed
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}
