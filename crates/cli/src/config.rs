//! CLI configuration

use std::path::PathBuf;

use clap::{Args, Parser};

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Fixture settings.
#[derive(Debug, Args)]
pub struct FixtureConfig {
    /// Directory holding the `products`, `carts` and `discounts` fixture folders
    #[arg(long, env = "REBATE_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Fixture set name
    #[arg(short, long, env = "REBATE_FIXTURE", default_value = "sample")]
    pub fixture: String,

    /// ISO currency code amounts are displayed in
    #[arg(long, env = "REBATE_CURRENCY", default_value = "INR")]
    pub currency: String,
}

/// Scenario settings, keyed into the fixture set.
#[derive(Debug, Args)]
pub struct ScenarioConfig {
    /// Cart key
    #[arg(long, default_value = "multiple")]
    pub cart: String,

    /// Customer id
    #[arg(long, default_value = "cust-001")]
    pub customer: String,

    /// Payment key
    #[arg(long, default_value = "icici_credit", conflicts_with = "without_payment")]
    pub payment: String,

    /// Evaluate without any payment details
    #[arg(long)]
    pub without_payment: bool,

    /// Discount code to validate against the cart; repeat for several
    #[arg(long = "code")]
    pub codes: Vec<String>,
}

/// Codes validated when none are given, including an empty one.
const DEFAULT_CODES: [&str; 4] = ["SUPER69", "PREMIUM15", "INVALID123", ""];

impl ScenarioConfig {
    /// Payment key to evaluate with, if any
    pub fn payment_key(&self) -> Option<&str> {
        (!self.without_payment).then_some(self.payment.as_str())
    }

    /// Codes to validate
    pub fn codes(&self) -> Vec<&str> {
        if self.codes.is_empty() {
            return DEFAULT_CODES.to_vec();
        }

        self.codes.iter().map(String::as_str).collect()
    }
}

/// Rebate CLI configuration
#[derive(Debug, Parser)]
#[command(
    name = "rebate",
    about = "Evaluate cart discounts against a fixture set",
    long_about = None
)]
pub struct CliConfig {
    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Fixture settings.
    #[command(flatten)]
    pub fixtures: FixtureConfig,

    /// Scenario settings.
    #[command(flatten)]
    pub scenario: ScenarioConfig,
}

impl CliConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
