//! Discount Fixtures

use jiff::{SignedDuration, Timestamp};
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::Deserialize;

use crate::{
    discounts::{Discount, DiscountType, DiscountValue},
    fixtures::{FixtureError, products::parse_price},
};

/// Wrapper for discounts in YAML
#[derive(Debug, Deserialize)]
pub struct DiscountsFixture {
    /// Discount rules
    pub discounts: Vec<DiscountFixture>,
}

/// Discount value configuration from YAML fixtures
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountValueFixture {
    /// Percentage of the eligible base (e.g., "40%")
    Percentage {
        /// Percent points with a trailing `%`
        value: String,
    },

    /// Fixed amount off (e.g., "150 INR")
    AmountOff {
        /// Price string
        value: String,
    },
}

/// Validity window relative to the time the fixture is loaded
#[derive(Debug, Deserialize)]
pub struct RelativeValidity {
    /// Offset of the window start (e.g., "-24h")
    pub starts: String,

    /// Offset of the window end (e.g., "720h")
    pub ends: String,
}

/// Discount Fixture
#[derive(Debug, Deserialize)]
pub struct DiscountFixture {
    /// Unique identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Discount type
    #[serde(rename = "type")]
    pub kind: DiscountType,

    /// Discount value
    pub value: DiscountValueFixture,

    /// Minimum cart total (e.g., "500 INR")
    #[serde(default)]
    pub min_amount: Option<String>,

    /// Maximum discount amount (e.g., "200 INR")
    #[serde(default)]
    pub max_amount: Option<String>,

    /// Targeted brand ids, category ids or banks
    #[serde(default)]
    pub applicable_to: Vec<String>,

    /// Excluded brand or category ids
    #[serde(default)]
    pub excluded_items: Vec<String>,

    /// Allowed customer tiers
    #[serde(default)]
    pub customer_tiers: Vec<String>,

    /// Voucher code
    #[serde(default)]
    pub code: Option<String>,

    /// Absolute window start
    #[serde(default)]
    pub valid_from: Option<Timestamp>,

    /// Absolute window end
    #[serde(default)]
    pub valid_to: Option<Timestamp>,

    /// Window relative to load time; takes precedence over absolute bounds
    #[serde(default)]
    pub valid_for: Option<RelativeValidity>,

    /// Whether the discount is switched on
    #[serde(default = "enabled")]
    pub is_active: bool,

    /// Usage limit, zero for unlimited
    #[serde(default)]
    pub usage_limit: u32,

    /// Uses so far
    #[serde(default)]
    pub used_count: u32,

    /// Priority within its phase
    #[serde(default)]
    pub priority: i32,
}

fn enabled() -> bool {
    true
}

impl DiscountFixture {
    /// Build the discount, resolving relative validity against `now`.
    ///
    /// Every amount is returned alongside its currency so the caller can check it against
    /// the catalogue.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount, percentage or validity span cannot be parsed.
    pub fn into_discount(
        self,
        now: Timestamp,
    ) -> Result<(Discount, Vec<&'static Currency>), FixtureError> {
        let mut currencies = Vec::new();

        let mut amount = |value: &str| -> Result<Decimal, FixtureError> {
            let (amount, currency) = parse_price(value)?;

            currencies.push(currency);

            Ok(amount)
        };

        let value = match &self.value {
            DiscountValueFixture::Percentage { value } => {
                DiscountValue::Percentage(parse_percent_points(value)?)
            }
            DiscountValueFixture::AmountOff { value } => DiscountValue::Fixed(amount(value)?),
        };

        let min_amount = self.min_amount.as_deref().map(&mut amount).transpose()?;
        let max_amount = self.max_amount.as_deref().map(&mut amount).transpose()?;

        let (valid_from, valid_to) = match &self.valid_for {
            Some(relative) => (
                offset(now, &relative.starts)?,
                offset(now, &relative.ends)?,
            ),
            None => (
                self.valid_from.unwrap_or(Timestamp::MIN),
                self.valid_to.unwrap_or(Timestamp::MAX),
            ),
        };

        let mut discount = Discount::new(self.id, self.name, self.kind, value)
            .with_min_amount(min_amount.unwrap_or(Decimal::ZERO))
            .with_max_amount(max_amount.unwrap_or(Decimal::ZERO))
            .with_applicable_to(self.applicable_to)
            .with_excluded_items(self.excluded_items)
            .with_customer_tiers(self.customer_tiers)
            .with_validity(valid_from, valid_to)
            .with_active(self.is_active)
            .with_usage(self.usage_limit, self.used_count)
            .with_priority(self.priority);

        if let Some(code) = self.code {
            discount = discount.with_code(code);
        }

        Ok((discount, currencies))
    }
}

/// Parse a percentage string (e.g., "40%" or "12.5%") into percent points between 0 and 100
///
/// # Errors
///
/// Returns an error if the value is missing its `%` suffix, is not a decimal, or falls
/// outside 0-100.
pub fn parse_percent_points(s: &str) -> Result<Decimal, FixtureError> {
    let points = s
        .trim()
        .strip_suffix('%')
        .ok_or_else(|| FixtureError::InvalidPercentage(s.to_string()))?
        .trim()
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

    if points < Decimal::ZERO || points > Decimal::ONE_HUNDRED {
        return Err(FixtureError::InvalidPercentage(s.to_string()));
    }

    Ok(points)
}

/// `now` shifted by a signed duration such as "-24h" or "720h"
fn offset(now: Timestamp, span: &str) -> Result<Timestamp, FixtureError> {
    let duration = span
        .parse::<SignedDuration>()
        .map_err(|_err| FixtureError::InvalidSpan(span.to_string()))?;

    now.checked_add(duration)
        .map_err(|_err| FixtureError::InvalidSpan(span.to_string()))
}
