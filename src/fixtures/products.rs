//! Product Fixtures

use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::iso::{Currency, EUR, GBP, INR, USD};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    products::{Brand, BrandTier, Category, Product},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product brand
    pub brand: BrandFixture,

    /// Product category
    pub category: CategoryFixture,

    /// Product price (e.g., "1000 INR")
    pub price: String,
}

/// Brand Fixture
#[derive(Debug, Deserialize)]
pub struct BrandFixture {
    /// Brand identifier
    pub id: String,

    /// Display name, defaults to the id
    #[serde(default)]
    pub name: Option<String>,

    /// Brand tier
    pub tier: BrandTier,
}

/// Category Fixture
#[derive(Debug, Deserialize)]
pub struct CategoryFixture {
    /// Category identifier
    pub id: String,

    /// Display name, defaults to the id
    #[serde(default)]
    pub name: Option<String>,
}

impl ProductFixture {
    /// Build the product with the given id, returning the currency its price was given in.
    ///
    /// # Errors
    ///
    /// Returns an error if the price cannot be parsed.
    pub fn into_product(
        self,
        id: impl Into<String>,
    ) -> Result<(Product, &'static Currency), FixtureError> {
        let (price, currency) = parse_price(&self.price)?;

        let brand = Brand {
            name: self.brand.name.unwrap_or_else(|| self.brand.id.clone()),
            id: self.brand.id,
            tier: self.brand.tier,
        };

        let category = Category {
            name: self.category.name.unwrap_or_else(|| self.category.id.clone()),
            id: self.category.id,
        };

        Ok((Product::new(id, brand, category, price), currency))
    }
}

/// Parse price string (e.g., "1000 INR") into an amount and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY", if the amount
/// is not a non-negative decimal, or if the currency code is not recognized.
pub fn parse_price(s: &str) -> Result<(Decimal, &'static Currency), FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(currency_code), None) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    if amount.is_sign_negative() {
        return Err(FixtureError::InvalidPrice(s.to_string()));
    }

    let currency = match currency_code {
        "INR" => INR,
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((amount, currency))
}
