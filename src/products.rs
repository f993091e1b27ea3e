//! Products

use rust_decimal::Decimal;
use serde::Deserialize;

/// Brand tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrandTier {
    /// Premium brands
    Premium,

    /// Regular brands
    Regular,

    /// Budget brands
    Budget,
}

/// Brand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brand {
    /// Brand identifier, matched against discount targeting
    pub id: String,

    /// Display name
    pub name: String,

    /// Brand tier
    pub tier: BrandTier,
}

/// Category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Category identifier, matched against discount targeting
    pub id: String,

    /// Display name
    pub name: String,
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product identifier
    pub id: String,

    /// Product brand
    pub brand: Brand,

    /// Product category
    pub category: Category,

    /// Catalogue price
    pub base_price: Decimal,

    /// Price currently charged; starts equal to the base price
    pub current_price: Decimal,
}

impl Product {
    /// Create a product priced at its base price.
    pub fn new(id: impl Into<String>, brand: Brand, category: Category, price: Decimal) -> Self {
        Self {
            id: id.into(),
            brand,
            category,
            base_price: price,
            current_price: price,
        }
    }

    /// Reset the current price back to the catalogue price.
    pub fn reset_price(&mut self) {
        self.current_price = self.base_price;
    }
}
