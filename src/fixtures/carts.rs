//! Cart Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::payments::{CardType, PaymentInfo, PaymentMethod};

/// Carts, customers and payments in YAML
#[derive(Debug, Deserialize)]
pub struct CartsFixture {
    /// Map of cart key -> cart lines
    pub carts: FxHashMap<String, Vec<CartLineFixture>>,

    /// Map of customer id -> customer tier
    #[serde(default)]
    pub customers: FxHashMap<String, String>,

    /// Map of payment key -> payment details
    #[serde(default)]
    pub payments: FxHashMap<String, PaymentFixture>,
}

/// Cart line fixture
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Product key in the products fixture
    pub product: String,

    /// Quantity
    pub quantity: u32,

    /// Size
    #[serde(default)]
    pub size: String,
}

/// Payment fixture
#[derive(Debug, Deserialize)]
pub struct PaymentFixture {
    /// Payment method code (e.g., "CARD", "UPI")
    pub method: PaymentMethod,

    /// Issuing bank
    #[serde(default)]
    pub bank: Option<String>,

    /// Card type
    #[serde(default)]
    pub card_type: Option<CardType>,
}

impl From<PaymentFixture> for PaymentInfo {
    fn from(fixture: PaymentFixture) -> Self {
        Self {
            method: fixture.method,
            bank_name: fixture.bank,
            card_type: fixture.card_type,
        }
    }
}
