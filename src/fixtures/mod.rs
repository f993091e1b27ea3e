//! Fixtures
//!
//! Sample catalogues, carts, customers, payments and discount sets loaded from YAML.

use std::{fs, path::PathBuf};

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    cart::{CartError, CartItem},
    customers::CustomerProfile,
    discounts::Discount,
    fixtures::{carts::CartsFixture, discounts::DiscountsFixture, products::ProductsFixture},
    payments::PaymentInfo,
    products::Product,
    repository::{InMemoryDiscountRepository, RepositoryError},
};

pub mod carts;
pub mod discounts;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Invalid relative validity span
    #[error("Invalid validity span: {0}")]
    InvalidSpan(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between fixture files
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Cart not found
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// Customer not found
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Payment not found
    #[error("Payment not found: {0}")]
    PaymentNotFound(String),

    /// Invalid cart line
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Discounts could not be stored
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Time relative discount validity is resolved against
    now: Timestamp,

    /// Product key -> product
    products: FxHashMap<String, Product>,

    /// Cart key -> cart items
    carts: FxHashMap<String, Vec<CartItem>>,

    /// Customer id -> customer
    customers: FxHashMap<String, CustomerProfile>,

    /// Payment key -> payment details
    payments: FxHashMap<String, PaymentInfo>,

    /// Discounts, in file order
    discounts: Vec<Discount>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            now: Timestamp::now(),
            products: FxHashMap::default(),
            carts: FxHashMap::default(),
            customers: FxHashMap::default(),
            payments: FxHashMap::default(),
            discounts: Vec::new(),
            currency: None,
        }
    }

    /// Resolve relative discount validity against `now` instead of the creation time
    #[must_use]
    pub fn at(mut self, now: Timestamp) -> Self {
        self.now = now;
        self
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: ProductsFixture = self.read("products", name)?;

        for (key, product_fixture) in fixture.products {
            let (product, currency) = product_fixture.into_product(key.clone())?;

            self.check_currency(currency)?;
            self.products.insert(key, product);
        }

        Ok(self)
    }

    /// Load carts, customers and payments from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, if a referenced product does
    /// not exist or a quantity is zero.
    pub fn load_carts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: CartsFixture = self.read("carts", name)?;

        for (key, lines) in fixture.carts {
            let items = lines
                .into_iter()
                .map(|line| {
                    let product = self.product(&line.product)?.clone();

                    Ok(CartItem::new(product, line.quantity, line.size)?)
                })
                .collect::<Result<Vec<_>, FixtureError>>()?;

            self.carts.insert(key, items);
        }

        for (id, tier) in fixture.customers {
            self.customers
                .insert(id.clone(), CustomerProfile::new(id, tier));
        }

        for (key, payment) in fixture.payments {
            self.payments.insert(key, payment.into());
        }

        Ok(self)
    }

    /// Load discounts from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if a value is invalid.
    pub fn load_discounts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let fixture: DiscountsFixture = self.read("discounts", name)?;

        for discount_fixture in fixture.discounts {
            let (discount, currencies) = discount_fixture.into_discount(self.now)?;

            for currency in currencies {
                self.check_currency(currency)?;
            }

            self.discounts.push(discount);
        }

        Ok(self)
    }

    /// Load a complete fixture set (products, carts and discounts with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::new().load_set(name)
    }

    /// Load a complete fixture set into this fixture
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(mut self, name: &str) -> Result<Self, FixtureError> {
        self.load_products(name)?
            .load_carts(name)?
            .load_discounts(name)?;

        Ok(self)
    }

    /// Get a product by its key
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, key: &str) -> Result<&Product, FixtureError> {
        self.products
            .get(key)
            .ok_or_else(|| FixtureError::ProductNotFound(key.to_string()))
    }

    /// Get a cart by its key
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is not found.
    pub fn cart(&self, key: &str) -> Result<&[CartItem], FixtureError> {
        self.carts
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| FixtureError::CartNotFound(key.to_string()))
    }

    /// Get a customer by id
    ///
    /// # Errors
    ///
    /// Returns an error if the customer is not found.
    pub fn customer(&self, id: &str) -> Result<&CustomerProfile, FixtureError> {
        self.customers
            .get(id)
            .ok_or_else(|| FixtureError::CustomerNotFound(id.to_string()))
    }

    /// Get payment details by key
    ///
    /// # Errors
    ///
    /// Returns an error if the payment is not found.
    pub fn payment(&self, key: &str) -> Result<&PaymentInfo, FixtureError> {
        self.payments
            .get(key)
            .ok_or_else(|| FixtureError::PaymentNotFound(key.to_string()))
    }

    /// Get all discounts
    pub fn discounts(&self) -> &[Discount] {
        &self.discounts
    }

    /// An in-memory repository seeded with the loaded discounts
    ///
    /// # Errors
    ///
    /// Returns an error if two discounts share an id or code.
    pub fn repository(&self) -> Result<InMemoryDiscountRepository, FixtureError> {
        Ok(InMemoryDiscountRepository::with_discounts(
            self.discounts.iter().cloned(),
        )?)
    }

    /// Get the currency
    ///
    /// # Errors
    ///
    /// Returns an error if no prices have been loaded yet.
    pub fn currency(&self) -> Result<&'static Currency, FixtureError> {
        self.currency.ok_or(FixtureError::NoCurrency)
    }

    fn read<T: serde::de::DeserializeOwned>(
        &self,
        category: &str,
        name: &str,
    ) -> Result<T, FixtureError> {
        let file_path = self.base_path.join(category).join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Ok(serde_norway::from_str(&contents)?)
    }

    fn check_currency(&mut self, currency: &'static Currency) -> Result<(), FixtureError> {
        match self.currency {
            Some(existing) if existing != currency => Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            )),
            Some(_) => Ok(()),
            None => {
                self.currency = Some(currency);

                Ok(())
            }
        }
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
