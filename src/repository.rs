//! Discount Repository

use jiff::Timestamp;
use mockall::automock;
use thiserror::Error;

use crate::discounts::Discount;

pub mod memory;

pub use memory::InMemoryDiscountRepository;

/// Errors raised by discount storage.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No discount with the given id
    #[error("discount not found: {0}")]
    NotFound(String),

    /// No discount with the given code
    #[error("discount code not found: {0}")]
    CodeNotFound(String),

    /// A discount with the given id already exists
    #[error("discount already exists: {0}")]
    AlreadyExists(String),

    /// Another discount already uses the given code
    #[error("discount code already exists: {0}")]
    CodeAlreadyExists(String),

    /// The discount's usage limit is exhausted
    #[error("discount {id} has reached its usage limit of {limit}")]
    UsageLimitReached {
        /// Discount id
        id: String,

        /// Configured usage limit
        limit: u32,
    },

    /// Shared state was poisoned by a panicking writer
    #[error("discount storage lock poisoned")]
    Poisoned,

    /// Underlying storage failed
    #[error("discount storage failure: {0}")]
    Storage(String),
}

impl RepositoryError {
    /// Whether this error means the requested discount does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::CodeNotFound(_))
    }
}

/// Storage of discount rules.
///
/// Implementations must make reads of the active set and usage increments linearizable
/// per discount id. [`DiscountRepository::increment_usage_count`] is a check-and-increment:
/// it must never push a discount past its usage limit.
#[automock]
pub trait DiscountRepository: Send + Sync {
    /// Discounts that are active, inside their validity window and under their usage
    /// limit at `now`.
    fn active_discounts(&self, now: Timestamp) -> Result<Vec<Discount>, RepositoryError>;

    /// Look up a discount by its voucher code.
    fn discount_by_code(&self, code: &str) -> Result<Discount, RepositoryError>;

    /// Look up a discount by id.
    fn discount_by_id(&self, id: &str) -> Result<Discount, RepositoryError>;

    /// Store a new discount.
    fn create_discount(&self, discount: Discount) -> Result<(), RepositoryError>;

    /// Replace an existing discount.
    fn update_discount(&self, discount: Discount) -> Result<(), RepositoryError>;

    /// Remove a discount.
    fn delete_discount(&self, id: &str) -> Result<(), RepositoryError>;

    /// Atomically bump the used count of a discount, returning the new count.
    ///
    /// Fails with [`RepositoryError::UsageLimitReached`] instead of exceeding a non-zero
    /// usage limit.
    fn increment_usage_count(&self, id: &str) -> Result<u32, RepositoryError>;
}
