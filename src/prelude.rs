//! Rebate prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartError, CartItem, cart_total},
    customers::CustomerProfile,
    discounts::{Discount, DiscountType, DiscountValue},
    eligibility::{EvaluationContext, is_applicable},
    engine::{DiscountEngine, EngineError},
    fixtures::{Fixture, FixtureError},
    payments::{CardType, PaymentInfo, PaymentMethod},
    products::{Brand, BrandTier, Category, Product},
    receipt::{DiscountApplication, DiscountedPrice, ReceiptError},
    repository::{DiscountRepository, InMemoryDiscountRepository, RepositoryError},
    stacking::Phase,
};
