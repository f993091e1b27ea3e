//! Rebate
//!
//! Rebate is a cart discount stacking engine: it decides which brand, category, voucher and
//! bank discounts apply to a shopping cart and applies them in a fixed phase order.

pub mod calculator;
pub mod cart;
pub mod customers;
pub mod discounts;
pub mod eligibility;
pub mod engine;
pub mod fixtures;
pub mod payments;
pub mod prelude;
pub mod products;
pub mod receipt;
pub mod repository;
pub mod stacking;
