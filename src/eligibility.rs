//! Eligibility
//!
//! Decides whether a discount applies to a cart, customer and payment at a point in time.
//! Every check is pure; the same inputs always give the same answer.

use jiff::Timestamp;

use crate::{
    cart::{CartItem, cart_total},
    customers::CustomerProfile,
    discounts::{Discount, DiscountType},
    payments::PaymentInfo,
};

/// Inputs an eligibility check is evaluated against
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Items in the cart, at their current prices
    pub cart: &'a [CartItem],

    /// Customer placing the order
    pub customer: &'a CustomerProfile,

    /// Payment details, if known
    pub payment: Option<&'a PaymentInfo>,

    /// Point in time validity windows are checked at
    pub now: Timestamp,
}

impl<'a> EvaluationContext<'a> {
    /// Create a new context.
    pub fn new(
        cart: &'a [CartItem],
        customer: &'a CustomerProfile,
        payment: Option<&'a PaymentInfo>,
        now: Timestamp,
    ) -> Self {
        Self {
            cart,
            customer,
            payment,
            now,
        }
    }
}

/// Whether `discount` applies when evaluated as a discount of type `evaluator`.
///
/// A discount whose declared type differs from `evaluator` never applies.
pub fn is_applicable(
    evaluator: DiscountType,
    discount: &Discount,
    ctx: &EvaluationContext<'_>,
) -> bool {
    if discount.kind != evaluator
        || !discount.is_valid_at(ctx.now)
        || !discount.allows_customer(ctx.customer)
        || !meets_minimum_order(discount, ctx.cart)
    {
        return false;
    }

    match evaluator {
        DiscountType::Brand | DiscountType::Category => any_item_matches(discount, ctx.cart),
        DiscountType::Voucher => voucher_applies(discount, ctx.cart),
        DiscountType::Bank => bank_applies(discount, ctx.payment),
    }
}

/// Whether the cart's current total reaches the discount's minimum order amount
fn meets_minimum_order(discount: &Discount, cart: &[CartItem]) -> bool {
    discount
        .minimum_order()
        .is_none_or(|minimum| cart_total(cart) >= minimum)
}

fn any_item_matches(discount: &Discount, cart: &[CartItem]) -> bool {
    cart.iter()
        .any(|item| discount.matches_product(item.product()))
}

fn voucher_applies(discount: &Discount, cart: &[CartItem]) -> bool {
    if any_item_matches(discount, cart) {
        return true;
    }

    discount.applicable_to.is_empty() && discount.excluded_items.is_empty() && !cart.is_empty()
}

fn bank_applies(discount: &Discount, payment: Option<&PaymentInfo>) -> bool {
    let Some(payment) = payment else {
        return false;
    };

    if !payment.is_card() {
        return false;
    }

    if discount.applicable_to.is_empty() {
        return true;
    }

    payment
        .bank_name
        .as_ref()
        .is_some_and(|bank| discount.applicable_to.contains(bank))
}
