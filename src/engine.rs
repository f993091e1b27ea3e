//! Discount Engine

use jiff::Timestamp;
use thiserror::Error;
use tracing::{Span, debug, info};

use crate::{
    cart::{CartItem, cart_total},
    customers::CustomerProfile,
    eligibility::{EvaluationContext, is_applicable},
    payments::PaymentInfo,
    receipt::DiscountedPrice,
    repository::{DiscountRepository, RepositoryError},
    stacking::{Phase, StackingState, apply_phase},
};

/// Errors returned by the discount engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The cart has no items
    #[error("cart is empty")]
    EmptyCart,

    /// The discount code is empty
    #[error("discount code is empty")]
    EmptyCode,

    /// Reading the active discounts failed
    #[error("failed to fetch active discounts")]
    FetchDiscounts {
        /// Underlying repository error
        #[source]
        source: RepositoryError,
    },

    /// Claiming a discount's usage failed
    #[error("failed to claim usage of discount {discount_id} in {phase} phase")]
    IncrementUsage {
        /// Phase the discount was applied in
        phase: Phase,

        /// Discount being claimed
        discount_id: String,

        /// Underlying repository error
        #[source]
        source: RepositoryError,
    },

    /// Looking up a discount code failed
    #[error("failed to look up discount code {code}")]
    LookupCode {
        /// Code being looked up
        code: String,

        /// Underlying repository error
        #[source]
        source: RepositoryError,
    },
}

/// Evaluates carts against the discounts held by a repository.
#[derive(Debug, Clone)]
pub struct DiscountEngine<R> {
    repository: R,
}

impl<R: DiscountRepository> DiscountEngine<R> {
    /// Create an engine backed by `repository`.
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// The backing repository
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Apply every eligible discount to the cart at the current time.
    ///
    /// # Errors
    ///
    /// See [`DiscountEngine::calculate_cart_discounts_at`].
    pub fn calculate_cart_discounts(
        &self,
        cart: &[CartItem],
        customer: &CustomerProfile,
        payment: Option<&PaymentInfo>,
    ) -> Result<DiscountedPrice, EngineError> {
        self.calculate_cart_discounts_at(cart, customer, payment, Timestamp::now())
    }

    /// Apply every eligible discount to the cart as of `now`.
    ///
    /// Brand and category discounts are applied first, then vouchers, then bank offers.
    /// Each applied discount claims one use from the repository. Claims already made are
    /// kept if a later claim fails.
    ///
    /// # Errors
    ///
    /// - [`EngineError::EmptyCart`] if `cart` is empty.
    /// - [`EngineError::FetchDiscounts`] if the active discounts cannot be read.
    /// - [`EngineError::IncrementUsage`] if claiming usage fails for a reason other than an
    ///   exhausted usage limit.
    #[tracing::instrument(
        name = "engine.calculate_cart_discounts",
        skip(self, cart, customer, payment),
        fields(
            customer_id = %customer.id,
            item_count = cart.len(),
            applied_count = tracing::field::Empty,
            final_total = tracing::field::Empty
        ),
        err
    )]
    pub fn calculate_cart_discounts_at(
        &self,
        cart: &[CartItem],
        customer: &CustomerProfile,
        payment: Option<&PaymentInfo>,
        now: Timestamp,
    ) -> Result<DiscountedPrice, EngineError> {
        if cart.is_empty() {
            return Err(EngineError::EmptyCart);
        }

        let original_total = cart_total(cart);

        let discounts = self
            .repository
            .active_discounts(now)
            .map_err(|source| EngineError::FetchDiscounts { source })?;

        let ctx = EvaluationContext::new(cart, customer, payment, now);

        let state = Phase::ORDER.into_iter().try_fold(
            StackingState::new(original_total),
            |state, phase| apply_phase(phase, &discounts, &ctx, state, &self.repository),
        )?;

        let span = Span::current();

        span.record("applied_count", state.applications.len());
        span.record("final_total", tracing::field::display(state.running_total));

        let price = DiscountedPrice::new(original_total, state.running_total, state.applications);

        info!(
            %original_total,
            final_total = %price.final_total(),
            "evaluated cart discounts"
        );

        Ok(price)
    }

    /// Whether the discount behind `code` would apply to the cart at the current time.
    ///
    /// # Errors
    ///
    /// See [`DiscountEngine::validate_discount_code_at`].
    pub fn validate_discount_code(
        &self,
        code: &str,
        cart: &[CartItem],
        customer: &CustomerProfile,
    ) -> Result<bool, EngineError> {
        self.validate_discount_code_at(code, cart, customer, Timestamp::now())
    }

    /// Whether the discount behind `code` would apply to the cart as of `now`.
    ///
    /// This is a dry run: nothing is applied and no usage is claimed. Payment details are
    /// not known at this point, so bank offers never validate. Unknown codes are not
    /// errors, they are simply invalid.
    ///
    /// # Errors
    ///
    /// - [`EngineError::EmptyCode`] if `code` is empty.
    /// - [`EngineError::LookupCode`] if the repository fails for any reason other than the
    ///   code not existing.
    #[tracing::instrument(
        name = "engine.validate_discount_code",
        skip(self, cart, customer),
        fields(customer_id = %customer.id, valid = tracing::field::Empty),
        err
    )]
    pub fn validate_discount_code_at(
        &self,
        code: &str,
        cart: &[CartItem],
        customer: &CustomerProfile,
        now: Timestamp,
    ) -> Result<bool, EngineError> {
        if code.is_empty() {
            return Err(EngineError::EmptyCode);
        }

        let discount = match self.repository.discount_by_code(code) {
            Ok(discount) => discount,
            Err(error) if error.is_not_found() => {
                debug!("unknown discount code");
                Span::current().record("valid", false);

                return Ok(false);
            }
            Err(source) => {
                return Err(EngineError::LookupCode {
                    code: code.to_string(),
                    source,
                });
            }
        };

        let ctx = EvaluationContext::new(cart, customer, None, now);
        let valid = is_applicable(discount.kind, &discount, &ctx);

        Span::current().record("valid", valid);

        Ok(valid)
    }
}
