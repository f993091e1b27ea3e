//! Stacking
//!
//! Discounts are applied in three phases: brand and category offers first, then vouchers,
//! then bank offers. Each phase works on the running total the previous one left behind.

use std::fmt;

use rust_decimal::Decimal;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::{
    calculator,
    discounts::{Discount, DiscountType},
    eligibility::{EvaluationContext, is_applicable},
    engine::EngineError,
    receipt::DiscountApplication,
    repository::{DiscountRepository, RepositoryError},
};

/// Stacking phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Brand and category offers
    BrandCategory,

    /// Code based vouchers
    Voucher,

    /// Card offers
    Bank,
}

impl Phase {
    /// Phases in the order they are applied.
    pub const ORDER: [Phase; 3] = [Self::BrandCategory, Self::Voucher, Self::Bank];

    /// Discount types applied in this phase
    pub const fn kinds(self) -> &'static [DiscountType] {
        match self {
            Self::BrandCategory => &[DiscountType::Brand, DiscountType::Category],
            Self::Voucher => &[DiscountType::Voucher],
            Self::Bank => &[DiscountType::Bank],
        }
    }

    /// The phase a discount type is applied in
    pub const fn of(kind: DiscountType) -> Self {
        match kind {
            DiscountType::Brand | DiscountType::Category => Self::BrandCategory,
            DiscountType::Voucher => Self::Voucher,
            DiscountType::Bank => Self::Bank,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::BrandCategory => "Brand & Category",
            Self::Voucher => "Voucher",
            Self::Bank => "Bank",
        })
    }
}

/// Running total and applications threaded through the phases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackingState {
    /// Cart total left after the discounts applied so far
    pub running_total: Decimal,

    /// Discounts applied so far, in order
    pub applications: SmallVec<[DiscountApplication; 4]>,
}

impl StackingState {
    /// Start from the undiscounted cart total.
    pub fn new(original_total: Decimal) -> Self {
        Self {
            running_total: original_total,
            applications: SmallVec::new(),
        }
    }
}

/// Eligible discounts of the phase, highest priority first, ties by ascending id.
pub fn phase_candidates<'d>(
    phase: Phase,
    discounts: &'d [Discount],
    ctx: &EvaluationContext<'_>,
) -> Vec<&'d Discount> {
    let mut candidates: Vec<&Discount> = discounts
        .iter()
        .filter(|discount| {
            phase.kinds().contains(&discount.kind) && is_applicable(discount.kind, discount, ctx)
        })
        .collect();

    candidates.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));

    candidates
}

/// Apply every eligible discount of `phase` against the running total in `state`.
///
/// Zero amounts are skipped without claiming usage. A discount whose usage limit is
/// exhausted by the time it is claimed is skipped; any other repository failure aborts.
///
/// # Errors
///
/// Returns [`EngineError::IncrementUsage`] when claiming usage fails for a reason other
/// than an exhausted limit.
pub fn apply_phase<R: DiscountRepository + ?Sized>(
    phase: Phase,
    discounts: &[Discount],
    ctx: &EvaluationContext<'_>,
    mut state: StackingState,
    repository: &R,
) -> Result<StackingState, EngineError> {
    for discount in phase_candidates(phase, discounts, ctx) {
        let amount = calculator::calculate(discount, ctx.cart, state.running_total);

        if amount <= Decimal::ZERO {
            continue;
        }

        match repository.increment_usage_count(&discount.id) {
            Ok(_) => {}
            Err(RepositoryError::UsageLimitReached { id, limit }) => {
                warn!(%phase, discount_id = %id, limit, "usage limit reached, skipping discount");
                continue;
            }
            Err(source) => {
                return Err(EngineError::IncrementUsage {
                    phase,
                    discount_id: discount.id.clone(),
                    source,
                });
            }
        }

        state.running_total -= amount;

        debug!(
            %phase,
            discount_id = %discount.id,
            %amount,
            running_total = %state.running_total,
            "applied discount"
        );

        state.applications.push(DiscountApplication {
            discount_id: discount.id.clone(),
            name: discount.name.clone(),
            kind: discount.kind,
            amount,
        });
    }

    Ok(state)
}
