//! Discounts

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::{customers::CustomerProfile, products::Product};

/// Kind of discount, which also decides the stacking phase it is applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// Targets items of the listed brands
    Brand,

    /// Targets items of the listed categories
    Category,

    /// Code-based voucher applied to the cart
    Voucher,

    /// Card offer from the listed banks
    Bank,
}

impl DiscountType {
    /// All discount types.
    pub const ALL: [DiscountType; 4] = [Self::Brand, Self::Category, Self::Voucher, Self::Bank];

    /// Returns the type as a lowercase string
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Category => "category",
            Self::Voucher => "voucher",
            Self::Bank => "bank",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discount value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscountValue {
    /// Percentage off the eligible base, in percent points (0-100)
    Percentage(Decimal),

    /// Fixed amount off
    Fixed(Decimal),
}

impl DiscountValue {
    /// Returns the raw value (percent points or amount)
    pub fn value(&self) -> Decimal {
        match self {
            Self::Percentage(value) | Self::Fixed(value) => *value,
        }
    }

    /// Whether the value is a percentage
    pub fn is_percentage(&self) -> bool {
        matches!(self, Self::Percentage(_))
    }
}

/// A discount rule
#[derive(Debug, Clone, PartialEq)]
pub struct Discount {
    /// Unique identifier
    pub id: String,

    /// Display name, used as the key in applied discount summaries
    pub name: String,

    /// Discount type
    pub kind: DiscountType,

    /// Percentage or fixed value
    pub value: DiscountValue,

    /// Minimum cart total required; zero means no minimum
    pub min_amount: Decimal,

    /// Maximum amount removed; zero means uncapped
    pub max_amount: Decimal,

    /// Brand ids, category ids or bank names this discount targets
    pub applicable_to: FxHashSet<String>,

    /// Brand or category ids this discount never applies to
    pub excluded_items: FxHashSet<String>,

    /// Customer tiers allowed to use this discount; empty means everyone
    pub customer_tiers: FxHashSet<String>,

    /// Voucher code
    pub code: Option<String>,

    /// Start of the validity window (inclusive)
    pub valid_from: Timestamp,

    /// End of the validity window (exclusive)
    pub valid_to: Timestamp,

    /// Whether the discount is switched on
    pub is_active: bool,

    /// Maximum number of applications; zero means unlimited
    pub usage_limit: u32,

    /// Number of successful applications so far
    pub used_count: u32,

    /// Higher priorities apply earlier within a phase
    pub priority: i32,
}

impl Discount {
    /// Create an active, always-valid, unrestricted discount.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: DiscountType,
        value: DiscountValue,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            value,
            min_amount: Decimal::ZERO,
            max_amount: Decimal::ZERO,
            applicable_to: FxHashSet::default(),
            excluded_items: FxHashSet::default(),
            customer_tiers: FxHashSet::default(),
            code: None,
            valid_from: Timestamp::MIN,
            valid_to: Timestamp::MAX,
            is_active: true,
            usage_limit: 0,
            used_count: 0,
            priority: 0,
        }
    }

    /// Set the minimum cart total
    #[must_use]
    pub fn with_min_amount(mut self, min_amount: Decimal) -> Self {
        self.min_amount = min_amount;
        self
    }

    /// Set the maximum discount amount
    #[must_use]
    pub fn with_max_amount(mut self, max_amount: Decimal) -> Self {
        self.max_amount = max_amount;
        self
    }

    /// Set the targeted brands, categories or banks
    #[must_use]
    pub fn with_applicable_to<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.applicable_to = targets.into_iter().map(Into::into).collect();
        self
    }

    /// Set the excluded brands or categories
    #[must_use]
    pub fn with_excluded_items<I, S>(mut self, excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_items = excluded.into_iter().map(Into::into).collect();
        self
    }

    /// Set the allowed customer tiers
    #[must_use]
    pub fn with_customer_tiers<I, S>(mut self, tiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.customer_tiers = tiers.into_iter().map(Into::into).collect();
        self
    }

    /// Set the voucher code
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set the validity window
    #[must_use]
    pub fn with_validity(mut self, valid_from: Timestamp, valid_to: Timestamp) -> Self {
        self.valid_from = valid_from;
        self.valid_to = valid_to;
        self
    }

    /// Set the active flag
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Set the usage limit and current count
    #[must_use]
    pub fn with_usage(mut self, usage_limit: u32, used_count: u32) -> Self {
        self.usage_limit = usage_limit;
        self.used_count = used_count;
        self
    }

    /// Set the priority
    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Minimum cart total, if one is set
    pub fn minimum_order(&self) -> Option<Decimal> {
        (!self.min_amount.is_zero()).then_some(self.min_amount)
    }

    /// Maximum discount amount, if one is set
    pub fn cap(&self) -> Option<Decimal> {
        (!self.max_amount.is_zero()).then_some(self.max_amount)
    }

    /// Whether another application fits within the usage limit
    pub fn has_usage_remaining(&self) -> bool {
        self.usage_limit == 0 || self.used_count < self.usage_limit
    }

    /// Whether the discount is active, inside its window and under its usage limit at `now`
    pub fn is_valid_at(&self, now: Timestamp) -> bool {
        self.is_active
            && self.valid_from <= now
            && now < self.valid_to
            && self.has_usage_remaining()
    }

    /// Whether the customer's tier is allowed
    pub fn allows_customer(&self, customer: &CustomerProfile) -> bool {
        self.customer_tiers.is_empty() || self.customer_tiers.contains(&customer.tier)
    }

    /// Whether the product's brand or category is excluded
    pub fn is_excluded(&self, product: &Product) -> bool {
        self.excluded_items.contains(&product.brand.id)
            || self.excluded_items.contains(&product.category.id)
    }

    /// Whether the product is targeted by this discount and not excluded.
    ///
    /// An empty target list matches every product. Vouchers match on either brand or
    /// category; bank offers are not item-scoped and match every product.
    pub fn matches_product(&self, product: &Product) -> bool {
        if self.is_excluded(product) {
            return false;
        }

        if self.applicable_to.is_empty() {
            return true;
        }

        match self.kind {
            DiscountType::Brand => self.applicable_to.contains(&product.brand.id),
            DiscountType::Category => self.applicable_to.contains(&product.category.id),
            DiscountType::Voucher => {
                self.applicable_to.contains(&product.brand.id)
                    || self.applicable_to.contains(&product.category.id)
            }
            DiscountType::Bank => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};

    use crate::products::{Brand, BrandTier, Category};

    use super::*;

    fn product(brand: &str, category: &str) -> Product {
        Product::new(
            "prod",
            Brand {
                id: brand.to_string(),
                name: brand.to_string(),
                tier: BrandTier::Premium,
            },
            Category {
                id: category.to_string(),
                name: category.to_string(),
            },
            Decimal::from(100),
        )
    }

    fn brand_discount() -> Discount {
        Discount::new(
            "disc-001",
            "PUMA 40% off",
            DiscountType::Brand,
            DiscountValue::Percentage(Decimal::from(40)),
        )
        .with_applicable_to(["PUMA"])
    }

    #[test]
    fn zero_thresholds_mean_absent() {
        let discount = brand_discount();

        assert_eq!(discount.minimum_order(), None);
        assert_eq!(discount.cap(), None);

        let discount = discount
            .with_min_amount(Decimal::from(500))
            .with_max_amount(Decimal::from(200));

        assert_eq!(discount.minimum_order(), Some(Decimal::from(500)));
        assert_eq!(discount.cap(), Some(Decimal::from(200)));
    }

    #[test]
    fn validity_window_is_half_open() {
        let now = Timestamp::now();
        let later = now + SignedDuration::from_hours(1);
        let discount = brand_discount().with_validity(now, later);

        assert!(discount.is_valid_at(now));
        assert!(!discount.is_valid_at(later));
        assert!(!discount.is_valid_at(now - SignedDuration::from_secs(1)));
    }

    #[test]
    fn inactive_discount_is_never_valid() {
        let discount = brand_discount().with_active(false);

        assert!(!discount.is_valid_at(Timestamp::now()));
    }

    #[test]
    fn usage_limit_zero_is_unlimited() {
        let unlimited = brand_discount().with_usage(0, 1_000);
        let exhausted = brand_discount().with_usage(5, 5);
        let remaining = brand_discount().with_usage(5, 4);

        assert!(unlimited.has_usage_remaining());
        assert!(!exhausted.has_usage_remaining());
        assert!(remaining.has_usage_remaining());
        assert!(!exhausted.is_valid_at(Timestamp::now()));
    }

    #[test]
    fn customer_tiers_are_case_sensitive() {
        let discount = brand_discount().with_customer_tiers(["premium"]);

        assert!(discount.allows_customer(&CustomerProfile::new("c1", "premium")));
        assert!(!discount.allows_customer(&CustomerProfile::new("c2", "Premium")));
        assert!(brand_discount().allows_customer(&CustomerProfile::new("c3", "anything")));
    }

    #[test]
    fn exclusion_checks_brand_and_category() {
        let discount = brand_discount().with_excluded_items(["Luxury"]);

        assert!(discount.is_excluded(&product("Luxury", "Shoes")));
        assert!(discount.is_excluded(&product("PUMA", "Luxury")));
        assert!(!discount.is_excluded(&product("PUMA", "T-shirts")));
    }

    #[test]
    fn exclusion_wins_over_targeting() {
        let discount = brand_discount().with_excluded_items(["T-shirts"]);

        assert!(!discount.matches_product(&product("PUMA", "T-shirts")));
        assert!(discount.matches_product(&product("PUMA", "Shoes")));
    }

    #[test]
    fn brand_and_category_match_their_own_dimension() {
        let brand = brand_discount();
        let category = Discount::new(
            "disc-002",
            "T-shirts 10% off",
            DiscountType::Category,
            DiscountValue::Percentage(Decimal::from(10)),
        )
        .with_applicable_to(["T-shirts"]);

        assert!(brand.matches_product(&product("PUMA", "Shoes")));
        assert!(!brand.matches_product(&product("Nike", "PUMA")));
        assert!(category.matches_product(&product("Nike", "T-shirts")));
        assert!(!category.matches_product(&product("T-shirts", "Shoes")));
    }

    #[test]
    fn voucher_targets_match_either_dimension() {
        let voucher = Discount::new(
            "disc-004",
            "Voucher",
            DiscountType::Voucher,
            DiscountValue::Fixed(Decimal::from(100)),
        )
        .with_applicable_to(["Shoes"]);

        assert!(voucher.matches_product(&product("Nike", "Shoes")));
        assert!(voucher.matches_product(&product("Shoes", "Socks")));
        assert!(!voucher.matches_product(&product("Nike", "Socks")));
    }

    #[test]
    fn discount_value_accessors() {
        assert!(DiscountValue::Percentage(Decimal::from(10)).is_percentage());
        assert!(!DiscountValue::Fixed(Decimal::from(10)).is_percentage());
        assert_eq!(
            DiscountValue::Fixed(Decimal::from(75)).value(),
            Decimal::from(75)
        );
    }

    #[test]
    fn discount_type_displays_lowercase() {
        assert_eq!(DiscountType::Voucher.to_string(), "voucher");
        assert_eq!(DiscountType::ALL.len(), 4);
    }
}
