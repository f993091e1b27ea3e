//! Discount Amounts

use decimal_percentage::Percentage;
use rust_decimal::Decimal;

use crate::{
    cart::CartItem,
    discounts::{Discount, DiscountType, DiscountValue},
};

/// The amount a discount's value is computed against.
///
/// Brand and category discounts only cover the matching, non-excluded items at their
/// current prices. Vouchers and bank offers cover the whole running total.
pub fn eligible_base(discount: &Discount, cart: &[CartItem], running_total: Decimal) -> Decimal {
    match discount.kind {
        DiscountType::Brand | DiscountType::Category => cart
            .iter()
            .filter(|item| discount.matches_product(item.product()))
            .map(CartItem::total_price)
            .sum(),
        DiscountType::Voucher | DiscountType::Bank => running_total,
    }
}

/// Calculates how much `discount` removes from the cart given the running total so far.
///
/// The amount is capped by the discount's maximum, never exceeds the eligible base or the
/// running total, and is never negative. Trailing zeros are dropped from the result.
pub fn calculate(discount: &Discount, cart: &[CartItem], running_total: Decimal) -> Decimal {
    let base = eligible_base(discount, cart, running_total);

    if base <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let raw = match discount.value {
        DiscountValue::Percentage(points) => percent_of(points, base),
        DiscountValue::Fixed(amount) => amount,
    };

    let capped = discount.cap().map_or(raw, |cap| raw.min(cap));

    capped
        .min(base)
        .min(running_total)
        .max(Decimal::ZERO)
        .normalize()
}

/// `points` percent of `base`
fn percent_of(points: Decimal, base: Decimal) -> Decimal {
    Percentage::from(points / Decimal::ONE_HUNDRED) * base
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::products::{Brand, BrandTier, Category, Product};

    use super::*;

    fn item(brand: &str, category: &str, price: i64, quantity: u32) -> TestResult<CartItem> {
        let product = Product::new(
            format!("{brand}-{category}"),
            Brand {
                id: brand.to_string(),
                name: brand.to_string(),
                tier: BrandTier::Regular,
            },
            Category {
                id: category.to_string(),
                name: category.to_string(),
            },
            Decimal::from(price),
        );

        Ok(CartItem::new(product, quantity, "M")?)
    }

    fn discount(kind: DiscountType, value: DiscountValue) -> Discount {
        Discount::new("disc", "Discount", kind, value)
    }

    #[test]
    fn brand_base_only_covers_matching_items() -> TestResult {
        let cart = [
            item("PUMA", "T-shirts", 1000, 2)?,
            item("Nike", "Shoes", 5000, 1)?,
        ];

        let brand = discount(
            DiscountType::Brand,
            DiscountValue::Percentage(Decimal::from(40)),
        )
        .with_applicable_to(["PUMA"]);

        assert_eq!(
            eligible_base(&brand, &cart, Decimal::from(7000)),
            Decimal::from(2000)
        );
        assert_eq!(
            calculate(&brand, &cart, Decimal::from(7000)),
            Decimal::from(800)
        );

        Ok(())
    }

    #[test]
    fn excluded_items_are_left_out_of_the_base() -> TestResult {
        let cart = [
            item("PUMA", "T-shirts", 1000, 1)?,
            item("PUMA", "Luxury", 3000, 1)?,
        ];

        let brand = discount(
            DiscountType::Brand,
            DiscountValue::Percentage(Decimal::from(10)),
        )
        .with_applicable_to(["PUMA"])
        .with_excluded_items(["Luxury"]);

        assert_eq!(
            eligible_base(&brand, &cart, Decimal::from(4000)),
            Decimal::from(1000)
        );

        Ok(())
    }

    #[test]
    fn voucher_and_bank_use_running_total() -> TestResult {
        let cart = [item("PUMA", "T-shirts", 1000, 2)?];

        for kind in [DiscountType::Voucher, DiscountType::Bank] {
            let discount = discount(kind, DiscountValue::Percentage(Decimal::from(10)));

            assert_eq!(
                calculate(&discount, &cart, Decimal::from(1000)),
                Decimal::from(100)
            );
        }

        Ok(())
    }

    #[test]
    fn cap_clamps_raw_amount() -> TestResult {
        let cart = [item("PUMA", "T-shirts", 1000, 2)?];

        let category = discount(
            DiscountType::Category,
            DiscountValue::Percentage(Decimal::from(50)),
        )
        .with_applicable_to(["T-shirts"])
        .with_max_amount(Decimal::from(200));

        assert_eq!(
            calculate(&category, &cart, Decimal::from(2000)),
            Decimal::from(200)
        );

        Ok(())
    }

    #[test]
    fn flat_amount_never_exceeds_base() -> TestResult {
        let cart = [item("PUMA", "T-shirts", 300, 1)?];

        let brand = discount(DiscountType::Brand, DiscountValue::Fixed(Decimal::from(500)))
            .with_applicable_to(["PUMA"]);

        assert_eq!(
            calculate(&brand, &cart, Decimal::from(300)),
            Decimal::from(300)
        );

        Ok(())
    }

    #[test]
    fn amount_never_exceeds_running_total() -> TestResult {
        let cart = [item("PUMA", "T-shirts", 1000, 1)?];

        let category = discount(
            DiscountType::Category,
            DiscountValue::Percentage(Decimal::from(100)),
        )
        .with_applicable_to(["T-shirts"]);

        assert_eq!(
            calculate(&category, &cart, Decimal::from(250)),
            Decimal::from(250)
        );

        Ok(())
    }

    #[test]
    fn zero_base_gives_zero() -> TestResult {
        let cart = [item("Nike", "Shoes", 5000, 1)?];

        let brand = discount(DiscountType::Brand, DiscountValue::Fixed(Decimal::from(100)))
            .with_applicable_to(["PUMA"]);
        let voucher = discount(
            DiscountType::Voucher,
            DiscountValue::Percentage(Decimal::from(10)),
        );

        assert_eq!(calculate(&brand, &cart, Decimal::from(5000)), Decimal::ZERO);
        assert_eq!(calculate(&voucher, &cart, Decimal::ZERO), Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn amounts_carry_no_trailing_zeros() -> TestResult {
        let cart = [item("PUMA", "T-shirts", 1000, 2)?];

        let brand = discount(
            DiscountType::Brand,
            DiscountValue::Percentage(Decimal::from(40)),
        )
        .with_applicable_to(["PUMA"]);
        let voucher = discount(
            DiscountType::Voucher,
            DiscountValue::Percentage(Decimal::from(10)),
        );

        assert_eq!(calculate(&brand, &cart, Decimal::from(2000)).to_string(), "800");
        assert_eq!(calculate(&voucher, &cart, Decimal::from(1000)).to_string(), "100");
        assert_eq!(
            calculate(&voucher, &cart, Decimal::new(99_950, 2)).to_string(),
            "99.95"
        );

        Ok(())
    }

    #[test]
    fn fractional_percentages_are_exact() -> TestResult {
        let cart = [item("PUMA", "T-shirts", 999, 1)?];

        let voucher = discount(
            DiscountType::Voucher,
            DiscountValue::Percentage(Decimal::new(125, 1)),
        );

        assert_eq!(
            calculate(&voucher, &cart, Decimal::from(999)),
            Decimal::new(124_875, 3)
        );

        Ok(())
    }
}
