//! Cart

use rust_decimal::Decimal;
use thiserror::Error;

use crate::products::Product;

/// Errors related to cart construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A cart line was created with a quantity of zero.
    #[error("cart item for product {0} must have a positive quantity")]
    ZeroQuantity(String),
}

/// A line in the cart
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    product: Product,
    quantity: u32,
    size: String,
}

impl CartItem {
    /// Create a new cart line.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::ZeroQuantity`] if `quantity` is zero.
    pub fn new(
        product: Product,
        quantity: u32,
        size: impl Into<String>,
    ) -> Result<Self, CartError> {
        if quantity == 0 {
            return Err(CartError::ZeroQuantity(product.id));
        }

        Ok(Self {
            product,
            quantity,
            size: size.into(),
        })
    }

    /// Returns the product on this line
    pub fn product(&self) -> &Product {
        &self.product
    }

    /// Returns the product on this line, mutably
    pub fn product_mut(&mut self) -> &mut Product {
        &mut self.product
    }

    /// Returns the quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the size label
    pub fn size(&self) -> &str {
        &self.size
    }

    /// Current price multiplied by quantity
    pub fn total_price(&self) -> Decimal {
        self.product.current_price * Decimal::from(self.quantity)
    }
}

/// Calculates the current total of a cart.
///
/// An empty cart totals zero.
pub fn cart_total(items: &[CartItem]) -> Decimal {
    items.iter().map(CartItem::total_price).sum()
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::products::{Brand, BrandTier, Category};

    use super::*;

    fn product(id: &str, price: i64) -> Product {
        Product::new(
            id,
            Brand {
                id: "Nike".to_string(),
                name: "Nike".to_string(),
                tier: BrandTier::Premium,
            },
            Category {
                id: "Shoes".to_string(),
                name: "Shoes".to_string(),
            },
            Decimal::from(price),
        )
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let result = CartItem::new(product("prod-002", 5000), 0, "42");

        assert_eq!(result, Err(CartError::ZeroQuantity("prod-002".to_string())));
    }

    #[test]
    fn total_price_uses_current_price() -> TestResult {
        let mut item = CartItem::new(product("prod-002", 5000), 2, "42")?;

        item.product_mut().current_price = Decimal::new(455_050, 2);

        assert_eq!(item.total_price(), Decimal::new(910_100, 2));

        Ok(())
    }

    #[test]
    fn cart_total_sums_lines() -> TestResult {
        let items = [
            CartItem::new(product("prod-002", 5000), 1, "42")?,
            CartItem::new(product("prod-003", 800), 3, "L")?,
        ];

        assert_eq!(cart_total(&items), Decimal::from(7400));

        Ok(())
    }

    #[test]
    fn cart_total_of_empty_cart_is_zero() {
        assert_eq!(cart_total(&[]), Decimal::ZERO);
    }
}
