//! Demonstration run

use std::{
    io::{self, Write},
    time::Instant,
};

use humanize_duration::{Truncate, prelude::DurationExt};
use rebate::{
    cart::CartItem, customers::CustomerProfile, engine::DiscountEngine, fixtures::Fixture,
    payments::PaymentInfo,
};
use rusty_money::{Money, iso};
use tracing::info;

use crate::{config::CliConfig, error::CliError};

/// Evaluate the configured scenario and write the report to stdout.
pub(crate) fn run(config: &CliConfig) -> Result<(), CliError> {
    let currency = iso::find(&config.fixtures.currency)
        .ok_or_else(|| CliError::UnknownCurrency(config.fixtures.currency.clone()))?;

    let fixture = Fixture::with_base_path(&config.fixtures.fixtures_dir)
        .load_set(&config.fixtures.fixture)?;

    info!(
        fixture = %config.fixtures.fixture,
        discounts = fixture.discounts().len(),
        "loaded fixture set"
    );

    let cart = at_base_prices(fixture.cart(&config.scenario.cart)?);
    let customer = fixture.customer(&config.scenario.customer)?;
    let payment = config
        .scenario
        .payment_key()
        .map(|key| fixture.payment(key))
        .transpose()?;

    let engine = DiscountEngine::new(fixture.repository()?);

    let mut out = io::stdout().lock();

    write_scenario(&mut out, &cart, customer, payment, currency)?;

    let start = Instant::now();
    let price = engine.calculate_cart_discounts(&cart, customer, payment)?;
    let elapsed = start.elapsed();

    price.write_to(&mut out, currency)?;

    writeln!(out, "Evaluated in {}", elapsed.human(Truncate::Nano))?;
    writeln!(out, "\nDiscount codes:")?;

    for code in config.scenario.codes() {
        let outcome = match engine.validate_discount_code(code, &cart, customer) {
            Ok(true) => "valid".to_string(),
            Ok(false) => "invalid".to_string(),
            Err(source) => format!("error: {source}"),
        };

        writeln!(out, "  {code:<12} {outcome}")?;
    }

    Ok(())
}

/// Copy of `cart` with every product back at its catalogue price.
fn at_base_prices(cart: &[CartItem]) -> Vec<CartItem> {
    let mut cart = cart.to_vec();

    for item in &mut cart {
        item.product_mut().reset_price();
    }

    cart
}

fn write_scenario(
    out: &mut impl Write,
    cart: &[CartItem],
    customer: &CustomerProfile,
    payment: Option<&PaymentInfo>,
    currency: &'static iso::Currency,
) -> Result<(), CliError> {
    writeln!(out, "Customer: {} ({})", customer.id, customer.tier)?;

    match payment {
        Some(PaymentInfo {
            method,
            bank_name: Some(bank),
            ..
        }) => writeln!(out, "Payment:  {method} ({bank})")?,
        Some(payment) => writeln!(out, "Payment:  {}", payment.method)?,
        None => writeln!(out, "Payment:  none")?,
    }

    writeln!(out, "Cart:")?;

    for item in cart {
        let product = item.product();

        writeln!(
            out,
            "  {} x{} {} {} ({}) @ {}",
            product.id,
            item.quantity(),
            product.brand.name,
            product.category.name,
            item.size(),
            Money::from_decimal(product.current_price, currency)
        )?;
    }

    Ok(())
}
