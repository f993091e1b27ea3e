//! Receipt

use std::{fmt::Write, io};

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{discounts::DiscountType, stacking::Phase};

/// Message used when an evaluation applied nothing
pub const NO_DISCOUNTS_APPLIED: &str = "No discounts applied";

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Writing to the output failed
    #[error("IO error")]
    IO,
}

/// A single discount applied during an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountApplication {
    /// Id of the applied discount
    pub discount_id: String,

    /// Display name of the applied discount
    pub name: String,

    /// Type of the applied discount
    pub kind: DiscountType,

    /// Amount removed from the running total, always positive
    pub amount: Decimal,
}

/// Outcome of evaluating a cart against the active discounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountedPrice {
    /// Cart total before any discount
    original_total: Decimal,

    /// Cart total after every applied discount
    final_total: Decimal,

    /// Applied discounts, in application order
    applications: SmallVec<[DiscountApplication; 4]>,

    /// Human readable summary
    message: String,
}

impl DiscountedPrice {
    /// Assemble the result of an evaluation.
    ///
    /// The summary message is derived from the applications.
    pub fn new(
        original_total: Decimal,
        final_total: Decimal,
        applications: SmallVec<[DiscountApplication; 4]>,
    ) -> Self {
        let total = applications
            .iter()
            .map(|app| app.amount)
            .sum::<Decimal>()
            .normalize();

        let message = if applications.is_empty() {
            NO_DISCOUNTS_APPLIED.to_string()
        } else {
            format!(
                "Applied {} discount(s) - Savings: {total}",
                applications.len()
            )
        };

        Self {
            original_total,
            final_total,
            applications,
            message,
        }
    }

    /// Cart total before any discount
    pub fn original_total(&self) -> Decimal {
        self.original_total
    }

    /// Cart total after every applied discount
    pub fn final_total(&self) -> Decimal {
        self.final_total
    }

    /// Applied discounts, in the order they were applied
    pub fn applications(&self) -> &[DiscountApplication] {
        &self.applications
    }

    /// Applied amounts keyed by discount name.
    ///
    /// Discounts sharing a name are summed into one entry.
    pub fn applied_discounts(&self) -> FxHashMap<String, Decimal> {
        let mut applied = FxHashMap::default();

        for app in &self.applications {
            *applied.entry(app.name.clone()).or_insert(Decimal::ZERO) += app.amount;
        }

        applied
    }

    /// Summary message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Sum of every applied amount
    pub fn total_discount(&self) -> Decimal {
        self.applications.iter().map(|app| app.amount).sum()
    }

    /// Savings as a fraction of the original total
    pub fn discount_percentage(&self) -> Percentage {
        if self.original_total.is_zero() {
            return Percentage::from(Decimal::ZERO);
        }

        Percentage::from(self.total_discount() / self.original_total)
    }

    /// Write a table of applied discounts followed by the totals, formatted in `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing to `out` fails.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        currency: &'static Currency,
    ) -> Result<(), ReceiptError> {
        if !self.applications.is_empty() {
            let mut builder = Builder::default();

            builder.push_record(["", "Phase", "Discount", "Savings"]);

            for (index, app) in self.applications.iter().enumerate() {
                builder.push_record([
                    format!("#{}", index + 1),
                    Phase::of(app.kind).to_string(),
                    app.name.clone(),
                    format!("-{}", Money::from_decimal(app.amount, currency)),
                ]);
            }

            write_table(&mut out, builder)?;
        }

        write_summary(&mut out, self, currency)
    }
}

fn write_table(out: &mut impl io::Write, builder: Builder) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(
        1,
        HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
    );

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::last(), Alignment::right());

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

fn write_summary(
    out: &mut impl io::Write,
    price: &DiscountedPrice,
    currency: &'static Currency,
) -> Result<(), ReceiptError> {
    let savings_points = percent_points(price.discount_percentage());

    let rows = [
        (
            " Subtotal:",
            format!("{}", Money::from_decimal(price.original_total, currency)),
        ),
        (
            " Total:",
            format!("{}", Money::from_decimal(price.final_total, currency)),
        ),
        (
            " Savings:",
            format!(
                "({savings_points:.2}%) {}",
                Money::from_decimal(price.total_discount(), currency)
            ),
        ),
    ];

    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let value_width = rows.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

    for (label, value) in &rows {
        writeln!(out, "{label:>label_width$}  {value:>value_width$}")
            .map_err(|_err| ReceiptError::IO)?;
    }

    writeln!(out, "\n {}", price.message).map_err(|_err| ReceiptError::IO)
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Wraps runs of box-drawing characters in ANSI dark-grey escape codes.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}
