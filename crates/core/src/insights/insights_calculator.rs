//! Derived metrics shown next to each transaction in listings.
//!
//! All functions here are pure and operate on an in-memory slice of
//! transactions; they are recomputed whenever the caller's filter or sort
//! changes, so nothing is cached.

use std::collections::HashSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::transactions::{Transaction, TransactionWithCategories};

/// Share of the month's total contributed by `amount`, as a percentage.
///
/// Returns zero when the month total is zero so an empty month never divides.
pub fn month_percentage(amount: Decimal, month_total: Decimal) -> Decimal {
    if month_total.is_zero() {
        return Decimal::ZERO;
    }
    amount / month_total * dec!(100)
}

/// Normalizes a free-text description for equality comparison.
///
/// Receipt descriptions come from OCR and user edits, so casing and
/// surrounding whitespace vary for the same merchant.
pub fn normalize_description(description: Option<&str>) -> String {
    description.unwrap_or_default().trim().to_lowercase()
}

/// How many transactions in `all` carry the same normalized description as
/// `transaction`. The transaction itself is included in the count.
pub fn description_frequency(transaction: &Transaction, all: &[Transaction]) -> usize {
    let needle = normalize_description(transaction.description.as_deref());
    all.iter()
        .filter(|t| normalize_description(t.description.as_deref()) == needle)
        .count()
}

/// Percentage of the total amount contributed by transactions sharing at
/// least one category with `transaction`.
///
/// Returns zero when the transaction has no categories or the total is zero.
pub fn category_trend(
    transaction: &TransactionWithCategories,
    all: &[TransactionWithCategories],
) -> Decimal {
    if transaction.categories.is_empty() {
        return Decimal::ZERO;
    }

    let total: Decimal = all.iter().map(|t| t.transaction.amount).sum();
    if total.is_zero() {
        return Decimal::ZERO;
    }

    let category_ids: HashSet<&str> = transaction
        .categories
        .iter()
        .map(|c| c.id.as_str())
        .collect();

    let shared: Decimal = all
        .iter()
        .filter(|t| {
            t.categories
                .iter()
                .any(|c| category_ids.contains(c.id.as_str()))
        })
        .map(|t| t.transaction.amount)
        .sum();

    shared / total * dec!(100)
}
