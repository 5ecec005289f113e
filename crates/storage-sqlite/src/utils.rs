//! Conversion helpers between SQLite TEXT columns and domain types.
//!
//! Dates are stored as `YYYY-MM-DD` (which also makes lexicographic SQL
//! comparison correct), timestamps as RFC 3339, and decimal amounts as their
//! canonical string form to avoid float rounding.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use tobby_core::errors::{Error, Result, ValidationError};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(Into::into)
}

pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339()
}

pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|t| t.with_timezone(&Utc))
        .map_err(Into::into)
}

pub fn format_decimal(amount: Decimal) -> String {
    amount.to_string()
}

pub fn parse_decimal(text: &str) -> Result<Decimal> {
    Decimal::from_str(text).map_err(Into::into)
}

/// Parses a transaction direction stored as lowercase text.
pub fn parse_transaction_type(text: &str) -> Result<tobby_core::transactions::TransactionType> {
    use tobby_core::transactions::TransactionType;
    match text {
        "withdrawal" => Ok(TransactionType::Withdrawal),
        "deposit" => Ok(TransactionType::Deposit),
        other => Err(Error::Validation(ValidationError::InvalidInput(format!(
            "Unknown transaction type '{}'",
            other
        )))),
    }
}
