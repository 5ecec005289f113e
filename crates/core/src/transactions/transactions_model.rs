//! Transactions domain models.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::categories::Category;

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Withdrawal,
    Deposit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Withdrawal => "withdrawal",
            TransactionType::Deposit => "deposit",
        }
    }
}

/// Domain model representing a single expense or income entry.
///
/// Rows are soft-deleted: a populated `deleted_at` hides the transaction from
/// listings but keeps it in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub user_id: String,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Transaction together with its assigned categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionWithCategories {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub categories: Vec<Category>,
}

/// Input model for creating a new transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub user_id: String,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
}

/// Input model for editing an existing transaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionUpdate {
    pub id: String,
    pub description: Option<String>,
    pub transaction_date: NaiveDate,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
}
