//! Database models for transactions.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::{
    format_date, format_decimal, format_timestamp, parse_date, parse_decimal, parse_timestamp,
    parse_transaction_type,
};
use tobby_core::transactions::{NewTransaction, Transaction, TransactionUpdate};
use tobby_core::Result;

/// Database model for transactions
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone,
    PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::user_transactions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TransactionDB {
    pub id: String,
    pub user_id: String,
    pub description: Option<String>,
    pub transaction_date: String,
    pub transaction_type: String,
    pub amount: String,
    pub created_at: String,
    pub deleted_at: Option<String>,
}

impl TransactionDB {
    pub fn into_domain(self) -> Result<Transaction> {
        Ok(Transaction {
            transaction_date: parse_date(&self.transaction_date)?,
            transaction_type: parse_transaction_type(&self.transaction_type)?,
            amount: parse_decimal(&self.amount)?,
            created_at: parse_timestamp(&self.created_at)?,
            deleted_at: self.deleted_at.as_deref().map(parse_timestamp).transpose()?,
            id: self.id,
            user_id: self.user_id,
            description: self.description,
        })
    }

    /// Builds a fresh row from a create payload. The id and created-at stamp
    /// are assigned here, not by the caller.
    pub fn from_new(new_transaction: NewTransaction) -> Self {
        TransactionDB {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: new_transaction.user_id,
            description: new_transaction.description,
            transaction_date: format_date(new_transaction.transaction_date),
            transaction_type: new_transaction.transaction_type.as_str().to_string(),
            amount: format_decimal(new_transaction.amount),
            created_at: format_timestamp(chrono::Utc::now()),
            deleted_at: None,
        }
    }
}

/// Changeset for editing an existing transaction.
#[derive(AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::user_transactions)]
pub struct TransactionChangesDB {
    pub description: Option<Option<String>>,
    pub transaction_date: String,
    pub transaction_type: String,
    pub amount: String,
}

impl From<TransactionUpdate> for TransactionChangesDB {
    fn from(update: TransactionUpdate) -> Self {
        TransactionChangesDB {
            description: Some(update.description),
            transaction_date: format_date(update.transaction_date),
            transaction_type: update.transaction_type.as_str().to_string(),
            amount: format_decimal(update.amount),
        }
    }
}
