use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;

use tobby_core::transactions::{
    NewTransaction, Transaction, TransactionRepositoryTrait, TransactionUpdate,
    TransactionWithCategories,
};
use tobby_core::Result;

use super::model::{TransactionChangesDB, TransactionDB};
use crate::categories::model::CategoryDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{categories, transaction_categories, user_transactions};
use crate::utils::format_timestamp;

pub struct TransactionRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TransactionRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        TransactionRepository { pool, writer }
    }

    fn load_visible(&self, for_user: &str) -> Result<Vec<TransactionDB>> {
        let mut conn = get_connection(&self.pool)?;
        user_transactions::table
            .filter(user_transactions::user_id.eq(for_user))
            .filter(user_transactions::deleted_at.is_null())
            .order(user_transactions::transaction_date.desc())
            .load::<TransactionDB>(&mut conn)
            .into_core()
    }
}

#[async_trait]
impl TransactionRepositoryTrait for TransactionRepository {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        let mut conn = get_connection(&self.pool)?;
        user_transactions::table
            .find(transaction_id)
            .first::<TransactionDB>(&mut conn)
            .into_core()?
            .into_domain()
    }

    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        self.load_visible(user_id)?
            .into_iter()
            .map(TransactionDB::into_domain)
            .collect()
    }

    fn list_transactions_with_categories(
        &self,
        user_id: &str,
    ) -> Result<Vec<TransactionWithCategories>> {
        let rows = self.load_visible(user_id)?;
        let transaction_ids: Vec<String> = rows.iter().map(|t| t.id.clone()).collect();

        let mut conn = get_connection(&self.pool)?;
        let assignments: Vec<(String, CategoryDB)> = transaction_categories::table
            .inner_join(categories::table)
            .filter(transaction_categories::transaction_id.eq_any(&transaction_ids))
            .select((transaction_categories::transaction_id, CategoryDB::as_select()))
            .load(&mut conn)
            .into_core()?;

        let mut by_transaction: HashMap<String, Vec<CategoryDB>> = HashMap::new();
        for (transaction_id, category) in assignments {
            by_transaction.entry(transaction_id).or_default().push(category);
        }

        rows.into_iter()
            .map(|row| {
                let categories = by_transaction
                    .remove(&row.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(CategoryDB::into_domain)
                    .collect::<Result<Vec<_>>>()?;
                Ok(TransactionWithCategories {
                    transaction: row.into_domain()?,
                    categories,
                })
            })
            .collect()
    }

    async fn insert_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Transaction> {
                let row = TransactionDB::from_new(new_transaction);
                diesel::insert_into(user_transactions::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                row.into_domain()
            })
            .await
    }

    async fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction> {
        let transaction_id = update.id.clone();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Transaction> {
                let changes = TransactionChangesDB::from(update);
                diesel::update(user_transactions::table.find(&transaction_id))
                    .set(&changes)
                    .execute(conn)
                    .into_core()?;
                user_transactions::table
                    .find(&transaction_id)
                    .first::<TransactionDB>(conn)
                    .into_core()?
                    .into_domain()
            })
            .await
    }

    async fn soft_delete_transaction(&self, transaction_id: String) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::update(user_transactions::table.find(&transaction_id))
                    .set(user_transactions::deleted_at.eq(Some(format_timestamp(chrono::Utc::now()))))
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }

    async fn hard_delete_transaction(&self, transaction_id: String) -> Result<()> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::delete(user_transactions::table.find(&transaction_id))
                    .execute(conn)
                    .into_core()?;
                Ok(())
            })
            .await
    }
}
