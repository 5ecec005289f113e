use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;

use tobby_core::categories::{Category, CategoryRepositoryTrait, NewCategory};
use tobby_core::Result;

use super::model::{CategoryDB, TransactionCategoryDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::{categories, transaction_categories};

pub struct CategoryRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CategoryRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        CategoryRepository { pool, writer }
    }
}

#[async_trait]
impl CategoryRepositoryTrait for CategoryRepository {
    fn list_categories(&self, user_id: &str) -> Result<Vec<Category>> {
        let mut conn = get_connection(&self.pool)?;
        categories::table
            .filter(categories::user_id.eq(user_id))
            .order(categories::name.asc())
            .load::<CategoryDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(CategoryDB::into_domain)
            .collect()
    }

    fn get_categories_for_transaction(&self, transaction_id: &str) -> Result<Vec<Category>> {
        let mut conn = get_connection(&self.pool)?;
        transaction_categories::table
            .inner_join(categories::table)
            .filter(transaction_categories::transaction_id.eq(transaction_id))
            .select(CategoryDB::as_select())
            .load::<CategoryDB>(&mut conn)
            .into_core()?
            .into_iter()
            .map(CategoryDB::into_domain)
            .collect()
    }

    async fn insert_category(&self, new_category: NewCategory) -> Result<Category> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Category> {
                let row = CategoryDB::from_new(new_category);
                diesel::insert_into(categories::table)
                    .values(&row)
                    .execute(conn)
                    .into_core()?;
                row.into_domain()
            })
            .await
    }

    async fn update_category(&self, category: Category) -> Result<Category> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Category> {
                let row = CategoryDB::from_domain(category);
                diesel::update(categories::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .into_core()?;
                row.into_domain()
            })
            .await
    }

    async fn delete_category(&self, category_id: String) -> Result<usize> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(categories::table.find(&category_id))
                    .execute(conn)
                    .into_core()
            })
            .await
    }

    async fn set_transaction_categories(
        &self,
        transaction_id: String,
        category_ids: Vec<String>,
    ) -> Result<usize> {
        // Replace-all semantics in one transaction: the writer actor wraps
        // this whole job, so a failed insert rolls the delete back too.
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                diesel::delete(
                    transaction_categories::table
                        .filter(transaction_categories::transaction_id.eq(&transaction_id)),
                )
                .execute(conn)
                .into_core()?;

                let rows: Vec<TransactionCategoryDB> = category_ids
                    .into_iter()
                    .map(|category_id| TransactionCategoryDB {
                        transaction_id: transaction_id.clone(),
                        category_id,
                    })
                    .collect();
                diesel::insert_into(transaction_categories::table)
                    .values(&rows)
                    .execute(conn)
                    .into_core()
            })
            .await
    }
}
