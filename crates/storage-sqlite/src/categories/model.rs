//! Database models for categories.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::{format_timestamp, parse_timestamp};
use tobby_core::categories::{Category, NewCategory};
use tobby_core::Result;

/// Database model for categories
#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, Debug, Clone,
    PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CategoryDB {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub created_at: String,
}

impl CategoryDB {
    pub fn into_domain(self) -> Result<Category> {
        Ok(Category {
            created_at: parse_timestamp(&self.created_at)?,
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            color: self.color,
            icon: self.icon,
        })
    }

    pub fn from_new(new_category: NewCategory) -> Self {
        CategoryDB {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: new_category.user_id,
            name: new_category.name,
            color: new_category.color,
            icon: new_category.icon,
            created_at: format_timestamp(chrono::Utc::now()),
        }
    }

    pub fn from_domain(category: Category) -> Self {
        CategoryDB {
            id: category.id,
            user_id: category.user_id,
            name: category.name,
            color: category.color,
            icon: category.icon,
            created_at: format_timestamp(category.created_at),
        }
    }
}

/// Database model for the transaction/category join table
#[derive(Queryable, Insertable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = crate::schema::transaction_categories)]
pub struct TransactionCategoryDB {
    pub transaction_id: String,
    pub category_id: String,
}
