use crate::categories::categories_model::{Category, NewCategory};
use crate::errors::Result;
use async_trait::async_trait;

/// Trait for category repository operations
#[async_trait]
pub trait CategoryRepositoryTrait: Send + Sync {
    fn list_categories(&self, user_id: &str) -> Result<Vec<Category>>;
    fn get_categories_for_transaction(&self, transaction_id: &str) -> Result<Vec<Category>>;
    async fn insert_category(&self, new_category: NewCategory) -> Result<Category>;
    async fn update_category(&self, category: Category) -> Result<Category>;
    async fn delete_category(&self, category_id: String) -> Result<usize>;
    /// Replaces the set of categories assigned to a transaction.
    async fn set_transaction_categories(
        &self,
        transaction_id: String,
        category_ids: Vec<String>,
    ) -> Result<usize>;
}

/// Trait for category service operations
#[async_trait]
pub trait CategoryServiceTrait: Send + Sync {
    fn list_categories(&self, user_id: &str) -> Result<Vec<Category>>;
    async fn create_category(&self, new_category: NewCategory) -> Result<Category>;
    async fn update_category(&self, category: Category) -> Result<Category>;
    async fn delete_category(&self, category_id: String) -> Result<usize>;
    async fn set_transaction_categories(
        &self,
        transaction_id: String,
        category_ids: Vec<String>,
    ) -> Result<usize>;
}
