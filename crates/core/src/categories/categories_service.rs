use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{Error, Result, ValidationError};

use super::categories_model::{Category, NewCategory};
use super::categories_traits::{CategoryRepositoryTrait, CategoryServiceTrait};

pub struct CategoryService {
    category_repository: Arc<dyn CategoryRepositoryTrait>,
}

impl CategoryService {
    pub fn new(category_repository: Arc<dyn CategoryRepositoryTrait>) -> Self {
        CategoryService {
            category_repository,
        }
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::MissingField(
                "name".to_string(),
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryServiceTrait for CategoryService {
    fn list_categories(&self, user_id: &str) -> Result<Vec<Category>> {
        self.category_repository.list_categories(user_id)
    }

    async fn create_category(&self, new_category: NewCategory) -> Result<Category> {
        Self::validate_name(&new_category.name)?;
        self.category_repository.insert_category(new_category).await
    }

    async fn update_category(&self, category: Category) -> Result<Category> {
        Self::validate_name(&category.name)?;
        self.category_repository.update_category(category).await
    }

    async fn delete_category(&self, category_id: String) -> Result<usize> {
        self.category_repository.delete_category(category_id).await
    }

    async fn set_transaction_categories(
        &self,
        transaction_id: String,
        category_ids: Vec<String>,
    ) -> Result<usize> {
        self.category_repository
            .set_transaction_categories(transaction_id, category_ids)
            .await
    }
}
