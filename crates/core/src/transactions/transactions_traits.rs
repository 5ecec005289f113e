use crate::errors::Result;
use crate::transactions::transactions_model::{
    NewTransaction, Transaction, TransactionUpdate, TransactionWithCategories,
};
use async_trait::async_trait;

/// Trait for transaction repository operations
#[async_trait]
pub trait TransactionRepositoryTrait: Send + Sync {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction>;
    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>>;
    fn list_transactions_with_categories(
        &self,
        user_id: &str,
    ) -> Result<Vec<TransactionWithCategories>>;
    async fn insert_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;
    async fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction>;
    /// Marks the transaction deleted without removing the row.
    async fn soft_delete_transaction(&self, transaction_id: String) -> Result<()>;
    /// Removes the row entirely. Used only to undo a generation that lost a
    /// duplicate race; user-facing deletion is always soft.
    async fn hard_delete_transaction(&self, transaction_id: String) -> Result<()>;
}

/// Trait for transaction service operations
#[async_trait]
pub trait TransactionServiceTrait: Send + Sync {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction>;
    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>>;
    fn list_transactions_with_categories(
        &self,
        user_id: &str,
    ) -> Result<Vec<TransactionWithCategories>>;
    async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction>;
    async fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction>;
    async fn delete_transaction(&self, transaction_id: String) -> Result<()>;
}
