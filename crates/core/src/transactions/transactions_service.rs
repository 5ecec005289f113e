use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::errors::{Error, Result, ValidationError};

use super::transactions_model::{
    NewTransaction, Transaction, TransactionUpdate, TransactionWithCategories,
};
use super::transactions_traits::{TransactionRepositoryTrait, TransactionServiceTrait};

pub struct TransactionService {
    transaction_repository: Arc<dyn TransactionRepositoryTrait>,
}

impl TransactionService {
    pub fn new(transaction_repository: Arc<dyn TransactionRepositoryTrait>) -> Self {
        TransactionService {
            transaction_repository,
        }
    }

    fn validate_amount(amount: Decimal) -> Result<()> {
        if amount <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Transaction amount must be positive, got {}",
                amount
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl TransactionServiceTrait for TransactionService {
    fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
        self.transaction_repository.get_transaction(transaction_id)
    }

    fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        self.transaction_repository.list_transactions(user_id)
    }

    fn list_transactions_with_categories(
        &self,
        user_id: &str,
    ) -> Result<Vec<TransactionWithCategories>> {
        self.transaction_repository
            .list_transactions_with_categories(user_id)
    }

    async fn create_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
        Self::validate_amount(new_transaction.amount)?;
        self.transaction_repository
            .insert_transaction(new_transaction)
            .await
    }

    async fn update_transaction(&self, update: TransactionUpdate) -> Result<Transaction> {
        Self::validate_amount(update.amount)?;
        self.transaction_repository.update_transaction(update).await
    }

    async fn delete_transaction(&self, transaction_id: String) -> Result<()> {
        self.transaction_repository
            .soft_delete_transaction(transaction_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use rust_decimal_macros::dec;
    use std::sync::RwLock;

    struct MockTransactionRepository {
        transactions: RwLock<Vec<Transaction>>,
    }

    impl MockTransactionRepository {
        fn new() -> Self {
            Self {
                transactions: RwLock::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl TransactionRepositoryTrait for MockTransactionRepository {
        fn get_transaction(&self, transaction_id: &str) -> Result<Transaction> {
            self.transactions
                .read()
                .unwrap()
                .iter()
                .find(|t| t.id == transaction_id)
                .cloned()
                .ok_or_else(|| {
                    Error::Database(crate::errors::DatabaseError::NotFound(
                        transaction_id.to_string(),
                    ))
                })
        }

        fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
            Ok(self
                .transactions
                .read()
                .unwrap()
                .iter()
                .filter(|t| t.user_id == user_id && t.deleted_at.is_none())
                .cloned()
                .collect())
        }

        fn list_transactions_with_categories(
            &self,
            _user_id: &str,
        ) -> Result<Vec<TransactionWithCategories>> {
            unimplemented!()
        }

        async fn insert_transaction(&self, new_transaction: NewTransaction) -> Result<Transaction> {
            let transaction = Transaction {
                id: format!("tx-{}", self.transactions.read().unwrap().len()),
                user_id: new_transaction.user_id,
                description: new_transaction.description,
                transaction_date: new_transaction.transaction_date,
                transaction_type: new_transaction.transaction_type,
                amount: new_transaction.amount,
                created_at: Utc::now(),
                deleted_at: None,
            };
            self.transactions.write().unwrap().push(transaction.clone());
            Ok(transaction)
        }

        async fn update_transaction(&self, _update: TransactionUpdate) -> Result<Transaction> {
            unimplemented!()
        }

        async fn soft_delete_transaction(&self, transaction_id: String) -> Result<()> {
            let mut transactions = self.transactions.write().unwrap();
            match transactions.iter_mut().find(|t| t.id == transaction_id) {
                Some(t) => {
                    t.deleted_at = Some(Utc::now());
                    Ok(())
                }
                None => Err(Error::Database(crate::errors::DatabaseError::NotFound(
                    transaction_id,
                ))),
            }
        }

        async fn hard_delete_transaction(&self, transaction_id: String) -> Result<()> {
            self.transactions
                .write()
                .unwrap()
                .retain(|t| t.id != transaction_id);
            Ok(())
        }
    }

    fn new_transaction(amount: Decimal) -> NewTransaction {
        NewTransaction {
            user_id: "user-1".to_string(),
            description: Some("Groceries".to_string()),
            transaction_date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            transaction_type: crate::transactions::TransactionType::Withdrawal,
            amount,
        }
    }

    #[tokio::test]
    async fn test_create_transaction_rejects_non_positive_amount() {
        let service = TransactionService::new(Arc::new(MockTransactionRepository::new()));

        assert!(service
            .create_transaction(new_transaction(dec!(0)))
            .await
            .is_err());
        assert!(service
            .create_transaction(new_transaction(dec!(-10)))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_deleted_transactions_hidden_from_listing() {
        let service = TransactionService::new(Arc::new(MockTransactionRepository::new()));

        let created = service
            .create_transaction(new_transaction(dec!(42.50)))
            .await
            .unwrap();
        assert_eq!(service.list_transactions("user-1").unwrap().len(), 1);

        service.delete_transaction(created.id).await.unwrap();
        assert!(service.list_transactions("user-1").unwrap().is_empty());
    }
}
