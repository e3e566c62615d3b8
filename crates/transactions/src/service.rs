use crate::models::{RawTransactionRequest, Transaction, TransactionRequest, TransactionWithCategory};
use crate::repository::TransactionRepository;
use categories::service::{CategoryError, CategoryService};
use chrono::NaiveDateTime;
use common::UserId;
use database::codec::from_wide_cents;
use database::{RepositoryError, Database};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Database error: {0}")]
    Infrastructure(String),
    #[error("Transaction not found")]
    NotFound,
}

impl From<RepositoryError> for TransactionError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => TransactionError::NotFound,
            RepositoryError::CheckViolation(msg) => TransactionError::InvalidInput(msg),
            RepositoryError::Infrastructure(e) => TransactionError::Infrastructure(e.to_string()),
            _ => TransactionError::Infrastructure(err.to_string()),
        }
    }
}

pub struct TransactionService;

impl TransactionService {
    /// A referenced category must exist and belong to the same user.
    async fn ensure_category_owned(
        db: &Database,
        user_id: UserId,
        category_id: Option<i64>,
    ) -> Result<(), TransactionError> {
        let Some(category_id) = category_id else {
            return Ok(());
        };
        CategoryService::get_owned_category(db, user_id, category_id)
            .await
            .map(|_| ())
            .map_err(|e| match e {
                CategoryError::NotFound => TransactionError::InvalidInput("Invalid category ID".into()),
                other => {
                    tracing::error!("Failed to get category for transaction: {:?}", other);
                    TransactionError::Infrastructure(other.to_string())
                }
            })
    }

    #[instrument(skip(db, raw))]
    pub async fn create_transaction(
        db: &Database,
        user_id: UserId,
        raw: RawTransactionRequest,
        now: NaiveDateTime,
    ) -> Result<Transaction, TransactionError> {
        let req = TransactionRequest::new(user_id, raw).map_err(TransactionError::InvalidInput)?;
        Self::ensure_category_owned(db, user_id, req.category_id()).await?;

        let mut uow = db.begin().await?;
        let mut repo = TransactionRepository::new(uow.connection());

        let id = repo.create(&req, now).await?;
        let transaction = repo.find_for_user(user_id, id).await?
            .ok_or(TransactionError::NotFound)?;

        uow.commit().await?;

        Ok(transaction)
    }

    #[instrument(skip(db, raw))]
    pub async fn update_transaction(
        db: &Database,
        user_id: UserId,
        id: i64,
        raw: RawTransactionRequest,
    ) -> Result<Transaction, TransactionError> {
        let req = TransactionRequest::new(user_id, raw).map_err(TransactionError::InvalidInput)?;
        Self::ensure_category_owned(db, user_id, req.category_id()).await?;

        let mut uow = db.begin().await?;
        let mut repo = TransactionRepository::new(uow.connection());

        repo.update(id, &req).await?;

        let transaction = repo.find_for_user(user_id, id).await?
            .ok_or(TransactionError::NotFound)?;

        uow.commit().await?;

        Ok(transaction)
    }

    #[instrument(skip(db))]
    pub async fn list_transactions(db: &Database, user_id: UserId) -> Result<Vec<Transaction>, TransactionError> {
        let mut uow = db.begin().await?;
        let mut repo = TransactionRepository::new(uow.connection());

        let transactions = repo.list_for_user(user_id).await?;
        Ok(transactions)
    }

    #[instrument(skip(db, transaction), fields(transaction_id = transaction.id))]
    pub async fn with_category(
        db: &Database,
        user_id: UserId,
        transaction: Transaction,
    ) -> Result<TransactionWithCategory, TransactionError> {
        let category = match transaction.category_id {
            Some(id) => match CategoryService::get_owned_category(db, user_id, id).await {
                Ok(category) => Some(category),
                Err(CategoryError::NotFound) => None,
                Err(e) => return Err(TransactionError::Infrastructure(e.to_string())),
            },
            None => None,
        };
        Ok(TransactionWithCategory { transaction, category })
    }

    /// Inlines each transaction's category using one lookup of the user's
    /// categories.
    #[instrument(skip(db, transactions), fields(count = transactions.len()))]
    pub async fn with_categories(
        db: &Database,
        user_id: UserId,
        transactions: Vec<Transaction>,
    ) -> Result<Vec<TransactionWithCategory>, TransactionError> {
        let categories: HashMap<i64, _> = CategoryService::list_categories(db, user_id)
            .await
            .map_err(|e| TransactionError::Infrastructure(e.to_string()))?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        Ok(transactions
            .into_iter()
            .map(|transaction| TransactionWithCategory {
                category: transaction.category_id.and_then(|id| categories.get(&id).cloned()),
                transaction,
            })
            .collect())
    }

    #[instrument(skip(db))]
    pub async fn delete_transaction(db: &Database, user_id: UserId, id: i64) -> Result<(), TransactionError> {
        let mut uow = db.begin().await?;
        let mut repo = TransactionRepository::new(uow.connection());

        repo.delete_for_user(user_id, id).await?;

        uow.commit().await?;
        Ok(())
    }

    /// Total of the user's expenses in `category_id` dated within
    /// `[start, end]` inclusive. Returns zero when nothing matches.
    #[instrument(skip(db))]
    pub async fn sum_expenses(
        db: &Database,
        user_id: UserId,
        category_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Decimal, TransactionError> {
        let mut uow = db.begin().await?;
        let mut repo = TransactionRepository::new(uow.connection());

        let cents = repo.sum_expenses(user_id, category_id, start, end).await?;
        from_wide_cents(cents)
            .ok_or_else(|| TransactionError::Infrastructure(format!("expense total {} out of range", cents)))
    }
}
