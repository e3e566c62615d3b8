use crate::period::PeriodWindow;
use common::UserId;
use database::Database;
use rust_decimal::Decimal;
use std::future::Future;
use transactions::service::TransactionService;

#[derive(Debug, thiserror::Error)]
#[error("Transaction store unavailable: {0}")]
pub struct LedgerError(pub String);

/// Read access to recorded expenses, the only store capability budget
/// status needs.
pub trait ExpenseLedger {
    /// Sum of the user's EXPENSE transactions in `category_id` dated within
    /// `window` (inclusive). Zero, not an error, when nothing matches.
    fn sum_expenses(
        &self,
        user_id: UserId,
        category_id: i64,
        window: &PeriodWindow,
    ) -> impl Future<Output = Result<Decimal, LedgerError>> + Send;
}

impl ExpenseLedger for Database {
    async fn sum_expenses(
        &self,
        user_id: UserId,
        category_id: i64,
        window: &PeriodWindow,
    ) -> Result<Decimal, LedgerError> {
        TransactionService::sum_expenses(self, user_id, category_id, window.start, window.end)
            .await
            .map_err(|e| LedgerError(e.to_string()))
    }
}
