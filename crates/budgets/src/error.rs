use crate::ledger::LedgerError;
use crate::period::PeriodError;
use crate::status::LimitsError;
use database::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    #[error("Invalid budget period '{0}', expected WEEKLY, MONTHLY or YEARLY")]
    InvalidPeriod(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("A budget for this category and period already exists")]
    DuplicateBudget,
    #[error("Transaction store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Budget not found")]
    NotFound,
    #[error("Database error: {0}")]
    Infrastructure(String),
}

impl From<PeriodError> for BudgetError {
    fn from(err: PeriodError) -> Self {
        match err {
            PeriodError::InvalidPeriod(kind) => BudgetError::InvalidPeriod(kind),
            PeriodError::OutOfRange(_) => BudgetError::Validation(err.to_string()),
        }
    }
}

impl From<LimitsError> for BudgetError {
    fn from(err: LimitsError) -> Self {
        BudgetError::Validation(err.to_string())
    }
}

impl From<LedgerError> for BudgetError {
    fn from(err: LedgerError) -> Self {
        BudgetError::StoreUnavailable(err.0)
    }
}

impl From<RepositoryError> for BudgetError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => BudgetError::NotFound,
            // the only unique key on budgets is (user, category, start, end)
            RepositoryError::UniqueViolation(_) => BudgetError::DuplicateBudget,
            RepositoryError::CheckViolation(msg) => BudgetError::Validation(msg),
            RepositoryError::Busy(msg) => BudgetError::StoreUnavailable(msg),
            RepositoryError::Infrastructure(e) => BudgetError::Infrastructure(e.to_string()),
            _ => BudgetError::Infrastructure(err.to_string()),
        }
    }
}
