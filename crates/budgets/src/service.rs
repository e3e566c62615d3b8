use crate::error::BudgetError;
use crate::ledger::ExpenseLedger;
use crate::models::{
    normalize_amount, Budget, BudgetWithCategory, BudgetWithStatus, CreateBudgetRequest, RawCreateBudgetRequest,
    RawUpdateBudgetRequest,
};
use crate::repository::BudgetRepository;
use crate::status::BudgetStatus;
use categories::service::{CategoryError, CategoryService};
use chrono::NaiveDateTime;
use common::UserId;
use database::Database;
use tracing::instrument;

pub struct BudgetService;

impl BudgetService {
    /// Creates a budget whose window is derived from `now`.
    ///
    /// Fails with `DuplicateBudget` if the user already has a budget for the
    /// same category and window. The lookup and insert run under the write
    /// lock, so a concurrent request for the same window waits and then sees
    /// this one's row. The unique index backs this up.
    #[instrument(skip(db, raw))]
    pub async fn create_budget(
        db: &Database,
        user_id: UserId,
        raw: RawCreateBudgetRequest,
        now: NaiveDateTime,
    ) -> Result<Budget, BudgetError> {
        let req = CreateBudgetRequest::new(user_id, raw, now)?;

        CategoryService::get_owned_category(db, user_id, req.category_id())
            .await
            .map_err(|e| match e {
                CategoryError::NotFound => BudgetError::Validation("Category not found".into()),
                other => BudgetError::Infrastructure(other.to_string()),
            })?;

        let mut uow = db.begin_write().await?;
        let mut repo = BudgetRepository::new(uow.connection());

        if repo.find_id_by_window(user_id, req.category_id(), req.window()).await?.is_some() {
            tracing::info!(category_id = req.category_id(), period = %req.period(), "Budget already exists for window");
            return Err(BudgetError::DuplicateBudget);
        }

        let id = repo.create(&req, now).await?;
        let budget = repo.find_for_user(user_id, id).await?
            .ok_or(BudgetError::NotFound)?;

        uow.commit().await?;

        tracing::info!(budget_id = id, start = %budget.start_date, end = %budget.end_date, "Budget created");
        Ok(budget)
    }

    /// Changes amount and/or alert threshold. Period and window stay as created.
    #[instrument(skip(db, raw))]
    pub async fn update_budget(
        db: &Database,
        user_id: UserId,
        id: i64,
        raw: RawUpdateBudgetRequest,
    ) -> Result<Budget, BudgetError> {
        let amount = raw.amount.map(normalize_amount).transpose()?;

        let mut uow = db.begin_write().await?;
        let mut repo = BudgetRepository::new(uow.connection());

        let existing = repo.find_for_user(user_id, id).await?
            .ok_or(BudgetError::NotFound)?;
        let limits = existing.limits.with_changes(amount, raw.alert_threshold)?;

        repo.update_limits(user_id, id, &limits).await?;
        let budget = repo.find_for_user(user_id, id).await?
            .ok_or(BudgetError::NotFound)?;

        uow.commit().await?;
        Ok(budget)
    }

    #[instrument(skip(db))]
    pub async fn delete_budget(db: &Database, user_id: UserId, id: i64) -> Result<(), BudgetError> {
        let mut uow = db.begin().await?;
        let mut repo = BudgetRepository::new(uow.connection());

        repo.delete_for_user(user_id, id).await?;

        uow.commit().await?;
        Ok(())
    }

    /// Pairs a budget with its category for create and update responses.
    #[instrument(skip(db, budget), fields(budget_id = budget.id))]
    pub async fn with_category(db: &Database, user_id: UserId, budget: Budget) -> Result<BudgetWithCategory, BudgetError> {
        let category = match CategoryService::get_owned_category(db, user_id, budget.category_id).await {
            Ok(category) => Some(category),
            Err(CategoryError::NotFound) => None,
            Err(e) => return Err(BudgetError::Infrastructure(e.to_string())),
        };
        Ok(BudgetWithCategory { budget, category })
    }

    /// Spending status of `budget` over its stored window. A ledger failure
    /// is returned as `StoreUnavailable`; nothing is retried.
    #[instrument(skip(ledger, budget), fields(budget_id = budget.id))]
    pub async fn budget_status<L: ExpenseLedger>(ledger: &L, budget: &Budget) -> Result<BudgetStatus, BudgetError> {
        let spent = ledger
            .sum_expenses(budget.user_id, budget.category_id, &budget.window())
            .await
            .map_err(|e| {
                tracing::error!("Expense lookup failed: {}", e);
                BudgetError::from(e)
            })?;

        Ok(BudgetStatus::compute(&budget.limits, spent))
    }

    /// All of the user's budgets, newest first, each with its current status.
    /// Fails as a whole if any status lookup fails.
    #[instrument(skip(db, ledger))]
    pub async fn list_budgets<L: ExpenseLedger>(
        db: &Database,
        ledger: &L,
        user_id: UserId,
    ) -> Result<Vec<BudgetWithStatus>, BudgetError> {
        let budgets = {
            let mut uow = db.begin().await?;
            let mut repo = BudgetRepository::new(uow.connection());
            repo.list_for_user(user_id).await?
        };

        let categories = CategoryService::list_categories(db, user_id)
            .await
            .map_err(|e| BudgetError::Infrastructure(e.to_string()))?;

        let mut views = Vec::with_capacity(budgets.len());
        for budget in budgets {
            let status = Self::budget_status(ledger, &budget).await?;
            let category = categories.iter().find(|c| c.id == budget.category_id).cloned();
            views.push(BudgetWithStatus {
                alert: status.alert(),
                budget,
                category,
                status,
            });
        }

        Ok(views)
    }
}
