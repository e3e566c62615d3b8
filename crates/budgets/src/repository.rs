use crate::models::{Budget, CreateBudgetRequest};
use crate::period::{BudgetPeriod, PeriodWindow};
use crate::status::BudgetLimits;
use chrono::NaiveDateTime;
use common::UserId;
use database::codec::{decode_decimal, decode_instant, encode_instant, from_cents, to_cents};
use database::{self, RepositoryError};
use sqlx::FromRow;

#[derive(FromRow)]
struct BudgetRecord {
    id: i64,
    user_id: i64,
    category_id: i64,
    amount: i64,
    period: String,
    start_date: String,
    end_date: String,
    alert_threshold: String,
    created_at: String,
}

impl TryFrom<BudgetRecord> for Budget {
    type Error = RepositoryError;
    fn try_from(record: BudgetRecord) -> Result<Self, Self::Error> {
        let limits = BudgetLimits::new(from_cents(record.amount), decode_decimal(&record.alert_threshold)?)
            .map_err(|e| RepositoryError::Decode(e.to_string()))?;
        Ok(Budget {
            id: record.id,
            user_id: record.user_id,
            category_id: record.category_id,
            period: record.period.parse::<BudgetPeriod>().map_err(|e| RepositoryError::Decode(e.to_string()))?,
            limits,
            start_date: decode_instant(&record.start_date)?,
            end_date: decode_instant(&record.end_date)?,
            created_at: decode_instant(&record.created_at)?,
        })
    }
}

fn encode_amount(limits: &BudgetLimits) -> Result<i64, RepositoryError> {
    to_cents(limits.amount()).ok_or_else(|| RepositoryError::Decode(format!("amount {} overflows", limits.amount())))
}

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, category_id, amount, period, start_date, end_date, alert_threshold, created_at FROM budgets";

pub(crate) struct BudgetRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> BudgetRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, req: &CreateBudgetRequest, created_at: NaiveDateTime) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO budgets (user_id, category_id, amount, period, start_date, end_date, alert_threshold, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(req.user_id())
        .bind(req.category_id())
        .bind(encode_amount(req.limits())?)
        .bind(req.period().as_str())
        .bind(encode_instant(req.window().start))
        .bind(encode_instant(req.window().end))
        .bind(req.limits().alert_threshold().normalize().to_string())
        .bind(encode_instant(created_at))
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    /// Id of the user's budget for `category_id` with exactly this window.
    pub async fn find_id_by_window(
        &mut self,
        user_id: UserId,
        category_id: i64,
        window: &PeriodWindow,
    ) -> Result<Option<i64>, RepositoryError> {
        let id: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM budgets WHERE user_id = $1 AND category_id = $2 AND start_date = $3 AND end_date = $4",
        )
        .bind(user_id)
        .bind(category_id)
        .bind(encode_instant(window.start))
        .bind(encode_instant(window.end))
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(id)
    }

    pub async fn find_for_user(&mut self, user_id: UserId, id: i64) -> Result<Option<Budget>, RepositoryError> {
        let record = sqlx::query_as::<_, BudgetRecord>(
            &format!("{} WHERE id = $1 AND user_id = $2", SELECT_COLUMNS),
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        record.map(Budget::try_from).transpose()
    }

    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<Budget>, RepositoryError> {
        let records = sqlx::query_as::<_, BudgetRecord>(
            &format!("{} WHERE user_id = $1 ORDER BY created_at DESC, id DESC", SELECT_COLUMNS),
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        records.into_iter().map(Budget::try_from).collect()
    }

    /// Only amount and threshold are writable; period and window are not.
    pub async fn update_limits(&mut self, user_id: UserId, id: i64, limits: &BudgetLimits) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE budgets SET amount = $1, alert_threshold = $2 WHERE id = $3 AND user_id = $4")
            .bind(encode_amount(limits)?)
            .bind(limits.alert_threshold().normalize().to_string())
            .bind(id)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    pub async fn delete_for_user(&mut self, user_id: UserId, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
