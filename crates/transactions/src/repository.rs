use crate::models::{Transaction, TransactionRequest};
use chrono::NaiveDateTime;
use common::{EntryKind, UserId};
use database::codec::{decode_instant, encode_instant, from_cents};
use database::{self, RepositoryError};
use sqlx::FromRow;

#[derive(FromRow)]
struct TransactionRecord {
    id: i64,
    user_id: i64,
    category_id: Option<i64>,
    kind: String,
    amount: i64,
    description: Option<String>,
    occurred_at: String,
    created_at: String,
}

impl TryFrom<TransactionRecord> for Transaction {
    type Error = RepositoryError;
    fn try_from(record: TransactionRecord) -> Result<Self, Self::Error> {
        Ok(Transaction {
            id: record.id,
            user_id: record.user_id,
            category_id: record.category_id,
            kind: record.kind.parse::<EntryKind>().map_err(RepositoryError::Decode)?,
            amount: from_cents(record.amount),
            description: record.description,
            date: decode_instant(&record.occurred_at)?,
            created_at: decode_instant(&record.created_at)?,
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, category_id, kind, amount, description, occurred_at, created_at FROM transactions";

pub(crate) struct TransactionRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> TransactionRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, req: &TransactionRequest, created_at: NaiveDateTime) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO transactions (user_id, category_id, kind, amount, description, occurred_at, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(req.user_id())
        .bind(req.category_id())
        .bind(req.kind().as_str())
        .bind(req.amount())
        .bind(req.description())
        .bind(encode_instant(req.date()))
        .bind(encode_instant(created_at))
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    pub async fn update(&mut self, id: i64, req: &TransactionRequest) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE transactions SET category_id = $1, kind = $2, amount = $3, description = $4, occurred_at = $5 WHERE id = $6 AND user_id = $7",
        )
        .bind(req.category_id())
        .bind(req.kind().as_str())
        .bind(req.amount())
        .bind(req.description())
        .bind(encode_instant(req.date()))
        .bind(id)
        .bind(req.user_id())
        .execute(&mut *self.conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    pub async fn find_for_user(&mut self, user_id: UserId, id: i64) -> Result<Option<Transaction>, RepositoryError> {
        let record = sqlx::query_as::<_, TransactionRecord>(
            &format!("{} WHERE id = $1 AND user_id = $2", SELECT_COLUMNS),
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        record.map(Transaction::try_from).transpose()
    }

    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<Transaction>, RepositoryError> {
        let records = sqlx::query_as::<_, TransactionRecord>(
            &format!("{} WHERE user_id = $1 ORDER BY occurred_at DESC, id DESC", SELECT_COLUMNS),
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        records.into_iter().map(Transaction::try_from).collect()
    }

    pub async fn delete_for_user(&mut self, user_id: UserId, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Sum in cents of the user's EXPENSE rows in `category_id` whose date lies
    /// in `[start, end]`, both ends inclusive. Zero when nothing matches.
    ///
    /// Each amount fits in i64 but their total may not, and SQLite's `SUM`
    /// errors on integer overflow. Amounts are positive, so summing the high
    /// and low parts separately keeps both partial sums in range.
    pub async fn sum_expenses(
        &mut self,
        user_id: UserId,
        category_id: i64,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<i128, RepositoryError> {
        let (high, low): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(amount / $5), 0), COALESCE(SUM(amount % $6), 0) FROM transactions
            WHERE user_id = $1
              AND category_id = $2
              AND kind = 'EXPENSE'
              AND occurred_at >= $3
              AND occurred_at <= $4
            "#,
        )
        .bind(user_id)
        .bind(category_id)
        .bind(encode_instant(start))
        .bind(encode_instant(end))
        .bind(SUM_SPLIT)
        .bind(SUM_SPLIT)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(i128::from(high) * i128::from(SUM_SPLIT) + i128::from(low))
    }
}

const SUM_SPLIT: i64 = 1_000_000_000;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawTransactionRequest;
    use chrono::NaiveDate;
    use database::get_test_db;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    async fn setup_deps(conn: &mut database::Connection) -> (i64, i64) {
        let user_id: i64 = sqlx::query_scalar(
            "INSERT INTO users (email, name, password_hash, created_at) VALUES ('t@example.com', 'Test', 'x', '2024-01-01 00:00:00.000') RETURNING id",
        )
        .fetch_one(&mut *conn)
        .await
        .unwrap();

        let cat_id: i64 = sqlx::query_scalar(
            "INSERT INTO categories (user_id, name, kind, color) VALUES ($1, 'Food', 'EXPENSE', '#000') RETURNING id",
        )
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await
        .unwrap();

        (user_id, cat_id)
    }

    fn request(user_id: i64, category_id: Option<i64>, amount: Decimal, kind: &str, date: &str) -> TransactionRequest {
        TransactionRequest::new(
            user_id,
            RawTransactionRequest {
                amount: Some(amount),
                kind: Some(kind.to_string()),
                category_id,
                date: Some(date.to_string()),
                description: Some("Notes".into()),
            },
        )
        .unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32, ms: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_milli_opt(h, min, s, ms).unwrap()
    }

    fn created() -> NaiveDateTime {
        at(2026, 1, 1, 8, 0, 0, 0)
    }

    #[tokio::test]
    async fn test_create_transaction() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let (user_id, cat_id) = setup_deps(uow.connection()).await;

        let mut repo = TransactionRepository::new(uow.connection());
        let id = repo.create(&request(user_id, Some(cat_id), dec!(10), "EXPENSE", "2026-01-01"), created()).await.unwrap();
        assert!(id > 0);

        let t = repo.find_for_user(user_id, id).await.unwrap().unwrap();
        assert_eq!(t.amount, dec!(10));
        assert_eq!(t.kind, EntryKind::Expense);
        assert_eq!(t.description, Some("Notes".to_string()));
        assert_eq!(t.created_at, created());
    }

    #[tokio::test]
    async fn test_list_transactions_newest_first() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let (user_id, cat_id) = setup_deps(uow.connection()).await;

        let mut repo = TransactionRepository::new(uow.connection());
        repo.create(&request(user_id, Some(cat_id), dec!(1), "EXPENSE", "2026-01-01"), created()).await.unwrap();
        repo.create(&request(user_id, None, dec!(2), "INCOME", "2026-03-01"), created()).await.unwrap();
        repo.create(&request(user_id, Some(cat_id), dec!(3), "EXPENSE", "2026-02-01"), created()).await.unwrap();

        let amounts: Vec<Decimal> = repo.list_for_user(user_id).await.unwrap().into_iter().map(|t| t.amount).collect();
        assert_eq!(amounts, vec![dec!(2), dec!(3), dec!(1)]);
    }

    #[tokio::test]
    async fn test_update_transaction() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let (user_id, cat_id) = setup_deps(uow.connection()).await;

        let mut repo = TransactionRepository::new(uow.connection());
        let id = repo.create(&request(user_id, Some(cat_id), dec!(10), "EXPENSE", "2026-01-01"), created()).await.unwrap();

        repo.update(id, &request(user_id, Some(cat_id), dec!(20), "INCOME", "2026-01-02")).await.unwrap();

        let t = repo.find_for_user(user_id, id).await.unwrap().unwrap();
        assert_eq!(t.amount, dec!(20));
        assert_eq!(t.kind, EntryKind::Income);
        assert_eq!(t.date, at(2026, 1, 2, 0, 0, 0, 0));
    }

    #[tokio::test]
    async fn test_update_foreign_transaction_is_not_found() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let (user_id, cat_id) = setup_deps(uow.connection()).await;

        let mut repo = TransactionRepository::new(uow.connection());
        let id = repo.create(&request(user_id, Some(cat_id), dec!(10), "EXPENSE", "2026-01-01"), created()).await.unwrap();

        let result = repo.update(id, &request(user_id + 1, None, dec!(20), "INCOME", "2026-01-02")).await;
        assert!(matches!(result, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_delete_transaction() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let (user_id, cat_id) = setup_deps(uow.connection()).await;

        let mut repo = TransactionRepository::new(uow.connection());
        let id = repo.create(&request(user_id, Some(cat_id), dec!(10), "EXPENSE", "2026-01-01"), created()).await.unwrap();

        assert!(repo.find_for_user(user_id, id).await.unwrap().is_some());
        repo.delete_for_user(user_id, id).await.unwrap();
        assert!(repo.find_for_user(user_id, id).await.unwrap().is_none());
        assert!(matches!(repo.delete_for_user(user_id, id).await, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_sum_expenses_filters_kind_category_and_window() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let (user_id, cat_id) = setup_deps(uow.connection()).await;

        let mut repo = TransactionRepository::new(uow.connection());
        // counted: both window edges and a middle row
        repo.create(&request(user_id, Some(cat_id), dec!(100), "EXPENSE", "2024-02-01 00:00:00.000"), created()).await.unwrap();
        repo.create(&request(user_id, Some(cat_id), dec!(20.50), "EXPENSE", "2024-02-15 12:00:00"), created()).await.unwrap();
        repo.create(&request(user_id, Some(cat_id), dec!(3), "EXPENSE", "2024-02-29 23:59:59.999"), created()).await.unwrap();
        // not counted
        repo.create(&request(user_id, Some(cat_id), dec!(1000), "INCOME", "2024-02-15"), created()).await.unwrap();
        repo.create(&request(user_id, None, dec!(1000), "EXPENSE", "2024-02-15"), created()).await.unwrap();
        repo.create(&request(user_id, Some(cat_id), dec!(1000), "EXPENSE", "2024-01-31 23:59:59.999"), created()).await.unwrap();
        repo.create(&request(user_id, Some(cat_id), dec!(1000), "EXPENSE", "2024-03-01"), created()).await.unwrap();

        let total = repo
            .sum_expenses(user_id, cat_id, at(2024, 2, 1, 0, 0, 0, 0), at(2024, 2, 29, 23, 59, 59, 999))
            .await
            .unwrap();
        assert_eq!(total, 12350);
    }

    #[tokio::test]
    async fn test_sum_expenses_beyond_i64() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let (user_id, cat_id) = setup_deps(uow.connection()).await;

        let half = 4_611_686_018_427_387_904_i64;
        for _ in 0..2 {
            sqlx::query(
                "INSERT INTO transactions (user_id, category_id, kind, amount, occurred_at, created_at) VALUES ($1, $2, 'EXPENSE', $3, '2024-02-10 00:00:00.000', '2024-02-10 00:00:00.000')",
            )
            .bind(user_id)
            .bind(cat_id)
            .bind(half)
            .execute(uow.connection())
            .await
            .unwrap();
        }
        sqlx::query(
            "INSERT INTO transactions (user_id, category_id, kind, amount, occurred_at, created_at) VALUES ($1, $2, 'EXPENSE', 1999999999, '2024-02-11 00:00:00.000', '2024-02-10 00:00:00.000')",
        )
        .bind(user_id)
        .bind(cat_id)
        .execute(uow.connection())
        .await
        .unwrap();

        let mut repo = TransactionRepository::new(uow.connection());
        let total = repo
            .sum_expenses(user_id, cat_id, at(2024, 2, 1, 0, 0, 0, 0), at(2024, 2, 29, 23, 59, 59, 999))
            .await
            .unwrap();
        assert_eq!(total, 2 * i128::from(half) + 1_999_999_999);
    }

    #[tokio::test]
    async fn test_sum_expenses_empty_is_zero() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let (user_id, cat_id) = setup_deps(uow.connection()).await;

        let mut repo = TransactionRepository::new(uow.connection());
        let total = repo
            .sum_expenses(user_id, cat_id, at(2024, 2, 1, 0, 0, 0, 0), at(2024, 2, 29, 23, 59, 59, 999))
            .await
            .unwrap();
        assert_eq!(total, 0);
    }
}
