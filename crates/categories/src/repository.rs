use crate::models::{Category, CreateCategoryRequest};
use common::{EntryKind, UserId};
use database::{self, RepositoryError};
use sqlx::FromRow;

#[derive(FromRow)]
struct CategoryRecord {
    id: i64,
    user_id: i64,
    name: String,
    kind: String,
    color: String,
    icon: Option<String>,
    description: Option<String>,
}

impl TryFrom<CategoryRecord> for Category {
    type Error = RepositoryError;
    fn try_from(record: CategoryRecord) -> Result<Self, Self::Error> {
        Ok(Category {
            id: record.id,
            user_id: record.user_id,
            name: record.name,
            kind: record.kind.parse::<EntryKind>().map_err(RepositoryError::Decode)?,
            color: record.color,
            icon: record.icon,
            description: record.description,
        })
    }
}

pub(crate) struct CategoryRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> CategoryRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    pub async fn create(&mut self, req: &CreateCategoryRequest) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO categories (user_id, name, kind, color, icon, description) VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
        )
        .bind(req.user_id())
        .bind(req.name())
        .bind(req.kind().as_str())
        .bind(req.color())
        .bind(req.icon())
        .bind(req.description())
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<Category>, RepositoryError> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, user_id, name, kind, color, icon, description FROM categories WHERE user_id = $1 ORDER BY name",
        )
        .bind(user_id)
        .fetch_all(&mut *self.conn)
        .await?;

        records.into_iter().map(Category::try_from).collect()
    }

    pub async fn find_for_user(&mut self, user_id: UserId, id: i64) -> Result<Option<Category>, RepositoryError> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, user_id, name, kind, color, icon, description FROM categories WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?;

        record.map(Category::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::get_test_db;

    async fn insert_user(conn: &mut database::Connection, email: &str) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO users (email, name, password_hash, created_at) VALUES ($1, 'Test', 'x', '2024-01-01 00:00:00.000') RETURNING id",
        )
        .bind(email)
        .fetch_one(&mut *conn)
        .await
        .unwrap()
    }

    fn expense(user_id: i64, name: &str) -> CreateCategoryRequest {
        CreateCategoryRequest::new(user_id, name.to_string(), "EXPENSE", "#ff0000".to_string(), Some("🍔".into()), None).unwrap()
    }

    #[tokio::test]
    async fn test_create_category() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let user_id = insert_user(uow.connection(), "a@example.com").await;
        let mut repo = CategoryRepository::new(uow.connection());

        let id = repo.create(&expense(user_id, "Test Category")).await.unwrap();
        assert!(id > 0);

        let cat = repo.find_for_user(user_id, id).await.unwrap().unwrap();
        assert_eq!(cat.name, "Test Category");
        assert_eq!(cat.color, "#ff0000");
        assert_eq!(cat.kind, EntryKind::Expense);
        assert_eq!(cat.icon.as_deref(), Some("🍔"));
    }

    #[tokio::test]
    async fn test_list_is_scoped_and_sorted() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let alice = insert_user(uow.connection(), "alice@example.com").await;
        let bob = insert_user(uow.connection(), "bob@example.com").await;
        let mut repo = CategoryRepository::new(uow.connection());

        repo.create(&expense(alice, "Rent")).await.unwrap();
        repo.create(&expense(alice, "Coffee")).await.unwrap();
        repo.create(&expense(bob, "Fuel")).await.unwrap();

        let names: Vec<String> = repo.list_for_user(alice).await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Coffee".to_string(), "Rent".to_string()]);
    }

    #[tokio::test]
    async fn test_find_for_other_user_is_none() {
        let db = get_test_db().await;
        let mut uow = db.begin().await.unwrap();
        let alice = insert_user(uow.connection(), "alice@example.com").await;
        let bob = insert_user(uow.connection(), "bob@example.com").await;
        let mut repo = CategoryRepository::new(uow.connection());

        let id = repo.create(&expense(alice, "Rent")).await.unwrap();
        assert!(repo.find_for_user(bob, id).await.unwrap().is_none());
    }
}
