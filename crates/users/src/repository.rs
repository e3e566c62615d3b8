use crate::models::User;
use chrono::NaiveDateTime;
use common::UserId;
use database::codec::{decode_instant, encode_instant};
use database::{self, RepositoryError};
use sqlx::FromRow;

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    email: String,
    name: String,
    password_hash: String,
    created_at: String,
}

impl UserRecord {
    fn into_user(self) -> Result<(User, String), RepositoryError> {
        let user = User {
            id: self.id,
            email: self.email,
            name: self.name,
            created_at: decode_instant(&self.created_at)?,
        };
        Ok((user, self.password_hash))
    }
}

pub(crate) struct UserRepository<'a> {
    conn: &'a mut database::Connection,
}

impl<'a> UserRepository<'a> {
    pub fn new(conn: &'a mut database::Connection) -> Self {
        Self { conn }
    }

    pub async fn create(
        &mut self,
        email: &str,
        name: &str,
        password_hash: &str,
        created_at: NaiveDateTime,
    ) -> Result<i64, RepositoryError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (email, name, password_hash, created_at) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(email)
        .bind(name)
        .bind(password_hash)
        .bind(encode_instant(created_at))
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(id)
    }

    /// The user together with their stored password hash.
    pub async fn find_by_email(&mut self, email: &str) -> Result<Option<(User, String)>, RepositoryError> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&mut *self.conn)
        .await?;

        record.map(UserRecord::into_user).transpose()
    }

    pub async fn find_by_id(&mut self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let record = sqlx::query_as::<_, UserRecord>(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *self.conn)
        .await?;

        Ok(record.map(UserRecord::into_user).transpose()?.map(|(user, _)| user))
    }
}
