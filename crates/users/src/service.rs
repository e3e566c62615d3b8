use crate::models::{normalize_email, LoginRequest, RawRegisterRequest, RegisterRequest, User};
use crate::password::{hash_password, verify_password, PasswordError};
use crate::repository::UserRepository;
use categories::service::CategoryService;
use chrono::NaiveDateTime;
use common::UserId;
use database::{Database, RepositoryError};
use tracing::instrument;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Email is already registered")]
    Conflict,
    #[error("Invalid email or password")]
    Unauthorized,
    #[error("Internal error: {0}")]
    Infrastructure(String),
}

impl From<RepositoryError> for UserError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UniqueViolation(_) => UserError::Conflict,
            other => UserError::Infrastructure(other.to_string()),
        }
    }
}

impl From<PasswordError> for UserError {
    fn from(err: PasswordError) -> Self {
        UserError::Infrastructure(err.to_string())
    }
}

pub struct UserService;

impl UserService {
    /// Creates the account and its default categories in one unit of work.
    #[instrument(skip(db, raw))]
    pub async fn register(db: &Database, raw: RawRegisterRequest, now: NaiveDateTime) -> Result<User, UserError> {
        let req = RegisterRequest::new(raw).map_err(UserError::InvalidInput)?;

        let password = req.password().to_string();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| UserError::Infrastructure(e.to_string()))??;

        let mut uow = db.begin().await?;

        let id = UserRepository::new(uow.connection())
            .create(req.email(), req.name(), &password_hash, now)
            .await?;
        CategoryService::seed_default_categories(uow.connection(), id).await?;

        let user = UserRepository::new(uow.connection())
            .find_by_id(id)
            .await?
            .ok_or_else(|| UserError::Infrastructure("user vanished after insert".to_string()))?;

        uow.commit().await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Unknown email and wrong password are indistinguishable to the caller.
    #[instrument(skip(db, req))]
    pub async fn login(db: &Database, req: LoginRequest) -> Result<User, UserError> {
        let found = {
            let mut uow = db.begin().await?;
            UserRepository::new(uow.connection())
                .find_by_email(&normalize_email(&req.email))
                .await?
        };

        let Some((user, password_hash)) = found else {
            tracing::info!("Login attempt for unknown email");
            return Err(UserError::Unauthorized);
        };

        let password = req.password;
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &password_hash))
            .await
            .map_err(|e| UserError::Infrastructure(e.to_string()))??;

        if !matches {
            tracing::info!(user_id = user.id, "Failed login attempt");
            return Err(UserError::Unauthorized);
        }

        Ok(user)
    }

    #[instrument(skip(db))]
    pub async fn me(db: &Database, user_id: UserId) -> Result<User, UserError> {
        let mut uow = db.begin().await?;
        UserRepository::new(uow.connection())
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::Unauthorized)
    }
}
