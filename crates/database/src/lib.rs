use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

pub mod codec;

pub use sqlx::Error;
pub use sqlx::Result;

static TEST_DB_COUNTER: AtomicU64 = AtomicU64::new(0);

// --- Driver Adapter Pattern ---
pub type Driver = Sqlite;
pub type Connection = sqlx::SqliteConnection;
pub type Pool = SqlitePool;

/// How long a connection waits on another writer's lock before giving up.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Infrastructure(sqlx::Error),
    #[error("Resource not found")]
    NotFound,
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),
    #[error("Database is locked: {0}")]
    Busy(String),
    #[error("Stored value could not be decoded: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::RowNotFound = err {
            return RepositoryError::NotFound;
        }

        let classified = err.as_database_error().and_then(|db_err| {
            let message = db_err.message().to_string();
            // SQLite extended result codes
            match db_err.code()?.as_ref() {
                "2067" | "1555" => Some(RepositoryError::UniqueViolation(message)),
                "275" => Some(RepositoryError::CheckViolation(message)),
                "5" | "261" | "517" | "773" => Some(RepositoryError::Busy(message)),
                _ => None,
            }
        });

        classified.unwrap_or(RepositoryError::Infrastructure(err))
    }
}

fn connect_options(connection_string: &str) -> sqlx::Result<SqliteConnectOptions> {
    Ok(SqliteConnectOptions::from_str(connection_string)?
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT))
}

#[derive(Clone)]
pub struct Database {
    pub pool: Pool,
}

impl Database {
    pub async fn new(connection_string: &str) -> sqlx::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .connect_with(connect_options(connection_string)?)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        tracing::info!("Running migrations...");
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await?;
        tracing::info!("Migrations complete.");
        Ok(())
    }

    /// Deferred transaction: takes the write lock only at the first write.
    /// Fine for reads and for writes that do not depend on a prior read.
    pub async fn begin(&self) -> Result<UnitOfWork<'_>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(UnitOfWork { tx })
    }

    /// Takes the write lock up front (`BEGIN IMMEDIATE`), so a
    /// check-then-insert sequence cannot interleave with another writer.
    /// A second caller waits up to [`BUSY_TIMEOUT`] and then sees the first
    /// caller's committed rows.
    pub async fn begin_write(&self) -> Result<UnitOfWork<'_>, RepositoryError> {
        let tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;
        Ok(UnitOfWork { tx })
    }
}

pub struct UnitOfWork<'a> {
    tx: Transaction<'a, Driver>,
}

impl<'a> UnitOfWork<'a> {
    pub async fn commit(self) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }

    pub fn connection(&mut self) -> &mut Connection {
        &mut *self.tx
    }
}

// do not add #[cfg(test)] here because it hides these helpers from libraries.

/// Fresh migrated database on a single pooled connection.
pub async fn get_test_db() -> Database {
    get_shared_test_db(1).await
}

/// Fresh migrated database whose pool hands out up to `max_connections`
/// separate connections to the same file, for tests that need real
/// concurrent transactions.
pub async fn get_shared_test_db(max_connections: u32) -> Database {
    use std::time::{SystemTime, UNIX_EPOCH};

    // tests in one binary can start within the same nanosecond
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let seq = TEST_DB_COUNTER.fetch_add(1, Ordering::Relaxed);
    let db_path = std::env::temp_dir().join(format!("test_finance_{}_{}_{}.db", std::process::id(), now, seq));

    let options = connect_options(&format!("sqlite:{}", db_path.display()))
        .expect("Failed to build test database options");

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .expect("Failed to create test database pool");

    let db = Database { pool };
    db.run_migrations().await.expect("Failed to run migrations");

    db
}
