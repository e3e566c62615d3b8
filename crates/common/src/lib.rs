use clap::Parser;
use database::Database;

pub mod auth;
pub mod kind;

pub use kind::EntryKind;

pub type UserId = i64;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Config,
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:finance.db")]
    pub database_url: String,

    #[arg(long, env = "PORT", default_value = "3000")]
    pub port: u16,

    /// Mark the session cookie `Secure`. Enable behind HTTPS.
    #[arg(long, env = "SECURE_COOKIES", default_value_t = false)]
    pub secure_cookies: bool,

    /// Idle lifetime of a login session.
    #[arg(long, env = "SESSION_TTL_DAYS", default_value = "7")]
    pub session_ttl_days: i64,
}

/// Wall-clock "now" in local calendar terms, the reference instant handed to
/// the domain layer. Domain code never reads the clock itself.
pub fn local_now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
