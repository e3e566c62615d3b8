use categories::models::Category;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};
use common::{EntryKind, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transaction {
    pub id: i64,
    pub user_id: UserId,
    pub category_id: Option<i64>,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub description: Option<String>,
    pub date: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

/// A transaction as returned to its owner, with its category inlined.
#[derive(Debug, Serialize, Clone)]
pub struct TransactionWithCategory {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub category: Option<Category>,
}

// Required fields are optional here so a missing one is reported as a 400
// with the usual error body.
#[derive(Debug, Default, Deserialize)]
pub struct RawTransactionRequest {
    pub amount: Option<Decimal>,
    pub kind: Option<String>,
    pub category_id: Option<i64>,
    pub date: Option<String>,
    pub description: Option<String>,
}

/// Validated create/update payload. Amount is held in cents.
#[derive(Debug, Serialize)]
pub struct TransactionRequest {
    user_id: UserId,
    category_id: Option<i64>,
    kind: EntryKind,
    amount: i64,
    description: Option<String>,
    date: NaiveDateTime,
}

impl TransactionRequest {
    pub fn new(user_id: UserId, raw: RawTransactionRequest) -> Result<Self, String> {
        let (Some(amount), Some(kind), Some(date)) = (raw.amount, raw.kind, raw.date) else {
            return Err("amount, kind and date are required".to_string());
        };

        let kind = kind.parse::<EntryKind>()?;

        let amount = database::codec::to_cents(amount)
            .ok_or_else(|| "Amount is too large".to_string())?;
        if amount <= 0 {
            return Err("Amount must be greater than zero".to_string());
        }

        let date = parse_date_input(&date)
            .ok_or_else(|| format!("Invalid date '{}'", date))?;

        Ok(Self {
            user_id,
            category_id: raw.category_id,
            kind,
            amount,
            description: raw.description.filter(|d| !d.trim().is_empty()),
            date,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn category_id(&self) -> Option<i64> {
        self.category_id
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn date(&self) -> NaiveDateTime {
        self.date
    }
}

/// Accepts an RFC 3339 timestamp (converted to local time), a naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` / `YYYY-MM-DD HH:MM:SS[.fff]`, or a bare
/// `YYYY-MM-DD` meaning local midnight.
pub fn parse_date_input(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}
