//! Column encodings shared by the repositories.
//!
//! Money is stored as integer minor units (cents) and instants as fixed-width
//! local text, so that `ORDER BY` and range comparisons on the raw column
//! agree with chronological order.

use crate::RepositoryError;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

pub const INSTANT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub fn encode_instant(instant: NaiveDateTime) -> String {
    instant.format(INSTANT_FORMAT).to_string()
}

pub fn decode_instant(raw: &str) -> Result<NaiveDateTime, RepositoryError> {
    NaiveDateTime::parse_from_str(raw, INSTANT_FORMAT)
        .map_err(|e| RepositoryError::Decode(format!("instant '{}': {}", raw, e)))
}

/// Converts an amount to cents, rounding half-to-even. `None` on overflow.
pub fn to_cents(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round()
        .to_i64()
}

pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2).normalize()
}

/// Like [`from_cents`] for totals that may exceed `i64`. `None` past
/// `Decimal`'s 96-bit range.
pub fn from_wide_cents(cents: i128) -> Option<Decimal> {
    Decimal::try_from_i128_with_scale(cents, 2).ok().map(|d| d.normalize())
}

pub fn decode_decimal(raw: &str) -> Result<Decimal, RepositoryError> {
    raw.parse::<Decimal>()
        .map_err(|e| RepositoryError::Decode(format!("decimal '{}': {}", raw, e)))
}
