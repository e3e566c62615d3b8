//! Calendar windows for budget periods.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BudgetPeriod {
    Weekly,
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "WEEKLY",
            BudgetPeriod::Monthly => "MONTHLY",
            BudgetPeriod::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetPeriod {
    type Err = PeriodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WEEKLY" => Ok(BudgetPeriod::Weekly),
            "MONTHLY" => Ok(BudgetPeriod::Monthly),
            "YEARLY" => Ok(BudgetPeriod::Yearly),
            other => Err(PeriodError::InvalidPeriod(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PeriodError {
    #[error("Invalid budget period '{0}', expected WEEKLY, MONTHLY or YEARLY")]
    InvalidPeriod(String),
    #[error("Date {0} is outside the supported calendar range")]
    OutOfRange(NaiveDate),
}

/// Inclusive `[start, end]` range of local instants, millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl PeriodWindow {
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Window of `period` containing `reference`.
///
/// * `Weekly`: Sunday 00:00:00.000 on or before the reference date through
///   the following Saturday 23:59:59.999.
/// * `Monthly`: first through last day of the reference month.
/// * `Yearly`: January 1 through December 31 of the reference year.
///
/// Only the date part of `reference` matters.
pub fn compute_window(period: BudgetPeriod, reference: NaiveDateTime) -> Result<PeriodWindow, PeriodError> {
    let date = reference.date();
    let out_of_range = || PeriodError::OutOfRange(date);

    let (first_day, next_first_day) = match period {
        BudgetPeriod::Weekly => {
            let back = Days::new(u64::from(date.weekday().num_days_from_sunday()));
            let first = date.checked_sub_days(back).ok_or_else(out_of_range)?;
            (first, first.checked_add_days(Days::new(7)))
        }
        BudgetPeriod::Monthly => {
            let first = date.with_day(1).ok_or_else(out_of_range)?;
            (first, first.checked_add_months(Months::new(1)))
        }
        BudgetPeriod::Yearly => {
            let first = NaiveDate::from_yo_opt(date.year(), 1).ok_or_else(out_of_range)?;
            (first, NaiveDate::from_yo_opt(date.year() + 1, 1))
        }
    };
    let next_first_day = next_first_day.ok_or_else(out_of_range)?;

    Ok(PeriodWindow {
        start: first_day.and_time(NaiveTime::MIN),
        end: next_first_day.and_time(NaiveTime::MIN) - TimeDelta::milliseconds(1),
    })
}

/// String-typed entry point: rejects unknown period kinds instead of
/// falling back to a default window.
pub fn compute_window_for(kind: &str, reference: NaiveDateTime) -> Result<PeriodWindow, PeriodError> {
    compute_window(kind.parse()?, reference)
}
