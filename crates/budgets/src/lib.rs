//! Budget periods, spending aggregation and alert state.
//!
//! [`period`] and [`status`] are pure: they take every input explicitly
//! (including "now") and never touch storage. [`service`] wires them to the
//! budget table and to an [`ledger::ExpenseLedger`].

pub mod period;
pub mod status;
pub mod ledger;
pub mod error;
pub mod models;
mod repository;
pub mod service;
pub mod handler;

pub use error::BudgetError;
pub use period::{compute_window, compute_window_for, BudgetPeriod, PeriodError, PeriodWindow};
pub use status::{BudgetAlert, BudgetLimits, BudgetStatus};
