use crate::error::BudgetError;
use crate::period::{compute_window, BudgetPeriod, PeriodWindow};
use crate::status::{default_alert_threshold, BudgetAlert, BudgetLimits, BudgetStatus};
use categories::models::Category;
use chrono::NaiveDateTime;
use common::UserId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Budget {
    pub id: i64,
    pub user_id: UserId,
    pub category_id: i64,
    pub period: BudgetPeriod,
    #[serde(flatten)]
    pub limits: BudgetLimits,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl Budget {
    /// The stored window. It is fixed at creation and never recomputed.
    pub fn window(&self) -> PeriodWindow {
        PeriodWindow {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

/// A budget as returned from create and update, with its category inlined.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetWithCategory {
    #[serde(flatten)]
    pub budget: Budget,
    pub category: Option<Category>,
}

/// A budget as listed to its owner, with live spending figures.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetWithStatus {
    #[serde(flatten)]
    pub budget: Budget,
    pub category: Option<Category>,
    #[serde(flatten)]
    pub status: BudgetStatus,
    pub alert: BudgetAlert,
}

// Fields are optional so a missing one is reported as a validation error
// rather than a deserialization rejection.
#[derive(Debug, Default, Deserialize)]
pub struct RawCreateBudgetRequest {
    pub amount: Option<Decimal>,
    pub period: Option<String>,
    pub category_id: Option<i64>,
    pub alert_threshold: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawUpdateBudgetRequest {
    pub amount: Option<Decimal>,
    pub alert_threshold: Option<Decimal>,
}

/// Rounds to cents and checks the result still fits the storage column.
pub(crate) fn normalize_amount(amount: Decimal) -> Result<Decimal, BudgetError> {
    let rounded = amount.round_dp(2);
    database::codec::to_cents(rounded)
        .ok_or_else(|| BudgetError::Validation("Amount is too large".to_string()))?;
    Ok(rounded)
}

#[derive(Debug)]
pub struct CreateBudgetRequest {
    user_id: UserId,
    category_id: i64,
    period: BudgetPeriod,
    limits: BudgetLimits,
    window: PeriodWindow,
}

impl CreateBudgetRequest {
    /// Validates the raw payload and fixes the budget window from `now`.
    pub fn new(user_id: UserId, raw: RawCreateBudgetRequest, now: NaiveDateTime) -> Result<Self, BudgetError> {
        let (Some(amount), Some(period), Some(category_id)) = (raw.amount, raw.period, raw.category_id) else {
            return Err(BudgetError::Validation(
                "amount, period and category_id are required".to_string(),
            ));
        };

        let period = period.parse::<BudgetPeriod>()?;
        let limits = BudgetLimits::new(
            normalize_amount(amount)?,
            raw.alert_threshold.unwrap_or_else(default_alert_threshold),
        )?;
        let window = compute_window(period, now)?;

        Ok(Self {
            user_id,
            category_id,
            period,
            limits,
            window,
        })
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn category_id(&self) -> i64 {
        self.category_id
    }

    pub fn period(&self) -> BudgetPeriod {
        self.period
    }

    pub fn limits(&self) -> &BudgetLimits {
        &self.limits
    }

    pub fn window(&self) -> &PeriodWindow {
        &self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn feb_10() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 2, 10).unwrap().and_hms_opt(15, 0, 0).unwrap()
    }

    fn raw(amount: Option<Decimal>, period: Option<&str>, threshold: Option<Decimal>) -> RawCreateBudgetRequest {
        RawCreateBudgetRequest {
            amount,
            period: period.map(str::to_string),
            category_id: Some(7),
            alert_threshold: threshold,
        }
    }

    #[test]
    fn test_create_request_computes_window_and_defaults() {
        let req = CreateBudgetRequest::new(1, raw(Some(dec!(1000000)), Some("MONTHLY"), None), feb_10()).unwrap();
        assert_eq!(req.period(), BudgetPeriod::Monthly);
        assert_eq!(req.limits().alert_threshold(), dec!(0.8));
        assert_eq!(req.window().start.to_string(), "2024-02-01 00:00:00");
        assert_eq!(req.window().end.to_string(), "2024-02-29 23:59:59.999");
    }

    #[test]
    fn test_create_request_requires_fields() {
        let mut missing_category = raw(Some(dec!(10)), Some("WEEKLY"), None);
        missing_category.category_id = None;
        assert!(matches!(
            CreateBudgetRequest::new(1, missing_category, feb_10()),
            Err(BudgetError::Validation(_))
        ));
        assert!(matches!(
            CreateBudgetRequest::new(1, raw(None, Some("WEEKLY"), None), feb_10()),
            Err(BudgetError::Validation(_))
        ));
        assert!(matches!(
            CreateBudgetRequest::new(1, raw(Some(dec!(10)), None, None), feb_10()),
            Err(BudgetError::Validation(_))
        ));
    }

    #[test]
    fn test_create_request_rejects_unknown_period() {
        assert!(matches!(
            CreateBudgetRequest::new(1, raw(Some(dec!(10)), Some("FORTNIGHTLY"), None), feb_10()),
            Err(BudgetError::InvalidPeriod(p)) if p == "FORTNIGHTLY"
        ));
    }

    #[test]
    fn test_create_request_rejects_bad_amounts_and_thresholds() {
        for amount in [dec!(0), dec!(-50), dec!(0.004)] {
            assert!(matches!(
                CreateBudgetRequest::new(1, raw(Some(amount), Some("YEARLY"), None), feb_10()),
                Err(BudgetError::Validation(_))
            ));
        }
        for threshold in [dec!(0), dec!(-0.1), dec!(1.5)] {
            assert!(matches!(
                CreateBudgetRequest::new(1, raw(Some(dec!(10)), Some("YEARLY"), Some(threshold)), feb_10()),
                Err(BudgetError::Validation(_))
            ));
        }
    }

    #[test]
    fn test_amount_is_rounded_to_cents() {
        let req = CreateBudgetRequest::new(1, raw(Some(dec!(10.005)), Some("YEARLY"), None), feb_10()).unwrap();
        assert_eq!(req.limits().amount(), dec!(10.00));
        assert!(normalize_amount(Decimal::MAX).is_err());
    }
}
