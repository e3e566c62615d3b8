//! Spending status of a budget: how much is spent, what is left, and whether
//! an alert should be raised.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub fn default_alert_threshold() -> Decimal {
    Decimal::new(8, 1)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LimitsError {
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,
    #[error("Alert threshold must be greater than 0 and at most 1, got {0}")]
    ThresholdOutOfRange(Decimal),
}

/// The mutable part of a budget: its ceiling and alert fraction.
///
/// Construction guarantees `amount > 0` and `0 < alert_threshold <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetLimits {
    amount: Decimal,
    alert_threshold: Decimal,
}

impl BudgetLimits {
    pub fn new(amount: Decimal, alert_threshold: Decimal) -> Result<Self, LimitsError> {
        if amount <= Decimal::ZERO {
            return Err(LimitsError::NonPositiveAmount);
        }
        if alert_threshold <= Decimal::ZERO || alert_threshold > Decimal::ONE {
            return Err(LimitsError::ThresholdOutOfRange(alert_threshold));
        }
        Ok(Self { amount, alert_threshold })
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn alert_threshold(&self) -> Decimal {
        self.alert_threshold
    }

    /// Replaces whichever fields are given, re-validating the result.
    pub fn with_changes(&self, amount: Option<Decimal>, alert_threshold: Option<Decimal>) -> Result<Self, LimitsError> {
        Self::new(
            amount.unwrap_or(self.amount),
            alert_threshold.unwrap_or(self.alert_threshold),
        )
    }
}

/// Single alert level for display. Over budget outranks near limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BudgetAlert {
    OnTrack,
    NearLimit,
    OverBudget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BudgetStatus {
    pub spent: Decimal,
    /// `amount - spent`; negative once over budget.
    pub remaining: Decimal,
    /// `spent / amount * 100`, unrounded.
    pub percentage: Decimal,
    /// Strictly `spent > amount`: spending exactly the amount is not over.
    pub is_over_budget: bool,
    /// `percentage >= alert_threshold * 100`. Stays true once over budget;
    /// see [`BudgetStatus::alert`] for precedence.
    pub is_near_limit: bool,
}

impl BudgetStatus {
    /// Derives the status from the budget's limits and the total already spent
    /// in its window.
    pub fn compute(limits: &BudgetLimits, spent: Decimal) -> Self {
        let amount = limits.amount();
        // multiply first so thresholds like 0.8 compare exactly
        let percentage = spent * Decimal::ONE_HUNDRED / amount;

        Self {
            spent,
            remaining: amount - spent,
            percentage,
            is_over_budget: spent > amount,
            is_near_limit: percentage >= limits.alert_threshold() * Decimal::ONE_HUNDRED,
        }
    }

    pub fn alert(&self) -> BudgetAlert {
        if self.is_over_budget {
            BudgetAlert::OverBudget
        } else if self.is_near_limit {
            BudgetAlert::NearLimit
        } else {
            BudgetAlert::OnTrack
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn limits(amount: Decimal, threshold: Decimal) -> BudgetLimits {
        BudgetLimits::new(amount, threshold).unwrap()
    }

    #[test]
    fn test_under_threshold() {
        let s = BudgetStatus::compute(&limits(dec!(1000000), dec!(0.8)), dec!(750000));
        assert_eq!(s.percentage, dec!(75));
        assert_eq!(s.remaining, dec!(250000));
        assert!(!s.is_near_limit);
        assert!(!s.is_over_budget);
        assert_eq!(s.alert(), BudgetAlert::OnTrack);
    }

    #[test]
    fn test_near_limit() {
        let s = BudgetStatus::compute(&limits(dec!(1000000), dec!(0.8)), dec!(850000));
        assert_eq!(s.percentage, dec!(85));
        assert!(s.is_near_limit);
        assert!(!s.is_over_budget);
        assert_eq!(s.alert(), BudgetAlert::NearLimit);
    }

    #[test]
    fn test_over_budget() {
        let s = BudgetStatus::compute(&limits(dec!(1000000), dec!(0.8)), dec!(1200000));
        assert_eq!(s.remaining, dec!(-200000));
        assert_eq!(s.percentage, dec!(120));
        assert!(s.is_over_budget);
        assert!(s.is_near_limit);
        assert_eq!(s.alert(), BudgetAlert::OverBudget);
    }

    #[test]
    fn test_spent_equal_to_amount_is_not_over() {
        let s = BudgetStatus::compute(&limits(dec!(500), dec!(0.8)), dec!(500));
        assert!(!s.is_over_budget);
        assert_eq!(s.percentage, dec!(100));
        assert_eq!(s.remaining, dec!(0));
        assert!(s.is_near_limit);

        // with threshold 1 the near-limit flag fires exactly at the amount
        let s = BudgetStatus::compute(&limits(dec!(500), dec!(1)), dec!(500));
        assert!(s.is_near_limit);
        assert!(!s.is_over_budget);
    }

    #[test]
    fn test_spent_equal_to_threshold_is_near_limit() {
        for (amount, threshold) in [
            (dec!(1000000), dec!(0.8)),
            (dec!(3), dec!(0.8)),
            (dec!(7), dec!(0.3)),
            (dec!(123.45), dec!(0.65)),
            (dec!(99.99), dec!(0.1)),
        ] {
            let s = BudgetStatus::compute(&limits(amount, threshold), amount * threshold);
            assert!(s.is_near_limit, "amount {} threshold {}", amount, threshold);
            assert!(!s.is_over_budget);
        }
    }

    #[test]
    fn test_just_below_threshold_is_not_near_limit() {
        let s = BudgetStatus::compute(&limits(dec!(100), dec!(0.8)), dec!(79.99));
        assert!(!s.is_near_limit);
    }

    #[test]
    fn test_nothing_spent() {
        let s = BudgetStatus::compute(&limits(dec!(250), dec!(0.8)), Decimal::ZERO);
        assert_eq!(s.spent, dec!(0));
        assert_eq!(s.remaining, dec!(250));
        assert_eq!(s.percentage, dec!(0));
        assert_eq!(s.alert(), BudgetAlert::OnTrack);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let l = limits(dec!(1234.56), dec!(0.75));
        assert_eq!(BudgetStatus::compute(&l, dec!(1000)), BudgetStatus::compute(&l, dec!(1000)));
    }

    #[test]
    fn test_monotonic_in_spent() {
        let l = limits(dec!(1000000), dec!(0.8));
        let mut previous: Option<BudgetStatus> = None;
        let mut spent = Decimal::ZERO;
        while spent <= dec!(2000000) {
            let s = BudgetStatus::compute(&l, spent);
            if let Some(p) = previous {
                assert!(s.percentage >= p.percentage);
                assert!(!(p.is_over_budget && !s.is_over_budget));
                assert!(!(p.is_near_limit && !s.is_near_limit));
            }
            previous = Some(s);
            spent += dec!(33333.33);
        }
    }

    #[test]
    fn test_limits_validation() {
        assert_eq!(BudgetLimits::new(dec!(0), dec!(0.8)), Err(LimitsError::NonPositiveAmount));
        assert_eq!(BudgetLimits::new(dec!(-1), dec!(0.8)), Err(LimitsError::NonPositiveAmount));
        assert!(matches!(BudgetLimits::new(dec!(10), dec!(0)), Err(LimitsError::ThresholdOutOfRange(_))));
        assert!(matches!(BudgetLimits::new(dec!(10), dec!(1.01)), Err(LimitsError::ThresholdOutOfRange(_))));
        assert!(BudgetLimits::new(dec!(10), dec!(1)).is_ok());
        assert_eq!(default_alert_threshold(), dec!(0.8));
    }

    #[test]
    fn test_with_changes_keeps_unset_fields() {
        let l = limits(dec!(100), dec!(0.8));
        let changed = l.with_changes(Some(dec!(250)), None).unwrap();
        assert_eq!(changed.amount(), dec!(250));
        assert_eq!(changed.alert_threshold(), dec!(0.8));
        assert!(l.with_changes(None, Some(dec!(2))).is_err());
    }
}
