use serde::Serialize;

use crate::core::error::{QuotaError, Result};
use crate::core::models::plan::Limit;
use crate::core::models::usage::{ResourceUsage, UsageTier};

/// Lower bound (inclusive) of the warning tier.
pub const WARNING_THRESHOLD: f64 = 70.0;
/// Lower bound (inclusive) of the danger tier.
pub const DANGER_THRESHOLD: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuotaEvaluation {
    pub remaining: Limit,
    pub percentage: f64,
    pub tier: UsageTier,
}

/// Evaluate typed usage against a limit. Unlimited is always normal at 0%.
pub fn evaluate(used: u64, limit: Limit) -> QuotaEvaluation {
    let percentage = usage_percentage(used, limit);
    QuotaEvaluation {
        remaining: limit.remaining_after(used),
        percentage,
        tier: classify(percentage),
    }
}

/// Evaluate raw wire integers, rejecting negative usage and limits below `-1`.
pub fn evaluate_raw(used: i64, limit: i64) -> Result<QuotaEvaluation> {
    let used = validate_used(used)?;
    let limit = Limit::try_from(limit)?;
    Ok(evaluate(used, limit))
}

pub fn validate_used(used: i64) -> Result<u64> {
    u64::try_from(used)
        .map_err(|_| QuotaError::invalid_input(format!("usage count {} is negative", used)))
}

/// `used / limit * 100`. A zero limit counts as fully consumed once anything is used.
pub fn usage_percentage(used: u64, limit: Limit) -> f64 {
    match limit {
        Limit::Unlimited => 0.0,
        Limit::Limited(0) => {
            if used > 0 {
                100.0
            } else {
                0.0
            }
        }
        Limit::Limited(n) => used as f64 / n as f64 * 100.0,
    }
}

pub fn classify(percentage: f64) -> UsageTier {
    if percentage >= DANGER_THRESHOLD {
        UsageTier::Danger
    } else if percentage >= WARNING_THRESHOLD {
        UsageTier::Warning
    } else {
        UsageTier::Normal
    }
}

impl ResourceUsage {
    pub fn evaluate(used: u64, limit: Limit) -> Self {
        let evaluation = evaluate(used, limit);
        Self {
            used,
            limit,
            remaining: evaluation.remaining,
            percentage: evaluation.percentage,
            tier: evaluation.tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn near_limit_is_danger() {
        let e = evaluate(95, Limit::Limited(100));
        assert_eq!(e.remaining, Limit::Limited(5));
        assert!((e.percentage - 95.0).abs() < 1e-9);
        assert_eq!(e.tier, UsageTier::Danger);
    }

    #[test]
    fn unlimited_ignores_usage() {
        let e = evaluate(1_000_000, Limit::Unlimited);
        assert_eq!(e.remaining, Limit::Unlimited);
        assert_eq!(e.percentage, 0.0);
        assert_eq!(e.tier, UsageTier::Normal);
    }

    #[test]
    fn unlimited_via_raw_sentinel() {
        for used in [0, 1, 50, i64::MAX] {
            let e = evaluate_raw(used, -1).unwrap();
            assert_eq!(i64::from(e.remaining), -1);
            assert_eq!(e.tier, UsageTier::Normal);
        }
    }

    #[test]
    fn zero_limit_guards_division() {
        let e = evaluate(0, Limit::Limited(0));
        assert_eq!(e.percentage, 0.0);
        assert_eq!(e.tier, UsageTier::Normal);

        let e = evaluate(1, Limit::Limited(0));
        assert_eq!(e.percentage, 100.0);
        assert_eq!(e.tier, UsageTier::Danger);
        assert_eq!(e.remaining, Limit::Limited(0));
    }

    #[test]
    fn tier_boundaries_are_lower_inclusive() {
        assert_eq!(classify(69.999), UsageTier::Normal);
        assert_eq!(classify(70.0), UsageTier::Warning);
        assert_eq!(classify(89.999), UsageTier::Warning);
        assert_eq!(classify(90.0), UsageTier::Danger);
        assert_eq!(classify(0.0), UsageTier::Normal);
    }

    #[test]
    fn over_limit_keeps_true_percentage() {
        let e = evaluate(150, Limit::Limited(100));
        assert!((e.percentage - 150.0).abs() < 1e-9);
        assert_eq!(e.remaining, Limit::Limited(0));
        assert_eq!(e.tier, UsageTier::Danger);

        let usage = ResourceUsage::evaluate(150, Limit::Limited(100));
        assert_eq!(usage.display_percentage(), 100.0);
        assert!(usage.is_over_limit());
    }

    #[test]
    fn remaining_never_exceeds_limit() {
        for limit in [0u64, 1, 7, 100, 1000] {
            for used in [0u64, 1, 5, 99, 100, 101, 5000] {
                let e = evaluate(used, Limit::Limited(limit));
                let remaining = e.remaining.value().unwrap();
                assert_eq!(remaining, limit.saturating_sub(used));
                assert!(remaining <= limit);
            }
        }
    }

    #[test]
    fn tier_is_monotonic_in_usage() {
        for limit in [1u64, 3, 10, 37, 100] {
            let mut previous = UsageTier::Normal;
            for used in 0..=(limit * 2) {
                let tier = evaluate(used, Limit::Limited(limit)).tier;
                assert!(
                    tier >= previous,
                    "limit={} used={} went {:?} -> {:?}",
                    limit,
                    used,
                    previous,
                    tier
                );
                previous = tier;
            }
        }
    }

    #[test]
    fn raw_rejects_negative_used() {
        assert!(matches!(evaluate_raw(-1, 10), Err(QuotaError::InvalidInput(_))));
    }

    #[test]
    fn raw_rejects_limit_below_sentinel() {
        assert!(matches!(evaluate_raw(1, -2), Err(QuotaError::InvalidInput(_))));
    }
}
