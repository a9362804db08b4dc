use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::models::plan::{FeatureSet, Limit, PlanId, PlanType};

/// Display classification of a usage percentage. Ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageTier {
    Normal,
    Warning,
    Danger,
}

impl std::fmt::Display for UsageTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "Normal"),
            Self::Warning => write!(f, "Warning"),
            Self::Danger => write!(f, "Danger"),
        }
    }
}

/// Half-open interval `[start, end)` during which counters accumulate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Whole minutes until `end`, rounded up
    pub minutes_until_reset: u32,
}

impl UsageWindow {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

/// One countable resource within the current window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUsage {
    pub used: u64,
    pub limit: Limit,
    pub remaining: Limit,
    /// Unclamped; exceeds 100 when over quota
    pub percentage: f64,
    pub tier: UsageTier,
}

impl ResourceUsage {
    /// Percentage for progress bars, capped at 100.
    pub fn display_percentage(&self) -> f64 {
        self.percentage.clamp(0.0, 100.0)
    }

    pub fn is_over_limit(&self) -> bool {
        match self.limit.value() {
            Some(limit) => self.used > limit,
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanIdentity {
    pub id: PlanId,
    pub name: String,
    #[serde(rename = "type")]
    pub plan_type: PlanType,
}

/// Counters read by the caller at a single instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCounters {
    pub chat_used: u64,
    pub projects_used: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageSummary {
    pub plan: PlanIdentity,
    pub window: UsageWindow,
    pub chat: ResourceUsage,
    pub projects: ResourceUsage,
    pub features: FeatureSet,
    pub show_upgrade_nudge: bool,
    pub has_full_agent_roster: bool,
}
