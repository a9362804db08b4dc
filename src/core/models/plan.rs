use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::QuotaError;

/// Wire value meaning "no limit". Only ever seen at the serde boundary.
pub const UNLIMITED_SENTINEL: i64 = -1;

/// A numeric plan limit. Serialized as an integer where `-1` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Limit {
    Limited(u64),
    Unlimited,
}

impl Limit {
    pub fn is_unlimited(&self) -> bool {
        matches!(self, Self::Unlimited)
    }

    /// The finite cap, or `None` when unlimited.
    pub fn value(&self) -> Option<u64> {
        match self {
            Self::Limited(n) => Some(*n),
            Self::Unlimited => None,
        }
    }

    /// Capacity left after `used`; never negative, unlimited stays unlimited.
    pub fn remaining_after(&self, used: u64) -> Limit {
        match self {
            Self::Limited(n) => Self::Limited(n.saturating_sub(used)),
            Self::Unlimited => Self::Unlimited,
        }
    }
}

impl TryFrom<i64> for Limit {
    type Error = QuotaError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            UNLIMITED_SENTINEL => Ok(Self::Unlimited),
            n if n >= 0 => Ok(Self::Limited(n as u64)),
            n => Err(QuotaError::invalid_input(format!(
                "limit {} is below the unlimited sentinel (-1)",
                n
            ))),
        }
    }
}

impl From<Limit> for i64 {
    fn from(limit: Limit) -> Self {
        match limit {
            Limit::Limited(n) => i64::try_from(n).unwrap_or(i64::MAX),
            Limit::Unlimited => UNLIMITED_SENTINEL,
        }
    }
}

impl std::fmt::Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Limited(n) => write!(f, "{}", n),
            Self::Unlimited => write!(f, "Unlimited"),
        }
    }
}

/// A list price. `null` on the wire means "contact sales", which is not the same as free.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Option<f64>", into = "Option<f64>")]
pub enum Price {
    Amount(f64),
    ContactSales,
}

impl TryFrom<Option<f64>> for Price {
    type Error = QuotaError;

    fn try_from(raw: Option<f64>) -> Result<Self, Self::Error> {
        match raw {
            None => Ok(Self::ContactSales),
            Some(amount) if amount.is_finite() && amount >= 0.0 => Ok(Self::Amount(amount)),
            Some(amount) => Err(QuotaError::invalid_input(format!(
                "price {} must be a non-negative number",
                amount
            ))),
        }
    }
}

impl From<Price> for Option<f64> {
    fn from(price: Price) -> Self {
        match price {
            Price::Amount(amount) => Some(amount),
            Price::ContactSales => None,
        }
    }
}

/// Opaque plan identifier. Listings use either numeric or string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanId {
    Number(i64),
    Text(String),
}

impl PlanId {
    /// Ids compare by their textual form, so `"3"` finds plan `3`.
    pub fn matches(&self, id: &str) -> bool {
        match self {
            Self::Number(n) => n.to_string() == id,
            Self::Text(s) => s.eq_ignore_ascii_case(id),
        }
    }
}

impl std::fmt::Display for PlanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum PlanType {
    Free,
    Pro,
    Team,
    Enterprise,
}

impl PlanType {
    pub fn id(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Team => "team",
            Self::Enterprise => "enterprise",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Free => "Free",
            Self::Pro => "Pro",
            Self::Team => "Team",
            Self::Enterprise => "Enterprise",
        }
    }
}

impl std::str::FromStr for PlanType {
    type Err = QuotaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "team" => Ok(Self::Team),
            "enterprise" => Ok(Self::Enterprise),
            other => Err(QuotaError::invalid_input(format!(
                "unknown plan type '{}' (must be free|pro|team|enterprise)",
                other
            ))),
        }
    }
}

impl TryFrom<String> for PlanType {
    type Error = QuotaError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Named boolean capabilities a plan may grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    ThinkingMode,
    Download,
    GitIntegration,
    ApiAccess,
    ChatSearch,
}

impl Feature {
    pub fn all() -> &'static [Feature] {
        &[
            Feature::ThinkingMode,
            Feature::Download,
            Feature::GitIntegration,
            Feature::ApiAccess,
            Feature::ChatSearch,
        ]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::ThinkingMode => "Thinking mode",
            Self::Download => "Download",
            Self::GitIntegration => "Git integration",
            Self::ApiAccess => "API access",
            Self::ChatSearch => "Chat search",
        }
    }
}

/// Feature flags keyed by feature. Serializes as `{ "thinking_mode": true, ... }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSet(BTreeMap<Feature, bool>);

impl FeatureSet {
    pub fn enabled(&self, feature: Feature) -> bool {
        self.0.get(&feature).copied().unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, bool)> + '_ {
        self.0.iter().map(|(f, on)| (*f, *on))
    }
}

impl FromIterator<(Feature, bool)> for FeatureSet {
    fn from_iter<I: IntoIterator<Item = (Feature, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub messages_per_window: Limit,
    pub max_conversations: Limit,
    pub context_window: Limit,
    pub max_active_projects: Limit,
    pub max_archived_projects: Limit,
    pub max_files_per_project: Limit,
    pub project_requests_per_window: Limit,
    pub max_concurrent_agents: Limit,
    pub storage_limit_mb: Limit,
    pub max_file_size_kb: Limit,
    pub retention_days: Limit,
    pub max_output_tokens: Limit,
    pub requests_per_minute: Limit,
    pub max_concurrent_connections: Limit,
    pub queue_priority: Limit,
}

impl PlanLimits {
    /// Every limit with its display label, in catalog order.
    pub fn entries(&self) -> [(&'static str, Limit); 15] {
        [
            ("Messages / window", self.messages_per_window),
            ("Conversations", self.max_conversations),
            ("Context window", self.context_window),
            ("Active projects", self.max_active_projects),
            ("Archived projects", self.max_archived_projects),
            ("Files / project", self.max_files_per_project),
            ("Project requests / window", self.project_requests_per_window),
            ("Concurrent agents", self.max_concurrent_agents),
            ("Storage (MB)", self.storage_limit_mb),
            ("Max file size (KB)", self.max_file_size_kb),
            ("Retention (days)", self.retention_days),
            ("Max output tokens", self.max_output_tokens),
            ("Requests / minute", self.requests_per_minute),
            ("Concurrent connections", self.max_concurrent_connections),
            ("Queue priority", self.queue_priority),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    pub plan_type: PlanType,
    pub price_monthly: Price,
    pub price_yearly: Price,
    #[serde(flatten)]
    pub limits: PlanLimits,
    /// Highest model tier the plan may use; `-1` on the wire grants every tier.
    #[serde(default = "default_model_tier")]
    pub model_tier: Limit,
    #[serde(default)]
    pub available_agents: Vec<String>,
    #[serde(default)]
    pub has_thinking_mode: bool,
    #[serde(default)]
    pub has_download: bool,
    #[serde(default)]
    pub has_git_integration: bool,
    #[serde(default)]
    pub has_api_access: bool,
    #[serde(default)]
    pub has_chat_search: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_model_tier() -> Limit {
    Limit::Limited(0)
}

fn default_true() -> bool {
    true
}

impl Plan {
    pub fn has_feature(&self, feature: Feature) -> bool {
        match feature {
            Feature::ThinkingMode => self.has_thinking_mode,
            Feature::Download => self.has_download,
            Feature::GitIntegration => self.has_git_integration,
            Feature::ApiAccess => self.has_api_access,
            Feature::ChatSearch => self.has_chat_search,
        }
    }

    pub fn features(&self) -> FeatureSet {
        Feature::all()
            .iter()
            .map(|f| (*f, self.has_feature(*f)))
            .collect()
    }
}
