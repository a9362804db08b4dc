use std::path::Path;

use crate::core::error::{QuotaError, Result};
use crate::core::models::plan::{Limit, Plan, PlanId, PlanLimits, PlanType, Price};

/// Read-only set of plans. Entries are never mutated once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl PlanCatalog {
    pub fn new(plans: Vec<Plan>) -> Self {
        Self { plans }
    }

    /// Parse a plan listing: either a bare array or a page wrapper with an `items` array.
    pub fn from_json(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let items = match value {
            serde_json::Value::Array(items) => serde_json::Value::Array(items),
            serde_json::Value::Object(mut page) => page.remove("items").ok_or_else(|| {
                QuotaError::invalid_input("plan listing object has no `items` array")
            })?,
            _ => {
                return Err(QuotaError::invalid_input(
                    "plan listing must be an array or a page with `items`",
                ))
            }
        };
        let plans: Vec<Plan> = serde_json::from_value(items)
            .map_err(|e| QuotaError::invalid_input(format!("invalid plan entry: {}", e)))?;
        Ok(Self::new(plans))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&content)?;
        log::debug!(
            "loaded {} plan(s) from {}",
            catalog.plans.len(),
            path.display()
        );
        Ok(catalog)
    }

    pub fn plans(&self) -> &[Plan] {
        &self.plans
    }

    /// Plans shown in listings; retired plans are hidden.
    pub fn active(&self) -> impl Iterator<Item = &Plan> {
        self.plans.iter().filter(|p| p.is_active)
    }

    /// Look up any plan by id, retired ones included (accounts may still be on them).
    pub fn get(&self, id: &str) -> Result<&Plan> {
        let plan = self
            .plans
            .iter()
            .find(|p| p.id.matches(id))
            .ok_or_else(|| QuotaError::invalid_input(format!("unknown plan id '{}'", id)))?;
        if !plan.is_active {
            log::warn!("plan '{}' is retired and hidden from listings", plan.id);
        }
        Ok(plan)
    }

    /// The stock Free / Pro / Team / Enterprise lineup plus one retired plan.
    pub fn builtin() -> Self {
        Self::new(vec![
            Plan {
                id: PlanId::Text("free".into()),
                name: "Free".into(),
                plan_type: PlanType::Free,
                price_monthly: Price::Amount(0.0),
                price_yearly: Price::Amount(0.0),
                limits: limits([20, 50, 32_000, 1, 3, 10, 10, 1, 100, 1_024, 30, 2_048, 10, 1, 1]),
                model_tier: Limit::Limited(1),
                available_agents: vec!["general".into()],
                has_thinking_mode: false,
                has_download: false,
                has_git_integration: false,
                has_api_access: false,
                has_chat_search: true,
                is_active: true,
            },
            Plan {
                id: PlanId::Text("pro".into()),
                name: "Pro".into(),
                plan_type: PlanType::Pro,
                price_monthly: Price::Amount(20.0),
                price_yearly: Price::Amount(200.0),
                limits: limits([
                    100, -1, 200_000, 10, 50, 100, 50, 3, 5_120, 10_240, 180, 8_192, 60, 5, 2,
                ]),
                model_tier: Limit::Limited(2),
                available_agents: vec!["general".into(), "coder".into(), "researcher".into()],
                has_thinking_mode: true,
                has_download: true,
                has_git_integration: false,
                has_api_access: false,
                has_chat_search: true,
                is_active: true,
            },
            Plan {
                id: PlanId::Text("team".into()),
                name: "Team".into(),
                plan_type: PlanType::Team,
                price_monthly: Price::Amount(30.0),
                price_yearly: Price::Amount(300.0),
                limits: limits([
                    300, -1, 200_000, 50, -1, 500, 200, 10, 51_200, 51_200, 365, 16_384, 300, 20,
                    3,
                ]),
                model_tier: Limit::Limited(3),
                available_agents: full_roster(),
                has_thinking_mode: true,
                has_download: true,
                has_git_integration: true,
                has_api_access: true,
                has_chat_search: true,
                is_active: true,
            },
            Plan {
                id: PlanId::Text("enterprise".into()),
                name: "Enterprise".into(),
                plan_type: PlanType::Enterprise,
                price_monthly: Price::ContactSales,
                price_yearly: Price::ContactSales,
                limits: limits([
                    -1, -1, 1_000_000, -1, -1, -1, -1, -1, -1, 512_000, -1, 32_768, -1, -1, -1,
                ]),
                model_tier: Limit::Limited(4),
                available_agents: full_roster(),
                has_thinking_mode: true,
                has_download: true,
                has_git_integration: true,
                has_api_access: true,
                has_chat_search: true,
                is_active: true,
            },
            Plan {
                id: PlanId::Text("pro-2023".into()),
                name: "Pro (2023)".into(),
                plan_type: PlanType::Pro,
                price_monthly: Price::Amount(15.0),
                price_yearly: Price::Amount(150.0),
                limits: limits([
                    60, 500, 100_000, 5, 20, 50, 25, 2, 2_048, 10_240, 90, 4_096, 30, 3, 2,
                ]),
                model_tier: Limit::Limited(2),
                available_agents: vec!["general".into(), "coder".into()],
                has_thinking_mode: false,
                has_download: true,
                has_git_integration: false,
                has_api_access: false,
                has_chat_search: true,
                is_active: false,
            },
        ])
    }
}

fn full_roster() -> Vec<String> {
    crate::core::entitlements::DEFAULT_AGENT_ROSTER
        .iter()
        .map(|a| a.to_string())
        .collect()
}

fn limit(raw: i64) -> Limit {
    if raw < 0 {
        Limit::Unlimited
    } else {
        Limit::Limited(raw as u64)
    }
}

/// Limits in `PlanLimits` field order; negative means unlimited.
fn limits(raw: [i64; 15]) -> PlanLimits {
    PlanLimits {
        messages_per_window: limit(raw[0]),
        max_conversations: limit(raw[1]),
        context_window: limit(raw[2]),
        max_active_projects: limit(raw[3]),
        max_archived_projects: limit(raw[4]),
        max_files_per_project: limit(raw[5]),
        project_requests_per_window: limit(raw[6]),
        max_concurrent_agents: limit(raw[7]),
        storage_limit_mb: limit(raw[8]),
        max_file_size_kb: limit(raw[9]),
        retention_days: limit(raw[10]),
        max_output_tokens: limit(raw[11]),
        requests_per_minute: limit(raw[12]),
        max_concurrent_connections: limit(raw[13]),
        queue_priority: limit(raw[14]),
    }
}
