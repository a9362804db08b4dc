use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::models::plan::{
    Feature, FeatureSet, Limit, Plan, PlanId, PlanLimits, PlanType,
};

/// Agents offered by the product. A plan granting all of them reads as "all agents".
pub const DEFAULT_AGENT_ROSTER: &[&str] = &["general", "coder", "researcher", "writer", "analyst"];

/// What an account on a plan may do.
///
/// Limits keep their `Unlimited` variant; a disabled feature is `false` in
/// `features` and never expressed through a limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entitlements {
    pub plan_id: PlanId,
    pub plan_type: PlanType,
    pub limits: PlanLimits,
    pub model_tier: Limit,
    pub features: FeatureSet,
    pub available_agents: Vec<String>,
    pub has_full_agent_roster: bool,
}

impl Entitlements {
    pub fn allows(&self, feature: Feature) -> bool {
        self.features.enabled(feature)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementResolver {
    roster: BTreeSet<String>,
}

impl EntitlementResolver {
    pub fn new<I, S>(roster: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roster: roster.into_iter().map(Into::into).collect(),
        }
    }

    pub fn roster(&self) -> impl Iterator<Item = &str> {
        self.roster.iter().map(String::as_str)
    }

    pub fn resolve(&self, plan: &Plan) -> Entitlements {
        let mut agents: Vec<String> = plan.available_agents.clone();
        agents.sort();
        agents.dedup();

        let has_full_agent_roster = !self.roster.is_empty()
            && agents.len() == self.roster.len()
            && agents.iter().all(|a| self.roster.contains(a));

        log::debug!(
            "resolved plan {} ({}): {} agent(s), full roster: {}",
            plan.id,
            plan.plan_type,
            agents.len(),
            has_full_agent_roster
        );

        Entitlements {
            plan_id: plan.id.clone(),
            plan_type: plan.plan_type,
            limits: plan.limits.clone(),
            model_tier: plan.model_tier,
            features: plan.features(),
            available_agents: agents,
            has_full_agent_roster,
        }
    }
}

impl Default for EntitlementResolver {
    fn default() -> Self {
        Self::new(DEFAULT_AGENT_ROSTER.iter().copied())
    }
}
