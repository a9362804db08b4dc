use crate::core::entitlements::EntitlementResolver;
use crate::core::error::Result;
use crate::core::models::plan::{Plan, PlanType};
use crate::core::models::usage::{
    PlanIdentity, RawCounters, ResourceUsage, UsageSummary, UsageWindow,
};
use crate::core::quota::validate_used;

/// Usage percentage at which free accounts are nudged to upgrade.
/// Independent of the 70/90 display tiers.
pub const UPGRADE_NUDGE_THRESHOLD: f64 = 80.0;

impl RawCounters {
    /// Validate counters read from an external source.
    pub fn new(chat_used: i64, projects_used: i64) -> Result<Self> {
        Ok(Self {
            chat_used: validate_used(chat_used)?,
            projects_used: validate_used(projects_used)?,
        })
    }
}

/// Builds a fresh `UsageSummary` per call. Holds only the agent roster.
#[derive(Debug, Clone, Default)]
pub struct SummaryAssembler {
    resolver: EntitlementResolver,
}

impl SummaryAssembler {
    pub fn new(resolver: EntitlementResolver) -> Self {
        Self { resolver }
    }

    /// `window` must be the window containing the instant `counters` were read at.
    pub fn assemble(
        &self,
        plan: &Plan,
        window: UsageWindow,
        counters: RawCounters,
    ) -> UsageSummary {
        let entitlements = self.resolver.resolve(plan);
        let chat =
            ResourceUsage::evaluate(counters.chat_used, entitlements.limits.messages_per_window);
        let projects = ResourceUsage::evaluate(
            counters.projects_used,
            entitlements.limits.project_requests_per_window,
        );
        let show_upgrade_nudge = upgrade_nudge(plan.plan_type, &chat, &projects);

        UsageSummary {
            plan: PlanIdentity {
                id: plan.id.clone(),
                name: plan.name.clone(),
                plan_type: plan.plan_type,
            },
            window,
            chat,
            projects,
            features: entitlements.features,
            show_upgrade_nudge,
            has_full_agent_roster: entitlements.has_full_agent_roster,
        }
    }
}

fn upgrade_nudge(plan_type: PlanType, chat: &ResourceUsage, projects: &ResourceUsage) -> bool {
    plan_type == PlanType::Free
        && (chat.percentage >= UPGRADE_NUDGE_THRESHOLD
            || projects.percentage >= UPGRADE_NUDGE_THRESHOLD)
}
