use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use planquota::core::config::AppConfig;
use planquota::core::entitlements::Entitlements;
use planquota::core::models::plan::Plan;

#[derive(Serialize)]
struct PlanPayload<'a> {
    plan: &'a Plan,
    entitlements: Entitlements,
}

pub fn list(config: &AppConfig, include_retired: bool, opts: &OutputOptions) -> Result<()> {
    let catalog = config
        .plan_catalog()
        .context("Failed to load plan catalog")?;
    let plans: Vec<&Plan> = if include_retired {
        catalog.plans().iter().collect()
    } else {
        catalog.active().collect()
    };

    match opts.format {
        OutputFormat::Text => {
            if plans.is_empty() {
                eprintln!("No plans available.");
            } else {
                println!("{}", renderer::render_plan_list(plans, opts.use_color));
            }
        }
        OutputFormat::Json => opts.print_json(&plans)?,
    }
    Ok(())
}

pub fn show(config: &AppConfig, plan_id: &str, opts: &OutputOptions) -> Result<()> {
    let catalog = config
        .plan_catalog()
        .context("Failed to load plan catalog")?;
    let plan = catalog.get(plan_id)?;
    let entitlements = config.entitlement_resolver().resolve(plan);

    match opts.format {
        OutputFormat::Text => println!(
            "{}",
            renderer::render_entitlements(plan, &entitlements, opts.use_color)
        ),
        OutputFormat::Json => opts.print_json(&PlanPayload { plan, entitlements })?,
    }
    Ok(())
}
