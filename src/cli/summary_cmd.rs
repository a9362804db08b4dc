use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use planquota::core::config::AppConfig;
use planquota::core::models::usage::RawCounters;
use planquota::core::summary::SummaryAssembler;

/// Parse `--at`, defaulting to the current instant. This is the only clock read.
pub fn resolve_now(at: Option<&str>) -> Result<DateTime<Utc>> {
    match at {
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid --at timestamp '{}' (expected RFC 3339)", raw))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

pub fn run(
    config: &AppConfig,
    plan_id: &str,
    chat_used: i64,
    projects_used: i64,
    at: Option<&str>,
    opts: &OutputOptions,
) -> Result<()> {
    let clock = config
        .window_clock()
        .context("Invalid window configuration")?;
    let catalog = config
        .plan_catalog()
        .context("Failed to load plan catalog")?;
    let plan = catalog.get(plan_id)?;
    let counters = RawCounters::new(chat_used, projects_used)?;
    let now = resolve_now(at)?;

    let window = clock.current_window(now);
    let assembler = SummaryAssembler::new(config.entitlement_resolver());
    let summary = assembler.assemble(plan, window, counters);

    match opts.format {
        OutputFormat::Text => println!(
            "{}",
            renderer::render_summary(&summary, clock.day_origin_offset_minutes(), opts.use_color)
        ),
        OutputFormat::Json => opts.print_json(&summary)?,
    }
    Ok(())
}

pub fn window(config: &AppConfig, at: Option<&str>, opts: &OutputOptions) -> Result<()> {
    let clock = config
        .window_clock()
        .context("Invalid window configuration")?;
    let window = clock.current_window(resolve_now(at)?);

    match opts.format {
        OutputFormat::Text => println!(
            "{}",
            renderer::render_window(&window, clock.day_origin_offset_minutes(), opts.use_color)
        ),
        OutputFormat::Json => opts.print_json(&window)?,
    }
    Ok(())
}
