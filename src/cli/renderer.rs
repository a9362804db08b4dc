use colored::{control, ColoredString, Colorize};

use planquota::core::entitlements::Entitlements;
use planquota::core::formatter::{
    format_percent, format_price, format_remaining, format_reset_countdown, format_usage,
    format_usage_bar, format_window_range,
};
use planquota::core::models::plan::{Feature, Plan};
use planquota::core::models::usage::{ResourceUsage, UsageSummary, UsageTier, UsageWindow};

const BAR_WIDTH: usize = 12;

/// Render a usage summary as a colored (or plain) string.
///
/// Layout:
/// ```text
///  Free (free)
///   Window    00:00-02:00
///             Resets in 1m
///   Chat      17 / 20 used [██████████░░] 85%
///             3 remaining
///   Projects  1 / 10 used  [█░░░░░░░░░░░] 10%
///             9 remaining
///   Features  Chat search
///   Upgrade for more messages and project requests
/// ```
pub fn render_summary(
    summary: &UsageSummary,
    day_origin_offset_minutes: i32,
    use_color: bool,
) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();
    lines.push(
        format!(" {} ({})", summary.plan.name, summary.plan.plan_type)
            .bold()
            .to_string(),
    );

    render_window_lines(&mut lines, &summary.window, day_origin_offset_minutes);
    render_resource(&mut lines, "Chat", &summary.chat);
    render_resource(&mut lines, "Projects", &summary.projects);

    let enabled: Vec<&str> = summary
        .features
        .iter()
        .filter(|(_, on)| *on)
        .map(|(f, _)| f.display_name())
        .collect();
    let features = if enabled.is_empty() {
        "None".to_string()
    } else {
        enabled.join(", ")
    };
    lines.push(format!("  {}  {}", pad("Features").cyan(), features));

    if summary.has_full_agent_roster {
        lines.push(format!("  {}  All agents", pad("Agents").cyan()));
    }

    if summary.show_upgrade_nudge {
        lines.push(format!(
            "  {}",
            "Upgrade for more messages and project requests".yellow().bold()
        ));
    }

    lines.join("\n")
}

pub fn render_window(
    window: &UsageWindow,
    day_origin_offset_minutes: i32,
    use_color: bool,
) -> String {
    control::set_override(use_color);
    let mut lines = Vec::new();
    render_window_lines(&mut lines, window, day_origin_offset_minutes);
    lines.join("\n")
}

/// One line per plan: name, type, prices, chat allowance.
pub fn render_plan_list<'a>(plans: impl IntoIterator<Item = &'a Plan>, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines = vec![format!(
        " {:<14} {:<11} {:>14} {:>14} {:>10}",
        "Plan", "Type", "Monthly", "Yearly", "Messages"
    )
    .bold()
    .to_string()];
    for plan in plans {
        let mut line = format!(
            " {:<14} {:<11} {:>14} {:>14} {:>10}",
            plan.name,
            plan.plan_type.display_name(),
            format_price(plan.price_monthly),
            format_price(plan.price_yearly),
            plan.limits.messages_per_window.to_string(),
        );
        if !plan.is_active {
            line = format!("{} {}", line, "(retired)".dimmed());
        }
        lines.push(line);
    }
    lines.join("\n")
}

pub fn render_entitlements(plan: &Plan, entitlements: &Entitlements, use_color: bool) -> String {
    control::set_override(use_color);

    let mut lines: Vec<String> = Vec::new();
    lines.push(format!(" {} ({})", plan.name, plan.id).bold().to_string());
    lines.push(format!(
        "  {} {} / month, {} / year",
        pad_wide("Price").cyan(),
        format_price(plan.price_monthly),
        format_price(plan.price_yearly)
    ));
    lines.push(format!("  {} {}", pad_wide("Model tier").cyan(), entitlements.model_tier));

    for (label, limit) in entitlements.limits.entries() {
        let value = if limit.is_unlimited() {
            limit.to_string().green().to_string()
        } else {
            limit.to_string()
        };
        lines.push(format!("  {} {}", pad_wide(label).cyan(), value));
    }

    for feature in Feature::all() {
        let value = if entitlements.allows(*feature) {
            "Yes".green()
        } else {
            "No".dimmed()
        };
        lines.push(format!("  {} {}", pad_wide(feature.display_name()).cyan(), value));
    }

    let agents = if entitlements.has_full_agent_roster {
        "All agents".to_string()
    } else if entitlements.available_agents.is_empty() {
        "None".to_string()
    } else {
        entitlements.available_agents.join(", ")
    };
    lines.push(format!("  {} {}", pad_wide("Agents").cyan(), agents));

    lines.join("\n")
}

fn render_window_lines(
    lines: &mut Vec<String>,
    window: &UsageWindow,
    day_origin_offset_minutes: i32,
) {
    lines.push(format!(
        "  {}  {}",
        pad("Window").cyan(),
        format_window_range(window, day_origin_offset_minutes)
    ));
    lines.push(format!(
        "            {}",
        format_reset_countdown(window.minutes_until_reset).dimmed()
    ));
}

fn render_resource(lines: &mut Vec<String>, label: &str, usage: &ResourceUsage) {
    let usage_str = format!("{:<13}", format_usage(usage));
    if usage.limit.is_unlimited() {
        lines.push(format!("  {}  {}", pad(label).cyan(), usage_str));
    } else {
        let bar = format_usage_bar(usage.display_percentage(), BAR_WIDTH);
        let percent = color_by_tier(usage.tier, &format_percent(usage.percentage));
        lines.push(format!(
            "  {}  {} {} {}",
            pad(label).cyan(),
            usage_str,
            bar.magenta(),
            percent
        ));
    }
    // 12 spaces to align under the value column
    lines.push(format!("            {}", format_remaining(usage.remaining).dimmed()));
}

/// Pad labels to 8 chars for alignment
fn pad(label: &str) -> String {
    format!("{:<8}", label)
}

fn pad_wide(label: &str) -> String {
    format!("{:<26}", label)
}

fn color_by_tier(tier: UsageTier, text: &str) -> ColoredString {
    match tier {
        UsageTier::Normal => text.green(),
        UsageTier::Warning => text.yellow(),
        UsageTier::Danger => text.red(),
    }
}
