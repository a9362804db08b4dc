use chrono::{FixedOffset, Offset, Utc};

use crate::core::models::plan::{Limit, Price};
use crate::core::models::usage::{ResourceUsage, UsageWindow};

/// Returns "95%". Over-quota values are shown as-is (e.g. "150%").
pub fn format_percent(percentage: f64) -> String {
    format!("{}%", percentage.max(0.0).round() as u64)
}

/// Returns "95 / 100 used", or "1200 used" when unlimited.
pub fn format_usage(usage: &ResourceUsage) -> String {
    match usage.limit {
        Limit::Limited(limit) => format!("{} / {} used", usage.used, limit),
        Limit::Unlimited => format!("{} used", usage.used),
    }
}

/// Returns "5 remaining" or "Unlimited".
pub fn format_remaining(remaining: Limit) -> String {
    match remaining {
        Limit::Limited(n) => format!("{} remaining", n),
        Limit::Unlimited => "Unlimited".to_string(),
    }
}

/// Returns "Resets in Xh Ym" for a whole-minute countdown.
pub fn format_reset_countdown(minutes_until_reset: u32) -> String {
    let hours = minutes_until_reset / 60;
    let minutes = minutes_until_reset % 60;
    if hours > 0 && minutes > 0 {
        format!("Resets in {}h {}m", hours, minutes)
    } else if hours > 0 {
        format!("Resets in {}h", hours)
    } else {
        format!("Resets in {}m", minutes.max(1))
    }
}

/// Returns "00:00-02:00" in the reference timezone.
pub fn format_window_range(window: &UsageWindow, day_origin_offset_minutes: i32) -> String {
    let offset =
        FixedOffset::east_opt(day_origin_offset_minutes * 60).unwrap_or_else(|| Utc.fix());
    format!(
        "{}-{}",
        window.start.with_timezone(&offset).format("%H:%M"),
        window.end.with_timezone(&offset).format("%H:%M")
    )
}

/// Returns "[████░░░░░░░░]" where █ = used portion. Clamped at 100%.
pub fn format_usage_bar(percentage: f64, width: usize) -> String {
    let percentage = percentage.clamp(0.0, 100.0);
    let used_blocks = ((percentage / 100.0) * width as f64).round() as usize;
    let free_blocks = width.saturating_sub(used_blocks);

    format!("[{}{}]", "█".repeat(used_blocks), "░".repeat(free_blocks))
}

/// Returns "$20.00", "Free" or "Contact sales".
pub fn format_price(price: Price) -> String {
    match price {
        Price::Amount(amount) if amount == 0.0 => "Free".to_string(),
        Price::Amount(amount) => format!("${:.2}", amount),
        Price::ContactSales => "Contact sales".to_string(),
    }
}
