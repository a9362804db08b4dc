use chrono::{DateTime, Duration, Utc};

use crate::core::error::{QuotaError, Result};
use crate::core::models::usage::UsageWindow;

pub const MINUTES_PER_DAY: u32 = 1440;
pub const DEFAULT_WINDOW_MINUTES: u32 = 120;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MINUTE: i64 = 60 * NANOS_PER_SECOND;

/// Day-aligned fixed windows in a reference timezone given as a UTC offset.
///
/// Built once from configuration; an invalid policy is rejected here rather
/// than on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowClock {
    duration_minutes: u32,
    day_origin_offset_minutes: i32,
}

impl WindowClock {
    /// `day_origin_offset_minutes` is the reference timezone's offset east of UTC.
    pub fn new(duration_minutes: u32, day_origin_offset_minutes: i32) -> Result<Self> {
        if duration_minutes == 0 || MINUTES_PER_DAY % duration_minutes != 0 {
            return Err(QuotaError::configuration(format!(
                "window duration {}m must evenly divide {} minutes",
                duration_minutes, MINUTES_PER_DAY
            )));
        }
        if day_origin_offset_minutes.unsigned_abs() >= MINUTES_PER_DAY {
            return Err(QuotaError::configuration(format!(
                "day origin offset {}m must be within ±24h",
                day_origin_offset_minutes
            )));
        }
        Ok(Self {
            duration_minutes,
            day_origin_offset_minutes,
        })
    }

    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    pub fn day_origin_offset_minutes(&self) -> i32 {
        self.day_origin_offset_minutes
    }

    /// The window containing `now`. Start is inclusive, end exclusive.
    pub fn current_window(&self, now: DateTime<Utc>) -> UsageWindow {
        let window_secs = i64::from(self.duration_minutes) * 60;
        let offset_secs = i64::from(self.day_origin_offset_minutes) * 60;

        let local_secs = now.timestamp() + offset_secs;
        let secs_into_day = local_secs.rem_euclid(i64::from(MINUTES_PER_DAY) * 60);
        let secs_into_window = secs_into_day % window_secs;

        // Leap-second instants report >= 1e9 nanos; fold them into the same second.
        let subsec_nanos = i64::from(now.timestamp_subsec_nanos()).min(NANOS_PER_SECOND - 1);
        let start_secs = now.timestamp() - secs_into_window;
        let start = DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(start_secs);
        let end = start + Duration::minutes(i64::from(self.duration_minutes));

        let remaining_nanos = (window_secs - secs_into_window) * NANOS_PER_SECOND - subsec_nanos;
        let minutes_until_reset = (remaining_nanos + NANOS_PER_MINUTE - 1) / NANOS_PER_MINUTE;

        log::debug!(
            "window for {}: [{}, {}) resets in {}m",
            now,
            start,
            end,
            minutes_until_reset
        );

        UsageWindow {
            start,
            end,
            minutes_until_reset: minutes_until_reset as u32,
        }
    }
}

impl Default for WindowClock {
    fn default() -> Self {
        Self {
            duration_minutes: DEFAULT_WINDOW_MINUTES,
            day_origin_offset_minutes: 0,
        }
    }
}

/// One-shot form of [`WindowClock::current_window`] that validates the policy first.
pub fn current_window(
    now: DateTime<Utc>,
    duration_minutes: u32,
    day_origin_offset_minutes: i32,
) -> Result<UsageWindow> {
    Ok(WindowClock::new(duration_minutes, day_origin_offset_minutes)?.current_window(now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 14, h, m, s).unwrap()
    }

    #[test]
    fn one_minute_before_boundary() {
        let window = current_window(at(1, 59, 0), 120, 0).unwrap();
        assert_eq!(window.start, at(0, 0, 0));
        assert_eq!(window.end, at(2, 0, 0));
        assert_eq!(window.minutes_until_reset, 1);
    }

    #[test]
    fn boundary_instant_starts_new_window() {
        let window = current_window(at(2, 0, 0), 120, 0).unwrap();
        assert_eq!(window.start, at(2, 0, 0));
        assert_eq!(window.end, at(4, 0, 0));
        assert_eq!(window.minutes_until_reset, 120);
    }

    #[test]
    fn partial_minute_rounds_up() {
        let now = at(3, 15, 30);
        let window = current_window(now, 120, 0).unwrap();
        assert_eq!(window.start, at(2, 0, 0));
        // 44m30s left
        assert_eq!(window.minutes_until_reset, 45);
    }

    #[test]
    fn sub_second_before_boundary_still_one_minute() {
        let now = at(3, 59, 59) + Duration::milliseconds(999);
        let window = current_window(now, 120, 0).unwrap();
        assert_eq!(window.end, at(4, 0, 0));
        assert_eq!(window.minutes_until_reset, 1);
        assert!(window.contains(now));
    }

    #[test]
    fn leap_second_stays_in_aligned_window() {
        let now = NaiveDate::from_ymd_opt(2016, 12, 31)
            .unwrap()
            .and_hms_milli_opt(23, 59, 59, 1_500)
            .unwrap()
            .and_utc();
        let window = current_window(now, 120, 0).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2016, 12, 31, 22, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2017, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(window.minutes_until_reset, 1);
        assert!(window.contains(now));
    }

    #[test]
    fn last_window_of_day_ends_at_midnight() {
        let window = current_window(at(23, 30, 0), 120, 0).unwrap();
        assert_eq!(window.start, at(22, 0, 0));
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn offset_aligns_to_reference_midnight() {
        // UTC+05:30: local 01:59 is 20:29 UTC the previous day
        let now = Utc.with_ymd_and_hms(2025, 3, 13, 20, 29, 0).unwrap();
        let window = current_window(now, 120, 330).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(2025, 3, 13, 18, 30, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2025, 3, 13, 20, 30, 0).unwrap());
        assert_eq!(window.minutes_until_reset, 1);
    }

    #[test]
    fn negative_offset_aligns_to_reference_midnight() {
        // UTC-08:00: local 00:10 is 08:10 UTC
        let now = at(8, 10, 0);
        let window = current_window(now, 60, -480).unwrap();
        assert_eq!(window.start, at(8, 0, 0));
        assert_eq!(window.minutes_until_reset, 50);
    }

    #[test]
    fn window_always_contains_now() {
        let clock = WindowClock::new(90, 45).unwrap();
        let base = at(0, 0, 0);
        for step in 0..(3 * 24 * 60 / 7) {
            let now = base + Duration::minutes(step * 7) + Duration::seconds(step % 60);
            let window = clock.current_window(now);
            assert!(window.contains(now), "{} not in [{}, {})", now, window.start, window.end);
            assert_eq!(window.duration_minutes(), 90);
            assert!(window.minutes_until_reset >= 1 && window.minutes_until_reset <= 90);
        }
    }

    #[test]
    fn duration_must_divide_day() {
        assert!(matches!(
            WindowClock::new(7, 0),
            Err(QuotaError::Configuration(_))
        ));
        assert!(matches!(
            WindowClock::new(0, 0),
            Err(QuotaError::Configuration(_))
        ));
        assert!(WindowClock::new(1440, 0).is_ok());
        assert!(WindowClock::new(5, 0).is_ok());
    }

    #[test]
    fn offset_must_be_within_a_day() {
        assert!(matches!(
            WindowClock::new(120, 1440),
            Err(QuotaError::Configuration(_))
        ));
        assert!(WindowClock::new(120, -1439).is_ok());
    }

    #[test]
    fn default_clock_is_two_hours_utc() {
        let clock = WindowClock::default();
        assert_eq!(clock.duration_minutes(), 120);
        assert_eq!(clock.day_origin_offset_minutes(), 0);
    }
}
