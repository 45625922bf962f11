//! Local-time-of-day derivations for the device API: quiet hours (fixed,
//! system-wide) and off hours (per-user, configurable). Both wrap around
//! midnight the same way, so they share one range check.

use chrono::{DateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// True if `start:00` <= local time < `end:00`, wrapping past midnight
/// when `end <= start` (e.g. 22 -> 6 covers 22:00-23:59 and 00:00-05:59).
pub fn in_overnight_range(local_hour: u32, start: u32, end: u32) -> bool {
    if start == end {
        return false;
    }
    if start < end {
        local_hour >= start && local_hour < end
    } else {
        local_hour >= start || local_hour < end
    }
}

/// Quiet hours (default 22:00-06:00) silence threshold alerts but never
/// turn the lamp off. `None` timezone (unknown location) is never quiet.
pub fn is_quiet_hours(tz: Option<Tz>, now: DateTime<Utc>, start: u32, end: u32) -> bool {
    let Some(tz) = tz else { return false };
    let local_hour = now.with_timezone(&tz).hour();
    in_overnight_range(local_hour, start, end)
}

/// Off hours are per-user, opt-in, and expressed as wall-clock times
/// rather than bare hours (so a user can set e.g. 23:30-05:45).
pub fn is_off_hours(
    tz: Option<Tz>,
    now: DateTime<Utc>,
    enabled: bool,
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
) -> bool {
    if !enabled {
        return false;
    }
    let (Some(tz), Some(start), Some(end)) = (tz, start, end) else {
        return false;
    };
    let local_time = now.with_timezone(&tz).time();
    if start == end {
        return false;
    }
    if start < end {
        local_time >= start && local_time < end
    } else {
        local_time >= start || local_time < end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    #[test]
    fn overnight_range_wraps_past_midnight() {
        assert!(in_overnight_range(23, 22, 6));
        assert!(in_overnight_range(2, 22, 6));
        assert!(!in_overnight_range(12, 22, 6));
        assert!(!in_overnight_range(6, 22, 6));
    }

    #[test]
    fn same_day_range_does_not_wrap() {
        assert!(in_overnight_range(10, 8, 17));
        assert!(!in_overnight_range(18, 8, 17));
    }

    #[test]
    fn quiet_hours_unknown_timezone_is_never_quiet() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 23, 0, 0).unwrap();
        assert!(!is_quiet_hours(None, now, 22, 6));
    }

    #[test]
    fn off_hours_disabled_is_always_false() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 23, 0, 0).unwrap();
        let start = NaiveTime::from_hms_opt(23, 0, 0).unwrap();
        let end = NaiveTime::from_hms_opt(5, 0, 0).unwrap();
        assert!(!is_off_hours(
            Some(chrono_tz::Asia::Jerusalem),
            now,
            false,
            Some(start),
            Some(end)
        ));
    }

    #[test]
    fn off_hours_wraps_past_midnight_when_enabled() {
        let late_night = Utc.with_ymd_and_hms(2026, 1, 1, 23, 30, 0).unwrap();
        let start = NaiveTime::from_hms_opt(23, 0, 0).unwrap();
        let end = NaiveTime::from_hms_opt(5, 0, 0).unwrap();
        assert!(is_off_hours(
            Some(chrono_tz::Asia::Jerusalem),
            late_night,
            true,
            Some(start),
            Some(end)
        ));
    }
}
