//! Pure sunset-time calculation driving the device's sunset animation
//! trigger. No network access, no database access; never panics or
//! returns an error — any failure degrades to the documented safe
//! fallback instead.

use chrono::{DateTime, Datelike, Duration as ChronoDuration, TimeZone, Utc};
use chrono_tz::Tz;

#[derive(Debug, Clone, Copy)]
struct Coordinates {
    latitude: f64,
    longitude: f64,
}

fn coordinates(location: &str) -> Coordinates {
    match location {
        "Tel Aviv, Israel" => Coordinates { latitude: 32.0853, longitude: 34.7818 },
        "Haifa, Israel" => Coordinates { latitude: 32.7940, longitude: 34.9896 },
        "Eilat, Israel" => Coordinates { latitude: 29.5581, longitude: 34.9482 },
        "Herzliya, Israel" => Coordinates { latitude: 32.1624, longitude: 34.8080 },
        "Hadera, Israel" => Coordinates { latitude: 32.4340, longitude: 34.9196 },
        // Unlisted locations fall back to Tel Aviv, matching the
        // upstream calculator's "closest known coastline" default.
        _ => Coordinates { latitude: 32.0853, longitude: 34.7818 },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SunsetInfo {
    pub sunset_trigger: bool,
    pub day_of_year: u32,
    pub sunset_time: String,
}

const TRIGGER_WINDOW_MINUTES: i64 = 15;

/// Compute today's sunset window for `location` as observed at `now`
/// (UTC instant). On any internal failure (unknown timezone, degenerate
/// solar geometry at extreme latitudes) returns the safe fallback:
/// no animation trigger, day-of-year from the local clock, and an
/// "Unknown" sunset time — it never raises.
pub fn sunset_info(location: &str, now: DateTime<Utc>) -> SunsetInfo {
    match try_sunset_info(location, now) {
        Some(info) => info,
        None => {
            let fallback_day = now.ordinal();
            tracing::warn!(location, "sunset calculation failed, using safe fallback");
            SunsetInfo {
                sunset_trigger: false,
                day_of_year: fallback_day,
                sunset_time: "Unknown".to_string(),
            }
        }
    }
}

fn try_sunset_info(location: &str, now: DateTime<Utc>) -> Option<SunsetInfo> {
    let tz: Tz = crate::location_registry::timezone(location).unwrap_or(chrono_tz::Asia::Jerusalem);
    let local_now = now.with_timezone(&tz);
    let coords = coordinates(location);

    let sunset_utc = solar_sunset_utc(coords, local_now.date_naive())?;
    let window_start = sunset_utc - ChronoDuration::minutes(TRIGGER_WINDOW_MINUTES);
    let window_end = sunset_utc + ChronoDuration::minutes(TRIGGER_WINDOW_MINUTES);
    let in_window = now >= window_start && now <= window_end;

    let sunset_local = sunset_utc.with_timezone(&tz);
    Some(SunsetInfo {
        sunset_trigger: in_window,
        day_of_year: local_now.ordinal(),
        sunset_time: sunset_local.format("%H:%M").to_string(),
    })
}

/// NOAA solar-position approximation (Meeus, _Astronomical Algorithms_
/// ch. 25), accurate to within about a minute for the mid-latitude
/// coastal sites this system serves. Returns `None` if the equation of
/// the sun-hour-angle has no solution (permanent day/night at the given
/// latitude and date), which the caller treats as a calculation failure.
fn solar_sunset_utc(coords: Coordinates, local_date: chrono::NaiveDate) -> Option<DateTime<Utc>> {
    let day_of_year = local_date.ordinal() as f64;

    let gamma = 2.0 * std::f64::consts::PI / 365.0 * (day_of_year - 1.0);
    let declination = 0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
        - 0.006758 * (2.0 * gamma).cos()
        + 0.000907 * (2.0 * gamma).sin()
        - 0.002697 * (3.0 * gamma).cos()
        + 0.00148 * (3.0 * gamma).sin();

    let lat_rad = coords.latitude.to_radians();
    let cos_hour_angle = -lat_rad.tan() * declination.tan();
    if !(-1.0..=1.0).contains(&cos_hour_angle) {
        return None;
    }
    let hour_angle_deg = cos_hour_angle.acos().to_degrees();

    // Solar noon (UTC) for this longitude, ignoring the equation of time
    // (sub-minute correction, within this calculation's accuracy target).
    let solar_noon_utc_hours = 12.0 - coords.longitude / 15.0;
    let sunset_utc_hours = solar_noon_utc_hours + hour_angle_deg / 15.0;

    let midnight_utc = Utc.from_utc_datetime(&local_date.and_hms_opt(0, 0, 0)?);
    let minutes = (sunset_utc_hours * 60.0).round() as i64;
    let sunset_utc = midnight_utc + ChronoDuration::minutes(minutes);
    Some(sunset_utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn unknown_location_falls_back_to_tel_aviv_coordinates_not_error() {
        let now = Utc.with_ymd_and_hms(2026, 6, 21, 10, 0, 0).unwrap();
        let info = sunset_info("Nowhere", now);
        assert_ne!(info.sunset_time, "Unknown");
    }

    #[test]
    fn midday_is_never_in_sunset_trigger_window() {
        let now = Utc.with_ymd_and_hms(2026, 6, 21, 9, 0, 0).unwrap();
        let info = sunset_info("Tel Aviv, Israel", now);
        assert!(!info.sunset_trigger);
    }

    #[test]
    fn day_of_year_matches_local_calendar_date() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 10, 0, 0).unwrap();
        let info = sunset_info("Tel Aviv, Israel", now);
        let expected = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap().ordinal();
        assert_eq!(info.day_of_year, expected);
    }
}
