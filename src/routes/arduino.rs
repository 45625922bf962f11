//! Device-facing pull API. No auth beyond the hardware id existing;
//! read-only except for a best-effort `last_poll_time` touch.

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;

use crate::conditions_store::{self, ConditionsRow, UserRow};
use crate::error::{AppError, AppResult};
use crate::hours;
use crate::location_registry;
use crate::state::AppState;
use crate::sunset;

const EPOCH_SENTINEL: &str = "1970-01-01T00:00:00Z";
const EFFECTIVE_THRESHOLD_SENTINEL: i64 = 9999;

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct SurfDataResponse {
    pub wave_height_cm: i64,
    pub wave_period_s: f64,
    pub wind_speed_mps: i64,
    pub wind_direction_deg: i64,
    pub wave_threshold_cm: i64,
    pub wind_speed_threshold_knots: i64,
    pub led_theme: String,
    pub quiet_hours_active: bool,
    pub off_hours_active: bool,
    pub sunset_animation: bool,
    pub day_of_year: u32,
    pub last_updated: String,
    pub data_available: bool,
}

#[utoipa::path(
    get,
    path = "/api/arduino/{hardware_id}/data",
    params(("hardware_id" = i64, Path, description = "device hardware id")),
    responses(
        (status = 200, description = "device conditions payload", body = SurfDataResponse),
        (status = 404, description = "no device registered with this hardware id"),
    )
)]
pub(crate) async fn get_surf_data(
    State(state): State<AppState>,
    Path(hardware_id): Path<i64>,
) -> AppResult<Json<SurfDataResponse>> {
    let Some(record) = conditions_store::load_user_device_and_conditions(&state.db, hardware_id)
        .await
        .map_err(|err| AppError::internal(format!("failed to load device: {err:#}")))?
    else {
        return Err(AppError::new(
            axum::http::StatusCode::NOT_FOUND,
            "device not found",
        ));
    };

    conditions_store::touch_device(&state.db, record.device_id).await;

    let now = Utc::now();
    let tz = location_registry::timezone(&record.user.location);
    let quiet_hours_active = hours::is_quiet_hours(
        tz,
        now,
        state.config.quiet_hours_start,
        state.config.quiet_hours_end,
    );
    let off_hours_active = hours::is_off_hours(
        tz,
        now,
        record.user.off_times_enabled,
        record.user.off_time_start,
        record.user.off_time_end,
    );
    let sunset = sunset::sunset_info(&record.user.location, now);

    let response = build_response(
        &record.user,
        record.conditions.as_ref(),
        quiet_hours_active,
        off_hours_active,
        sunset.sunset_trigger,
        sunset.day_of_year,
    );

    Ok(Json(response))
}

fn build_response(
    user: &UserRow,
    conditions: Option<&ConditionsRow>,
    quiet_hours_active: bool,
    off_hours_active: bool,
    sunset_animation: bool,
    day_of_year: u32,
) -> SurfDataResponse {
    let wave_height_m = conditions.and_then(|c| c.wave_height_m).unwrap_or(0.0);
    let wave_period_s = conditions.and_then(|c| c.wave_period_s).unwrap_or(0.0);
    let wind_speed_mps_raw = conditions.and_then(|c| c.wind_speed_mps).unwrap_or(0.0);
    let wind_direction_deg = conditions.and_then(|c| c.wind_direction_deg).unwrap_or(0.0);
    let wind_speed_knots = wind_speed_mps_raw * 1.9438445;

    SurfDataResponse {
        wave_height_cm: (wave_height_m * 100.0).round() as i64,
        wave_period_s,
        wind_speed_mps: wind_speed_mps_raw.round() as i64,
        wind_direction_deg: (wind_direction_deg.round() as i64).rem_euclid(360),
        wave_threshold_cm: effective_threshold_cm(user, wave_height_m),
        wind_speed_threshold_knots: effective_threshold_knots(user, wind_speed_knots),
        led_theme: user.theme.clone(),
        quiet_hours_active,
        off_hours_active,
        sunset_animation,
        day_of_year,
        last_updated: conditions
            .map(|c| c.last_updated.to_rfc3339())
            .unwrap_or_else(|| EPOCH_SENTINEL.to_string()),
        data_available: conditions.is_some(),
    }
}

/// Folds an optional upper threshold into a single device-facing value:
/// once the latest reading exceeds the configured max, the device is
/// told the sentinel `9999` rather than the (now-meaningless) normal
/// threshold, so it can distinguish "alert" from "way past the top of
/// the configured range".
fn effective_threshold_cm(user: &UserRow, latest_wave_height_m: f64) -> i64 {
    if let Some(max_m) = user.wave_threshold_max_m {
        if latest_wave_height_m > max_m {
            return EFFECTIVE_THRESHOLD_SENTINEL;
        }
    }
    (user.wave_threshold_m * 100.0).round() as i64
}

fn effective_threshold_knots(user: &UserRow, latest_wind_speed_knots: f64) -> i64 {
    if let Some(max_knots) = user.wind_threshold_max_knots {
        if latest_wind_speed_knots > max_knots {
            return EFFECTIVE_THRESHOLD_SENTINEL;
        }
    }
    user.wind_threshold_knots.round() as i64
}

pub fn router() -> Router<AppState> {
    Router::new().route("/arduino/{hardware_id}/data", get(get_surf_data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn user(wave_threshold_m: f64, wave_threshold_max_m: Option<f64>) -> UserRow {
        UserRow {
            user_id: 1,
            location: "Tel Aviv, Israel".to_string(),
            theme: "day".to_string(),
            wave_threshold_m,
            wave_threshold_max_m,
            wind_threshold_knots: 22.0,
            wind_threshold_max_knots: None,
            brightness_level: 1.0,
            off_times_enabled: false,
            off_time_start: None,
            off_time_end: None,
        }
    }

    #[test]
    fn missing_conditions_yields_zeros_and_data_unavailable() {
        let response = build_response(&user(1.0, None), None, false, false, false, 10);
        assert_eq!(response.wave_height_cm, 0);
        assert_eq!(response.wind_speed_mps, 0);
        assert!(!response.data_available);
        assert_eq!(response.last_updated, EPOCH_SENTINEL);
    }

    #[test]
    fn present_conditions_convert_units_and_round() {
        let conditions = ConditionsRow {
            wave_height_m: Some(1.234),
            wave_period_s: Some(8.5),
            wind_speed_mps: Some(5.6),
            wind_direction_deg: Some(182.4),
            last_updated: Utc.with_ymd_and_hms(2026, 7, 27, 12, 0, 0).unwrap(),
        };
        let response = build_response(&user(1.0, None), Some(&conditions), false, false, false, 10);
        assert_eq!(response.wave_height_cm, 123);
        assert_eq!(response.wind_speed_mps, 6);
        assert_eq!(response.wind_direction_deg, 182);
        assert!(response.data_available);
    }

    #[test]
    fn threshold_sentinel_fires_once_reading_exceeds_configured_max() {
        let conditions = ConditionsRow {
            wave_height_m: Some(3.0),
            wave_period_s: Some(8.0),
            wind_speed_mps: Some(1.0),
            wind_direction_deg: Some(10.0),
            last_updated: Utc.with_ymd_and_hms(2026, 7, 27, 12, 0, 0).unwrap(),
        };
        let response = build_response(&user(1.0, Some(2.5)), Some(&conditions), false, false, false, 10);
        assert_eq!(response.wave_threshold_cm, 9999);
    }

    #[test]
    fn threshold_sentinel_does_not_fire_below_max() {
        let conditions = ConditionsRow {
            wave_height_m: Some(1.5),
            wave_period_s: Some(8.0),
            wind_speed_mps: Some(1.0),
            wind_direction_deg: Some(10.0),
            last_updated: Utc.with_ymd_and_hms(2026, 7, 27, 12, 0, 0).unwrap(),
        };
        let response = build_response(&user(1.0, Some(2.5)), Some(&conditions), false, false, false, 10);
        assert_eq!(response.wave_threshold_cm, 100);
    }
}
