//! Postgres-backed persistence. The ingestion engine is the sole writer
//! to `conditions`; the device API only reads it and best-effort touches
//! `devices.last_poll_time`.

use crate::transformer::ExtractedFields;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveTime, Utc};
use sqlx::PgPool;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub user_id: i64,
    pub location: String,
    pub theme: String,
    pub wave_threshold_m: f64,
    pub wave_threshold_max_m: Option<f64>,
    pub wind_threshold_knots: f64,
    pub wind_threshold_max_knots: Option<f64>,
    pub brightness_level: f64,
    pub off_times_enabled: bool,
    pub off_time_start: Option<NaiveTime>,
    pub off_time_end: Option<NaiveTime>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConditionsRow {
    pub wave_height_m: Option<f64>,
    pub wave_period_s: Option<f64>,
    pub wind_speed_mps: Option<f64>,
    pub wind_direction_deg: Option<f64>,
    pub last_updated: DateTime<Utc>,
}

pub struct DeviceAndConditions {
    pub device_id: i64,
    pub user: UserRow,
    pub conditions: Option<ConditionsRow>,
}

/// Distinct `users.location` values that also resolve in the location
/// registry. A location with zero users is never contacted.
pub async fn distinct_active_locations(pool: &PgPool) -> Result<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as("SELECT DISTINCT location FROM users")
        .fetch_all(pool)
        .await
        .context("failed to load distinct active locations")?;
    Ok(rows
        .into_iter()
        .map(|(location,)| location)
        .filter(|location| {
            let known = crate::location_registry::is_known(location);
            if !known {
                tracing::warn!(location, "skipping unknown location not in location registry");
            }
            known
        })
        .collect())
}

/// Join a device's hardware id to its owning user and that user's
/// location's latest conditions. `None` if no device has this hardware id.
pub async fn load_user_device_and_conditions(
    pool: &PgPool,
    hardware_id: i64,
) -> Result<Option<DeviceAndConditions>> {
    let device_user = sqlx::query_as::<_, (i64, i64)>(
        "SELECT d.device_id, d.user_id FROM devices d WHERE d.hardware_id = $1",
    )
    .bind(hardware_id)
    .fetch_optional(pool)
    .await
    .context("failed to load device by hardware id")?;

    let Some((device_id, user_id)) = device_user else {
        return Ok(None);
    };

    let user = sqlx::query_as::<_, UserRow>(
        "SELECT user_id, location, theme, wave_threshold_m, wave_threshold_max_m, \
         wind_threshold_knots, wind_threshold_max_knots, brightness_level, \
         off_times_enabled, off_time_start, off_time_end \
         FROM users WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .context("failed to load owning user for device")?;

    let conditions = sqlx::query_as::<_, ConditionsRow>(
        "SELECT wave_height_m, wave_period_s, wind_speed_mps, wind_direction_deg, last_updated \
         FROM conditions WHERE location = $1",
    )
    .bind(&user.location)
    .fetch_optional(pool)
    .await
    .context("failed to load conditions for user location")?;

    Ok(Some(DeviceAndConditions {
        device_id,
        user,
        conditions,
    }))
}

/// Upsert the merged fields for one location. Only fields present in
/// `fields` are written; `last_updated` always advances to now. Runs in
/// its own transaction so one location's failure can't roll back another.
pub async fn upsert_conditions(
    pool: &PgPool,
    location: &str,
    fields: &ExtractedFields,
) -> Result<()> {
    let mut tx = pool.begin().await.context("failed to start conditions upsert transaction")?;

    sqlx::query(
        "INSERT INTO conditions (location, wave_height_m, wave_period_s, wind_speed_mps, wind_direction_deg, last_updated) \
         VALUES ($1, $2, $3, $4, $5, now()) \
         ON CONFLICT (location) DO UPDATE SET \
           wave_height_m = COALESCE(EXCLUDED.wave_height_m, conditions.wave_height_m), \
           wave_period_s = COALESCE(EXCLUDED.wave_period_s, conditions.wave_period_s), \
           wind_speed_mps = COALESCE(EXCLUDED.wind_speed_mps, conditions.wind_speed_mps), \
           wind_direction_deg = COALESCE(EXCLUDED.wind_direction_deg, conditions.wind_direction_deg), \
           last_updated = now()",
    )
    .bind(location)
    .bind(fields.wave_height_m)
    .bind(fields.wave_period_s)
    .bind(fields.wind_speed_mps)
    .bind(fields.wind_direction_deg)
    .execute(&mut *tx)
    .await
    .context("failed to upsert conditions row")?;

    tx.commit().await.context("failed to commit conditions upsert")?;
    Ok(())
}

/// Best-effort poll-timestamp bump; failure here must never fail the
/// device response that's already been computed.
pub async fn touch_device(pool: &PgPool, device_id: i64) {
    if let Err(err) = sqlx::query("UPDATE devices SET last_poll_time = now() WHERE device_id = $1")
        .bind(device_id)
        .execute(pool)
        .await
    {
        tracing::warn!(device_id, error = %err, "failed to touch device last_poll_time");
    }
}
