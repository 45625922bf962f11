//! Test-only `AppState` construction, grounded in the teacher's
//! `test_support.rs`: a lazy pool never opens a real connection until a
//! query runs, so route tests that don't touch the database can build a
//! full `AppState` without a live Postgres instance.
#![cfg(test)]

use crate::config::CoreConfig;
use crate::db;
use crate::state::AppState;

pub fn test_config() -> CoreConfig {
    CoreConfig {
        database_url: "postgresql://postgres@localhost/postgres".to_string(),
        host: "127.0.0.1".to_string(),
        port: 0,
        ingest_interval_seconds: 900,
        openweathermap_api_key: None,
        isramar_api_key: None,
        open_meteo_marine_api_key: None,
        open_meteo_forecast_api_key: None,
        quiet_hours_start: 22,
        quiet_hours_end: 6,
        wind_unit_strict: true,
    }
}

pub fn test_state() -> AppState {
    let config = test_config();
    let pool = db::connect_lazy(&config.database_url).expect("connect_lazy");
    let http = reqwest::Client::new();
    AppState {
        config,
        db: pool,
        http,
    }
}
