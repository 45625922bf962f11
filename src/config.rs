use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub ingest_interval_seconds: u64,
    pub openweathermap_api_key: Option<String>,
    pub isramar_api_key: Option<String>,
    pub open_meteo_marine_api_key: Option<String>,
    pub open_meteo_forecast_api_key: Option<String>,
    pub quiet_hours_start: u32,
    pub quiet_hours_end: u32,
    pub wind_unit_strict: bool,
}

impl CoreConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("SURFLAMP_DATABASE_URL")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .context("SURFLAMP_DATABASE_URL must be set")?;
        let database_url = normalize_database_url(database_url);

        let host = env_string("SURFLAMP_HOST", "0.0.0.0");
        let port = env_u16("SURFLAMP_PORT", 8080);
        let ingest_interval_seconds = env_u64("SURFLAMP_INGEST_INTERVAL_SECONDS", 900);
        let openweathermap_api_key = env_optional_string("SURFLAMP_OPENWEATHERMAP_API_KEY");
        let isramar_api_key = env_optional_string("SURFLAMP_ISRAMAR_API_KEY");
        let open_meteo_marine_api_key =
            env_optional_string("SURFLAMP_OPEN_METEO_MARINE_API_KEY");
        let open_meteo_forecast_api_key =
            env_optional_string("SURFLAMP_OPEN_METEO_FORECAST_API_KEY");
        let quiet_hours_start = env_u64("SURFLAMP_QUIET_HOURS_START", 22).clamp(0, 23) as u32;
        let quiet_hours_end = env_u64("SURFLAMP_QUIET_HOURS_END", 6).clamp(0, 23) as u32;
        let wind_unit_strict = env_bool("SURFLAMP_WIND_UNIT_STRICT", true);

        if database_url.trim().is_empty() {
            anyhow::bail!("SURFLAMP_DATABASE_URL resolved to an empty value");
        }

        Ok(Self {
            database_url,
            host,
            port,
            ingest_interval_seconds,
            openweathermap_api_key,
            isramar_api_key,
            open_meteo_marine_api_key,
            open_meteo_forecast_api_key,
            quiet_hours_start,
            quiet_hours_end,
            wind_unit_strict,
        })
    }
}

fn env_string(key: &str, default: &str) -> String {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_optional_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key)
        .ok()
        .map(|value| value.trim().to_lowercase())
    {
        Some(value) if value == "1" || value == "true" || value == "yes" => true,
        Some(value) if value == "0" || value == "false" || value == "no" => false,
        _ => default,
    }
}

fn env_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u16>().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn normalize_database_url(url: String) -> String {
    if let Some(stripped) = url.strip_prefix("postgresql+psycopg://") {
        return format!("postgresql://{stripped}");
    }
    if let Some(stripped) = url.strip_prefix("postgresql+asyncpg://") {
        return format!("postgresql://{stripped}");
    }
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_sqlalchemy_style_urls() {
        assert_eq!(
            normalize_database_url("postgresql+psycopg://u:p@host/db".to_string()),
            "postgresql://u:p@host/db"
        );
        assert_eq!(
            normalize_database_url("postgresql://u:p@host/db".to_string()),
            "postgresql://u:p@host/db"
        );
    }
}
