//! HTTP GET against one provider source, with the retry/backoff/pacing
//! rules the upstream providers expect from a well-behaved caller.

use crate::endpoint_registry::ProviderKind;
use anyhow::{bail, Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value as JsonValue;
use std::time::Duration;

const USER_AGENT: &str = "surf-lamp-core/1.0";
const MAX_ATTEMPTS: u32 = 3;
const TIMEOUT_RETRY_DELAY_SECS: u64 = 30;
const RATE_LIMIT_BACKOFF_SECS: [u64; 3] = [60, 120, 240];
const POST_CALL_PACING_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub body: JsonValue,
    pub attempts: u32,
}

/// Fetch one provider URL. Validates the Open-Meteo wind-unit precondition
/// before issuing any request, retries on timeout (flat delay) and HTTP
/// 429 (exponential backoff) up to `MAX_ATTEMPTS`, and always sleeps
/// `POST_CALL_PACING_SECS` after a successful call to avoid hammering the
/// provider on the next location's pass.
pub async fn fetch(
    client: &Client,
    url: &str,
    kind: ProviderKind,
    bearer_token: Option<&str>,
    wind_unit_strict: bool,
) -> Result<FetchOutcome> {
    if wind_unit_strict && kind.requires_wind_unit_ms() {
        validate_wind_unit(url)?;
    }

    let timeout = Duration::from_secs(kind.timeout_seconds());
    let mut last_err = None;

    for attempt in 1..=MAX_ATTEMPTS {
        let mut request = client.get(url).header("User-Agent", USER_AGENT).timeout(timeout);
        if let Some(token) = bearer_token {
            if !token.is_empty() {
                request = request.bearer_auth(token);
            }
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                let body = response
                    .json::<JsonValue>()
                    .await
                    .with_context(|| format!("failed to parse JSON body from {url}"))?;
                tokio::time::sleep(Duration::from_secs(POST_CALL_PACING_SECS)).await;
                return Ok(FetchOutcome { body, attempts: attempt });
            }
            Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                let delay = RATE_LIMIT_BACKOFF_SECS[(attempt - 1) as usize % RATE_LIMIT_BACKOFF_SECS.len()];
                tracing::warn!(url, attempt, delay, "rate limited, backing off");
                last_err = Some(anyhow::anyhow!("rate limited (429) from {url}"));
                if attempt < MAX_ATTEMPTS {
                    tokio::time::sleep(Duration::from_secs(delay)).await;
                }
            }
            Ok(response) => {
                bail!(
                    "non-retriable status {} from {url}",
                    response.status()
                );
            }
            Err(err) if err.is_timeout() => {
                tracing::warn!(url, attempt, "request timed out");
                last_err = Some(anyhow::Error::new(err));
                if attempt < MAX_ATTEMPTS {
                    tokio::time::sleep(Duration::from_secs(TIMEOUT_RETRY_DELAY_SECS)).await;
                }
            }
            Err(err) => return Err(err).with_context(|| format!("request to {url} failed")),
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow::anyhow!("exhausted retries for {url}")))
}

/// Open-Meteo wind endpoints silently default to km/h unless the request
/// explicitly asks for m/s; a missing `wind_speed_unit=ms` query parameter
/// would make every downstream wind reading wrong by a fixed factor, so
/// this is checked before the network call instead of after.
fn validate_wind_unit(url: &str) -> Result<()> {
    let parsed = url::Url::parse(url).with_context(|| format!("invalid provider URL: {url}"))?;
    let has_wind_unit_ms = parsed
        .query_pairs()
        .any(|(key, value)| key == "wind_speed_unit" && value == "ms");
    if !has_wind_unit_ms {
        bail!("provider URL {url} is missing required wind_speed_unit=ms query parameter");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_open_meteo_wind_url_without_unit_param() {
        let err = validate_wind_unit(
            "https://api.open-meteo.com/v1/forecast?latitude=32&longitude=34&hourly=wind_speed_10m",
        )
        .unwrap_err();
        assert!(err.to_string().contains("wind_speed_unit=ms"));
    }

    #[test]
    fn accepts_open_meteo_wind_url_with_unit_param() {
        validate_wind_unit(
            "https://api.open-meteo.com/v1/forecast?latitude=32&longitude=34&hourly=wind_speed_10m&wind_speed_unit=ms",
        )
        .unwrap();
    }

    #[test]
    fn accepts_unit_param_regardless_of_position() {
        validate_wind_unit(
            "https://api.open-meteo.com/v1/forecast?wind_speed_unit=ms&latitude=32&longitude=34",
        )
        .unwrap();
    }
}
