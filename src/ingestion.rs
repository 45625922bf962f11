//! Ingestion Engine (one fan-out-merge-upsert pass over active locations)
//! and Scheduler (the fixed-interval loop that drives it), grounded in the
//! same start/cancel/tick shape this codebase uses for its other
//! background pollers.

use crate::conditions_store;
use crate::endpoint_registry::ProviderKind;
use crate::location_registry;
use crate::state::AppState;
use crate::transformer::{self, ExtractedFields};
use crate::weather_client;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

pub struct Scheduler {
    state: AppState,
    interval: Duration,
}

impl Scheduler {
    pub fn new(state: AppState, interval: Duration) -> Self {
        Self { state, interval }
    }

    /// Spawns the background loop. The first pass runs immediately
    /// (`tokio::time::interval` fires on creation), then every
    /// `interval` thereafter; `tokio::select!` against `cancel` drains
    /// the in-flight cycle before the task exits.
    pub fn start(self, cancel: CancellationToken) {
        let state = self.state;
        let interval = self.interval.max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        run_ingestion_cycle(&state).await;
                    }
                }
            }
        });
    }
}

#[derive(Debug, Default)]
struct CycleSummary {
    locations_considered: usize,
    locations_written: usize,
    provider_calls: usize,
    provider_failures: usize,
}

/// One pass over every active location. A provider failure is isolated to
/// its location; a location failure is isolated to the cycle; the cycle
/// never propagates a panic or error out to the scheduler.
async fn run_ingestion_cycle(state: &AppState) {
    let started = Instant::now();
    let mut summary = CycleSummary::default();

    let locations = match conditions_store::distinct_active_locations(&state.db).await {
        Ok(locations) => locations,
        Err(err) => {
            tracing::warn!(error = %err, "ingestion cycle aborted: could not load active locations");
            return;
        }
    };

    if locations.is_empty() {
        tracing::info!("ingestion cycle: no active locations, nothing to do");
        return;
    }

    summary.locations_considered = locations.len();

    for location in &locations {
        match process_location(state, location).await {
            Ok(LocationOutcome { calls, failures, wrote }) => {
                summary.provider_calls += calls;
                summary.provider_failures += failures;
                if wrote {
                    summary.locations_written += 1;
                }
            }
            Err(err) => {
                tracing::warn!(location, error = %err, "failed to process location");
            }
        }
    }

    tracing::info!(
        locations_considered = summary.locations_considered,
        locations_written = summary.locations_written,
        provider_calls = summary.provider_calls,
        provider_failures = summary.provider_failures,
        duration_ms = started.elapsed().as_millis() as u64,
        "ingestion cycle complete"
    );
}

struct LocationOutcome {
    calls: usize,
    failures: usize,
    wrote: bool,
}

async fn process_location(state: &AppState, location: &str) -> anyhow::Result<LocationOutcome> {
    let sources = location_registry::provider_sources(location);
    // Preserves source order so sources sharing a priority merge
    // left-to-right, per spec, instead of colliding on a shared key.
    let mut by_priority: Vec<(u32, ExtractedFields)> = Vec::new();
    let mut calls = 0;
    let mut failures = 0;

    for source in sources {
        let Some(kind) = ProviderKind::resolve(source.url) else {
            tracing::warn!(location, url = source.url, "no provider recipe for source url");
            continue;
        };

        calls += 1;
        let bearer_token = bearer_token_for(state, kind);
        match weather_client::fetch(
            &state.http,
            source.url,
            kind,
            bearer_token.as_deref(),
            state.config.wind_unit_strict,
        )
        .await
        {
            Ok(outcome) => match transformer::standardize(kind, source.url, &outcome.body) {
                Some(fields) => {
                    by_priority.push((source.priority, fields));
                }
                None => {
                    tracing::warn!(location, url = source.url, "provider response had no extractable fields");
                }
            },
            Err(err) => {
                failures += 1;
                tracing::warn!(location, url = source.url, error = %err, "provider call failed");
            }
        }
    }

    let merged = transformer::merge_by_priority(by_priority);
    if merged.is_empty() {
        return Ok(LocationOutcome { calls, failures, wrote: false });
    }

    conditions_store::upsert_conditions(&state.db, location, &merged).await?;
    Ok(LocationOutcome { calls, failures, wrote: true })
}

fn bearer_token_for(state: &AppState, kind: ProviderKind) -> Option<String> {
    match kind {
        ProviderKind::OpenWeatherMap => state.config.openweathermap_api_key.clone(),
        ProviderKind::Isramar => state.config.isramar_api_key.clone(),
        ProviderKind::OpenMeteoMarine => state.config.open_meteo_marine_api_key.clone(),
        ProviderKind::OpenMeteoForecast => state.config.open_meteo_forecast_api_key.clone(),
    }
}
