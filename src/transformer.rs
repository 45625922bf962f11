//! Pure JSON -> canonical-field extraction. No network or database access.

use crate::endpoint_registry::{FieldRecipe, PathSegment, ProviderKind};
use chrono::Utc;
use serde_json::Value as JsonValue;

/// Canonical, unit-converted surf/wind fields extracted from one provider
/// response. Any field the provider didn't report stays `None` so the
/// ingestion engine's priority merge can fall through to the next source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub wave_height_m: Option<f64>,
    pub wave_period_s: Option<f64>,
    pub wind_speed_mps: Option<f64>,
    pub wind_direction_deg: Option<f64>,
}

impl ExtractedFields {
    pub fn is_empty(&self) -> bool {
        self.wave_height_m.is_none()
            && self.wave_period_s.is_none()
            && self.wind_speed_mps.is_none()
            && self.wind_direction_deg.is_none()
    }

    fn set(&mut self, field: &str, value: f64) {
        match field {
            "wave_height_m" => self.wave_height_m = Some(value),
            "wave_period_s" => self.wave_period_s = Some(value),
            "wind_speed_mps" => self.wind_speed_mps = Some(value),
            "wind_direction_deg" => self.wind_direction_deg = Some(value),
            other => tracing::warn!(field = other, "unknown canonical field in recipe"),
        }
    }
}

/// Standardize one provider's raw JSON body into canonical fields. Returns
/// `None` if the provider has no known recipe, mirroring the upstream
/// "no config found" behavior.
pub fn standardize(kind: ProviderKind, url: &str, raw: &JsonValue) -> Option<ExtractedFields> {
    if kind.custom_extraction() {
        return Some(extract_isramar(raw));
    }

    let mut out = ExtractedFields::default();
    let current_hour_index = current_hour_index(raw);

    for recipe in kind.recipe() {
        if let Some(value) = extract_field(raw, recipe, current_hour_index) {
            out.set(recipe.field, value);
        }
    }

    if out.is_empty() {
        tracing::warn!(url, "no fields extracted from provider response");
        None
    } else {
        Some(out)
    }
}

fn extract_field(raw: &JsonValue, recipe: &FieldRecipe, hour_index: usize) -> Option<f64> {
    let mut cursor = raw;
    for segment in recipe.path {
        cursor = match segment {
            PathSegment::Key(key) => cursor.get(key)?,
            PathSegment::Hourly => cursor.get(hour_index)?,
        };
    }
    cursor.as_f64()
}

/// Find the index in `hourly.time` matching the current UTC hour
/// (`YYYY-MM-DDTHH:MM`, matched by prefix). Defaults to 0 if the array is
/// absent, empty, or has no matching entry — callers never see an
/// out-of-range index.
fn current_hour_index(raw: &JsonValue) -> usize {
    let Some(time_array) = raw.pointer("/hourly/time").and_then(JsonValue::as_array) else {
        return 0;
    };
    let current_hour = Utc::now().format("%Y-%m-%dT%H:00").to_string();
    // The source array uses "%H:%M" so a zero-minute prefix match is enough.
    let want = &current_hour[..current_hour.len() - 2];
    for (index, entry) in time_array.iter().enumerate() {
        if let Some(text) = entry.as_str() {
            if text.starts_with(want) {
                return index;
            }
        }
    }
    tracing::warn!("current hour not found in hourly time array, using index 0");
    0
}

/// Isramar's response shape is a flat list of named parameters rather
/// than a field-path table, so it gets a dedicated extractor instead of a
/// recipe.
fn extract_isramar(raw: &JsonValue) -> ExtractedFields {
    let mut out = ExtractedFields::default();
    let Some(parameters) = raw.get("parameters").and_then(JsonValue::as_array) else {
        return out;
    };

    for parameter in parameters {
        let name = parameter.get("name").and_then(JsonValue::as_str).unwrap_or("");
        let Some(value) = parameter
            .get("values")
            .and_then(JsonValue::as_array)
            .and_then(|values| values.first())
            .and_then(JsonValue::as_f64)
        else {
            continue;
        };

        if name.contains("Significant wave height") {
            out.wave_height_m = Some(value);
        } else if name.contains("Peak wave period") {
            out.wave_period_s = Some(value);
        }
    }

    out
}

/// Merge per-provider extractions for one location in priority order
/// (lowest number first); the first source to report a non-null value for
/// a field wins, later sources never overwrite it. Sources sharing a
/// priority are merged left-to-right in the order given, per spec.
pub fn merge_by_priority(mut sources: Vec<(u32, ExtractedFields)>) -> ExtractedFields {
    sources.sort_by_key(|(priority, _)| *priority);
    let mut merged = ExtractedFields::default();
    for (_, fields) in sources {
        merged.wave_height_m = merged.wave_height_m.or(fields.wave_height_m);
        merged.wave_period_s = merged.wave_period_s.or(fields.wave_period_s);
        merged.wind_speed_mps = merged.wind_speed_mps.or(fields.wind_speed_mps);
        merged.wind_direction_deg = merged.wind_direction_deg.or(fields.wind_direction_deg);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_open_weather_map_wind_fields() {
        let raw = json!({"wind": {"speed": 4.5, "deg": 180}});
        let out = standardize(ProviderKind::OpenWeatherMap, "http://openweathermap.org/x", &raw)
            .unwrap();
        assert_eq!(out.wind_speed_mps, Some(4.5));
        assert_eq!(out.wind_direction_deg, Some(180.0));
        assert_eq!(out.wave_height_m, None);
    }

    #[test]
    fn extracts_isramar_wave_fields_by_parameter_name() {
        let raw = json!({
            "parameters": [
                {"name": "Significant wave height", "units": "m", "values": [0.41]},
                {"name": "Peak wave period", "units": "s", "values": [3.5]},
            ]
        });
        let out = extract_isramar(&raw);
        assert_eq!(out.wave_height_m, Some(0.41));
        assert_eq!(out.wave_period_s, Some(3.5));
    }

    #[test]
    fn isramar_with_no_parameters_returns_all_none() {
        let raw = json!({});
        let out = extract_isramar(&raw);
        assert!(out.is_empty());
    }

    #[test]
    fn unknown_provider_field_path_returns_none_without_panicking() {
        let raw = json!({"wind": {}});
        let out = standardize(ProviderKind::OpenWeatherMap, "http://openweathermap.org/x", &raw);
        assert!(out.is_none());
    }

    #[test]
    fn missing_hourly_time_array_defaults_to_index_zero() {
        let raw = json!({"hourly": {"wave_height": [1.2, 9.9]}});
        let out = standardize(
            ProviderKind::OpenMeteoMarine,
            "https://marine-api.open-meteo.com/v1/marine",
            &raw,
        )
        .unwrap();
        assert_eq!(out.wave_height_m, Some(1.2));
    }

    #[test]
    fn priority_merge_keeps_lowest_priority_non_null_value() {
        let sources = vec![
            (
                1,
                ExtractedFields {
                    wave_height_m: Some(1.0),
                    ..Default::default()
                },
            ),
            (
                2,
                ExtractedFields {
                    wave_height_m: Some(9.0),
                    wind_speed_mps: Some(5.0),
                    ..Default::default()
                },
            ),
        ];
        let merged = merge_by_priority(sources);
        assert_eq!(merged.wave_height_m, Some(1.0));
        assert_eq!(merged.wind_speed_mps, Some(5.0));
    }

    #[test]
    fn priority_merge_falls_through_null_to_next_source() {
        let sources = vec![
            (1, ExtractedFields::default()),
            (
                2,
                ExtractedFields {
                    wave_period_s: Some(7.0),
                    ..Default::default()
                },
            ),
        ];
        let merged = merge_by_priority(sources);
        assert_eq!(merged.wave_period_s, Some(7.0));
    }

    #[test]
    fn priority_merge_resolves_equal_priority_left_to_right() {
        let sources = vec![
            (
                1,
                ExtractedFields {
                    wave_height_m: Some(1.0),
                    ..Default::default()
                },
            ),
            (
                1,
                ExtractedFields {
                    wave_height_m: Some(2.0),
                    wind_speed_mps: Some(3.0),
                    ..Default::default()
                },
            ),
        ];
        let merged = merge_by_priority(sources);
        assert_eq!(merged.wave_height_m, Some(1.0));
        assert_eq!(merged.wind_speed_mps, Some(3.0));
    }
}
