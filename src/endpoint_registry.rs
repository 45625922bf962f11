//! Static URL -> provider recipe table. No network logic lives here: a
//! [`ProviderKind`] is resolved once from a response's source URL, and its
//! recipe drives the transformer's field extraction.

/// A step in a field's path through a JSON document. `Hourly` marks the
/// position where the current-hour index must be substituted at
/// extraction time (see [`crate::transformer`]) instead of sniffing the
/// raw path's shape against the source URL on every call.
#[derive(Debug, Clone, Copy)]
pub enum PathSegment {
    Key(&'static str),
    Hourly,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRecipe {
    pub field: &'static str,
    pub path: &'static [PathSegment],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenWeatherMap,
    Isramar,
    OpenMeteoMarine,
    OpenMeteoForecast,
}

impl ProviderKind {
    /// First-match URL substring resolution. Order matters: a marine
    /// Open-Meteo host also contains `open-meteo.com`, so the more
    /// specific hosts are tried before the bare domain would ever be
    /// (this table doesn't carry a bare-domain entry at all, precisely to
    /// avoid that ambiguity).
    pub fn resolve(url: &str) -> Option<Self> {
        if url.contains("openweathermap.org") {
            Some(Self::OpenWeatherMap)
        } else if url.contains("isramar.ocean.org.il") {
            Some(Self::Isramar)
        } else if url.contains("marine-api.open-meteo.com") {
            Some(Self::OpenMeteoMarine)
        } else if url.contains("api.open-meteo.com") {
            Some(Self::OpenMeteoForecast)
        } else {
            None
        }
    }

    pub fn timeout_seconds(self) -> u64 {
        match self {
            Self::OpenWeatherMap => 30,
            Self::Isramar | Self::OpenMeteoMarine | Self::OpenMeteoForecast => 15,
        }
    }

    /// Only the wind-forecast family carries `wind_speed_10m`; the marine
    /// family's URLs never do, so they must not be gated on this check.
    pub fn requires_wind_unit_ms(self) -> bool {
        matches!(self, Self::OpenMeteoForecast)
    }

    pub fn custom_extraction(self) -> bool {
        matches!(self, Self::Isramar)
    }

    /// Field recipes for providers using plain path extraction. Isramar
    /// has no recipe here; its irregular `parameters[]` shape is handled
    /// by `crate::transformer::extract_isramar`.
    pub fn recipe(self) -> &'static [FieldRecipe] {
        use PathSegment::*;

        const OWM: &[FieldRecipe] = &[
            FieldRecipe {
                field: "wind_speed_mps",
                path: &[Key("wind"), Key("speed")],
            },
            FieldRecipe {
                field: "wind_direction_deg",
                path: &[Key("wind"), Key("deg")],
            },
        ];
        const MARINE: &[FieldRecipe] = &[
            FieldRecipe {
                field: "wave_height_m",
                path: &[Key("hourly"), Key("wave_height"), Hourly],
            },
            FieldRecipe {
                field: "wave_period_s",
                path: &[Key("hourly"), Key("wave_period"), Hourly],
            },
        ];
        const FORECAST: &[FieldRecipe] = &[
            FieldRecipe {
                field: "wind_speed_mps",
                path: &[Key("hourly"), Key("wind_speed_10m"), Hourly],
            },
            FieldRecipe {
                field: "wind_direction_deg",
                path: &[Key("hourly"), Key("wind_direction_10m"), Hourly],
            },
        ];

        match self {
            Self::OpenWeatherMap => OWM,
            Self::Isramar => &[],
            Self::OpenMeteoMarine => MARINE,
            Self::OpenMeteoForecast => FORECAST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_marine_before_generic_open_meteo_host() {
        assert_eq!(
            ProviderKind::resolve("https://marine-api.open-meteo.com/v1/marine?..."),
            Some(ProviderKind::OpenMeteoMarine)
        );
        assert_eq!(
            ProviderKind::resolve("https://api.open-meteo.com/v1/forecast?..."),
            Some(ProviderKind::OpenMeteoForecast)
        );
    }

    #[test]
    fn unknown_host_resolves_to_none() {
        assert_eq!(ProviderKind::resolve("https://unknown-api.example.com/data"), None);
    }

    #[test]
    fn timeout_matches_provider_family() {
        assert_eq!(ProviderKind::OpenWeatherMap.timeout_seconds(), 30);
        assert_eq!(ProviderKind::Isramar.timeout_seconds(), 15);
    }
}
