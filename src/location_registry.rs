//! Process-wide constant tables: which provider sources feed a location,
//! and which IANA timezone it observes local time in. Both tables are
//! compiled in, not configuration-loaded — adding a location is a code
//! change, same as in the system this backend replaces.

use chrono_tz::Tz;

#[derive(Debug, Clone, Copy)]
pub struct ProviderSource {
    pub url: &'static str,
    pub priority: u32,
}

#[derive(Debug, Clone, Copy)]
struct LocationEntry {
    name: &'static str,
    timezone: Tz,
    sources: &'static [ProviderSource],
}

// Lowest `priority` wins on field overlap (see `crate::transformer::merge_by_priority`).
static LOCATIONS: &[LocationEntry] = &[
    LocationEntry {
        name: "Hadera, Israel",
        timezone: Tz::Asia__Jerusalem,
        sources: &[
            ProviderSource {
                url: "https://isramar.ocean.org.il/isramar2009/station/data/Hadera_Hs_Per.json",
                priority: 1,
            },
            ProviderSource {
                url: "https://api.open-meteo.com/v1/forecast?latitude=32.44&longitude=34.92&hourly=wind_speed_10m,wind_direction_10m&wind_speed_unit=ms",
                priority: 2,
            },
        ],
    },
    LocationEntry {
        name: "Tel Aviv, Israel",
        timezone: Tz::Asia__Jerusalem,
        sources: &[
            ProviderSource {
                url: "https://marine-api.open-meteo.com/v1/marine?latitude=32.09&longitude=34.78&hourly=wave_height,wave_period",
                priority: 1,
            },
            ProviderSource {
                url: "https://api.open-meteo.com/v1/forecast?latitude=32.09&longitude=34.78&hourly=wind_speed_10m,wind_direction_10m&wind_speed_unit=ms",
                priority: 2,
            },
        ],
    },
    LocationEntry {
        name: "Haifa, Israel",
        timezone: Tz::Asia__Jerusalem,
        sources: &[
            ProviderSource {
                url: "https://marine-api.open-meteo.com/v1/marine?latitude=32.79&longitude=34.99&hourly=wave_height,wave_period",
                priority: 1,
            },
            ProviderSource {
                url: "https://api.open-meteo.com/v1/forecast?latitude=32.79&longitude=34.99&hourly=wind_speed_10m,wind_direction_10m&wind_speed_unit=ms",
                priority: 2,
            },
        ],
    },
    LocationEntry {
        name: "Herzliya, Israel",
        timezone: Tz::Asia__Jerusalem,
        sources: &[
            ProviderSource {
                url: "https://marine-api.open-meteo.com/v1/marine?latitude=32.16&longitude=34.81&hourly=wave_height,wave_period",
                priority: 1,
            },
            ProviderSource {
                url: "https://api.open-meteo.com/v1/forecast?latitude=32.16&longitude=34.81&hourly=wind_speed_10m,wind_direction_10m&wind_speed_unit=ms",
                priority: 2,
            },
        ],
    },
    LocationEntry {
        name: "Eilat, Israel",
        timezone: Tz::Asia__Jerusalem,
        sources: &[
            ProviderSource {
                url: "https://marine-api.open-meteo.com/v1/marine?latitude=29.56&longitude=34.95&hourly=wave_height,wave_period",
                priority: 1,
            },
            ProviderSource {
                url: "https://api.open-meteo.com/v1/forecast?latitude=29.56&longitude=34.95&hourly=wind_speed_10m,wind_direction_10m&wind_speed_unit=ms",
                priority: 2,
            },
        ],
    },
];

fn find(location: &str) -> Option<&'static LocationEntry> {
    LOCATIONS.iter().find(|entry| entry.name == location)
}

pub fn is_known(location: &str) -> bool {
    find(location).is_some()
}

pub fn timezone(location: &str) -> Option<Tz> {
    find(location).map(|entry| entry.timezone)
}

pub fn provider_sources(location: &str) -> &'static [ProviderSource] {
    find(location).map(|entry| entry.sources).unwrap_or(&[])
}

pub fn all_location_names() -> impl Iterator<Item = &'static str> {
    LOCATIONS.iter().map(|entry| entry.name)
}
