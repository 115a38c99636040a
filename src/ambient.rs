//! Interface to the external day/weather simulation.
//!
//! The terrain core never interprets these values. It asks the collaborator for
//! a snapshot when a region is assembled and embeds the answer verbatim.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Current weather as reported by the weather system
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    /// Weather label, e.g. "rain"
    pub label: String,
    /// Visual/audio effect tags
    pub effects: Vec<String>,
    /// Environmental scalars (visibility, wind, traction...)
    pub environment: BTreeMap<String, f32>,
}

/// Current time of day as reported by the day cycle
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeOfDaySnapshot {
    /// Phase label, e.g. "dusk"
    pub phase: String,
    /// Sun elevation, -1.0 (nadir) to 1.0 (zenith)
    pub sun_height: f32,
    /// Ambient light multiplier
    pub ambient_light: f32,
}

/// Both snapshots, as embedded in a generated region
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AmbientSnapshot {
    pub weather: WeatherSnapshot,
    pub time_of_day: TimeOfDaySnapshot,
}

/// Supplier of ambient snapshots
pub trait AmbientSource: Send + Sync {
    fn weather(&self) -> WeatherSnapshot;
    fn time_of_day(&self) -> TimeOfDaySnapshot;

    /// Capture both snapshots at once
    fn snapshot(&self) -> AmbientSnapshot {
        AmbientSnapshot {
            weather: self.weather(),
            time_of_day: self.time_of_day(),
        }
    }
}

/// Fixed ambient values, for tools and tests
#[derive(Clone, Debug, PartialEq)]
pub struct StaticAmbient {
    pub weather: WeatherSnapshot,
    pub time_of_day: TimeOfDaySnapshot,
}

impl StaticAmbient {
    pub fn new(weather: WeatherSnapshot, time_of_day: TimeOfDaySnapshot) -> Self {
        Self { weather, time_of_day }
    }
}

impl Default for StaticAmbient {
    /// Clear midday
    fn default() -> Self {
        let mut environment = BTreeMap::new();
        environment.insert("visibility".to_string(), 1.0);
        environment.insert("wind".to_string(), 0.1);
        Self {
            weather: WeatherSnapshot {
                label: "clear".to_string(),
                effects: Vec::new(),
                environment,
            },
            time_of_day: TimeOfDaySnapshot {
                phase: "day".to_string(),
                sun_height: 1.0,
                ambient_light: 1.0,
            },
        }
    }
}

impl AmbientSource for StaticAmbient {
    fn weather(&self) -> WeatherSnapshot {
        self.weather.clone()
    }

    fn time_of_day(&self) -> TimeOfDaySnapshot {
        self.time_of_day.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_passes_values_through() {
        let source = StaticAmbient::new(
            WeatherSnapshot {
                label: "sandstorm".to_string(),
                effects: vec!["dust_particles".to_string()],
                environment: BTreeMap::new(),
            },
            TimeOfDaySnapshot {
                phase: "dusk".to_string(),
                sun_height: 0.1,
                ambient_light: 0.4,
            },
        );
        let snapshot = source.snapshot();
        assert_eq!(snapshot.weather, source.weather);
        assert_eq!(snapshot.time_of_day, source.time_of_day);
    }
}
