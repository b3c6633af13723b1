//! Semantic classification of sensor readings.
//!
//! Roadside stations expose dozens of sensors; only two families feed the
//! overall hourly series: vehicle-pass counts and mean speeds. Everything
//! else is carried through per-sensor aggregation but dropped from the
//! response.

/// Name substring marking vehicle-pass count sensors.
pub const TRAFFIC_COUNT_MARKER: &str = "OHITUKSET";
/// Name substring marking mean-speed sensors.
pub const AVG_SPEED_MARKER: &str = "KESKINOPEUS";
/// Unit string for vehicles per hour.
pub const VEHICLES_PER_HOUR: &str = "kpl/h";
/// Unit string for kilometers per hour.
pub const KILOMETERS_PER_HOUR: &str = "km/h";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorCategory {
    TrafficCount,
    AverageSpeed,
    Other,
}

/// Classifies a sensor by name and unit. Matching is case-sensitive:
/// substring on the name, exact on the unit.
pub fn classify(name: &str, unit: &str) -> SensorCategory {
    if name.contains(TRAFFIC_COUNT_MARKER) && unit == VEHICLES_PER_HOUR {
        SensorCategory::TrafficCount
    } else if name.contains(AVG_SPEED_MARKER) && unit == KILOMETERS_PER_HOUR {
        SensorCategory::AverageSpeed
    } else {
        SensorCategory::Other
    }
}
