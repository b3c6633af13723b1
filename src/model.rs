//! Core data types: sensor records, composite store keys, query windows.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// One measurement emitted by one sensor at one station at one moment.
///
/// Timestamps stay as ISO-8601 strings end to end: the store's sort key
/// embeds them verbatim and range queries compare them lexicographically,
/// which orders chronologically for this format.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorRecord {
    pub station_id: u32,
    pub sensor_name: String,
    pub unit: String,
    #[serde(default)]
    pub value: Option<f64>,
    pub measured_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window_start: Option<String>,
}

impl SensorRecord {
    /// Store sort key: `station#measuredTime#sensorName`.
    ///
    /// Re-ingesting the same reading produces the same key, so writes are
    /// idempotent upserts, and per-station scans come back time-ordered.
    pub fn composite_key(&self) -> String {
        format!(
            "{}#{}#{}",
            self.station_id, self.measured_time, self.sensor_name
        )
    }

    /// The instant a record is bucketed under: the start of its measurement
    /// window when the sensor reports one, else the measurement time.
    pub fn bucket_time(&self) -> &str {
        self.time_window_start
            .as_deref()
            .unwrap_or(&self.measured_time)
    }

    /// Calendar date portion (`YYYY-MM-DD`) of the measurement time, used as
    /// the day-index attribute on write.
    pub fn measured_date(&self) -> Option<&str> {
        self.measured_time.get(..10)
    }
}

/// Sort-key bounds for one station's range scan.
#[derive(Debug, Clone)]
pub struct KeyRange {
    pub start: String,
    pub end: String,
}

/// Trailing calendar-month window the hourly aggregation runs over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthWindow {
    /// Window ending at `today` and starting one calendar month earlier.
    pub fn trailing(today: NaiveDate) -> Self {
        let start = today
            .checked_sub_months(Months::new(1))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    /// Sort-key bounds covering every record of `station_id` inside the
    /// window. The end bound carries the last representable millisecond of
    /// the end date so the range is inclusive of that whole day.
    pub fn key_range(&self, station_id: u32) -> KeyRange {
        KeyRange {
            start: format!("{}#{}", station_id, self.start),
            end: format!("{}#{}T23:59:59.999", station_id, self.end),
        }
    }
}
