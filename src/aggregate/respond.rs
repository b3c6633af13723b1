//! Output contracts for the aggregation operations.
//!
//! Field names follow the camelCase wire contract the dashboard consumes.
//! Results are assembled once and returned; nothing mutates them afterwards.

use chrono::NaiveDate;
use serde::Serialize;

use crate::aggregate::hourly::{HourlyTotals, HOURS};
use crate::aggregate::util::{avg1, avg_int};
use crate::model::{MonthWindow, SensorRecord};

/// Overall averages for one local hour.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HourlyAverage {
    pub hour: u32,
    pub traffic_count: i64,
    pub avg_speed: f64,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HourPoint {
    pub hour: u32,
    pub value: f64,
}

/// One sensor's 24-entry hourly average series.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorSeries {
    pub name: String,
    pub unit: String,
    pub hourly_data: Vec<HourPoint>,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The hourly aggregation result for one station and one trailing window.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    pub station_id: u32,
    pub period: Period,
    pub hourly_averages: Vec<HourlyAverage>,
    pub sensor_data: Vec<SensorSeries>,
}

/// The single-day lookup result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayResult {
    pub station_id: u32,
    pub date: NaiveDate,
    pub count: usize,
    pub records: Vec<SensorRecord>,
}

/// Shapes accumulated totals into the response contract.
///
/// The per-sensor view keeps only sensors that classified as traffic-count
/// or average-speed at least once, sorted by name so the response is stable
/// across runs.
pub fn assemble(station_id: u32, window: &MonthWindow, totals: &HourlyTotals) -> AggregateResult {
    let hourly_averages = (0..HOURS)
        .map(|h| HourlyAverage {
            hour: h as u32,
            traffic_count: avg_int(totals.traffic[h].sum, totals.traffic[h].count),
            avg_speed: avg1(totals.speed[h].sum, totals.speed[h].count),
        })
        .collect();

    let mut names: Vec<&String> = totals
        .per_sensor
        .keys()
        .filter(|name| totals.qualifying.contains(*name))
        .collect();
    names.sort();

    let sensor_data = names
        .into_iter()
        .map(|name| {
            let buckets = &totals.per_sensor[name];
            SensorSeries {
                name: name.clone(),
                unit: totals.units.get(name).cloned().unwrap_or_default(),
                hourly_data: (0..HOURS)
                    .map(|h| HourPoint {
                        hour: h as u32,
                        value: avg1(buckets[h].sum, buckets[h].count),
                    })
                    .collect(),
            }
        })
        .collect();

    AggregateResult {
        station_id,
        period: Period {
            start: window.start,
            end: window.end,
        },
        hourly_averages,
        sensor_data,
    }
}
