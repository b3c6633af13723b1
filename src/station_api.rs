//! Client for the upstream roadside measurement API.
//!
//! One station's data endpoint returns a JSON document with a
//! `sensorValues` array; each entry carries the sensor name, unit, value and
//! measurement timestamps. Only the needed fields are extracted, everything
//! else in the payload is ignored.

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::fetch::{fetch_json, BasicClient, HttpClient};
use crate::model::SensorRecord;

/// Environment variable overriding the measurement API base URL.
pub const API_URL_VAR: &str = "SENSOR_API_URL";
const DEFAULT_BASE_URL: &str = "https://tie.digitraffic.fi/api/tms/v1";

/// Abstraction over the upstream measurement source.
#[async_trait::async_trait]
pub trait StationApi {
    /// Returns the station's current sensor readings.
    async fn station_data(&self, station_id: u32) -> Result<Vec<SensorRecord>>;
}

pub struct RoadsideApiClient<C = BasicClient> {
    base_url: String,
    client: C,
}

impl RoadsideApiClient<BasicClient> {
    /// Client against `SENSOR_API_URL`, falling back to the public API.
    pub fn from_env() -> Self {
        let base_url =
            std::env::var(API_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url, BasicClient::new())
    }
}

impl<C: HttpClient> RoadsideApiClient<C> {
    pub fn new(base_url: impl Into<String>, client: C) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }
}

#[async_trait::async_trait]
impl<C: HttpClient> StationApi for RoadsideApiClient<C> {
    async fn station_data(&self, station_id: u32) -> Result<Vec<SensorRecord>> {
        let url = format!("{}/stations/{}/data", self.base_url, station_id);
        let body = fetch_json(&self.client, &url).await?;
        parse_station_data(station_id, &body)
    }
}

/// Extracts sensor records from a station data document.
///
/// Entries without a name, unit or measurement time are dropped; an absent
/// value is kept as `None` (the aggregation layer decides what to do with
/// it).
pub fn parse_station_data(station_id: u32, body: &Value) -> Result<Vec<SensorRecord>> {
    let values = body["sensorValues"]
        .as_array()
        .ok_or_else(|| anyhow!("station {station_id}: response has no sensorValues array"))?;

    let records = values
        .iter()
        .filter_map(|entry| {
            let sensor_name = entry["name"].as_str()?.to_string();
            let unit = entry["unit"].as_str()?.to_string();
            let measured_time = entry["measuredTime"].as_str()?.to_string();
            let value = entry["value"].as_f64();
            let time_window_start = entry["timeWindowStart"].as_str().map(|s| s.to_string());

            Some(SensorRecord {
                station_id,
                sensor_name,
                unit,
                value,
                measured_time,
                time_window_start,
            })
        })
        .collect();

    Ok(records)
}
