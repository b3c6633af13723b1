//! The engine's two read operations: trailing-month hourly averages and the
//! single-day lookup.

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;

use crate::aggregate::hourly::aggregate_records;
use crate::aggregate::respond::{assemble, AggregateResult, DayResult};
use crate::error::EngineError;
use crate::localtime::HourResolver;
use crate::model::MonthWindow;
use crate::store::{fetch_window, SensorStore};

/// Inbound request for the read operations. The station comes in optional
/// because the transport may omit it; validation names the missing field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationRequest {
    pub station_id: Option<u32>,
}

impl StationRequest {
    pub fn station(station_id: u32) -> Self {
        Self {
            station_id: Some(station_id),
        }
    }

    fn validated(&self) -> Result<u32, EngineError> {
        self.station_id.ok_or(EngineError::Validation("stationId"))
    }
}

/// Computes per-local-hour averages for one station over the trailing
/// calendar month ending at `today`.
///
/// Single pass, read-only: range-fetch the window to completion, bucket by
/// sensor and local hour, assemble the contract. `today` is a parameter so
/// the whole operation is a pure function of its inputs.
pub async fn hourly_averages<S: SensorStore>(
    store: &S,
    resolver: &HourResolver,
    request: &StationRequest,
    today: NaiveDate,
) -> Result<AggregateResult, EngineError> {
    let station_id = request.validated()?;
    let window = MonthWindow::trailing(today);

    let records = fetch_window(store, station_id, &window.key_range(station_id)).await?;
    info!(
        station_id,
        start = %window.start,
        end = %window.end,
        records = records.len(),
        "aggregating window"
    );

    let totals = aggregate_records(&records, resolver);
    Ok(assemble(station_id, &window, &totals))
}

/// Returns every stored record for one station on one calendar date.
pub async fn day_lookup<S: SensorStore>(
    store: &S,
    request: &StationRequest,
    date: NaiveDate,
) -> Result<DayResult, EngineError> {
    let station_id = request.validated()?;
    let records = store.query_day(station_id, date).await?;
    info!(station_id, %date, records = records.len(), "day lookup");

    Ok(DayResult {
        station_id,
        date,
        count: records.len(),
        records,
    })
}
