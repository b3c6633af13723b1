//! End-to-end aggregation over an in-memory paginated store.

use async_trait::async_trait;
use chrono::NaiveDate;

use tms_stats::aggregate::{hourly_averages, StationRequest};
use tms_stats::localtime::HourResolver;
use tms_stats::model::{KeyRange, SensorRecord};
use tms_stats::store::{Page, SensorStore, StoreError};

/// Serves records sorted by composite key in fixed-size pages, the way the
/// real partitioned store does.
struct PagedStore {
    records: Vec<SensorRecord>,
    page_size: usize,
}

impl PagedStore {
    fn new(mut records: Vec<SensorRecord>, page_size: usize) -> Self {
        records.sort_by_key(|r| r.composite_key());
        Self { records, page_size }
    }
}

#[async_trait]
impl SensorStore for PagedStore {
    type Token = usize;

    async fn query_range(
        &self,
        station_id: u32,
        range: &KeyRange,
        resume: Option<usize>,
    ) -> Result<Page<usize>, StoreError> {
        let matching: Vec<_> = self
            .records
            .iter()
            .filter(|r| {
                let key = r.composite_key();
                r.station_id == station_id && range.start <= key && key <= range.end
            })
            .cloned()
            .collect();

        let offset = resume.unwrap_or(0);
        let chunk: Vec<_> = matching
            .iter()
            .skip(offset)
            .take(self.page_size)
            .cloned()
            .collect();
        let consumed = offset + chunk.len();
        let next = (consumed < matching.len()).then_some(consumed);
        Ok(Page {
            records: chunk,
            next,
        })
    }

    async fn put_records(&self, _records: &[SensorRecord]) -> Result<(), StoreError> {
        Ok(())
    }

    async fn query_day(
        &self,
        station_id: u32,
        date: NaiveDate,
    ) -> Result<Vec<SensorRecord>, StoreError> {
        let date_str = date.to_string();
        Ok(self
            .records
            .iter()
            .filter(|r| r.station_id == station_id && r.measured_date() == Some(date_str.as_str()))
            .cloned()
            .collect())
    }
}

fn record(
    station_id: u32,
    sensor: &str,
    unit: &str,
    value: Option<f64>,
    stamp: &str,
) -> SensorRecord {
    SensorRecord {
        station_id,
        sensor_name: sensor.to_string(),
        unit: unit.to_string(),
        value,
        measured_time: stamp.to_string(),
        time_window_start: None,
    }
}

/// One traffic-count reading of 100 and one speed reading of 60 for every
/// hour of every day of May 2024, plus noise the engine must ignore.
fn may_2024_records() -> Vec<SensorRecord> {
    let mut records = Vec::new();
    for day in 1..=31 {
        for hour in 0..24 {
            let stamp = format!("2024-05-{day:02}T{hour:02}:00:00Z");
            records.push(record(1001, "OHITUKSET_60MIN", "kpl/h", Some(100.0), &stamp));
            records.push(record(1001, "KESKINOPEUS_60MIN", "km/h", Some(60.0), &stamp));
        }
    }

    // Noise: an unrelated sensor, zero and missing values, an out-of-window
    // record, and a neighboring station.
    records.push(record(1001, "ILMA_LAMPOTILA", "°C", Some(12.5), "2024-05-10T09:00:00Z"));
    records.push(record(1001, "OHITUKSET_60MIN", "kpl/h", Some(0.0), "2024-05-10T09:00:00Z"));
    records.push(record(1001, "KESKINOPEUS_60MIN", "km/h", None, "2024-05-10T09:00:00Z"));
    records.push(record(1001, "OHITUKSET_60MIN", "kpl/h", Some(9999.0), "2024-04-29T09:00:00Z"));
    records.push(record(2002, "OHITUKSET_60MIN", "kpl/h", Some(9999.0), "2024-05-10T09:00:00Z"));
    records
}

fn today() -> NaiveDate {
    // Trailing window 2024-05-01 .. 2024-06-01; all records sit in May.
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

#[tokio::test]
async fn test_flat_month_aggregates_flat() {
    let store = PagedStore::new(may_2024_records(), 100);
    let result = hourly_averages(
        &store,
        &HourResolver::new(),
        &StationRequest::station(1001),
        today(),
    )
    .await
    .unwrap();

    assert_eq!(result.station_id, 1001);
    assert_eq!(result.period.start, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
    assert_eq!(result.period.end, today());

    assert_eq!(result.hourly_averages.len(), 24);
    for avg in &result.hourly_averages {
        assert_eq!(avg.traffic_count, 100, "hour {}", avg.hour);
        assert_eq!(avg.avg_speed, 60.0, "hour {}", avg.hour);
    }

    // Exactly the two qualifying series; the temperature sensor is dropped.
    let names: Vec<_> = result.sensor_data.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["KESKINOPEUS_60MIN", "OHITUKSET_60MIN"]);

    for series in &result.sensor_data {
        assert_eq!(series.hourly_data.len(), 24);
        let expected = if series.name == "OHITUKSET_60MIN" { 100.0 } else { 60.0 };
        for point in &series.hourly_data {
            assert_eq!(point.value, expected, "{} hour {}", series.name, point.hour);
        }
    }

    assert_eq!(
        result.sensor_data[0].unit, "km/h",
        "unit comes from the records"
    );
    assert_eq!(result.sensor_data[1].unit, "kpl/h");
}

#[tokio::test]
async fn test_result_is_independent_of_page_size() {
    let records = may_2024_records();
    let mut serialized = Vec::new();

    for page_size in [7, 100, 5000] {
        let store = PagedStore::new(records.clone(), page_size);
        let result = hourly_averages(
            &store,
            &HourResolver::new(),
            &StationRequest::station(1001),
            today(),
        )
        .await
        .unwrap();
        serialized.push(serde_json::to_string(&result).unwrap());
    }

    assert_eq!(serialized[0], serialized[1]);
    assert_eq!(serialized[1], serialized[2]);
}

#[tokio::test]
async fn test_zero_value_does_not_lower_average() {
    // Two real readings and one zero reading in the same hour: the zero
    // neither lowers the average nor increments the count.
    let records = vec![
        record(1001, "OHITUKSET_60MIN", "kpl/h", Some(10.0), "2024-05-10T09:00:00Z"),
        record(1001, "OHITUKSET_60MIN", "kpl/h", Some(20.0), "2024-05-10T09:10:00Z"),
        record(1001, "OHITUKSET_60MIN", "kpl/h", Some(0.0), "2024-05-10T09:20:00Z"),
    ];
    let store = PagedStore::new(records, 10);
    let result = hourly_averages(
        &store,
        &HourResolver::new(),
        &StationRequest::station(1001),
        today(),
    )
    .await
    .unwrap();

    // May is daylight saving: 09 UTC is local hour 12.
    assert_eq!(result.hourly_averages[12].traffic_count, 15);
    let series = &result.sensor_data[0];
    assert_eq!(series.hourly_data[12].value, 15.0);
    // Hours without data report zero, not NaN or absence.
    assert_eq!(series.hourly_data[3].value, 0.0);
    assert_eq!(result.hourly_averages[3].traffic_count, 0);
    assert_eq!(result.hourly_averages[3].avg_speed, 0.0);
}

#[tokio::test]
async fn test_speed_and_traffic_counts_stay_independent() {
    // An hour with only traffic data and an hour with only speed data.
    let records = vec![
        record(1001, "OHITUKSET_60MIN", "kpl/h", Some(100.0), "2024-05-10T06:00:00Z"),
        record(1001, "KESKINOPEUS_60MIN", "km/h", Some(80.0), "2024-05-10T15:00:00Z"),
    ];
    let store = PagedStore::new(records, 10);
    let result = hourly_averages(
        &store,
        &HourResolver::new(),
        &StationRequest::station(1001),
        today(),
    )
    .await
    .unwrap();

    assert_eq!(result.hourly_averages[9].traffic_count, 100);
    assert_eq!(result.hourly_averages[9].avg_speed, 0.0);
    assert_eq!(result.hourly_averages[18].traffic_count, 0);
    assert_eq!(result.hourly_averages[18].avg_speed, 80.0);
}
