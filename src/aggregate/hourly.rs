//! Hourly bucket accumulation over a window of sensor records.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::classify::{classify, SensorCategory};
use crate::localtime::HourResolver;
use crate::model::SensorRecord;

pub const HOURS: usize = 24;

/// Running sum and data-point count for one local hour of one series.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HourBucket {
    pub sum: f64,
    pub count: u32,
}

impl HourBucket {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }
}

/// Everything one pass over the records produces: per-sensor series plus the
/// two overall series. The overall traffic and speed buckets carry their own
/// counts, so each category's average divides only by its own data points.
#[derive(Debug, Default)]
pub struct HourlyTotals {
    pub per_sensor: HashMap<String, [HourBucket; HOURS]>,
    /// Unit per sensor name, from the first record observed bearing it.
    pub units: HashMap<String, String>,
    /// Sensor names classified as traffic-count or average-speed at least
    /// once; only these appear in the per-sensor output.
    pub qualifying: HashSet<String>,
    pub traffic: [HourBucket; HOURS],
    pub speed: [HourBucket; HOURS],
}

/// Groups records by sensor name and local hour in a single pass.
///
/// A record with a missing or zero value contributes to nothing. A record
/// whose bucket timestamp does not parse is dropped the same way. Buckets
/// for all 24 hours of a newly seen sensor are pre-created at zero, so hours
/// without data still report 0 downstream rather than going missing.
pub fn aggregate_records(records: &[SensorRecord], resolver: &HourResolver) -> HourlyTotals {
    let mut totals = HourlyTotals::default();

    for record in records {
        let value = match record.value {
            Some(v) if v != 0.0 => v,
            _ => continue,
        };

        let stamp = record.bucket_time();
        let Some(hour) = resolver.local_hour(stamp) else {
            debug!(
                sensor = %record.sensor_name,
                stamp,
                "skipping record with unparseable timestamp"
            );
            continue;
        };
        let hour = hour as usize;

        let buckets = match totals.per_sensor.entry(record.sensor_name.clone()) {
            Entry::Vacant(slot) => {
                totals
                    .units
                    .insert(record.sensor_name.clone(), record.unit.clone());
                slot.insert([HourBucket::default(); HOURS])
            }
            Entry::Occupied(slot) => slot.into_mut(),
        };
        buckets[hour].add(value);

        match classify(&record.sensor_name, &record.unit) {
            SensorCategory::TrafficCount => {
                totals.traffic[hour].add(value);
                totals.qualifying.insert(record.sensor_name.clone());
            }
            SensorCategory::AverageSpeed => {
                totals.speed[hour].add(value);
                totals.qualifying.insert(record.sensor_name.clone());
            }
            SensorCategory::Other => {}
        }
    }

    totals
}
