//! Scheduled collection: poll stations, persist readings idempotently.
//!
//! Each round polls every configured station concurrently (bounded by a
//! semaphore) and writes the readings through the store's composite-key
//! upsert. A failing station is logged and skipped; it never aborts the
//! round.

use std::sync::Arc;

use anyhow::Result;
use tracing::{error, info, Instrument};

use crate::station_api::StationApi;
use crate::store::SensorStore;

pub struct CollectOptions {
    /// Seconds between rounds.
    pub sample_rate: u64,
    /// Number of rounds; 0 means run until interrupted.
    pub num_samples: usize,
    /// Maximum concurrent station polls.
    pub concurrency: usize,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            sample_rate: 300,
            num_samples: 1,
            concurrency: 5,
        }
    }
}

pub async fn collect<A, S>(
    api: Arc<A>,
    store: Arc<S>,
    stations: Vec<u32>,
    opts: CollectOptions,
) -> Result<()>
where
    A: StationApi + Send + Sync + 'static,
    S: SensorStore + 'static,
{
    if opts.num_samples == 0 {
        info!(sample_rate = opts.sample_rate, "sampling until interrupted");
    } else {
        info!(
            num_samples = opts.num_samples,
            sample_rate = opts.sample_rate,
            "starting collection"
        );
    }

    let semaphore = Arc::new(tokio::sync::Semaphore::new(opts.concurrency));
    let mut sample_count = 0;

    loop {
        if opts.num_samples > 0 && sample_count >= opts.num_samples {
            break;
        }
        sample_count += 1;

        info!(sample = sample_count, stations = stations.len(), "starting round");

        let mut tasks = Vec::new();
        for &station_id in &stations {
            let sem = semaphore.clone();
            let api = api.clone();
            let store = store.clone();

            let span = tracing::info_span!("poll_station", station_id);
            tasks.push(tokio::spawn(
                async move {
                    let _permit = sem.acquire().await.expect("semaphore never closed");

                    match poll_station(api.as_ref(), store.as_ref(), station_id).await {
                        Ok(written) => info!(written, "station collected"),
                        Err(e) => error!(error = %e, "station poll failed"),
                    }
                }
                .instrument(span),
            ));
        }

        for task in tasks {
            let _ = task.await;
        }

        if opts.num_samples == 0 || sample_count < opts.num_samples {
            info!(sample_rate = opts.sample_rate, "waiting before next round");
            tokio::time::sleep(tokio::time::Duration::from_secs(opts.sample_rate)).await;
        }
    }

    info!("collection finished");
    Ok(())
}

async fn poll_station<A: StationApi, S: SensorStore>(
    api: &A,
    store: &S,
    station_id: u32,
) -> Result<usize> {
    let records = api.station_data(station_id).await?;
    store.put_records(&records).await?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{KeyRange, SensorRecord};
    use crate::store::{Page, StoreError};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    struct FakeApi;

    #[async_trait]
    impl StationApi for FakeApi {
        async fn station_data(&self, station_id: u32) -> Result<Vec<SensorRecord>> {
            if station_id == 500 {
                anyhow::bail!("station offline");
            }
            Ok(vec![SensorRecord {
                station_id,
                sensor_name: "OHITUKSET_60MIN".to_string(),
                unit: "kpl/h".to_string(),
                value: Some(10.0),
                measured_time: "2024-05-01T10:00:00Z".to_string(),
                time_window_start: None,
            }])
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        written: Mutex<Vec<SensorRecord>>,
    }

    #[async_trait]
    impl SensorStore for RecordingStore {
        type Token = ();

        async fn query_range(
            &self,
            _station_id: u32,
            _range: &KeyRange,
            _resume: Option<()>,
        ) -> Result<Page<()>, StoreError> {
            Ok(Page {
                records: Vec::new(),
                next: None,
            })
        }

        async fn put_records(&self, records: &[SensorRecord]) -> Result<(), StoreError> {
            self.written.lock().unwrap().extend_from_slice(records);
            Ok(())
        }

        async fn query_day(
            &self,
            _station_id: u32,
            _date: NaiveDate,
        ) -> Result<Vec<SensorRecord>, StoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_one_round_writes_every_station() {
        let store = Arc::new(RecordingStore::default());
        collect(
            Arc::new(FakeApi),
            store.clone(),
            vec![1001, 1002, 1003],
            CollectOptions {
                sample_rate: 0,
                num_samples: 1,
                concurrency: 2,
            },
        )
        .await
        .unwrap();

        let written = store.written.lock().unwrap();
        let mut stations: Vec<_> = written.iter().map(|r| r.station_id).collect();
        stations.sort();
        assert_eq!(stations, vec![1001, 1002, 1003]);
    }

    #[tokio::test]
    async fn test_failing_station_does_not_abort_round() {
        let store = Arc::new(RecordingStore::default());
        collect(
            Arc::new(FakeApi),
            store.clone(),
            vec![1001, 500, 1003],
            CollectOptions {
                sample_rate: 0,
                num_samples: 1,
                concurrency: 5,
            },
        )
        .await
        .unwrap();

        let written = store.written.lock().unwrap();
        assert_eq!(written.len(), 2);
        assert!(written.iter().all(|r| r.station_id != 500));
    }
}
