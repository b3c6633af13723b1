//! Time-series store abstraction and the paginated range fetch.
//!
//! [`SensorStore`] is the async seam over the partitioned sorted table.
//! [`fetch_window`] drives its range query to completion across continuation
//! tokens. [`dynamo::DynamoStore`] is the production implementation.

pub mod dynamo;

pub use dynamo::DynamoStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::model::{KeyRange, SensorRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("range query failed: {0}")]
    Query(String),
    #[error("write failed: {0}")]
    Write(String),
    #[error("malformed stored item: {0}")]
    Decode(String),
}

/// One page of a range query plus the token for the next page, if any.
pub struct Page<T> {
    pub records: Vec<SensorRecord>,
    pub next: Option<T>,
}

/// The partitioned time-series store. Records partition by station and sort
/// by composite key, so range scans return chronological order per station.
#[async_trait]
pub trait SensorStore: Send + Sync {
    /// Opaque continuation token between pages of one range query.
    type Token: Send;

    /// Returns one page of records whose composite key lies in `range`,
    /// resuming after `resume` when given.
    async fn query_range(
        &self,
        station_id: u32,
        range: &KeyRange,
        resume: Option<Self::Token>,
    ) -> Result<Page<Self::Token>, StoreError>;

    /// Upserts records keyed by their composite key; re-ingesting the same
    /// reading overwrites rather than duplicates.
    async fn put_records(&self, records: &[SensorRecord]) -> Result<(), StoreError>;

    /// Returns every record of `station_id` measured on `date`, via the
    /// day index, exhausting pagination internally.
    async fn query_day(
        &self,
        station_id: u32,
        date: NaiveDate,
    ) -> Result<Vec<SensorRecord>, StoreError>;
}

/// Fetches every record of `station_id` inside `range`, following
/// continuation tokens until the store reports none.
///
/// Pages are requested strictly sequentially (each token comes from the
/// previous page) and concatenated in order, so the result is complete and
/// chronological regardless of the store's page size. Any page error aborts
/// the whole fetch; pages already received are discarded with it.
pub async fn fetch_window<S: SensorStore>(
    store: &S,
    station_id: u32,
    range: &KeyRange,
) -> Result<Vec<SensorRecord>, StoreError> {
    let mut records = Vec::new();
    let mut resume = None;
    let mut pages = 0u32;

    loop {
        let page = store.query_range(station_id, range, resume).await?;
        pages += 1;
        records.extend(page.records);
        match page.next {
            Some(token) => resume = Some(token),
            None => break,
        }
    }

    tracing::debug!(station_id, pages, records = records.len(), "range fetch complete");
    Ok(records)
}
