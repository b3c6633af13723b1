//! DynamoDB-backed [`SensorStore`].
//!
//! Table layout: partition key `station_id` (N), sort key `record_key` (S,
//! the composite key), plus a `station-date-index` GSI on
//! (`station_id`, `record_date`) serving the single-day lookup.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::NaiveDate;
use tracing::debug;

use super::{Page, SensorStore, StoreError};
use crate::error::EngineError;
use crate::model::{KeyRange, SensorRecord};

/// Environment variable naming the measurement table.
pub const TABLE_NAME_VAR: &str = "TABLE_NAME";
const DATE_INDEX: &str = "station-date-index";

pub struct DynamoStore {
    client: aws_sdk_dynamodb::Client,
    table: String,
}

impl DynamoStore {
    pub fn new(config: &aws_config::SdkConfig, table: String) -> Self {
        Self {
            client: aws_sdk_dynamodb::Client::new(config),
            table,
        }
    }

    /// Builds a store with the table name taken from `TABLE_NAME`.
    pub fn from_env(config: &aws_config::SdkConfig) -> Result<Self, EngineError> {
        let table = std::env::var(TABLE_NAME_VAR)
            .map_err(|_| EngineError::Configuration(TABLE_NAME_VAR))?;
        Ok(Self::new(config, table))
    }

    fn item_for(record: &SensorRecord) -> HashMap<String, AttributeValue> {
        let mut item = HashMap::from([
            (
                "station_id".to_string(),
                AttributeValue::N(record.station_id.to_string()),
            ),
            (
                "record_key".to_string(),
                AttributeValue::S(record.composite_key()),
            ),
            (
                "sensor_name".to_string(),
                AttributeValue::S(record.sensor_name.clone()),
            ),
            ("unit".to_string(), AttributeValue::S(record.unit.clone())),
            (
                "measured_time".to_string(),
                AttributeValue::S(record.measured_time.clone()),
            ),
        ]);
        if let Some(value) = record.value {
            item.insert("value".to_string(), AttributeValue::N(value.to_string()));
        }
        if let Some(window_start) = &record.time_window_start {
            item.insert(
                "time_window_start".to_string(),
                AttributeValue::S(window_start.clone()),
            );
        }
        if let Some(date) = record.measured_date() {
            item.insert(
                "record_date".to_string(),
                AttributeValue::S(date.to_string()),
            );
        }
        item
    }
}

#[async_trait]
impl SensorStore for DynamoStore {
    type Token = HashMap<String, AttributeValue>;

    async fn query_range(
        &self,
        station_id: u32,
        range: &KeyRange,
        resume: Option<Self::Token>,
    ) -> Result<Page<Self::Token>, StoreError> {
        let out = self
            .client
            .query()
            .table_name(&self.table)
            .key_condition_expression("station_id = :sid AND record_key BETWEEN :lo AND :hi")
            .expression_attribute_values(":sid", AttributeValue::N(station_id.to_string()))
            .expression_attribute_values(":lo", AttributeValue::S(range.start.clone()))
            .expression_attribute_values(":hi", AttributeValue::S(range.end.clone()))
            .set_exclusive_start_key(resume)
            .send()
            .await
            .map_err(|e| StoreError::Query(format!("{}", DisplayErrorContext(e))))?;

        let records = out
            .items
            .unwrap_or_default()
            .iter()
            .map(record_from_item)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Page {
            records,
            next: out.last_evaluated_key,
        })
    }

    async fn put_records(&self, records: &[SensorRecord]) -> Result<(), StoreError> {
        for record in records {
            self.client
                .put_item()
                .table_name(&self.table)
                .set_item(Some(Self::item_for(record)))
                .send()
                .await
                .map_err(|e| StoreError::Write(format!("{}", DisplayErrorContext(e))))?;
        }
        debug!(count = records.len(), table = %self.table, "records written");
        Ok(())
    }

    async fn query_day(
        &self,
        station_id: u32,
        date: NaiveDate,
    ) -> Result<Vec<SensorRecord>, StoreError> {
        let mut records = Vec::new();
        let mut resume: Option<Self::Token> = None;

        loop {
            let out = self
                .client
                .query()
                .table_name(&self.table)
                .index_name(DATE_INDEX)
                .key_condition_expression("station_id = :sid AND record_date = :d")
                .expression_attribute_values(":sid", AttributeValue::N(station_id.to_string()))
                .expression_attribute_values(":d", AttributeValue::S(date.to_string()))
                .set_exclusive_start_key(resume)
                .send()
                .await
                .map_err(|e| StoreError::Query(format!("{}", DisplayErrorContext(e))))?;

            for item in out.items.unwrap_or_default().iter() {
                records.push(record_from_item(item)?);
            }
            match out.last_evaluated_key {
                Some(token) => resume = Some(token),
                None => break,
            }
        }

        Ok(records)
    }
}

fn record_from_item(item: &HashMap<String, AttributeValue>) -> Result<SensorRecord, StoreError> {
    Ok(SensorRecord {
        station_id: req_n(item, "station_id")?,
        sensor_name: req_s(item, "sensor_name")?,
        unit: req_s(item, "unit")?,
        value: opt_n(item, "value")?,
        measured_time: req_s(item, "measured_time")?,
        time_window_start: opt_s(item, "time_window_start"),
    })
}

fn req_s(item: &HashMap<String, AttributeValue>, name: &str) -> Result<String, StoreError> {
    item.get(name)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| StoreError::Decode(format!("missing string attribute '{name}'")))
}

fn opt_s(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

fn req_n(item: &HashMap<String, AttributeValue>, name: &str) -> Result<u32, StoreError> {
    item.get(name)
        .and_then(|v| v.as_n().ok())
        .ok_or_else(|| StoreError::Decode(format!("missing numeric attribute '{name}'")))?
        .parse()
        .map_err(|_| StoreError::Decode(format!("attribute '{name}' is not an integer")))
}

fn opt_n(item: &HashMap<String, AttributeValue>, name: &str) -> Result<Option<f64>, StoreError> {
    match item.get(name) {
        None => Ok(None),
        Some(v) => {
            let n = v
                .as_n()
                .map_err(|_| StoreError::Decode(format!("attribute '{name}' is not numeric")))?;
            n.parse()
                .map(Some)
                .map_err(|_| StoreError::Decode(format!("attribute '{name}' is not a number")))
        }
    }
}
