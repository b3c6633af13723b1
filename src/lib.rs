//! Collection and hourly aggregation of roadside traffic sensor
//! measurements.
//!
//! Readings flow from the upstream measurement API ([`station_api`],
//! [`ingest`]) into a partitioned sorted store ([`store`]), and out through
//! the aggregation engine ([`aggregate`]): a paginated range fetch over a
//! trailing calendar month, local-hour resolution under an explicit DST rule
//! ([`localtime`]), semantic sensor classification ([`classify`]), and
//! NaN-free hourly averaging.

pub mod aggregate;
pub mod classify;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod localtime;
pub mod model;
pub mod station_api;
pub mod store;
