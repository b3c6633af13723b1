//! CLI entry point for the roadside sensor statistics service.
//!
//! Provides subcommands for collecting station readings into the store, for
//! the trailing-month hourly aggregation, and for the single-day lookup.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use tms_stats::aggregate::{day_lookup, hourly_averages, StationRequest};
use tms_stats::error::EngineError;
use tms_stats::ingest::{collect, CollectOptions};
use tms_stats::localtime::HourResolver;
use tms_stats::station_api::RoadsideApiClient;
use tms_stats::store::DynamoStore;

#[derive(Parser)]
#[command(name = "tms_stats")]
#[command(about = "Collect and aggregate roadside traffic sensor measurements", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Poll stations and persist their readings to the store
    Collect {
        /// Station identifiers to poll
        #[arg(value_name = "STATION_ID", required = true)]
        stations: Vec<u32>,

        /// Sample rate: poll each station every X seconds
        #[arg(short = 'r', long, default_value_t = 300)]
        sample_rate: u64,

        /// Number of rounds to collect (0 = infinite)
        #[arg(short = 'n', long, default_value_t = 1)]
        num_samples: usize,

        /// Maximum number of concurrent station polls
        #[arg(short, long, default_value_t = 5)]
        concurrency: usize,
    },
    /// Hourly averages for a station over the trailing calendar month
    Hourly {
        /// Station identifier
        station: u32,
    },
    /// All stored readings for a station on one calendar date
    Day {
        /// Station identifier
        station: u32,

        /// Date to look up (YYYY-MM-DD)
        date: NaiveDate,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/tms_stats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("tms_stats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Collect {
            stations,
            sample_rate,
            num_samples,
            concurrency,
        } => {
            let config = aws_config::load_from_env().await;
            let store = Arc::new(match DynamoStore::from_env(&config) {
                Ok(store) => store,
                Err(e) => return fail(e),
            });
            let api = Arc::new(RoadsideApiClient::from_env());

            collect(
                api,
                store,
                stations,
                CollectOptions {
                    sample_rate,
                    num_samples,
                    concurrency,
                },
            )
            .await?;
        }
        Commands::Hourly { station } => {
            let result = run_hourly(station).await;
            emit(result)?;
        }
        Commands::Day { station, date } => {
            let result = run_day(station, date).await;
            emit(result)?;
        }
    }

    Ok(())
}

async fn run_hourly(station: u32) -> Result<tms_stats::aggregate::AggregateResult, EngineError> {
    let config = aws_config::load_from_env().await;
    let store = DynamoStore::from_env(&config)?;
    let resolver = HourResolver::new();
    let today = Utc::now().date_naive();

    hourly_averages(&store, &resolver, &StationRequest::station(station), today).await
}

async fn run_day(
    station: u32,
    date: NaiveDate,
) -> Result<tms_stats::aggregate::DayResult, EngineError> {
    let config = aws_config::load_from_env().await;
    let store = DynamoStore::from_env(&config)?;

    day_lookup(&store, &StationRequest::station(station), date).await
}

/// Prints a successful result as pretty JSON, or the structured failure
/// body for an engine error.
fn emit<T: Serialize>(result: Result<T, EngineError>) -> Result<()> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            info!("request complete");
            Ok(())
        }
        Err(e) => fail(e),
    }
}

fn fail(e: EngineError) -> Result<()> {
    error!(kind = e.kind(), error = %e, "request failed");
    let body = serde_json::json!({ "error": e.body() });
    println!("{}", serde_json::to_string_pretty(&body)?);
    std::process::exit(if e.is_caller_error() { 2 } else { 1 });
}
