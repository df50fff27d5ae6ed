// =============================================================================
// stokis — Indicator & Forecast Pipeline CLI
// =============================================================================
//
// Loads a daily OHLCV series (from a CSV file, or a deterministic synthetic
// demo series when none is given), builds the feature matrix, trains the
// forecaster, and prints the prediction report as JSON.
// =============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stokis_engine::{
    forecast, FeatureMatrix, Forecast, OhlcvBar, OhlcvSeries, PipelineConfig, FEATURE_COLUMNS,
};

/// One CSV row: `date,open,high,low,close,volume` with an ISO date.
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

fn load_csv(path: &Path, symbol: &str) -> anyhow::Result<OhlcvSeries> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut bars = Vec::new();
    for row in reader.deserialize() {
        let row: CsvRow = row?;
        bars.push(OhlcvBar {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        });
    }
    Ok(OhlcvSeries::new(symbol, bars)?)
}

/// Deterministic drifting sinusoid used when no CSV is supplied, so the
/// binary always has something to run against.
fn demo_series(symbol: &str, n: usize) -> anyhow::Result<OhlcvSeries> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).ok_or_else(|| anyhow::anyhow!("bad date"))?;
    let bars = (0..n)
        .map(|i| {
            let close = 180.0 + (i as f64 * 0.13).sin() * 15.0 + i as f64 * 0.08;
            OhlcvBar {
                date: start + chrono::Days::new(i as u64),
                open: close - 0.6,
                high: close + 1.8,
                low: close - 2.0,
                close,
                volume: 50_000.0 + (i as f64 * 37.0) % 1_500.0,
            }
        })
        .collect();
    Ok(OhlcvSeries::new(symbol, bars)?)
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    symbol: &'a str,
    rows: usize,
    features: &'a [&'a str],
    predictions: &'a [stokis_engine::PredictionRecord],
    metrics: &'a stokis_engine::ForecastMetrics,
    training: &'a stokis_engine::TrainingReport,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = PipelineConfig::load("pipeline_config.json").unwrap_or_else(|e| {
        warn!(error = %e, "failed to load config, using defaults");
        PipelineConfig::default()
    });

    // Env overrides.
    if let Ok(lookback) = std::env::var("STOKIS_LOOKBACK") {
        config.lookback = lookback.parse()?;
    }
    if let Ok(horizon) = std::env::var("STOKIS_HORIZON") {
        config.horizon_days = horizon.parse()?;
    }
    let symbol = std::env::var("STOKIS_SYMBOL").unwrap_or_else(|_| "DEMO".to_string());

    let series = match std::env::var("STOKIS_CSV") {
        Ok(path) => {
            info!(path, symbol, "loading series from CSV");
            load_csv(Path::new(&path), &symbol)?
        }
        Err(_) => {
            info!(symbol, "no STOKIS_CSV set, using synthetic demo series");
            demo_series(&symbol, 400)?
        }
    };
    info!(bars = series.len(), "series loaded");

    let matrix = FeatureMatrix::from_series(&series)?;
    info!(
        rows = matrix.rows(),
        features = matrix.n_features(),
        "feature matrix built"
    );

    let Forecast {
        predictions,
        metrics,
        training,
    } = forecast(&matrix, &config)?;

    let report = Report {
        symbol: series.symbol(),
        rows: matrix.rows(),
        features: &FEATURE_COLUMNS,
        predictions: &predictions,
        metrics: &metrics,
        training: &training,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
