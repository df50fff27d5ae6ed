// =============================================================================
// OHLCV time series
// =============================================================================
//
// The normalized input of the pipeline: date-indexed Open/High/Low/Close/
// Volume records, strictly increasing by date, no duplicates, all values
// finite.  A series is validated once at construction and immutable after
// that; every downstream stage can rely on the invariants without
// re-checking.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// A single daily OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcvBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl OhlcvBar {
    /// Typical price used by volume-weighted indicators.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// A validated, chronologically ordered OHLCV series for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OhlcvSeries {
    symbol: String,
    bars: Vec<OhlcvBar>,
}

impl OhlcvSeries {
    /// Build a series, validating ordering and finiteness.
    ///
    /// Errors:
    /// - `InvalidSymbol` when `bars` is empty (an empty upstream response).
    /// - `InvalidSeries` when dates are not strictly increasing or any value
    ///   is non-finite.
    pub fn new(symbol: impl Into<String>, bars: Vec<OhlcvBar>) -> Result<Self> {
        let symbol = symbol.into();
        if bars.is_empty() {
            return Err(PipelineError::InvalidSymbol(symbol));
        }

        for (i, bar) in bars.iter().enumerate() {
            let values = [bar.open, bar.high, bar.low, bar.close, bar.volume];
            if values.iter().any(|v| !v.is_finite()) {
                return Err(PipelineError::InvalidSeries(format!(
                    "non-finite value at row {i} ({})",
                    bar.date
                )));
            }
            if i > 0 && bars[i - 1].date >= bar.date {
                return Err(PipelineError::InvalidSeries(format!(
                    "dates not strictly increasing at row {i} ({} -> {})",
                    bars[i - 1].date,
                    bar.date
                )));
            }
        }

        Ok(Self { symbol, bars })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[OhlcvBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.open).collect()
    }

    pub fn highs(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.high).collect()
    }

    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }
}

/// Collaborator interface for raw series retrieval.
///
/// The pipeline core performs no I/O itself; callers supply a source that
/// resolves a ticker symbol and a period string (e.g. `"1y"`, `"6mo"`) to a
/// sorted series.  Retries, if any, belong to the implementation — the core
/// never retries.
pub trait MarketDataSource {
    fn fetch(&self, symbol: &str, period: &str) -> Result<OhlcvSeries>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> OhlcvBar {
        let date = date.parse().unwrap();
        OhlcvBar {
            date,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000.0,
        }
    }

    #[test]
    fn empty_series_is_invalid_symbol() {
        let err = OhlcvSeries::new("ZZZZ", vec![]).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSymbol(_)));
    }

    #[test]
    fn unsorted_dates_rejected() {
        let bars = vec![bar("2024-01-02", 10.0), bar("2024-01-01", 11.0)];
        let err = OhlcvSeries::new("AAPL", bars).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidSeries(_)));
    }

    #[test]
    fn duplicate_dates_rejected() {
        let bars = vec![bar("2024-01-01", 10.0), bar("2024-01-01", 11.0)];
        assert!(OhlcvSeries::new("AAPL", bars).is_err());
    }

    #[test]
    fn non_finite_values_rejected() {
        let mut b = bar("2024-01-01", 10.0);
        b.volume = f64::NAN;
        assert!(OhlcvSeries::new("AAPL", vec![b]).is_err());
    }

    #[test]
    fn valid_series_accessors() {
        let bars = vec![bar("2024-01-01", 10.0), bar("2024-01-02", 12.0)];
        let series = OhlcvSeries::new("AAPL", bars).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![10.0, 12.0]);
        assert_eq!(series.symbol(), "AAPL");
    }

    #[test]
    fn typical_price() {
        let b = bar("2024-01-01", 10.0);
        // (11 + 9 + 10) / 3
        assert!((b.typical_price() - 10.0).abs() < 1e-12);
    }
}
