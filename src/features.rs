// =============================================================================
// Feature Matrix — indicator-enriched, warm-up-free table
// =============================================================================
//
// Turns a raw OHLCV series into the numeric table the forecasting model
// consumes: one row per time step, one column per feature, close price in
// column 0.  Rows where any indicator is still undefined (warm-up or a
// degenerate denominator) are dropped, so the matrix carries a hard no-NaN
// invariant and preserves chronological order.

use chrono::NaiveDate;
use ndarray::Array2;

use crate::error::{PipelineError, Result};
use crate::indicators;
use crate::series::OhlcvSeries;

/// Column names, in matrix order.  `close` must stay first: the scaler's
/// price-column parameters and the sequence labels both address column 0.
pub const FEATURE_COLUMNS: [&str; 17] = [
    "close",
    "sma_7",
    "sma_21",
    "ema_12",
    "ema_26",
    "dema_20",
    "macd",
    "macd_signal",
    "bb_upper",
    "bb_lower",
    "rsi_14",
    "stoch_k",
    "stoch_d",
    "vwap",
    "plus_di",
    "minus_di",
    "adx",
];

/// Rows lost to indicator warm-up: the ADX chain is the longest, with its
/// first defined value at raw index 27 (14 transitions for DI, then 14
/// defined DX values for the seed).
const WARMUP_ROWS: usize = 27;

/// The dense, chronological feature table derived from one OHLCV series.
#[derive(Debug, Clone)]
pub struct FeatureMatrix {
    dates: Vec<NaiveDate>,
    data: Array2<f64>,
}

impl FeatureMatrix {
    /// Compute every indicator column for `series` and drop undefined rows.
    ///
    /// Errors when no row survives: `InsufficientData` for a series shorter
    /// than the warm-up, `DegenerateIndicator` when the series is long
    /// enough but some column never defines (e.g. a completely flat tape).
    pub fn from_series(series: &OhlcvSeries) -> Result<Self> {
        let n = series.len();
        let closes = series.closes();

        let sma7 = indicators::sma(&closes, 7);
        let sma21 = indicators::sma(&closes, 21);
        let ema12 = indicators::ema(&closes, 12);
        let ema26 = indicators::ema(&closes, 26);
        let dema20 = indicators::dema(&closes, 20);
        let macd = indicators::macd(&closes);
        let bb = indicators::bollinger(&closes, 20, 2.0);
        let rsi = indicators::rsi(&closes, 14);
        let stoch = indicators::stochastic(series, 14, 3);
        let vwap = indicators::vwap(series);
        let adx = indicators::adx(series, 14);

        let mut dates = Vec::new();
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut ever_defined = [false; FEATURE_COLUMNS.len()];

        for i in 0..n {
            let row = [
                Some(closes[i]),
                sma7[i],
                sma21[i],
                Some(ema12[i]),
                Some(ema26[i]),
                Some(dema20[i]),
                Some(macd.macd[i]),
                Some(macd.signal[i]),
                bb.upper[i],
                bb.lower[i],
                rsi[i],
                stoch.percent_k[i],
                stoch.percent_d[i],
                vwap[i],
                adx.plus_di[i],
                adx.minus_di[i],
                adx.adx[i],
            ];
            for (flag, v) in ever_defined.iter_mut().zip(row.iter()) {
                *flag |= v.is_some();
            }
            if let Some(dense) = row.iter().copied().collect::<Option<Vec<f64>>>() {
                dates.push(series.bars()[i].date);
                rows.push(dense);
            }
        }

        if rows.is_empty() {
            // Distinguish "not enough bars" from a column that never defines
            // (e.g. a flat tape leaves the stochastic and DX columns empty
            // at any length).
            if let Some(col) = ever_defined
                .iter()
                .position(|&defined| !defined)
                .filter(|_| n > WARMUP_ROWS)
            {
                return Err(PipelineError::DegenerateIndicator(format!(
                    "column '{}' has no defined values",
                    FEATURE_COLUMNS[col]
                )));
            }
            return Err(PipelineError::InsufficientData {
                required: WARMUP_ROWS + 1,
                actual: n,
            });
        }

        let mut data = Array2::zeros((rows.len(), FEATURE_COLUMNS.len()));
        for (r, row) in rows.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                data[[r, c]] = *v;
            }
        }

        Ok(Self { dates, data })
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.data.ncols()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Close prices (column 0) of the matrix rows.
    pub fn prices(&self) -> Vec<f64> {
        self.data.column(0).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::OhlcvBar;

    fn sinusoid_series(n: usize) -> OhlcvSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars = (0..n)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.21).sin() * 10.0;
                OhlcvBar {
                    date: start + chrono::Days::new(i as u64),
                    open: close - 0.5,
                    high: close + 1.2,
                    low: close - 1.3,
                    close,
                    volume: 10_000.0 + (i as f64 * 13.0) % 500.0,
                }
            })
            .collect();
        OhlcvSeries::new("SINE", bars).unwrap()
    }

    #[test]
    fn matrix_has_no_non_finite_entries() {
        let matrix = FeatureMatrix::from_series(&sinusoid_series(120)).unwrap();
        assert!(matrix.data().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn matrix_drops_warmup_rows() {
        let series = sinusoid_series(120);
        let matrix = FeatureMatrix::from_series(&series).unwrap();
        // ADX is the longest warm-up: first defined at index 27.
        assert_eq!(matrix.rows(), 120 - 27);
        assert_eq!(matrix.n_features(), FEATURE_COLUMNS.len());
        // Dates stay chronological and aligned with the surviving rows.
        assert_eq!(matrix.dates().len(), matrix.rows());
        assert!(matrix.dates().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn matrix_price_column_is_close() {
        let series = sinusoid_series(120);
        let matrix = FeatureMatrix::from_series(&series).unwrap();
        let closes = series.closes();
        // First surviving row is index 27 of the raw series.
        assert!((matrix.prices()[0] - closes[27]).abs() < 1e-12);
    }

    #[test]
    fn too_short_series_is_insufficient() {
        let err = FeatureMatrix::from_series(&sinusoid_series(20)).unwrap_err();
        assert!(matches!(err, PipelineError::InsufficientData { .. }));
    }

    #[test]
    fn flat_series_is_degenerate_not_insufficient() {
        // Plenty of bars, but zero range everywhere: the stochastic and DX
        // columns never define, so no row can survive.
        let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
        let bars = (0..80)
            .map(|i| OhlcvBar {
                date: start + chrono::Days::new(i as u64),
                open: 50.0,
                high: 50.0,
                low: 50.0,
                close: 50.0,
                volume: 1_000.0,
            })
            .collect();
        let series = OhlcvSeries::new("FLAT", bars).unwrap();
        let err = FeatureMatrix::from_series(&series).unwrap_err();
        assert!(matches!(err, PipelineError::DegenerateIndicator(_)));
    }
}
