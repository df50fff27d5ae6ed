// =============================================================================
// Stochastic Oscillator (%K / %D)
// =============================================================================
//
//   %K = (close - min(low, k)) / (max(high, k) - min(low, k)) * 100
//   %D = SMA(%K, d)
//
// min/max run over the trailing `k_period` bars.  A zero high-low range
// leaves %K undefined for that step (explicit, not a NaN), and %D requires a
// full window of defined %K values.

use super::sma::sma_partial;
use crate::series::OhlcvSeries;

/// Stochastic oscillator columns, aligned 1:1 with the series.
#[derive(Debug, Clone)]
pub struct StochasticColumns {
    pub percent_k: Vec<Option<f64>>,
    pub percent_d: Vec<Option<f64>>,
}

/// Compute %K(`k_period`) and %D(`d_period`) for the series.
///
/// # Edge cases
/// - `k_period == 0` or `d_period == 0` => all entries `None`.
/// - Range of zero over the window => `%K` undefined at that step.
pub fn stochastic(series: &OhlcvSeries, k_period: usize, d_period: usize) -> StochasticColumns {
    let n = series.len();
    let mut percent_k = vec![None; n];
    if k_period == 0 || d_period == 0 || n < k_period {
        return StochasticColumns {
            percent_k,
            percent_d: vec![None; n],
        };
    }

    let bars = series.bars();
    for i in (k_period - 1)..n {
        let window = &bars[i + 1 - k_period..=i];
        let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let highest = window
            .iter()
            .map(|b| b.high)
            .fold(f64::NEG_INFINITY, f64::max);
        let range = highest - lowest;
        if range == 0.0 {
            continue;
        }
        percent_k[i] = Some((bars[i].close - lowest) / range * 100.0);
    }

    let percent_d = sma_partial(&percent_k, d_period);
    StochasticColumns {
        percent_k,
        percent_d,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::OhlcvBar;
    use chrono::NaiveDate;

    fn series(bars: Vec<(f64, f64, f64)>) -> OhlcvSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = bars
            .into_iter()
            .enumerate()
            .map(|(i, (high, low, close))| OhlcvBar {
                date: start + chrono::Days::new(i as u64),
                open: close,
                high,
                low,
                close,
                volume: 1000.0,
            })
            .collect();
        OhlcvSeries::new("TEST", bars).unwrap()
    }

    #[test]
    fn stochastic_warmup_prefix() {
        let s = series((0..30).map(|i| (10.0 + i as f64, i as f64, 5.0 + i as f64)).collect());
        let cols = stochastic(&s, 14, 3);
        assert!(cols.percent_k[..13].iter().all(|v| v.is_none()));
        assert!(cols.percent_k[13].is_some());
        // %D needs 3 consecutive defined %K values.
        assert!(cols.percent_d[..15].iter().all(|v| v.is_none()));
        assert!(cols.percent_d[15].is_some());
    }

    #[test]
    fn stochastic_close_at_high_is_100() {
        // Close pinned to the rolling high: %K == 100.
        let s = series((0..20).map(|i| (10.0 + i as f64, 1.0, 10.0 + i as f64)).collect());
        let cols = stochastic(&s, 14, 3);
        for v in cols.percent_k.iter().flatten() {
            assert!((v - 100.0).abs() < 1e-10);
        }
    }

    #[test]
    fn stochastic_in_unit_range() {
        let s = series(
            (0..40)
                .map(|i| {
                    let base = 50.0 + (i as f64 * 0.4).sin() * 10.0;
                    (base + 2.0, base - 2.0, base)
                })
                .collect(),
        );
        let cols = stochastic(&s, 14, 3);
        for v in cols.percent_k.iter().flatten() {
            assert!((0.0..=100.0).contains(v));
        }
        for v in cols.percent_d.iter().flatten() {
            assert!((0.0..=100.0).contains(v));
        }
    }

    #[test]
    fn zero_range_leaves_percent_k_undefined() {
        let s = series(vec![(100.0, 100.0, 100.0); 20]);
        let cols = stochastic(&s, 14, 3);
        assert!(cols.percent_k.iter().all(|v| v.is_none()));
        assert!(cols.percent_d.iter().all(|v| v.is_none()));
    }
}
