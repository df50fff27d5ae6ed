// =============================================================================
// Average Directional Index (ADX) with DX, +DI, -DI columns
// =============================================================================
//
// Calculation pipeline:
//   1. Raw directional movement per bar:
//        dm_pos = high[i] - high[i-1]
//        dm_neg = low[i-1] - low[i]
//      Tie-break: the larger of the two is kept (clamped to >= 0) and the
//      other zeroed.  When they are exactly equal — even both positive —
//      BOTH are zeroed.  This matches the behaviour of the system this
//      engine replaces; classic Wilder ADX would behave differently on
//      positive ties, so do not "fix" it here.
//   2. True Range: TR = max(high-low, |high-prev_close|, |low-prev_close|).
//   3. Smoothed TR14/+DM14/-DM14: plain sum of the first `period` raw
//      values, then the Wilder running form  x14 = x14 - x14/period + x.
//   4. +DI = +DM14/TR14 * 100,  -DI = -DM14/TR14 * 100  (undefined when
//      TR14 == 0).
//   5. DX = |+DI - -DI| / |+DI + -DI| * 100  (undefined when the
//      denominator is zero).
//   6. ADX seeds with the mean of the first `period` defined DX values and
//      continues with  ADX = (prev * (period-1) + DX) / period.
//
// Implemented as a single forward scan carrying only the recurrence state;
// steps with undefined DX leave ADX undefined for that step without
// resetting the smoothing state.

use crate::series::OhlcvSeries;

/// Output columns of the directional-movement computation, each aligned 1:1
/// with the input series.
#[derive(Debug, Clone)]
pub struct AdxColumns {
    pub plus_di: Vec<Option<f64>>,
    pub minus_di: Vec<Option<f64>>,
    pub dx: Vec<Option<f64>>,
    pub adx: Vec<Option<f64>>,
}

/// Compute +DI / -DI / DX / ADX for the series with the given `period`.
///
/// All columns have the series length.  `period == 0` yields all-undefined
/// columns.
pub fn adx(series: &OhlcvSeries, period: usize) -> AdxColumns {
    let n = series.len();
    let mut out = AdxColumns {
        plus_di: vec![None; n],
        minus_di: vec![None; n],
        dx: vec![None; n],
        adx: vec![None; n],
    };
    if period == 0 || n < 2 {
        return out;
    }

    let bars = series.bars();
    let period_f = period as f64;

    // Recurrence state: partial sums while seeding, smoothed values after.
    let mut raw_count = 0usize;
    let mut sum_tr = 0.0;
    let mut sum_dm_pos = 0.0;
    let mut sum_dm_neg = 0.0;
    let mut tr14 = 0.0;
    let mut dm_pos14 = 0.0;
    let mut dm_neg14 = 0.0;

    // ADX seed buffer and carried value.
    let mut dx_seed: Vec<f64> = Vec::with_capacity(period);
    let mut adx_prev: Option<f64> = None;

    for i in 1..n {
        let high = bars[i].high;
        let low = bars[i].low;
        let prev_high = bars[i - 1].high;
        let prev_low = bars[i - 1].low;
        let prev_close = bars[i - 1].close;

        let raw_pos = high - prev_high;
        let raw_neg = prev_low - low;

        // Tie-break policy (see header): equality zeroes both sides.
        let (dm_pos, dm_neg) = if raw_pos > raw_neg {
            (raw_pos.max(0.0), 0.0)
        } else if raw_neg > raw_pos {
            (0.0, raw_neg.max(0.0))
        } else {
            (0.0, 0.0)
        };

        let tr = (high - low)
            .max((high - prev_close).abs())
            .max((low - prev_close).abs());

        raw_count += 1;
        if raw_count < period {
            sum_tr += tr;
            sum_dm_pos += dm_pos;
            sum_dm_neg += dm_neg;
            continue;
        } else if raw_count == period {
            // First smoothed values: a plain sum of the first `period` bars.
            tr14 = sum_tr + tr;
            dm_pos14 = sum_dm_pos + dm_pos;
            dm_neg14 = sum_dm_neg + dm_neg;
        } else {
            tr14 = tr14 - tr14 / period_f + tr;
            dm_pos14 = dm_pos14 - dm_pos14 / period_f + dm_pos;
            dm_neg14 = dm_neg14 - dm_neg14 / period_f + dm_neg;
        }

        if tr14 == 0.0 {
            continue; // +DI/-DI undefined, hence DX and ADX too.
        }

        let plus = dm_pos14 / tr14 * 100.0;
        let minus = dm_neg14 / tr14 * 100.0;
        out.plus_di[i] = Some(plus);
        out.minus_di[i] = Some(minus);

        let den = (plus + minus).abs();
        if den == 0.0 {
            continue;
        }
        let dx = (plus - minus).abs() / den * 100.0;
        out.dx[i] = Some(dx);

        match adx_prev {
            None => {
                dx_seed.push(dx);
                if dx_seed.len() == period {
                    let seed = dx_seed.iter().sum::<f64>() / period_f;
                    out.adx[i] = Some(seed);
                    adx_prev = Some(seed);
                }
            }
            Some(prev) => {
                let next = (prev * (period_f - 1.0) + dx) / period_f;
                out.adx[i] = Some(next);
                adx_prev = Some(next);
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::OhlcvBar;
    use chrono::NaiveDate;

    fn series(bars: Vec<(f64, f64, f64, f64)>) -> OhlcvSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let bars = bars
            .into_iter()
            .enumerate()
            .map(|(i, (open, high, low, close))| OhlcvBar {
                date: start + chrono::Days::new(i as u64),
                open,
                high,
                low,
                close,
                volume: 1000.0,
            })
            .collect();
        OhlcvSeries::new("TEST", bars).unwrap()
    }

    fn trending(n: usize) -> OhlcvSeries {
        series(
            (0..n)
                .map(|i| {
                    let base = 100.0 + i as f64 * 2.0;
                    (base, base + 1.5, base - 0.5, base + 1.0)
                })
                .collect(),
        )
    }

    #[test]
    fn adx_period_zero_all_undefined() {
        let s = trending(50);
        let cols = adx(&s, 0);
        assert!(cols.adx.iter().all(|v| v.is_none()));
    }

    #[test]
    fn adx_columns_aligned_with_series() {
        let s = trending(60);
        let cols = adx(&s, 14);
        assert_eq!(cols.plus_di.len(), 60);
        assert_eq!(cols.minus_di.len(), 60);
        assert_eq!(cols.dx.len(), 60);
        assert_eq!(cols.adx.len(), 60);
    }

    #[test]
    fn adx_warmup_and_seed_position() {
        let s = trending(60);
        let cols = adx(&s, 14);
        // DI/DX require 14 raw transitions, i.e. defined from index 14.
        assert!(cols.plus_di[..14].iter().all(|v| v.is_none()));
        assert!(cols.plus_di[14].is_some());
        // ADX needs 14 defined DX values: first at index 27 here.
        assert!(cols.adx[..27].iter().all(|v| v.is_none()));
        assert!(cols.adx[27].is_some());
    }

    #[test]
    fn adx_wilder_recurrence_holds_past_seed() {
        let s = series(
            (0..120)
                .map(|i| {
                    let base = 50.0 + (i as f64 * 0.3).sin() * 10.0;
                    (base - 0.5, base + 1.0, base - 1.0, base + 0.5)
                })
                .collect(),
        );
        let cols = adx(&s, 14);

        let mut prev: Option<f64> = None;
        let mut checked = 0;
        for i in 0..s.len() {
            if let Some(a) = cols.adx[i] {
                if let (Some(p), Some(d)) = (prev, cols.dx[i]) {
                    let expected = (p * 13.0 + d) / 14.0;
                    assert!((a - expected).abs() < 1e-9, "index {i}: {a} vs {expected}");
                    checked += 1;
                }
                prev = Some(a);
            }
        }
        assert!(checked > 50, "recurrence checked on too few steps");
    }

    #[test]
    fn adx_strong_trend_is_high() {
        let cols = adx(&trending(60), 14);
        let last = cols.adx.iter().flatten().last().copied().unwrap();
        assert!(last > 25.0, "expected ADX > 25 in a strong trend, got {last}");
    }

    #[test]
    fn adx_flat_series_undefined_dx() {
        // Identical bars: TR == high - low > 0 but both DMs are zero, so the
        // DI sum is zero and DX stays undefined everywhere.
        let s = series(vec![(100.0, 101.0, 99.0, 100.0); 50]);
        let cols = adx(&s, 14);
        assert!(cols.dx.iter().all(|v| v.is_none()));
        assert!(cols.adx.iter().all(|v| v.is_none()));
        // The DI columns themselves are defined (and zero) once warmed up.
        assert_eq!(cols.plus_di[20], Some(0.0));
    }

    #[test]
    fn positive_tie_zeroes_both_movements() {
        // Construct two bars where the up-move equals the down-move (+2/-2):
        // both directional movements must be dropped, leaving zero DI.
        let mut bars = vec![(100.0, 110.0, 90.0, 100.0); 20];
        for (i, b) in bars.iter_mut().enumerate() {
            let shift = if i % 2 == 0 { 0.0 } else { 2.0 };
            b.1 += shift; // high
            b.2 -= shift; // low
        }
        let s = series(bars);
        let cols = adx(&s, 14);
        assert_eq!(cols.plus_di[16], Some(0.0));
        assert_eq!(cols.minus_di[16], Some(0.0));
        assert!(cols.dx[16].is_none());
    }

    #[test]
    fn adx_in_unit_range() {
        let s = series(
            (0..100)
                .map(|i| {
                    let base = 50.0 + (i as f64 * 0.3).sin() * 10.0;
                    (base - 0.5, base + 1.0, base - 1.0, base + 0.5)
                })
                .collect(),
        );
        let cols = adx(&s, 14);
        for v in cols.adx.iter().flatten() {
            assert!((0.0..=100.0).contains(v), "ADX {v} out of [0,100]");
        }
    }
}
