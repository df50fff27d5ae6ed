// =============================================================================
// Volume Weighted Average Price (VWAP)
// =============================================================================
//
//   typical = (high + low + close) / 3
//   VWAP[i] = cumsum(volume * typical)[0..=i] / cumsum(volume)[0..=i]
//
// This is a running computation from the start of the series, NOT a trailing
// window: every value incorporates all prior history, so VWAP[i] can never
// be affected by samples after index i.

use crate::series::OhlcvSeries;

/// Compute the running VWAP column, aligned 1:1 with the series.
///
/// Entries are `None` while the cumulative volume is still zero (no trades
/// yet to weight).
pub fn vwap(series: &OhlcvSeries) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(series.len());
    let mut cum_pv = 0.0;
    let mut cum_volume = 0.0;

    for bar in series.bars() {
        cum_pv += bar.volume * bar.typical_price();
        cum_volume += bar.volume;
        if cum_volume == 0.0 {
            out.push(None);
        } else {
            out.push(Some(cum_pv / cum_volume));
        }
    }
    out
}
