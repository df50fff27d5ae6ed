// =============================================================================
// Relative Strength Index (RSI) — trailing-mean variant
// =============================================================================
//
// Step 1 — day-over-day diffs of consecutive closes (undefined at index 0).
// Step 2 — split into gains (diff > 0, else 0) and losses (|diff| where
//          diff < 0, else 0).
// Step 3 — avg_gain / avg_loss = trailing simple mean over `period` diffs.
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// When avg_loss == 0 the ratio is unbounded and RSI saturates to exactly
// 100.0 (this also covers the no-movement case where both averages are
// zero).  The saturation is explicit; NaN never enters the output.

/// Compute the RSI series for `closes` with the given `period`.
///
/// Output is aligned 1:1 with the input.  The first `period` entries are
/// `None`: the diff at index 0 is undefined, so the first full window of
/// `period` diffs ends at index `period`.
///
/// # Edge cases
/// - `period == 0` or `closes.len() <= period` => all entries `None`.
/// - `avg_loss == 0` => `Some(100.0)` (saturated, never NaN).
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    // diffs[i] corresponds to closes index i + 1.
    let diffs: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();

    let mut sum_gain = 0.0;
    let mut sum_loss = 0.0;
    let period_f = period as f64;

    for (j, &d) in diffs.iter().enumerate() {
        sum_gain += d.max(0.0);
        sum_loss += (-d).max(0.0);
        if j >= period {
            let old = diffs[j - period];
            sum_gain -= old.max(0.0);
            sum_loss -= (-old).max(0.0);
        }

        if j + 1 >= period {
            let avg_gain = sum_gain / period_f;
            let avg_loss = sum_loss / period_f;
            let value = if avg_loss == 0.0 {
                100.0
            } else {
                let rs = avg_gain / avg_loss;
                100.0 - 100.0 / (1.0 + rs)
            };
            out[j + 1] = Some(value);
        }
    }
    out
}
