// =============================================================================
// SMA — Simple Moving Average
// =============================================================================
//
//   SMA_t = mean(values[t-window+1 ..= t])
//
// Output is aligned 1:1 with the input; the first `window - 1` entries are
// `None` while the window fills.  A running sum keeps the scan O(n).
//
// # Edge cases
// - `window == 0` or an empty input yields all-`None` / empty output.
// - `window > len` yields all `None`.

/// Rolling mean over a fixed window.
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut out = vec![None; n];
    if window == 0 || window > n {
        return out;
    }

    let mut sum = 0.0;
    for (i, &v) in values.iter().enumerate() {
        sum += v;
        if i >= window {
            sum -= values[i - window];
        }
        if i + 1 >= window {
            out[i] = Some(sum / window as f64);
        }
    }
    out
}

/// Rolling mean over an already-partial column: the output at `t` is defined
/// only when every one of the `window` trailing inputs is defined.  Used to
/// smooth indicator columns that carry their own warm-up (e.g. %D over %K).
pub fn sma_partial(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let mut out = vec![None; n];
    if window == 0 || window > n {
        return out;
    }

    for i in (window - 1)..n {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().all(|v| v.is_some()) {
            let sum: f64 = slice.iter().map(|v| v.unwrap_or(0.0)).sum();
            out[i] = Some(sum / window as f64);
        }
    }
    out
}
