// =============================================================================
// Exponential Moving Average (EMA) and Double EMA (DEMA)
// =============================================================================
//
// Formulas:
//   alpha  = 2 / (span + 1)
//   EMA[0] = value[0]
//   EMA[i] = alpha * value[i] + (1 - alpha) * EMA[i-1]
//
//   DEMA[i] = 2 * EMA1[i] - EMA2[i],  EMA2 = EMA(EMA1, span)
//
// The first output seeds from the first raw sample, so the series is defined
// from index 0 with no warm-up prefix.  This biases the early values toward
// the seed; callers needing an unbiased EMA should discard the first `span`
// outputs.

/// Compute the EMA series for `values` with the given `span`.
///
/// Output has the same length as the input and is defined from index 0.
/// `span == 0` or an empty input yields an empty vector.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 || values.is_empty() {
        return Vec::new();
    }

    let alpha = 2.0 / (span + 1) as f64;
    let mut out = Vec::with_capacity(values.len());
    out.push(values[0]);

    let mut prev = values[0];
    for &v in &values[1..] {
        let next = alpha * v + (1.0 - alpha) * prev;
        out.push(next);
        prev = next;
    }
    out
}

/// Compute the DEMA series: `2 * EMA(values) - EMA(EMA(values))`.
///
/// Same length and definedness as [`ema`].
pub fn dema(values: &[f64], span: usize) -> Vec<f64> {
    let ema1 = ema(values, span);
    let ema2 = ema(&ema1, span);
    ema1.iter()
        .zip(ema2.iter())
        .map(|(e1, e2)| 2.0 * e1 - e2)
        .collect()
}
