// =============================================================================
// Moving Average Convergence Divergence (MACD)
// =============================================================================
//
//   MACD   = EMA(close, 12) - EMA(close, 26)
//   Signal = EMA(MACD, 9)
//
// Both lines inherit the EMA's from-index-0 definedness, so the columns are
// full length with no warm-up prefix.

use super::ema::ema;

/// MACD line and its signal line, each aligned 1:1 with the input.
#[derive(Debug, Clone)]
pub struct MacdColumns {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

/// Compute MACD(12, 26) with a 9-period signal line.
pub fn macd(closes: &[f64]) -> MacdColumns {
    macd_with(closes, 12, 26, 9)
}

/// MACD with explicit fast/slow/signal spans.
pub fn macd_with(closes: &[f64], fast: usize, slow: usize, signal_span: usize) -> MacdColumns {
    let fast_ema = ema(closes, fast);
    let slow_ema = ema(closes, slow);
    let line: Vec<f64> = fast_ema
        .iter()
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema(&line, signal_span);
    MacdColumns { macd: line, signal }
}
