// =============================================================================
// Bollinger Bands
// =============================================================================
//
//   middle = SMA(close, period)
//   upper  = middle + k * std
//   lower  = middle - k * std
//
// std is the *sample* standard deviation (ddof = 1) over the same trailing
// window, matching the rolling-std behaviour of the system this engine
// replaces.  All three bands share the SMA's warm-up prefix.

use super::sma::sma;

/// Bollinger band columns, each aligned 1:1 with the input.
#[derive(Debug, Clone)]
pub struct BollingerColumns {
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

/// Compute Bollinger Bands with the given trailing `period` and band width
/// multiplier `k` (conventionally 2.0).
///
/// # Edge cases
/// - `period < 2` => all entries `None` (sample std needs two points).
/// - `closes.len() < period` => all entries `None`.
pub fn bollinger(closes: &[f64], period: usize, k: f64) -> BollingerColumns {
    let n = closes.len();
    let mut out = BollingerColumns {
        middle: vec![None; n],
        upper: vec![None; n],
        lower: vec![None; n],
    };
    if period < 2 || n < period {
        return out;
    }

    let middle = sma(closes, period);
    for i in (period - 1)..n {
        let mean = match middle[i] {
            Some(m) => m,
            None => continue,
        };
        let window = &closes[i + 1 - period..=i];
        let variance =
            window.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (period - 1) as f64;
        let std = variance.sqrt();
        out.middle[i] = Some(mean);
        out.upper[i] = Some(mean + k * std);
        out.lower[i] = Some(mean - k * std);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_insufficient_data() {
        let cols = bollinger(&[1.0, 2.0, 3.0], 20, 2.0);
        assert!(cols.middle.iter().all(|v| v.is_none()));
    }

    #[test]
    fn bollinger_warmup_prefix() {
        let closes: Vec<f64> = (1..=30).map(|x| x as f64).collect();
        let cols = bollinger(&closes, 20, 2.0);
        assert!(cols.upper[..19].iter().all(|v| v.is_none()));
        assert!(cols.upper[19..].iter().all(|v| v.is_some()));
    }

    #[test]
    fn bollinger_band_ordering() {
        let closes: Vec<f64> = (1..=30).map(|x| (x as f64).sin() * 5.0 + 50.0).collect();
        let cols = bollinger(&closes, 20, 2.0);
        for i in 19..closes.len() {
            let (u, m, l) = (
                cols.upper[i].unwrap(),
                cols.middle[i].unwrap(),
                cols.lower[i].unwrap(),
            );
            assert!(u > m && m > l);
        }
    }

    #[test]
    fn bollinger_flat_series_collapses() {
        let closes = vec![100.0; 25];
        let cols = bollinger(&closes, 20, 2.0);
        let i = 24;
        assert_eq!(cols.upper[i], Some(100.0));
        assert_eq!(cols.middle[i], Some(100.0));
        assert_eq!(cols.lower[i], Some(100.0));
    }

    #[test]
    fn bollinger_known_sample_std() {
        // Window [1..=20]: mean 10.5, sample variance 35, std = sqrt(35).
        let closes: Vec<f64> = (1..=20).map(|x| x as f64).collect();
        let cols = bollinger(&closes, 20, 2.0);
        let std = 35.0_f64.sqrt();
        assert!((cols.upper[19].unwrap() - (10.5 + 2.0 * std)).abs() < 1e-9);
        assert!((cols.lower[19].unwrap() - (10.5 - 2.0 * std)).abs() < 1e-9);
    }
}
