// =============================================================================
// 1-D convolution and max-pooling layers
// =============================================================================
//
// Local pattern extraction over the time axis of a lookback window.  Input
// and output are (time x channels) matrices; convolution is "valid" (no
// padding), so each layer shortens the time axis by `kernel - 1`, and
// pooling by the (integer) pool factor.

use ndarray::{Array1, Array2, Array3, ArrayView2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;

/// 1-D convolution with ReLU activation.
///
/// Weights are (filters x in_channels x kernel), initialised uniformly in
/// `±sqrt(1 / (in_channels * kernel))`.
#[derive(Debug, Clone)]
pub struct Conv1d {
    weights: Array3<f64>,
    bias: Array1<f64>,
    kernel: usize,
}

impl Conv1d {
    pub fn new(in_channels: usize, filters: usize, kernel: usize, rng: &mut StdRng) -> Self {
        let limit = (1.0 / (in_channels * kernel) as f64).sqrt();
        Self {
            weights: Array3::random_using(
                (filters, in_channels, kernel),
                Uniform::new(-limit, limit),
                rng,
            ),
            bias: Array1::zeros(filters),
            kernel,
        }
    }

    /// Output length for an input of `steps` time steps.
    pub fn out_steps(&self, steps: usize) -> usize {
        steps.saturating_sub(self.kernel - 1)
    }

    pub fn filters(&self) -> usize {
        self.weights.shape()[0]
    }

    /// Apply the convolution to `x` (time x channels), returning
    /// (time - kernel + 1) x filters with ReLU applied.
    pub fn forward(&self, x: &ArrayView2<f64>) -> Array2<f64> {
        let steps = self.out_steps(x.nrows());
        let filters = self.filters();
        let in_channels = x.ncols();

        let mut out = Array2::zeros((steps, filters));
        for t in 0..steps {
            for f in 0..filters {
                let mut acc = self.bias[f];
                for k in 0..self.kernel {
                    for c in 0..in_channels {
                        acc += self.weights[[f, c, k]] * x[[t + k, c]];
                    }
                }
                out[[t, f]] = acc.max(0.0);
            }
        }
        out
    }
}

/// Non-overlapping max pooling over the time axis.
#[derive(Debug, Clone, Copy)]
pub struct MaxPool1d {
    pool: usize,
}

impl MaxPool1d {
    pub fn new(pool: usize) -> Self {
        Self { pool }
    }

    pub fn out_steps(&self, steps: usize) -> usize {
        steps / self.pool
    }

    /// Pool `x` (time x channels) down to (time / pool) x channels,
    /// discarding the trailing remainder as Keras-style pooling does.
    pub fn forward(&self, x: &ArrayView2<f64>) -> Array2<f64> {
        let steps = self.out_steps(x.nrows());
        let channels = x.ncols();
        let mut out = Array2::zeros((steps, channels));
        for t in 0..steps {
            for c in 0..channels {
                let mut best = f64::NEG_INFINITY;
                for k in 0..self.pool {
                    best = best.max(x[[t * self.pool + k, c]]);
                }
                out[[t, c]] = best;
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn conv_output_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let conv = Conv1d::new(4, 8, 3, &mut rng);
        let x = Array2::zeros((10, 4));
        let y = conv.forward(&x.view());
        assert_eq!(y.shape(), &[8, 8]);
    }

    #[test]
    fn conv_output_is_non_negative() {
        let mut rng = StdRng::seed_from_u64(7);
        let conv = Conv1d::new(3, 5, 3, &mut rng);
        let x = Array2::from_shape_fn((12, 3), |(r, c)| ((r * 3 + c) as f64).sin());
        let y = conv.forward(&x.view());
        assert!(y.iter().all(|&v| v >= 0.0));
    }

    #[test]
    fn pool_takes_window_maximum() {
        let pool = MaxPool1d::new(2);
        let x = ndarray::array![[1.0, -2.0], [3.0, 0.5], [2.0, 7.0], [0.0, 1.0], [9.0, 9.0]];
        let y = pool.forward(&x.view());
        // Trailing odd row is discarded.
        assert_eq!(y.shape(), &[2, 2]);
        assert_eq!(y[[0, 0]], 3.0);
        assert_eq!(y[[0, 1]], 0.5);
        assert_eq!(y[[1, 1]], 7.0);
    }

    #[test]
    fn stage_length_arithmetic() {
        let mut rng = StdRng::seed_from_u64(1);
        let conv = Conv1d::new(2, 4, 3, &mut rng);
        let pool = MaxPool1d::new(2);
        // 60 -> 58 -> 29
        assert_eq!(pool.out_steps(conv.out_steps(60)), 29);
    }
}
