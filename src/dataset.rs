// =============================================================================
// Windowing & Scaling — supervised dataset preparation
// =============================================================================
//
// Converts a clean feature matrix into fixed-length overlapping sequences
// for the forecasting model:
//
// - Chronological train/test split (no shuffling: shuffling a forecasting
//   dataset leaks future information into training).
// - Min-max scaler fit EXCLUSIVELY on the training partition; the test
//   partition never influences the fitted parameters.
// - Test windows come from a combined buffer of the last `lookback`
//   training rows plus the test rows, so the first test window has full
//   context without re-fitting on test data.

use ndarray::{s, Array1, Array2, Array3, ArrayView2};

use crate::error::{PipelineError, Result};

/// Per-column min/max parameters, fit once on the training partition.
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxScaler {
    mins: Vec<f64>,
    maxs: Vec<f64>,
}

impl MinMaxScaler {
    /// Fit column ranges on `data` (rows x features).
    ///
    /// Errors with `InsufficientData` on an empty matrix.
    pub fn fit(data: &ArrayView2<f64>) -> Result<Self> {
        if data.nrows() == 0 {
            return Err(PipelineError::InsufficientData {
                required: 1,
                actual: 0,
            });
        }
        let mut mins = vec![f64::INFINITY; data.ncols()];
        let mut maxs = vec![f64::NEG_INFINITY; data.ncols()];
        for row in data.rows() {
            for (c, &v) in row.iter().enumerate() {
                mins[c] = mins[c].min(v);
                maxs[c] = maxs[c].max(v);
            }
        }
        Ok(Self { mins, maxs })
    }

    /// Scale `data` into [0, 1] per column using the fitted ranges.
    pub fn transform(&self, data: &ArrayView2<f64>) -> Array2<f64> {
        let mut out = Array2::zeros((data.nrows(), data.ncols()));
        for r in 0..data.nrows() {
            for c in 0..data.ncols() {
                out[[r, c]] = (data[[r, c]] - self.mins[c]) / self.range(c);
            }
        }
        out
    }

    /// Map a single scaled value in column `col` back to its original units.
    pub fn invert(&self, col: usize, value: f64) -> f64 {
        value * self.range(col) + self.mins[col]
    }

    /// Column range with the zero-range guard: a constant column divides by
    /// 1.0 so it transforms to 0.0 rather than NaN.
    fn range(&self, col: usize) -> f64 {
        let range = self.maxs[col] - self.mins[col];
        if range == 0.0 {
            1.0
        } else {
            range
        }
    }

    pub fn mins(&self) -> &[f64] {
        &self.mins
    }

    pub fn maxs(&self) -> &[f64] {
        &self.maxs
    }
}

/// Slice the scaled matrix into overlapping lookback windows.
///
/// For `i` in `[lookback, rows)` the window is `data[i-lookback..i]` and the
/// label is `data[i][0]` (the scaled price at the step immediately after the
/// window), producing exactly `rows - lookback` examples.
///
/// Errors with `InsufficientData` when `rows <= lookback`.
pub fn make_sequences(
    data: &ArrayView2<f64>,
    lookback: usize,
) -> Result<(Array3<f64>, Array1<f64>)> {
    let rows = data.nrows();
    if lookback == 0 || rows <= lookback {
        return Err(PipelineError::InsufficientData {
            required: lookback + 1,
            actual: rows,
        });
    }

    let count = rows - lookback;
    let mut windows = Array3::zeros((count, lookback, data.ncols()));
    let mut labels = Array1::zeros(count);
    for w in 0..count {
        windows
            .slice_mut(s![w, .., ..])
            .assign(&data.slice(s![w..w + lookback, ..]));
        labels[w] = data[[w + lookback, 0]];
    }
    Ok((windows, labels))
}

/// Chronological train/test partition of a feature matrix.
#[derive(Debug, Clone)]
pub struct SplitMatrix<'a> {
    pub train: ArrayView2<'a, f64>,
    pub test: ArrayView2<'a, f64>,
    /// Row index (into the full matrix) where the test partition begins,
    /// after the horizon cap.
    pub test_start: usize,
}

/// Split `data` chronologically: first `ratio` of rows train, remainder
/// test, with the test partition capped to its most recent `horizon` rows.
pub fn chronological_split<'a>(
    data: &'a Array2<f64>,
    ratio: f64,
    horizon: usize,
) -> Result<SplitMatrix<'a>> {
    let rows = data.nrows();
    let split_idx = (rows as f64 * ratio) as usize;
    if split_idx == 0 || split_idx >= rows {
        return Err(PipelineError::InsufficientData {
            required: 2,
            actual: rows,
        });
    }

    let test_rows = rows - split_idx;
    let test_start = if horizon > 0 && test_rows > horizon {
        rows - horizon
    } else {
        split_idx
    };

    Ok(SplitMatrix {
        train: data.slice(s![..split_idx, ..]),
        test: data.slice(s![test_start.., ..]),
        test_start,
    })
}
