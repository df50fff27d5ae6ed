// =============================================================================
// Forecast evaluation
// =============================================================================
//
// Regression metrics over paired (actual, predicted) price series:
//
//   MSE  = mean((a - p)^2)
//   MAE  = mean(|a - p|)
//   R^2  = 1 - SS_res / SS_tot           (0.0 when SS_tot == 0)
//   MAPE = mean(|a - p| / |a|) * 100     (zero actuals are skipped)
//   accuracy = clamp(100 - MAPE, 0, 100)

use chrono::NaiveDate;
use serde::Serialize;

/// One evaluated forecast point.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRecord {
    pub date: NaiveDate,
    pub actual_price: f64,
    pub predicted_price: f64,
}

/// Aggregate quality of a forecast run.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastMetrics {
    pub mse: f64,
    pub mae: f64,
    pub r2_score: f64,
    pub accuracy_percentage: f64,
    pub total_predictions: usize,
}

impl ForecastMetrics {
    /// Compute all metrics from evaluated predictions.  An empty slice
    /// yields all-zero metrics.
    pub fn from_records(records: &[PredictionRecord]) -> Self {
        let n = records.len();
        if n == 0 {
            return Self {
                mse: 0.0,
                mae: 0.0,
                r2_score: 0.0,
                accuracy_percentage: 0.0,
                total_predictions: 0,
            };
        }

        let mut sq_sum = 0.0;
        let mut abs_sum = 0.0;
        for r in records {
            let diff = r.actual_price - r.predicted_price;
            sq_sum += diff * diff;
            abs_sum += diff.abs();
        }
        let mse = sq_sum / n as f64;
        let mae = abs_sum / n as f64;

        let mean_actual: f64 = records.iter().map(|r| r.actual_price).sum::<f64>() / n as f64;
        let ss_tot: f64 = records
            .iter()
            .map(|r| {
                let d = r.actual_price - mean_actual;
                d * d
            })
            .sum();
        let r2_score = if ss_tot == 0.0 { 0.0 } else { 1.0 - sq_sum / ss_tot };

        // MAPE over non-zero actuals only.
        let mut pct_sum = 0.0;
        let mut pct_n = 0usize;
        for r in records {
            if r.actual_price != 0.0 {
                pct_sum += ((r.actual_price - r.predicted_price) / r.actual_price).abs();
                pct_n += 1;
            }
        }
        let accuracy_percentage = if pct_n == 0 {
            0.0
        } else {
            let mape = pct_sum / pct_n as f64 * 100.0;
            (100.0 - mape).clamp(0.0, 100.0)
        };

        Self {
            mse,
            mae,
            r2_score,
            accuracy_percentage,
            total_predictions: n,
        }
    }
}
