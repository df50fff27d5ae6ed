// =============================================================================
// End-to-end forecast pipeline
// =============================================================================
//
// Ties the stages together for one feature matrix:
//
//   1. Chronological split (train share, horizon-capped test partition).
//   2. Min-max scaler fit on the training partition only.
//   3. Lookback windows + next-step labels from the scaled training rows.
//   4. CNN-BiLSTM training with early stopping.
//   5. Test windows from a combined buffer (last `lookback` training rows
//      followed by the test rows) so every test row gets a prediction.
//   6. Inverse scaling of the predicted prices and metric computation.

use ndarray::{concatenate, s, Axis};
use tracing::info;

use crate::config::PipelineConfig;
use crate::dataset::{chronological_split, make_sequences, MinMaxScaler};
use crate::error::{PipelineError, Result};
use crate::evaluate::{ForecastMetrics, PredictionRecord};
use crate::features::FeatureMatrix;
use crate::model::{ForecastModel, TrainingReport};

/// Rows beyond the lookback required before training is worth attempting.
const MIN_TRAINING_ROWS: usize = 50;

/// The pipeline's output: per-day predictions over the test partition plus
/// aggregate metrics and the training summary.
#[derive(Debug)]
pub struct Forecast {
    pub predictions: Vec<PredictionRecord>,
    pub metrics: ForecastMetrics,
    pub training: TrainingReport,
}

/// Train on the matrix's past and predict its held-out tail.
pub fn forecast(matrix: &FeatureMatrix, config: &PipelineConfig) -> Result<Forecast> {
    let rows = matrix.rows();
    let required = config.lookback + MIN_TRAINING_ROWS;
    if rows < required {
        return Err(PipelineError::InsufficientData {
            required,
            actual: rows,
        });
    }

    let split = chronological_split(matrix.data(), config.train_split, config.horizon_days)?;
    info!(
        rows,
        train_rows = split.train.nrows(),
        test_rows = split.test.nrows(),
        lookback = config.lookback,
        "partitioned feature matrix"
    );

    let scaler = MinMaxScaler::fit(&split.train)?;
    let train_scaled = scaler.transform(&split.train);
    let (train_x, train_y) = make_sequences(&train_scaled.view(), config.lookback)?;

    let mut model = ForecastModel::new(config.lookback, matrix.n_features(), config.model.clone())?;
    let training = model.train(&train_x, &train_y)?;
    info!(
        epochs = training.epochs_run,
        val_mse = training.best_validation_mse,
        stopped_early = training.stopped_early,
        "model training finished"
    );

    // The first test window needs `lookback` rows of context, taken from the
    // end of the training partition so the scaler stays train-only.
    if split.train.nrows() < config.lookback {
        return Err(PipelineError::InsufficientData {
            required: config.lookback,
            actual: split.train.nrows(),
        });
    }
    let context = split
        .train
        .slice(s![split.train.nrows() - config.lookback.., ..]);
    let combined = concatenate(Axis(0), &[context, split.test])
        .map_err(|e| PipelineError::InvalidSeries(format!("test buffer assembly: {e}")))?;
    let combined_scaled = scaler.transform(&combined.view());
    // Combined buffer has lookback + test_rows rows, so one window per test
    // row.  The window ending at test row `w` predicts that row's price.
    let test_rows = split.test.nrows();
    let mut test_x = ndarray::Array3::zeros((test_rows, config.lookback, matrix.n_features()));
    for w in 0..test_rows {
        test_x
            .slice_mut(s![w, .., ..])
            .assign(&combined_scaled.slice(s![w..w + config.lookback, ..]));
    }

    let scaled_predictions = model.predict(&test_x);

    let dates = &matrix.dates()[split.test_start..];
    let actuals = matrix.prices();
    let predictions: Vec<PredictionRecord> = scaled_predictions
        .iter()
        .enumerate()
        .map(|(i, &p)| PredictionRecord {
            date: dates[i],
            actual_price: actuals[split.test_start + i],
            predicted_price: scaler.invert(0, p),
        })
        .collect();

    if predictions.iter().any(|r| !r.predicted_price.is_finite()) {
        return Err(PipelineError::ModelTraining(
            "non-finite prediction in forecast output".to_string(),
        ));
    }

    let metrics = ForecastMetrics::from_records(&predictions);
    info!(
        predictions = metrics.total_predictions,
        accuracy = metrics.accuracy_percentage,
        r2 = metrics.r2_score,
        "forecast evaluated"
    );

    Ok(Forecast {
        predictions,
        metrics,
        training,
    })
}
