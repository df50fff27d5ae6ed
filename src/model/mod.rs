// =============================================================================
// CNN-BiLSTM forecasting model
// =============================================================================
//
// Architecture (per lookback window of shape L x F):
//
//   Conv1D(64, k=3, ReLU) -> MaxPool(2) -> Conv1D(32, k=3, ReLU) ->
//   MaxPool(2) -> BiLSTM(50, sequence) -> BiLSTM(25, final state) ->
//   Dense(16, ReLU) -> Dropout(0.2) -> Dense(1)
//
// The convolutional and recurrent stages form a fixed feature extractor
// initialised from the configured seed; the dense head is the trained part,
// fitted by mini-batch gradient descent on MSE with a chronological
// validation split and early stopping.  Window features are extracted once
// per window and reused across epochs, which keeps training cost linear in
// the dataset rather than in epochs x extractor depth.

mod conv;
mod dense;
mod lstm;

pub use conv::{Conv1d, MaxPool1d};
pub use dense::{Dense, RegressionHead};
pub use lstm::{BiLstm, LstmCell};

use ndarray::{s, Array1, Array3};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{PipelineError, Result};

fn default_conv1_filters() -> usize {
    64
}

fn default_conv2_filters() -> usize {
    32
}

fn default_kernel_size() -> usize {
    3
}

fn default_pool_size() -> usize {
    2
}

fn default_lstm1_hidden() -> usize {
    50
}

fn default_lstm2_hidden() -> usize {
    25
}

fn default_dense_size() -> usize {
    16
}

fn default_dropout() -> f64 {
    0.2
}

fn default_epochs() -> usize {
    50
}

fn default_batch_size() -> usize {
    64
}

fn default_learning_rate() -> f64 {
    0.05
}

fn default_validation_split() -> f64 {
    0.2
}

fn default_patience() -> usize {
    10
}

/// Tunable model hyperparameters.  Every field carries a serde default so
/// older config files keep loading when new knobs are added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_conv1_filters")]
    pub conv1_filters: usize,
    #[serde(default = "default_conv2_filters")]
    pub conv2_filters: usize,
    #[serde(default = "default_kernel_size")]
    pub kernel_size: usize,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(default = "default_lstm1_hidden")]
    pub lstm1_hidden: usize,
    #[serde(default = "default_lstm2_hidden")]
    pub lstm2_hidden: usize,
    #[serde(default = "default_dense_size")]
    pub dense_size: usize,
    #[serde(default = "default_dropout")]
    pub dropout: f64,
    #[serde(default = "default_epochs")]
    pub epochs: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_validation_split")]
    pub validation_split: f64,
    #[serde(default = "default_patience")]
    pub patience: usize,
    /// RNG seed for weight init and dropout masks; `None` seeds from
    /// entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            conv1_filters: default_conv1_filters(),
            conv2_filters: default_conv2_filters(),
            kernel_size: default_kernel_size(),
            pool_size: default_pool_size(),
            lstm1_hidden: default_lstm1_hidden(),
            lstm2_hidden: default_lstm2_hidden(),
            dense_size: default_dense_size(),
            dropout: default_dropout(),
            epochs: default_epochs(),
            batch_size: default_batch_size(),
            learning_rate: default_learning_rate(),
            validation_split: default_validation_split(),
            patience: default_patience(),
            seed: None,
        }
    }
}

/// Summary of one training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub epochs_run: usize,
    pub best_validation_mse: f64,
    pub final_training_mse: f64,
    pub stopped_early: bool,
}

/// The assembled forecaster.  Mutable during `train`, read-only afterwards.
#[derive(Debug)]
pub struct ForecastModel {
    conv1: Conv1d,
    pool1: MaxPool1d,
    conv2: Conv1d,
    pool2: MaxPool1d,
    bilstm1: BiLstm,
    bilstm2: BiLstm,
    head: RegressionHead,
    config: ModelConfig,
    rng: StdRng,
}

impl ForecastModel {
    /// Build a model for windows of `lookback` steps x `n_features`.
    ///
    /// Errors with `InvalidConfig` on zero kernel or pool sizes (both come
    /// straight from the config file) and `InsufficientData` when the
    /// lookback does not survive the two conv/pool stages.
    pub fn new(lookback: usize, n_features: usize, config: ModelConfig) -> Result<Self> {
        if config.kernel_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "kernel_size must be at least 1".to_string(),
            ));
        }
        if config.pool_size == 0 {
            return Err(PipelineError::InvalidConfig(
                "pool_size must be at least 1".to_string(),
            ));
        }

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let conv1 = Conv1d::new(n_features, config.conv1_filters, config.kernel_size, &mut rng);
        let pool1 = MaxPool1d::new(config.pool_size);
        let conv2 = Conv1d::new(
            config.conv1_filters,
            config.conv2_filters,
            config.kernel_size,
            &mut rng,
        );
        let pool2 = MaxPool1d::new(config.pool_size);

        let steps = pool2.out_steps(conv2.out_steps(pool1.out_steps(conv1.out_steps(lookback))));
        if steps == 0 {
            return Err(PipelineError::InsufficientData {
                required: min_lookback(&config),
                actual: lookback,
            });
        }

        let bilstm1 = BiLstm::new(config.conv2_filters, config.lstm1_hidden, &mut rng);
        let bilstm2 = BiLstm::new(bilstm1.output_size(), config.lstm2_hidden, &mut rng);
        let head = RegressionHead::new(
            bilstm2.output_size(),
            config.dense_size,
            config.dropout,
            &mut rng,
        );

        Ok(Self {
            conv1,
            pool1,
            conv2,
            pool2,
            bilstm1,
            bilstm2,
            head,
            config,
            rng,
        })
    }

    /// Run one window through the fixed extractor stages.
    fn extract(&self, window: &ndarray::ArrayView2<f64>) -> Array1<f64> {
        let x = self.conv1.forward(window);
        let x = self.pool1.forward(&x.view());
        let x = self.conv2.forward(&x.view());
        let x = self.pool2.forward(&x.view());
        let x = self.bilstm1.forward_sequence(&x.view());
        self.bilstm2.forward_last(&x.view())
    }

    fn extract_all(&self, windows: &Array3<f64>) -> Vec<Array1<f64>> {
        (0..windows.shape()[0])
            .map(|w| self.extract(&windows.slice(s![w, .., ..])))
            .collect()
    }

    /// Train the regression head on `(windows, labels)`.
    ///
    /// The chronologically last `validation_split` share of the windows is
    /// held out; early stopping triggers after `patience` epochs without
    /// validation improvement and the best head is restored.  Non-finite
    /// losses surface as `ModelTraining`.
    pub fn train(&mut self, windows: &Array3<f64>, labels: &Array1<f64>) -> Result<TrainingReport> {
        let n = windows.shape()[0];
        if n == 0 || labels.len() != n {
            return Err(PipelineError::InsufficientData {
                required: 1,
                actual: n,
            });
        }

        let features = self.extract_all(windows);
        let targets: Vec<f64> = labels.to_vec();

        // Chronological validation split from the tail of the training set.
        let val_count = ((n as f64) * self.config.validation_split) as usize;
        let train_count = n - val_count;
        if train_count == 0 {
            return Err(PipelineError::InsufficientData {
                required: 2,
                actual: n,
            });
        }
        let (train_x, val_x) = features.split_at(train_count);
        let (train_y, val_y) = targets.split_at(train_count);

        let mut best_val = f64::INFINITY;
        let mut best_head = self.head.clone();
        let mut strikes = 0usize;
        let mut stopped_early = false;
        let mut epochs_run = 0usize;
        let mut last_train_mse = 0.0;

        for epoch in 0..self.config.epochs {
            epochs_run = epoch + 1;

            let mut epoch_loss = 0.0;
            let mut batches = 0usize;
            for start in (0..train_count).step_by(self.config.batch_size.max(1)) {
                let end = (start + self.config.batch_size.max(1)).min(train_count);
                let loss = self.head.train_batch(
                    &train_x[start..end],
                    &train_y[start..end],
                    self.config.learning_rate,
                    &mut self.rng,
                );
                if !loss.is_finite() {
                    return Err(PipelineError::ModelTraining(format!(
                        "non-finite training loss at epoch {epoch}"
                    )));
                }
                epoch_loss += loss;
                batches += 1;
            }
            last_train_mse = epoch_loss / batches.max(1) as f64;

            // Validation loss falls back to training loss when the split is
            // too small to hold anything out.
            let val_mse = if val_count > 0 {
                self.head.batch_mse(val_x, val_y)
            } else {
                last_train_mse
            };
            if !val_mse.is_finite() {
                return Err(PipelineError::ModelTraining(format!(
                    "non-finite validation loss at epoch {epoch}"
                )));
            }

            debug!(
                epoch,
                train_mse = last_train_mse,
                val_mse,
                "training epoch complete"
            );

            if val_mse + 1e-12 < best_val {
                best_val = val_mse;
                best_head = self.head.clone();
                strikes = 0;
            } else {
                strikes += 1;
                if strikes >= self.config.patience {
                    stopped_early = true;
                    break;
                }
            }
        }

        self.head = best_head;
        Ok(TrainingReport {
            epochs_run,
            best_validation_mse: best_val,
            final_training_mse: last_train_mse,
            stopped_early,
        })
    }

    /// Predict one scalar (normalized price) per window.
    pub fn predict(&self, windows: &Array3<f64>) -> Vec<f64> {
        self.extract_all(windows)
            .iter()
            .map(|f| self.head.predict(f))
            .collect()
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}

/// Smallest lookback that leaves at least one step after the conv stack.
fn min_lookback(config: &ModelConfig) -> usize {
    let k = config.kernel_size;
    let p = config.pool_size;
    // Invert the stage arithmetic for one surviving step.
    ((p + k - 1) * p) + k - 1
}
