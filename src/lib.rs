// =============================================================================
// stokis-engine — technical indicator & price forecasting pipeline
// =============================================================================
//
// Turns a daily OHLCV series into an indicator-enriched feature matrix,
// trains a CNN-BiLSTM forecaster on its past, and evaluates next-day price
// predictions over a held-out tail.
//
// Stages, in dependency order:
//
//   series     validated OHLCV input + data source trait
//   indicators SMA/EMA/DEMA/RSI/ADX/MACD/Bollinger/Stochastic/VWAP columns
//   features   warm-up-free feature matrix (close price in column 0)
//   dataset    chronological split, min-max scaling, lookback windows
//   model      CNN-BiLSTM with a trained regression head
//   forecast   end-to-end orchestration
//   evaluate   MSE / MAE / R^2 / accuracy over the predictions
//   cache      TTL-bounded read-through cache for fetched series
//   config     JSON pipeline configuration

pub mod cache;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod features;
pub mod forecast;
pub mod indicators;
pub mod model;
pub mod series;

pub use cache::{CachedSource, SeriesCache};
pub use config::PipelineConfig;
pub use dataset::{chronological_split, make_sequences, MinMaxScaler, SplitMatrix};
pub use error::{PipelineError, Result};
pub use evaluate::{ForecastMetrics, PredictionRecord};
pub use features::{FeatureMatrix, FEATURE_COLUMNS};
pub use forecast::{forecast, Forecast};
pub use model::{ForecastModel, ModelConfig, TrainingReport};
pub use series::{MarketDataSource, OhlcvBar, OhlcvSeries};
