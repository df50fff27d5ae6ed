// =============================================================================
// Pipeline error types
// =============================================================================
//
// Every failure the pipeline can report is a tagged variant here.  Indicator
// warm-up and degenerate denominators are *not* errors — they surface as
// `None` entries in the indicator columns — but a pipeline stage that cannot
// proceed at all (empty feature matrix, too few rows for the lookback, a
// diverged training run) reports one of these.

use thiserror::Error;

/// Failure kinds surfaced by the indicator + forecasting pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Fewer rows than the stage requires (warm-up, lookback, or split).
    #[error("insufficient data: need at least {required} rows, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// The upstream data source returned an empty series for the symbol.
    #[error("invalid symbol: no data available for '{0}'")]
    InvalidSymbol(String),

    /// The raw series violates its ordering/finiteness invariants.
    #[error("invalid series: {0}")]
    InvalidSeries(String),

    /// An indicator column is degenerate in a way the caller must know about
    /// (e.g. every row undefined after warm-up handling).
    #[error("degenerate indicator: {0}")]
    DegenerateIndicator(String),

    /// Model training diverged or produced non-finite losses.
    #[error("model training failed: {0}")]
    ModelTraining(String),

    /// A configuration value is outside its valid range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, PipelineError>;
