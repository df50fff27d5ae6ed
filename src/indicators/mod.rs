// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicator set feeding the
// forecasting pipeline.  Every output column is aligned 1:1 with its input
// series; steps without enough history or with a degenerate denominator are
// an explicit `None`, never a NaN — callers drop or handle undefined rows
// before modeling.

pub mod adx;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod vwap;

pub use adx::{adx, AdxColumns};
pub use bollinger::{bollinger, BollingerColumns};
pub use ema::{dema, ema};
pub use macd::{macd, macd_with, MacdColumns};
pub use rsi::rsi;
pub use sma::{sma, sma_partial};
pub use stochastic::{stochastic, StochasticColumns};
pub use vwap::vwap;
