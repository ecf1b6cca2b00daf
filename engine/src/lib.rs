// Engine library root
// Technical indicators, timeframe aggregation and multi-timeframe alignment
// over historical price series.

pub mod analysis;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod models;
pub mod services;
pub mod timeframe;

pub use analysis::{AlignmentAnalyzer, CancellationFlag, MultiTimeframeCalculator};
pub use config::EngineSettings;
pub use error::EngineError;
pub use indicators::{IndicatorCalculator, IndicatorFactory};
pub use services::IndicatorService;
pub use timeframe::TimeframeConverter;
