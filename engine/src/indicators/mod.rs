// Technical indicators module
pub mod bollinger;
pub mod ema;
pub mod factory;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod williams_r;

pub use bollinger::BollingerBands;
pub use ema::Ema;
pub use factory::IndicatorFactory;
pub use macd::Macd;
pub use rsi::Rsi;
pub use sma::Sma;
pub use stochastic::StochasticOscillator;
pub use williams_r::WilliamsR;

use crate::error::EngineError;
use crate::models::{IndicatorDetail, IndicatorKind, IndicatorValue, Price};
use serde_json::Value;

// Common trait for all indicators
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn kind(&self) -> IndicatorKind;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    fn min_data_points(&self) -> usize;
    fn calculate(&self, data: &[Price]) -> Result<IndicatorValue, EngineError>;
}

/// Checks the preconditions every indicator shares: enough points and
/// strictly ascending timestamps.
pub fn validate_series(data: &[Price], required: usize) -> Result<(), EngineError> {
    if data.is_empty() || data.len() < required {
        return Err(EngineError::InsufficientData { required, actual: data.len() });
    }
    if let Some(i) = data.windows(2).position(|w| w[1].timestamp() <= w[0].timestamp()) {
        return Err(EngineError::UnsortedInput(format!(
            "timestamps must be strictly ascending; {} at index {} does not follow {}",
            data[i + 1].timestamp(),
            i + 1,
            data[i].timestamp()
        )));
    }
    Ok(())
}

/// Builds a result spanning the whole input series.
pub(crate) fn result_for(data: &[Price], value: f64, detail: IndicatorDetail) -> IndicatorValue {
    // Callers have run validate_series, so data is non-empty.
    IndicatorValue {
        value,
        start_time: data[0].timestamp(),
        end_time: data[data.len() - 1].timestamp(),
        detail,
    }
}

/// Highest and lowest value of the last `period` points.
pub(crate) fn window_extremes(data: &[Price], period: usize) -> (f64, f64) {
    data[data.len() - period..]
        .iter()
        .map(Price::value)
        .fold((f64::MIN, f64::MAX), |(hi, lo), v| (hi.max(v), lo.min(v)))
}
