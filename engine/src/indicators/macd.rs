// Moving Average Convergence Divergence (MACD) indicator implementation
use super::ema::ema_series;
use super::{result_for, validate_series, IndicatorCalculator};
use crate::error::EngineError;
use crate::models::{IndicatorDetail, IndicatorKind, IndicatorValue, MacdResult, Price};
use serde_json::Value;

#[derive(Debug)]
pub struct Macd {
    name: String,
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Macd {
    /// Periods are checked here so a bad configuration never reaches `calculate`.
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Result<Self, EngineError> {
        if fast_period == 0 || slow_period == 0 || signal_period == 0 {
            return Err(EngineError::validation("period must be greater than 0"));
        }
        if fast_period >= slow_period {
            return Err(EngineError::validation(format!(
                "MACD fast period ({}) must be less than slow period ({})",
                fast_period, slow_period
            )));
        }
        Ok(Self {
            name: format!("MACD({}, {}, {})", fast_period, slow_period, signal_period),
            fast_period,
            slow_period,
            signal_period,
        })
    }

    /// MACD line for every input index from `slow_period - 1` onward.
    fn macd_line_series(&self, closes: &[f64]) -> Vec<f64> {
        let fast = ema_series(closes, self.fast_period);
        let slow = ema_series(closes, self.slow_period);
        // fast[j] maps to input index j + fast_period - 1; line up both on slow's start.
        let offset = self.slow_period - self.fast_period;
        slow.iter().enumerate().map(|(j, s)| fast[j + offset] - s).collect()
    }
}

impl IndicatorCalculator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Macd
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "fast_period": self.fast_period,
            "slow_period": self.slow_period,
            "signal_period": self.signal_period,
        })
    }

    fn min_data_points(&self) -> usize {
        self.slow_period + self.signal_period
    }

    fn calculate(&self, data: &[Price]) -> Result<IndicatorValue, EngineError> {
        validate_series(data, self.min_data_points())?;
        let closes: Vec<f64> = data.iter().map(Price::value).collect();

        let macd_series = self.macd_line_series(&closes);
        let signal_series = ema_series(&macd_series, self.signal_period);
        let insufficient = || EngineError::InsufficientData { required: self.min_data_points(), actual: data.len() };
        let macd_line = *macd_series.last().ok_or_else(insufficient)?;
        let signal_line = *signal_series.last().ok_or_else(insufficient)?;

        let result = MacdResult {
            macd_line,
            signal_line,
            histogram: macd_line - signal_line,
        };
        Ok(result_for(data, macd_line, IndicatorDetail::Macd(result)))
    }
}
