// Relative Strength Index (RSI) indicator implementation
use super::{result_for, validate_series, IndicatorCalculator};
use crate::error::EngineError;
use crate::models::{IndicatorDetail, IndicatorKind, IndicatorValue, OscillatorResult, Price};
use serde_json::Value;

#[derive(Debug)]
pub struct Rsi {
    name: String,
    period: usize,
}

impl Rsi {
    pub fn new(period: usize) -> Result<Self, EngineError> {
        if period == 0 {
            return Err(EngineError::validation("period must be greater than 0"));
        }
        Ok(Self {
            name: format!("RSI({})", period),
            period,
        })
    }
}

/// RSI from simple averages of the last `period` price changes.
///
/// Flat window gives 50; no losses gives 100; no gains gives 0.
fn rsi_from_window(window: &[f64], period: usize) -> f64 {
    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in window.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change; // losses are positive values
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            50.0
        } else {
            100.0
        }
    } else if avg_gain == 0.0 {
        0.0
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    }
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Rsi
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    // `period` changes need `period + 1` prices.
    fn min_data_points(&self) -> usize {
        self.period + 1
    }

    fn calculate(&self, data: &[Price]) -> Result<IndicatorValue, EngineError> {
        validate_series(data, self.min_data_points())?;
        let window: Vec<f64> = data[data.len() - (self.period + 1)..].iter().map(Price::value).collect();
        let value = rsi_from_window(&window, self.period);
        Ok(result_for(
            data,
            value,
            IndicatorDetail::Oscillator(OscillatorResult { lower_bound: 0.0, upper_bound: 100.0 }),
        ))
    }
}
