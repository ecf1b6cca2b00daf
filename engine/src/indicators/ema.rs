// Exponential Moving Average (EMA) indicator implementation
use super::{result_for, validate_series, IndicatorCalculator};
use crate::error::EngineError;
use crate::models::{IndicatorDetail, IndicatorKind, IndicatorValue, Price};
use serde_json::Value;

#[derive(Debug)]
pub struct Ema {
    name: String,
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Result<Self, EngineError> {
        if period == 0 {
            return Err(EngineError::validation("period must be greater than 0"));
        }
        Ok(Self {
            name: format!("EMA({})", period),
            period,
        })
    }
}

/// EMA series seeded with the SMA of the first `period` values.
///
/// Element `i` of the output corresponds to input index `period - 1 + i`.
/// Returns an empty vector when `values.len() < period` or `period == 0`.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }
    let multiplier = 2.0 / (period as f64 + 1.0);

    // Calculate initial SMA for the first EMA value
    let initial_sum: f64 = values.iter().take(period).sum();
    let mut previous_ema = initial_sum / period as f64;

    let mut results = Vec::with_capacity(values.len() - period + 1);
    results.push(previous_ema);
    for value in &values[period..] {
        let ema = multiplier * value + (1.0 - multiplier) * previous_ema;
        results.push(ema);
        previous_ema = ema;
    }
    results
}

impl IndicatorCalculator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Ema
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn min_data_points(&self) -> usize {
        self.period
    }

    fn calculate(&self, data: &[Price]) -> Result<IndicatorValue, EngineError> {
        validate_series(data, self.min_data_points())?;
        let closes: Vec<f64> = data.iter().map(Price::value).collect();
        let series = ema_series(&closes, self.period);
        let value = *series
            .last()
            .ok_or(EngineError::InsufficientData { required: self.period, actual: data.len() })?;
        Ok(result_for(data, value, IndicatorDetail::Average))
    }
}
