// Simple Moving Average (SMA) indicator implementation
use super::{result_for, validate_series, IndicatorCalculator};
use crate::error::EngineError;
use crate::models::{IndicatorDetail, IndicatorKind, IndicatorValue, Price};
use serde_json::Value;

#[derive(Debug)]
pub struct Sma {
    name: String,
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Result<Self, EngineError> {
        if period == 0 {
            return Err(EngineError::validation("period must be greater than 0"));
        }
        Ok(Self {
            name: format!("SMA({})", period),
            period,
        })
    }
}

/// Mean of the last `period` values. Caller guarantees `values.len() >= period > 0`.
pub(crate) fn mean_of_last(values: &[f64], period: usize) -> f64 {
    values[values.len() - period..].iter().sum::<f64>() / period as f64
}

impl IndicatorCalculator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Sma
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
        let value = mean_of_last(&closes, self.period);
        Ok(result_for(data, value, IndicatorDetail::Average))
    }
}
