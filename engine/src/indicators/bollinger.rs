// Bollinger Bands indicator implementation
use super::sma::mean_of_last;
use super::{result_for, validate_series, IndicatorCalculator};
use crate::error::EngineError;
use crate::models::{BandResult, IndicatorDetail, IndicatorKind, IndicatorValue, Price};
use serde_json::Value;

/// SMA envelope at `std_factor` population standard deviations.
#[derive(Debug)]
pub struct BollingerBands {
    name: String,
    period: usize,
    std_factor: f64,
}

impl BollingerBands {
    pub fn new(period: usize, std_factor: f64) -> Result<Self, EngineError> {
        if period == 0 {
            return Err(EngineError::validation("period must be greater than 0"));
        }
        if !(std_factor.is_finite() && std_factor > 0.0) {
            return Err(EngineError::validation(format!(
                "standard deviation factor must be a positive number, got {}",
                std_factor
            )));
        }
        Ok(Self {
            name: format!("BB({}, {})", period, std_factor),
            period,
            std_factor,
        })
    }
}

impl IndicatorCalculator for BollingerBands {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::BollingerBands
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period, "std_factor": self.std_factor })
    }

    fn min_data_points(&self) -> usize {
        self.period
    }

    fn calculate(&self, data: &[Price]) -> Result<IndicatorValue, EngineError> {
        validate_series(data, self.min_data_points())?;
        let closes: Vec<f64> = data.iter().map(Price::value).collect();
        let middle = mean_of_last(&closes, self.period);

        // Population variance (n, not n-1)
        let window = &closes[closes.len() - self.period..];
        let variance = window.iter().map(|x| (x - middle).powi(2)).sum::<f64>() / self.period as f64;
        let std_dev = variance.sqrt();

        let bands = BandResult {
            middle_band: middle,
            upper_band: middle + self.std_factor * std_dev,
            lower_band: middle - self.std_factor * std_dev,
        };
        Ok(result_for(data, middle, IndicatorDetail::Bands(bands)))
    }
}
