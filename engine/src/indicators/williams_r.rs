// Williams %R indicator implementation
use super::{result_for, validate_series, window_extremes, IndicatorCalculator};
use crate::error::EngineError;
use crate::models::{IndicatorDetail, IndicatorKind, IndicatorValue, OscillatorResult, Price};
use serde_json::Value;

const NEUTRAL_R: f64 = -50.0;

#[derive(Debug)]
pub struct WilliamsR {
    name: String,
    period: usize,
}

impl WilliamsR {
    pub fn new(period: usize) -> Result<Self, EngineError> {
        if period == 0 {
            return Err(EngineError::validation("period must be greater than 0"));
        }
        Ok(Self {
            name: format!("WR({})", period),
            period,
        })
    }
}

impl IndicatorCalculator for WilliamsR {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::WilliamsR
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "period": self.period })
    }

    fn min_data_points(&self) -> usize {
        self.period
    }

    fn calculate(&self, data: &[Price]) -> Result<IndicatorValue, EngineError> {
        validate_series(data, self.min_data_points())?;
        let (highest, lowest) = window_extremes(data, self.period);
        let close = data[data.len() - 1].value();

        let range = highest - lowest;
        let r = if range == 0.0 {
            NEUTRAL_R
        } else {
            ((highest - close) / range * -100.0).clamp(-100.0, 0.0)
        };

        Ok(result_for(
            data,
            r,
            IndicatorDetail::Oscillator(OscillatorResult { lower_bound: -100.0, upper_bound: 0.0 }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{assert_close, prices};

    #[test]
    fn test_williams_at_window_high() {
        let data = prices(&[5.0, 3.0, 4.0, 8.0]);
        let result = WilliamsR::new(3).unwrap().calculate(&data).unwrap();
        assert_eq!(result.value, 0.0);
    }

    #[test]
    fn test_williams_at_window_low() {
        let data = prices(&[5.0, 7.0, 6.0, 1.0]);
        let result = WilliamsR::new(4).unwrap().calculate(&data).unwrap();
        assert_eq!(result.value, -100.0);
    }

    #[test]
    fn test_williams_quarter_range() {
        // (20 - 17.5) / 10 * -100
        let data = prices(&[10.0, 20.0, 17.5]);
        let result = WilliamsR::new(3).unwrap().calculate(&data).unwrap();
        assert_close(result.value, -25.0, 1e-12);
    }

    #[test]
    fn test_williams_zero_range_is_neutral() {
        let result = WilliamsR::new(5).unwrap().calculate(&prices(&[4.0; 5])).unwrap();
        assert_eq!(result.value, -50.0);
    }

    #[test]
    fn test_williams_range_property() {
        let data = prices(&[3.0, 9.0, 1.0, 4.0, 6.0, 2.0, 8.0, 5.0, 7.0]);
        for period in 1..=data.len() {
            let r = WilliamsR::new(period).unwrap().calculate(&data).unwrap().value;
            assert!((0.0..=100.0).contains(&r.abs()));
        }
    }

    #[test]
    fn test_williams_bounds_in_detail() {
        let result = WilliamsR::new(2).unwrap().calculate(&prices(&[1.0, 2.0])).unwrap();
        assert_eq!(
            result.detail,
            IndicatorDetail::Oscillator(OscillatorResult { lower_bound: -100.0, upper_bound: 0.0 })
        );
    }
}
