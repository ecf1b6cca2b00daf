// Stochastic Oscillator (%K) indicator implementation
use super::{result_for, validate_series, window_extremes, IndicatorCalculator};
use crate::error::EngineError;
use crate::models::{IndicatorDetail, IndicatorKind, IndicatorValue, OscillatorResult, Price};
use serde_json::Value;

// Reported when the window has no range.
const NEUTRAL_K: f64 = 50.0;

#[derive(Debug)]
pub struct StochasticOscillator {
    name: String,
    period: usize,
}

impl StochasticOscillator {
    pub fn new(period: usize) -> Result<Self, EngineError> {
        if period == 0 {
            return Err(EngineError::validation("period must be greater than 0"));
        }
        Ok(Self {
            name: format!("STOCH({})", period),
            period,
        })
    }
}

impl IndicatorCalculator for StochasticOscillator {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> IndicatorKind {
        IndicatorKind::Stochastic
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
        let k = if range == 0.0 {
            NEUTRAL_K
        } else {
            ((close - lowest) / range * 100.0).clamp(0.0, 100.0)
        };

        Ok(result_for(
            data,
            k,
            IndicatorDetail::Oscillator(OscillatorResult { lower_bound: 0.0, upper_bound: 100.0 }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::test_support::{assert_close, prices};

    #[test]
    fn test_stochastic_at_window_high() {
        let data = prices(&[5.0, 3.0, 4.0, 8.0]);
        let result = StochasticOscillator::new(3).unwrap().calculate(&data).unwrap();
        assert_eq!(result.value, 100.0);
    }

    #[test]
    fn test_stochastic_at_window_low() {
        let data = prices(&[5.0, 7.0, 6.0, 1.0]);
        let result = StochasticOscillator::new(4).unwrap().calculate(&data).unwrap();
        assert_eq!(result.value, 0.0);
    }

    #[test]
    fn test_stochastic_midpoint() {
        let data = prices(&[10.0, 20.0, 15.0]);
        let result = StochasticOscillator::new(3).unwrap().calculate(&data).unwrap();
        assert_close(result.value, 50.0, 1e-12);
        let data = prices(&[10.0, 20.0, 12.5]);
        let result = StochasticOscillator::new(3).unwrap().calculate(&data).unwrap();
        assert_close(result.value, 25.0, 1e-12);
    }

    #[test]
    fn test_stochastic_zero_range_is_neutral() {
        let data = prices(&[99.0, 7.0, 7.0, 7.0]);
        let result = StochasticOscillator::new(3).unwrap().calculate(&data).unwrap();
        assert_eq!(result.value, 50.0);
    }

    #[test]
    fn test_stochastic_range_property() {
        let data = prices(&[3.0, 9.0, 1.0, 4.0, 6.0, 2.0, 8.0, 5.0, 7.0]);
        for period in 1..=data.len() {
            let k = StochasticOscillator::new(period).unwrap().calculate(&data).unwrap().value;
            assert!((0.0..=100.0).contains(&k));
        }
    }

    #[test]
    fn test_stochastic_insufficient_data() {
        let err = StochasticOscillator::new(14).unwrap().calculate(&prices(&[1.0, 2.0])).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData { required: 14, actual: 2 }));
    }
}
