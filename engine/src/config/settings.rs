// Engine settings, loaded from a JSON file or the embedded defaults
use serde::Deserialize;
use std::path::Path;

use crate::error::EngineError;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    // Worker threads for the multi-timeframe fan-out. 0 means one per CPU core.
    pub thread_pool_size: usize,
    pub indicators: IndicatorSettings,
    pub alignment: AlignmentSettings,
}

/// Default periods and auxiliary parameters used by the indicator factory.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct IndicatorSettings {
    pub sma_period: usize,
    pub ema_period: usize,
    pub rsi_period: usize,
    pub bollinger_period: usize,
    pub bollinger_std_factor: f64,
    pub stochastic_period: usize,
    pub macd_fast_period: usize,
    pub macd_slow_period: usize,
    pub macd_signal_period: usize,
    pub williams_r_period: usize,
    // Largest period the factory accepts (MACD is capped by its slow period instead).
    pub max_period: usize,
}

/// Tuning for the alignment analyzer.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AlignmentSettings {
    // Multiplier on the coefficient of variation: score = 1 / (1 + sensitivity * cv).
    pub dispersion_sensitivity: f64,
    // Relative tolerance for the first-vs-last trend comparison.
    pub trend_tolerance: f64,
    pub strong_alignment_threshold: f64,
    pub strong_confluence_threshold: f64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            thread_pool_size: 0,
            indicators: IndicatorSettings::default(),
            alignment: AlignmentSettings::default(),
        }
    }
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        IndicatorSettings {
            sma_period: 20,
            ema_period: 20,
            rsi_period: 14,
            bollinger_period: 20,
            bollinger_std_factor: 2.0,
            stochastic_period: 14,
            macd_fast_period: 12,
            macd_slow_period: 26,
            macd_signal_period: 9,
            williams_r_period: 14,
            max_period: 500,
        }
    }
}

impl Default for AlignmentSettings {
    fn default() -> Self {
        AlignmentSettings {
            dispersion_sensitivity: 10.0,
            trend_tolerance: 1e-9,
            strong_alignment_threshold: 0.8,
            strong_confluence_threshold: 0.8,
        }
    }
}

impl EngineSettings {
    /// Settings bundled with the crate (`config/default.json`).
    pub fn load_default() -> Result<Self, EngineError> {
        let config_str = include_str!("../../config/default.json");
        Self::from_json(config_str)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "Loaded engine settings file");
        Self::from_json(&config_str)
    }

    pub fn from_json(config_str: &str) -> Result<Self, EngineError> {
        let settings: EngineSettings = serde_json::from_str(config_str)
            .map_err(|e| EngineError::ConfigError(format!("Invalid settings JSON: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let ind = &self.indicators;
        if ind.macd_fast_period >= ind.macd_slow_period {
            return Err(EngineError::ConfigError(format!(
                "macd_fast_period ({}) must be less than macd_slow_period ({})",
                ind.macd_fast_period, ind.macd_slow_period
            )));
        }
        if ind.macd_signal_period == 0 {
            return Err(EngineError::ConfigError("macd_signal_period must be greater than 0".to_string()));
        }
        if !(ind.bollinger_std_factor.is_finite() && ind.bollinger_std_factor > 0.0) {
            return Err(EngineError::ConfigError("bollinger_std_factor must be a positive number".to_string()));
        }
        let al = &self.alignment;
        if !(al.dispersion_sensitivity.is_finite() && al.dispersion_sensitivity > 0.0) {
            return Err(EngineError::ConfigError("dispersion_sensitivity must be a positive number".to_string()));
        }
        if !(al.trend_tolerance.is_finite() && al.trend_tolerance >= 0.0) {
            return Err(EngineError::ConfigError("trend_tolerance must be a non-negative number".to_string()));
        }
        if !(0.0..=1.0).contains(&al.strong_alignment_threshold) || !(0.0..=1.0).contains(&al.strong_confluence_threshold) {
            return Err(EngineError::ConfigError("alignment thresholds must lie in [0, 1]".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_embedded_defaults_match_code_defaults() {
        let loaded = EngineSettings::load_default().unwrap();
        assert_eq!(loaded, EngineSettings::default());
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let settings = EngineSettings::from_json(r#"{ "thread_pool_size": 2, "alignment": { "dispersion_sensitivity": 5.0 } }"#).unwrap();
        assert_eq!(settings.thread_pool_size, 2);
        assert_eq!(settings.alignment.dispersion_sensitivity, 5.0);
        assert_eq!(settings.alignment.strong_alignment_threshold, 0.8);
        assert_eq!(settings.indicators.rsi_period, 14);
    }

    #[test]
    fn test_rejects_inverted_macd_defaults() {
        let err = EngineSettings::from_json(r#"{ "indicators": { "macd_fast_period": 30, "macd_slow_period": 26 } }"#).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
    }

    #[test]
    fn test_rejects_zero_macd_signal_period() {
        let err = EngineSettings::from_json(r#"{ "indicators": { "macd_signal_period": 0 } }"#).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));
    }

    #[test]
    fn test_rejects_bad_trend_tolerance() {
        let err = EngineSettings::from_json(r#"{ "alignment": { "trend_tolerance": -0.1 } }"#).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));

        let mut settings = EngineSettings::default();
        settings.alignment.trend_tolerance = f64::NAN;
        assert!(matches!(settings.validate(), Err(EngineError::ConfigError(_))));
        settings.alignment.trend_tolerance = 0.0;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "indicators": {{ "bollinger_std_factor": 2.5 }} }}"#).unwrap();
        file.flush().unwrap();
        let settings = EngineSettings::load_from_file(file.path()).unwrap();
        assert_eq!(settings.indicators.bollinger_std_factor, 2.5);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = EngineSettings::load_from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, EngineError::IoError { .. }));
    }
}
