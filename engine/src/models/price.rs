// Validated price point
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::EngineError;
use shared::models::Candle;

/// Upper bound for a sane price. Anything above is treated as corrupt input.
pub const MAX_PRICE_VALUE: f64 = 1_000_000_000_000.0;

/// A single observed price. Fields are private so every instance has passed
/// through [`Price::new`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Price {
    symbol: String,
    value: f64,
    timestamp: DateTime<Utc>,
}

impl Price {
    pub fn new(symbol: impl Into<String>, value: f64, timestamp: DateTime<Utc>) -> Result<Self, EngineError> {
        let symbol = symbol.into();
        if symbol.trim().is_empty() {
            return Err(EngineError::validation("symbol must not be empty"));
        }
        if !value.is_finite() {
            return Err(EngineError::validation(format!("price for {} must be a finite number", symbol)));
        }
        if value < 0.0 {
            return Err(EngineError::validation(format!("price for {} must not be negative, got {}", symbol, value)));
        }
        if value > MAX_PRICE_VALUE {
            return Err(EngineError::validation(format!(
                "price for {} exceeds maximum of {}, got {}",
                symbol, MAX_PRICE_VALUE, value
            )));
        }
        Ok(Self { symbol, value, timestamp })
    }

    /// Price point taken from the bar close, stamped with the bar open time.
    pub fn from_candle(symbol: &str, candle: &Candle) -> Result<Self, EngineError> {
        Self::new(symbol, candle.close, candle.timestamp)
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Converts a candle series to closes, failing on the first invalid close.
pub fn prices_from_candles(symbol: &str, candles: &[Candle]) -> Result<Vec<Price>, EngineError> {
    candles.iter().map(|c| Price::from_candle(symbol, c)).collect()
}
