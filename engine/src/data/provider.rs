// Upstream market data contract consumed by the indicator service
use std::future::Future;

use chrono::{DateTime, Utc};

use crate::error::EngineError;
use crate::models::{Candle, Price};

/// Source of historical prices and candles. Implementations return series
/// ordered by timestamp; an empty vector means "no data", not an error.
pub trait MarketDataProvider: Send + Sync {
    fn fetch_price_series(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Price>, EngineError>> + Send;

    fn fetch_candle_series(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> impl Future<Output = Result<Vec<Candle>, EngineError>> + Send;
}
