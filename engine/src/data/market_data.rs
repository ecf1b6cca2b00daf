// In-memory market data store, also usable as a MarketDataProvider
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::provider::MarketDataProvider;
use crate::error::EngineError;
use crate::models::{prices_from_candles, Candle, Price, TimeFrame};

/// Store shared between loaders and the indicator service.
pub type SharedMarketDataStore = Arc<RwLock<MarketDataStore>>;

pub struct MarketDataStore {
    // Stores market data per symbol and timeframe
    data: HashMap<String, HashMap<TimeFrame, Vec<Candle>>>,
}

impl MarketDataStore {
    pub fn new() -> Self {
        MarketDataStore { data: HashMap::new() }
    }

    pub fn shared() -> SharedMarketDataStore {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Merges candles into the series, keeping it sorted and free of duplicate timestamps.
    /// On duplicates the candle added last wins.
    pub fn add_candles(&mut self, symbol: &str, timeframe: TimeFrame, new_candles: Vec<Candle>) -> Result<()> {
        if symbol.trim().is_empty() {
            anyhow::bail!("Cannot store candles without a symbol");
        }
        let symbol_data = self.data.entry(symbol.to_string()).or_default();
        let timeframe_data = symbol_data.entry(timeframe).or_default();

        // Newest first within equal timestamps so dedup keeps the latest insert.
        let mut merged: Vec<Candle> = new_candles.into_iter().rev().chain(timeframe_data.drain(..).rev()).collect();
        merged.sort_by_key(|c| c.timestamp);
        merged.dedup_by_key(|c| c.timestamp);
        *timeframe_data = merged;

        Ok(())
    }

    pub fn get_candles(
        &self,
        symbol: &str,
        timeframe: TimeFrame,
        from_timestamp: Option<DateTime<Utc>>,
        to_timestamp: Option<DateTime<Utc>>,
    ) -> Option<Vec<Candle>> {
        self.data.get(symbol).and_then(|symbol_data| symbol_data.get(&timeframe)).map(|candles| {
            candles
                .iter()
                .filter(|c| from_timestamp.map_or(true, |start| c.timestamp >= start))
                .filter(|c| to_timestamp.map_or(true, |end| c.timestamp <= end))
                .cloned()
                .collect()
        })
    }

    /// Smallest timeframe stored for `symbol`.
    pub fn finest_timeframe(&self, symbol: &str) -> Option<TimeFrame> {
        self.data
            .get(symbol)
            .and_then(|symbol_data| symbol_data.iter().filter(|(_, c)| !c.is_empty()).map(|(tf, _)| *tf).min())
    }
}

impl Default for MarketDataStore {
    fn default() -> Self {
        Self::new()
    }
}

// Serves the finest stored timeframe; prices are bar closes.
impl MarketDataProvider for SharedMarketDataStore {
    async fn fetch_candle_series(&self, symbol: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Candle>, EngineError> {
        let store = self.read().await;
        let candles = store
            .finest_timeframe(symbol)
            .and_then(|timeframe| store.get_candles(symbol, timeframe, Some(start), Some(end)))
            .unwrap_or_default();
        drop(store); // Explicitly drop lock after data retrieval

        tracing::debug!(symbol = %symbol, count = candles.len(), "Fetched candle series from store");
        Ok(candles)
    }

    async fn fetch_price_series(&self, symbol: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Price>, EngineError> {
        let candles = self.fetch_candle_series(symbol, start, end).await?;
        prices_from_candles(symbol, &candles)
    }
}
