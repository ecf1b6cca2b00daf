// engine/src/services/indicator_service/mod.rs
// Module hub for the indicator service: the IndicatorService struct and its
// entry points, each dispatching to a handler in a sibling module.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::analysis::{AlignmentAnalyzer, MultiTimeframeCalculator};
use crate::config::EngineSettings;
use crate::data::MarketDataProvider;
use crate::error::EngineError;
use crate::indicators::IndicatorFactory;
use crate::models::{Candle, IndicatorDescriptor, IndicatorKind, IndicatorResult, IndicatorValue, TimeFrame, TimeframeAlignment};

pub mod calculate_indicator;
pub mod calculate_multiple;
pub mod helpers;
pub mod multi_timeframe;

/// Entry point used by API layers and the CLI.
///
/// Market data comes from the injected provider. All CPU-bound work runs off
/// the async runtime, on the calculator's rayon pool or a blocking task.
pub struct IndicatorService<P: MarketDataProvider> {
    provider: Arc<P>,
    factory: Arc<IndicatorFactory>,
    calculator: Arc<MultiTimeframeCalculator>,
    analyzer: AlignmentAnalyzer,
}

impl<P: MarketDataProvider> IndicatorService<P> {
    pub fn new(provider: Arc<P>, settings: &EngineSettings) -> Result<Self, EngineError> {
        settings.validate()?;
        let factory = Arc::new(IndicatorFactory::new(&settings.indicators));
        let calculator = Arc::new(MultiTimeframeCalculator::new(factory.clone(), settings.thread_pool_size)?);
        tracing::info!(
            indicators = factory.list_supported_types().len(),
            thread_pool_size = settings.thread_pool_size,
            "Indicator service initialized"
        );
        Ok(IndicatorService {
            provider,
            factory,
            calculator,
            analyzer: AlignmentAnalyzer::new(settings.alignment.clone()),
        })
    }

    pub async fn calculate_indicator(
        &self,
        symbol: &str,
        kind: IndicatorKind,
        period: usize,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<IndicatorResult, EngineError> {
        tracing::info!(symbol = %symbol, %kind, period, "Received calculate_indicator, dispatching to handler.");
        calculate_indicator::handle_calculate_indicator(self.provider.as_ref(), &self.factory, symbol, kind, period, start, end).await
    }

    pub async fn calculate_multiple_indicators(
        &self,
        symbol: &str,
        specs: &[(IndicatorKind, usize)],
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<BTreeMap<IndicatorKind, IndicatorResult>, EngineError> {
        tracing::info!(symbol = %symbol, indicators = specs.len(), "Received calculate_multiple_indicators, dispatching to handler.");
        calculate_multiple::handle_calculate_multiple(self.provider.as_ref(), &self.calculator, symbol, specs, start, end).await
    }

    /// Aggregates `candles` (bars of the `source` timeframe) to every target
    /// timeframe, computes the indicator on each and summarizes how the
    /// results agree. Targets finer than `source` are left out.
    pub async fn calculate_multi_timeframe_indicators(
        &self,
        symbol: &str,
        candles: Vec<Candle>,
        source: TimeFrame,
        timeframes: &[TimeFrame],
        kind: IndicatorKind,
        period: usize,
    ) -> Result<(BTreeMap<TimeFrame, IndicatorValue>, TimeframeAlignment), EngineError> {
        tracing::info!(symbol = %symbol, %kind, period, timeframes = timeframes.len(), "Received calculate_multi_timeframe_indicators, dispatching to handler.");
        multi_timeframe::handle_multi_timeframe(&self.calculator, &self.analyzer, symbol, candles, source, timeframes, kind, period).await
    }

    pub fn list_supported_indicators(&self) -> Vec<IndicatorKind> {
        self.factory.list_supported_types()
    }

    pub fn describe_indicator(&self, kind: IndicatorKind) -> Result<IndicatorDescriptor, EngineError> {
        self.factory.describe(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MarketDataStore, SharedMarketDataStore};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    async fn service_with(closes: &[f64]) -> IndicatorService<SharedMarketDataStore> {
        let store = MarketDataStore::shared();
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, c)| Candle::new(t0() + Duration::minutes(i as i64), *c, *c, *c, *c, 1.0))
            .collect();
        store.write().await.add_candles("BTC", TimeFrame::Minute1, candles).unwrap();
        IndicatorService::new(Arc::new(store), &EngineSettings::default()).unwrap()
    }

    #[tokio::test]
    async fn test_lists_and_describes_indicators() {
        let service = service_with(&[]).await;
        assert_eq!(service.list_supported_indicators().len(), 7);
        let rsi = service.describe_indicator(IndicatorKind::Rsi).unwrap();
        assert_eq!(rsi.short_name, "RSI");
        assert_eq!(rsi.default_period, 14);
    }

    #[tokio::test]
    async fn test_rejects_invalid_settings() {
        let mut settings = EngineSettings::default();
        settings.indicators.macd_fast_period = 30;
        let result = IndicatorService::new(Arc::new(MarketDataStore::shared()), &settings);
        assert!(matches!(result, Err(EngineError::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_sma_over_stored_data() {
        let service = service_with(&[1.0, 2.0, 3.0, 4.0]).await;
        let result = service
            .calculate_indicator("BTC", IndicatorKind::Sma, 2, t0(), t0() + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(result.value(), Some(3.5));
    }
}
