// Handler for several indicators over one fetched price series
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::helpers::{join_error, validate_symbol, validate_time_range};
use crate::analysis::MultiTimeframeCalculator;
use crate::data::MarketDataProvider;
use crate::error::EngineError;
use crate::models::{IndicatorKind, IndicatorResult};

/// Every (kind, period) pair is validated before any data is fetched. After that, an
/// indicator whose calculation fails is left out of the map instead of
/// failing its siblings.
pub async fn handle_calculate_multiple<P: MarketDataProvider>(
    provider: &P,
    calculator: &Arc<MultiTimeframeCalculator>,
    symbol: &str,
    specs: &[(IndicatorKind, usize)],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<BTreeMap<IndicatorKind, IndicatorResult>, EngineError> {
    validate_symbol(symbol)?;
    validate_time_range(start, end)?;
    for &(kind, period) in specs {
        calculator.factory().create_indicator(kind, period)?;
    }

    let prices = provider.fetch_price_series(symbol, start, end).await?;
    if prices.is_empty() {
        tracing::warn!(symbol = %symbol, %start, %end, "No price data in range; every indicator is empty");
        return Ok(specs.iter().map(|(kind, _)| (*kind, IndicatorResult::Empty)).collect());
    }

    let calculator = Arc::clone(calculator);
    let specs = specs.to_vec();
    let values = tokio::task::spawn_blocking(move || calculator.calculate_batch(&prices, &specs))
        .await
        .map_err(join_error)?;

    tracing::debug!(symbol = %symbol, computed = values.len(), "Batch indicator calculation finished");
    Ok(values.into_iter().map(|(kind, value)| (kind, IndicatorResult::Value(value))).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MarketDataStore;
    use crate::indicators::IndicatorFactory;
    use crate::models::{Candle, TimeFrame};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    fn calculator() -> Arc<MultiTimeframeCalculator> {
        Arc::new(MultiTimeframeCalculator::new(Arc::new(IndicatorFactory::default()), 2).unwrap())
    }

    #[tokio::test]
    async fn test_mixed_batch_keeps_successes() {
        let store = MarketDataStore::shared();
        let candles = (0..20)
            .map(|i| {
                let c = 50.0 + i as f64;
                Candle::new(t0() + Duration::minutes(i), c, c, c, c, 1.0)
            })
            .collect();
        store.write().await.add_candles("PETR4", TimeFrame::Minute1, candles).unwrap();

        let specs = [(IndicatorKind::Sma, 4), (IndicatorKind::Rsi, 14), (IndicatorKind::Macd, 12)];
        let results = handle_calculate_multiple(&store, &calculator(), "PETR4", &specs, t0(), t0() + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(results[&IndicatorKind::Sma].value(), Some(67.5));
        assert_eq!(results[&IndicatorKind::Rsi].value(), Some(100.0));
        // MACD(12, 26, 9) needs 35 points
        assert!(!results.contains_key(&IndicatorKind::Macd));
    }

    #[tokio::test]
    async fn test_no_data_marks_every_kind_empty() {
        let store = MarketDataStore::shared();
        let specs = [(IndicatorKind::Sma, 4), (IndicatorKind::Ema, 4)];
        let results = handle_calculate_multiple(&store, &calculator(), "PETR4", &specs, t0(), t0() + Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.values().all(IndicatorResult::is_empty));
    }

    #[tokio::test]
    async fn test_invalid_spec_fails_before_fetch() {
        let store = MarketDataStore::shared();
        let specs = [(IndicatorKind::Sma, 4), (IndicatorKind::Ema, 0)];
        let err = handle_calculate_multiple(&store, &calculator(), "PETR4", &specs, t0(), t0() + Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ValidationError(_)));
    }
}
