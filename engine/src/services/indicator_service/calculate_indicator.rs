// Handler for a single indicator over a fetched price series
use chrono::{DateTime, Utc};

use super::helpers::{validate_symbol, validate_time_range};
use crate::data::MarketDataProvider;
use crate::error::EngineError;
use crate::indicators::IndicatorFactory;
use crate::models::{IndicatorKind, IndicatorResult};

/// Validates arguments, fetches prices and computes one indicator.
///
/// An empty series is `IndicatorResult::Empty`; a non-empty series that is
/// too short is `InsufficientData`.
pub async fn handle_calculate_indicator<P: MarketDataProvider>(
    provider: &P,
    factory: &IndicatorFactory,
    symbol: &str,
    kind: IndicatorKind,
    period: usize,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<IndicatorResult, EngineError> {
    let indicator = factory.create_indicator(kind, period)?;
    validate_symbol(symbol)?;
    validate_time_range(start, end)?;

    let prices = provider.fetch_price_series(symbol, start, end).await?;
    if prices.is_empty() {
        tracing::warn!(symbol = %symbol, %kind, %start, %end, "No price data in range; returning empty result");
        return Ok(IndicatorResult::Empty);
    }

    match indicator.calculate(&prices) {
        Ok(value) => {
            tracing::debug!(symbol = %symbol, indicator = %indicator.name(), value = value.value, "Indicator calculated");
            Ok(IndicatorResult::Value(value))
        }
        Err(e) => {
            tracing::error!(symbol = %symbol, indicator = %indicator.name(), error = %e, "Indicator calculation failed");
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MarketDataStore, SharedMarketDataStore};
    use crate::models::{Candle, IndicatorDetail, TimeFrame};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
    }

    async fn store_with(closes: &[f64]) -> SharedMarketDataStore {
        let store = MarketDataStore::shared();
        let candles = closes
            .iter()
            .enumerate()
            .map(|(i, c)| Candle::new(t0() + Duration::minutes(i as i64), *c, *c, *c, *c, 1.0))
            .collect();
        store.write().await.add_candles("BTC", TimeFrame::Minute1, candles).unwrap();
        store
    }

    #[tokio::test]
    async fn test_zero_period_is_validation_error() {
        let store = store_with(&[1.0, 2.0, 3.0]).await;
        let err = handle_calculate_indicator(&store, &IndicatorFactory::default(), "BTC", IndicatorKind::Sma, 0, t0(), t0() + Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ValidationError(_)));
        assert!(err.to_string().contains("period must be greater than 0"));
    }

    #[tokio::test]
    async fn test_two_points_period_three_is_insufficient() {
        let store = store_with(&[1.0, 2.0]).await;
        let err = handle_calculate_indicator(&store, &IndicatorFactory::default(), "BTC", IndicatorKind::Sma, 3, t0(), t0() + Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientData { required: 3, actual: 2 }));
        assert!(err.to_string().contains("need at least 3, got 2"));
    }

    #[tokio::test]
    async fn test_no_data_is_empty_result() {
        let store = store_with(&[1.0, 2.0, 3.0]).await;
        let result = handle_calculate_indicator(&store, &IndicatorFactory::default(), "ETH", IndicatorKind::Rsi, 2, t0(), t0() + Duration::hours(1))
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_rejects_empty_symbol_and_inverted_range() {
        let store = store_with(&[1.0]).await;
        let factory = IndicatorFactory::default();
        let err = handle_calculate_indicator(&store, &factory, "", IndicatorKind::Sma, 2, t0(), t0() + Duration::hours(1))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ValidationError(_)));
        let err = handle_calculate_indicator(&store, &factory, "BTC", IndicatorKind::Sma, 2, t0(), t0())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_bollinger_returns_band_detail() {
        let store = store_with(&[10.0, 12.0, 11.0, 13.0, 12.0]).await;
        let result = handle_calculate_indicator(&store, &IndicatorFactory::default(), "BTC", IndicatorKind::BollingerBands, 5, t0(), t0() + Duration::hours(1))
            .await
            .unwrap();
        let value = result.as_value().unwrap();
        match &value.detail {
            IndicatorDetail::Bands(bands) => {
                assert!(bands.lower_band <= bands.middle_band && bands.middle_band <= bands.upper_band);
                assert_eq!(value.value, bands.middle_band);
            }
            other => panic!("expected bands, got {:?}", other),
        }
        assert_eq!(value.start_time, t0());
        assert_eq!(value.end_time, t0() + Duration::minutes(4));
    }
}
