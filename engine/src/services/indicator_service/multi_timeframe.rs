// Handler for one indicator across several timeframes, plus alignment
use std::collections::BTreeMap;
use std::sync::Arc;

use super::helpers::{join_error, validate_symbol};
use crate::analysis::{AlignmentAnalyzer, MultiTimeframeCalculator};
use crate::error::EngineError;
use crate::models::{Candle, IndicatorKind, IndicatorValue, TimeFrame, TimeframeAlignment};

#[allow(clippy::too_many_arguments)]
pub async fn handle_multi_timeframe(
    calculator: &Arc<MultiTimeframeCalculator>,
    analyzer: &AlignmentAnalyzer,
    symbol: &str,
    candles: Vec<Candle>,
    source: TimeFrame,
    timeframes: &[TimeFrame],
    kind: IndicatorKind,
    period: usize,
) -> Result<(BTreeMap<TimeFrame, IndicatorValue>, TimeframeAlignment), EngineError> {
    validate_symbol(symbol)?;
    calculator.factory().create_indicator(kind, period)?;

    let calculator = Arc::clone(calculator);
    let owned_symbol = symbol.to_string();
    let targets = timeframes.to_vec();
    let results = tokio::task::spawn_blocking(move || {
        calculator.calculate_across_timeframes(&owned_symbol, &candles, source, &targets, kind, period)
    })
    .await
    .map_err(join_error)??;

    let alignment = analyzer.analyze(&results);
    tracing::info!(
        symbol = %symbol,
        %kind,
        %source,
        timeframes = results.len(),
        alignment_score = alignment.alignment_score,
        trend = ?alignment.trend_direction,
        strong = alignment.is_strong_confluence,
        "Multi-timeframe analysis complete"
    );
    Ok((results, alignment))
}
