//! Runs indicators over several timeframes (or several indicators over one
//! series) in parallel on a bounded rayon pool.
//!
//! Each unit of work is pure and writes only its own key, so results are
//! collected straight into ordered maps. A unit that fails is logged and left
//! out of the map; it never aborts its siblings.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::error::EngineError;
use crate::indicators::{IndicatorCalculator, IndicatorFactory};
use crate::models::{prices_from_candles, Candle, IndicatorKind, IndicatorValue, Price, TimeFrame};
use crate::timeframe::TimeframeConverter;

/// Cooperative cancellation shared between a caller and a running batch.
/// Checked between work units, never inside a single calculation.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct MultiTimeframeCalculator {
    factory: Arc<IndicatorFactory>,
    converter: TimeframeConverter,
    pool: ThreadPool,
}

impl MultiTimeframeCalculator {
    /// `worker_threads == 0` sizes the pool to the number of CPU cores.
    pub fn new(factory: Arc<IndicatorFactory>, worker_threads: usize) -> Result<Self, EngineError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_threads)
            .thread_name(|i| format!("indicator-worker-{}", i))
            .build()
            .map_err(|e| EngineError::ConfigError(format!("Failed to build indicator worker pool: {}", e)))?;
        tracing::debug!(threads = pool.current_num_threads(), "Indicator worker pool ready");
        Ok(Self {
            factory,
            converter: TimeframeConverter::new(),
            pool,
        })
    }

    pub fn factory(&self) -> &Arc<IndicatorFactory> {
        &self.factory
    }

    /// Same indicator, one independent calculation per target timeframe.
    ///
    /// `candles` are bars of the `source` timeframe. A target equal to the
    /// source uses them as they are; a target that cannot be built from the
    /// source by upward aggregation is dropped.
    ///
    /// Configuration problems (bad period, empty symbol) fail the whole call
    /// up front. Data problems in one timeframe only drop that timeframe.
    pub fn calculate_across_timeframes(
        &self,
        symbol: &str,
        candles: &[Candle],
        source: TimeFrame,
        targets: &[TimeFrame],
        kind: IndicatorKind,
        period: usize,
    ) -> Result<BTreeMap<TimeFrame, IndicatorValue>, EngineError> {
        self.calculate_across_timeframes_with_cancel(symbol, candles, source, targets, kind, period, &CancellationFlag::new())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn calculate_across_timeframes_with_cancel(
        &self,
        symbol: &str,
        candles: &[Candle],
        source: TimeFrame,
        targets: &[TimeFrame],
        kind: IndicatorKind,
        period: usize,
        cancel: &CancellationFlag,
    ) -> Result<BTreeMap<TimeFrame, IndicatorValue>, EngineError> {
        if symbol.trim().is_empty() {
            return Err(EngineError::validation("symbol must not be empty"));
        }
        let indicator = self.factory.create_indicator(kind, period)?;
        if candles.is_empty() {
            tracing::debug!(symbol = %symbol, "No source candles; nothing to calculate");
            return Ok(BTreeMap::new());
        }

        let unique_targets: Vec<TimeFrame> = targets.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let indicator: &dyn IndicatorCalculator = indicator.as_ref();

        let results: BTreeMap<TimeFrame, IndicatorValue> = self.pool.install(|| {
            unique_targets
                .par_iter()
                .filter_map(|&timeframe| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    match self.calculate_for_timeframe(symbol, candles, source, timeframe, indicator) {
                        Ok(value) => Some((timeframe, value)),
                        Err(e) => {
                            tracing::warn!(
                                symbol = %symbol,
                                %source,
                                %timeframe,
                                indicator = %indicator.name(),
                                error = %e,
                                "Skipping timeframe after calculation failure"
                            );
                            None
                        }
                    }
                })
                .collect()
        });

        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        tracing::debug!(
            symbol = %symbol,
            indicator = %indicator.name(),
            requested = unique_targets.len(),
            computed = results.len(),
            "Multi-timeframe calculation finished"
        );
        Ok(results)
    }

    fn calculate_for_timeframe(
        &self,
        symbol: &str,
        candles: &[Candle],
        source: TimeFrame,
        timeframe: TimeFrame,
        indicator: &dyn IndicatorCalculator,
    ) -> Result<IndicatorValue, EngineError> {
        let bars = if timeframe == source {
            self.converter.aggregate(candles, source)
        } else {
            self.converter.convert(candles, source, timeframe)?
        };
        let prices = prices_from_candles(symbol, &bars)?;
        indicator.calculate(&prices)
    }

    /// Several different indicators over the same price series.
    pub fn calculate_batch(&self, prices: &[Price], specs: &[(IndicatorKind, usize)]) -> BTreeMap<IndicatorKind, IndicatorValue> {
        self.calculate_batch_with_cancel(prices, specs, &CancellationFlag::new())
            .unwrap_or_default()
    }

    pub fn calculate_batch_with_cancel(
        &self,
        prices: &[Price],
        specs: &[(IndicatorKind, usize)],
        cancel: &CancellationFlag,
    ) -> Result<BTreeMap<IndicatorKind, IndicatorValue>, EngineError> {
        // One calculation per kind; a later period for the same kind replaces an earlier one.
        let unique_specs: Vec<(IndicatorKind, usize)> = specs.iter().copied().collect::<BTreeMap<_, _>>().into_iter().collect();

        let results: BTreeMap<IndicatorKind, IndicatorValue> = self.pool.install(|| {
            unique_specs
                .par_iter()
                .filter_map(|&(kind, period)| {
                    if cancel.is_cancelled() {
                        return None;
                    }
                    let outcome = self
                        .factory
                        .create_indicator(kind, period)
                        .and_then(|indicator| indicator.calculate(prices));
                    match outcome {
                        Ok(value) => Some((kind, value)),
                        Err(e) => {
                            tracing::warn!(%kind, period, error = %e, "Skipping indicator after calculation failure");
                            None
                        }
                    }
                })
                .collect()
        });

        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        Ok(results)
    }
}
