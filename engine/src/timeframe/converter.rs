// Aggregates fine-grained candles into coarser timeframe bars
use chrono::{DateTime, Utc};

use crate::error::EngineError;
use crate::models::{Candle, TimeFrame};
use shared::utils::floor_to_timeframe;

/// Stateless converter between candle timeframes. Aggregation only goes
/// upward; there is no interpolation to finer bars.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeframeConverter;

impl TimeframeConverter {
    pub fn new() -> Self {
        Self
    }

    /// True when `target` is a whole multiple (greater than one) of `source`.
    pub fn can_convert(&self, source: TimeFrame, target: TimeFrame) -> bool {
        let (src, tgt) = (source.minutes(), target.minutes());
        tgt > src && tgt % src == 0
    }

    /// Checked variant of [`aggregate`](Self::aggregate) for callers that know
    /// the source timeframe.
    pub fn convert(&self, candles: &[Candle], source: TimeFrame, target: TimeFrame) -> Result<Vec<Candle>, EngineError> {
        if !self.can_convert(source, target) {
            return Err(EngineError::validation(format!("cannot convert candles from {} to {}", source, target)));
        }
        Ok(self.aggregate(candles, target))
    }

    /// Folds `candles` into `target` buckets aligned on the epoch.
    ///
    /// Input order does not matter (a stable sort runs first). Every bucket is
    /// emitted, including a trailing partial one. Bars are stamped with their
    /// bucket start.
    pub fn aggregate(&self, candles: &[Candle], target: TimeFrame) -> Vec<Candle> {
        if candles.is_empty() {
            return Vec::new();
        }

        let mut sorted: Vec<&Candle> = candles.iter().collect();
        sorted.sort_by_key(|c| c.timestamp);

        let mut aggregated = Vec::new();
        let mut current: Option<(DateTime<Utc>, Candle)> = None;

        for candle in sorted {
            let bucket_start = floor_to_timeframe(candle.timestamp, target);
            match current.as_mut() {
                Some((start, bar)) if *start == bucket_start => {
                    // Same bucket - update high, low, close, accumulate volume
                    bar.high = bar.high.max(candle.high);
                    bar.low = bar.low.min(candle.low);
                    bar.close = candle.close;
                    bar.volume += candle.volume;
                }
                _ => {
                    if let Some((_, bar)) = current.take() {
                        aggregated.push(bar);
                    }
                    let bar = Candle::new(bucket_start, candle.open, candle.high, candle.low, candle.close, candle.volume);
                    current = Some((bucket_start, bar));
                }
            }
        }

        // Last bucket is kept even if partial
        if let Some((_, bar)) = current {
            aggregated.push(bar);
        }

        tracing::trace!(source_bars = candles.len(), target_bars = aggregated.len(), timeframe = %target, "Aggregated candles");
        aggregated
    }
}
