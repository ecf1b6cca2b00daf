// Alignment / confluence analysis across timeframes
use std::collections::BTreeMap;

use crate::config::AlignmentSettings;
use crate::models::{IndicatorValue, TimeFrame, TimeframeAlignment, TrendDirection};

/// Scale below which values are treated as all-zero when measuring dispersion.
const ZERO_SCALE: f64 = 1e-12;

/// Reduces per-timeframe indicator values to one alignment verdict.
#[derive(Debug, Clone, Default)]
pub struct AlignmentAnalyzer {
    settings: AlignmentSettings,
}

impl AlignmentAnalyzer {
    pub fn new(settings: AlignmentSettings) -> Self {
        Self { settings }
    }

    pub fn analyze(&self, results: &BTreeMap<TimeFrame, IndicatorValue>) -> TimeframeAlignment {
        let values: BTreeMap<TimeFrame, f64> = results.iter().map(|(tf, r)| (*tf, r.value)).collect();
        self.analyze_values(values)
    }

    /// Same as [`analyze`](Self::analyze) for bare scalars.
    pub fn analyze_values(&self, values_by_timeframe: BTreeMap<TimeFrame, f64>) -> TimeframeAlignment {
        // BTreeMap iteration is ascending by timeframe duration.
        let series: Vec<(TimeFrame, f64)> = values_by_timeframe.iter().map(|(tf, v)| (*tf, *v)).collect();

        match series.len() {
            0 => TimeframeAlignment {
                alignment_score: 0.0,
                trend_direction: TrendDirection::Neutral,
                confluence_strength: 0.0,
                values_by_timeframe,
                strongest_timeframe: None,
                weakest_timeframe: None,
                is_strong_confluence: false,
            },
            1 => TimeframeAlignment {
                alignment_score: 1.0,
                trend_direction: TrendDirection::Neutral,
                confluence_strength: 0.0,
                values_by_timeframe,
                strongest_timeframe: Some(series[0].0),
                weakest_timeframe: Some(series[0].0),
                is_strong_confluence: false,
            },
            _ => self.analyze_series(&series, values_by_timeframe),
        }
    }

    fn analyze_series(&self, series: &[(TimeFrame, f64)], values_by_timeframe: BTreeMap<TimeFrame, f64>) -> TimeframeAlignment {
        let values: Vec<f64> = series.iter().map(|(_, v)| *v).collect();
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let trend_direction = self.trend_direction(&values);
        let alignment_score = self.alignment_score(&values, mean);

        let sign = trend_direction.sign();
        let consistency = if sign == 0.0 {
            0.0
        } else {
            let agreeing = values.windows(2).filter(|w| (w[1] - w[0]) * sign > 0.0).count();
            agreeing as f64 / (values.len() - 1) as f64
        };
        let confluence_strength = (sign * consistency * alignment_score).clamp(-1.0, 1.0);

        // Deviation from the mean, oriented with the trend (absolute when neutral).
        let deviation = |v: f64| match trend_direction {
            TrendDirection::Bullish => v - mean,
            TrendDirection::Bearish => mean - v,
            TrendDirection::Neutral => (v - mean).abs(),
        };
        let (strongest_timeframe, weakest_timeframe) = extremes_by(series, deviation);

        let is_strong_confluence = alignment_score >= self.settings.strong_alignment_threshold
            && confluence_strength.abs() >= self.settings.strong_confluence_threshold;

        tracing::debug!(
            timeframes = series.len(),
            alignment_score,
            confluence_strength,
            ?trend_direction,
            "Computed timeframe alignment"
        );

        TimeframeAlignment {
            alignment_score,
            trend_direction,
            confluence_strength,
            values_by_timeframe,
            strongest_timeframe,
            weakest_timeframe,
            is_strong_confluence,
        }
    }

    /// First vs last value, with a tolerance relative to their magnitude.
    fn trend_direction(&self, values: &[f64]) -> TrendDirection {
        let first = values[0];
        let last = values[values.len() - 1];
        let tolerance = self.settings.trend_tolerance * first.abs().max(last.abs()).max(1.0);
        let delta = last - first;
        if delta > tolerance {
            TrendDirection::Bullish
        } else if delta < -tolerance {
            TrendDirection::Bearish
        } else {
            TrendDirection::Neutral
        }
    }

    /// `1 / (1 + sensitivity * cv)` with `cv = population std / mean(|v|)`.
    fn alignment_score(&self, values: &[f64], mean: f64) -> f64 {
        let n = values.len() as f64;
        let scale = values.iter().map(|v| v.abs()).sum::<f64>() / n;
        if scale < ZERO_SCALE {
            return 1.0;
        }
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let cv = variance.sqrt() / scale;
        if !cv.is_finite() {
            return 0.0;
        }
        (1.0 / (1.0 + self.settings.dispersion_sensitivity * cv)).clamp(0.0, 1.0)
    }
}

/// (argmax, argmin) of `score` over the series. Ties resolve to the lower
/// timeframe because only strictly better scores replace the current pick.
fn extremes_by<F>(series: &[(TimeFrame, f64)], score: F) -> (Option<TimeFrame>, Option<TimeFrame>)
where
    F: Fn(f64) -> f64,
{
    let mut max: Option<(TimeFrame, f64)> = None;
    let mut min: Option<(TimeFrame, f64)> = None;
    for &(tf, v) in series {
        let s = score(v);
        if max.map_or(true, |(_, best)| s > best) {
            max = Some((tf, s));
        }
        if min.map_or(true, |(_, best)| s < best) {
            min = Some((tf, s));
        }
    }
    (max.map(|(tf, _)| tf), min.map(|(tf, _)| tf))
}
