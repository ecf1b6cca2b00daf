use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One OHLCV bar. `timestamp` is the bar open time.
///
/// `low <= open, close <= high` is expected of well-formed input but is not
/// re-checked here; the engine computes on whatever it is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self { timestamp, open, high, low, close, volume }
    }
}

/// Candle bucket durations. Variants are declared shortest first, so the
/// derived `Ord` follows duration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimeFrame {
    Minute1,
    Minute5,
    Minute15,
    Hour1,
    Hour4,
    Day1,
    Week1,
}

impl TimeFrame {
    /// Fixed bucket length in minutes.
    pub fn minutes(&self) -> u32 {
        match self {
            TimeFrame::Minute1 => 1,
            TimeFrame::Minute5 => 5,
            TimeFrame::Minute15 => 15,
            TimeFrame::Hour1 => 60,
            TimeFrame::Hour4 => 240,
            TimeFrame::Day1 => 1440,
            TimeFrame::Week1 => 10080,
        }
    }

    pub fn seconds(&self) -> i64 {
        i64::from(self.minutes()) * 60
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeFrame::Minute1 => "1m",
            TimeFrame::Minute5 => "5m",
            TimeFrame::Minute15 => "15m",
            TimeFrame::Hour1 => "1h",
            TimeFrame::Hour4 => "4h",
            TimeFrame::Day1 => "1d",
            TimeFrame::Week1 => "1w",
        }
    }

    pub fn all() -> &'static [TimeFrame] {
        &[
            TimeFrame::Minute1,
            TimeFrame::Minute5,
            TimeFrame::Minute15,
            TimeFrame::Hour1,
            TimeFrame::Hour4,
            TimeFrame::Day1,
            TimeFrame::Week1,
        ]
    }
}

impl fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseModelError(pub String);

impl fmt::Display for ParseModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for ParseModelError {}

impl FromStr for TimeFrame {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1m" | "m1" | "minute1" => Ok(TimeFrame::Minute1),
            "5m" | "m5" | "minute5" => Ok(TimeFrame::Minute5),
            "15m" | "m15" | "minute15" => Ok(TimeFrame::Minute15),
            "1h" | "h1" | "hour1" => Ok(TimeFrame::Hour1),
            "4h" | "h4" | "hour4" => Ok(TimeFrame::Hour4),
            "1d" | "d1" | "day1" => Ok(TimeFrame::Day1),
            "1w" | "w1" | "week1" => Ok(TimeFrame::Week1),
            other => Err(ParseModelError(format!("Unknown timeframe: {}", other))),
        }
    }
}

/// Tags for the closed set of supported indicators.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IndicatorKind {
    Sma,
    Ema,
    Rsi,
    BollingerBands,
    Stochastic,
    Macd,
    WilliamsR,
}

impl IndicatorKind {
    pub fn short_name(&self) -> &'static str {
        match self {
            IndicatorKind::Sma => "SMA",
            IndicatorKind::Ema => "EMA",
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::BollingerBands => "BB",
            IndicatorKind::Stochastic => "STOCH",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::WilliamsR => "WR",
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for IndicatorKind {
    type Err = ParseModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sma" => Ok(IndicatorKind::Sma),
            "ema" => Ok(IndicatorKind::Ema),
            "rsi" => Ok(IndicatorKind::Rsi),
            "bb" | "bollinger" | "bollinger_bands" | "bollingerbands" => Ok(IndicatorKind::BollingerBands),
            "stoch" | "stochastic" => Ok(IndicatorKind::Stochastic),
            "macd" => Ok(IndicatorKind::Macd),
            "wr" | "williams_r" | "williamsr" | "williams" => Ok(IndicatorKind::WilliamsR),
            other => Err(ParseModelError(format!("Unknown indicator type: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OscillatorResult {
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandResult {
    pub middle_band: f64,
    pub upper_band: f64,
    pub lower_band: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdResult {
    pub macd_line: f64,
    pub signal_line: f64,
    pub histogram: f64,
}

/// Indicator-specific payload riding alongside the scalar value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndicatorDetail {
    Average,
    Oscillator(OscillatorResult),
    Bands(BandResult),
    Macd(MacdResult),
}

/// Canonical scalar signal plus the input window it summarizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorValue {
    pub value: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub detail: IndicatorDetail,
}

/// What a fetch-then-compute call hands back. `Empty` means "no signal"
/// (upstream had no data), not a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum IndicatorResult {
    Value(IndicatorValue),
    Empty,
}

impl IndicatorResult {
    pub fn value(&self) -> Option<f64> {
        match self {
            IndicatorResult::Value(v) => Some(v.value),
            IndicatorResult::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, IndicatorResult::Empty)
    }

    pub fn as_value(&self) -> Option<&IndicatorValue> {
        match self {
            IndicatorResult::Value(v) => Some(v),
            IndicatorResult::Empty => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TrendDirection {
    Bullish,
    Bearish,
    Neutral,
}

impl TrendDirection {
    /// +1 for Bullish, -1 for Bearish, 0 for Neutral.
    pub fn sign(&self) -> f64 {
        match self {
            TrendDirection::Bullish => 1.0,
            TrendDirection::Bearish => -1.0,
            TrendDirection::Neutral => 0.0,
        }
    }
}

/// Result of comparing one indicator across several timeframes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeAlignment {
    pub alignment_score: f64,
    pub trend_direction: TrendDirection,
    pub confluence_strength: f64,
    pub values_by_timeframe: BTreeMap<TimeFrame, f64>,
    pub strongest_timeframe: Option<TimeFrame>,
    pub weakest_timeframe: Option<TimeFrame>,
    pub is_strong_confluence: bool,
}

/// Introspection record for one registered indicator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorDescriptor {
    pub kind: IndicatorKind,
    pub name: String,
    pub short_name: String,
    pub default_period: usize,
    pub min_period: usize,
    pub max_period: usize,
}
