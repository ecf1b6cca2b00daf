// Candle aggregation across timeframes
pub mod converter;

pub use converter::TimeframeConverter;
