// Engine-side value types. The plain serde models (Candle, TimeFrame, results)
// live in the `shared` crate; `Price` stays here because its factory reports
// `EngineError`.
pub mod price;

pub use price::{prices_from_candles, Price, MAX_PRICE_VALUE};
pub use shared::models::*;
