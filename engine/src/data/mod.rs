// Market data collaborators: the provider contract plus an in-memory store
// and a CSV loader that feed it.
pub mod csv_parser;
pub mod market_data;
pub mod provider;

pub use market_data::{MarketDataStore, SharedMarketDataStore};
pub use provider::MarketDataProvider;
