// Data models shared between the indicator engine and its consumers
// (API layer, CLI). Plain serde value types, no behaviour beyond small helpers.
pub mod models;
pub mod utils;
