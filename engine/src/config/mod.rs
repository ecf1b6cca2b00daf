// Engine configuration
pub mod settings;

pub use settings::{AlignmentSettings, EngineSettings, IndicatorSettings};
