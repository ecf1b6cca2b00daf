// Cross-timeframe orchestration and alignment scoring
pub mod alignment;
pub mod multi_timeframe;

pub use alignment::AlignmentAnalyzer;
pub use multi_timeframe::{CancellationFlag, MultiTimeframeCalculator};
