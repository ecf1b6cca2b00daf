// Async facade over the indicator engine
pub mod indicator_service;

pub use indicator_service::IndicatorService;
