// Argument checks shared by the indicator service handlers
use chrono::{DateTime, Utc};

use crate::error::EngineError;

pub fn validate_symbol(symbol: &str) -> Result<(), EngineError> {
    if symbol.trim().is_empty() {
        return Err(EngineError::validation("symbol must not be empty"));
    }
    Ok(())
}

pub fn validate_time_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), EngineError> {
    if start >= end {
        return Err(EngineError::validation(format!("start ({}) must be before end ({})", start, end)));
    }
    Ok(())
}

/// Maps a failed blocking task (panic or runtime shutdown) into the engine error type.
pub fn join_error(e: tokio::task::JoinError) -> EngineError {
    EngineError::from(anyhow::anyhow!("Indicator worker task failed: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_validate_symbol() {
        assert!(validate_symbol("PETR4").is_ok());
        assert!(matches!(validate_symbol("  "), Err(EngineError::ValidationError(_))));
    }

    #[test]
    fn test_validate_time_range() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(validate_time_range(start, start + Duration::seconds(1)).is_ok());
        assert!(validate_time_range(start, start).is_err());
        assert!(validate_time_range(start + Duration::days(1), start).is_err());
    }
}
