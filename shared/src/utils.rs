// Time helpers shared by the engine and its consumers.
use chrono::{DateTime, Utc};

use crate::models::TimeFrame;

/// Floors `timestamp` to the start of its `timeframe` bucket.
///
/// Buckets are aligned on the Unix epoch, so daily buckets start at 00:00 UTC
/// and weekly buckets start on Thursday 00:00 UTC.
pub fn floor_to_timeframe(timestamp: DateTime<Utc>, timeframe: TimeFrame) -> DateTime<Utc> {
    let bucket = timeframe.seconds();
    let secs = timestamp.timestamp();
    let floored = secs - secs.rem_euclid(bucket);
    // `floored <= secs`, so it stays within chrono's representable range.
    DateTime::from_timestamp(floored, 0).unwrap_or(timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_floor_to_five_minutes() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 10, 7, 42).unwrap();
        let floored = floor_to_timeframe(ts, TimeFrame::Minute5);
        assert_eq!(floored, Utc.with_ymd_and_hms(2024, 1, 1, 10, 5, 0).unwrap());
    }

    #[test]
    fn test_floor_is_idempotent_on_boundary() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(floor_to_timeframe(ts, TimeFrame::Hour4), ts);
    }

    #[test]
    fn test_floor_to_day() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 15, 23, 59, 59).unwrap();
        assert_eq!(floor_to_timeframe(ts, TimeFrame::Day1), Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_floor_before_epoch() {
        let ts = Utc.with_ymd_and_hms(1969, 12, 31, 23, 58, 30).unwrap();
        assert_eq!(floor_to_timeframe(ts, TimeFrame::Minute5), Utc.with_ymd_and_hms(1969, 12, 31, 23, 55, 0).unwrap());
    }
}
