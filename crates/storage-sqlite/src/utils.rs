//! Timestamp encoding shared by the repositories.
//!
//! Timestamps are stored as RFC 3339 text with millisecond precision and a
//! `Z` suffix. The fixed width keeps lexicographic order equal to time
//! order, so range filters can compare the text directly.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::errors::StorageError;

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::SerializationError(format!("bad timestamp '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timestamp_text_is_fixed_width_and_ordered() {
        let a = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let b = Utc.timestamp_millis_opt(1_700_000_000_500).unwrap();
        let (fa, fb) = (format_timestamp(a), format_timestamp(b));

        assert_eq!(fa, "2023-11-14T22:13:20.000Z");
        assert_eq!(fa.len(), fb.len());
        assert!(fa < fb);
        assert_eq!(parse_timestamp(&fb).unwrap(), b);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_err());
    }
}
