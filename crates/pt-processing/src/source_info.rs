//! Time range and identity of a processed data source

use chrono::{DateTime, Duration, Utc};

use crate::ProcessingError;

/// Describes the span of events found in a processed source.
///
/// Timestamps are nanoseconds on the trace clock; the wall clock time anchors
/// the first event to real time. The span between the first and last event
/// always fits in an `i64` and lands on a representable wall clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSourceInfo {
    first_event_timestamp_ns: i64,
    last_event_timestamp_ns: i64,
    first_event_wall_clock_utc: DateTime<Utc>,
}

impl DataSourceInfo {
    pub fn new(
        first_event_timestamp_ns: i64,
        last_event_timestamp_ns: i64,
        first_event_wall_clock_utc: DateTime<Utc>,
    ) -> Result<Self, ProcessingError> {
        let invalid = || ProcessingError::InvalidTimeRange {
            first: first_event_timestamp_ns,
            last: last_event_timestamp_ns,
        };
        let duration = last_event_timestamp_ns
            .checked_sub(first_event_timestamp_ns)
            .filter(|duration| *duration >= 0)
            .ok_or_else(invalid)?;
        first_event_wall_clock_utc
            .checked_add_signed(Duration::nanoseconds(duration))
            .ok_or_else(invalid)?;
        Ok(Self {
            first_event_timestamp_ns,
            last_event_timestamp_ns,
            first_event_wall_clock_utc,
        })
    }

    /// A source with no events, anchored at the given wall clock time
    pub fn empty(first_event_wall_clock_utc: DateTime<Utc>) -> Self {
        Self {
            first_event_timestamp_ns: 0,
            last_event_timestamp_ns: 0,
            first_event_wall_clock_utc,
        }
    }

    pub fn first_event_timestamp_ns(&self) -> i64 {
        self.first_event_timestamp_ns
    }

    pub fn last_event_timestamp_ns(&self) -> i64 {
        self.last_event_timestamp_ns
    }

    pub fn first_event_wall_clock_utc(&self) -> DateTime<Utc> {
        self.first_event_wall_clock_utc
    }

    /// Nanoseconds between the first and last event
    pub fn duration_ns(&self) -> i64 {
        self.last_event_timestamp_ns - self.first_event_timestamp_ns
    }

    /// Wall clock time of the last event
    pub fn last_event_wall_clock_utc(&self) -> DateTime<Utc> {
        // `new` checked that this addition stays in range
        self.first_event_wall_clock_utc + Duration::nanoseconds(self.duration_ns())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_inverted_range() {
        let err = DataSourceInfo::new(10, 5, DateTime::<Utc>::UNIX_EPOCH).unwrap_err();
        assert!(matches!(err, ProcessingError::InvalidTimeRange { first: 10, last: 5 }));
    }

    #[test]
    fn test_rejects_span_wider_than_i64() {
        let err = DataSourceInfo::new(i64::MIN, i64::MAX, DateTime::<Utc>::UNIX_EPOCH).unwrap_err();
        assert!(matches!(
            err,
            ProcessingError::InvalidTimeRange { first: i64::MIN, last: i64::MAX }
        ));
    }

    #[test]
    fn test_rejects_span_past_the_wall_clock_range() {
        assert!(DataSourceInfo::new(0, i64::MAX, DateTime::<Utc>::MAX_UTC).is_err());
    }

    #[test]
    fn test_widest_accepted_span() {
        let info = DataSourceInfo::new(0, i64::MAX, DateTime::<Utc>::UNIX_EPOCH).unwrap();
        assert_eq!(info.duration_ns(), i64::MAX);
        assert!(info.last_event_wall_clock_utc() > DateTime::<Utc>::UNIX_EPOCH);
    }

    #[test]
    fn test_wall_clock_of_last_event() {
        let info = DataSourceInfo::new(0, 2_000_000_000, DateTime::<Utc>::UNIX_EPOCH).unwrap();
        assert_eq!(info.duration_ns(), 2_000_000_000);
        assert_eq!(info.last_event_wall_clock_utc().timestamp(), 2);
    }
}
