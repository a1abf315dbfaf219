//! Timeline-anomaly detection
//!
//! Compares the two independent creation timestamps each MFT entry carries.
//! $STANDARD_INFORMATION times can be set from user mode; $FILE_NAME times
//! are only written by the kernel. A $FN creation time strictly earlier than
//! the $SI one is the classic signature of timestomping, where a tool copies
//! an older file's times into $SI.
//!
//! The detector is just one more attribute toggle in the filter vocabulary
//! ([`crate::query::AttributeToggles::anomaly_only`]), so it composes with
//! every other category instead of being a separate query path.

use chrono::Duration;

use crate::record::MftRecord;

/// Whether `record` shows a creation-time anomaly
///
/// True iff both creation timestamps are present and the $FN one is strictly
/// earlier than the $SI one minus `tolerance`. A record missing either
/// timestamp is never flagged (fails closed, consistent with the date-range
/// policy).
#[must_use]
pub fn is_timeline_anomaly(record: &MftRecord, tolerance: Duration) -> bool {
    match (record.fn_times.created, record.si_times.created) {
        (Some(fn_created), Some(si_created)) => fn_created < si_created - tolerance,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::record;
    use chrono::{TimeZone, Utc};

    fn at(secs: i64) -> chrono::DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_fn_earlier_than_si_is_anomalous() {
        let rec = record(1, "evil.exe")
            .si_created(at(1000))
            .fn_created(at(990))
            .build();
        assert!(is_timeline_anomaly(&rec, Duration::zero()));
    }

    #[test]
    fn test_equal_timestamps_not_anomalous() {
        let rec = record(1, "ok.exe")
            .si_created(at(1000))
            .fn_created(at(1000))
            .build();
        assert!(!is_timeline_anomaly(&rec, Duration::zero()));
    }

    #[test]
    fn test_fn_later_not_anomalous() {
        let rec = record(1, "ok.exe")
            .si_created(at(1000))
            .fn_created(at(1010))
            .build();
        assert!(!is_timeline_anomaly(&rec, Duration::zero()));
    }

    #[test]
    fn test_missing_timestamp_fails_closed() {
        let only_si = record(1, "a").si_created(at(1000)).build();
        let only_fn = record(2, "b").fn_created(at(1000)).build();
        let neither = record(3, "c").build();

        assert!(!is_timeline_anomaly(&only_si, Duration::zero()));
        assert!(!is_timeline_anomaly(&only_fn, Duration::zero()));
        assert!(!is_timeline_anomaly(&neither, Duration::zero()));
    }

    #[test]
    fn test_tolerance_absorbs_small_skew() {
        let rec = record(1, "skew.dat")
            .si_created(at(1000))
            .fn_created(at(995))
            .build();

        assert!(is_timeline_anomaly(&rec, Duration::zero()));
        assert!(!is_timeline_anomaly(&rec, Duration::seconds(5)));
        assert!(!is_timeline_anomaly(&rec, Duration::seconds(10)));
        assert!(is_timeline_anomaly(&rec, Duration::seconds(4)));
    }
}
