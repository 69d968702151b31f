//! Event timestamp reconciliation
//!
//! The event log carries up to three candidate timestamp fields per record,
//! a leftover from a migration between two logging backends. Resolution is a
//! strict priority-ordered fallback:
//!
//! 1. `client_ts` — the client-reported event timestamp
//! 2. `server_ts` — when the server received the event
//! 3. `legacy_ts` — the old backend's log timestamp
//!
//! Each candidate string is parsed against two accepted formats, with and
//! without sub-second precision. A present-but-unparseable candidate is a
//! fatal error for the owning query; it is never silently skipped.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};

/// Accepted format with sub-second precision, tried first.
const FORMAT_SUBSEC: &str = "%Y-%m-%dT%H:%M:%S%.fZ";
/// Accepted format without sub-second precision.
const FORMAT_PLAIN: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse one timestamp string, retrying against the alternate format.
///
/// Sub-second precision does not change the resolved instant for inputs that
/// carry none; `2015-09-02T19:13:31Z` and `2015-09-02T19:13:31.000Z` resolve
/// identically.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, FORMAT_SUBSEC)
        .or_else(|_| NaiveDateTime::parse_from_str(value, FORMAT_PLAIN))
        .map(|naive| naive.and_utc())
        .map_err(|_| Error::Timestamp {
            value: value.to_string(),
        })
}

/// Resolve an event's authoritative timestamp from its candidate fields.
///
/// Tries the candidates in strict priority order; the first one present is
/// the authoritative value and must parse. `session_id` is carried only for
/// the error message when every candidate is absent.
pub fn resolve_event_timestamp(
    session_id: &str,
    client_ts: Option<&str>,
    server_ts: Option<&str>,
    legacy_ts: Option<&str>,
) -> Result<DateTime<Utc>> {
    let candidate = client_ts
        .or(server_ts)
        .or(legacy_ts)
        .ok_or_else(|| Error::MissingTimestamp {
            session_id: session_id.to_string(),
        })?;
    parse_timestamp(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_both_formats_same_instant() {
        let plain = parse_timestamp("2015-09-02T19:13:31Z").unwrap();
        let subsec = parse_timestamp("2015-09-02T19:13:31.000Z").unwrap();
        assert_eq!(plain, subsec);
        assert_eq!(plain, Utc.with_ymd_and_hms(2015, 9, 2, 19, 13, 31).unwrap());
    }

    #[test]
    fn test_parse_preserves_subseconds() {
        let ts = parse_timestamp("2015-09-02T19:13:31.250Z").unwrap();
        assert_eq!(ts.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        for bad in [
            "",
            "20150902191331",
            "2015-09-02 19:13:31",
            "2015-09-02T19:13:31",
            "not a timestamp",
        ] {
            assert!(parse_timestamp(bad).is_err(), "should reject {:?}", bad);
        }
    }

    #[test]
    fn test_resolve_priority_order() {
        let client = "2015-09-02T19:00:00Z";
        let server = "2015-09-02T19:00:05Z";
        let legacy = "2015-09-02T19:00:10Z";

        let resolved =
            resolve_event_timestamp("s1", Some(client), Some(server), Some(legacy)).unwrap();
        assert_eq!(resolved, parse_timestamp(client).unwrap());

        let resolved = resolve_event_timestamp("s1", None, Some(server), Some(legacy)).unwrap();
        assert_eq!(resolved, parse_timestamp(server).unwrap());

        let resolved = resolve_event_timestamp("s1", None, None, Some(legacy)).unwrap();
        assert_eq!(resolved, parse_timestamp(legacy).unwrap());
    }

    #[test]
    fn test_resolve_fails_when_all_absent() {
        let err = resolve_event_timestamp("s1", None, None, None).unwrap_err();
        assert!(matches!(err, Error::MissingTimestamp { .. }));
    }

    #[test]
    fn test_resolve_does_not_fall_past_unparseable_candidate() {
        // The highest-priority present candidate is authoritative; a broken
        // one fails the record instead of falling through to the next.
        let err = resolve_event_timestamp("s1", Some("garbage"), Some("2015-09-02T19:00:05Z"), None)
            .unwrap_err();
        assert!(matches!(err, Error::Timestamp { .. }));
    }
}
