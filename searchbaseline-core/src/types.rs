//! Core domain types for searchbaseline
//!
//! These types model the search event log (Layer 1) and the session-level
//! aggregates derived from it (Layer 2, never persisted).
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Event** | One logged user action: result-page view, result visit, or check-in |
//! | **Session** | Events sharing a session identifier, bounded by inactivity upstream |
//! | **Fulltext search** | A search submission producing a full result-listing page |
//! | **Autocomplete search** | An incremental suggestion interaction, keyed by session + page view |
//! | **Click-through** | A session in which the user visited at least one result |
//! | **Dwell time** | Seconds spent on a visited result page, captured via check-in events |
//! | **Zero-result search** | A fulltext search whose result count is absent |

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel used in the event log when a visit carried no result position.
pub const POSITION_ABSENT: i64 = -1;

// ============================================
// Event classification
// ============================================

/// Kind of logged user action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionKind {
    /// A search-result page was shown
    SearchResultPage,
    /// The user visited one of the results
    VisitPage,
    /// Periodic dwell check-in while on a visited result
    Checkin,
}

impl ActionKind {
    /// Returns the identifier used in event log storage
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::SearchResultPage => "searchResultPage",
            ActionKind::VisitPage => "visitPage",
            ActionKind::Checkin => "checkin",
        }
    }
}

impl std::str::FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "searchResultPage" => Ok(ActionKind::SearchResultPage),
            "visitPage" => Ok(ActionKind::VisitPage),
            "checkin" => Ok(ActionKind::Checkin),
            _ => Err(format!("unknown action kind: {}", s)),
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which search surface produced a result-page event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchSource {
    /// Full result-listing page search
    Fulltext,
    /// Incremental query-suggestion interaction
    Autocomplete,
}

impl SearchSource {
    /// Returns the identifier used in event log storage
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchSource::Fulltext => "fulltext",
            SearchSource::Autocomplete => "autocomplete",
        }
    }

    /// Returns the display name for report headings
    pub fn display_name(&self) -> &'static str {
        match self {
            SearchSource::Fulltext => "Full-text",
            SearchSource::Autocomplete => "Autocomplete",
        }
    }
}

impl std::str::FromStr for SearchSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fulltext" => Ok(SearchSource::Fulltext),
            "autocomplete" => Ok(SearchSource::Autocomplete),
            _ => Err(format!("unknown search source: {}", s)),
        }
    }
}

impl std::fmt::Display for SearchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// Event record (Layer 1)
// ============================================

/// One logged user action, as stored in the event log.
///
/// Up to three candidate timestamp strings may be present; they are
/// reconciled in strict priority order (client, then server, then legacy)
/// by [`crate::timestamp::resolve_event_timestamp`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Wiki this event was logged on (e.g. "enwiki")
    pub wiki: String,
    /// Event schema revision the record conforms to
    pub schema_revision: i64,
    /// Session identifier assigned by the logging frontend
    pub session_id: String,
    /// Page-view identifier (pairs with session_id for autocomplete volume)
    pub page_view_id: String,
    /// What the user did
    pub action: ActionKind,
    /// Search surface, for result-page events
    pub source: Option<SearchSource>,
    /// Number of results shown; None means zero-result for fulltext
    pub result_count: Option<i64>,
    /// Clicked-result position for visits; -1 sentinel when absent
    pub position: Option<i64>,
    /// Elapsed dwell seconds, for check-in events
    pub checkin_secs: Option<i64>,
    /// Client-reported timestamp (highest priority)
    pub client_ts: Option<String>,
    /// Server-received timestamp
    pub server_ts: Option<String>,
    /// Legacy log timestamp (lowest priority)
    pub legacy_ts: Option<String>,
    /// Whether the traffic was flagged as a bot
    pub is_bot: bool,
    /// Whether the traffic carried a forced test assignment
    pub is_test: bool,
}

// ============================================
// Derived aggregates (Layer 2, never stored)
// ============================================

/// Per-day search volume for one calendar date.
#[derive(Debug, Clone, Serialize)]
pub struct DailyVolume {
    /// Calendar date the counts cover
    pub day: NaiveDate,
    /// Distinct (session, page-view) pairs with autocomplete result pages
    pub autocomplete_searches: i64,
    /// Fulltext result pages with a nonzero result count
    pub fulltext_success: i64,
    /// Fulltext result pages with no result count recorded
    pub fulltext_zero: i64,
}

/// Per-session search volume for one source.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSearchCount {
    /// Session identifier
    pub session_id: String,
    /// Earliest event date observed for the session
    pub first_day: NaiveDate,
    /// Number of search-result-page events in the session
    pub searches: i64,
}

/// Per-session interaction summary across all action kinds.
///
/// Built by folding resolved events in timestamp order; see
/// [`crate::db::Database::session_interactions`].
#[derive(Debug, Clone, Serialize)]
pub struct SessionInteraction {
    /// Session identifier
    pub session_id: String,
    /// Earliest resolved event timestamp
    pub first_event_at: DateTime<Utc>,
    /// Latest resolved event timestamp (any action kind)
    pub last_event_at: DateTime<Utc>,
    /// Number of search-result-page events
    pub searches: i64,
    /// Whether any result was visited
    pub clicked: bool,
    /// Position of the first visit, or [`POSITION_ABSENT`]
    pub click_position: i64,
    /// Largest check-in dwell value observed, if any check-in occurred
    pub max_dwell_secs: Option<i64>,
}

impl SessionInteraction {
    /// Session length in whole seconds, or None when the events are
    /// disordered (non-positive span, a known data artifact).
    pub fn length_secs(&self) -> Option<i64> {
        let secs = self
            .last_event_at
            .signed_duration_since(self.first_event_at)
            .num_seconds();
        (secs > 0).then_some(secs)
    }

    /// Whether the recorded click position is usable for position
    /// statistics: present, non-sentinel, and below `max_position`.
    pub fn valid_click_position(&self, max_position: i64) -> Option<i64> {
        (self.clicked && self.click_position >= 0 && self.click_position < max_position)
            .then_some(self.click_position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn interaction(first: i64, last: i64) -> SessionInteraction {
        SessionInteraction {
            session_id: "s1".to_string(),
            first_event_at: Utc.timestamp_opt(first, 0).unwrap(),
            last_event_at: Utc.timestamp_opt(last, 0).unwrap(),
            searches: 1,
            clicked: false,
            click_position: POSITION_ABSENT,
            max_dwell_secs: None,
        }
    }

    #[test]
    fn test_action_kind_round_trip() {
        for kind in [
            ActionKind::SearchResultPage,
            ActionKind::VisitPage,
            ActionKind::Checkin,
        ] {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
        assert!("pageView".parse::<ActionKind>().is_err());
    }

    #[test]
    fn test_search_source_round_trip() {
        assert_eq!(
            "fulltext".parse::<SearchSource>().unwrap(),
            SearchSource::Fulltext
        );
        assert_eq!(
            "autocomplete".parse::<SearchSource>().unwrap(),
            SearchSource::Autocomplete
        );
        assert!("prefix".parse::<SearchSource>().is_err());
    }

    #[test]
    fn test_session_length_drops_disordered_spans() {
        assert_eq!(interaction(100, 160).length_secs(), Some(60));
        assert_eq!(interaction(100, 100).length_secs(), None);
        assert_eq!(interaction(160, 100).length_secs(), None);
    }

    #[test]
    fn test_valid_click_position_bounds() {
        let mut s = interaction(0, 10);
        s.clicked = true;
        s.click_position = 3;
        assert_eq!(s.valid_click_position(500), Some(3));

        s.click_position = POSITION_ABSENT;
        assert_eq!(s.valid_click_position(500), None);

        s.click_position = 500;
        assert_eq!(s.valid_click_position(500), None);

        s.click_position = 499;
        assert_eq!(s.valid_click_position(500), Some(499));

        s.clicked = false;
        assert_eq!(s.valid_click_position(500), None);
    }
}
