//! Event store repository layer
//!
//! Provides the read-only metric queries plus the insert used to populate
//! local fixture stores. Each metric query is a pure mapping from an
//! [`EventScope`] to a grouped tabular result; a store failure aborts the
//! run with no retry.

use crate::error::{Error, Result};
use crate::filter::{EventScope, EVENT_DAY_EXPR};
use crate::timestamp::resolve_event_timestamp;
use crate::types::{
    ActionKind, DailyVolume, EventRecord, SessionInteraction, SessionSearchCount, SearchSource,
    POSITION_ABSENT,
};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, params_from_iter, Connection};
use std::path::PathBuf;
use std::sync::Mutex;

/// Event store handle (single connection)
pub struct Database {
    conn: Mutex<Connection>,
}

/// One raw event row, as returned by the session interaction query before
/// timestamp resolution and folding.
struct InteractionRow {
    session_id: String,
    action: String,
    position: Option<i64>,
    checkin_secs: Option<i64>,
    client_ts: Option<String>,
    server_ts: Option<String>,
    legacy_ts: Option<String>,
}

impl Database {
    /// Open or create an event store at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory event store (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this store
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    /// Append one event to the store.
    ///
    /// The production event log is external and append-only; this exists so
    /// tests and local fixtures can build a store to report against.
    pub fn insert_event(&self, event: &EventRecord) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO events (
                wiki, schema_revision, session_id, page_view_id, action, source,
                result_count, position, checkin_secs,
                client_ts, server_ts, legacy_ts, is_bot, is_test
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
            params![
                event.wiki,
                event.schema_revision,
                event.session_id,
                event.page_view_id,
                event.action.as_str(),
                event.source.map(|s| s.as_str()),
                event.result_count,
                event.position,
                event.checkin_secs,
                event.client_ts,
                event.server_ts,
                event.legacy_ts,
                event.is_bot as i64,
                event.is_test as i64,
            ],
        )?;
        Ok(())
    }

    // ============================================
    // Metric queries
    // ============================================

    /// Per-day search volume over the scoped window.
    ///
    /// Autocomplete volume counts distinct (session, page-view) pairs; the
    /// pair key joins on an ASCII unit separator so identifiers containing
    /// printable separators cannot collide. Fulltext volume splits into
    /// success (nonzero result count) and zero-result (no result count
    /// recorded). A recorded count of exactly zero lands in neither bucket.
    /// The scope's action and source are fixed by this query.
    pub fn daily_search_volume(&self, scope: &EventScope) -> Result<Vec<DailyVolume>> {
        let scope = scope.clone().with_action(ActionKind::SearchResultPage);
        let (where_clause, params) = scope.where_clause();

        let sql = format!(
            r#"
            SELECT {day} AS day,
                   COUNT(DISTINCT CASE WHEN source = 'autocomplete'
                                       THEN session_id || char(31) || page_view_id END)
                       AS autocomplete_searches,
                   COUNT(CASE WHEN source = 'fulltext' AND result_count > 0 THEN 1 END)
                       AS fulltext_success,
                   COUNT(CASE WHEN source = 'fulltext' AND result_count IS NULL THEN 1 END)
                       AS fulltext_zero
            FROM events
            WHERE {where_clause}
            GROUP BY day
            ORDER BY day
            "#,
            day = EVENT_DAY_EXPR,
        );

        tracing::debug!(wiki = %scope.wiki, window = %scope.window, "Querying daily search volume");

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), |row| {
            Ok((
                row.get::<_, String>("day")?,
                row.get::<_, i64>("autocomplete_searches")?,
                row.get::<_, i64>("fulltext_success")?,
                row.get::<_, i64>("fulltext_zero")?,
            ))
        })?;

        let mut volumes = Vec::new();
        for row in rows {
            let (day, autocomplete_searches, fulltext_success, fulltext_zero) = row?;
            volumes.push(DailyVolume {
                day: parse_day(&day)?,
                autocomplete_searches,
                fulltext_success,
                fulltext_zero,
            });
        }
        Ok(volumes)
    }

    /// Per-session search counts for one source over the scoped window.
    ///
    /// One row per session: earliest event day and the number of
    /// search-result-page events. The scope's action is fixed by this query.
    pub fn session_search_counts(
        &self,
        scope: &EventScope,
        source: SearchSource,
    ) -> Result<Vec<SessionSearchCount>> {
        let scope = scope
            .clone()
            .with_action(ActionKind::SearchResultPage)
            .with_source(source);
        let (where_clause, params) = scope.where_clause();

        let sql = format!(
            r#"
            SELECT session_id,
                   MIN({day}) AS first_day,
                   COUNT(*) AS searches
            FROM events
            WHERE {where_clause}
            GROUP BY session_id
            ORDER BY session_id
            "#,
            day = EVENT_DAY_EXPR,
        );

        tracing::debug!(
            wiki = %scope.wiki,
            source = %source,
            window = %scope.window,
            "Querying per-session search counts"
        );

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), |row| {
            Ok((
                row.get::<_, String>("session_id")?,
                row.get::<_, String>("first_day")?,
                row.get::<_, i64>("searches")?,
            ))
        })?;

        let mut counts = Vec::new();
        for row in rows {
            let (session_id, first_day, searches) = row?;
            counts.push(SessionSearchCount {
                session_id,
                first_day: parse_day(&first_day)?,
                searches,
            });
        }
        Ok(counts)
    }

    /// Per-session interaction summaries over all action kinds.
    ///
    /// Events are fetched in (session, timestamp) order and folded into one
    /// summary per session. Timestamps resolve through the priority-ordered
    /// candidate fallback; an unparseable candidate fails the whole query.
    /// The automation-threshold cutoff is applied downstream by the
    /// post-processor, not here.
    pub fn session_interactions(&self, scope: &EventScope) -> Result<Vec<SessionInteraction>> {
        let mut scope = scope.clone();
        scope.action = None;
        scope.source = None;
        let (where_clause, params) = scope.where_clause();

        let sql = format!(
            r#"
            SELECT session_id, action, position, checkin_secs,
                   client_ts, server_ts, legacy_ts
            FROM events
            WHERE {where_clause}
            ORDER BY session_id, coalesce(client_ts, server_ts, legacy_ts)
            "#,
        );

        tracing::debug!(wiki = %scope.wiki, window = %scope.window, "Querying session interactions");

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params), |row| {
            Ok(InteractionRow {
                session_id: row.get("session_id")?,
                action: row.get("action")?,
                position: row.get("position")?,
                checkin_secs: row.get("checkin_secs")?,
                client_ts: row.get("client_ts")?,
                server_ts: row.get("server_ts")?,
                legacy_ts: row.get("legacy_ts")?,
            })
        })?;

        let mut sessions: Vec<SessionInteraction> = Vec::new();
        // Resolved time of the current session's earliest visit. The SQL
        // ordering compares stored strings, and a sub-second stamp sorts
        // before a plain one within the same second, so visit selection has
        // to go by parsed times.
        let mut click_at: Option<DateTime<Utc>> = None;
        for row in rows {
            let row = row?;
            let action: ActionKind = row.action.parse().map_err(Error::Config)?;
            let ts = resolve_event_timestamp(
                &row.session_id,
                row.client_ts.as_deref(),
                row.server_ts.as_deref(),
                row.legacy_ts.as_deref(),
            )?;

            match sessions.last_mut() {
                Some(current) if current.session_id == row.session_id => {
                    current.first_event_at = current.first_event_at.min(ts);
                    current.last_event_at = current.last_event_at.max(ts);
                    match action {
                        ActionKind::SearchResultPage => current.searches += 1,
                        ActionKind::VisitPage => {
                            // Earliest visit by resolved time wins
                            if click_at.map_or(true, |at| ts < at) {
                                click_at = Some(ts);
                                current.clicked = true;
                                current.click_position =
                                    row.position.unwrap_or(POSITION_ABSENT);
                            }
                        }
                        ActionKind::Checkin => {
                            // A check-in with no recorded dwell leaves the
                            // session's dwell unobserved, never zero
                            if let Some(dwell) = row.checkin_secs {
                                current.max_dwell_secs =
                                    Some(current.max_dwell_secs.map_or(dwell, |d| d.max(dwell)));
                            }
                        }
                    }
                }
                _ => {
                    click_at = None;
                    let mut summary = SessionInteraction {
                        session_id: row.session_id,
                        first_event_at: ts,
                        last_event_at: ts,
                        searches: 0,
                        clicked: false,
                        click_position: POSITION_ABSENT,
                        max_dwell_secs: None,
                    };
                    match action {
                        ActionKind::SearchResultPage => summary.searches = 1,
                        ActionKind::VisitPage => {
                            click_at = Some(ts);
                            summary.clicked = true;
                            summary.click_position = row.position.unwrap_or(POSITION_ABSENT);
                        }
                        ActionKind::Checkin => {
                            summary.max_dwell_secs = row.checkin_secs;
                        }
                    }
                    sessions.push(summary);
                }
            }
        }

        tracing::debug!(sessions = sessions.len(), "Folded session interactions");
        Ok(sessions)
    }
}

fn parse_day(value: &str) -> Result<NaiveDate> {
    value.parse().map_err(|_| Error::Timestamp {
        value: value.to_string(),
    })
}
