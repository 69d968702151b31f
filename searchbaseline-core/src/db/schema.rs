//! Event store schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.
//! The store is append-only; reports only ever read from it.

use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: search event log
    r#"
    CREATE TABLE IF NOT EXISTS events (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        wiki             TEXT NOT NULL,
        schema_revision  INTEGER NOT NULL,
        session_id       TEXT NOT NULL,
        page_view_id     TEXT NOT NULL,
        action           TEXT NOT NULL,      -- 'searchResultPage', 'visitPage', 'checkin'
        source           TEXT,               -- 'fulltext', 'autocomplete'
        result_count     INTEGER,            -- NULL means zero-result for fulltext
        position         INTEGER,            -- clicked-result position, -1 sentinel
        checkin_secs     INTEGER,            -- dwell seconds for check-in events

        -- Candidate timestamps, reconciled client > server > legacy
        client_ts        TEXT,
        server_ts        TEXT,
        legacy_ts        TEXT,

        -- Traffic exclusion flags
        is_bot           INTEGER NOT NULL DEFAULT 0,
        is_test          INTEGER NOT NULL DEFAULT 0
    );

    CREATE INDEX IF NOT EXISTS idx_events_wiki_action ON events(wiki, action);
    CREATE INDEX IF NOT EXISTS idx_events_session ON events(session_id);
    CREATE INDEX IF NOT EXISTS idx_events_client_ts ON events(client_ts);
    "#,
];

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> crate::error::Result<()> {
    let current_version: i32 = conn
        .query_row("PRAGMA user_version", [], |r| r.get(0))
        .unwrap_or(0);

    tracing::info!(
        current_version,
        target_version = SCHEMA_VERSION,
        "Checking event store migrations"
    );

    for (i, migration) in MIGRATIONS.iter().enumerate() {
        let version = (i + 1) as i32;
        if version > current_version {
            tracing::info!(version, "Running migration");
            conn.execute_batch(migration)?;
            conn.execute(&format!("PRAGMA user_version = {}", version), [])?;
        }
    }

    Ok(())
}

/// Get the current schema version from the database
pub fn get_schema_version(conn: &Connection) -> crate::error::Result<i32> {
    let version: i32 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        // Run migrations twice - should be idempotent
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_events_table_created() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let exists: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='events'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(exists, 1);
    }
}
