//! End-to-end CLI tests against a fixture event store.

use assert_cmd::Command;
use searchbaseline_core::types::{ActionKind, EventRecord, SearchSource};
use searchbaseline_core::Database;
use tempfile::TempDir;

fn fixture_store(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("events.db");
    let db = Database::open(&path).expect("open fixture store");
    db.migrate().expect("migrate fixture store");

    let insert = |session: &str, action: ActionKind, source, position, checkin, time: &str| {
        db.insert_event(&EventRecord {
            wiki: "enwiki".to_string(),
            schema_revision: 12057828,
            session_id: session.to_string(),
            page_view_id: format!("{}-pv", session),
            action,
            source,
            result_count: Some(20),
            position,
            checkin_secs: checkin,
            client_ts: Some(format!("2015-09-02T{}Z", time)),
            server_ts: None,
            legacy_ts: None,
            is_bot: false,
            is_test: false,
        })
        .expect("insert fixture event");
    };

    let fulltext = Some(SearchSource::Fulltext);
    insert("s1", ActionKind::SearchResultPage, fulltext, None, None, "10:00:00");
    insert("s1", ActionKind::VisitPage, None, Some(2), None, "10:00:20");
    insert("s1", ActionKind::Checkin, None, None, Some(30), "10:00:50");
    insert("s2", ActionKind::SearchResultPage, fulltext, None, None, "11:00:00");

    path
}

fn baseline_cmd(dir: &TempDir, db_path: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("searchbaseline").expect("binary builds");
    // Keep config, data, and logs inside the test sandbox
    cmd.env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env("XDG_DATA_HOME", dir.path().join("data"))
        .env("XDG_STATE_HOME", dir.path().join("state"))
        .arg("--db")
        .arg(db_path)
        .arg("--as-of")
        .arg("2015-09-09")
        .arg("--days")
        .arg("7");
    cmd
}

#[test]
fn test_json_export_reports_expected_scalars() {
    let dir = TempDir::new().unwrap();
    let db_path = fixture_store(&dir);

    let output = baseline_cmd(&dir, &db_path)
        .arg("--export")
        .arg("json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let report: serde_json::Value = serde_json::from_slice(&output).expect("valid JSON");
    assert_eq!(report["wiki"], "enwiki");
    assert_eq!(report["interactions"]["clickthrough_rate_pct"], 50.0);
    assert_eq!(report["interactions"]["clicked_position_median"], 2.0);
    assert_eq!(report["interactions"]["success_rate_pct"], 100.0);
    assert_eq!(report["fulltext_sessions"]["sessions_analyzed"], 2);
}

#[test]
fn test_runs_are_idempotent() {
    let dir = TempDir::new().unwrap();
    let db_path = fixture_store(&dir);

    let first = baseline_cmd(&dir, &db_path)
        .arg("--export")
        .arg("json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let second = baseline_cmd(&dir, &db_path)
        .arg("--export")
        .arg("json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    assert_eq!(first, second);
}

#[test]
fn test_terminal_output_mentions_window() {
    let dir = TempDir::new().unwrap();
    let db_path = fixture_store(&dir);

    let output = baseline_cmd(&dir, &db_path)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    assert!(text.contains("[2015-09-02, 2015-09-09)"));
    assert!(text.contains("Click-through rate"));
}

#[test]
fn test_rejects_unknown_export_format() {
    let dir = TempDir::new().unwrap();
    let db_path = fixture_store(&dir);

    baseline_cmd(&dir, &db_path)
        .arg("--export")
        .arg("xml")
        .assert()
        .failure();
}
