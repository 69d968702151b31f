//! Composable event filter specification
//!
//! Every metric query applies the same inclusion rules: bot exclusion,
//! test-assignment exclusion, wiki scoping, schema-revision scoping, and the
//! analysis window. Only the action and source vary per metric family. A
//! single [`EventScope`] value renders the shared `WHERE` fragment so the
//! rules cannot drift between queries.

use crate::types::{ActionKind, SearchSource};
use crate::window::AnalysisWindow;
use rusqlite::types::Value;

/// SQL expression for an event's calendar day, taken from the
/// highest-priority timestamp candidate present. The accepted formats are
/// ISO-ordered, so a `substr` prefix is the event date.
pub const EVENT_DAY_EXPR: &str = "substr(coalesce(client_ts, server_ts, legacy_ts), 1, 10)";

/// Filter specification applied uniformly to every metric query.
#[derive(Debug, Clone)]
pub struct EventScope {
    /// Wiki to restrict to
    pub wiki: String,
    /// Event schema revision to restrict to, when set
    pub schema_revision: Option<i64>,
    /// Date range the query covers
    pub window: AnalysisWindow,
    /// Restrict to one action kind, when set
    pub action: Option<ActionKind>,
    /// Restrict to one search surface, when set
    pub source: Option<SearchSource>,
}

impl EventScope {
    /// Scope covering all actions and sources for a wiki and window.
    pub fn new(wiki: impl Into<String>, window: AnalysisWindow) -> Self {
        Self {
            wiki: wiki.into(),
            schema_revision: None,
            window,
            action: None,
            source: None,
        }
    }

    /// Narrow the scope to one action kind.
    pub fn with_action(mut self, action: ActionKind) -> Self {
        self.action = Some(action);
        self
    }

    /// Narrow the scope to one search surface.
    pub fn with_source(mut self, source: SearchSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Pin the scope to one event schema revision.
    pub fn with_schema_revision(mut self, revision: i64) -> Self {
        self.schema_revision = Some(revision);
        self
    }

    /// Render the shared `WHERE` fragment and its positional parameters.
    ///
    /// Bot and test exclusions are unconditional; they hold for every
    /// statistic this pipeline reports. Parameters keep their native SQLite
    /// types; the schema revision binds as an integer.
    pub fn where_clause(&self) -> (String, Vec<Value>) {
        let mut clauses = vec![
            "wiki = ?".to_string(),
            "is_bot = 0".to_string(),
            "is_test = 0".to_string(),
            format!("{} >= ?", EVENT_DAY_EXPR),
            format!("{} < ?", EVENT_DAY_EXPR),
        ];
        let mut params = vec![
            Value::Text(self.wiki.clone()),
            Value::Text(self.window.start.to_string()),
            Value::Text(self.window.end.to_string()),
        ];

        if let Some(revision) = self.schema_revision {
            clauses.push("schema_revision = ?".to_string());
            params.push(Value::Integer(revision));
        }
        if let Some(action) = self.action {
            clauses.push("action = ?".to_string());
            params.push(Value::Text(action.as_str().to_string()));
        }
        if let Some(source) = self.source {
            clauses.push("source = ?".to_string());
            params.push(Value::Text(source.as_str().to_string()));
        }

        (clauses.join(" AND "), params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn window() -> AnalysisWindow {
        AnalysisWindow::trailing(NaiveDate::from_ymd_opt(2015, 9, 9).unwrap(), 7)
    }

    #[test]
    fn test_base_scope_clauses() {
        let (clause, params) = EventScope::new("enwiki", window()).where_clause();
        assert!(clause.contains("wiki = ?"));
        assert!(clause.contains("is_bot = 0"));
        assert!(clause.contains("is_test = 0"));
        assert_eq!(
            params,
            vec![
                Value::Text("enwiki".to_string()),
                Value::Text("2015-09-02".to_string()),
                Value::Text("2015-09-09".to_string())
            ]
        );
    }

    #[test]
    fn test_action_and_source_narrowing() {
        let scope = EventScope::new("enwiki", window())
            .with_action(ActionKind::SearchResultPage)
            .with_source(SearchSource::Autocomplete)
            .with_schema_revision(12057828);
        let (clause, params) = scope.where_clause();

        assert!(clause.contains("action = ?"));
        assert!(clause.contains("source = ?"));
        assert!(clause.contains("schema_revision = ?"));
        assert_eq!(params.len(), 6);
        assert_eq!(params[3], Value::Integer(12057828));
        assert_eq!(params[4], Value::Text("searchResultPage".to_string()));
        assert_eq!(params[5], Value::Text("autocomplete".to_string()));
    }

    #[test]
    fn test_clause_parameter_arity_matches() {
        let scope = EventScope::new("dewiki", window()).with_action(ActionKind::VisitPage);
        let (clause, params) = scope.where_clause();
        assert_eq!(clause.matches('?').count(), params.len());
    }
}
