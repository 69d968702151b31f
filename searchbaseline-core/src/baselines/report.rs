//! Baseline report assembly
//!
//! Turns the raw grouped query results into the reported scalars and bundles
//! them into one [`BaselineReport`] for a wiki and window. Each
//! post-processor is a pure function over already-fetched rows, so the
//! cutoff and exclusion rules are testable without a store.

use crate::baselines::stats::{mean, median, percentage, round_to};
use crate::config::BaselineConfig;
use crate::db::Database;
use crate::error::Result;
use crate::filter::EventScope;
use crate::types::{DailyVolume, SearchSource, SessionInteraction, SessionSearchCount};
use crate::window::AnalysisWindow;
use serde::Serialize;
use std::collections::BTreeMap;

/// Mean daily counts over the window, rounded to 2 decimals.
#[derive(Debug, Clone, Serialize)]
pub struct DailyBaselines {
    /// Mean autocomplete searches per day
    pub autocomplete_mean: Option<f64>,
    /// Mean fulltext searches per day that returned results
    pub fulltext_success_mean: Option<f64>,
    /// Mean zero-result fulltext searches per day
    pub fulltext_zero_mean: Option<f64>,
}

/// Session volume baselines for one search surface.
#[derive(Debug, Clone, Serialize)]
pub struct SessionVolumeBaselines {
    /// Mean of per-day session counts, rounded to 2 decimals
    pub sessions_per_day_mean: Option<f64>,
    /// Median searches per session, rounded to 1 decimal
    pub searches_per_session_median: Option<f64>,
    /// Sessions contributing to the statistics
    pub sessions_analyzed: usize,
    /// Sessions dropped by the automation threshold
    pub sessions_excluded: usize,
}

/// Interaction baselines over all filtered sessions.
#[derive(Debug, Clone, Serialize)]
pub struct InteractionBaselines {
    /// Sessions contributing to the statistics
    pub sessions_analyzed: usize,
    /// Sessions dropped by the automation threshold
    pub sessions_excluded: usize,
    /// Median session length in seconds (non-positive spans dropped)
    pub session_length_median_secs: Option<f64>,
    /// Share of sessions that visited at least one result, as a percentage
    pub clickthrough_rate_pct: Option<f64>,
    /// Median clicked-result position over valid positions
    pub clicked_position_median: Option<f64>,
    /// Share of click-throughs (with valid position and a check-in) whose
    /// dwell reached the success threshold, as a percentage
    pub success_rate_pct: Option<f64>,
}

/// Complete baseline report for one wiki and window.
#[derive(Debug, Clone, Serialize)]
pub struct BaselineReport {
    /// Wiki the report covers
    pub wiki: String,
    /// Half-open date range the statistics cover
    pub window: AnalysisWindow,
    /// Daily volume baselines
    pub daily: DailyBaselines,
    /// Session volume baselines for autocomplete traffic
    pub autocomplete_sessions: SessionVolumeBaselines,
    /// Session volume baselines for fulltext traffic
    pub fulltext_sessions: SessionVolumeBaselines,
    /// Interaction baselines over all traffic
    pub interactions: InteractionBaselines,
}

// ============================================
// Post-processors
// ============================================

/// Window-restricted arithmetic means of the daily volume columns.
pub fn daily_baselines(rows: &[DailyVolume], window: &AnalysisWindow) -> DailyBaselines {
    let in_window: Vec<&DailyVolume> = rows.iter().filter(|r| window.contains(r.day)).collect();

    let column = |select: fn(&DailyVolume) -> i64| -> Option<f64> {
        let values: Vec<f64> = in_window.iter().map(|r| select(r) as f64).collect();
        mean(&values).map(|m| round_to(m, 2))
    };

    DailyBaselines {
        autocomplete_mean: column(|r| r.autocomplete_searches),
        fulltext_success_mean: column(|r| r.fulltext_success),
        fulltext_zero_mean: column(|r| r.fulltext_zero),
    }
}

/// Session volume baselines: per-day session counts averaged over days,
/// and the median of per-session search counts, after dropping presumed
/// automation.
pub fn session_volume_baselines(
    rows: &[SessionSearchCount],
    window: &AnalysisWindow,
    automation_threshold: i64,
) -> SessionVolumeBaselines {
    let in_window: Vec<&SessionSearchCount> =
        rows.iter().filter(|r| window.contains(r.first_day)).collect();
    let (kept, excluded): (Vec<&SessionSearchCount>, Vec<&SessionSearchCount>) = in_window
        .into_iter()
        .partition(|r| r.searches < automation_threshold);

    let mut per_day: BTreeMap<chrono::NaiveDate, i64> = BTreeMap::new();
    for row in &kept {
        *per_day.entry(row.first_day).or_insert(0) += 1;
    }
    let day_counts: Vec<f64> = per_day.values().map(|&c| c as f64).collect();
    let search_counts: Vec<f64> = kept.iter().map(|r| r.searches as f64).collect();

    SessionVolumeBaselines {
        sessions_per_day_mean: mean(&day_counts).map(|m| round_to(m, 2)),
        searches_per_session_median: median(&search_counts).map(|m| round_to(m, 1)),
        sessions_analyzed: kept.len(),
        sessions_excluded: excluded.len(),
    }
}

/// Partition interaction summaries by the automation threshold.
fn filter_automated(
    sessions: &[SessionInteraction],
    automation_threshold: i64,
) -> (Vec<&SessionInteraction>, usize) {
    let (kept, excluded): (Vec<&SessionInteraction>, Vec<&SessionInteraction>) = sessions
        .iter()
        .partition(|s| s.searches < automation_threshold);
    (kept, excluded.len())
}

/// Median session length in seconds. Non-positive spans are disordered-event
/// artifacts and leave the denominator.
fn session_length_median(sessions: &[&SessionInteraction]) -> Option<f64> {
    let lengths: Vec<f64> = sessions
        .iter()
        .filter_map(|s| s.length_secs())
        .map(|secs| secs as f64)
        .collect();
    median(&lengths).map(|m| round_to(m, 1))
}

/// Share of sessions that visited at least one result.
fn clickthrough_rate(sessions: &[&SessionInteraction]) -> Option<f64> {
    let clicked = sessions.iter().filter(|s| s.clicked).count();
    percentage(clicked, sessions.len()).map(|p| round_to(p, 2))
}

/// Median clicked position over valid (non-sentinel, in-range) positions.
fn clicked_position_median(sessions: &[&SessionInteraction], max_position: i64) -> Option<f64> {
    let positions: Vec<f64> = sessions
        .iter()
        .filter_map(|s| s.valid_click_position(max_position))
        .map(|p| p as f64)
        .collect();
    median(&positions)
}

/// Success rate: among click-throughs with a valid position that produced at
/// least one check-in, the share whose maximum dwell reached the threshold.
/// Sessions with no check-in leave the denominator rather than counting as
/// zero dwell.
fn success_rate(
    sessions: &[&SessionInteraction],
    max_position: i64,
    success_dwell_secs: i64,
) -> Option<f64> {
    let with_dwell: Vec<i64> = sessions
        .iter()
        .filter(|s| s.valid_click_position(max_position).is_some())
        .filter_map(|s| s.max_dwell_secs)
        .collect();
    let successes = with_dwell
        .iter()
        .filter(|&&dwell| dwell >= success_dwell_secs)
        .count();
    percentage(successes, with_dwell.len()).map(|p| round_to(p, 2))
}

/// Interaction baselines over threshold-filtered sessions.
pub fn interaction_baselines(
    sessions: &[SessionInteraction],
    params: &BaselineConfig,
) -> InteractionBaselines {
    let (kept, excluded) = filter_automated(sessions, params.automation_threshold);

    InteractionBaselines {
        sessions_analyzed: kept.len(),
        sessions_excluded: excluded,
        session_length_median_secs: session_length_median(&kept),
        clickthrough_rate_pct: clickthrough_rate(&kept),
        clicked_position_median: clicked_position_median(&kept, params.max_result_position),
        success_rate_pct: success_rate(
            &kept,
            params.max_result_position,
            params.success_dwell_secs,
        ),
    }
}

// ============================================
// Report assembly
// ============================================

/// Run the full pipeline once for the scoped wiki and window.
///
/// Queries run sequentially to completion; the first failure aborts the run.
/// Re-running with the same scope over an unchanged store reproduces the
/// same report.
pub fn generate_baselines(
    db: &Database,
    scope: &EventScope,
    params: &BaselineConfig,
) -> Result<BaselineReport> {
    tracing::info!(wiki = %scope.wiki, window = %scope.window, "Generating baseline report");

    let daily_rows = db.daily_search_volume(scope)?;
    let autocomplete_rows = db.session_search_counts(scope, SearchSource::Autocomplete)?;
    let fulltext_rows = db.session_search_counts(scope, SearchSource::Fulltext)?;
    let interaction_rows = db.session_interactions(scope)?;

    let report = BaselineReport {
        wiki: scope.wiki.clone(),
        window: scope.window,
        daily: daily_baselines(&daily_rows, &scope.window),
        autocomplete_sessions: session_volume_baselines(
            &autocomplete_rows,
            &scope.window,
            params.automation_threshold,
        ),
        fulltext_sessions: session_volume_baselines(
            &fulltext_rows,
            &scope.window,
            params.automation_threshold,
        ),
        interactions: interaction_baselines(&interaction_rows, params),
    };

    tracing::info!(
        sessions = report.interactions.sessions_analyzed,
        excluded = report.interactions.sessions_excluded,
        "Baseline report complete"
    );

    Ok(report)
}
