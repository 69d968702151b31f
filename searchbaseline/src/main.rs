//! searchbaseline - baseline usage metrics CLI
//!
//! Computes search volume, session, click-through, position, and success
//! baselines for one wiki over a trailing window of complete days.

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use searchbaseline_core::baselines::BaselineReport;
use searchbaseline_core::{
    generate_baselines, AnalysisWindow, Config, Database, EventScope,
};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "searchbaseline")]
#[command(about = "Baseline usage metrics for legacy wiki search")]
#[command(version)]
struct Args {
    /// Report as-of date, YYYY-MM-DD (default: today; the as-of day is excluded)
    #[arg(long)]
    as_of: Option<String>,

    /// Trailing window length in complete days (default: from config)
    #[arg(long)]
    days: Option<u32>,

    /// Wiki to report on (default: from config)
    #[arg(long)]
    wiki: Option<String>,

    /// Path to the event store (default: XDG data dir)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Export format (md = markdown, json = JSON)
    #[arg(long)]
    export: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = searchbaseline_core::logging::init(&config.logging).ok();

    let db_path = args.db.unwrap_or_else(Config::database_path);
    let db = Database::open(&db_path).context("failed to open event store")?;
    db.migrate().context("failed to run migrations")?;

    // The ambient clock is consulted only here; everything downstream takes
    // the as-of date as an explicit parameter.
    let as_of: NaiveDate = match &args.as_of {
        Some(s) => s
            .parse()
            .with_context(|| format!("invalid --as-of date: {} (expected YYYY-MM-DD)", s))?,
        None => Utc::now().date_naive(),
    };

    let days = args.days.unwrap_or(config.baseline.window_days);
    let wiki = args.wiki.unwrap_or_else(|| config.baseline.wiki.clone());

    let window = AnalysisWindow::trailing(as_of, days);
    let mut scope = EventScope::new(wiki, window);
    if let Some(revision) = config.baseline.schema_revision {
        scope = scope.with_schema_revision(revision);
    }

    let report = generate_baselines(&db, &scope, &config.baseline)
        .context("failed to generate baseline report")?;
    tracing::info!(
        wiki = %report.wiki,
        window = %report.window,
        "Baseline report generated"
    );

    match args.export.as_deref() {
        Some("json") => print_json(&report)?,
        Some("md") => print_markdown(&report),
        Some(other) => anyhow::bail!("Unknown export format: {}. Use 'md' or 'json'", other),
        None => print_terminal(&report),
    }

    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "n/a".to_string(),
    }
}

fn fmt_pct(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}%", v),
        None => "n/a".to_string(),
    }
}

fn print_terminal(report: &BaselineReport) {
    println!();
    println!(
        "Search baselines for {} over {}",
        report.wiki, report.window
    );
    println!("{}", "─".repeat(60));
    println!();

    println!("DAILY VOLUME (mean per day)");
    println!(
        "   Autocomplete:      {}",
        fmt_opt(report.daily.autocomplete_mean)
    );
    println!(
        "   Fulltext success:  {}",
        fmt_opt(report.daily.fulltext_success_mean)
    );
    println!(
        "   Fulltext zero:     {}",
        fmt_opt(report.daily.fulltext_zero_mean)
    );
    println!();

    for (label, sessions) in [
        ("AUTOCOMPLETE SESSIONS", &report.autocomplete_sessions),
        ("FULLTEXT SESSIONS", &report.fulltext_sessions),
    ] {
        println!("{}", label);
        println!(
            "   Sessions/day (mean):       {}",
            fmt_opt(sessions.sessions_per_day_mean)
        );
        println!(
            "   Searches/session (median): {}",
            fmt_opt(sessions.searches_per_session_median)
        );
        println!(
            "   Analyzed: {}   Excluded as automation: {}",
            sessions.sessions_analyzed, sessions.sessions_excluded
        );
        println!();
    }

    println!("INTERACTIONS");
    println!(
        "   Session length (median):  {} s",
        fmt_opt(report.interactions.session_length_median_secs)
    );
    println!(
        "   Click-through rate:       {}",
        fmt_pct(report.interactions.clickthrough_rate_pct)
    );
    println!(
        "   Clicked position (median): {}",
        fmt_opt(report.interactions.clicked_position_median)
    );
    println!(
        "   Success rate:             {}",
        fmt_pct(report.interactions.success_rate_pct)
    );
    println!(
        "   Analyzed: {}   Excluded as automation: {}",
        report.interactions.sessions_analyzed, report.interactions.sessions_excluded
    );
    println!();
}

fn print_markdown(report: &BaselineReport) {
    println!("# Search baselines: {}", report.wiki);
    println!();
    println!("Window: `{}`", report.window);
    println!();

    println!("## Daily volume (mean per day)");
    println!();
    println!("| Metric | Value |");
    println!("|--------|-------|");
    println!(
        "| Autocomplete searches | {} |",
        fmt_opt(report.daily.autocomplete_mean)
    );
    println!(
        "| Fulltext searches with results | {} |",
        fmt_opt(report.daily.fulltext_success_mean)
    );
    println!(
        "| Fulltext zero-result searches | {} |",
        fmt_opt(report.daily.fulltext_zero_mean)
    );
    println!();

    for (label, sessions) in [
        ("Autocomplete sessions", &report.autocomplete_sessions),
        ("Fulltext sessions", &report.fulltext_sessions),
    ] {
        println!("## {}", label);
        println!();
        println!("| Metric | Value |");
        println!("|--------|-------|");
        println!(
            "| Sessions per day (mean) | {} |",
            fmt_opt(sessions.sessions_per_day_mean)
        );
        println!(
            "| Searches per session (median) | {} |",
            fmt_opt(sessions.searches_per_session_median)
        );
        println!("| Sessions analyzed | {} |", sessions.sessions_analyzed);
        println!(
            "| Excluded as automation | {} |",
            sessions.sessions_excluded
        );
        println!();
    }

    println!("## Interactions");
    println!();
    println!("| Metric | Value |");
    println!("|--------|-------|");
    println!(
        "| Session length, median seconds | {} |",
        fmt_opt(report.interactions.session_length_median_secs)
    );
    println!(
        "| Click-through rate | {} |",
        fmt_pct(report.interactions.clickthrough_rate_pct)
    );
    println!(
        "| Clicked position (median) | {} |",
        fmt_opt(report.interactions.clicked_position_median)
    );
    println!(
        "| Success rate | {} |",
        fmt_pct(report.interactions.success_rate_pct)
    );
    println!(
        "| Sessions analyzed | {} |",
        report.interactions.sessions_analyzed
    );
    println!(
        "| Excluded as automation | {} |",
        report.interactions.sessions_excluded
    );
}

fn print_json(report: &BaselineReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
