//! # searchbaseline-core
//!
//! Core library for searchbaseline - baseline usage metrics for a legacy
//! wiki search feature.
//!
//! This library provides:
//! - Domain types for search events and session aggregates
//! - An SQLite-backed event store layer with scoped metric queries
//! - Window resolution, filter composition, and baseline post-processing
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! Every metric follows one pipeline: resolve an analysis window, issue a
//! filtered grouped query against the event store, post-filter and reduce
//! the rows to a reported scalar, and apply the cutoff rules. Nothing is
//! persisted back; a run is a pure read over an append-only store.
//!
//! ## Example
//!
//! ```rust,no_run
//! use searchbaseline_core::{
//!     generate_baselines, AnalysisWindow, BaselineConfig, Database, EventScope,
//! };
//!
//! let db = Database::open(&searchbaseline_core::Config::database_path())
//!     .expect("failed to open event store");
//! db.migrate().expect("failed to run migrations");
//!
//! let as_of = "2015-09-09".parse().expect("valid date");
//! let scope = EventScope::new("enwiki", AnalysisWindow::trailing(as_of, 7));
//! let report = generate_baselines(&db, &scope, &BaselineConfig::default())
//!     .expect("failed to generate report");
//! println!("{:?}", report.interactions.clickthrough_rate_pct);
//! ```

// Re-export commonly used items at the crate root
pub use baselines::{generate_baselines, BaselineReport};
pub use config::{BaselineConfig, Config};
pub use db::Database;
pub use error::{Error, Result};
pub use filter::EventScope;
pub use window::AnalysisWindow;

// Public modules
pub mod baselines;
pub mod config;
pub mod db;
pub mod error;
pub mod filter;
pub mod logging;
pub mod timestamp;
pub mod types;
pub mod window;
