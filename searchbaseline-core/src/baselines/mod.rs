//! Baseline metric post-processing
//!
//! Each metric family follows the same pipeline shape: resolve a window,
//! issue a filtered grouped query, post-filter and reduce the rows to a
//! reported scalar, and apply the cutoff rules. The [`report`] module owns
//! the reductions and bundles everything into a [`BaselineReport`];
//! [`stats`] holds the shared numeric helpers.

pub mod report;
pub mod stats;

pub use report::{
    daily_baselines, generate_baselines, interaction_baselines, session_volume_baselines,
    BaselineReport, DailyBaselines, InteractionBaselines, SessionVolumeBaselines,
};
