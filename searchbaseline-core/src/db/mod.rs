//! Event store layer for searchbaseline
//!
//! This module provides the query-execution layer using SQLite with:
//! - Schema migrations
//! - Read-only metric queries scoped by an [`crate::filter::EventScope`]
//! - An append-only insert for building fixture stores

pub mod repo;
pub mod schema;

pub use repo::Database;
