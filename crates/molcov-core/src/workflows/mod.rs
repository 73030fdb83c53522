//! # Workflows Module
//!
//! Top-level entry points that orchestrate a complete coverage run: loading
//! records from the store, driving the parallel matching pipeline, and
//! persisting the aggregated results. Frontends call these and render the
//! progress events; they never touch the engine internals directly.
//!
//! - **Query Workflow** ([`query`]) - Matches a pattern set against every
//!   molecule and fragment in a store and records per-pattern coverage.

pub mod query;
