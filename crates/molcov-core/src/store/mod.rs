//! Persistence layer: structure records in, match results out.
//!
//! The engine talks to storage only through the [`Store`] trait; the
//! shipped implementation is the flat-file [`csv::CsvStore`], and tests
//! substitute in-memory stores.

pub mod csv;
pub mod patterns;

use std::path::PathBuf;

use thiserror::Error;

use crate::core::models::record::MolRecord;
use crate::engine::registry::MatchRegistry;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed CSV in '{path}': {source}")]
    Csv { path: PathBuf, source: ::csv::Error },

    #[error("Invalid element bitmask `{value}` (expected hexadecimal)")]
    BadElementMask { value: String },
}

/// Source of structure records and sink for per-run match results.
pub trait Store {
    /// Molecule records, optionally capped at `limit` rows.
    fn get_molecules(&mut self, limit: Option<usize>) -> Result<Vec<MolRecord>, StoreError>;

    /// Fragment records, optionally capped at `limit` rows.
    fn get_fragments(&mut self, limit: Option<usize>) -> Result<Vec<MolRecord>, StoreError>;

    /// Drops any previously persisted results for the named run.
    fn reset_run(&mut self, name: &str) -> Result<(), StoreError>;

    /// Persists the aggregated match sets under the named run.
    fn insert_run(&mut self, name: &str, registry: &MatchRegistry) -> Result<(), StoreError>;
}
