use std::path::PathBuf;

use thiserror::Error;

use crate::core::smiles::SmilesError;
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid filter spec `{0}` (expected `elements:...`, `natoms:...` or `inchi:...`)")]
    FilterSpec(String),

    #[error("Failed to read filter data from '{path}': {source}")]
    FilterIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to sanitize structure `{smiles}`: {source}")]
    Sanitize { smiles: String, source: SmilesError },

    #[error("Failed to build worker pool: {source}")]
    Pool {
        #[from]
        source: rayon::ThreadPoolBuildError,
    },

    #[error("Store operation failed: {source}")]
    Store {
        #[from]
        source: StoreError,
    },
}
