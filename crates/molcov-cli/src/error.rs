use molcov::engine::error::EngineError;
use molcov::store::patterns::PatternSetError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] EngineError),

    #[error(transparent)]
    Patterns(#[from] PatternSetError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
