use crate::config::ConfigError;
use crate::solver::SolverError;
use thiserror::Error;

//─────────────────────────────────────────────────────────────────────────────

/// Error type for sweep setup and execution.
#[derive(Error, Debug)]
pub enum SweepError {
    /// The base case document could not be loaded or a variant not written.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The base case the sweep clones from does not exist.
    #[error("Base case not found at {0}")]
    BaseCaseNotFound(String),

    /// A copy, write or delete while building variants failed.
    #[error("File operation failed on '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The scheduler or container run failed.
    #[error(transparent)]
    Solver(#[from] SolverError),
}

impl SweepError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        SweepError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            SweepError::Solver(e) => e.exit_code(),
            _ => 1,
        }
    }
}
