use thiserror::Error;

//─────────────────────────────────────────────────────────────────────────────

/// Error type for external solver and scheduler invocations.
#[derive(Error, Debug)]
pub enum SolverError {
    /// The case directory handed to the pipeline does not exist.
    #[error("Case directory not found: {0}")]
    CaseNotFound(String),

    /// A case file could not be read or written.
    #[error("File operation failed on '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The external program could not be started at all.
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The external program ran and exited unsuccessfully.
    #[error("Command failed with exit code {code}: {command}")]
    CommandFailed { command: String, code: i32 },
}

impl SolverError {
    /// Exit code to hand back to the shell for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SolverError::CommandFailed { code, .. } => *code,
            _ => 1,
        }
    }
}
