use thiserror::Error;

//─────────────────────────────────────────────────────────────────────────────

/// Error type for surrogate training.
#[derive(Error, Debug)]
pub enum SurrogateError {
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// The sweep summary lacks a required column.
    #[error("Column '{column}' not found in {path}")]
    MissingColumn { path: String, column: String },

    #[error("Need at least {needed} distinct velocities for the fit, found {found}")]
    InsufficientData { needed: usize, found: usize },

    /// The least-squares solve did not produce a solution.
    #[error("Least-squares fit failed: {0}")]
    Fit(String),

    #[error("Model serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to write plot '{path}': {source}")]
    Plot {
        path: String,
        source: image::ImageError,
    },
}

impl SurrogateError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        SurrogateError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
