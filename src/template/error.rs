use crate::config::ConfigError;
use thiserror::Error;

//─────────────────────────────────────────────────────────────────────────────

/// Error type for case preparation.
#[derive(Error, Debug)]
pub enum TemplateError {
    /// The case document could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No base tree exists for the requested solver version.
    #[error("Base configuration for version '{version}' not found at {path}")]
    BaseNotFound { version: String, path: String },

    /// A copy, write or delete inside the case tree failed.
    #[error("File operation failed on '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A template could not be loaded or rendered.
    #[error("Failed to render template '{path}': {source}")]
    Render {
        path: String,
        source: minijinja::Error,
    },
}

impl TemplateError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        TemplateError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
