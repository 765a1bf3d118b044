use thiserror::Error;

//─────────────────────────────────────────────────────────────────────────────

/// Error type for reading solver output and rendering it.
#[derive(Error, Debug)]
pub enum VisualizeError {
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A mesh or field file is not in the expected ASCII layout.
    #[error("Malformed OpenFOAM file '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("Failed to write image '{path}': {source}")]
    Image {
        path: String,
        source: image::ImageError,
    },
}

impl VisualizeError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        VisualizeError::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn parse(path: &std::path::Path, message: impl Into<String>) -> Self {
        VisualizeError::Parse {
            path: path.display().to_string(),
            message: message.into(),
        }
    }
}
