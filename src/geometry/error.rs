use thiserror::Error;

//─────────────────────────────────────────────────────────────────────────────

/// Error type for hull geometry generation.
#[derive(Error, Debug)]
pub enum GeometryError {
    #[error("Invalid hull parameter '{name}': {message}")]
    InvalidParameter { name: String, message: String },

    #[error("Failed to write '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}
