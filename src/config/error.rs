use thiserror::Error;

//─────────────────────────────────────────────────────────────────────────────

/// Error type for case and project configuration handling.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or has the wrong shape.
    #[error("Failed to parse TOML file at '{path}': {message}")]
    Parse { path: String, message: String },

    /// The configuration could not be turned back into TOML.
    #[error("Failed to serialize config: {0}")]
    Serialize(String),

    /// The configuration file could not be written.
    #[error("Failed to write config file '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },

    /// A value was present but outside its allowed range.
    #[error("Invalid value for '{field}': {message}")]
    Validation { field: String, message: String },
}
