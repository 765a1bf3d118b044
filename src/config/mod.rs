// error module
mod error;
// case.toml documents
mod case;
// hullflow.toml
mod project;

//─────────────────────────────────────────────────────────────────────────────
// Public re-exports.
//─────────────────────────────────────────────────────────────────────────────
pub use case::CaseConfig;
pub use error::ConfigError;
pub use project::{CliOverrides, ProjectConfig};
