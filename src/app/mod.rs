// command-line definition
mod cli;
// error module
mod error;
// input validation and result files
mod file_handler;
// tracing subscriber
mod logger;
// subcommand dispatch
mod orchestrator;
// force extraction
mod processing;

//─────────────────────────────────────────────────────────────────────────────
// Public re-exports.
//─────────────────────────────────────────────────────────────────────────────
pub use cli::Cli;
pub use error::AppError;
pub use orchestrator::run_app;
