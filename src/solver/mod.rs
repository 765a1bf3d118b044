// error module
mod error;
// controlDict repair and postProcess
mod controldict;
// docker pipeline
mod pipeline;

// command runner
pub mod runner;

//─────────────────────────────────────────────────────────────────────────────
// Public re-exports.
//─────────────────────────────────────────────────────────────────────────────
pub use controldict::postprocess_cases;
pub use error::SolverError;
pub use pipeline::ContainerPipeline;
pub use runner::{run_checked, CommandRunner, CommandSpec, SystemRunner};
