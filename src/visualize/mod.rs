// error module
mod error;
// OpenFOAM ASCII reader
mod foam;
// projection and PNG output
mod render;

//─────────────────────────────────────────────────────────────────────────────
// Public re-exports.
//─────────────────────────────────────────────────────────────────────────────
pub use error::VisualizeError;
pub use render::{visualize_case, RenderOptions, View};
