// error module
mod error;
// case deck rendering
mod renderer;

//─────────────────────────────────────────────────────────────────────────────
// Public re-exports.
//─────────────────────────────────────────────────────────────────────────────
pub use error::TemplateError;
pub use renderer::prepare_case;
