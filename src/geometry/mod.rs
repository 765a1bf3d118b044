// error module
mod error;
// analytic Wigley hull
mod wigley;

//─────────────────────────────────────────────────────────────────────────────
// Public re-exports.
//─────────────────────────────────────────────────────────────────────────────
pub use error::GeometryError;
pub use wigley::WigleyHull;
