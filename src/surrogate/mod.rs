// error module
mod error;
// training data
mod dataset;
// least-squares fit
mod polyfit;
// chart output
mod plot;
// training entry point
mod trainer;

//─────────────────────────────────────────────────────────────────────────────
// Public re-exports.
//─────────────────────────────────────────────────────────────────────────────
pub use error::SurrogateError;
pub use polyfit::PolynomialModel;
pub use trainer::train;
