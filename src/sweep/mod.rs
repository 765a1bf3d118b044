// error module
mod error;
// Froude scaling and naming
mod froude;
// templated velocity sweep
mod variants;
// ESI hull sweep
mod esi;
// throughput benchmark
mod benchmark;

//─────────────────────────────────────────────────────────────────────────────
// Public re-exports.
//─────────────────────────────────────────────────────────────────────────────
pub use benchmark::run_benchmark;
pub use error::SweepError;
pub use esi::EsiSweep;
pub use froude::{froude_from_velocity, GRAVITY};
pub use variants::{prepare_base_mesh, run_sweep, setup_sweep_cases};
