// force/log parser
mod parser;
// time series and stable-window statistics
mod series;
// sweep summary table
mod summary;
// solver throughput
mod timing;

//─────────────────────────────────────────────────────────────────────────────
// Public re-exports.
//─────────────────────────────────────────────────────────────────────────────
pub use parser::{parse_force_file, parse_solver_log};
pub use series::TAIL_SAMPLES;
pub use summary::{render_summary_csv, render_summary_table, sort_by_velocity, CaseSummary};
pub use timing::parse_execution_time;

#[cfg(test)]
pub use series::ForceSample;
