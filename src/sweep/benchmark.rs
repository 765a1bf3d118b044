//! Short solver run used to estimate how long a full sweep takes.

use std::path::Path;
use tracing::{error, info, warn};

use super::error::SweepError;
use super::froude::{round_to, velocity_from_froude};
use super::variants::{base_case_path, run_scheduler, write_variant};
use crate::config::{CaseConfig, ProjectConfig};
use crate::forces::parse_execution_time;
use crate::solver::CommandRunner;

//─────────────────────────────────────────────────────────────────────────────

pub const BENCHMARK_FROUDE: f64 = 0.26;
pub const BENCHMARK_END_TIME: f64 = 2.0;
pub const BENCHMARK_WRITE_INTERVAL: f64 = 1.0;

/// Size of the sweep the estimate is reported for.
pub const SWEEP_CASES: usize = 6;
pub const SWEEP_SIMULATED_SECONDS: f64 = 20.0;

/// Measured solver throughput and the extrapolated sweep cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkEstimate {
    /// Wall-clock seconds per simulated second.
    pub wall_per_sim_second: f64,
    pub estimated_hours: f64,
}

impl BenchmarkEstimate {
    pub fn new(wall_per_sim_second: f64) -> Self {
        Self {
            wall_per_sim_second,
            estimated_hours: estimate_sweep_hours(
                wall_per_sim_second,
                SWEEP_CASES,
                SWEEP_SIMULATED_SECONDS,
            ),
        }
    }
}

/// Wall-clock hours for `cases` runs of `simulated_seconds` each.
pub fn estimate_sweep_hours(wall_per_sim_second: f64, cases: usize, simulated_seconds: f64) -> f64 {
    wall_per_sim_second * simulated_seconds * cases as f64 / 3600.0
}

/// Prepares `<base>_benchmark`, solves it through the scheduler and reports
/// the solver speed.
///
/// Returns `Ok(None)` when the run produced no usable log.
pub fn run_benchmark(
    project: &ProjectConfig,
    runner: &dyn CommandRunner,
) -> Result<Option<BenchmarkEstimate>, SweepError> {
    let base_case_path = base_case_path(project)?;
    let base_config = CaseConfig::load(&base_case_path.join("case.toml"))?;
    let length = base_config.length().unwrap_or(project.sweep.default_length);
    let velocity = velocity_from_froude(BENCHMARK_FROUDE, length, project.sweep.gravity);

    let name = format!("{}_benchmark", project.sweep.base_case);
    info!(
        "Setting up benchmark case: {} (Fr={}, V={:.3} m/s)",
        name, BENCHMARK_FROUDE, velocity
    );

    let mut variant = base_config.clone();
    variant.set_name(&name);
    variant.set_parameter("velocity", round_to(velocity, 4));
    variant.set_parameter("froude", BENCHMARK_FROUDE);
    variant.set_parameter("endTime", BENCHMARK_END_TIME);
    variant.set_parameter("writeInterval", BENCHMARK_WRITE_INTERVAL);
    write_variant(
        project,
        &base_case_path,
        &base_config,
        &variant,
        &project.cases_dir().join(&name),
    )?;

    info!("Running benchmark ({}s simulation)...", BENCHMARK_END_TIME);
    run_scheduler(project, runner, &[project.relative_log_target(&name)], false)?;

    let log_path = project.root.join(project.relative_log_target(&name));
    Ok(evaluate_log(&log_path))
}

fn evaluate_log(log_path: &Path) -> Option<BenchmarkEstimate> {
    if !log_path.exists() {
        error!("Benchmark failed: log file {} not found", log_path.display());
        return None;
    }
    let Some(speed) = parse_execution_time(log_path) else {
        warn!("Could not determine execution time from {}", log_path.display());
        return None;
    };

    let estimate = BenchmarkEstimate::new(speed);
    info!("Benchmark results:");
    info!(
        "  Speed: {:.2} s (wall) / s (sim)",
        estimate.wall_per_sim_second
    );
    info!(
        "  Estimated sweep time ({} cases x {}s): {:.1} hours",
        SWEEP_CASES, SWEEP_SIMULATED_SECONDS, estimate.estimated_hours
    );
    Some(estimate)
}

#[cfg(test)]
mod tests {
    use super::super::variants::tests::project_fixture;
    use super::*;
    use crate::solver::runner::mock::RecordingRunner;
    use std::fs;

    #[test]
    fn test_estimate_hours() {
        // 90 s wall per simulated second, 6 x 20 s
        assert!((estimate_sweep_hours(90.0, 6, 20.0) - 3.0).abs() < 1e-12);
        assert_eq!(BenchmarkEstimate::new(0.0).estimated_hours, 0.0);
    }

    #[test]
    fn test_benchmark_case_setup_and_run() {
        let (_dir, project) = project_fixture();
        let runner = RecordingRunner::new();
        // no log written by the mock runner
        let estimate = run_benchmark(&project, &runner).unwrap();
        assert!(estimate.is_none());

        let case = project.cases_dir().join("dtc_esi_benchmark");
        let config = CaseConfig::load(&case.join("case.toml")).unwrap();
        assert_eq!(config.name(), "dtc_esi_benchmark");
        assert_eq!(config.parameter("endTime"), Some(2.0));
        assert_eq!(config.parameter("writeInterval"), Some(1.0));
        assert_eq!(config.froude(), Some(0.26));

        let recorded = runner.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].args[2], "results/dtc_esi_benchmark/log.foamRun");
    }

    #[test]
    fn test_evaluate_log() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("log.foamRun");
        let mut content = String::new();
        for step in 1..=4 {
            content.push_str(&format!(
                "Time = {}\nExecutionTime = {} s  ClockTime = 1 s\n",
                step as f64 * 0.5,
                step as f64 * 60.0
            ));
        }
        fs::write(&log, content).unwrap();

        let estimate = evaluate_log(&log).unwrap();
        // (240 - 180) / (2.0 - 1.5) = 120 s wall per simulated second
        assert!((estimate.wall_per_sim_second - 120.0).abs() < 1e-9);
        assert!((estimate.estimated_hours - 4.0).abs() < 1e-9);
    }
}
