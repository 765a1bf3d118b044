//! Force extraction: the sweep summary across all variants and the force
//! history of a single case.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::error::AppError;
use super::file_handler::write_content_to_file;
use crate::config::{CaseConfig, ProjectConfig};
use crate::forces::{
    parse_force_file, parse_solver_log, render_summary_csv, render_summary_table,
    sort_by_velocity, CaseSummary, TAIL_SAMPLES,
};
use crate::sweep::froude_from_velocity;

//─────────────────────────────────────────────────────────────────────────────

pub const SWEEP_SUMMARY_FILE: &str = "dtc_sweep.csv";
pub const CASE_RESULTS_FILE: &str = "results.csv";
const SOLVER_LOG: &str = "log.foamRun";

/// Sweep variant directories under `cases/`, sorted by name.
pub fn sweep_case_dirs(project: &ProjectConfig) -> Result<Vec<PathBuf>, AppError> {
    let cases_dir = project.cases_dir();
    if !cases_dir.is_dir() {
        return Ok(Vec::new());
    }
    let prefix = format!("{}_fr", project.sweep.case_prefix);
    let mut dirs = Vec::new();
    for entry in fs::read_dir(&cases_dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(&prefix));
        if matches && path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Builds the summary row of one sweep case, or `None` (with a warning) if
/// its outputs are missing or too short.
///
/// # Errors
/// A `case.toml` that exists but cannot be parsed is fatal.
fn summarize_case(project: &ProjectConfig, case_dir: &Path) -> Result<Option<CaseSummary>, AppError> {
    let Some(name) = case_dir.file_name().and_then(|n| n.to_str()) else {
        return Ok(None);
    };
    let log_path = project.results_dir().join(name).join(SOLVER_LOG);
    let config_path = case_dir.join("case.toml");

    if !log_path.exists() {
        warn!("Log file not found for {}", name);
        return Ok(None);
    }
    if !config_path.exists() {
        warn!("Config not found for {}", name);
        return Ok(None);
    }

    let config = CaseConfig::load(&config_path)?;
    let velocity = config.velocity();
    let froude = config.froude().or_else(|| {
        let length = config.length().unwrap_or(project.sweep.default_length);
        velocity.map(|v| froude_from_velocity(v, length, project.sweep.gravity))
    });

    let series = parse_solver_log(&log_path);
    if series.is_empty() {
        warn!("No force data found in {}", log_path.display());
        return Ok(None);
    }
    let Some(window) = series.stable_window() else {
        warn!("Run too short for a stable window: {}", name);
        return Ok(None);
    };

    Ok(Some(CaseSummary::new(name, velocity, froude, window)))
}

/// Collects the stable-window resistance of every sweep case, writes
/// `results/dtc_sweep.csv` and prints the table to stdout.
///
/// Returns the rows sorted by velocity; an empty result writes no file.
pub fn extract_sweep(project: &ProjectConfig) -> Result<Vec<CaseSummary>, AppError> {
    let mut rows = Vec::new();
    for case_dir in sweep_case_dirs(project)? {
        if let Some(row) = summarize_case(project, &case_dir)? {
            info!(
                "{}: mean force {:.3} N over t = {:.2}..{:.2} s ({} samples)",
                row.case, row.window.mean, row.window.t_start, row.window.t_end, row.window.samples
            );
            rows.push(row);
        }
    }

    if rows.is_empty() {
        warn!("No results extracted.");
        return Ok(rows);
    }

    sort_by_velocity(&mut rows);
    let output = project.results_dir().join(SWEEP_SUMMARY_FILE);
    write_content_to_file(&output, &render_summary_csv(&rows))?;
    info!("Results saved to {}", output.display());
    print!("{}", render_summary_table(&rows));
    Ok(rows)
}

/// Force file of a single case: `force.dat`, falling back to `forces.dat`.
pub fn locate_force_file(case_dir: &Path) -> Option<PathBuf> {
    let forces_dir = case_dir.join("postProcessing").join("forces").join("0");
    ["force.dat", "forces.dat"]
        .iter()
        .map(|name| forces_dir.join(name))
        .find(|p| p.exists())
}

/// Writes `<case_dir>/results.csv` from the case's force output and logs
/// the mean of the last samples.
///
/// Returns the written path, or `None` when the case has no force output.
pub fn extract_case(case_dir: &Path) -> Result<Option<PathBuf>, AppError> {
    let Some(force_file) = locate_force_file(case_dir) else {
        warn!("Force file not found in {}", case_dir.display());
        return Ok(None);
    };

    info!("Reading forces from {}", force_file.display());
    let series = parse_force_file(&force_file);
    if series.is_empty() {
        warn!("No force samples in {}", force_file.display());
        return Ok(None);
    }

    let output = case_dir.join(CASE_RESULTS_FILE);
    write_content_to_file(&output, &series.to_csv())?;
    info!("Saved {} samples to {}", series.len(), output.display());

    if let Some(last) = series.last() {
        debug!(
            "Final sample at t = {}: pressure {:.4} N, viscous {:.4} N",
            last.time, last.pressure, last.viscous
        );
    }
    if let Some(mean) = series.tail_mean(TAIL_SAMPLES) {
        info!("Mean total force (last {} samples): {:.4} N", TAIL_SAMPLES, mean);
    }
    Ok(Some(output))
}
