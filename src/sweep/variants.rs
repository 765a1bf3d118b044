//! Velocity sweep over the base case.
//!
//! Sweeps run in three stages:
//! 1. Obtain a base mesh once (reused from a previous run when present).
//! 2. Write one case directory per Froude number, cloned from the base case
//!    and carrying the base mesh, so variants skip meshing.
//! 3. Hand every variant's solver log to the workflow scheduler as a target.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::error::SweepError;
use super::froude::{round_to, sweep_case_name, velocity_from_froude};
use crate::config::{CaseConfig, ProjectConfig};
use crate::solver::{run_checked, CommandRunner, CommandSpec};
use crate::tree;

//─────────────────────────────────────────────────────────────────────────────

/// One prepared sweep variant.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepCase {
    pub name: String,
    pub path: PathBuf,
    pub velocity: f64,
    pub froude: f64,
}

/// Scheduler invocation that builds the given targets (paths relative to the root).
pub fn scheduler_command(project: &ProjectConfig, targets: &[PathBuf]) -> CommandSpec {
    CommandSpec::new(project.sweep.scheduler.as_str())
        .arg("-j")
        .arg(project.sweep.workers.to_string())
        .args(targets.iter().map(|t| t.display().to_string()))
        .current_dir(&project.root)
}

pub(super) fn run_scheduler(
    project: &ProjectConfig,
    runner: &dyn CommandRunner,
    targets: &[PathBuf],
    dry_run: bool,
) -> Result<(), SweepError> {
    let spec = scheduler_command(project, targets);
    if dry_run {
        info!("[DRY-RUN] Would execute: {}", spec);
        return Ok(());
    }
    run_checked(runner, &spec)?;
    Ok(())
}

/// Returns the base mesh directory, solving the mesh base case first if needed.
///
/// A mesh counts as present once `constant/polyMesh/points` exists in the
/// mesh base case's results.
pub fn prepare_base_mesh(
    project: &ProjectConfig,
    runner: &dyn CommandRunner,
    dry_run: bool,
) -> Result<PathBuf, SweepError> {
    let mesh_case = format!("{}_mesh_base", project.sweep.base_case);
    let mesh_source = project
        .results_dir()
        .join(&mesh_case)
        .join("constant")
        .join("polyMesh");

    if mesh_source.join("points").exists() {
        info!("Using existing base mesh from {}", mesh_source.display());
        return Ok(mesh_source);
    }

    info!("Preparing base mesh case: {}", mesh_case);
    if !dry_run {
        let base_case_path = base_case_path(project)?;
        let mesh_case_path = project.cases_dir().join(&mesh_case);
        tree::recreate_dir(&mesh_case_path).map_err(|e| SweepError::io(&mesh_case_path, e))?;
        clean_dir(&project.build_dir().join(&mesh_case))?;

        let target = mesh_case_path.join("case.toml");
        fs::copy(base_case_path.join("case.toml"), &target).map_err(|e| SweepError::io(&target, e))?;
        copy_system(&base_case_path, &mesh_case_path)?;
    }

    run_scheduler(project, runner, &[project.relative_log_target(&mesh_case)], dry_run)?;
    Ok(mesh_source)
}

/// Creates one case directory per Froude number.
///
/// Velocities use the base case's `parameters.length` (falling back to the
/// configured default length). With `dry_run` nothing is written, but the
/// returned plan is the same.
pub fn setup_sweep_cases(
    project: &ProjectConfig,
    froude_points: &[f64],
    mesh_source: Option<&Path>,
    dry_run: bool,
) -> Result<Vec<SweepCase>, SweepError> {
    let base_case_path = base_case_path(project)?;
    let base_config = CaseConfig::load(&base_case_path.join("case.toml"))?;
    let length = base_config.length().unwrap_or(project.sweep.default_length);

    let mut cases = Vec::with_capacity(froude_points.len());
    for &froude in froude_points {
        let velocity = velocity_from_froude(froude, length, project.sweep.gravity);
        let name = sweep_case_name(&project.sweep.case_prefix, froude);
        let path = project.cases_dir().join(&name);

        info!(
            "Preparing case: {} (Fr={:.3}, V={:.3} m/s)",
            name, froude, velocity
        );

        if !dry_run {
            let mut variant = base_config.clone();
            variant.set_name(&name);
            variant.set_parameter("velocity", round_to(velocity, 4));
            variant.set_parameter("froude", round_to(froude, 4));
            write_variant(project, &base_case_path, &base_config, &variant, &path)?;

            if let Some(mesh) = mesh_source.filter(|m| m.exists()) {
                let target = path.join("constant").join("polyMesh");
                tree::recreate_dir(&target).map_err(|e| SweepError::io(&target, e))?;
                tree::copy_dir_recursive(mesh, &target).map_err(|e| SweepError::io(mesh, e))?;
                info!("Copied mesh from base to {}", name);
            }
        }

        cases.push(SweepCase {
            name,
            path,
            velocity,
            froude,
        });
    }
    Ok(cases)
}

/// Runs every prepared case through the scheduler in one invocation.
pub fn run_sweep(
    project: &ProjectConfig,
    runner: &dyn CommandRunner,
    cases: &[SweepCase],
    dry_run: bool,
) -> Result<(), SweepError> {
    let targets: Vec<PathBuf> = cases
        .iter()
        .map(|c| project.relative_log_target(&c.name))
        .collect();
    run_scheduler(project, runner, &targets, dry_run)
}

/// Writes a fresh variant directory: case document, patched system
/// dictionaries and hull geometry. Stale build and result directories of the
/// same name are removed so the scheduler reruns the case.
pub(super) fn write_variant(
    project: &ProjectConfig,
    base_case_path: &Path,
    base_config: &CaseConfig,
    variant: &CaseConfig,
    path: &Path,
) -> Result<(), SweepError> {
    let name = variant.name();
    tree::recreate_dir(path).map_err(|e| SweepError::io(path, e))?;
    clean_dir(&project.build_dir().join(name))?;
    clean_dir(&project.results_dir().join(name))?;

    variant.save(&path.join("case.toml"))?;

    if copy_system(base_case_path, path)? {
        let snappy = path.join("system").join("snappyHexMeshDict");
        if snappy.is_file() {
            let content = fs::read_to_string(&snappy).map_err(|e| SweepError::io(&snappy, e))?;
            let patched = rename_geometry_refs(&content, base_config.name(), name);
            fs::write(&snappy, patched).map_err(|e| SweepError::io(&snappy, e))?;
        }
    }

    let geometry = project.geometry_source();
    if geometry.is_file() {
        let target = path.join(format!("{name}.stl.gz"));
        fs::copy(&geometry, &target).map_err(|e| SweepError::io(&target, e))?;
    } else {
        warn!("Geometry source not found at {}", geometry.display());
    }
    Ok(())
}

/// Points geometry references at the variant.
///
/// `<base>_hull` and every other occurrence of `<base>` become `<variant>`,
/// so `<base>.stl` becomes `<variant>.stl`. Done in a single pass so a
/// variant name containing the base name is not rewritten twice.
pub fn rename_geometry_refs(content: &str, base_name: &str, variant: &str) -> String {
    if base_name.is_empty() {
        return content.to_string();
    }
    let hull = format!("{base_name}_hull");
    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    while let Some(idx) = rest.find(base_name) {
        out.push_str(&rest[..idx]);
        out.push_str(variant);
        let tail = &rest[idx..];
        let matched = if tail.starts_with(&hull) {
            hull.len()
        } else {
            base_name.len()
        };
        rest = &tail[matched..];
    }
    out.push_str(rest);
    out
}

pub(super) fn base_case_path(project: &ProjectConfig) -> Result<PathBuf, SweepError> {
    let path = project.cases_dir().join(&project.sweep.base_case);
    if !path.join("case.toml").is_file() {
        return Err(SweepError::BaseCaseNotFound(path.display().to_string()));
    }
    Ok(path)
}

/// Copies `<from>/system` into `<to>/system`. Returns whether there was one.
fn copy_system(from: &Path, to: &Path) -> Result<bool, SweepError> {
    let system = from.join("system");
    if !system.is_dir() {
        return Ok(false);
    }
    tree::copy_dir_recursive(&system, &to.join("system")).map_err(|e| SweepError::io(&system, e))?;
    Ok(true)
}

fn clean_dir(path: &Path) -> Result<(), SweepError> {
    tree::remove_dir_if_exists(path)
        .map(|_| ())
        .map_err(|e| SweepError::io(path, e))
}
