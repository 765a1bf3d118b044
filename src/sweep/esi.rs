//! Sweep over the ESI tutorial hull.
//!
//! Unlike the templated sweep, variants here are plain clones of a solved
//! baseline case whose `0.orig/U` carries the inflow speed as a literal.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use super::error::SweepError;
use super::froude::{esi_case_name, velocity_from_froude};
use crate::config::ProjectConfig;
use crate::solver::{CommandRunner, ContainerPipeline};
use crate::tree;

//─────────────────────────────────────────────────────────────────────────────

/// Replaces the baseline speed literal with `velocity` at 5 decimals.
///
/// Signed occurrences such as `-1.668` keep their sign.
pub fn patch_inflow_velocity(content: &str, baseline: &str, velocity: f64) -> String {
    content.replace(baseline, &format!("{velocity:.5}"))
}

/// Settings of one ESI sweep invocation.
#[derive(Debug, Clone)]
pub struct EsiSweep {
    pub base_case: PathBuf,
    pub froude_points: Vec<f64>,
    pub lpp: f64,
    pub gravity: f64,
    pub baseline_velocity: String,
    pub prefix: String,
    pub cases_dir: PathBuf,
}

impl EsiSweep {
    /// Sweep with project defaults. The base case path is resolved against the project root.
    pub fn from_config(project: &ProjectConfig) -> Self {
        Self {
            base_case: project.root.join(&project.sweep.esi_base_case),
            froude_points: project.sweep.esi_froude_points.clone(),
            lpp: project.sweep.esi_lpp,
            gravity: project.sweep.gravity,
            baseline_velocity: project.sweep.esi_baseline_velocity.clone(),
            prefix: project.sweep.esi_prefix.clone(),
            cases_dir: project.cases_dir(),
        }
    }

    /// Variant directories, one per Froude number.
    pub fn case_dirs(&self) -> Vec<PathBuf> {
        self.froude_points
            .iter()
            .map(|&fr| self.cases_dir.join(esi_case_name(&self.prefix, fr)))
            .collect()
    }

    /// Prepares and runs every variant; returns the number of failed cases.
    ///
    /// # Errors
    /// Fails up front only when the baseline case is missing; per-case
    /// problems are logged and counted.
    pub fn run(
        &self,
        pipeline: &ContainerPipeline,
        runner: &dyn CommandRunner,
        dry_run: bool,
    ) -> Result<usize, SweepError> {
        if !dry_run && !self.base_case.is_dir() {
            return Err(SweepError::BaseCaseNotFound(
                self.base_case.display().to_string(),
            ));
        }

        let mut failures = 0;
        for &froude in &self.froude_points {
            let velocity = velocity_from_froude(froude, self.lpp, self.gravity);
            let name = esi_case_name(&self.prefix, froude);
            let case_dir = self.cases_dir.join(&name);
            info!(
                "--- Preparing Case: {} (Fr={}, U={:.4} m/s) ---",
                name, froude, velocity
            );

            if dry_run {
                info!(
                    "[DRY-RUN] Would clone {} to {}, set U = {:.5} and run the container pipeline",
                    self.base_case.display(),
                    case_dir.display(),
                    velocity
                );
                continue;
            }
            if let Err(e) = self.prepare_variant(&case_dir, velocity) {
                error!("Failed to prepare {}: {}", name, e);
                failures += 1;
                continue;
            }

            info!("Running simulation for {}...", name);
            if let Err(e) = pipeline.run_case(runner, &case_dir, false) {
                error!("Simulation failed for {}: {}", name, e);
                failures += 1;
            }
        }
        Ok(failures)
    }

    fn prepare_variant(&self, case_dir: &Path, velocity: f64) -> Result<(), SweepError> {
        if case_dir.exists() {
            info!("Case {} exists, reusing.", case_dir.display());
        } else {
            tree::copy_dir_recursive(&self.base_case, case_dir)
                .map_err(|e| SweepError::io(&self.base_case, e))?;
        }

        let u_file = case_dir.join("0.orig").join("U");
        if u_file.is_file() {
            let content = fs::read_to_string(&u_file).map_err(|e| SweepError::io(&u_file, e))?;
            let patched = patch_inflow_velocity(&content, &self.baseline_velocity, velocity);
            fs::write(&u_file, patched).map_err(|e| SweepError::io(&u_file, e))?;
        } else {
            error!("U file not found in {}", case_dir.display());
        }
        Ok(())
    }
}
