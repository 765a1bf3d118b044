//! Containerized solver pipeline.
//!
//! A case is meshed, refined, snapped, decomposed, solved in parallel and
//! reconstructed by one shell chain run inside the solver container, with the
//! case directory mounted read-write.

use std::path::{Path, PathBuf};
use tracing::info;

use super::error::SolverError;
use super::runner::{run_checked, CommandRunner, CommandSpec};
use crate::config::ProjectConfig;

//─────────────────────────────────────────────────────────────────────────────

/// Container launch settings for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerPipeline {
    pub image: String,
    pub bashrc: String,
    pub mount: String,
    pub user: String,
    pub processes: usize,
    pub refine_levels: usize,
}

impl ContainerPipeline {
    pub fn from_config(config: &ProjectConfig) -> Self {
        let c = &config.container;
        Self {
            image: c.image.clone(),
            bashrc: c.bashrc.clone(),
            mount: c.mount.clone(),
            user: c.user.clone(),
            processes: c.processes,
            refine_levels: c.refine_levels,
        }
    }

    /// Environment setup shared by every chain.
    fn prelude(&self) -> Vec<String> {
        vec![format!("source {}", self.bashrc), format!("cd {}", self.mount)]
    }

    /// Full mesh-and-solve step list, in execution order.
    pub fn solver_steps(&self) -> Vec<String> {
        let mut steps = self.prelude();

        steps.push("surfaceFeatureExtract".to_string());
        steps.push("blockMesh".to_string());
        for level in 1..=self.refine_levels {
            steps.push(format!("topoSet -dict system/topoSetDict.{level}"));
            steps.push("refineMesh -dict system/refineMeshDict -overwrite".to_string());
        }
        steps.push("snappyHexMesh -overwrite".to_string());

        // Fresh initial fields from 0.orig, then decompose.
        steps.push("rm -rf 0".to_string());
        steps.push("cp -r 0.orig 0".to_string());
        steps.push("setFields".to_string());
        steps.push("rm -rf processor*".to_string());
        steps.push("decomposePar".to_string());
        steps.push("renumberMesh -overwrite".to_string());

        steps.push(format!("mpirun -np {} interFoam -parallel", self.processes));
        steps.push("reconstructPar".to_string());
        steps
    }

    /// Step list that re-runs function objects for one written time.
    pub fn postprocess_steps(&self, time: f64) -> Vec<String> {
        let mut steps = self.prelude();
        steps.push(format!("postProcess -time {time}"));
        steps
    }

    /// Wraps a step list in a `docker run` invocation for `case_dir`.
    ///
    /// `case_dir` should be absolute; docker rejects relative bind mounts.
    pub fn container_command(&self, case_dir: &Path, steps: &[String]) -> CommandSpec {
        CommandSpec::new("docker")
            .args(["run", "--rm", "-u"])
            .arg(self.user.as_str())
            .arg("-v")
            .arg(format!("{}:{}", case_dir.display(), self.mount))
            .arg("-w")
            .arg(self.mount.as_str())
            .arg(self.image.as_str())
            .args(["/bin/bash", "-c"])
            .arg(steps.join(" && "))
    }

    /// Meshes and solves `case_dir` in the container.
    ///
    /// # Errors
    /// Returns `SolverError::CaseNotFound` for a missing case directory and
    /// `SolverError::CommandFailed` (carrying the container's exit code) if
    /// the chain fails.
    pub fn run_case(
        &self,
        runner: &dyn CommandRunner,
        case_dir: &Path,
        dry_run: bool,
    ) -> Result<(), SolverError> {
        let case_dir = absolute_case_dir(case_dir)?;
        let spec = self.container_command(&case_dir, &self.solver_steps());
        self.execute(runner, &spec, dry_run)
    }

    /// Runs `postProcess -time <time>` for `case_dir` in the container.
    pub fn postprocess_case(
        &self,
        runner: &dyn CommandRunner,
        case_dir: &Path,
        time: f64,
    ) -> Result<(), SolverError> {
        let case_dir = absolute_case_dir(case_dir)?;
        let spec = self.container_command(&case_dir, &self.postprocess_steps(time));
        self.execute(runner, &spec, false)
    }

    fn execute(
        &self,
        runner: &dyn CommandRunner,
        spec: &CommandSpec,
        dry_run: bool,
    ) -> Result<(), SolverError> {
        if dry_run {
            info!("[DRY-RUN] Would execute: {}", spec);
            return Ok(());
        }
        run_checked(runner, spec)
    }
}

fn absolute_case_dir(case_dir: &Path) -> Result<PathBuf, SolverError> {
    if !case_dir.is_dir() {
        return Err(SolverError::CaseNotFound(case_dir.display().to_string()));
    }
    case_dir.canonicalize().map_err(|e| SolverError::Io {
        path: case_dir.display().to_string(),
        source: e,
    })
}
