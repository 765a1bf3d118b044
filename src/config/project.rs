//! Project-level configuration (`hullflow.toml`).
//!
//! Resolution order (highest priority first):
//! 1. CLI flags (applied via `CliOverrides`)
//! 2. Environment variables (`HULLFLOW_*`)
//! 3. Project config (`hullflow.toml` in the project root, or `--config`)
//! 4. Compiled defaults

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::error::ConfigError;
use crate::sweep::GRAVITY;

//─────────────────────────────────────────────────────────────────────────────

/// File name looked up in the project root when no `--config` is given.
pub const PROJECT_CONFIG_FILE: &str = "hullflow.toml";

/// Directory layout of a project, relative to the project root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub cases_dir: PathBuf,
    pub build_dir: PathBuf,
    pub results_dir: PathBuf,
    /// Holds one base tree per solver version (`<base_config_dir>/<version>`).
    pub base_config_dir: PathBuf,
    pub geometry_source: PathBuf,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cases_dir: PathBuf::from("cases"),
            build_dir: PathBuf::from("build"),
            results_dir: PathBuf::from("results"),
            base_config_dir: PathBuf::from("config/base"),
            geometry_source: PathBuf::from("config/geometry/dtc_hull_esi.stl.gz"),
        }
    }
}

/// How the solver container is launched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub image: String,
    /// Environment script sourced inside the container before any solver tool.
    pub bashrc: String,
    /// Mount point of the case directory inside the container.
    pub mount: String,
    pub user: String,
    /// MPI rank count for the parallel solver run.
    pub processes: usize,
    /// Number of `topoSet`/`refineMesh` passes before snapping.
    pub refine_levels: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            image: "openfoam-ships:2506".to_string(),
            bashrc: "/usr/lib/openfoam/openfoam2506/etc/bashrc".to_string(),
            mount: "/mnt/case".to_string(),
            user: "1000".to_string(),
            processes: 8,
            refine_levels: 6,
        }
    }
}

/// Sweep defaults and the external workflow scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Case under `cases_dir` that sweep variants are cloned from.
    pub base_case: String,
    /// Name prefix of sweep variants (`<prefix>_fr0200`).
    pub case_prefix: String,
    pub gravity: f64,
    /// Hull length used when the base case has no `parameters.length`.
    pub default_length: f64,
    pub froude_points: Vec<f64>,
    pub scheduler: String,
    /// Scheduler job count. One keeps heavyweight solver runs from contending.
    pub workers: usize,
    pub esi_base_case: PathBuf,
    pub esi_froude_points: Vec<f64>,
    /// Length between perpendiculars of the ESI tutorial hull.
    pub esi_lpp: f64,
    /// Inflow speed literal written in the baseline `0.orig/U`.
    pub esi_baseline_velocity: String,
    pub esi_prefix: String,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            base_case: "dtc_esi".to_string(),
            case_prefix: "dtc".to_string(),
            gravity: GRAVITY,
            default_length: 3.0,
            froude_points: vec![0.10, 0.15, 0.18, 0.20, 0.22, 0.25],
            scheduler: "snakemake".to_string(),
            workers: 1,
            esi_base_case: PathBuf::from("cases/dtc_esi_baseline"),
            esi_froude_points: vec![0.18, 0.20, 0.22],
            esi_lpp: 5.976,
            esi_baseline_velocity: "1.668".to_string(),
            esi_prefix: "dtc_esi".to_string(),
        }
    }
}

/// Top-level configuration aggregating all sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Project root every relative layout path is resolved against.
    #[serde(skip)]
    pub root: PathBuf,
    pub layout: LayoutConfig,
    pub container: ContainerConfig,
    pub sweep: SweepConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub image: Option<String>,
    pub processes: Option<usize>,
    pub refine_levels: Option<usize>,
}

impl ProjectConfig {
    /// Loads the project configuration with layered resolution.
    ///
    /// `config_path` names an explicit file (must exist); otherwise
    /// `hullflow.toml` in `root` is used when present.
    pub fn load(
        root: &Path,
        config_path: Option<&Path>,
        cli_overrides: Option<&CliOverrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = root.join(PROJECT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(&default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.root = root.to_path_buf();

        config.apply_env_overrides(|key| std::env::var(key).ok());

        if let Some(cli) = cli_overrides {
            config.apply_cli_overrides(cli);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parses a configuration from a TOML string.
    #[cfg(test)]
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Self::parse(content, "<string>")
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    fn parse(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })
    }

    /// Applies `HULLFLOW_IMAGE` and `HULLFLOW_SCHEDULER`.
    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(image) = lookup("HULLFLOW_IMAGE") {
            self.container.image = image;
        }
        if let Some(scheduler) = lookup("HULLFLOW_SCHEDULER") {
            self.sweep.scheduler = scheduler;
        }
    }

    fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(image) = &cli.image {
            self.container.image = image.clone();
        }
        if let Some(processes) = cli.processes {
            self.container.processes = processes;
        }
        if let Some(levels) = cli.refine_levels {
            self.container.refine_levels = levels;
        }
    }

    /// Validates the merged configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sweep.gravity > 0.0) {
            return Err(ConfigError::Validation {
                field: "sweep.gravity".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if !(self.sweep.default_length > 0.0) || !(self.sweep.esi_lpp > 0.0) {
            return Err(ConfigError::Validation {
                field: "sweep.default_length".to_string(),
                message: "hull lengths must be greater than 0".to_string(),
            });
        }
        if self.sweep.workers == 0 {
            return Err(ConfigError::Validation {
                field: "sweep.workers".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.container.processes == 0 {
            return Err(ConfigError::Validation {
                field: "container.processes".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.sweep.esi_baseline_velocity.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "sweep.esi_baseline_velocity".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.container.image.trim().is_empty() {
            return Err(ConfigError::Validation {
                field: "container.image".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn cases_dir(&self) -> PathBuf {
        self.root.join(&self.layout.cases_dir)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join(&self.layout.build_dir)
    }

    pub fn results_dir(&self) -> PathBuf {
        self.root.join(&self.layout.results_dir)
    }

    pub fn base_config_dir(&self) -> PathBuf {
        self.root.join(&self.layout.base_config_dir)
    }

    pub fn geometry_source(&self) -> PathBuf {
        self.root.join(&self.layout.geometry_source)
    }

    /// Solver log of a case, relative to the project root, as the scheduler expects it.
    pub fn relative_log_target(&self, case_name: &str) -> PathBuf {
        self.layout.results_dir.join(case_name).join("log.foamRun")
    }
}
