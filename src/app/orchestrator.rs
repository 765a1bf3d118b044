//! Main application orchestrator.
//!
//! Initializes logging, resolves the layered project configuration and hands
//! each subcommand to the module that implements it. External programs
//! (docker, the workflow scheduler) are reached through a `CommandRunner`, so
//! `dispatch` can be driven by a recording runner in tests.

use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use super::cli::{Cli, Command};
use super::error::AppError;
use super::file_handler::{validate_dir, validate_file};
use super::logger;
use super::processing;
use crate::config::{CliOverrides, ProjectConfig};
use crate::geometry::WigleyHull;
use crate::solver::{postprocess_cases, CommandRunner, ContainerPipeline, SystemRunner};
use crate::surrogate::{self, PolynomialModel};
use crate::sweep::{self, EsiSweep};
use crate::template::prepare_case;
use crate::visualize::{visualize_case, RenderOptions};

pub const DEFAULT_MODEL_FILE: &str = "dtc_surrogate_model.json";
pub const DEFAULT_PLOT_FILE: &str = "dtc_surrogate_plot.png";

/// Runs the application for parsed command-line arguments.
///
/// # Errors
/// Returns `AppError` for configuration problems and for any failure the
/// subcommand treats as fatal. A failed external command surfaces as
/// `AppError::Solver`/`AppError::Sweep` carrying its exit code.
pub fn run_app(cli: Cli) -> Result<(), AppError> {
    if let Err(e) = logger::init_logging(cli.quiet, cli.log_file.as_deref()) {
        // Keep going with stderr output only.
        eprintln!(
            "Warning: Failed to open log file{}: {}. Logging to stderr only.",
            cli.log_file
                .as_ref()
                .map(|p| format!(" ({})", p.display()))
                .unwrap_or_default(),
            e
        );
        let _ = logger::init_logging(cli.quiet, None);
    }

    let overrides = match &cli.command {
        Command::Run {
            image,
            processes,
            refine_levels,
            ..
        } => CliOverrides {
            image: image.clone(),
            processes: *processes,
            refine_levels: *refine_levels,
        },
        _ => CliOverrides::default(),
    };
    let project = ProjectConfig::load(&cli.project_root, cli.config.as_deref(), Some(&overrides))?;
    debug!("Project root: {}", project.root.display());

    dispatch(cli.command, &project, &SystemRunner)
}

/// Executes one subcommand against a resolved project.
pub fn dispatch(
    command: Command,
    project: &ProjectConfig,
    runner: &dyn CommandRunner,
) -> Result<(), AppError> {
    match command {
        Command::Prepare { config, output_dir } => {
            validate_file(&config)?;
            let prepared = prepare_case(&config, &output_dir, &project.base_config_dir())?;
            info!(
                "Prepared '{}' in {} ({} template(s) rendered)",
                prepared.name,
                prepared.output_dir.display(),
                prepared.rendered.len()
            );
        }

        Command::Run {
            case_dir, dry_run, ..
        } => {
            let pipeline = ContainerPipeline::from_config(project);
            pipeline.run_case(runner, &case_dir, dry_run)?;
        }

        Command::Postprocess { cases, time } => {
            let cases = if cases.is_empty() {
                EsiSweep::from_config(project).case_dirs()
            } else {
                cases
            };
            let pipeline = ContainerPipeline::from_config(project);
            let failures = postprocess_cases(&pipeline, runner, &cases, time);
            report_failures("Post-processing", failures, cases.len());
        }

        Command::Sweep { froude, dry_run } => {
            let points = if froude.is_empty() {
                project.sweep.froude_points.clone()
            } else {
                froude
            };
            let mesh = sweep::prepare_base_mesh(project, runner, dry_run)?;
            let cases = sweep::setup_sweep_cases(project, &points, Some(&mesh), dry_run)?;
            if cases.is_empty() {
                warn!("No Froude numbers to sweep.");
                return Ok(());
            }
            for case in &cases {
                debug!(
                    "{}: Fr={:.3}, V={:.4} m/s at {}",
                    case.name,
                    case.froude,
                    case.velocity,
                    case.path.display()
                );
            }
            sweep::run_sweep(project, runner, &cases, dry_run)?;
            info!("Sweep finished: {} case(s)", cases.len());
        }

        Command::SweepEsi {
            base_case,
            froude,
            dry_run,
        } => {
            let mut esi = EsiSweep::from_config(project);
            if let Some(base_case) = base_case {
                esi.base_case = base_case;
            }
            if !froude.is_empty() {
                esi.froude_points = froude;
            }
            let pipeline = ContainerPipeline::from_config(project);
            let failures = esi.run(&pipeline, runner, dry_run)?;
            report_failures("ESI sweep", failures, esi.froude_points.len());
        }

        Command::Benchmark => match sweep::run_benchmark(project, runner)? {
            Some(estimate) => info!(
                "Estimated sweep time: {:.2} h ({:.1} s wall per simulated second)",
                estimate.estimated_hours, estimate.wall_per_sim_second
            ),
            None => warn!("Benchmark produced no timing information."),
        },

        Command::Extract => {
            processing::extract_sweep(project)?;
        }

        Command::ExtractCase { case_dir } => {
            validate_dir(&case_dir)?;
            processing::extract_case(&case_dir)?;
        }

        Command::Train { input, model, plot } => {
            let results = project.results_dir();
            let input = input.unwrap_or_else(|| results.join(processing::SWEEP_SUMMARY_FILE));
            let model = model.unwrap_or_else(|| results.join(DEFAULT_MODEL_FILE));
            let plot = plot.unwrap_or_else(|| results.join(DEFAULT_PLOT_FILE));
            surrogate::train(&input, &model, &plot).map_err(|e| {
                error!("Training failed: {}", e);
                e
            })?;
        }

        Command::Predict { velocities, model } => {
            let path = model.unwrap_or_else(|| project.results_dir().join(DEFAULT_MODEL_FILE));
            let model = PolynomialModel::load(&path)?;
            let [v_min, v_max] = model.velocity_range;
            for velocity in velocities {
                if velocity < v_min || velocity > v_max {
                    warn!(
                        "V={} m/s lies outside the training range [{}, {}]",
                        velocity, v_min, v_max
                    );
                }
                println!("{:.4} m/s -> {:.3} W", velocity, model.predict(velocity));
            }
        }

        Command::Visualize {
            case_dir,
            output_dir,
            view,
            z_scale,
            focus_interface,
        } => {
            validate_dir(&case_dir)?;
            let options = RenderOptions {
                view,
                z_scale,
                focus_interface,
            };
            if let Some(path) = visualize_case(&case_dir, &output_dir, &options)? {
                info!("Saved visualization to {}", path.display());
            }
        }

        Command::Wigley {
            output,
            length,
            beam,
            draft,
            nx,
            nz,
        } => {
            let hull = WigleyHull {
                length,
                beam,
                draft,
                nx,
                nz,
            };
            let output: PathBuf = project.root.join(output);
            let facets = hull.write_stl(&output)?;
            info!("Wrote {} facets to {}", facets, output.display());
        }
    }
    Ok(())
}

fn report_failures(stage: &str, failures: usize, total: usize) {
    if failures > 0 {
        warn!("{}: {} of {} case(s) failed", stage, failures, total);
    } else {
        info!("{}: all {} case(s) completed", stage, total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::runner::mock::RecordingRunner;
    use std::fs;
    use tempfile::TempDir;

    fn project() -> (TempDir, ProjectConfig) {
        let dir = tempfile::tempdir().unwrap();
        let project = ProjectConfig::load(dir.path(), None, None).unwrap();
        (dir, project)
    }

    #[test]
    fn test_wigley_writes_under_project_root() {
        let (dir, project) = project();
        let command = Command::Wigley {
            output: PathBuf::from("config/geometry/wigley.stl"),
            length: 1.0,
            beam: 0.1,
            draft: 0.0625,
            nx: 4,
            nz: 3,
        };
        dispatch(command, &project, &RecordingRunner::new()).unwrap();
        let stl = fs::read_to_string(dir.path().join("config/geometry/wigley.stl")).unwrap();
        assert_eq!(stl.matches("facet normal").count(), 2 * 2 * 3 * 2 + 2 * 3);
    }

    #[test]
    fn test_wigley_rejects_bad_grid() {
        let (_dir, project) = project();
        let command = Command::Wigley {
            output: PathBuf::from("hull.stl"),
            length: 1.0,
            beam: 0.1,
            draft: 0.0625,
            nx: 1,
            nz: 3,
        };
        assert!(matches!(
            dispatch(command, &project, &RecordingRunner::new()),
            Err(AppError::Geometry(_))
        ));
    }

    #[test]
    fn test_run_forwards_exit_code() {
        let (dir, project) = project();
        let case_dir = dir.path().join("build/dtc");
        fs::create_dir_all(&case_dir).unwrap();
        let runner = RecordingRunner::with_exit_codes(&[42]);

        let command = Command::Run {
            case_dir,
            image: None,
            processes: None,
            refine_levels: None,
            dry_run: false,
        };
        let err = dispatch(command, &project, &runner).unwrap_err();
        assert_eq!(err.exit_code(), 42);
        assert_eq!(runner.recorded()[0].program, "docker");
    }

    #[test]
    fn test_postprocess_defaults_continue_past_missing_cases() {
        let (_dir, project) = project();
        let runner = RecordingRunner::new();
        let command = Command::Postprocess {
            cases: Vec::new(),
            time: 35.0,
        };
        dispatch(command, &project, &runner).unwrap();
        assert!(runner.recorded().is_empty());
    }

    #[test]
    fn test_train_uses_results_dir_defaults() {
        let (_dir, project) = project();
        let command = Command::Train {
            input: None,
            model: None,
            plot: None,
        };
        dispatch(command, &project, &RecordingRunner::new()).unwrap();
        assert!(project.results_dir().join(DEFAULT_MODEL_FILE).is_file());
        assert!(project.results_dir().join(DEFAULT_PLOT_FILE).is_file());
    }

    #[test]
    fn test_predict_reads_trained_model() {
        let (_dir, project) = project();
        let runner = RecordingRunner::new();
        let missing = Command::Predict {
            velocities: vec![1.0],
            model: None,
        };
        assert!(matches!(
            dispatch(missing, &project, &runner),
            Err(AppError::Surrogate(_))
        ));

        let train = Command::Train {
            input: None,
            model: None,
            plot: None,
        };
        dispatch(train, &project, &runner).unwrap();
        let predict = Command::Predict {
            velocities: vec![1.0, 3.0],
            model: None,
        };
        dispatch(predict, &project, &runner).unwrap();
    }

    #[test]
    fn test_prepare_missing_document() {
        let (dir, project) = project();
        let command = Command::Prepare {
            config: dir.path().join("cases/none/case.toml"),
            output_dir: dir.path().join("build/none"),
        };
        assert!(matches!(
            dispatch(command, &project, &RecordingRunner::new()),
            Err(AppError::InvalidPath(_))
        ));
    }
}
