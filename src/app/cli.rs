use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::visualize::View;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Prepares, runs and post-processes ship resistance CFD cases.", long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Command,

    /// Suppress progress output, only printing warnings and errors.
    #[clap(short, long, global = true)]
    pub quiet: bool,

    /// Also write log output to this file.
    #[clap(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Directory holding cases/, build/, results/ and config/.
    #[clap(long, global = true, default_value = ".")]
    pub project_root: PathBuf,

    /// Project configuration (default: <project-root>/hullflow.toml).
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a solver case directory from a case.toml.
    Prepare {
        /// Case document
        config: PathBuf,
        /// Destination directory (replaced if present)
        output_dir: PathBuf,
    },

    /// Mesh and solve a case inside the solver container.
    Run {
        #[clap(long)]
        case_dir: PathBuf,
        /// Container image
        #[clap(long)]
        image: Option<String>,
        /// MPI process count
        #[clap(long = "np")]
        processes: Option<usize>,
        /// Number of refinement passes before snapping
        #[clap(long)]
        refine_levels: Option<usize>,
        /// Print the container command instead of running it
        #[clap(long)]
        dry_run: bool,
    },

    /// Repair force function objects and rerun postProcess.
    Postprocess {
        /// Case directories (default: the ESI sweep cases)
        #[clap(long = "case")]
        cases: Vec<PathBuf>,
        /// Time directory to evaluate
        #[clap(long, default_value_t = 35.0)]
        time: f64,
    },

    /// Run a Froude-number sweep through the workflow scheduler.
    Sweep {
        /// Froude numbers (default: from the project configuration)
        #[clap(long = "froude")]
        froude: Vec<f64>,
        #[clap(long)]
        dry_run: bool,
    },

    /// Sweep the ESI tutorial hull by cloning its baseline case.
    SweepEsi {
        /// Baseline case directory
        #[clap(long)]
        base_case: Option<PathBuf>,
        #[clap(long = "froude")]
        froude: Vec<f64>,
        #[clap(long)]
        dry_run: bool,
    },

    /// Time a short run and estimate the cost of a full sweep.
    Benchmark,

    /// Collect the stable-window resistance of every sweep case.
    Extract,

    /// Export the force history of a single case to results.csv.
    ExtractCase {
        case_dir: PathBuf,
    },

    /// Fit the cubic power surrogate to the sweep summary.
    Train {
        /// Sweep summary (default: <results>/dtc_sweep.csv)
        #[clap(long)]
        input: Option<PathBuf>,
        /// Model output (default: <results>/dtc_surrogate_model.json)
        #[clap(long)]
        model: Option<PathBuf>,
        /// Plot output (default: <results>/dtc_surrogate_plot.png)
        #[clap(long)]
        plot: Option<PathBuf>,
    },

    /// Evaluate a trained surrogate at the given velocities.
    Predict {
        /// Inflow velocities in m/s
        #[clap(long = "velocity", required = true)]
        velocities: Vec<f64>,
        /// Model file (default: <results>/dtc_surrogate_model.json)
        #[clap(long)]
        model: Option<PathBuf>,
    },

    /// Render the latest time step of a case to PNG.
    Visualize {
        case_dir: PathBuf,
        output_dir: PathBuf,
        #[clap(long, value_enum, default_value_t = View::Default)]
        view: View,
        /// Scale factor for z (amplifies free-surface detail)
        #[clap(long, default_value_t = 1.0)]
        z_scale: f64,
        /// Zoom onto the water region
        #[clap(long)]
        focus_interface: bool,
    },

    /// Generate a Wigley hull as ASCII STL.
    Wigley {
        #[clap(default_value = "config/geometry/wigley.stl")]
        output: PathBuf,
        #[clap(long, default_value_t = 1.0)]
        length: f64,
        #[clap(long, default_value_t = 0.1)]
        beam: f64,
        #[clap(long, default_value_t = 0.0625)]
        draft: f64,
        #[clap(long, default_value_t = 100)]
        nx: usize,
        #[clap(long, default_value_t = 20)]
        nz: usize,
    },
}
