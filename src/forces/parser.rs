//! Scans solver output for hull force samples.
//!
//! Two layouts are understood:
//! - the free-text solver log (`log.foamRun`), where `Time = <t>` markers are
//!   interleaved with `sum of forces:` blocks carrying pressure and viscous
//!   vectors, and
//! - the whitespace-delimited force table (`force.dat`), whose fixed columns
//!   are time, total xyz, pressure xyz, viscous xyz.
//!
//! Parsing never fails: a line that does not fit is skipped, and a file that
//! cannot be read produces a warning and an empty series. Callers treat an
//! empty series as "no data".

use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use super::series::{ForceSample, ForceSeries};

//─────────────────────────────────────────────────────────────────────────────

const NUMBER: &str = r"[-+]?\d*\.?\d+(?:[eE][-+]?\d+)?";

/// A parenthesized three-component vector, e.g. `(1.5 -2e-3 0)`.
static VECTOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"\(\s*({NUMBER})\s+({NUMBER})\s+({NUMBER})\s*\)"))
        .expect("vector pattern is valid")
});

static PRESSURE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*pressure\s*:").expect("pressure pattern is valid"));

static VISCOUS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*viscous\s*:").expect("viscous pattern is valid"));

/// Marker opening a force block in the solver log.
const FORCE_BLOCK_MARKER: &str = "sum of forces:";

/// Fixed column positions of the force table.
const COL_TIME: usize = 0;
const COL_TOTAL_X: usize = 1;
const COL_PRESSURE_X: usize = 4;
const COL_VISCOUS_X: usize = 7;
/// Time plus the total force vector.
const MIN_TABLE_COLUMNS: usize = 4;
/// Time plus total, pressure and viscous vectors.
const FULL_TABLE_COLUMNS: usize = 10;

/// The two solver output layouts the parser understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceFileLayout {
    SolverLog,
    ForceTable,
}

impl ForceFileLayout {
    /// Picks the layout from the file name (`log.*`) or, failing that, from
    /// the presence of force blocks in the content.
    pub fn detect(path: &Path, content: &str) -> Self {
        let is_log_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("log."));
        if is_log_name || content.contains(FORCE_BLOCK_MARKER) {
            ForceFileLayout::SolverLog
        } else {
            ForceFileLayout::ForceTable
        }
    }
}

/// Parses either layout, detecting which one `path` holds.
pub fn parse_force_file(path: &Path) -> ForceSeries {
    let Some(content) = read_or_warn(path) else {
        return ForceSeries::new();
    };
    match ForceFileLayout::detect(path, &content) {
        ForceFileLayout::SolverLog => parse_solver_log_str(&content),
        ForceFileLayout::ForceTable => parse_force_table_str(&content),
    }
}

/// Parses a free-text solver log. Never fails; see the module docs.
pub fn parse_solver_log(path: &Path) -> ForceSeries {
    read_or_warn(path)
        .map(|content| parse_solver_log_str(&content))
        .unwrap_or_default()
}

fn read_or_warn(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            warn!("Could not read force data from {}: {}", path.display(), e);
            None
        }
    }
}

/// Parses solver log text.
///
/// Each `sum of forces:` line whose next line is a `pressure :` vector and
/// whose line after that is a `viscous :` vector yields one sample at the
/// most recent `Time =` value, with `total = pressure_x + viscous_x`.
pub fn parse_solver_log_str(content: &str) -> ForceSeries {
    let lines: Vec<&str> = content.lines().collect();
    let mut series = ForceSeries::new();
    let mut current_time = 0.0;

    for (i, line) in lines.iter().enumerate() {
        if let Some(t) = parse_time_marker(line) {
            current_time = t;
        }

        if !line.contains(FORCE_BLOCK_MARKER) {
            continue;
        }
        let (Some(p_line), Some(v_line)) = (lines.get(i + 1), lines.get(i + 2)) else {
            continue;
        };
        if !PRESSURE_RE.is_match(p_line) || !VISCOUS_RE.is_match(v_line) {
            continue;
        }
        if let (Some(fp_x), Some(fv_x)) = (first_component(p_line), first_component(v_line)) {
            series.push(ForceSample::from_components(current_time, fp_x, fv_x));
        }
    }

    debug!("Parsed {} force sample(s) from solver log", series.len());
    series
}

/// Parses force table text, one sample per valid row.
pub fn parse_force_table_str(content: &str) -> ForceSeries {
    let series: ForceSeries = content.lines().filter_map(parse_table_row).collect();
    debug!("Parsed {} force sample(s) from force table", series.len());
    series
}

fn parse_table_row(line: &str) -> Option<ForceSample> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let cleaned = line.replace(['(', ')'], " ");
    let parts: Vec<&str> = cleaned.split_whitespace().collect();
    if parts.len() < MIN_TABLE_COLUMNS {
        return None;
    }

    let time = parts[COL_TIME].parse::<f64>().ok()?;
    let total = parts[COL_TOTAL_X].parse::<f64>().ok()?;
    let (pressure, viscous) = if parts.len() >= FULL_TABLE_COLUMNS {
        (
            parts[COL_PRESSURE_X].parse::<f64>().ok()?,
            parts[COL_VISCOUS_X].parse::<f64>().ok()?,
        )
    } else {
        // Components are not reported by short rows.
        (0.0, 0.0)
    };
    Some(ForceSample::new(time, pressure, viscous, total))
}

/// Reads the simulated time from a `Time = <t>` line.
///
/// `ExecutionTime = ...` lines are not time markers. The value is the third
/// whitespace token with a trailing `s` unit removed.
pub(super) fn parse_time_marker(line: &str) -> Option<f64> {
    if !line.contains("Time =") || line.contains("ExecutionTime") {
        return None;
    }
    line.split_whitespace()
        .nth(2)?
        .trim_end_matches('s')
        .parse::<f64>()
        .ok()
}

fn first_component(line: &str) -> Option<f64> {
    VECTOR_RE
        .captures(line)?
        .get(1)?
        .as_str()
        .parse::<f64>()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const SOLVER_LOG: &str = "\
Courant Number mean: 0.01 max: 0.4
deltaT = 0.001
Time = 0.1

PIMPLE: Iteration 1
ExecutionTime = 1.5 s  ClockTime = 2 s

forces forces write:
    sum of forces:
        pressure : (-12.5 0.1 30.0)
        viscous  : (-2.5 0.0 0.01)
    sum of moments:
        pressure : (0 0 0)
        viscous  : (0 0 0)

Time = 0.2s

forces forces write:
    sum of forces:
        pressure : (-13 0.2 31)
        viscous  : (-2.0e+00 0 0)

Time = 0.3
    sum of forces:
        pressure : (-14 0 0)
    sum of moments:
";

    #[test]
    fn test_solver_log_blocks() {
        let series = parse_solver_log_str(SOLVER_LOG);
        assert_eq!(series.len(), 2);

        let first = series.samples()[0];
        assert_eq!(first.time, 0.1);
        assert_eq!(first.pressure, -12.5);
        assert_eq!(first.viscous, -2.5);
        assert_eq!(first.total, -15.0);

        let second = series.samples()[1];
        assert_eq!(second.time, 0.2);
        assert_eq!(second.total, -15.0);
    }

    #[test]
    fn test_moment_blocks_are_not_forces() {
        let log = "Time = 1\n    sum of moments:\n        pressure : (1 2 3)\n        viscous : (4 5 6)\n";
        assert!(parse_solver_log_str(log).is_empty());
    }

    #[test]
    fn test_block_at_end_of_file_is_skipped() {
        let log = "Time = 1\n    sum of forces:\n        pressure : (1 2 3)\n";
        assert!(parse_solver_log_str(log).is_empty());
    }

    #[test]
    fn test_time_marker() {
        assert_eq!(parse_time_marker("Time = 0.25"), Some(0.25));
        assert_eq!(parse_time_marker("Time = 12s"), Some(12.0));
        assert_eq!(parse_time_marker("ExecutionTime = 3.2 s  ClockTime = 4 s"), None);
        assert_eq!(parse_time_marker("Time = abc"), None);
        assert_eq!(parse_time_marker("deltaT = 0.001"), None);
    }

    #[test]
    fn test_unparseable_time_keeps_previous() {
        let log = "Time = 2\nTime = oops\n  sum of forces:\n    pressure : (1 0 0)\n    viscous : (1 0 0)\n";
        let series = parse_solver_log_str(log);
        assert_eq!(series.len(), 1);
        assert_eq!(series.samples()[0].time, 2.0);
        assert_eq!(series.samples()[0].total, 2.0);
    }

    #[test]
    fn test_force_table_counts_valid_rows() {
        let table = "\
# Force
# Time    total_x total_y total_z pressure_x ...
0.01\t(10 0 1)\t(8 0 1)\t(2 0 0)
0.02\t(11 0 1)\t(9 0 1)\t(2 0 0)

0.03 12 0
not-a-number (1 2 3)
0.04 (13.5 0 0)
";
        let series = parse_force_table_str(table);
        assert_eq!(series.len(), 3);
        assert_eq!(series.samples()[0], ForceSample::new(0.01, 8.0, 2.0, 10.0));
        assert_eq!(series.samples()[2], ForceSample::new(0.04, 0.0, 0.0, 13.5));
    }

    #[test]
    fn test_force_table_bad_component_skips_row() {
        let table = "1 (5 0 0) (x 0 0) (1 0 0)\n2 (6 0 0) (4 0 0) (2 0 0)\n";
        let series = parse_force_table_str(table);
        assert_eq!(series.len(), 1);
        assert_eq!(series.samples()[0].time, 2.0);
    }

    #[test]
    fn test_missing_and_empty_files_yield_empty_series() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("log.foamRun");
        assert!(parse_solver_log(&missing).is_empty());
        assert!(parse_force_file(&missing).is_empty());

        let empty = dir.path().join("force.dat");
        fs::write(&empty, "").unwrap();
        assert!(parse_force_file(&empty).is_empty());
    }

    #[test]
    fn test_layout_detection() {
        assert_eq!(
            ForceFileLayout::detect(&PathBuf::from("results/a/log.foamRun"), ""),
            ForceFileLayout::SolverLog
        );
        assert_eq!(
            ForceFileLayout::detect(&PathBuf::from("force.dat"), "0 1 2 3"),
            ForceFileLayout::ForceTable
        );
        assert_eq!(
            ForceFileLayout::detect(&PathBuf::from("solver.out"), "  sum of forces:"),
            ForceFileLayout::SolverLog
        );
    }

    #[test]
    fn test_parse_force_file_dispatches() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("log.foamRun");
        fs::write(&log, SOLVER_LOG).unwrap();
        assert_eq!(parse_force_file(&log).len(), 2);
    }
}
