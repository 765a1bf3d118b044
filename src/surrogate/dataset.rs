//! Training data: velocity and resistance pairs from the sweep summary.

use std::fs;
use std::path::Path;
use tracing::warn;

use super::error::SurrogateError;

//─────────────────────────────────────────────────────────────────────────────

/// One training point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerSample {
    /// m/s
    pub velocity: f64,
    /// Mean resistance in N.
    pub force: f64,
}

impl PowerSample {
    pub fn new(velocity: f64, force: f64) -> Self {
        Self { velocity, force }
    }

    /// Effective power `P = F * V` in W.
    pub fn power(&self) -> f64 {
        self.force * self.velocity
    }
}

/// Built-in data set used when no sweep summary exists yet.
pub fn demo_samples() -> Vec<PowerSample> {
    [(0.5, 10.0), (1.0, 40.0), (1.5, 90.0), (2.0, 160.0), (2.2, 200.0)]
        .into_iter()
        .map(|(v, f)| PowerSample::new(v, f))
        .collect()
}

/// Reads `velocity` and `force_x` from a sweep summary CSV.
///
/// Columns are located by header name. Rows with an empty or non-numeric
/// value in either column are skipped with a warning.
pub fn load_sweep_csv(path: &Path) -> Result<Vec<PowerSample>, SurrogateError> {
    let content = fs::read_to_string(path).map_err(|e| SurrogateError::io(path, e))?;
    parse_sweep_csv(&content, path)
}

fn parse_sweep_csv(content: &str, path: &Path) -> Result<Vec<PowerSample>, SurrogateError> {
    let mut lines = content.lines().filter(|l| !l.trim().is_empty());
    let header: Vec<&str> = lines
        .next()
        .map(|h| h.split(',').map(str::trim).collect())
        .unwrap_or_default();

    let column = |name: &str| {
        header
            .iter()
            .position(|h| *h == name)
            .ok_or_else(|| SurrogateError::MissingColumn {
                path: path.display().to_string(),
                column: name.to_string(),
            })
    };
    let v_idx = column("velocity")?;
    let f_idx = column("force_x")?;

    let mut samples = Vec::new();
    for (row, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let value = |idx: usize| fields.get(idx).and_then(|f| f.parse::<f64>().ok());
        match (value(v_idx), value(f_idx)) {
            (Some(velocity), Some(force)) => samples.push(PowerSample::new(velocity, force)),
            _ => warn!("Skipping row {} of {}: missing velocity or force_x", row + 1, path.display()),
        }
    }
    Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_found_by_name() {
        let csv = "\
case,velocity,froude,force_x,force_std,t_start,t_end
dtc_fr0100,0.5424,0.1,12.5,0.3,16.0,20.0
dtc_fr0200,1.0847,0.2,45.0,,16.0,20.0
";
        let samples = parse_sweep_csv(csv, Path::new("dtc_sweep.csv")).unwrap();
        assert_eq!(
            samples,
            vec![PowerSample::new(0.5424, 12.5), PowerSample::new(1.0847, 45.0)]
        );
        assert!((samples[1].power() - 48.8115).abs() < 1e-9);
    }

    #[test]
    fn test_rows_without_values_are_skipped() {
        let csv = "force_x,velocity\n10.0,\n20.0,1.5\n";
        let samples = parse_sweep_csv(csv, Path::new("x.csv")).unwrap();
        assert_eq!(samples, vec![PowerSample::new(1.5, 20.0)]);
    }

    #[test]
    fn test_missing_column() {
        let result = parse_sweep_csv("case,velocity\na,1.0\n", Path::new("x.csv"));
        assert!(matches!(
            result,
            Err(SurrogateError::MissingColumn { column, .. }) if column == "force_x"
        ));
    }

    #[test]
    fn test_demo_samples() {
        let demo = demo_samples();
        assert_eq!(demo.len(), 5);
        assert!((demo[4].power() - 440.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_sweep_csv(&dir.path().join("none.csv"));
        assert!(matches!(result, Err(SurrogateError::Io { .. })));
    }
}
