//! Sweep summary table: one row per case, written as CSV.

use std::fmt::Write as _;

use super::series::StableWindow;

//─────────────────────────────────────────────────────────────────────────────

pub const SUMMARY_HEADER: &str = "case,velocity,froude,force_x,force_std,t_start,t_end";

/// Stable-window resistance of one sweep case.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseSummary {
    pub case: String,
    pub velocity: Option<f64>,
    pub froude: Option<f64>,
    pub window: StableWindow,
}

impl CaseSummary {
    pub fn new(case: &str, velocity: Option<f64>, froude: Option<f64>, window: StableWindow) -> Self {
        Self {
            case: case.to_string(),
            velocity,
            froude,
            window,
        }
    }

    pub fn to_csv_row(&self) -> String {
        format!(
            "{},{},{},{},{},{},{}",
            self.case,
            csv_float(self.velocity),
            csv_float(self.froude),
            csv_float(Some(self.window.mean)),
            csv_float(Some(self.window.std_dev)),
            csv_float(Some(self.window.t_start)),
            csv_float(Some(self.window.t_end)),
        )
    }
}

/// Orders rows by velocity; cases without a velocity go last.
pub fn sort_by_velocity(rows: &mut [CaseSummary]) {
    rows.sort_by(|a, b| {
        let va = a.velocity.unwrap_or(f64::INFINITY);
        let vb = b.velocity.unwrap_or(f64::INFINITY);
        va.total_cmp(&vb)
    });
}

/// Renders rows as CSV in the order given.
pub fn render_summary_csv(rows: &[CaseSummary]) -> String {
    let mut out = String::with_capacity(64 * (rows.len() + 1));
    out.push_str(SUMMARY_HEADER);
    out.push('\n');
    for row in rows {
        out.push_str(&row.to_csv_row());
        out.push('\n');
    }
    out
}

/// Renders rows as an aligned text table for the terminal.
pub fn render_summary_table(rows: &[CaseSummary]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<16} {:>10} {:>8} {:>12} {:>10} {:>9} {:>9}",
        "case", "velocity", "froude", "force_x", "force_std", "t_start", "t_end"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<16} {:>10} {:>8} {:>12.3} {:>10.3} {:>9.3} {:>9.3}",
            row.case,
            row.velocity.map(|v| format!("{v:.4}")).unwrap_or_default(),
            row.froude.map(|v| format!("{v:.3}")).unwrap_or_default(),
            row.window.mean,
            row.window.std_dev,
            row.window.t_start,
            row.window.t_end,
        );
    }
    out
}

/// Missing and non-finite values become empty fields.
fn csv_float(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:?}"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(mean: f64, std_dev: f64) -> StableWindow {
        StableWindow {
            t_start: 16.0,
            t_end: 20.0,
            mean,
            std_dev,
            samples: 40,
        }
    }

    #[test]
    fn test_csv_keeps_row_order() {
        let rows = vec![
            CaseSummary::new("dtc_fr0250", Some(1.356), Some(0.25), window(-42.0, 0.5)),
            CaseSummary::new("dtc_fr0100", Some(0.5425), Some(0.1), window(-7.25, 0.1)),
        ];
        let csv = render_summary_csv(&rows);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], SUMMARY_HEADER);
        assert_eq!(lines[1], "dtc_fr0250,1.356,0.25,-42.0,0.5,16.0,20.0");
        assert_eq!(lines[2], "dtc_fr0100,0.5425,0.1,-7.25,0.1,16.0,20.0");
    }

    #[test]
    fn test_sort_by_velocity_puts_unknown_last() {
        let mut rows = vec![
            CaseSummary::new("dtc_fr0300", None, Some(0.3), window(-60.0, 1.0)),
            CaseSummary::new("dtc_fr0250", Some(1.356), Some(0.25), window(-42.0, 0.5)),
            CaseSummary::new("dtc_fr0100", Some(0.5425), Some(0.1), window(-7.25, 0.1)),
        ];
        sort_by_velocity(&mut rows);
        let names: Vec<&str> = rows.iter().map(|r| r.case.as_str()).collect();
        assert_eq!(names, ["dtc_fr0100", "dtc_fr0250", "dtc_fr0300"]);
    }

    #[test]
    fn test_missing_values_are_empty_fields() {
        let row = CaseSummary::new("dtc_fr0200", None, Some(0.2), window(1.0, f64::NAN));
        assert_eq!(row.to_csv_row(), "dtc_fr0200,,0.2,1.0,,16.0,20.0");
    }

    #[test]
    fn test_terminal_table_lists_every_case() {
        let rows = vec![CaseSummary::new("dtc_fr0180", Some(0.976), Some(0.18), window(-20.0, 0.2))];
        let table = render_summary_table(&rows);
        assert_eq!(table.lines().count(), 2);
        assert!(table.contains("dtc_fr0180"));
    }
}
