//! Solver throughput from `ExecutionTime` lines.

use std::fs;
use std::path::Path;
use tracing::warn;

use super::parser::parse_time_marker;

//─────────────────────────────────────────────────────────────────────────────

/// Wall-clock seconds spent per simulated second, read from a solver log.
///
/// Returns `None` if the log cannot be read (a warning is logged) or holds
/// too little data; see [`parse_execution_time_str`].
pub fn parse_execution_time(log_path: &Path) -> Option<f64> {
    match fs::read_to_string(log_path) {
        Ok(content) => parse_execution_time_str(&content),
        Err(e) => {
            warn!("Could not read solver log {}: {}", log_path.display(), e);
            None
        }
    }
}

/// Wall-clock seconds per simulated second over the second half of the run.
///
/// The first half is dropped to skip start-up transients. Requires at least
/// two `ExecutionTime = X s` and two `Time =` samples, and a positive
/// simulated-time delta.
pub fn parse_execution_time_str(content: &str) -> Option<f64> {
    let mut wall_times = Vec::new();
    let mut sim_times = Vec::new();

    for line in content.lines() {
        if line.contains("ExecutionTime =") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if let Some(value) = parts
                .iter()
                .position(|p| *p == "ExecutionTime")
                .and_then(|idx| parts.get(idx + 2))
                .and_then(|v| v.parse::<f64>().ok())
            {
                wall_times.push(value);
            }
        }
        if let Some(t) = parse_time_marker(line) {
            sim_times.push(t);
        }
    }

    if wall_times.len() < 2 || sim_times.len() < 2 {
        return None;
    }

    let start_idx = wall_times.len() / 2;
    let delta_wall = wall_times[wall_times.len() - 1] - wall_times[start_idx];
    let delta_sim = sim_times[sim_times.len() - 1] - sim_times.get(start_idx)?;

    if delta_sim <= 0.0 {
        return None;
    }
    Some(delta_wall / delta_sim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_speed_over_second_half() {
        let mut log = String::new();
        for step in 1..=10 {
            let t = step as f64 * 0.1;
            log.push_str(&format!("Time = {t}\n\nExecutionTime = {} s  ClockTime = 1 s\n\n", step as f64 * 3.0));
        }
        // start index 5: wall 18 -> 30, sim 0.6 -> 1.0
        let speed = parse_execution_time_str(&log).unwrap();
        assert!((speed - 12.0 / 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_too_few_samples() {
        let log = "Time = 1\nExecutionTime = 2 s  ClockTime = 2 s\n";
        assert_eq!(parse_execution_time_str(log), None);
        assert_eq!(parse_execution_time_str(""), None);
    }

    #[test]
    fn test_non_advancing_time() {
        let log = "Time = 1\nExecutionTime = 2 s\nTime = 1\nExecutionTime = 4 s\n";
        assert_eq!(parse_execution_time_str(log), None);
    }

    #[test]
    fn test_missing_log() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(parse_execution_time(&dir.path().join("log.foamRun")), None);
    }
}
