//! Force time series and the statistics derived from them.

use std::fmt::Write as _;

//─────────────────────────────────────────────────────────────────────────────

/// Start of the stable window as a fraction of the final simulated time.
///
/// The trailing 20% of the run is taken as quasi-steady.
pub const STABLE_WINDOW_START: f64 = 0.8;

/// Number of trailing samples averaged by single-case extraction.
pub const TAIL_SAMPLES: usize = 50;

/// One sample of the x-directed hull force.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceSample {
    /// Simulated time in seconds.
    pub time: f64,
    pub pressure: f64,
    pub viscous: f64,
    pub total: f64,
}

impl ForceSample {
    pub fn new(time: f64, pressure: f64, viscous: f64, total: f64) -> Self {
        Self {
            time,
            pressure,
            viscous,
            total,
        }
    }

    /// Builds a sample whose total is the sum of its two components.
    pub fn from_components(time: f64, pressure: f64, viscous: f64) -> Self {
        Self::new(time, pressure, viscous, pressure + viscous)
    }
}

/// Mean and spread of the total force over the stable window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StableWindow {
    pub t_start: f64,
    pub t_end: f64,
    pub mean: f64,
    /// Sample standard deviation (n - 1); NaN when the window holds one sample.
    pub std_dev: f64,
    pub samples: usize,
}

/// Append-only sequence of force samples belonging to one case.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForceSeries {
    samples: Vec<ForceSample>,
}

impl ForceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: ForceSample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn last(&self) -> Option<&ForceSample> {
        self.samples.last()
    }

    #[cfg(test)]
    pub fn samples(&self) -> &[ForceSample] {
        &self.samples
    }

    /// Largest simulated time in the series.
    pub fn max_time(&self) -> Option<f64> {
        self.samples
            .iter()
            .map(|s| s.time)
            .fold(None, |acc, t| match acc {
                Some(m) if m >= t => Some(m),
                _ => Some(t),
            })
    }

    /// Computes the stable-window summary over the trailing 20% of the run.
    ///
    /// Returns `None` for an empty series or one whose final time is not
    /// positive (the run is too short to have a trailing window).
    pub fn stable_window(&self) -> Option<StableWindow> {
        let t_end = self.max_time()?;
        if !(t_end > 0.0) {
            return None;
        }
        let t_start = t_end * STABLE_WINDOW_START;

        let window: Vec<f64> = self
            .samples
            .iter()
            .filter(|s| s.time >= t_start)
            .map(|s| s.total)
            .collect();
        let (mean, std_dev) = mean_and_std(&window)?;

        Some(StableWindow {
            t_start,
            t_end,
            mean,
            std_dev,
            samples: window.len(),
        })
    }

    /// Mean total force of the last `n` samples (or all of them if fewer).
    pub fn tail_mean(&self, n: usize) -> Option<f64> {
        let start = self.samples.len().saturating_sub(n);
        let tail: Vec<f64> = self.samples[start..].iter().map(|s| s.total).collect();
        mean_and_std(&tail).map(|(mean, _)| mean)
    }

    /// Renders the series as a `time,force_x` CSV table.
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(32 * (self.samples.len() + 1));
        out.push_str("time,force_x\n");
        for sample in &self.samples {
            // Writing into a String cannot fail.
            let _ = writeln!(out, "{:?},{:?}", sample.time, sample.total);
        }
        out
    }
}

impl FromIterator<ForceSample> for ForceSeries {
    fn from_iter<I: IntoIterator<Item = ForceSample>>(iter: I) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

/// Mean and sample standard deviation; `None` for an empty slice.
fn mean_and_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std_dev = if values.len() < 2 {
        f64::NAN
    } else {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        (ss / (n - 1.0)).sqrt()
    };
    Some((mean, std_dev))
}
