//! Polynomial least-squares fit of effective power against velocity.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::dataset::PowerSample;
use super::error::SurrogateError;

//─────────────────────────────────────────────────────────────────────────────

/// Power scales roughly with V³, so a cubic captures the trend.
pub const DEFAULT_DEGREE: usize = 3;

const SVD_EPS: f64 = 1e-12;

/// Fitted polynomial `P(V) = Σ c_i V^i`, coefficients in ascending order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolynomialModel {
    pub degree: usize,
    pub coefficients: Vec<f64>,
    /// Velocity span of the training data.
    pub velocity_range: [f64; 2],
    pub samples: usize,
}

impl PolynomialModel {
    /// Fits power against velocity for the given samples.
    pub fn fit_power(samples: &[PowerSample], degree: usize) -> Result<Self, SurrogateError> {
        let x: Vec<f64> = samples.iter().map(|s| s.velocity).collect();
        let y: Vec<f64> = samples.iter().map(PowerSample::power).collect();
        Self::fit(&x, &y, degree)
    }

    /// Least-squares fit through the Vandermonde system, solved by SVD.
    ///
    /// # Errors
    /// `InsufficientData` when fewer than `degree + 1` distinct x values are given.
    pub fn fit(x: &[f64], y: &[f64], degree: usize) -> Result<Self, SurrogateError> {
        let needed = degree + 1;
        let found = distinct_count(x);
        if found < needed || x.len() != y.len() {
            return Err(SurrogateError::InsufficientData { needed, found });
        }

        let vandermonde = DMatrix::from_fn(x.len(), needed, |i, j| x[i].powi(j as i32));
        let rhs = DVector::from_column_slice(y);
        let solution = vandermonde
            .svd(true, true)
            .solve(&rhs, SVD_EPS)
            .map_err(|e| SurrogateError::Fit(e.to_string()))?;

        let coefficients: Vec<f64> = solution.iter().copied().collect();
        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(SurrogateError::Fit("non-finite coefficient".to_string()));
        }

        let (min, max) = x
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        Ok(Self {
            degree,
            coefficients,
            velocity_range: [min, max],
            samples: x.len(),
        })
    }

    /// Evaluates the polynomial (Horner's scheme).
    pub fn predict(&self, velocity: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * velocity + c)
    }

    pub fn to_json(&self) -> Result<String, SurrogateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SurrogateError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SurrogateError::io(parent, e))?;
        }
        fs::write(path, self.to_json()?).map_err(|e| SurrogateError::io(path, e))
    }

    /// Reads a model previously written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self, SurrogateError> {
        let content = fs::read_to_string(path).map_err(|e| SurrogateError::io(path, e))?;
        Ok(serde_json::from_str(&content)?)
    }
}

fn distinct_count(values: &[f64]) -> usize {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surrogate::dataset::demo_samples;

    #[test]
    fn test_fit_recovers_exact_cubic() {
        let x: Vec<f64> = (0..6).map(|i| i as f64 * 0.5).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|v| 1.0 + 2.0 * v - 0.5 * v * v + 0.25 * v * v * v)
            .collect();
        let model = PolynomialModel::fit(&x, &y, 3).unwrap();
        let expected = [1.0, 2.0, -0.5, 0.25];
        for (c, e) in model.coefficients.iter().zip(expected) {
            assert!((c - e).abs() < 1e-8, "{c} vs {e}");
        }
        assert_eq!(model.velocity_range, [0.0, 2.5]);
        assert_eq!(model.samples, 6);
        assert!((model.predict(2.0) - 5.0).abs() < 1e-8);
    }

    #[test]
    fn test_too_few_distinct_velocities() {
        let x = [1.0, 1.0, 2.0, 3.0];
        let y = [1.0, 1.0, 8.0, 27.0];
        assert!(matches!(
            PolynomialModel::fit(&x, &y, 3),
            Err(SurrogateError::InsufficientData { needed: 4, found: 3 })
        ));
    }

    #[test]
    fn test_demo_fit_tracks_data() {
        let samples = demo_samples();
        let model = PolynomialModel::fit_power(&samples, DEFAULT_DEGREE).unwrap();
        assert_eq!(model.coefficients.len(), 4);
        // one more sample than coefficients, so residuals stay small but non-zero
        for s in &samples {
            let residual = (model.predict(s.velocity) - s.power()).abs();
            assert!(residual < 4.0, "V={} residual={residual}", s.velocity);
        }
    }

    #[test]
    fn test_json_layout_and_reload() {
        let model = PolynomialModel {
            degree: 3,
            coefficients: vec![0.0, 1.0, 2.0, 3.0],
            velocity_range: [0.5, 2.2],
            samples: 5,
        };
        let value: serde_json::Value = serde_json::from_str(&model.to_json().unwrap()).unwrap();
        assert_eq!(value["degree"], 3);
        assert_eq!(value["velocity_range"][1], 2.2);
        assert_eq!(value["samples"], 5);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models/model.json");
        model.save(&path).unwrap();
        assert_eq!(PolynomialModel::load(&path).unwrap(), model);
    }
}
