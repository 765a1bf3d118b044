use thiserror::Error;

use crate::config::ConfigError;
use crate::geometry::GeometryError;
use crate::solver::SolverError;
use crate::surrogate::SurrogateError;
use crate::sweep::SweepError;
use crate::template::TemplateError;
use crate::visualize::VisualizeError;

// Custom Application Error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Case preparation error: {0}")]
    Template(#[from] TemplateError),
    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
    #[error("Sweep error: {0}")]
    Sweep(#[from] SweepError),
    #[error("Surrogate training error: {0}")]
    Surrogate(#[from] SurrogateError),
    #[error("Visualization error: {0}")]
    Visualize(#[from] VisualizeError),
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),
    #[error("Invalid file path: {0}")]
    InvalidPath(String),
    #[error("General error: {0}")]
    General(String),
}

impl AppError {
    /// Process exit code: a failed external command passes its own code through.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Solver(e) => e.exit_code(),
            AppError::Sweep(e) => e.exit_code(),
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_passthrough() {
        let failed = SolverError::CommandFailed {
            command: "docker run".to_string(),
            code: 137,
        };
        assert_eq!(AppError::from(failed).exit_code(), 137);

        let nested = SweepError::Solver(SolverError::CommandFailed {
            command: "snakemake".to_string(),
            code: 2,
        });
        assert_eq!(AppError::from(nested).exit_code(), 2);
        assert_eq!(AppError::General("x".to_string()).exit_code(), 1);
    }
}
