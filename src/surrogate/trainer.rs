//! End-to-end surrogate training from the sweep summary.

use std::path::Path;
use tracing::{info, warn};

use super::dataset::{demo_samples, load_sweep_csv};
use super::error::SurrogateError;
use super::plot::plot_fit;
use super::polyfit::{PolynomialModel, DEFAULT_DEGREE};

//─────────────────────────────────────────────────────────────────────────────

/// Loads the sweep summary (or the demo set when it does not exist yet),
/// fits the cubic power model, then writes the plot and the model JSON.
pub fn train(
    input: &Path,
    model_path: &Path,
    plot_path: &Path,
) -> Result<PolynomialModel, SurrogateError> {
    info!("Loading data...");
    let samples = if input.exists() {
        load_sweep_csv(input)?
    } else {
        warn!("{} not found. Using demo data.", input.display());
        demo_samples()
    };

    info!("Training surrogate model on {} samples...", samples.len());
    let model = PolynomialModel::fit_power(&samples, DEFAULT_DEGREE)?;
    info!("Coefficients (ascending powers of V): {:?}", model.coefficients);

    info!("Plotting results...");
    plot_fit(&samples, &model, plot_path)?;
    info!("Plot saved to {}", plot_path.display());

    model.save(model_path)?;
    info!("Model saved to {}", model_path.display());
    Ok(model)
}
