//! Power-versus-velocity chart: training points and the fitted curve.

use std::fs;
use std::path::Path;

use super::dataset::PowerSample;
use super::error::SurrogateError;
use super::polyfit::PolynomialModel;
use crate::canvas::{Canvas, Frame, Viewport, BLACK, BLUE, LIGHT_GREY, RED, WHITE};

//─────────────────────────────────────────────────────────────────────────────

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 600;
const MARGIN: u32 = 50;
const GRID_LINES: usize = 5;
pub const CURVE_POINTS: usize = 100;

/// Velocities the fitted curve is drawn at: `CURVE_POINTS` evenly spaced
/// over `[0.9 * min, 1.1 * max]` of the data.
pub fn curve_velocities(samples: &[PowerSample]) -> Vec<f64> {
    let (min, max) = samples.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
        (lo.min(s.velocity), hi.max(s.velocity))
    });
    if !min.is_finite() || !max.is_finite() {
        return Vec::new();
    }
    let (start, end) = (min * 0.9, max * 1.1);
    let step = (end - start) / (CURVE_POINTS - 1) as f64;
    (0..CURVE_POINTS).map(|i| start + step * i as f64).collect()
}

/// Draws the chart and writes it as PNG to `path`.
pub fn plot_fit(
    samples: &[PowerSample],
    model: &PolynomialModel,
    path: &Path,
) -> Result<(), SurrogateError> {
    let curve: Vec<(f64, f64)> = curve_velocities(samples)
        .into_iter()
        .map(|v| (v, model.predict(v)))
        .collect();
    let data: Vec<(f64, f64)> = samples.iter().map(|s| (s.velocity, s.power())).collect();

    let mut canvas = Canvas::new(WIDTH, HEIGHT, WHITE);
    let viewport = Viewport::from_points(data.iter().chain(curve.iter()).copied(), 0.05)
        .unwrap_or_else(|| Viewport::new(0.0, 1.0, 0.0, 1.0));
    let frame = Frame::inset(&canvas, MARGIN, viewport);

    draw_grid(&mut canvas, &frame);
    frame.outline(&mut canvas, BLACK);

    for pair in curve.windows(2) {
        let (x0, y0) = frame.to_pixel(pair[0].0, pair[0].1);
        let (x1, y1) = frame.to_pixel(pair[1].0, pair[1].1);
        canvas.dashed_line(x0, y0, x1, y1, 6.0, RED);
    }
    for &(v, p) in &data {
        let (x, y) = frame.to_pixel(v, p);
        canvas.disc(x, y, 5.0, BLUE);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| SurrogateError::io(parent, e))?;
    }
    canvas.save_png(path).map_err(|e| SurrogateError::Plot {
        path: path.display().to_string(),
        source: e,
    })
}

fn draw_grid(canvas: &mut Canvas, frame: &Frame) {
    for i in 1..GRID_LINES {
        let f = i as f32 / GRID_LINES as f32;
        let x = frame.left + f * (frame.right - frame.left);
        let y = frame.top + f * (frame.bottom - frame.top);
        canvas.line(x, frame.top, x, frame.bottom, LIGHT_GREY);
        canvas.line(frame.left, y, frame.right, y, LIGHT_GREY);
    }
}
