//! Projected PNG view of a solved case: mesh points, domain outline and the
//! cells filled with water at the latest time.

use clap::ValueEnum;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use super::error::VisualizeError;
use super::foam::{read_internal_field, read_points, CellTopology, Point};
use crate::canvas::{Canvas, Frame, Viewport, BLACK, GREY, LIGHT_GREY, RED, WATER, WHITE};

//─────────────────────────────────────────────────────────────────────────────

pub const OUTPUT_FILE: &str = "visualization.png";

const WIDTH: u32 = 1024;
const HEIGHT: u32 = 768;
const MARGIN: u32 = 40;
/// Cells with a volume fraction above this count as water.
const WATER_THRESHOLD: f64 = 0.5;

/// Projection plane of the rendered image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum View {
    /// Side view.
    #[default]
    Default,
    /// Side view (x horizontal, z up).
    Xz,
    /// Top view (x horizontal, y up).
    Xy,
}

impl View {
    pub fn project(&self, p: &Point) -> (f64, f64) {
        match self {
            View::Default | View::Xz => (p[0], p[2]),
            View::Xy => (p[0], p[1]),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub view: View,
    /// Multiplier applied to z coordinates before projecting.
    pub z_scale: f64,
    /// Zoom onto the bounds of the water cells.
    pub focus_interface: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            view: View::Default,
            z_scale: 1.0,
            focus_interface: false,
        }
    }
}

/// Numeric time directory with the largest value, e.g. `35` over `0.5`.
pub fn latest_time_dir(case_dir: &Path) -> Result<Option<PathBuf>, VisualizeError> {
    let entries = fs::read_dir(case_dir).map_err(|e| VisualizeError::io(case_dir, e))?;
    let mut latest: Option<(f64, PathBuf)> = None;
    for entry in entries {
        let entry = entry.map_err(|e| VisualizeError::io(case_dir, e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(time) = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<f64>().ok())
            .filter(|t| t.is_finite())
        else {
            continue;
        };
        if latest.as_ref().map_or(true, |(best, _)| time > *best) {
            latest = Some((time, path));
        }
    }
    Ok(latest.map(|(_, path)| path))
}

/// Renders `<output_dir>/visualization.png` for the latest time of `case_dir`.
///
/// Returns `Ok(None)` when the case has no time directories. If the mesh or
/// field cannot be read, a fallback image is written instead and the error is
/// only logged.
pub fn visualize_case(
    case_dir: &Path,
    output_dir: &Path,
    options: &RenderOptions,
) -> Result<Option<PathBuf>, VisualizeError> {
    fs::create_dir_all(output_dir).map_err(|e| VisualizeError::io(output_dir, e))?;

    let Some(time_dir) = latest_time_dir(case_dir)? else {
        warn!(
            "No time directories found in {}. Skipping visualization.",
            case_dir.display()
        );
        return Ok(None);
    };
    info!(
        "Visualizing results from time: {}",
        time_dir.file_name().and_then(|n| n.to_str()).unwrap_or("?")
    );

    let output = output_dir.join(OUTPUT_FILE);
    let canvas = match render_scene(case_dir, &time_dir, options) {
        Ok(canvas) => canvas,
        Err(e) => {
            error!("Failed to read/visualize OpenFOAM case: {}", e);
            info!("Falling back to placeholder visualization.");
            fallback_canvas()
        }
    };
    canvas.save_png(&output).map_err(|e| VisualizeError::Image {
        path: output.display().to_string(),
        source: e,
    })?;
    info!("Saved visualization to {}", output.display());
    Ok(Some(output))
}

fn render_scene(
    case_dir: &Path,
    time_dir: &Path,
    options: &RenderOptions,
) -> Result<Canvas, VisualizeError> {
    let mesh_dir = case_dir.join("constant").join("polyMesh");
    let mut points = read_points(&mesh_dir.join("points"))?;
    info!("Read {} mesh points", points.len());

    if options.z_scale != 1.0 {
        for p in &mut points {
            p[2] *= options.z_scale;
        }
        info!("Applied Z-scaling factor: {}", options.z_scale);
    }

    let water = water_cells(&mesh_dir, time_dir, &points)?;
    let projected: Vec<(f64, f64)> = points.iter().map(|p| options.view.project(p)).collect();
    let water: Vec<(f64, f64)> = water.iter().map(|p| options.view.project(p)).collect();
    Ok(draw_scene(&projected, &water, options.focus_interface))
}

/// Centres of cells whose `alpha.water` exceeds the threshold. Empty when the
/// field or the mesh connectivity is absent.
fn water_cells(
    mesh_dir: &Path,
    time_dir: &Path,
    points: &[Point],
) -> Result<Vec<Point>, VisualizeError> {
    let field_path = time_dir.join("alpha.water");
    let has_topology = ["faces", "owner", "neighbour"]
        .iter()
        .all(|f| mesh_dir.join(f).is_file());
    if !field_path.is_file() || !has_topology {
        info!("alpha.water not found in mesh data.");
        return Ok(Vec::new());
    }

    let field = read_internal_field(&field_path)?;
    let topology = CellTopology::read(mesh_dir)?;
    let centres = topology.cell_centres(points)?;
    Ok(centres
        .into_iter()
        .enumerate()
        .filter(|(cell, _)| field.value(*cell).is_some_and(|a| a > WATER_THRESHOLD))
        .map(|(_, centre)| centre)
        .collect())
}

fn draw_scene(points: &[(f64, f64)], water: &[(f64, f64)], focus_interface: bool) -> Canvas {
    let mut canvas = Canvas::new(WIDTH, HEIGHT, WHITE);
    if points.is_empty() {
        warn!("Mesh has 0 points.");
    }

    let domain = Viewport::from_points(points.iter().copied(), 0.0);
    let focused = if focus_interface {
        Viewport::from_points(water.iter().copied(), 0.25)
    } else {
        None
    };
    if focus_interface && focused.is_none() {
        warn!("No water cells to focus on; showing the whole domain.");
    }
    let viewport = focused
        .or_else(|| domain.map(|d| padded(&d, 0.05)))
        .unwrap_or_else(|| Viewport::new(0.0, 1.0, 0.0, 1.0));
    let frame = Frame::inset(&canvas, MARGIN, viewport);

    frame.outline(&mut canvas, LIGHT_GREY);
    for &(x, y) in points {
        if frame.contains(x, y) {
            let (px, py) = frame.to_pixel(x, y);
            canvas.put(px.round() as i64, py.round() as i64, GREY);
        }
    }
    for &(x, y) in water {
        if frame.contains(x, y) {
            let (px, py) = frame.to_pixel(x, y);
            canvas.disc(px, py, 2.0, WATER);
        }
    }
    if let Some(d) = domain {
        let (x0, y0) = frame.to_pixel(d.x_min, d.y_min);
        let (x1, y1) = frame.to_pixel(d.x_max, d.y_max);
        canvas.rect_outline(x0, y0, x1, y1, BLACK);
    }
    canvas
}

fn padded(v: &Viewport, fraction: f64) -> Viewport {
    let (dx, dy) = (v.width() * fraction, v.height() * fraction);
    Viewport::new(v.x_min - dx, v.x_max + dx, v.y_min - dy, v.y_max + dy)
}

/// Placeholder written when the case cannot be read: a red disc.
pub fn fallback_canvas() -> Canvas {
    let mut canvas = Canvas::new(WIDTH, HEIGHT, WHITE);
    let radius = WIDTH.min(HEIGHT) as f32 / 4.0;
    canvas.disc(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0, radius, RED);
    canvas
}
