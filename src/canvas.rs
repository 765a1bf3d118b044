//! Minimal raster drawing on top of `image` for plots and mesh views.

use image::{ImageFormat, ImageResult, Rgb, RgbImage};
use std::path::Path;

//─────────────────────────────────────────────────────────────────────────────

pub type Color = Rgb<u8>;

pub const WHITE: Color = Rgb([255, 255, 255]);
pub const BLACK: Color = Rgb([0, 0, 0]);
pub const GREY: Color = Rgb([160, 160, 160]);
pub const LIGHT_GREY: Color = Rgb([225, 225, 225]);
pub const BLUE: Color = Rgb([31, 119, 180]);
pub const RED: Color = Rgb([214, 39, 40]);
pub const WATER: Color = Rgb([60, 130, 220]);

/// Data-space rectangle mapped onto a pixel rectangle, y pointing up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Viewport {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Bounding box of `points`, grown by `padding` times its extent on each side.
    ///
    /// Degenerate extents are widened to 1 so the mapping stays finite.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>, padding: f64) -> Option<Self> {
        let mut iter = points.into_iter().filter(|(x, y)| x.is_finite() && y.is_finite());
        let (x0, y0) = iter.next()?;
        let (mut x_min, mut x_max, mut y_min, mut y_max) = (x0, x0, y0, y0);
        for (x, y) in iter {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        let dx = if x_max > x_min { x_max - x_min } else { 1.0 };
        let dy = if y_max > y_min { y_max - y_min } else { 1.0 };
        Some(Self::new(
            x_min - dx * padding,
            x_min + dx * (1.0 + padding),
            y_min - dy * padding,
            y_min + dy * (1.0 + padding),
        ))
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }
}

/// Pixel rectangle of a canvas that a viewport is drawn into.
#[derive(Debug, Clone, Copy)]
pub struct Frame {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub viewport: Viewport,
}

impl Frame {
    /// Frame covering the canvas minus `margin` pixels on each side.
    pub fn inset(canvas: &Canvas, margin: u32, viewport: Viewport) -> Self {
        let margin = margin as f32;
        Self {
            left: margin,
            top: margin,
            right: canvas.width() as f32 - margin,
            bottom: canvas.height() as f32 - margin,
            viewport,
        }
    }

    /// Pixel position of a data point.
    pub fn to_pixel(&self, x: f64, y: f64) -> (f32, f32) {
        let v = &self.viewport;
        let fx = ((x - v.x_min) / v.width()) as f32;
        let fy = ((y - v.y_min) / v.height()) as f32;
        (
            self.left + fx * (self.right - self.left),
            self.bottom - fy * (self.bottom - self.top),
        )
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        let v = &self.viewport;
        x >= v.x_min && x <= v.x_max && y >= v.y_min && y <= v.y_max
    }

    pub fn outline(&self, canvas: &mut Canvas, color: Color) {
        canvas.rect_outline(self.left, self.top, self.right, self.bottom, color);
    }
}

/// RGB raster with clipped primitives.
pub struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, background),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.width() && y < self.height() {
            Some(*self.image.get_pixel(x, y))
        } else {
            None
        }
    }

    /// Sets a pixel; coordinates outside the image are ignored.
    pub fn put(&mut self, x: i64, y: i64, color: Color) {
        if x >= 0 && y >= 0 && (x as u64) < self.width() as u64 && (y as u64) < self.height() as u64 {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    /// Bresenham line between two pixel positions.
    pub fn line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Color) {
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return;
        }
        let (mut x, mut y) = (x0.round() as i64, y0.round() as i64);
        let (xe, ye) = (x1.round() as i64, y1.round() as i64);
        let dx = (xe - x).abs();
        let dy = -(ye - y).abs();
        let sx = if x < xe { 1 } else { -1 };
        let sy = if y < ye { 1 } else { -1 };
        let mut err = dx + dy;
        loop {
            self.put(x, y, color);
            if x == xe && y == ye {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// Line drawn as alternating dashes and gaps of `dash` pixels.
    pub fn dashed_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, dash: f32, color: Color) {
        let length = ((x1 - x0).powi(2) + (y1 - y0).powi(2)).sqrt();
        if !(length > 0.0) || !(dash > 0.0) {
            self.line(x0, y0, x1, y1, color);
            return;
        }
        let (ux, uy) = ((x1 - x0) / length, (y1 - y0) / length);
        let mut start = 0.0;
        while start < length {
            let end = (start + dash).min(length);
            self.line(
                x0 + ux * start,
                y0 + uy * start,
                x0 + ux * end,
                y0 + uy * end,
                color,
            );
            start += 2.0 * dash;
        }
    }

    /// Filled disc.
    pub fn disc(&mut self, cx: f32, cy: f32, radius: f32, color: Color) {
        if !(cx.is_finite() && cy.is_finite()) {
            return;
        }
        let r = radius.max(0.0);
        let r2 = r * r;
        let (x_lo, x_hi) = ((cx - r).floor() as i64, (cx + r).ceil() as i64);
        let (y_lo, y_hi) = ((cy - r).floor() as i64, (cy + r).ceil() as i64);
        for y in y_lo..=y_hi {
            for x in x_lo..=x_hi {
                let (ddx, ddy) = (x as f32 - cx, y as f32 - cy);
                if ddx * ddx + ddy * ddy <= r2 {
                    self.put(x, y, color);
                }
            }
        }
    }

    pub fn rect_outline(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Color) {
        self.line(x0, y0, x1, y0, color);
        self.line(x1, y0, x1, y1, color);
        self.line(x1, y1, x0, y1, color);
        self.line(x0, y1, x0, y0, color);
    }

    /// Writes the canvas as PNG regardless of the file extension.
    pub fn save_png(&self, path: &Path) -> ImageResult<()> {
        self.image.save_with_format(path, ImageFormat::Png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_endpoints_and_clipping() {
        let mut canvas = Canvas::new(10, 10, WHITE);
        canvas.line(0.0, 0.0, 9.0, 9.0, BLACK);
        assert_eq!(canvas.pixel(0, 0), Some(BLACK));
        assert_eq!(canvas.pixel(5, 5), Some(BLACK));
        assert_eq!(canvas.pixel(9, 9), Some(BLACK));
        assert_eq!(canvas.pixel(9, 0), Some(WHITE));

        // partially off-canvas lines do not panic
        canvas.line(-20.0, 5.0, 30.0, 5.0, RED);
        assert_eq!(canvas.pixel(3, 5), Some(RED));
    }

    #[test]
    fn test_dashed_line_leaves_gaps() {
        let mut canvas = Canvas::new(40, 3, WHITE);
        canvas.dashed_line(0.0, 1.0, 39.0, 1.0, 5.0, BLACK);
        assert_eq!(canvas.pixel(2, 1), Some(BLACK));
        assert_eq!(canvas.pixel(7, 1), Some(WHITE));
        assert_eq!(canvas.pixel(12, 1), Some(BLACK));
    }

    #[test]
    fn test_disc() {
        let mut canvas = Canvas::new(21, 21, WHITE);
        canvas.disc(10.0, 10.0, 5.0, RED);
        assert_eq!(canvas.pixel(10, 10), Some(RED));
        assert_eq!(canvas.pixel(15, 10), Some(RED));
        assert_eq!(canvas.pixel(14, 14), Some(WHITE));
        assert_eq!(canvas.pixel(0, 0), Some(WHITE));
    }

    #[test]
    fn test_frame_maps_y_up() {
        let canvas = Canvas::new(110, 110, WHITE);
        let frame = Frame::inset(&canvas, 5, Viewport::new(0.0, 10.0, 0.0, 10.0));
        assert_eq!(frame.to_pixel(0.0, 0.0), (5.0, 105.0));
        assert_eq!(frame.to_pixel(10.0, 10.0), (105.0, 5.0));
        assert!(frame.contains(5.0, 5.0));
        assert!(!frame.contains(11.0, 5.0));
    }

    #[test]
    fn test_viewport_from_points() {
        let vp = Viewport::from_points([(0.0, 1.0), (2.0, 1.0)], 0.0).unwrap();
        assert_eq!((vp.x_min, vp.x_max), (0.0, 2.0));
        // flat y extent widened to 1
        assert_eq!((vp.y_min, vp.y_max), (1.0, 2.0));
        assert!(Viewport::from_points(Vec::new(), 0.1).is_none());
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");
        Canvas::new(4, 4, BLUE).save_png(&path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }
}
