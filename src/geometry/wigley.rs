//! Wigley parabolic hull as a closed triangulated surface.
//!
//! Half-breadth `y = (B/2)(1 - (2x/L)²)(1 - (z/T)²)` for
//! `x ∈ [-L/2, L/2]`, `z ∈ [-T, 0]`. The surface consists of a starboard
//! shell (+y), a port shell (-y) and a flat deck at `z = 0`, each grid quad
//! split into two triangles with outward normals.

use nalgebra::Vector3;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use super::error::GeometryError;

//─────────────────────────────────────────────────────────────────────────────

const DEGENERATE_NORMAL: f64 = 1e-6;

/// Triangle with its unit normal (zero for degenerate triangles).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Facet {
    pub normal: Vector3<f64>,
    pub vertices: [Vector3<f64>; 3],
}

impl Facet {
    fn new(a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>) -> Self {
        let cross = (b - a).cross(&(c - a));
        let norm = cross.norm();
        let normal = if norm > DEGENERATE_NORMAL {
            cross / norm
        } else {
            Vector3::zeros()
        };
        Self {
            normal,
            vertices: [a, b, c],
        }
    }
}

/// Wigley hull dimensions and grid resolution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WigleyHull {
    pub length: f64,
    pub beam: f64,
    pub draft: f64,
    /// Grid points along the length.
    pub nx: usize,
    /// Grid points over the draft.
    pub nz: usize,
}

impl Default for WigleyHull {
    fn default() -> Self {
        Self {
            length: 1.0,
            beam: 0.1,
            draft: 0.0625,
            nx: 100,
            nz: 20,
        }
    }
}

impl WigleyHull {
    pub fn validate(&self) -> Result<(), GeometryError> {
        for (name, value) in [
            ("length", self.length),
            ("beam", self.beam),
            ("draft", self.draft),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(GeometryError::InvalidParameter {
                    name: name.to_string(),
                    message: format!("must be a positive number, got {value}"),
                });
            }
        }
        for (name, value) in [("nx", self.nx), ("nz", self.nz)] {
            if value < 2 {
                return Err(GeometryError::InvalidParameter {
                    name: name.to_string(),
                    message: format!("need at least 2 grid points, got {value}"),
                });
            }
        }
        Ok(())
    }

    /// Half-breadth at `(x, z)`, clamped at zero outside the hull.
    pub fn half_breadth(&self, x: f64, z: f64) -> f64 {
        let along = (1.0 - (2.0 * x / self.length).powi(2)).max(0.0);
        let depth = (1.0 - (z / self.draft).powi(2)).max(0.0);
        0.5 * self.beam * along * depth
    }

    /// Shell grid indexed `[k][i]` (depth row, length column); `side` is +1
    /// for starboard and -1 for port.
    fn shell(&self, side: f64) -> Vec<Vec<Vector3<f64>>> {
        (0..self.nz)
            .map(|k| {
                let z = -self.draft + self.draft * k as f64 / (self.nz - 1) as f64;
                (0..self.nx)
                    .map(|i| {
                        let x = -0.5 * self.length + self.length * i as f64 / (self.nx - 1) as f64;
                        Vector3::new(x, side * self.half_breadth(x, z), z)
                    })
                    .collect()
            })
            .collect()
    }

    /// `2·(nz−1)(nx−1)` triangles per shell plus `2·(nx−1)` on the deck.
    pub fn facet_count(&self) -> usize {
        2 * (self.nz - 1) * (self.nx - 1) * 2 + 2 * (self.nx - 1)
    }

    pub fn facets(&self) -> Vec<Facet> {
        let starboard = self.shell(1.0);
        let port = self.shell(-1.0);
        let mut facets = Vec::with_capacity(self.facet_count());

        for k in 0..self.nz - 1 {
            for i in 0..self.nx - 1 {
                let (a, b, c, d) = (
                    starboard[k][i],
                    starboard[k + 1][i],
                    starboard[k + 1][i + 1],
                    starboard[k][i + 1],
                );
                facets.push(Facet::new(a, b, c));
                facets.push(Facet::new(a, c, d));

                let (a, b, c, d) = (port[k][i], port[k][i + 1], port[k + 1][i + 1], port[k + 1][i]);
                facets.push(Facet::new(a, b, c));
                facets.push(Facet::new(a, c, d));
            }
        }

        let top = self.nz - 1;
        for i in 0..self.nx - 1 {
            let (a, b, c, d) = (
                port[top][i],
                port[top][i + 1],
                starboard[top][i + 1],
                starboard[top][i],
            );
            facets.push(Facet::new(a, b, c));
            facets.push(Facet::new(a, c, d));
        }
        facets
    }

    /// ASCII STL of the closed hull, solid name `wigley`.
    pub fn to_stl(&self) -> String {
        let mut out = String::from("solid wigley\n");
        for facet in self.facets() {
            let n = facet.normal;
            let _ = writeln!(out, "facet normal {} {} {}", n.x, n.y, n.z);
            out.push_str("  outer loop\n");
            for v in &facet.vertices {
                let _ = writeln!(out, "    vertex {} {} {}", v.x, v.y, v.z);
            }
            out.push_str("  endloop\nendfacet\n");
        }
        out.push_str("endsolid wigley\n");
        out
    }

    /// Validates the parameters and writes the STL; returns the facet count.
    pub fn write_stl(&self, path: &Path) -> Result<usize, GeometryError> {
        self.validate()?;
        let io_err = |e| GeometryError::Io {
            path: path.display().to_string(),
            source: e,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        fs::write(path, self.to_stl()).map_err(io_err)?;
        Ok(self.facet_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coarse() -> WigleyHull {
        WigleyHull {
            nx: 5,
            nz: 3,
            ..WigleyHull::default()
        }
    }

    #[test]
    fn test_half_breadth() {
        let hull = WigleyHull::default();
        assert!((hull.half_breadth(0.0, 0.0) - 0.05).abs() < 1e-15);
        assert_eq!(hull.half_breadth(0.5, 0.0), 0.0);
        assert_eq!(hull.half_breadth(0.0, -0.0625), 0.0);
        // outside the hull clamps to zero
        assert_eq!(hull.half_breadth(0.8, 0.0), 0.0);
    }

    #[test]
    fn test_facet_count_formula() {
        let hull = coarse();
        // 2·2·4·2 shells + 2·4 deck
        assert_eq!(hull.facet_count(), 40);
        assert_eq!(hull.facets().len(), 40);
        assert_eq!(WigleyHull::default().facets().len(), 2 * 19 * 99 * 2 + 2 * 99);
    }

    #[test]
    fn test_normals_point_outward() {
        let hull = coarse();
        let facets = hull.facets();
        let shell_facets = 4 * (hull.nz - 1) * (hull.nx - 1);

        // each grid quad emits two starboard then two port triangles
        for quad in facets[..shell_facets].chunks(4) {
            assert!(quad[0].normal.y > 0.0 && quad[1].normal.y > 0.0);
            assert!(quad[2].normal.y < 0.0 && quad[3].normal.y < 0.0);
        }
        for deck in &facets[shell_facets..] {
            assert!(deck.normal.z >= 0.0);
            assert!(deck.vertices.iter().all(|v| v.z == 0.0));
        }
        for facet in &facets {
            let n = facet.normal.norm();
            assert!(n == 0.0 || (n - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_bow_deck_facet_is_degenerate() {
        let facets = coarse().facets();
        // both shells meet at y = 0 on the bow, collapsing one deck triangle
        let deck_start = facets.len() - 8;
        assert_ne!(facets[deck_start].normal, Vector3::zeros());
        assert_eq!(facets[deck_start + 1].normal, Vector3::zeros());
    }

    #[test]
    fn test_write_stl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geometry/wigley.stl");
        let count = coarse().write_stl(&path).unwrap();
        let stl = fs::read_to_string(&path).unwrap();
        assert!(stl.starts_with("solid wigley\n"));
        assert!(stl.ends_with("endsolid wigley\n"));
        assert_eq!(stl.matches("facet normal").count(), count);
        assert_eq!(stl.matches("vertex").count(), 3 * count);
    }

    #[test]
    fn test_invalid_parameters() {
        let hull = WigleyHull {
            nx: 1,
            ..WigleyHull::default()
        };
        assert!(matches!(
            hull.validate(),
            Err(GeometryError::InvalidParameter { name, .. }) if name == "nx"
        ));
        let hull = WigleyHull {
            draft: 0.0,
            ..WigleyHull::default()
        };
        assert!(hull.validate().is_err());
    }
}
