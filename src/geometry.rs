//! Bilinear grid-to-quad mapping
//!
//! A `width x height` source grid is stretched over an arbitrary
//! quadrilateral by two nested linear interpolations: first along the top
//! (`p0 -> p1`) and bottom (`p3 -> p2`) edges, then between those two edge
//! points. This is a bilinear patch, not a homography, so straight grid
//! lines stay straight only along the two interpolation directions.

use serde::{Deserialize, Serialize};

use crate::error::{FitError, FitResult};

/// A point in destination (canvas) space
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Destination region for a fit
///
/// Corner order: `p0` top-left, `p1` top-right, `p2` bottom-right,
/// `p3` bottom-left. The source x-axis runs `p0 -> p1` (and `p3 -> p2`),
/// the source y-axis runs `p0 -> p3` (and `p1 -> p2`). Convexity and
/// winding are not checked.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Quad {
    pub corners: [Point; 4],
}

impl Quad {
    pub fn new(p0: Point, p1: Point, p2: Point, p3: Point) -> Self {
        Self {
            corners: [p0, p1, p2, p3],
        }
    }

    /// Build a quad from `[x0, y0, x1, y1, x2, y2, x3, y3]`
    pub fn from_points(points: &[f64]) -> FitResult<Self> {
        if points.len() != 8 {
            return Err(FitError::InvalidQuad(format!(
                "expected 8 coordinates, got {}",
                points.len()
            )));
        }
        if let Some(idx) = points.iter().position(|v| !v.is_finite()) {
            return Err(FitError::InvalidQuad(format!(
                "coordinate {} is not finite ({})",
                idx, points[idx]
            )));
        }

        Ok(Self::new(
            Point::new(points[0], points[1]),
            Point::new(points[2], points[3]),
            Point::new(points[4], points[5]),
            Point::new(points[6], points[7]),
        ))
    }

    #[inline]
    pub fn p0(&self) -> Point {
        self.corners[0]
    }

    #[inline]
    pub fn p1(&self) -> Point {
        self.corners[1]
    }

    #[inline]
    pub fn p2(&self) -> Point {
        self.corners[2]
    }

    #[inline]
    pub fn p3(&self) -> Point {
        self.corners[3]
    }

    /// `max(x) - min(x)` over the four corners
    pub fn horizontal_extent(&self) -> f64 {
        let (min, max) = self.span(|p| p.x);
        max - min
    }

    /// `max(y) - min(y)` over the four corners
    pub fn vertical_extent(&self) -> f64 {
        let (min, max) = self.span(|p| p.y);
        max - min
    }

    fn span(&self, axis: impl Fn(&Point) -> f64) -> (f64, f64) {
        self.corners
            .iter()
            .map(axis)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            })
    }
}

/// Grid offsets of a cell's four corners relative to `(i, j)`
///
/// Order is `(i, j)`, `(i, j + 1)`, `(i + 1, j + 1)`, `(i + 1, j)`, which
/// traces the cell boundary without crossing itself. Every rasterizer
/// derives its corners from this table.
pub const CORNER_OFFSETS: [(u32, u32); 4] = [(0, 0), (0, 1), (1, 1), (1, 0)];

/// Linear interpolation `a + t * (b - a)` written as `t*b + (1-t)*a`
///
/// That form reproduces `a` exactly at `t = 0` and `b` exactly at `t = 1`.
#[inline]
pub fn lerp(a: Point, b: Point, t: f64) -> Point {
    Point {
        x: t * b.x + (1.0 - t) * a.x,
        y: t * b.y + (1.0 - t) * a.y,
    }
}

/// Where grid corner `(i, j)` of a `width x height` grid lands in `quad`
///
/// `i` ranges over `0..=width` and `j` over `0..=height`. The fractions are
/// `i / width` and `j / height`, so `(0, 0)` is exactly `p0` and
/// `(width, height)` is exactly `p2`.
#[inline]
pub fn corner_on_grid(quad: &Quad, i: u32, j: u32, width: u32, height: u32) -> Point {
    let r = i as f64 / width as f64;
    let top = lerp(quad.p0(), quad.p1(), r);
    let bottom = lerp(quad.p3(), quad.p2(), r);

    let s = j as f64 / height as f64;
    lerp(top, bottom, s)
}

/// The four destination corners of cell `(i, j)` in `CORNER_OFFSETS` order
#[inline]
pub fn cell_corners(quad: &Quad, i: u32, j: u32, width: u32, height: u32) -> [Point; 4] {
    CORNER_OFFSETS.map(|(di, dj)| corner_on_grid(quad, i + di, j + dj, width, height))
}
