//! Drawing surfaces that receive one filled quad per cell

use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_line_segment_mut, draw_polygon_mut};
use imageproc::point::Point as PixelPoint;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// A surface that can paint a solid quadrilateral
///
/// Called once per cell with the corners in cell winding order. Fills are
/// always issued from a single thread.
pub trait QuadCanvas {
    fn fill_quad(&mut self, corners: [Point; 4], color: Rgb<u8>);
}

impl<C: QuadCanvas + ?Sized> QuadCanvas for &mut C {
    fn fill_quad(&mut self, corners: [Point; 4], color: Rgb<u8>) {
        (**self).fill_quad(corners, color);
    }
}

/// Forward every fill to both surfaces
impl<A: QuadCanvas, B: QuadCanvas> QuadCanvas for (A, B) {
    fn fill_quad(&mut self, corners: [Point; 4], color: Rgb<u8>) {
        self.0.fill_quad(corners, color);
        self.1.fill_quad(corners, color);
    }
}

/// Paints cells into an in-memory RGB image
pub struct ImageCanvas {
    image: RgbImage,
    /// Outline each cell in its own colour so neighbouring cells overlap
    /// by a pixel and leave no seams
    stroke: bool,
}

impl ImageCanvas {
    pub fn new(width: u32, height: u32, background: Rgb<u8>) -> Self {
        Self::from_image(RgbImage::from_pixel(width, height, background))
    }

    pub fn from_image(image: RgbImage) -> Self {
        Self {
            image,
            stroke: true,
        }
    }

    pub fn with_stroke(mut self, stroke: bool) -> Self {
        self.stroke = stroke;
        self
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }
}

impl QuadCanvas for ImageCanvas {
    fn fill_quad(&mut self, corners: [Point; 4], color: Rgb<u8>) {
        let (width, height) = self.image.dimensions();
        let (w, h) = (width.max(1) as f64, height.max(1) as f64);

        // Nothing a cell this far out could touch is on the canvas
        let (lo, hi) = bounding_box(&corners);
        if hi.x <= -1.0 || hi.y <= -1.0 || lo.x >= w || lo.y >= h {
            return;
        }

        // Keep imageproc's integer arithmetic and line walks canvas-sized
        let outline = clip_polygon(&corners, Point::new(-w, -h), Point::new(2.0 * w, 2.0 * h));
        if outline.is_empty() {
            return;
        }

        if self.stroke {
            for k in 0..outline.len() {
                let a = outline[k];
                let b = outline[(k + 1) % outline.len()];
                draw_line_segment_mut(
                    &mut self.image,
                    (a.x as f32, a.y as f32),
                    (b.x as f32, b.y as f32),
                    color,
                );
            }
        }

        let poly = pixel_polygon(&outline);
        // imageproc rejects polygons whose first and last vertex coincide
        if poly.len() >= 3 {
            draw_polygon_mut(&mut self.image, &poly, color);
        }
    }
}

fn bounding_box(points: &[Point]) -> (Point, Point) {
    points.iter().fold(
        (
            Point::new(f64::INFINITY, f64::INFINITY),
            Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ),
        |(lo, hi), p| {
            (
                Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        },
    )
}

/// Sutherland-Hodgman clip of a polygon to the box `min..=max`
fn clip_polygon(points: &[Point], min: Point, max: Point) -> Vec<Point> {
    let mut poly = points.to_vec();

    for side in 0..4 {
        if poly.is_empty() {
            break;
        }
        let inside = |p: Point| match side {
            0 => p.x >= min.x,
            1 => p.x <= max.x,
            2 => p.y >= min.y,
            _ => p.y <= max.y,
        };
        // Only called for edges with one end on each side of the boundary
        let crossing = |a: Point, b: Point| match side {
            0 | 1 => {
                let x = if side == 0 { min.x } else { max.x };
                let t = (x - a.x) / (b.x - a.x);
                Point::new(x, a.y + t * (b.y - a.y))
            }
            _ => {
                let y = if side == 2 { min.y } else { max.y };
                let t = (y - a.y) / (b.y - a.y);
                Point::new(a.x + t * (b.x - a.x), y)
            }
        };

        let input = std::mem::take(&mut poly);
        let mut prev = input[input.len() - 1];
        for &cur in &input {
            match (inside(prev), inside(cur)) {
                (true, true) => poly.push(cur),
                (false, true) => {
                    poly.push(crossing(prev, cur));
                    poly.push(cur);
                }
                (true, false) => poly.push(crossing(prev, cur)),
                (false, false) => {}
            }
            prev = cur;
        }
    }

    poly
}

/// Round corners to pixel positions, dropping repeated vertices
fn pixel_polygon(corners: &[Point]) -> Vec<PixelPoint<i32>> {
    let mut poly: Vec<PixelPoint<i32>> = Vec::with_capacity(corners.len());
    for p in corners {
        let v = PixelPoint::new(p.x.round() as i32, p.y.round() as i32);
        if poly.last() != Some(&v) {
            poly.push(v);
        }
    }
    while poly.len() > 1 && poly.first() == poly.last() {
        poly.pop();
    }
    poly
}

/// One recorded fill call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FillRecord {
    pub corners: [Point; 4],
    pub color: [u8; 3],
}

/// Records fill calls in the order they arrive
#[derive(Debug, Clone, Default)]
pub struct FillRecorder {
    records: Vec<FillRecord>,
}

impl FillRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[FillRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl QuadCanvas for FillRecorder {
    fn fill_quad(&mut self, corners: [Point; 4], color: Rgb<u8>) {
        self.records.push(FillRecord {
            corners,
            color: color.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb<u8> = Rgb([255, 0, 0]);
    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> [Point; 4] {
        [
            Point::new(x0, y0),
            Point::new(x0, y1),
            Point::new(x1, y1),
            Point::new(x1, y0),
        ]
    }

    #[test]
    fn test_fill_paints_interior() {
        let mut canvas = ImageCanvas::new(20, 20, WHITE).with_stroke(false);
        canvas.fill_quad(square(5.0, 5.0, 15.0, 15.0), RED);

        let img = canvas.image();
        assert_eq!(img.get_pixel(10, 10), &RED);
        assert_eq!(img.get_pixel(1, 1), &WHITE);
        assert_eq!(img.get_pixel(18, 10), &WHITE);
    }

    #[test]
    fn test_degenerate_cell_does_not_panic() {
        let mut canvas = ImageCanvas::new(10, 10, WHITE);
        // Collapses to a single pixel after rounding
        canvas.fill_quad(square(4.1, 4.1, 4.2, 4.2), RED);
        assert_eq!(canvas.image().get_pixel(4, 4), &RED);

        // Collapses to a line
        canvas.fill_quad(square(1.0, 8.0, 6.0, 8.2), RED);
        assert_eq!(canvas.image().get_pixel(3, 8), &RED);
    }

    #[test]
    fn test_quad_outside_canvas_is_clipped() {
        let mut canvas = ImageCanvas::new(8, 8, WHITE);
        canvas.fill_quad(square(-20.0, -20.0, 4.0, 4.0), RED);
        canvas.fill_quad(square(50.0, 50.0, 90.0, 90.0), RED);
        assert_eq!(canvas.image().get_pixel(0, 0), &RED);
        assert_eq!(canvas.image().get_pixel(7, 7), &WHITE);
    }

    #[test]
    fn test_huge_quad_fills_canvas() {
        let huge = square(-3e9, -3e9, 3e9, 3e9);
        for stroke in [false, true] {
            let mut canvas = ImageCanvas::new(8, 8, WHITE).with_stroke(stroke);
            canvas.fill_quad(huge, RED);
            assert!(canvas.image().pixels().all(|p| *p == RED));
        }
    }

    #[test]
    fn test_far_away_quad_is_skipped() {
        let mut canvas = ImageCanvas::new(8, 8, WHITE);
        canvas.fill_quad(square(1e12, -5e11, 3e12, 5e11), RED);
        canvas.fill_quad(square(-3e12, -3e12, -1e12, -1e12), RED);
        assert!(canvas.image().pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_clip_polygon_to_box() {
        let min = Point::new(-8.0, -8.0);
        let max = Point::new(16.0, 16.0);

        let clipped = clip_polygon(&square(-3e9, -3e9, 3e9, 3e9), min, max);
        let (lo, hi) = bounding_box(&clipped);
        assert_eq!((lo, hi), (min, max));

        // Already inside: unchanged
        let inner = square(1.0, 2.0, 5.0, 6.0);
        assert_eq!(clip_polygon(&inner, min, max), inner.to_vec());

        // Entirely outside: empty
        assert!(clip_polygon(&square(20.0, 20.0, 30.0, 30.0), min, max).is_empty());
    }

    #[test]
    fn test_pixel_polygon_dedup() {
        assert_eq!(pixel_polygon(&square(0.0, 0.0, 3.0, 3.0)).len(), 4);
        assert_eq!(pixel_polygon(&square(0.0, 0.0, 0.2, 3.0)).len(), 2);
        assert_eq!(pixel_polygon(&square(1.0, 1.0, 1.3, 1.3)).len(), 1);
    }

    #[test]
    fn test_recorder_and_tee() {
        let mut canvas = ImageCanvas::new(4, 4, WHITE);
        let mut recorder = FillRecorder::new();
        {
            let mut tee = (&mut canvas, &mut recorder);
            tee.fill_quad(square(0.0, 0.0, 3.0, 3.0), RED);
        }

        assert_eq!(recorder.len(), 1);
        assert_eq!(recorder.records()[0].color, [255, 0, 0]);
        assert_eq!(canvas.image().get_pixel(1, 1), &RED);
    }
}
