//! Downscaling of oversized sources before mapping
//!
//! Each source pixel becomes one filled cell, so a source much larger than
//! the destination wastes work on cells smaller than a canvas pixel. The
//! source is shrunk (never enlarged) until its dominant axis matches the
//! quad's bounding extent along that axis.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FitResult;
use crate::geometry::Quad;
use crate::pixels::RasterSource;

/// Resampling filter used when a source is downscaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl ResizeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResizeFilter::Nearest => "nearest",
            ResizeFilter::Triangle => "triangle",
            ResizeFilter::CatmullRom => "catmullrom",
            ResizeFilter::Gaussian => "gaussian",
            ResizeFilter::Lanczos3 => "lanczos3",
        }
    }

    pub fn all() -> &'static [ResizeFilter] {
        &[
            ResizeFilter::Nearest,
            ResizeFilter::Triangle,
            ResizeFilter::CatmullRom,
            ResizeFilter::Gaussian,
            ResizeFilter::Lanczos3,
        ]
    }

    pub fn filter_type(&self) -> FilterType {
        match self {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Decide the downscaled size for a `width x height` source, if any
///
/// Landscape sources (`width > height`) compare against the quad's
/// horizontal extent; square and portrait sources against its vertical
/// extent. Sizes are floored and clamped to at least one pixel.
pub fn plan_prescale(width: u32, height: u32, quad: &Quad) -> Option<(u32, u32)> {
    if width > height {
        let extent = quad.horizontal_extent();
        if width as f64 > extent {
            let scaled_height = height as f64 * (extent / width as f64);
            return Some((to_pixels(extent), to_pixels(scaled_height)));
        }
    } else {
        let extent = quad.vertical_extent();
        if height as f64 > extent {
            let scaled_width = width as f64 * (extent / height as f64);
            return Some((to_pixels(scaled_width), to_pixels(extent)));
        }
    }
    None
}

#[inline]
fn to_pixels(size: f64) -> u32 {
    (size.floor() as u32).max(1)
}

/// Shrink `source` to fit `quad` if it is larger, otherwise return it as is
pub fn prescale(
    source: RasterSource,
    quad: &Quad,
    filter: ResizeFilter,
) -> FitResult<RasterSource> {
    let (width, height) = source.dimensions()?;

    match plan_prescale(width, height, quad) {
        Some((new_width, new_height)) => {
            debug!(
                "Prescaling {}x{} -> {}x{} ({})",
                width,
                height,
                new_width,
                new_height,
                filter.as_str()
            );
            let img = source.decode()?;
            Ok(RasterSource::Image(img.resize_exact(
                new_width,
                new_height,
                filter.filter_type(),
            )))
        }
        None => Ok(source),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GenericImageView, Rgb, RgbImage};

    fn quad(points: [f64; 8]) -> Quad {
        Quad::from_points(&points).unwrap()
    }

    #[test]
    fn test_landscape_uses_horizontal_extent() {
        // Horizontal extent 50, vertical extent 300
        let q = quad([10.0, 0.0, 60.0, 5.0, 55.0, 300.0, 12.0, 290.0]);
        assert_eq!(plan_prescale(200, 100, &q), Some((50, 25)));
    }

    #[test]
    fn test_portrait_uses_vertical_extent() {
        let q = quad([0.0, 10.0, 500.0, 10.0, 500.0, 70.0, 0.0, 70.0]);
        assert_eq!(plan_prescale(90, 120, &q), Some((45, 60)));
    }

    #[test]
    fn test_square_uses_vertical_extent() {
        // Horizontal extent is tiny, vertical is large: no rescale expected
        let q = quad([0.0, 0.0, 4.0, 0.0, 4.0, 400.0, 0.0, 400.0]);
        assert_eq!(plan_prescale(100, 100, &q), None);

        // Vertical extent small: rescale by height
        let q = quad([0.0, 0.0, 400.0, 0.0, 400.0, 40.0, 0.0, 40.0]);
        assert_eq!(plan_prescale(100, 100, &q), Some((40, 40)));
    }

    #[test]
    fn test_never_upscales() {
        let q = quad([0.0, 0.0, 1000.0, 0.0, 1000.0, 1000.0, 0.0, 1000.0]);
        assert_eq!(plan_prescale(64, 32, &q), None);
        assert_eq!(plan_prescale(32, 64, &q), None);
        // Equal to the extent is not larger than it
        assert_eq!(plan_prescale(1000, 10, &q), None);
    }

    #[test]
    fn test_fractional_extent_is_floored() {
        let q = quad([0.0, 0.0, 33.7, 0.0, 33.7, 5.0, 0.0, 5.0]);
        let (w, h) = plan_prescale(100, 10, &q).unwrap();
        assert_eq!((w, h), (33, 3));
        assert!((w as f64) <= q.horizontal_extent());
    }

    #[test]
    fn test_dominant_axis_bounded() {
        let quads = [
            quad([0.0, 0.0, 20.0, 0.0, 15.0, 10.0, 5.0, 10.0]),
            quad([3.0, 1.0, 250.5, 40.0, 200.0, 180.25, -10.0, 150.0]),
            quad([0.0, 0.0, 7.5, 0.0, 7.5, 7.5, 0.0, 7.5]),
        ];
        let sizes = [(1920, 1080), (1080, 1920), (512, 512), (3, 2), (300, 1)];

        for q in &quads {
            for &(w, h) in &sizes {
                let Some((nw, nh)) = plan_prescale(w, h, q) else {
                    continue;
                };
                assert!(nw <= w && nh <= h);
                if w > h {
                    assert!(nw as f64 <= q.horizontal_extent());
                } else {
                    assert!(nh as f64 <= q.vertical_extent());
                }
            }
        }
    }

    #[test]
    fn test_degenerate_extent_clamps_to_one_pixel() {
        let q = quad([5.0, 0.0, 5.0, 0.0, 5.0, 10.0, 5.0, 10.0]);
        assert_eq!(plan_prescale(40, 20, &q), Some((1, 1)));
    }

    #[test]
    fn test_prescale_resizes_image() {
        let img = RgbImage::from_pixel(80, 40, Rgb([9, 8, 7]));
        let q = quad([0.0, 0.0, 20.0, 0.0, 20.0, 20.0, 0.0, 20.0]);

        let out = prescale(img.into(), &q, ResizeFilter::Nearest).unwrap();
        match out {
            RasterSource::Image(img) => {
                assert_eq!(img.dimensions(), (20, 10));
                assert_eq!(img.to_rgb8().get_pixel(10, 5), &Rgb([9, 8, 7]));
            }
            RasterSource::File(_) => panic!("expected decoded image"),
        }
    }

    #[test]
    fn test_prescale_passthrough_is_identical() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(4, 4, |x, y| {
            Rgb([x as u8, y as u8, 0])
        }));
        let q = quad([0.0, 0.0, 100.0, 0.0, 100.0, 100.0, 0.0, 100.0]);

        match prescale(img.clone().into(), &q, ResizeFilter::Nearest).unwrap() {
            RasterSource::Image(out) => assert_eq!(out.as_bytes(), img.as_bytes()),
            RasterSource::File(_) => panic!("expected decoded image"),
        }
    }

    #[test]
    fn test_filter_names_round_trip() {
        for filter in ResizeFilter::all() {
            let quoted = format!("\"{}\"", filter.as_str());
            let parsed: ResizeFilter = serde_json::from_str(&quoted).unwrap();
            assert_eq!(&parsed, filter);
        }
    }
}
