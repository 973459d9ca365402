//! Fitting a source image onto a quadrilateral
//!
//! Pipeline: validate quad and image, optionally prescale, extract RGB
//! pixels, then hand every cell to the rasterizer. Every check happens
//! before the first fill, so a failed fit leaves the canvas untouched.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::canvas::QuadCanvas;
use crate::error::{FitError, FitResult};
use crate::geometry::Quad;
use crate::pixels::{extract, RasterSource};
use crate::prescale::{prescale, ResizeFilter};
use crate::strategy::{Rasterizer, Strategy};

/// Knobs that shape a fit independent of the rasterizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FitOptions {
    /// Shrink sources larger than the destination before mapping
    pub prescale: bool,
    /// Filter used for the shrink
    pub filter: ResizeFilter,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            prescale: true,
            filter: ResizeFilter::default(),
        }
    }
}

/// What a completed fit did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FitSummary {
    /// Source dimensions before prescaling
    pub source: (u32, u32),
    /// Grid dimensions actually mapped
    pub grid: (u32, u32),
    /// Number of fill calls issued
    pub cells: u64,
    pub strategy: Strategy,
}

/// Maps images onto quads with a fixed rasterizer and options
pub struct Fitter {
    options: FitOptions,
    rasterizer: Rasterizer,
}

impl Fitter {
    pub fn new(options: FitOptions, rasterizer: Rasterizer) -> Self {
        Self {
            options,
            rasterizer,
        }
    }

    /// Paint `image` into the quad `[x0, y0, x1, y1, x2, y2, x3, y3]`
    pub fn fit_image<C: QuadCanvas + ?Sized>(
        &self,
        canvas: &mut C,
        image: RasterSource,
        quad_points: &[f64],
    ) -> FitResult<FitSummary> {
        let quad = Quad::from_points(quad_points)?;

        let (width, height) = image.dimensions()?;
        if width == 0 || height == 0 {
            return Err(FitError::InvalidImage { width, height });
        }

        let raster = if self.options.prescale {
            prescale(image, &quad, self.options.filter)?
        } else {
            image
        };
        let pixels = extract(&raster)?;
        drop(raster);

        self.rasterizer.rasterize(&quad, &pixels, canvas);

        let summary = FitSummary {
            source: (width, height),
            grid: (pixels.width(), pixels.height()),
            cells: pixels.width() as u64 * pixels.height() as u64,
            strategy: self.rasterizer.strategy(),
        };
        debug!(
            "Fitted {}x{} source as {}x{} grid ({} cells, {})",
            width,
            height,
            summary.grid.0,
            summary.grid.1,
            summary.cells,
            summary.strategy.as_str()
        );
        Ok(summary)
    }
}

impl Default for Fitter {
    fn default() -> Self {
        Self::new(FitOptions::default(), Rasterizer::scalar())
    }
}

/// Fit with default options and the scalar rasterizer
pub fn fit_image<C: QuadCanvas + ?Sized>(
    canvas: &mut C,
    image: RasterSource,
    quad_points: &[f64],
) -> FitResult<FitSummary> {
    Fitter::default().fit_image(canvas, image, quad_points)
}
