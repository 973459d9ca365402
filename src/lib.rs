//! quadfit - paint a raster image onto an arbitrary quadrilateral
//!
//! Every source pixel becomes one cell of a bilinear grid stretched over
//! the destination quad, and each cell is filled as a solid quadrilateral
//! on a caller-supplied canvas.

pub mod canvas;
pub mod config;
pub mod error;
pub mod fit;
pub mod geometry;
pub mod pixels;
pub mod prescale;
pub mod strategy;

pub use canvas::{FillRecord, FillRecorder, ImageCanvas, QuadCanvas};
pub use error::{FitError, FitResult};
pub use fit::{fit_image, FitOptions, FitSummary, Fitter};
pub use geometry::{cell_corners, corner_on_grid, Point, Quad};
pub use pixels::{extract, PixelBuffer, RasterSource};
pub use prescale::{plan_prescale, prescale, ResizeFilter};
pub use strategy::{Rasterizer, Strategy, StrategyPreference};
