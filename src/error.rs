//! Error types for the image fit pipeline

use thiserror::Error;

/// Fatal conditions that abort a fit before any cell is drawn
#[derive(Debug, Error)]
pub enum FitError {
    /// Source raster has no pixels along at least one axis
    #[error("invalid image: {width}x{height} has no pixels")]
    InvalidImage { width: u32, height: u32 },

    /// Quad coordinates are missing or not finite
    #[error("invalid quad: {0}")]
    InvalidQuad(String),

    /// The raster could not be read or decoded
    #[error("pixel extraction failed: {0}")]
    ExtractionFailed(#[source] image::ImageError),
}

pub type FitResult<T> = std::result::Result<T, FitError>;
