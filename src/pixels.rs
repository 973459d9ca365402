//! Source raster access and RGB pixel extraction

use image::{DynamicImage, GenericImageView, Rgb, RgbImage};
use std::path::PathBuf;

use crate::error::{FitError, FitResult};

/// An image to be fitted, either already decoded or still on disk
#[derive(Debug, Clone)]
pub enum RasterSource {
    /// Decoded image held in memory
    Image(DynamicImage),
    /// Encoded image file, decoded lazily on extraction
    File(PathBuf),
}

impl RasterSource {
    /// Image dimensions, reading only the file header for `File` sources
    pub fn dimensions(&self) -> FitResult<(u32, u32)> {
        match self {
            RasterSource::Image(img) => Ok(img.dimensions()),
            RasterSource::File(path) => {
                image::image_dimensions(path).map_err(FitError::ExtractionFailed)
            }
        }
    }

    /// Decode the source into memory
    pub fn decode(self) -> FitResult<DynamicImage> {
        match self {
            RasterSource::Image(img) => Ok(img),
            RasterSource::File(path) => image::open(&path).map_err(FitError::ExtractionFailed),
        }
    }
}

impl From<DynamicImage> for RasterSource {
    fn from(img: DynamicImage) -> Self {
        RasterSource::Image(img)
    }
}

impl From<RgbImage> for RasterSource {
    fn from(img: RgbImage) -> Self {
        RasterSource::Image(DynamicImage::ImageRgb8(img))
    }
}

/// Opaque 8-bit RGB pixels of a source raster, addressed by `(col, row)`
///
/// Stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<Rgb<u8>>,
}

impl PixelBuffer {
    /// Take ownership of decoded RGB pixels
    pub fn from_rgb(img: RgbImage) -> FitResult<Self> {
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(FitError::InvalidImage { width, height });
        }

        let data = img.pixels().copied().collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Colour of the cell in column `col`, row `row`
    #[inline]
    pub fn get(&self, col: u32, row: u32) -> Rgb<u8> {
        self.data[row as usize * self.width as usize + col as usize]
    }

    /// Row-major view of all pixels
    pub fn as_slice(&self) -> &[Rgb<u8>] {
        &self.data
    }
}

/// Read every pixel of `raster` into a `PixelBuffer`, dropping alpha
pub fn extract(raster: &RasterSource) -> FitResult<PixelBuffer> {
    let rgb = match raster {
        RasterSource::Image(img) => img.to_rgb8(),
        RasterSource::File(path) => image::open(path)
            .map_err(FitError::ExtractionFailed)?
            .to_rgb8(),
    };
    PixelBuffer::from_rgb(rgb)
}
