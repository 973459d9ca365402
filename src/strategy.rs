//! Cell rasterizers
//!
//! Two interchangeable ways of turning a pixel grid into fill calls:
//! - **Scalar**: compute each cell's corners right before filling it.
//! - **Batch**: compute one full corner grid per `CORNER_OFFSETS` entry on
//!   a rayon pool, then fill every cell from those grids.
//!
//! Both paint cells row by row and take their corners from the same
//! `corner_on_grid` evaluations, so their fill sequences are identical.

use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::canvas::QuadCanvas;
use crate::geometry::{cell_corners, corner_on_grid, Point, Quad, CORNER_OFFSETS};
use crate::pixels::PixelBuffer;

/// The rasterizer that actually runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Scalar,
    Batch,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Scalar => "scalar",
            Strategy::Batch => "batch",
        }
    }
}

/// Which rasterizer the caller would like
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum StrategyPreference {
    /// Batch when more than one core is available, scalar otherwise
    #[default]
    Auto,
    Scalar,
    Batch,
}

/// Corner coordinates of every cell, one grid per corner slot
///
/// `grids[k][j * width + i]` is corner `k` (in `CORNER_OFFSETS` order) of
/// cell `(i, j)`.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerGrids {
    width: u32,
    grids: [Vec<Point>; 4],
}

impl CornerGrids {
    /// Evaluate all four grids, each in its own parallel pass
    pub fn compute(quad: &Quad, width: u32, height: u32) -> Self {
        let cells = width as usize * height as usize;
        let grids = CORNER_OFFSETS.map(|(di, dj)| {
            (0..cells)
                .into_par_iter()
                .map(|idx| {
                    let i = (idx % width as usize) as u32;
                    let j = (idx / width as usize) as u32;
                    corner_on_grid(quad, i + di, j + dj, width, height)
                })
                .collect::<Vec<_>>()
        });

        Self { width, grids }
    }

    #[inline]
    pub fn cell(&self, i: u32, j: u32) -> [Point; 4] {
        let idx = j as usize * self.width as usize + i as usize;
        [
            self.grids[0][idx],
            self.grids[1][idx],
            self.grids[2][idx],
            self.grids[3][idx],
        ]
    }
}

/// Runs one of the cell strategies against a canvas
///
/// Built once at startup; the batch pool is reused across fits.
pub struct Rasterizer {
    strategy: Strategy,
    pool: Option<ThreadPool>,
}

impl Rasterizer {
    pub fn scalar() -> Self {
        Self {
            strategy: Strategy::Scalar,
            pool: None,
        }
    }

    /// Resolve a preference into a working rasterizer
    ///
    /// `threads == 0` lets rayon pick the worker count. If the batch pool
    /// cannot be created the scalar strategy is used instead.
    pub fn probe(preference: StrategyPreference, threads: usize) -> Self {
        let want_batch = match preference {
            StrategyPreference::Scalar => false,
            StrategyPreference::Batch => true,
            StrategyPreference::Auto => {
                let cores = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(1);
                debug!("Auto strategy: {} cores available", cores);
                cores > 1
            }
        };

        if !want_batch {
            info!("Using scalar cell rasterizer");
            return Self::scalar();
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("quadfit-batch-{}", i))
            .build();
        Self::from_pool(pool)
    }

    /// Batch on a built pool, scalar (with a warning) if the build failed
    fn from_pool<E: std::fmt::Display>(pool: Result<ThreadPool, E>) -> Self {
        match pool {
            Ok(pool) => {
                info!(
                    "Using batch cell rasterizer ({} threads)",
                    pool.current_num_threads()
                );
                Self {
                    strategy: Strategy::Batch,
                    pool: Some(pool),
                }
            }
            Err(e) => {
                warn!("Batch rasterizer unavailable: {}", e);
                warn!("Falling back to scalar cell rasterizer");
                Self::scalar()
            }
        }
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Issue exactly one fill per cell of `pixels`, mapped into `quad`
    pub fn rasterize<C: QuadCanvas + ?Sized>(
        &self,
        quad: &Quad,
        pixels: &PixelBuffer,
        canvas: &mut C,
    ) {
        match (&self.pool, self.strategy) {
            (Some(pool), Strategy::Batch) => rasterize_batch(pool, quad, pixels, canvas),
            _ => rasterize_scalar(quad, pixels, canvas),
        }
    }
}

fn rasterize_scalar<C: QuadCanvas + ?Sized>(quad: &Quad, pixels: &PixelBuffer, canvas: &mut C) {
    let (width, height) = (pixels.width(), pixels.height());
    for j in 0..height {
        for i in 0..width {
            canvas.fill_quad(cell_corners(quad, i, j, width, height), pixels.get(i, j));
        }
    }
}

fn rasterize_batch<C: QuadCanvas + ?Sized>(
    pool: &ThreadPool,
    quad: &Quad,
    pixels: &PixelBuffer,
    canvas: &mut C,
) {
    let (width, height) = (pixels.width(), pixels.height());
    let grids = pool.install(|| CornerGrids::compute(quad, width, height));

    for j in 0..height {
        for i in 0..width {
            canvas.fill_quad(grids.cell(i, j), pixels.get(i, j));
        }
    }
}
