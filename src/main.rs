//! quadfit - fit an image onto a quadrilateral
//!
//! Loads an image, maps it onto the configured quad of a blank canvas and
//! writes the result as an image file.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use quadfit::config::Config;
use quadfit::{FillRecorder, Fitter, ImageCanvas, RasterSource, Rasterizer, StrategyPreference};

/// quadfit - paint an image onto an arbitrary quadrilateral
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source image
    input: PathBuf,

    /// Output image (format from extension)
    #[arg(short, long, default_value = "out.png")]
    output: PathBuf,

    /// Configuration file path
    #[arg(short, long, default_value = "quadfit.toml")]
    config: PathBuf,

    /// Destination quad as x0,y0,x1,y1,x2,y2,x3,y3 (overrides config)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    points: Option<Vec<f64>>,

    /// Cell rasterizer (overrides config)
    #[arg(long, value_enum)]
    strategy: Option<StrategyPreference>,

    /// Write every fill call to this JSON file
    #[arg(long)]
    cells: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    info!("quadfit v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_or_create(&args.config)?;
    if let Some(points) = args.points {
        config.quad.points = points;
    }
    if let Some(strategy) = args.strategy {
        config.fit.strategy = strategy;
    }

    info!("Input: {:?}", args.input);
    info!(
        "Canvas: {}x{}, quad: {:?}",
        config.canvas.width, config.canvas.height, config.quad.points
    );

    let rasterizer = Rasterizer::probe(config.fit.strategy, config.fit.threads);
    let fitter = Fitter::new(config.fit.options(), rasterizer);

    let mut canvas = ImageCanvas::new(
        config.canvas.width,
        config.canvas.height,
        config.canvas.background(),
    )
    .with_stroke(config.canvas.stroke);
    let source = RasterSource::File(args.input.clone());

    let summary = if let Some(cells_path) = &args.cells {
        let mut recorder = FillRecorder::new();
        let summary = fitter
            .fit_image(&mut (&mut canvas, &mut recorder), source, &config.quad.points)
            .with_context(|| format!("Failed to fit {:?}", args.input))?;

        let json = serde_json::to_string_pretty(recorder.records())
            .context("Failed to serialize fill records")?;
        std::fs::write(cells_path, json)
            .with_context(|| format!("Failed to write cells to {:?}", cells_path))?;
        info!("Wrote {} fill records to {:?}", recorder.len(), cells_path);
        summary
    } else {
        fitter
            .fit_image(&mut canvas, source, &config.quad.points)
            .with_context(|| format!("Failed to fit {:?}", args.input))?
    };

    info!(
        "Mapped {}x{} source as {}x{} grid: {} cells ({})",
        summary.source.0,
        summary.source.1,
        summary.grid.0,
        summary.grid.1,
        summary.cells,
        summary.strategy.as_str()
    );

    canvas
        .into_image()
        .save(&args.output)
        .with_context(|| format!("Failed to write output to {:?}", args.output))?;
    info!("Saved {:?}", args.output);

    Ok(())
}
