//! Configuration management for quadfit

use anyhow::{Context, Result};
use image::Rgb;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::fit::FitOptions;
use crate::prescale::ResizeFilter;
use crate::strategy::StrategyPreference;

/// Output surface configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    /// Colour the surface is cleared to before fitting
    pub background: [u8; 3],
    /// Outline each cell to close seams between neighbours
    #[serde(default = "default_stroke")]
    pub stroke: bool,
}

fn default_stroke() -> bool {
    true
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            background: [255, 255, 255],
            stroke: true,
        }
    }
}

impl CanvasConfig {
    pub fn background(&self) -> Rgb<u8> {
        Rgb(self.background)
    }
}

/// Fit pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FitConfig {
    #[serde(default)]
    pub strategy: StrategyPreference,

    /// Batch worker threads, 0 lets rayon decide
    #[serde(default)]
    pub threads: usize,

    #[serde(default = "default_prescale")]
    pub prescale: bool,

    #[serde(default)]
    pub filter: ResizeFilter,
}

fn default_prescale() -> bool {
    true
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyPreference::default(),
            threads: 0,
            prescale: true,
            filter: ResizeFilter::default(),
        }
    }
}

impl FitConfig {
    pub fn options(&self) -> FitOptions {
        FitOptions {
            prescale: self.prescale,
            filter: self.filter,
        }
    }
}

/// Destination quad in canvas pixels
/// Order: x0, y0 (top-left), x1, y1 (top-right), x2, y2 (bottom-right), x3, y3 (bottom-left)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuadConfig {
    pub points: Vec<f64>,
}

impl Default for QuadConfig {
    fn default() -> Self {
        Self {
            // Slightly inset frame on the default canvas
            points: vec![80.0, 60.0, 720.0, 60.0, 720.0, 540.0, 80.0, 540.0],
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub canvas: CanvasConfig,

    #[serde(default)]
    pub fit: FitConfig,

    #[serde(default)]
    pub quad: QuadConfig,
}

impl Config {
    /// Read and parse an existing configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read quadfit config {:?}", path))?;
        let config = toml::from_str(&text)
            .with_context(|| format!("Malformed quadfit config {:?}", path))?;
        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Load `path`, writing out the defaults first if it is missing
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        let config = Config::default();
        config.save(path)?;
        Ok(config)
    }

    /// Write the configuration as TOML, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self).context("Cannot encode quadfit config")?;

        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
                .with_context(|| format!("Cannot create config directory {:?}", dir))?,
            _ => {}
        }
        std::fs::write(path, text)
            .with_context(|| format!("Cannot write quadfit config {:?}", path))?;

        tracing::info!("Wrote configuration to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.quad.points.len(), 8);
        assert_eq!(config.fit.strategy, StrategyPreference::Auto);
        assert!(config.fit.prescale);
        assert!(config.canvas.stroke);
    }

    #[test]
    fn test_create_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quadfit.toml");

        let created = Config::load_or_create(&path).unwrap();
        assert!(path.exists());

        let loaded = Config::load_or_create(&path).unwrap();
        assert_eq!(created, loaded);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quadfit.toml");
        std::fs::write(
            &path,
            "[fit]\nstrategy = \"scalar\"\nfilter = \"lanczos3\"\n\n[quad]\npoints = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]\n",
        )
        .unwrap();

        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config.fit.strategy, StrategyPreference::Scalar);
        assert_eq!(config.fit.filter, ResizeFilter::Lanczos3);
        assert!(config.fit.prescale);
        assert_eq!(config.canvas, CanvasConfig::default());
        assert_eq!(config.quad.points[2], 1.0);
    }

    #[test]
    fn test_save_then_load_preserves_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quadfit.toml");

        let mut config = Config::default();
        config.canvas.background = [10, 20, 30];
        config.fit.strategy = StrategyPreference::Batch;
        config.fit.threads = 3;
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quadfit.toml");
        std::fs::write(&path, "[fit]\nstrategy = \"gpu\"\n").unwrap();
        assert!(Config::load_or_create(&path).is_err());
    }
}
