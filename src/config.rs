//! Terrain generation configuration.
//!
//! A [`TerrainConfig`] is fixed for the duration of a generation run. It can be built in
//! code, loaded from JSON, or assembled from CLI flags.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::curve::Curve;
use crate::fractal::MAX_ITERATIONS;

/// Smallest noise scale allowed; anything at or below zero is clamped up to this.
pub const MIN_SCALE: f32 = 1e-4;

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid terrain config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Which escape-time fractal shapes the terrain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FractalMode {
    /// Two Julia sets with random constants, added together
    #[default]
    Julia,
    /// A rotated/reflected Mandelbrot set modulated by low-frequency noise
    Mandelbrot,
}

impl std::fmt::Display for FractalMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Julia => write!(f, "julia"),
            Self::Mandelbrot => write!(f, "mandelbrot"),
        }
    }
}

/// Terrain generation parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Grid cells along X. Negative values produce an empty terrain.
    pub x_size: i32,
    /// Grid cells along Z. Negative values produce an empty terrain.
    pub z_size: i32,
    /// Noise scale (higher = larger features). Clamped to [`MIN_SCALE`] when <= 0.
    pub scale: f32,
    /// Number of noise octaves
    pub octaves: u32,
    /// Frequency multiplier per octave
    pub lacunarity: f32,
    /// Height the fractal mask pulls terrain towards
    pub base_height: f32,
    /// Height of the companion water plane
    pub water_height: f32,
    pub mode: FractalMode,
    /// Number of island centres drawn into the layout
    pub island_count: u32,
    /// Uniform display scale handed to the mesh consumer
    pub mesh_scale: f32,
    /// Escape-time iteration cap for the fractal masks
    pub max_iterations: u32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            x_size: 100,
            z_size: 100,
            scale: 25.0,
            octaves: 4,
            lacunarity: 2.0,
            base_height: 0.0,
            water_height: 50.0,
            mode: FractalMode::Julia,
            island_count: 2,
            mesh_scale: 500.0,
            max_iterations: MAX_ITERATIONS,
        }
    }
}

impl TerrainConfig {
    /// Noise scale with the divide-by-zero guard applied.
    pub fn effective_scale(&self) -> f32 {
        // `!(x > 0)` also catches NaN
        if !(self.scale > 0.0) {
            MIN_SCALE
        } else {
            self.scale
        }
    }

    /// True when either grid dimension is negative.
    pub fn is_degenerate(&self) -> bool {
        self.x_size < 0 || self.z_size < 0
    }

    /// Vertex columns and rows, `(x_size + 1, z_size + 1)`, or `(0, 0)` when degenerate.
    pub fn vertex_dims(&self) -> (usize, usize) {
        if self.is_degenerate() {
            (0, 0)
        } else {
            (self.x_size as usize + 1, self.z_size as usize + 1)
        }
    }

    pub fn vertex_count(&self) -> usize {
        let (w, h) = self.vertex_dims();
        w * h
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json_str(&fs::read_to_string(path)?)
    }
}

/// On-disk terrain description: the config plus optional response curves.
///
/// Missing curves fall back to identity (height) and a linear ramp over [0, 1] (influence).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainFile {
    pub terrain: TerrainConfig,
    pub height_curve: Option<Curve>,
    pub influence_curve: Option<Curve>,
}

impl TerrainFile {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
    }

    pub fn height_curve(&self) -> Curve {
        self.height_curve.clone().unwrap_or_else(Curve::identity)
    }

    pub fn influence_curve(&self) -> Curve {
        self.influence_curve.clone().unwrap_or_else(Curve::unit_ramp)
    }
}
