//! Per-run random layout: everything a generation run draws from its random source.
//!
//! The layout is drawn once at the start of a run and then only read. Replaying a layout
//! through the generator reproduces the same terrain.

use serde::{Deserialize, Serialize};

use crate::config::TerrainConfig;
use crate::fractal::Complex;
use crate::random::RandomSource;

/// Exclusive upper bound for the per-run noise seed.
pub const NOISE_SEED_RANGE: i32 = 1000;

const ZOOM_MIN: f32 = 0.3;
const ZOOM_MAX: f32 = 0.9;

/// Random choices for one generation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RandomLayout {
    /// Mandelbrot mask rotation in degrees: 0, 90, 180 or 270
    pub rotation_degrees: f32,
    /// Mirror the Mandelbrot mask along X
    pub reflect_x: bool,
    /// Mirror the Mandelbrot mask along Z
    pub reflect_z: bool,
    /// Mandelbrot zoom in [0.3, 0.9)
    pub mandelbrot_zoom: f32,
    /// Julia constants, each component in [-1, 1)
    pub julia_constants: [Complex; 2],
    /// Island centres in world-scaled space (x, z)
    pub island_centers: Vec<(f32, f32)>,
    /// Seed for the octave offsets, in [0, 1000)
    pub noise_seed: i32,
}

impl RandomLayout {
    /// Draw a fresh layout. The draw order is fixed so a seeded source always yields
    /// the same layout.
    pub fn generate<R: RandomSource + ?Sized>(config: &TerrainConfig, rng: &mut R) -> Self {
        let rotation_degrees = rng.range_i32(0, 4) as f32 * 90.0;

        let julia_constants = [
            Complex::new(rng.range_f32(-1.0, 1.0), rng.range_f32(-1.0, 1.0)),
            Complex::new(rng.range_f32(-1.0, 1.0), rng.range_f32(-1.0, 1.0)),
        ];

        let scale = config.effective_scale();
        let island_x_max = config.x_size as f32 * scale / 10.0;
        let island_z_max = config.z_size as f32 * scale / 10.0;
        let island_centers = (0..config.island_count)
            .map(|_| {
                (
                    rng.range_f32(0.0, island_x_max),
                    rng.range_f32(0.0, island_z_max),
                )
            })
            .collect();

        let reflect_x = rng.coin();
        let reflect_z = rng.coin();
        let mandelbrot_zoom = rng.range_f32(ZOOM_MIN, ZOOM_MAX);
        let noise_seed = rng.range_i32(0, NOISE_SEED_RANGE);

        Self {
            rotation_degrees,
            reflect_x,
            reflect_z,
            mandelbrot_zoom,
            julia_constants,
            island_centers,
            noise_seed,
        }
    }

    /// A layout with no rotation, reflection or islands. Handy for tests and previews.
    pub fn neutral(noise_seed: i32) -> Self {
        Self {
            rotation_degrees: 0.0,
            reflect_x: false,
            reflect_z: false,
            mandelbrot_zoom: 1.0,
            julia_constants: [Complex::new(-0.8, 0.156), Complex::new(0.285, 0.01)],
            island_centers: Vec::new(),
            noise_seed,
        }
    }
}

/// Where the external collaborator should put the water plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaterPlane {
    /// World-space centre (x, y, z); y is the water height
    pub center: [f32; 3],
    /// Local scale (x, y, z)
    pub extent: [f32; 3],
}

impl WaterPlane {
    pub fn for_config(config: &TerrainConfig) -> Self {
        let scale = config.effective_scale();
        let offset = scale * scale * 10.0;
        Self {
            center: [offset, config.water_height, offset],
            extent: [
                scale * config.x_size.max(0) as f32,
                1.0,
                scale * config.z_size.max(0) as f32,
            ],
        }
    }
}
