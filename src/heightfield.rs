//! Heightfield synthesis: fBm noise shaped by a fractal mask.
//!
//! Every vertex height depends only on its grid coordinates and read-only inputs, so rows
//! are filled in parallel and the result matches a serial pass bit for bit.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{FractalMode, TerrainConfig};
use crate::curve::ResponseCurve;
use crate::fractal::{julia_mask, mandelbrot_mask};
use crate::grid::Grid;
use crate::layout::RandomLayout;
use crate::noise_field::{NoiseField, OctaveOffset};

/// Amplitude of the first octave
pub const INITIAL_AMPLITUDE: f32 = 12.0;
/// Amplitude decay per octave
pub const PERSISTENCE: f32 = 0.5;
/// Frequency of the noise that modulates the Mandelbrot mask
pub const MASK_NOISE_FREQUENCY: f64 = 0.05;

/// Unclamped linear interpolation; `t` outside [0, 1] extrapolates.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Vertex heights on an `(x_size + 1) x (z_size + 1)` grid.
#[derive(Clone, Debug, PartialEq)]
pub struct Heightfield {
    grid: Grid<f32>,
}

impl Heightfield {
    pub fn empty() -> Self {
        Self { grid: Grid::empty() }
    }

    /// Vertices along X (`x_size + 1`).
    pub fn columns(&self) -> usize {
        self.grid.width
    }

    /// Vertices along Z (`z_size + 1`).
    pub fn rows(&self) -> usize {
        self.grid.height
    }

    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }

    pub fn height(&self, x: usize, z: usize) -> f32 {
        *self.grid.get(x, z)
    }

    /// Row-major heights.
    pub fn heights(&self) -> &[f32] {
        self.grid.as_slice()
    }

    /// Vertex position `(x, height, z)`.
    pub fn vertex(&self, x: usize, z: usize) -> [f32; 3] {
        [x as f32, self.height(x, z), z as f32]
    }

    /// All vertex positions, row-major (z outer).
    pub fn positions(&self) -> Vec<[f32; 3]> {
        self.grid
            .iter()
            .map(|(x, z, &h)| [x as f32, h, z as f32])
            .collect()
    }

    /// `(min, max)` height, or `None` when empty.
    pub fn height_range(&self) -> Option<(f32, f32)> {
        self.grid.iter().fold(None, |acc, (_, _, &h)| match acc {
            None => Some((h, h)),
            Some((lo, hi)) => Some((lo.min(h), hi.max(h))),
        })
    }
}

/// Computes per-vertex heights for one generation run.
pub struct HeightfieldBuilder<'a> {
    config: &'a TerrainConfig,
    layout: &'a RandomLayout,
    offsets: &'a [OctaveOffset],
    noise: &'a NoiseField,
    height_curve: &'a dyn ResponseCurve,
    influence_curve: &'a dyn ResponseCurve,
    scale: f64,
}

impl<'a> HeightfieldBuilder<'a> {
    pub fn new(
        config: &'a TerrainConfig,
        layout: &'a RandomLayout,
        offsets: &'a [OctaveOffset],
        noise: &'a NoiseField,
        height_curve: &'a dyn ResponseCurve,
        influence_curve: &'a dyn ResponseCurve,
    ) -> Self {
        Self {
            config,
            layout,
            offsets,
            noise,
            height_curve,
            influence_curve,
            scale: config.effective_scale() as f64,
        }
    }

    /// Layered noise at `(x, z)` before masking.
    pub fn octave_height(&self, x: i32, z: i32) -> f32 {
        let mut amplitude = INITIAL_AMPLITUDE;
        let mut frequency = 1.0f64;
        let lacunarity = self.config.lacunarity as f64;
        let mut noise_height = 0.0f32;

        for offset in self.offsets.iter().take(self.config.octaves as usize) {
            if amplitude == 0.0 || !frequency.is_finite() {
                break;
            }
            let map_x = x as f64 / self.scale * frequency + offset.x as f64;
            let map_z = z as f64 / self.scale * frequency + offset.y as f64;
            let sample = self.noise.sample_2d(map_z, map_x);

            let contribution = self.height_curve.evaluate(sample) * amplitude;
            if contribution.is_finite() {
                noise_height += contribution;
            }

            frequency *= lacunarity;
            amplitude *= PERSISTENCE;
        }

        noise_height
    }

    /// Final height at vertex `(x, z)`.
    pub fn height_at(&self, x: i32, z: i32) -> f32 {
        let noise_height = self.octave_height(x, z);

        let (xf, zf) = (x as f32, z as f32);
        let grid_x = self.config.x_size as f32;
        let grid_z = self.config.z_size as f32;
        let max_iterations = self.config.max_iterations;
        let base = self.config.base_height;

        match self.config.mode {
            FractalMode::Julia => {
                let [c1, c2] = self.layout.julia_constants;
                let mask1 = julia_mask(xf, zf, grid_x, grid_z, c1, max_iterations);
                let mask2 = julia_mask(xf, zf, grid_x, grid_z, c2, max_iterations);
                // The summed mask may exceed 1; lerp extrapolates past noise_height
                lerp(base, noise_height, mask1 + mask2)
            }
            FractalMode::Mandelbrot => {
                let mask = mandelbrot_mask(xf, zf, grid_x, grid_z, self.layout, max_iterations);
                let intensity = self.noise.sample_unit(
                    x as f64 * MASK_NOISE_FREQUENCY,
                    z as f64 * MASK_NOISE_FREQUENCY,
                );
                let blended = lerp(0.0, mask, intensity);
                let blend_factor = self.influence_curve.evaluate(blended);
                lerp(base, noise_height, blend_factor)
            }
        }
    }

    /// Heights for the whole grid. Negative grid sizes give an empty heightfield.
    pub fn build(&self) -> Heightfield {
        self.fill(None).unwrap_or_else(Heightfield::empty)
    }

    /// Like [`build`](Self::build), checking `cancel` between rows.
    /// Returns `None` if cancellation was requested before the grid was complete.
    pub fn build_cancellable(&self, cancel: &AtomicBool) -> Option<Heightfield> {
        self.fill(Some(cancel))
    }

    fn fill(&self, cancel: Option<&AtomicBool>) -> Option<Heightfield> {
        let (columns, rows) = self.config.vertex_dims();
        let mut grid = Grid::new_with(columns, rows, 0.0f32);

        grid.par_fill_rows(|z, row| {
            if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
                return;
            }
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = self.height_at(x as i32, z as i32);
            }
        });

        if cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            return None;
        }
        Some(Heightfield { grid })
    }
}

/// Height of a single vertex. Convenience wrapper around [`HeightfieldBuilder::height_at`].
pub fn build_height(
    x: i32,
    z: i32,
    offsets: &[OctaveOffset],
    config: &TerrainConfig,
    layout: &RandomLayout,
    height_curve: &dyn ResponseCurve,
    influence_curve: &dyn ResponseCurve,
) -> f32 {
    let noise = NoiseField::default();
    HeightfieldBuilder::new(config, layout, offsets, &noise, height_curve, influence_curve)
        .height_at(x, z)
}
