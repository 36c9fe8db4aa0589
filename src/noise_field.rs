//! Coherent noise sampling and per-octave offsets.

use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Octave offsets are drawn from `[-OFFSET_RANGE, OFFSET_RANGE)` on each axis.
pub const OFFSET_RANGE: i32 = 100_000;

/// Perlin lattice period: the permutation table hashes corners modulo 256.
pub const NOISE_PERIOD: f64 = 256.0;

/// Translation applied to one octave's sample coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OctaveOffset {
    pub x: f32,
    pub y: f32,
}

/// Derive one offset per octave from `seed`.
///
/// The generator is seeded exactly once per call, so the same `(seed, octaves)` always
/// gives the same offsets.
pub fn derive_octave_offsets(seed: i32, octaves: usize) -> Vec<OctaveOffset> {
    let mut prng = ChaCha8Rng::seed_from_u64(seed as u64);
    (0..octaves)
        .map(|_| {
            let x = prng.gen_range(-OFFSET_RANGE..OFFSET_RANGE) as f32;
            let y = prng.gen_range(-OFFSET_RANGE..OFFSET_RANGE) as f32;
            OctaveOffset { x, y }
        })
        .collect()
}

/// 2D gradient noise sampler.
///
/// Wraps a fixed Perlin permutation; variety between runs comes from the octave offsets,
/// not from reseeding the sampler.
#[derive(Clone)]
pub struct NoiseField {
    perlin: Perlin,
}

impl Default for NoiseField {
    fn default() -> Self {
        Self::new(Perlin::DEFAULT_SEED)
    }
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }

    /// Noise in [0, 1].
    ///
    /// Coordinates are wrapped into one lattice period first, so arbitrarily large inputs
    /// sample the same tile instead of overflowing the lattice index.
    pub fn sample_unit(&self, x: f64, y: f64) -> f32 {
        if !(x.is_finite() && y.is_finite()) {
            return 0.5;
        }
        let v = self
            .perlin
            .get([x.rem_euclid(NOISE_PERIOD), y.rem_euclid(NOISE_PERIOD)]);
        ((v * 0.5 + 0.5) as f32).clamp(0.0, 1.0)
    }

    /// Noise in [-1, 1].
    pub fn sample_2d(&self, x: f64, y: f64) -> f32 {
        self.sample_unit(x, y) * 2.0 - 1.0
    }
}
