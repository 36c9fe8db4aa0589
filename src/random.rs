//! The random source a generation run draws its layout from.
//!
//! Any `rand::Rng` qualifies; seed a `ChaCha8Rng` for reproducible runs.

use rand::Rng;

/// Uniform draws needed to lay out a terrain.
pub trait RandomSource {
    /// Uniform float in `[lo, hi)`. Returns `lo` when the range is empty or its width
    /// is not finite.
    fn range_f32(&mut self, lo: f32, hi: f32) -> f32;

    /// Uniform integer in `[lo, hi)`. Returns `lo` when the range is empty.
    fn range_i32(&mut self, lo: i32, hi: i32) -> i32;

    /// Fair coin: a unit float compared against 0.5.
    fn coin(&mut self) -> bool;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn range_f32(&mut self, lo: f32, hi: f32) -> f32 {
        if !(hi > lo) || !(hi - lo).is_finite() {
            return lo;
        }
        self.gen_range(lo..hi)
    }

    fn range_i32(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.gen_range(lo..hi)
    }

    fn coin(&mut self) -> bool {
        self.gen::<f32>() > 0.5
    }
}
