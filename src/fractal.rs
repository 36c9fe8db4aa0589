//! Escape-time fractal masks (Mandelbrot and Julia).
//!
//! Each mask maps a grid vertex to the fraction of the iteration budget its orbit survived:
//! 1.0 for points inside the set, near 0.0 for points that escape immediately.

use serde::{Deserialize, Serialize};

use crate::layout::RandomLayout;

/// Iteration budget used by the terrain generator.
pub const MAX_ITERATIONS: u32 = 2000;

/// Orbits with `|z|^2 >= ESCAPE_RADIUS_SQ` are considered escaped.
pub const ESCAPE_RADIUS_SQ: f32 = 4.0;

/// A point in the complex plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    pub re: f32,
    pub im: f32,
}

impl Complex {
    pub const ZERO: Complex = Complex { re: 0.0, im: 0.0 };

    pub const fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }

    pub fn norm_sqr(self) -> f32 {
        self.re * self.re + self.im * self.im
    }

    /// `self^2 + c`
    fn square_add(self, c: Complex) -> Complex {
        Complex {
            re: self.re * self.re - self.im * self.im + c.re,
            im: 2.0 * self.re * self.im + c.im,
        }
    }
}

/// Iterate `z = z^2 + c` from `z0` and return how many steps ran before escape.
///
/// Overflowed (infinite or NaN) magnitudes fail the `< ESCAPE_RADIUS_SQ` test and count as
/// escaped, so the loop always ends within `max_iterations`.
pub fn escape_time(z0: Complex, c: Complex, max_iterations: u32) -> u32 {
    let mut z = z0;
    let mut iterations = 0;
    while iterations < max_iterations && z.norm_sqr() < ESCAPE_RADIUS_SQ {
        z = z.square_add(c);
        iterations += 1;
    }
    iterations
}

/// `escape_time` normalised to [0, 1]. A zero budget yields 0.
pub fn escape_fraction(z0: Complex, c: Complex, max_iterations: u32) -> f32 {
    if max_iterations == 0 {
        return 0.0;
    }
    let iterations = escape_time(z0, c, max_iterations);
    (iterations as f32 / max_iterations as f32).clamp(0.0, 1.0)
}

/// Rotate `(x, z)` about the origin by `degrees`.
pub fn rotate(x: f32, z: f32, degrees: f32) -> (f32, f32) {
    let (sin, cos) = degrees.to_radians().sin_cos();
    (x * cos - z * sin, x * sin + z * cos)
}

/// `v / extent`, or 0 for an empty extent.
fn normalize(v: f32, extent: f32) -> f32 {
    if extent > 0.0 {
        v / extent
    } else {
        0.0
    }
}

/// Mandelbrot mask at grid vertex `(x, z)` on a `grid_x` by `grid_z` cell grid.
///
/// The vertex is mirrored per the layout's reflect flags, rotated by its angle, then mapped
/// into the plane as `c = (x/grid_x * zoom * 1.5 - 0.5, z/grid_z * zoom * 1.5 - 0.25)`.
pub fn mandelbrot_mask(
    x: f32,
    z: f32,
    grid_x: f32,
    grid_z: f32,
    layout: &RandomLayout,
    max_iterations: u32,
) -> f32 {
    let x = if layout.reflect_x { grid_x - x } else { x };
    let z = if layout.reflect_z { grid_z - z } else { z };
    let (x, z) = rotate(x, z, layout.rotation_degrees);

    let zoom = layout.mandelbrot_zoom;
    let c = Complex::new(
        normalize(x, grid_x) * zoom * 1.5 - 0.5,
        normalize(z, grid_z) * zoom * 1.5 - 0.25,
    );
    escape_fraction(Complex::ZERO, c, max_iterations)
}

/// Julia mask for `constant` at grid vertex `(x, z)`. No rotation or reflection.
///
/// The orbit starts at `(x/grid_x * 3 - 1.5, z/grid_z * 3 - 1)`.
pub fn julia_mask(
    x: f32,
    z: f32,
    grid_x: f32,
    grid_z: f32,
    constant: Complex,
    max_iterations: u32,
) -> f32 {
    let z0 = Complex::new(
        normalize(x, grid_x) * 3.0 - 1.5,
        normalize(z, grid_z) * 3.0 - 1.0,
    );
    escape_fraction(z0, constant, max_iterations)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout(rotation: f32, reflect_x: bool, reflect_z: bool) -> RandomLayout {
        RandomLayout {
            rotation_degrees: rotation,
            reflect_x,
            reflect_z,
            ..RandomLayout::neutral(0)
        }
    }

    #[test]
    fn test_origin_never_escapes() {
        assert_eq!(escape_time(Complex::ZERO, Complex::ZERO, MAX_ITERATIONS), MAX_ITERATIONS);
        assert_eq!(escape_fraction(Complex::ZERO, Complex::ZERO, MAX_ITERATIONS), 1.0);
    }

    #[test]
    fn test_far_point_escapes_fast() {
        let iterations = escape_time(Complex::ZERO, Complex::new(2.0, 2.0), MAX_ITERATIONS);
        assert!(iterations <= 3, "took {} iterations", iterations);
        assert!(escape_fraction(Complex::ZERO, Complex::new(2.0, 2.0), MAX_ITERATIONS) < 0.01);
    }

    #[test]
    fn test_overflow_counts_as_escaped() {
        let huge = Complex::new(f32::MAX, f32::MAX);
        assert_eq!(escape_time(huge, huge, 100), 0);
        let nan = Complex::new(f32::NAN, 0.0);
        assert_eq!(escape_time(nan, Complex::ZERO, 100), 0);
    }

    #[test]
    fn test_zero_budget() {
        assert_eq!(escape_fraction(Complex::ZERO, Complex::ZERO, 0), 0.0);
    }

    #[test]
    fn test_mandelbrot_mask_inside_point() {
        // x/grid_x = 1/3 and z/grid_z = 1/6 map to c ~ 0 with zoom 1
        let mask = mandelbrot_mask(10.0, 10.0, 30.0, 60.0, &layout(0.0, false, false), 500);
        assert_eq!(mask, 1.0);
    }

    #[test]
    fn test_rotation() {
        let (x, z) = rotate(1.0, 0.0, 90.0);
        assert!(x.abs() < 1e-6 && (z - 1.0).abs() < 1e-6);
        let (x, z) = rotate(3.0, 4.0, 180.0);
        assert!((x + 3.0).abs() < 1e-5 && (z + 4.0).abs() < 1e-5);
        assert_eq!(rotate(3.0, 4.0, 0.0), (3.0, 4.0));
    }

    #[test]
    fn test_reflection_mirrors_mask() {
        let plain = layout(0.0, false, false);
        let mirrored = layout(0.0, true, true);
        for &(x, z) in &[(0.0, 0.0), (3.0, 7.0), (12.0, 5.0)] {
            let a = mandelbrot_mask(x, z, 16.0, 16.0, &plain, 200);
            let b = mandelbrot_mask(16.0 - x, 16.0 - z, 16.0, 16.0, &mirrored, 200);
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_masks_bounded() {
        let constants = [Complex::new(-0.8, 0.156), Complex::new(0.99, -0.99), Complex::ZERO];
        for rotation in [0.0, 90.0, 180.0, 270.0] {
            let layout = layout(rotation, rotation > 100.0, rotation < 100.0);
            for z in 0..=20 {
                for x in 0..=20 {
                    let (xf, zf) = (x as f32, z as f32);
                    let m = mandelbrot_mask(xf, zf, 20.0, 20.0, &layout, 64);
                    assert!((0.0..=1.0).contains(&m));
                    for c in constants {
                        let j = julia_mask(xf, zf, 20.0, 20.0, c, 64);
                        assert!((0.0..=1.0).contains(&j));
                    }
                }
            }
        }
    }

    #[test]
    fn test_zero_extent_is_finite() {
        let m = mandelbrot_mask(0.0, 0.0, 0.0, 0.0, &layout(90.0, true, true), 50);
        let j = julia_mask(0.0, 0.0, 0.0, 0.0, Complex::new(0.3, 0.5), 50);
        assert!(m.is_finite() && j.is_finite());
    }
}
