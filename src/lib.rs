//! Fractal terrain generation library
//!
//! Builds a terrain heightfield from layered Perlin noise shaped by Mandelbrot or Julia
//! escape-time masks, and indexes it into a triangle mesh.

pub mod config;
pub mod curve;
pub mod export;
pub mod fractal;
pub mod generator;
pub mod grid;
pub mod heightfield;
pub mod layout;
pub mod mesh;
pub mod noise_field;
pub mod random;

pub use config::{ConfigError, FractalMode, TerrainConfig, TerrainFile};
pub use curve::{Curve, ResponseCurve};
pub use generator::{TerrainGenerator, TerrainOutput};
pub use heightfield::Heightfield;
pub use layout::{RandomLayout, WaterPlane};
pub use mesh::{MeshSink, TerrainMesh};
pub use random::RandomSource;
