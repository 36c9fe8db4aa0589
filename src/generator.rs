//! Terrain generation orchestrator.
//!
//! A run draws a [`RandomLayout`], derives the octave offsets from it, fills the
//! heightfield and indexes the triangles. Nothing here touches a scene; [`MeshSink`]
//! is the seam to whatever does.

use std::sync::atomic::AtomicBool;

use log::{debug, info};

use crate::config::TerrainConfig;
use crate::curve::{Curve, ResponseCurve};
use crate::heightfield::{Heightfield, HeightfieldBuilder};
use crate::layout::{RandomLayout, WaterPlane};
use crate::mesh::{build_triangles, MeshSink, TerrainMesh};
use crate::noise_field::{derive_octave_offsets, NoiseField, OctaveOffset};
use crate::random::RandomSource;

/// Everything one generation run produces
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainOutput {
    pub heightfield: Heightfield,
    /// Triangle list, `x_size * z_size * 6` indices
    pub triangles: Vec<u32>,
    /// Random choices behind this terrain; replay with [`TerrainGenerator::generate_with_layout`]
    pub layout: RandomLayout,
    pub offsets: Vec<OctaveOffset>,
    pub water_plane: WaterPlane,
    pub mesh_scale: f32,
}

impl TerrainOutput {
    /// Package positions and indices for a mesh consumer.
    pub fn mesh(&self) -> TerrainMesh {
        TerrainMesh {
            positions: self.heightfield.positions(),
            indices: self.triangles.clone(),
            mesh_scale: self.mesh_scale,
        }
    }
}

/// Owns the configuration and response curves; each `generate` call is an independent run.
pub struct TerrainGenerator {
    config: TerrainConfig,
    height_curve: Box<dyn ResponseCurve>,
    influence_curve: Box<dyn ResponseCurve>,
    noise: NoiseField,
}

impl TerrainGenerator {
    pub fn new(
        config: TerrainConfig,
        height_curve: impl ResponseCurve + 'static,
        influence_curve: impl ResponseCurve + 'static,
    ) -> Self {
        Self {
            config,
            height_curve: Box::new(height_curve),
            influence_curve: Box::new(influence_curve),
            noise: NoiseField::default(),
        }
    }

    /// Identity height curve and a linear [0, 1] influence curve.
    pub fn with_default_curves(config: TerrainConfig) -> Self {
        Self::new(config, Curve::identity(), Curve::unit_ramp())
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Run with a freshly drawn layout.
    pub fn generate<R: RandomSource + ?Sized>(&self, rng: &mut R) -> TerrainOutput {
        let layout = RandomLayout::generate(&self.config, rng);
        self.generate_with_layout(layout)
    }

    /// Run with a known layout. The same layout always reproduces the same output.
    pub fn generate_with_layout(&self, layout: RandomLayout) -> TerrainOutput {
        let offsets = self.offsets_for(&layout);
        let heightfield = self.builder(&layout, &offsets).build();
        self.finish(layout, offsets, heightfield)
    }

    /// Run with a fresh layout, giving up between rows once `cancel` is set.
    pub fn generate_cancellable<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        cancel: &AtomicBool,
    ) -> Option<TerrainOutput> {
        let layout = RandomLayout::generate(&self.config, rng);
        let offsets = self.offsets_for(&layout);
        let heightfield = self.builder(&layout, &offsets).build_cancellable(cancel);
        match heightfield {
            Some(heightfield) => Some(self.finish(layout, offsets, heightfield)),
            None => {
                info!("Terrain generation cancelled");
                None
            }
        }
    }

    /// Hand a finished run to the scene-side collaborator.
    pub fn present(&self, output: &TerrainOutput, sink: &mut dyn MeshSink) {
        sink.upload_mesh(&output.mesh());
        sink.place_water(&output.water_plane);
    }

    fn offsets_for(&self, layout: &RandomLayout) -> Vec<OctaveOffset> {
        debug!(
            "Layout: rotation {}°, reflect ({}, {}), zoom {:.3}, julia {:?}, noise seed {}",
            layout.rotation_degrees,
            layout.reflect_x,
            layout.reflect_z,
            layout.mandelbrot_zoom,
            layout.julia_constants,
            layout.noise_seed,
        );
        derive_octave_offsets(layout.noise_seed, self.config.octaves as usize)
    }

    fn builder<'a>(
        &'a self,
        layout: &'a RandomLayout,
        offsets: &'a [OctaveOffset],
    ) -> HeightfieldBuilder<'a> {
        HeightfieldBuilder::new(
            &self.config,
            layout,
            offsets,
            &self.noise,
            self.height_curve.as_ref(),
            self.influence_curve.as_ref(),
        )
    }

    fn finish(
        &self,
        layout: RandomLayout,
        offsets: Vec<OctaveOffset>,
        heightfield: Heightfield,
    ) -> TerrainOutput {
        let triangles = build_triangles(self.config.x_size, self.config.z_size);
        info!(
            "Generated {} terrain: {} vertices, {} triangles",
            self.config.mode,
            heightfield.len(),
            triangles.len() / 3
        );
        TerrainOutput {
            heightfield,
            triangles,
            layout,
            offsets,
            water_plane: WaterPlane::for_config(&self.config),
            mesh_scale: self.config.mesh_scale,
        }
    }
}
