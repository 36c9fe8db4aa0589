//! Export of generated terrain: heightmap PNG, Wavefront OBJ, layout JSON and raw buffers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use image::{ImageBuffer, Luma};
use serde::Serialize;
use thiserror::Error;

use crate::config::TerrainConfig;
use crate::generator::TerrainOutput;
use crate::heightfield::Heightfield;
use crate::layout::{RandomLayout, WaterPlane};
use crate::mesh::TerrainMesh;

/// Errors that can occur while exporting terrain.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Nothing to export: the terrain is empty")]
    EmptyTerrain,
}

/// Save the heightfield as a 16-bit grayscale PNG, normalised to its own height range.
pub fn export_heightmap_png(field: &Heightfield, path: &Path) -> Result<(), ExportError> {
    let (min_h, max_h) = field.height_range().ok_or(ExportError::EmptyTerrain)?;
    let range = max_h - min_h;

    let img = ImageBuffer::from_fn(field.columns() as u32, field.rows() as u32, |x, y| {
        let h = field.height(x as usize, y as usize);
        let t = if range > 0.0 { (h - min_h) / range } else { 0.0 };
        Luma([(t.clamp(0.0, 1.0) * u16::MAX as f32).round() as u16])
    });
    img.save(path)?;
    Ok(())
}

/// Write the mesh as Wavefront OBJ with per-vertex normals.
pub fn export_obj(mesh: &TerrainMesh, path: &Path) -> Result<(), ExportError> {
    if mesh.positions.is_empty() {
        return Err(ExportError::EmptyTerrain);
    }
    let mut out = BufWriter::new(File::create(path)?);

    writeln!(out, "# fractal terrain")?;
    writeln!(out, "# vertices: {}, triangles: {}", mesh.positions.len(), mesh.triangle_count())?;
    for [x, y, z] in &mesh.positions {
        writeln!(out, "v {} {} {}", x, y, z)?;
    }
    for [x, y, z] in mesh.normals() {
        writeln!(out, "vn {} {} {}", x, y, z)?;
    }
    // OBJ indices are 1-based
    for tri in mesh.indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] + 1, tri[1] + 1, tri[2] + 1);
        writeln!(out, "f {a}//{a} {b}//{b} {c}//{c}")?;
    }
    out.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct LayoutSummary<'a> {
    config: &'a TerrainConfig,
    layout: &'a RandomLayout,
    water_plane: &'a WaterPlane,
    vertex_count: usize,
    triangle_count: usize,
    height_range: Option<(f32, f32)>,
}

/// Write the config and drawn layout as pretty JSON, for diagnostics and object placement.
pub fn export_layout_json(
    config: &TerrainConfig,
    output: &TerrainOutput,
    path: &Path,
) -> Result<(), ExportError> {
    let summary = LayoutSummary {
        config,
        layout: &output.layout,
        water_plane: &output.water_plane,
        vertex_count: output.heightfield.len(),
        triangle_count: output.triangles.len() / 3,
        height_range: output.heightfield.height_range(),
    };
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, &summary)?;
    out.flush()?;
    Ok(())
}

/// Dump positions (`f32` xyz) and indices (`u32`) as little-endian binary buffers.
pub fn export_raw_buffers(
    mesh: &TerrainMesh,
    vertex_path: &Path,
    index_path: &Path,
) -> Result<(), ExportError> {
    let components: &[f32] = bytemuck::cast_slice(&mesh.positions);
    let vertex_bytes: Vec<u8> = components.iter().flat_map(|v| v.to_le_bytes()).collect();
    let index_bytes: Vec<u8> = mesh.indices.iter().flat_map(|i| i.to_le_bytes()).collect();
    std::fs::write(vertex_path, vertex_bytes)?;
    std::fs::write(index_path, index_bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FractalMode;
    use crate::generator::TerrainGenerator;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("fractal_terrain_{}_{}", std::process::id(), name))
    }

    fn sample_output() -> (TerrainConfig, TerrainOutput) {
        let config = TerrainConfig {
            x_size: 6,
            z_size: 4,
            scale: 3.0,
            octaves: 2,
            max_iterations: 50,
            mode: FractalMode::Mandelbrot,
            ..Default::default()
        };
        let output = TerrainGenerator::with_default_curves(config.clone())
            .generate(&mut ChaCha8Rng::seed_from_u64(12));
        (config, output)
    }

    #[test]
    fn test_png_export() {
        let (_, output) = sample_output();
        let path = temp_path("height.png");
        export_heightmap_png(&output.heightfield, &path).expect("png export");

        let img = image::open(&path).expect("readable png");
        assert_eq!((img.width(), img.height()), (7, 5));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_png_export_empty_terrain() {
        let err = export_heightmap_png(&Heightfield::empty(), &temp_path("empty.png")).unwrap_err();
        assert!(matches!(err, ExportError::EmptyTerrain));
    }

    #[test]
    fn test_obj_export() {
        let (_, output) = sample_output();
        let path = temp_path("mesh.obj");
        export_obj(&output.mesh(), &path).expect("obj export");

        let text = std::fs::read_to_string(&path).expect("readable obj");
        assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), 35);
        assert_eq!(text.lines().filter(|l| l.starts_with("vn ")).count(), 35);
        assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 48);
        assert!(text.contains("f 1//1 8//8 2//2"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_layout_json_export() {
        let (config, output) = sample_output();
        let path = temp_path("layout.json");
        export_layout_json(&config, &output, &path).expect("json export");

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("readable json"))
                .expect("valid json");
        assert_eq!(value["vertex_count"], 35);
        assert_eq!(value["triangle_count"], 48);
        assert_eq!(value["config"]["mode"], "mandelbrot");
        assert_eq!(
            value["layout"]["noise_seed"].as_i64(),
            Some(output.layout.noise_seed as i64)
        );
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_raw_buffer_sizes() {
        let (_, output) = sample_output();
        let (vpath, ipath) = (temp_path("verts.bin"), temp_path("indices.bin"));
        export_raw_buffers(&output.mesh(), &vpath, &ipath).expect("raw export");

        assert_eq!(std::fs::metadata(&vpath).expect("vertex file").len(), 35 * 12);
        assert_eq!(std::fs::metadata(&ipath).expect("index file").len(), 48 * 3 * 4);
        let _ = std::fs::remove_file(&vpath);
        let _ = std::fs::remove_file(&ipath);
    }

    #[test]
    fn test_raw_buffers_are_little_endian() {
        let (_, output) = sample_output();
        let mesh = output.mesh();
        let (vpath, ipath) = (temp_path("le_verts.bin"), temp_path("le_indices.bin"));
        export_raw_buffers(&mesh, &vpath, &ipath).expect("raw export");

        let index_bytes = std::fs::read(&ipath).expect("index file");
        let indices: Vec<u32> = index_bytes
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        assert_eq!(indices, mesh.indices);

        let vertex_bytes = std::fs::read(&vpath).expect("vertex file");
        let second: Vec<f32> = vertex_bytes[12..24]
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        assert_eq!(second, mesh.positions[1].to_vec());
        let _ = std::fs::remove_file(&vpath);
        let _ = std::fs::remove_file(&ipath);
    }
}
