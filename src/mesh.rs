//! Triangle indexing for the vertex grid, plus the hand-off to whatever consumes the mesh.

use rayon::prelude::*;

use crate::layout::WaterPlane;

/// Triangle indices for an `x_size` by `z_size` cell grid.
///
/// Each cell emits `(v, v + x_size + 1, v + 1)` and `(v + 1, v + x_size + 1, v + x_size + 2)`,
/// where `v` is the row-major index of its lower-left vertex. Cells are visited z outer,
/// x inner. Non-positive sizes give an empty buffer.
pub fn build_triangles(x_size: i32, z_size: i32) -> Vec<u32> {
    if x_size <= 0 || z_size <= 0 {
        return Vec::new();
    }
    let (xs, zs) = (x_size as u32, z_size as u32);
    let stride = xs + 1;

    (0..zs)
        .into_par_iter()
        .flat_map_iter(move |z| {
            (0..xs).flat_map(move |x| {
                let v = z * stride + x;
                [v, v + stride, v + 1, v + 1, v + stride, v + stride + 1]
            })
        })
        .collect()
}

/// Area-weighted vertex normals. Vertices not referenced by any triangle get +Y.
pub fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![[0.0f32; 3]; positions.len()];

    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let (pa, pb, pc) = (positions[a], positions[b], positions[c]);
        let e1 = [pb[0] - pa[0], pb[1] - pa[1], pb[2] - pa[2]];
        let e2 = [pc[0] - pa[0], pc[1] - pa[1], pc[2] - pa[2]];
        // Unnormalised cross product: length is twice the triangle area
        let n = [
            e1[1] * e2[2] - e1[2] * e2[1],
            e1[2] * e2[0] - e1[0] * e2[2],
            e1[0] * e2[1] - e1[1] * e2[0],
        ];
        for &i in &[a, b, c] {
            for k in 0..3 {
                normals[i][k] += n[k];
            }
        }
    }

    for n in &mut normals {
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        *n = if len > 0.0 && len.is_finite() {
            [n[0] / len, n[1] / len, n[2] / len]
        } else {
            [0.0, 1.0, 0.0]
        };
    }
    normals
}

/// Finished terrain geometry in the form a renderer or physics engine expects.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainMesh {
    /// Vertex positions `(x, height, z)`, row-major
    pub positions: Vec<[f32; 3]>,
    /// Triangle list indices into `positions`
    pub indices: Vec<u32>,
    /// Uniform scale the consumer should apply when displaying the mesh
    pub mesh_scale: f32,
}

impl TerrainMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn normals(&self) -> Vec<[f32; 3]> {
        compute_normals(&self.positions, &self.indices)
    }
}

/// External collaborator that turns generated data into scene objects.
pub trait MeshSink {
    /// Replace the terrain mesh (and any collision mesh built from it).
    fn upload_mesh(&mut self, mesh: &TerrainMesh);

    /// Create or move the companion water plane.
    fn place_water(&mut self, plane: &WaterPlane);
}
