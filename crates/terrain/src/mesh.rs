//! Static terrain mesh: positions, normals, blend weights, UVs and a triangle list.

use crate::heightmap::Heightmap;
use glam::{UVec2, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// World-unit scale of a terrain grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainScale {
    /// World height of a sample of value 1.
    pub height_scale: f32,
    /// World distance between neighbouring samples.
    pub block_scale: f32,
}

impl Default for TerrainScale {
    fn default() -> Self {
        Self {
            height_scale: 500.0,
            block_scale: 2.0,
        }
    }
}

impl TerrainScale {
    /// World extent of a `dimensions` grid in X and Z.
    pub fn extent(&self, dimensions: UVec2) -> Vec2 {
        (dimensions - UVec2::ONE).as_vec2() * self.block_scale
    }
}

/// Triangulated heightmap in terrain-local space, centered on the origin in XZ.
#[derive(Debug, Clone)]
pub struct TerrainMesh {
    dimensions: UVec2,
    scale: TerrainScale,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    colors: Vec<Vec4>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
}

fn percentage(value: f32, min: f32, max: f32) -> f32 {
    (value.clamp(min, max) - min) / (max - min)
}

impl TerrainMesh {
    /// Build the mesh for `heightmap`.
    #[instrument(skip(heightmap), fields(width = heightmap.width(), height = heightmap.height()))]
    pub fn build(heightmap: &Heightmap, scale: TerrainScale) -> Self {
        let dimensions = UVec2::new(heightmap.width(), heightmap.height());
        let half = scale.extent(dimensions) * 0.5;
        let last = (dimensions - UVec2::ONE).as_vec2();

        let count = heightmap.samples().len();
        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        let mut uvs = Vec::with_capacity(count);

        for j in 0..dimensions.y {
            for i in 0..dimensions.x {
                let h = heightmap.sample(i, j);
                let st = Vec2::new(i as f32, j as f32) / last;
                let xz = st * scale.extent(dimensions) - half;
                positions.push(Vec3::new(xz.x, h * scale.height_scale, xz.y));

                // Texture 0 below 3/4 height, texture 2 fading out above it.
                let t0 = 1.0 - percentage(h, 0.0, 0.75);
                let t2 = 1.0 - percentage(h, 0.75, 1.0);
                colors.push(Vec4::new(t0, t0, t0, t2));
                uvs.push(st);
            }
        }

        let indices = generate_index_buffer(dimensions.x, dimensions.y);
        let normals = generate_normals(&positions, &indices);
        debug!(
            vertices = positions.len(),
            triangles = indices.len() / 3,
            "terrain mesh built"
        );

        Self {
            dimensions,
            scale,
            positions,
            normals,
            colors,
            uvs,
            indices,
        }
    }

    /// Replace the texture-0 weight with a slope term, `saturate(dot(n, up) - 0.1)`.
    pub fn apply_slope_blend(&mut self) {
        for (color, normal) in self.colors.iter_mut().zip(&self.normals) {
            let t0 = (normal.dot(Vec3::Y) - 0.1).clamp(0.0, 1.0);
            *color = Vec4::new(t0, t0, t0, color.w);
        }
    }

    /// Grid size in samples.
    pub fn dimensions(&self) -> UVec2 {
        self.dimensions
    }

    /// Scale the mesh was built with.
    pub fn scale(&self) -> TerrainScale {
        self.scale
    }

    /// Vertex positions, row-major.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Unit vertex normals.
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    /// Texture blend weights `(t0, t0, t0, t2)`.
    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    /// Normalized grid coordinates.
    pub fn uvs(&self) -> &[Vec2] {
        &self.uvs
    }

    /// Triangle list.
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Local-space position of grid vertex `(i, j)`.
    pub fn vertex(&self, i: u32, j: u32) -> Vec3 {
        self.positions[(j * self.dimensions.x + i) as usize]
    }
}

/// Two triangles per grid cell, `6 * (width - 1) * (height - 1)` indices.
///
/// Returns an empty buffer for grids narrower than two samples.
pub fn generate_index_buffer(width: u32, height: u32) -> Vec<u32> {
    if width < 2 || height < 2 {
        return Vec::new();
    }
    let mut indices = Vec::with_capacity(6 * (width as usize - 1) * (height as usize - 1));
    for j in 0..height - 1 {
        for i in 0..width - 1 {
            let v0 = j * width + i;
            indices.extend_from_slice(&[v0, v0 + width + 1, v0 + 1]);
            indices.extend_from_slice(&[v0, v0 + width, v0 + width + 1]);
        }
    }
    indices
}

/// Area-independent vertex normals: each face normal is added to its three
/// vertices, then every sum is normalized.
pub fn generate_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let (v0, v1, v2) = (positions[a], positions[b], positions[c]);
        let Some(face) = (v1 - v0).cross(v2 - v0).try_normalize() else {
            continue;
        };
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    for normal in &mut normals {
        *normal = normal.try_normalize().unwrap_or(Vec3::Y);
    }
    normals
}
