//! Placed terrain: owns the mesh, its local-to-world transform, and answers
//! world-space height queries.

use crate::heightmap::{Heightmap, HeightmapError};
use crate::mesh::{TerrainMesh, TerrainScale};
use glam::{Mat4, UVec2, Vec3};
use rainscape_core::Ground;
use rainscape_render::{AttributeStream, DrawCall, PrimitiveKind, RenderSink};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Height reported where there is no terrain.
pub const NO_HEIGHT: f32 = f32::MIN;

/// Terrain instance. Starts unloaded: no mesh, [`NO_HEIGHT`] everywhere, renders nothing.
#[derive(Debug, Clone)]
pub struct Terrain {
    scale: TerrainScale,
    slope_blend: bool,
    mesh: Option<TerrainMesh>,
    local_to_world: Mat4,
    world_to_local: Mat4,
    normal_lines: Vec<Vec3>,
}

impl Default for Terrain {
    fn default() -> Self {
        Self::new(TerrainScale::default())
    }
}

impl Terrain {
    /// Unloaded terrain that will build meshes at `scale`.
    pub fn new(scale: TerrainScale) -> Self {
        Self {
            scale,
            slope_blend: false,
            mesh: None,
            local_to_world: Mat4::IDENTITY,
            world_to_local: Mat4::IDENTITY,
            normal_lines: Vec::new(),
        }
    }

    /// Builder: derive texture-0 weights from slope instead of height.
    pub fn with_slope_blend(mut self, enabled: bool) -> Self {
        self.slope_blend = enabled;
        self
    }

    /// Load a raw heightmap and rebuild the mesh.
    ///
    /// On error the previous mesh (if any) is kept.
    #[instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load_heightmap<P: AsRef<Path>>(
        &mut self,
        path: P,
        bits_per_pixel: u32,
        width: u32,
        height: u32,
    ) -> Result<(), HeightmapError> {
        match Heightmap::load(path, bits_per_pixel, width, height) {
            Ok(heightmap) => {
                self.set_heightmap(&heightmap);
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "heightmap load failed");
                Err(err)
            }
        }
    }

    /// Rebuild the mesh from an already decoded heightmap.
    pub fn set_heightmap(&mut self, heightmap: &Heightmap) {
        let mut mesh = TerrainMesh::build(heightmap, self.scale);
        if self.slope_blend {
            mesh.apply_slope_blend();
        }
        self.normal_lines = mesh
            .positions()
            .iter()
            .zip(mesh.normals())
            .flat_map(|(&p, &n)| [p, p + n])
            .collect();
        info!(
            width = heightmap.width(),
            height = heightmap.height(),
            triangles = mesh.indices().len() / 3,
            "terrain loaded"
        );
        self.mesh = Some(mesh);
    }

    /// Place the terrain in the world.
    pub fn set_placement(&mut self, local_to_world: Mat4) {
        self.local_to_world = local_to_world;
        self.world_to_local = local_to_world.inverse();
    }

    /// Current local-to-world transform.
    pub fn placement(&self) -> Mat4 {
        self.local_to_world
    }

    /// Whether a heightmap has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.mesh.is_some()
    }

    /// The built mesh, if loaded.
    pub fn mesh(&self) -> Option<&TerrainMesh> {
        self.mesh.as_ref()
    }

    /// Loaded grid dimensions, or zero.
    pub fn dimensions(&self) -> UVec2 {
        self.mesh.as_ref().map_or(UVec2::ZERO, TerrainMesh::dimensions)
    }

    /// Scale used for meshes built by this terrain.
    pub fn scale(&self) -> TerrainScale {
        self.scale
    }

    /// World-space terrain height under `position`, or [`NO_HEIGHT`] when
    /// unloaded or outside the grid.
    pub fn height_at(&self, position: Vec3) -> f32 {
        let Some(mesh) = &self.mesh else {
            return NO_HEIGHT;
        };
        let dims = mesh.dimensions();
        let scale = mesh.scale();
        let local = self.world_to_local.transform_point3(position);
        let half = scale.extent(dims) * 0.5;
        let grid_x = (local.x + half.x) / scale.block_scale;
        let grid_z = (local.z + half.y) / scale.block_scale;

        let Some((u0, fu)) = cell(grid_x, dims.x) else {
            return NO_HEIGHT;
        };
        let Some((v0, fv)) = cell(grid_z, dims.y) else {
            return NO_HEIGHT;
        };

        let p00 = mesh.vertex(u0, v0);
        let p10 = mesh.vertex(u0 + 1, v0);
        let p01 = mesh.vertex(u0, v0 + 1);
        let p11 = mesh.vertex(u0 + 1, v0 + 1);

        let (du, dv) = if fu > fv {
            (p10 - p00, p11 - p10)
        } else {
            (p11 - p01, p01 - p00)
        };
        let surface = p00 + du * fu + dv * fv;
        self.local_to_world.transform_point3(surface).y
    }

    /// Submit the terrain as an indexed triangle list. No-op when unloaded.
    pub fn render(&self, sink: &mut dyn RenderSink) {
        let Some(mesh) = &self.mesh else {
            return;
        };
        sink.submit(
            DrawCall::new("terrain", PrimitiveKind::Triangles, mesh.positions())
                .with_attribute(AttributeStream::from_pod("normal", 3, mesh.normals()))
                .with_attribute(AttributeStream::from_pod("color", 4, mesh.colors()))
                .with_attribute(AttributeStream::from_pod("uv", 2, mesh.uvs()))
                .with_indices(mesh.indices())
                .with_transform(self.local_to_world),
        );
    }

    /// Submit one unit line per vertex along its normal. No-op when unloaded.
    pub fn render_normals(&self, sink: &mut dyn RenderSink) {
        if self.normal_lines.is_empty() || self.mesh.is_none() {
            return;
        }
        sink.submit(
            DrawCall::new("terrain_normals", PrimitiveKind::Lines, &self.normal_lines)
                .with_transform(self.local_to_world),
        );
    }
}

/// Cell index and in-cell fraction for a grid coordinate, or `None` outside
/// `[0, samples - 1]`. The far edge maps to the last cell.
fn cell(coord: f32, samples: u32) -> Option<(u32, f32)> {
    let last = (samples - 1) as f32;
    if !(0.0..=last).contains(&coord) {
        return None;
    }
    let index = (coord.floor() as u32).min(samples - 2);
    Some((index, coord - index as f32))
}

impl Ground for Terrain {
    fn height_at(&self, position: Vec3) -> f32 {
        Terrain::height_at(self, position)
    }
}
