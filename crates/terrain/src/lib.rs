#![warn(missing_docs)]
//! Heightmap terrain: raw heightmap decoding, static mesh building and
//! world-space height queries.

mod heightmap;
mod mesh;
mod terrain;

pub use heightmap::{Heightmap, HeightmapError, PixelFormat};
pub use mesh::{generate_index_buffer, generate_normals, TerrainMesh, TerrainScale};
pub use terrain::{Terrain, NO_HEIGHT};
