//! Property tests for terrain index buffers and height queries.

use glam::Vec3;
use proptest::prelude::*;
use rainscape_terrain::{generate_index_buffer, Heightmap, Terrain, NO_HEIGHT};

proptest! {
    /// Property: 6 (W-1)(H-1) indices, all in range, no degenerate triangles.
    #[test]
    fn index_buffer_is_valid(width in 2u32..40, height in 2u32..40) {
        let indices = generate_index_buffer(width, height);
        prop_assert_eq!(indices.len(), 6 * (width as usize - 1) * (height as usize - 1));
        prop_assert!(indices.iter().all(|&i| i < width * height));
        for tri in indices.chunks_exact(3) {
            prop_assert!(tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2]);
        }
    }

    /// Property: queries inside the grid stay between the lowest and highest samples.
    #[test]
    fn heights_stay_within_sample_range(
        samples in prop::collection::vec(0.0f32..=1.0, 16),
        x in -3.0f32..3.0,
        z in -3.0f32..3.0,
    ) {
        let map = Heightmap::from_samples(4, 4, samples.clone()).expect("4x4");
        let mut terrain = Terrain::default();
        terrain.set_heightmap(&map);
        let h = terrain.height_at(Vec3::new(x, 0.0, z));
        prop_assert_ne!(h, NO_HEIGHT);

        let lo = samples.iter().cloned().fold(f32::MAX, f32::min) * 500.0;
        let hi = samples.iter().cloned().fold(f32::MIN, f32::max) * 500.0;
        prop_assert!(h >= lo - 1e-2 && h <= hi + 1e-2);
    }
}
