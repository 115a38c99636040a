//! Heightmap phase: one octave-noise sample per cell, rows filled in parallel.

use rayon::prelude::*;

use crate::coords::ChunkAddress;
use crate::grid::Grid;

use super::ChunkGenerator;

/// Sample the terrain height for every cell of the chunk at `address`.
pub(super) fn generate_heightmap(generator: &ChunkGenerator, address: ChunkAddress) -> Grid<f32> {
    let size = generator.chunk_size();
    let (origin_x, origin_z) = address.origin(size);
    let mut heights = Grid::new_with(size, size, 0.0f32);

    heights
        .as_mut_slice()
        .par_chunks_mut(size)
        .enumerate()
        .for_each(|(z, row)| {
            let world_z = origin_z + z as f64;
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = generator.sample_height(origin_x + x as f64, world_z);
            }
        });

    heights
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::biomes::BiomeRegistry;
    use crate::generator::tests::test_config;

    #[test]
    fn test_shared_edge_is_continuous() {
        let generator = ChunkGenerator::new(test_config(42), Arc::new(BiomeRegistry::defaults()), 42);
        let size = generator.chunk_size();
        let left = generate_heightmap(&generator, ChunkAddress::new(0, 0));
        let right = generate_heightmap(&generator, ChunkAddress::new(1, 0));

        // Neighbouring cells across the seam differ by no more than neighbours inside a chunk
        let mut max_inner = 0.0f32;
        let mut max_seam = 0.0f32;
        for z in 0..size {
            max_inner = max_inner.max((left.get(size - 2, z) - left.get(size - 1, z)).abs());
            max_seam = max_seam.max((left.get(size - 1, z) - right.get(0, z)).abs());
        }
        assert!(max_seam <= max_inner * 3.0 + 1e-3);
    }

    #[test]
    fn test_parallel_fill_matches_sequential() {
        let generator = ChunkGenerator::new(test_config(6), Arc::new(BiomeRegistry::defaults()), 6);
        let address = ChunkAddress::new(-2, 5);
        let heights = generate_heightmap(&generator, address);
        let (ox, oz) = address.origin(generator.chunk_size());
        for (x, z, &h) in heights.iter() {
            assert_eq!(h, generator.sample_height(ox + x as f64, oz + z as f64));
        }
    }
}
