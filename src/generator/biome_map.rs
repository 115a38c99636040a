//! Biome phase: a coarse, independent noise stream quantized onto the registry.
//!
//! Quantization is a hard cut, so biome boundaries are sharp at this layer.

use rayon::prelude::*;

use crate::biomes::BiomeId;
use crate::coords::ChunkAddress;
use crate::grid::Grid;

use super::ChunkGenerator;

pub(super) fn generate_biome_map(generator: &ChunkGenerator, address: ChunkAddress) -> Grid<BiomeId> {
    let size = generator.chunk_size();
    let (origin_x, origin_z) = address.origin(size);
    let mut biomes = Grid::new_with(size, size, generator.registry().default_id());

    biomes
        .as_mut_slice()
        .par_chunks_mut(size)
        .enumerate()
        .for_each(|(z, row)| {
            let world_z = origin_z + z as f64;
            for (x, cell) in row.iter_mut().enumerate() {
                *cell = generator.sample_biome(origin_x + x as f64, world_z);
            }
        });

    biomes
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use super::*;
    use crate::biomes::BiomeRegistry;
    use crate::config::TerrainConfig;

    #[test]
    fn test_every_default_biome_appears() {
        let config = TerrainConfig {
            chunk_size: 8,
            ..TerrainConfig::with_seed(42)
        };
        let registry = Arc::new(BiomeRegistry::defaults());
        let generator = ChunkGenerator::new(config, Arc::clone(&registry), 42);

        let mut counts: HashMap<BiomeId, usize> = HashMap::new();
        let mut total = 0;
        for i in -30..30 {
            for j in -30..30 {
                let map = generate_biome_map(&generator, ChunkAddress::new(i * 25, j * 25));
                for &id in map.as_slice() {
                    *counts.entry(id).or_insert(0) += 1;
                    total += 1;
                }
            }
        }

        for (id, biome) in registry.iter() {
            let count = counts.get(&id).copied().unwrap_or(0);
            // Outer bands included: each biome covers at least 0.1% of the sample
            assert!(count * 1000 >= total, "{} covers {} of {} cells", biome.name, count, total);
        }
    }

    #[test]
    fn test_biome_regions_are_coarse() {
        let config = TerrainConfig {
            chunk_size: 32,
            ..TerrainConfig::with_seed(3)
        };
        let generator = ChunkGenerator::new(config, Arc::new(BiomeRegistry::defaults()), 3);
        let map = generate_biome_map(&generator, ChunkAddress::new(0, 0));
        let changes = (1..map.width)
            .filter(|&x| map.get(x, 0) != map.get(x - 1, 0))
            .count();
        assert!(changes <= 2);
    }
}
