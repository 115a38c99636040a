//! Seed management for terrain generation
//!
//! A world is identified by one master seed. Each noise stream gets its own seed,
//! derived from the master by a fixed offset, so that elevation, biome layout,
//! detail jitter and vegetation are statistically independent.

use crate::coords::ChunkAddress;

/// Offset of the biome stream from the master seed
pub const BIOME_OFFSET: u64 = 1000;
/// Offset of the detail stream from the master seed
pub const DETAIL_OFFSET: u64 = 2000;
/// Offset of the vegetation stream from the master seed
pub const VEGETATION_OFFSET: u64 = 3000;

/// Seeds for the four noise streams of one world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TerrainSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Elevation (heightmap octaves)
    pub terrain: u64,
    /// Biome quantization
    pub biome: u64,
    /// Placement jitter, free-standing destructible gating, debris
    pub detail: u64,
    /// Feature placement probability
    pub vegetation: u64,
}

impl TerrainSeeds {
    /// Derive all stream seeds from a master seed.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            terrain: master,
            biome: master.wrapping_add(BIOME_OFFSET),
            detail: master.wrapping_add(DETAIL_OFFSET),
            vegetation: master.wrapping_add(VEGETATION_OFFSET),
        }
    }

    /// Seed for the per-chunk placement RNG.
    pub fn placement_seed(&self, address: ChunkAddress) -> u64 {
        combine_seeds(self.vegetation, address.x as i64 as u64, address.z as i64 as u64)
    }
}

impl Default for TerrainSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

impl std::fmt::Display for TerrainSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TerrainSeeds {{ master: {}, terrain: {}, biome: {}, detail: {}, vegetation: {} }}",
            self.master, self.terrain, self.biome, self.detail, self.vegetation,
        )
    }
}

/// Combine seeds deterministically
pub fn combine_seeds(seed: u64, x: u64, y: u64) -> u64 {
    let mut h = seed;
    h = h.wrapping_mul(0x517cc1b727220a95);
    h ^= x;
    h = h.wrapping_mul(0x517cc1b727220a95);
    h ^= y;
    h = h.wrapping_mul(0x517cc1b727220a95);
    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_derivation() {
        let seeds1 = TerrainSeeds::from_master(12345);
        let seeds2 = TerrainSeeds::from_master(12345);
        assert_eq!(seeds1, seeds2);
    }

    #[test]
    fn test_streams_are_distinct() {
        let seeds = TerrainSeeds::from_master(42);
        let all = [seeds.terrain, seeds.biome, seeds.detail, seeds.vegetation];
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                assert_ne!(all[i], all[j]);
            }
        }
        assert_eq!(seeds.biome, 1042);
    }

    #[test]
    fn test_offsets_wrap() {
        let seeds = TerrainSeeds::from_master(u64::MAX);
        assert_eq!(seeds.biome, BIOME_OFFSET - 1);
    }

    #[test]
    fn test_placement_seed_varies_by_chunk() {
        let seeds = TerrainSeeds::from_master(7);
        let a = seeds.placement_seed(ChunkAddress::new(0, 0));
        let b = seeds.placement_seed(ChunkAddress::new(1, 0));
        let c = seeds.placement_seed(ChunkAddress::new(0, 1));
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(b, c);
    }
}
