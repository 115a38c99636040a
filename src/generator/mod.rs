//! Chunk generation.
//!
//! Turns a chunk address into a [`Chunk`] in four phases:
//! 1. Heightmap from multi-octave terrain noise
//! 2. Biome map from a coarser, independent noise stream
//! 3. Feature placement on a strided grid using per-biome densities
//! 4. Destructible elements: sub-elements of destructible features, plus a
//!    sparse free-standing pass
//!
//! Phases 1 and 2 are pure functions of (seed, world position) and are also
//! exposed per point ([`ChunkGenerator::sample_height`],
//! [`ChunkGenerator::sample_biome`]) for cheap queries that must agree with
//! generated chunks.

mod biome_map;
mod destructibles;
mod heightmap;
mod placement;

use std::sync::Arc;

use ::noise::{Clamp, NoiseFn, ScaleBias, ScalePoint};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::biomes::{BiomeId, BiomeRegistry};
use crate::chunk::Chunk;
use crate::config::TerrainConfig;
use crate::coords::ChunkAddress;
use crate::gradient::GradientNoise;
use crate::seeds::TerrainSeeds;

pub use placement::placement_probability;

/// Amplitude falloff between heightmap octaves
const HEIGHT_PERSISTENCE: f64 = 0.5;

/// Practical amplitude of single-octave gradient noise. Raw samples rarely
/// leave [-0.8, 0.9], so the biome field is stretched by this factor before
/// quantization or the outer registry bands would almost never be reached.
const BIOME_NOISE_AMPLITUDE: f64 = 0.7;

/// Biome noise: frequency-scaled input, amplitude-normalized output in [-1, 1]
type BiomeField = Clamp<f64, ScaleBias<f64, ScalePoint<GradientNoise>, 2>, 2>;

fn biome_field(seed: u64, frequency: f64) -> BiomeField {
    let scaled = ScalePoint::new(GradientNoise::new(seed)).set_scale(frequency);
    Clamp::new(ScaleBias::new(scaled).set_scale(1.0 / BIOME_NOISE_AMPLITUDE)).set_bounds(-1.0, 1.0)
}

/// Builds chunks from a seed, a configuration and a biome registry.
pub struct ChunkGenerator {
    config: TerrainConfig,
    registry: Arc<BiomeRegistry>,
    seeds: TerrainSeeds,
    terrain_noise: GradientNoise,
    biome_field: BiomeField,
    detail_noise: GradientNoise,
    vegetation_noise: GradientNoise,
}

impl ChunkGenerator {
    /// Create a generator. `config` should already be validated.
    pub fn new(config: TerrainConfig, registry: Arc<BiomeRegistry>, seed: u64) -> Self {
        let seeds = TerrainSeeds::from_master(seed);
        let biome_field = biome_field(seeds.biome, config.biome_frequency);
        Self {
            config,
            registry,
            terrain_noise: GradientNoise::new(seeds.terrain),
            biome_field,
            detail_noise: GradientNoise::new(seeds.detail),
            vegetation_noise: GradientNoise::new(seeds.vegetation),
            seeds,
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<BiomeRegistry> {
        &self.registry
    }

    pub fn seeds(&self) -> &TerrainSeeds {
        &self.seeds
    }

    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    /// Generate the chunk at `address`.
    pub fn generate(&self, address: ChunkAddress) -> Chunk {
        let heights = heightmap::generate_heightmap(self, address);
        let biomes = biome_map::generate_biome_map(self, address);

        let mut rng = self.placement_rng(address);
        let features = placement::place_features(self, address, &heights, &biomes, &mut rng);

        let destructibles = if self.config.enable_destructibles {
            destructibles::generate_destructibles(self, address, &features, &heights, &biomes, &mut rng)
        } else {
            Vec::new()
        };

        Chunk::new(address, heights, biomes, features, destructibles)
    }

    /// Terrain height at a world point. Identical to the value a freshly
    /// generated chunk stores for the cell at that point.
    pub fn sample_height(&self, world_x: f64, world_z: f64) -> f32 {
        let freq = self.config.terrain_frequency;
        let n = self.terrain_noise.octave_noise(
            world_x * freq,
            world_z * freq,
            self.config.detail_level,
            HEIGHT_PERSISTENCE,
        );
        (((n + 1.0) * 0.5) as f32) * self.config.height_scale
    }

    /// Biome at a world point, always a registered id.
    pub fn sample_biome(&self, world_x: f64, world_z: f64) -> BiomeId {
        self.registry.quantize(self.biome_field.get([world_x, world_z]))
    }

    /// Height as a fraction of the configured height scale
    fn normalized_height(&self, height: f32) -> f32 {
        if self.config.height_scale > 0.0 {
            (height / self.config.height_scale).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }

    fn placement_rng(&self, address: ChunkAddress) -> ChaCha8Rng {
        if self.config.deterministic_placement {
            ChaCha8Rng::seed_from_u64(self.seeds.placement_seed(address))
        } else {
            ChaCha8Rng::from_entropy()
        }
    }
}
