//! Feature placement phase.
//!
//! Walks the chunk on a strided grid. At each sample point, every feature kind
//! the local biome allows gets one acceptance draw against a probability built
//! from the biome density, the elevation affinity, the vegetation stream and a
//! kind-specific spatial modifier (clustered rocks, roads along warped bands).

use std::f32::consts::TAU;

use rand::Rng;

use crate::biomes::BiomeId;
use crate::coords::{ChunkAddress, FeatureId, WorldPos};
use crate::features::{Feature, FeatureGeometry, FeatureKind};
use crate::grid::Grid;

use super::ChunkGenerator;

/// Frequency of the vegetation stream lookup
const VEGETATION_FREQUENCY: f64 = 0.05;
/// Frequency of the rock clustering lattice
const ROCK_CLUSTER_FREQUENCY: f64 = 0.02;
/// Frequency of the warped road network bands
const ROAD_FREQUENCY: f64 = 0.004;
const ROAD_WARP_STRENGTH: f64 = 4.0;
/// Half-width of a road band in noise units
const ROAD_BAND: f64 = 0.08;
/// Frequency of the jitter lookup
const JITTER_FREQUENCY: f64 = 0.1;

/// Probability of placing a feature at one sample point, in [0, 1].
///
/// Monotone non-decreasing in `density`; every other factor is expected in
/// [0, 1] and the result is capped at 1.
pub fn placement_probability(density: f32, affinity: f32, vegetation: f32, modifier: f32) -> f32 {
    let density = density.max(0.0);
    let vegetation = vegetation.clamp(0.0, 1.0);
    (density * affinity.clamp(0.0, 1.0) * (0.5 + 0.5 * vegetation) * modifier.clamp(0.0, 1.0)).min(1.0)
}

pub(super) fn place_features<R: Rng>(
    generator: &ChunkGenerator,
    address: ChunkAddress,
    heights: &Grid<f32>,
    biomes: &Grid<BiomeId>,
    rng: &mut R,
) -> Vec<Feature> {
    let size = generator.chunk_size();
    let stride = generator.config().feature_stride.max(1);
    let (origin_x, origin_z) = address.origin(size);
    let registry = generator.registry();

    let mut features = Vec::new();

    for z in (0..size).step_by(stride) {
        for x in (0..size).step_by(stride) {
            let biome_id = *biomes.get(x, z);
            let biome = registry.resolve(biome_id);
            if biome.features.is_empty() {
                continue;
            }

            let world_x = origin_x + x as f64;
            let world_z = origin_z + z as f64;
            let affinity = biome.elevation_affinity(generator.normalized_height(*heights.get(x, z)));
            let vegetation = generator
                .vegetation_noise
                .noise(world_x * VEGETATION_FREQUENCY, world_z * VEGETATION_FREQUENCY);
            let vegetation = ((vegetation + 1.0) * 0.5) as f32;

            for (slot, &kind) in biome.features.iter().enumerate() {
                let modifier = kind_modifier(generator, kind, world_x, world_z);
                let chance = placement_probability(biome.density_for(kind), affinity, vegetation, modifier);
                if rng.gen::<f32>() >= chance {
                    continue;
                }

                // Jitter within the stride cell, kept inside the owning chunk
                let offset = slot as f64 * 17.0;
                let half = stride as f64 * 0.5;
                let jx = generator.detail_noise.simplex_noise(
                    world_x * JITTER_FREQUENCY + offset,
                    world_z * JITTER_FREQUENCY,
                ) * half;
                let jz = generator.detail_noise.simplex_noise(
                    world_z * JITTER_FREQUENCY,
                    world_x * JITTER_FREQUENCY + offset,
                ) * half;
                let local_x = (x as f64 + jx).clamp(0.0, size as f64 - 1.0);
                let local_z = (z as f64 + jz).clamp(0.0, size as f64 - 1.0);
                let ground = *heights.get(local_x as usize, local_z as usize);

                let geometry = build_geometry(generator, kind, world_x, world_z, rng);
                features.push(Feature {
                    id: FeatureId {
                        chunk: address,
                        index: features.len() as u32,
                    },
                    geometry,
                    position: WorldPos::new(
                        (origin_x + local_x) as f32,
                        ground,
                        (origin_z + local_z) as f32,
                    ),
                    biome: biome_id,
                    scale: rng.gen_range(0.8..1.2),
                    rotation: rng.gen_range(0.0..TAU),
                    health: kind.max_health(),
                    max_health: kind.max_health(),
                    destructible: kind.is_destructible(),
                });
            }
        }
    }

    features
}

/// Spatial modifier in [0, 1] shaping where a kind appears
fn kind_modifier(generator: &ChunkGenerator, kind: FeatureKind, world_x: f64, world_z: f64) -> f32 {
    match kind {
        FeatureKind::Rock => {
            let d = generator
                .detail_noise
                .cellular(world_x * ROCK_CLUSTER_FREQUENCY, world_z * ROCK_CLUSTER_FREQUENCY);
            (1.0 - d as f32).clamp(0.2, 1.0)
        }
        FeatureKind::Road => {
            if road_band(generator, world_x, world_z).abs() < ROAD_BAND {
                1.0
            } else {
                0.15
            }
        }
        FeatureKind::Building => (1.0 - road_band(generator, world_x, world_z).abs() as f32).clamp(0.3, 1.0),
        FeatureKind::Tree | FeatureKind::Bush | FeatureKind::Wreck => 1.0,
    }
}

/// Warped contour value whose zero set traces the road network
fn road_band(generator: &ChunkGenerator, world_x: f64, world_z: f64) -> f64 {
    generator
        .detail_noise
        .domain_warp(world_x * ROAD_FREQUENCY, world_z * ROAD_FREQUENCY, ROAD_WARP_STRENGTH)
}

fn build_geometry<R: Rng>(
    generator: &ChunkGenerator,
    kind: FeatureKind,
    world_x: f64,
    world_z: f64,
    rng: &mut R,
) -> FeatureGeometry {
    match kind {
        FeatureKind::Building => {
            let floors = rng.gen_range(1..=6u32);
            FeatureGeometry::Building {
                height: floors as f32 * 4.0 + rng.gen_range(0.0..1.0),
                width: rng.gen_range(6.0..16.0),
                depth: rng.gen_range(6.0..16.0),
                floors,
            }
        }
        FeatureKind::Tree => {
            let height = rng.gen_range(4.0..14.0);
            let turbulence = generator.detail_noise.turbulence(world_x * 0.1, world_z * 0.1, 3) as f32;
            FeatureGeometry::Tree {
                height,
                canopy_radius: height * 0.3 * (0.8 + 0.4 * turbulence.min(1.0)),
            }
        }
        FeatureKind::Bush => FeatureGeometry::Bush {
            radius: rng.gen_range(0.5..1.5),
        },
        FeatureKind::Road => FeatureGeometry::Road {
            length: rng.gen_range(8.0..16.0),
            width: rng.gen_range(6.0..10.0),
            heading: rng.gen_range(0.0..TAU),
        },
        FeatureKind::Rock => {
            let ridge = generator.detail_noise.ridged_noise(world_x * 0.05, world_z * 0.05, 3, 0.5) as f32;
            FeatureGeometry::Rock {
                radius: 0.5 + 2.5 * ridge * rng.gen_range(0.7..1.0),
            }
        }
        FeatureKind::Wreck => FeatureGeometry::Wreck {
            length: rng.gen_range(3.5..6.0),
            heading: rng.gen_range(0.0..TAU),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probability_monotone_in_density() {
        let mut last = 0.0;
        for i in 0..=40 {
            let density = i as f32 * 0.1;
            let p = placement_probability(density, 0.8, 0.6, 0.9);
            assert!(p >= last);
            assert!(p <= 1.0);
            last = p;
        }
        assert_eq!(last, 1.0);
    }

    #[test]
    fn test_probability_bounds() {
        assert_eq!(placement_probability(-1.0, 1.0, 1.0, 1.0), 0.0);
        assert_eq!(placement_probability(f32::NAN, 1.0, 1.0, 1.0), 0.0);
        assert_eq!(placement_probability(100.0, 1.0, 1.0, 1.0), 1.0);
        assert_eq!(placement_probability(0.5, 1.0, 0.0, 1.0), 0.25);
        assert_eq!(placement_probability(0.5, 2.0, 5.0, 3.0), 0.5);
    }
}
