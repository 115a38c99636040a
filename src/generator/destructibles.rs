//! Destructible element phase.
//!
//! Destructible features are broken down into sub-elements (building windows,
//! tree branches, wreck panels). A second, sparse pass scatters free-standing
//! elements drawn from the local biome's list.

use rand::Rng;

use crate::biomes::BiomeId;
use crate::coords::{ChunkAddress, ElementId, WorldPos};
use crate::features::{DestructibleElement, DestructibleKind, Feature, FeatureGeometry};
use crate::grid::Grid;

use super::ChunkGenerator;

/// Storey height used to stack windows
const FLOOR_HEIGHT: f32 = 4.0;
/// Horizontal spacing between windows on a facade
const WINDOW_SPACING: f32 = 3.0;
/// Vertical spacing between branches on a trunk
const BRANCH_SPACING: f32 = 3.0;
const WRECK_PANELS: usize = 4;

const GATE_FREQUENCY: f64 = 0.05;
const KIND_FREQUENCY: f64 = 0.1;

pub(super) fn generate_destructibles<R: Rng>(
    generator: &ChunkGenerator,
    address: ChunkAddress,
    features: &[Feature],
    heights: &Grid<f32>,
    biomes: &Grid<BiomeId>,
    rng: &mut R,
) -> Vec<DestructibleElement> {
    let mut elements = Vec::new();

    for feature in features.iter().filter(|f| f.destructible) {
        for (kind, position) in sub_elements(feature) {
            let id = ElementId::new(address, elements.len() as u32);
            elements.push(DestructibleElement::new(id, kind, position, Some(feature.id)));
        }
    }

    scatter_free_standing(generator, address, heights, biomes, rng, &mut elements);
    elements
}

/// Kinds and positions of the elements a feature breaks down into
fn sub_elements(feature: &Feature) -> Vec<(DestructibleKind, WorldPos)> {
    let base = feature.position;
    match feature.geometry {
        FeatureGeometry::Building { width, depth, floors, .. } => {
            let per_floor = ((width / WINDOW_SPACING) as usize).max(1);
            let (sin, cos) = feature.rotation.sin_cos();
            let mut out = Vec::with_capacity(floors as usize * per_floor);
            for floor in 0..floors {
                let y = base.y + floor as f32 * FLOOR_HEIGHT + FLOOR_HEIGHT * 0.5;
                for i in 0..per_floor {
                    // Alternate between the front and back facades
                    let along = (i as f32 + 0.5) / per_floor as f32 * width - width * 0.5;
                    let across = if i % 2 == 0 { depth * 0.5 } else { -depth * 0.5 };
                    out.push((
                        DestructibleKind::Window,
                        WorldPos::new(
                            base.x + along * cos - across * sin,
                            y,
                            base.z + along * sin + across * cos,
                        ),
                    ));
                }
            }
            out
        }
        FeatureGeometry::Tree { height, canopy_radius } => {
            let count = (height / BRANCH_SPACING) as usize;
            (0..count)
                .map(|i| {
                    let angle = feature.rotation + i as f32 * 2.4;
                    let reach = canopy_radius * 0.6;
                    (
                        DestructibleKind::Branch,
                        WorldPos::new(
                            base.x + angle.cos() * reach,
                            base.y + (i as f32 + 1.0) * BRANCH_SPACING,
                            base.z + angle.sin() * reach,
                        ),
                    )
                })
                .collect()
        }
        FeatureGeometry::Wreck { length, heading } => {
            let (sin, cos) = heading.sin_cos();
            (0..WRECK_PANELS)
                .map(|i| {
                    // Two panels on each side of the hull
                    let along = if i < 2 { length * 0.25 } else { -length * 0.25 };
                    let across = if i % 2 == 0 { 1.0 } else { -1.0 };
                    (
                        DestructibleKind::Panel,
                        WorldPos::new(
                            base.x + along * cos - across * sin,
                            base.y + 0.8,
                            base.z + along * sin + across * cos,
                        ),
                    )
                })
                .collect()
        }
        _ => Vec::new(),
    }
}

fn scatter_free_standing<R: Rng>(
    generator: &ChunkGenerator,
    address: ChunkAddress,
    heights: &Grid<f32>,
    biomes: &Grid<BiomeId>,
    rng: &mut R,
    elements: &mut Vec<DestructibleElement>,
) {
    let config = generator.config();
    let size = generator.chunk_size();
    let stride = config.destructible_stride.max(1);
    let (origin_x, origin_z) = address.origin(size);
    let registry = generator.registry();

    for z in (0..size).step_by(stride) {
        for x in (0..size).step_by(stride) {
            let world_x = origin_x + x as f64;
            let world_z = origin_z + z as f64;

            let gate = generator
                .detail_noise
                .noise(world_x * GATE_FREQUENCY, world_z * GATE_FREQUENCY);
            if gate <= config.free_destructible_threshold {
                continue;
            }
            if rng.gen::<f32>() >= config.free_destructible_chance {
                continue;
            }

            let biome = registry.resolve(*biomes.get(x, z));
            let kinds: Vec<DestructibleKind> = biome
                .destructibles
                .iter()
                .copied()
                .filter(DestructibleKind::is_free_standing)
                .collect();
            if kinds.is_empty() {
                continue;
            }

            let pick = generator
                .detail_noise
                .voronoi(world_x * KIND_FREQUENCY, world_z * KIND_FREQUENCY);
            let kind = kinds[((pick * kinds.len() as f64) as usize).min(kinds.len() - 1)];

            let local_x = (x as f64 + rng.gen_range(0.0..stride as f64)).min(size as f64 - 1.0);
            let local_z = (z as f64 + rng.gen_range(0.0..stride as f64)).min(size as f64 - 1.0);
            let ground = *heights.get(local_x as usize, local_z as usize);

            let id = ElementId::new(address, elements.len() as u32);
            let position = WorldPos::new((origin_x + local_x) as f32, ground, (origin_z + local_z) as f32);
            elements.push(DestructibleElement::new(id, kind, position, None));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::FeatureId;

    fn feature(geometry: FeatureGeometry) -> Feature {
        let kind = geometry.kind();
        Feature {
            id: FeatureId {
                chunk: ChunkAddress::new(0, 0),
                index: 0,
            },
            geometry,
            position: WorldPos::new(10.0, 5.0, 10.0),
            biome: BiomeId(0),
            scale: 1.0,
            rotation: 0.0,
            health: kind.max_health(),
            max_health: kind.max_health(),
            destructible: kind.is_destructible(),
        }
    }

    #[test]
    fn test_building_windows_per_floor() {
        let building = feature(FeatureGeometry::Building {
            height: 12.5,
            width: 10.0,
            depth: 8.0,
            floors: 3,
        });
        let windows = sub_elements(&building);
        assert_eq!(windows.len(), 9);
        assert!(windows.iter().all(|(k, _)| *k == DestructibleKind::Window));
        // Windows on the top floor sit above the ground floor
        assert!(windows[8].1.y > windows[0].1.y);
    }

    #[test]
    fn test_narrow_building_keeps_one_window() {
        let building = feature(FeatureGeometry::Building {
            height: 4.0,
            width: 2.0,
            depth: 2.0,
            floors: 1,
        });
        assert_eq!(sub_elements(&building).len(), 1);
    }

    #[test]
    fn test_tree_branches_and_wreck_panels() {
        let tree = feature(FeatureGeometry::Tree {
            height: 10.0,
            canopy_radius: 3.0,
        });
        assert_eq!(sub_elements(&tree).len(), 3);

        let wreck = feature(FeatureGeometry::Wreck {
            length: 5.0,
            heading: 1.0,
        });
        let panels = sub_elements(&wreck);
        assert_eq!(panels.len(), 4);
        assert!(panels.iter().all(|(k, _)| *k == DestructibleKind::Panel));

        let rock = feature(FeatureGeometry::Rock { radius: 2.0 });
        assert!(sub_elements(&rock).is_empty());
    }
}
