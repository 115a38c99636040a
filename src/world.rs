//! World query facade.
//!
//! `TerrainWorld` is the public surface callers drive once per frame: region
//! generation, point queries, terrain mutation and destructible damage. It owns
//! the generator, the bounded cache and the ambient collaborator, and is meant
//! for a single thread of control (every operation takes `&mut self` or `&self`
//! and completes synchronously).

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::ambient::{AmbientSnapshot, AmbientSource, StaticAmbient};
use crate::biomes::{BiomeId, BiomeRegistry};
use crate::cache::{CacheStats, TerrainCache};
use crate::chunk::Chunk;
use crate::config::TerrainConfig;
use crate::coords::{ChunkAddress, ElementId, FeatureId, WorldBounds};
use crate::error::DestroyError;
use crate::features::{spawn_debris, Debris, DestructibleElement, Feature};
use crate::generator::ChunkGenerator;

/// Everything a caller needs to build one area of the world
#[derive(Clone, Debug)]
pub struct TerrainRegion {
    /// Covering chunks by address
    pub chunks: BTreeMap<ChunkAddress, Arc<Chunk>>,
    /// Dominant biome of each covering chunk
    pub biomes: BTreeMap<ChunkAddress, BiomeId>,
    /// Features of all covering chunks, in address order
    pub features: Vec<Feature>,
    /// Destructible elements of all covering chunks, in address order
    pub destructibles: Vec<DestructibleElement>,
    /// Weather and time of day at assembly time
    pub ambient: AmbientSnapshot,
    /// World-space rectangle covered by the chunks
    pub bounds: WorldBounds,
}

impl TerrainRegion {
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk(&self, address: ChunkAddress) -> Option<&Chunk> {
        self.chunks.get(&address).map(|c| c.as_ref())
    }

    /// Height range over every covering chunk
    pub fn height_range(&self) -> Option<(f32, f32)> {
        self.chunks
            .values()
            .filter_map(|c| c.heights().min_max())
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
    }

    /// Cell counts per biome across the region
    pub fn biome_histogram(&self) -> BTreeMap<BiomeId, usize> {
        let mut counts = BTreeMap::new();
        for chunk in self.chunks.values() {
            for &id in chunk.biomes().as_slice() {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        counts
    }
}

/// Outcome of a terrain edit
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct TerrainEdit {
    /// Chunks with at least one edited cell, in address order
    pub chunks: Vec<ChunkAddress>,
    /// Total cells edited
    pub cells: usize,
}

/// Procedural terrain world: generator, cache and mutation front-end
pub struct TerrainWorld {
    config: TerrainConfig,
    seed: u64,
    generator: ChunkGenerator,
    cache: TerrainCache,
    ambient: Box<dyn AmbientSource>,
    debris_rng: ChaCha8Rng,
}

impl TerrainWorld {
    /// Create a world. Configuration is validated; an unset seed is drawn at random.
    pub fn new(config: TerrainConfig, registry: Arc<BiomeRegistry>, ambient: Box<dyn AmbientSource>) -> Self {
        let config = config.validated();
        let seed = config.resolved_seed();
        let config = TerrainConfig {
            seed: Some(seed),
            ..config
        };
        let generator = ChunkGenerator::new(config.clone(), registry, seed);
        let debris_rng = ChaCha8Rng::seed_from_u64(generator.seeds().detail);

        log::info!(
            "Terrain world: seed {}, chunk size {}, {} biomes, cache bound {}",
            seed,
            config.chunk_size,
            generator.registry().len(),
            config.max_cache_size
        );

        Self {
            cache: TerrainCache::new(config.max_cache_size),
            config,
            seed,
            generator,
            ambient,
            debris_rng,
        }
    }

    /// Default configuration, builtin biomes and a fixed clear-day ambient
    pub fn with_seed(seed: u64) -> Self {
        Self::new(
            TerrainConfig::with_seed(seed),
            Arc::new(BiomeRegistry::defaults()),
            Box::new(StaticAmbient::default()),
        )
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<BiomeRegistry> {
        self.generator.registry()
    }

    pub fn generator(&self) -> &ChunkGenerator {
        &self.generator
    }

    pub fn set_ambient(&mut self, ambient: Box<dyn AmbientSource>) {
        self.ambient = ambient;
    }

    /// Resolve one chunk through the cache, generating it on a miss
    pub fn chunk(&mut self, address: ChunkAddress) -> Arc<Chunk> {
        if let Some(chunk) = self.cache.get(address) {
            return chunk;
        }

        let start = Instant::now();
        let chunk = Arc::new(self.generator.generate(address));
        let elapsed = start.elapsed();
        log::debug!(
            "Generated chunk {} in {:.2}ms ({} features, {} destructibles)",
            address,
            elapsed.as_secs_f64() * 1000.0,
            chunk.features().len(),
            chunk.destructibles().len()
        );

        self.cache.insert(Arc::clone(&chunk), elapsed);
        chunk
    }

    /// Chunk addresses covering the square of half-width `radius` around a point
    pub fn covering_addresses(&self, center_x: f64, center_z: f64, radius: f64) -> Vec<ChunkAddress> {
        let radius = radius.abs();
        let size = self.config.chunk_size;
        let min = ChunkAddress::containing(center_x - radius, center_z - radius, size);
        let max = ChunkAddress::containing(center_x + radius, center_z + radius, size);

        let mut addresses = Vec::new();
        for cz in min.z..=max.z {
            for cx in min.x..=max.x {
                addresses.push(ChunkAddress::new(cx, cz));
            }
        }
        addresses
    }

    /// Generate (or fetch) every chunk covering the square of half-width
    /// `radius` around `(center_x, center_z)` and assemble the region.
    ///
    /// The region keeps its own handles on the chunks, so it stays complete even
    /// when it covers more chunks than the cache can hold.
    pub fn generate_terrain(&mut self, center_x: f64, center_z: f64, radius: f64) -> TerrainRegion {
        let start = Instant::now();
        let addresses = self.covering_addresses(center_x, center_z, radius);
        if addresses.len() > self.cache.max_size() {
            log::warn!(
                "Region needs {} chunks but the cache holds {}; earlier chunks will be evicted",
                addresses.len(),
                self.cache.max_size()
            );
        }

        let mut chunks = BTreeMap::new();
        for &address in &addresses {
            let chunk = self.chunk(address);
            chunks.insert(address, chunk);
        }

        let biomes = chunks
            .iter()
            .map(|(&address, chunk)| (address, chunk.dominant_biome()))
            .collect();
        let features = chunks.values().flat_map(|c| c.features().iter().cloned()).collect::<Vec<_>>();
        let destructibles = chunks
            .values()
            .flat_map(|c| c.destructibles().iter().cloned())
            .collect::<Vec<_>>();

        let size = self.config.chunk_size;
        let bounds = match (addresses.first(), addresses.last()) {
            (Some(first), Some(last)) => {
                let lo = first.bounds(size);
                let hi = last.bounds(size);
                WorldBounds {
                    min_x: lo.min_x,
                    min_z: lo.min_z,
                    max_x: hi.max_x,
                    max_z: hi.max_z,
                }
            }
            _ => ChunkAddress::containing(center_x, center_z, size).bounds(size),
        };

        log::info!(
            "Region at ({:.1}, {:.1}) r={:.1}: {} chunks, {} features, {} destructibles in {:.2}ms",
            center_x,
            center_z,
            radius,
            chunks.len(),
            features.len(),
            destructibles.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );

        TerrainRegion {
            chunks,
            biomes,
            features,
            destructibles,
            ambient: self.ambient.snapshot(),
            bounds,
        }
    }

    /// Terrain height at a world point. Resident chunks answer from their
    /// (possibly edited) grid; otherwise the noise is evaluated directly and
    /// nothing is generated or cached.
    pub fn height_at(&self, x: f64, z: f64) -> f32 {
        let (cell_x, cell_z) = (x.floor(), z.floor());
        let address = ChunkAddress::containing(cell_x, cell_z, self.config.chunk_size);
        if let Some(chunk) = self.cache.peek(address) {
            if let Some((lx, lz)) = chunk.local_cell(cell_x, cell_z) {
                return chunk.height(lx, lz);
            }
        }
        self.generator.sample_height(cell_x, cell_z)
    }

    /// Biome at a world point, with the same resident/direct policy as
    /// [`TerrainWorld::height_at`].
    pub fn biome_at(&self, x: f64, z: f64) -> BiomeId {
        let (cell_x, cell_z) = (x.floor(), z.floor());
        let address = ChunkAddress::containing(cell_x, cell_z, self.config.chunk_size);
        if let Some(chunk) = self.cache.peek(address) {
            if let Some((lx, lz)) = chunk.local_cell(cell_x, cell_z) {
                return chunk.biome(lx, lz);
            }
        }
        self.generator.sample_biome(cell_x, cell_z)
    }

    /// Name of the biome at a world point
    pub fn biome_name_at(&self, x: f64, z: f64) -> &str {
        &self.registry().resolve(self.biome_at(x, z)).name
    }

    /// Add `height_delta * (1 - distance / radius)` to every resident cell
    /// within `radius` of `(center_x, center_z)`. Chunks that are not resident
    /// are left alone. Returns the addresses of the chunks that changed.
    pub fn modify_terrain(&mut self, center_x: f64, center_z: f64, radius: f64, height_delta: f32) -> Vec<ChunkAddress> {
        self.edit_terrain(center_x, center_z, radius, height_delta).chunks
    }

    /// Same as [`TerrainWorld::modify_terrain`], also reporting the cell count
    pub fn edit_terrain(&mut self, center_x: f64, center_z: f64, radius: f64, height_delta: f32) -> TerrainEdit {
        let mut edit = TerrainEdit::default();
        if !(radius > 0.0) || height_delta == 0.0 {
            return edit;
        }

        // Only chunks with a covered cell are borrowed mutably, so shared
        // snapshots of the others are never copied
        let mut touched: Vec<ChunkAddress> = self
            .cache
            .addresses()
            .filter(|&a| {
                self.cache
                    .peek(a)
                    .map_or(false, |c| c.has_cell_within(center_x, center_z, radius))
            })
            .collect();
        touched.sort();

        for address in touched {
            if let Some(chunk) = self.cache.get_mut(address) {
                let cells = chunk.apply_radial_delta(center_x, center_z, radius, height_delta);
                if cells > 0 {
                    edit.chunks.push(address);
                    edit.cells += cells;
                }
            }
        }

        log::debug!(
            "Terrain edit at ({:.1}, {:.1}) r={:.1} d={:.2}: {} cells in {} chunks",
            center_x,
            center_z,
            radius,
            height_delta,
            edit.cells,
            edit.chunks.len()
        );
        edit
    }

    /// Destroy a destructible element outright and return its debris.
    pub fn destroy_element(&mut self, id: ElementId) -> Result<Vec<Debris>, DestroyError> {
        self.damage_element(id, f32::INFINITY)
    }

    /// Damage a destructible element. Returns debris if this call destroyed
    /// it, an empty list if it survived.
    pub fn damage_element(&mut self, id: ElementId, amount: f32) -> Result<Vec<Debris>, DestroyError> {
        // Validate before borrowing mutably so failed requests never copy a shared chunk
        let element = self.element(id).ok_or(DestroyError::NotFound(id))?;
        if element.destroyed {
            return Err(DestroyError::AlreadyDestroyed(id));
        }
        if !(amount > 0.0) {
            return Ok(Vec::new());
        }

        let chunk = self.cache.get_mut(id.chunk).ok_or(DestroyError::NotFound(id))?;
        let element = chunk.element_mut(id).ok_or(DestroyError::NotFound(id))?;
        if !element.apply_damage(amount)? {
            return Ok(Vec::new());
        }

        let destroyed = element.clone();
        if let Some(parent) = destroyed.parent {
            if let Some(feature) = chunk.feature_mut(parent) {
                feature.take_damage(destroyed.max_health);
            }
        }

        let debris = spawn_debris(&destroyed, &mut self.debris_rng);
        log::debug!("Destroyed {} {} ({} debris)", destroyed.kind, id, debris.len());
        Ok(debris)
    }

    /// Look up a destructible element in the resident chunks
    pub fn element(&self, id: ElementId) -> Option<&DestructibleElement> {
        self.cache.peek(id.chunk)?.element(id)
    }

    /// Look up a feature in the resident chunks
    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        self.cache.peek(id.chunk)?.feature(id)
    }

    pub fn is_resident(&self, address: ChunkAddress) -> bool {
        self.cache.contains(address)
    }

    /// Resident chunk addresses, oldest first
    pub fn resident_addresses(&self) -> Vec<ChunkAddress> {
        self.cache.addresses().collect()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Drop every resident chunk. Later requests regenerate from the seed,
    /// which discards any terrain edits and destruction.
    pub fn clear_cache(&mut self) {
        log::info!("Clearing {} resident chunks", self.cache.len());
        self.cache.clear();
    }

    /// Current ambient snapshot from the collaborator
    pub fn ambient(&self) -> AmbientSnapshot {
        self.ambient.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ambient::{TimeOfDaySnapshot, WeatherSnapshot};
    use crate::generator::tests::test_config;

    fn test_world(seed: u64) -> TerrainWorld {
        TerrainWorld::new(
            test_config(seed),
            Arc::new(BiomeRegistry::defaults()),
            Box::new(StaticAmbient::default()),
        )
    }

    /// World whose only biome is dense urban terrain, so destructibles are plentiful
    fn urban_world(seed: u64) -> TerrainWorld {
        let mut urban = BiomeRegistry::defaults().by_name("urban").clone();
        urban.building_density = 1.0;
        urban.vegetation_density = 1.0;
        let registry = Arc::new(BiomeRegistry::new(vec![urban], None).unwrap());
        TerrainWorld::new(test_config(seed), registry, Box::new(StaticAmbient::default()))
    }

    fn first_element(world: &mut TerrainWorld, bound: bool) -> ElementId {
        let chunk = world.chunk(ChunkAddress::new(0, 0));
        chunk
            .destructibles()
            .iter()
            .find(|d| d.parent.is_some() == bound)
            .map(|d| d.id)
            .unwrap()
    }

    #[test]
    fn test_seed_42_height_is_reproducible() {
        let config = TerrainConfig {
            chunk_size: 256,
            height_scale: 50.0,
            ..TerrainConfig::with_seed(42)
        };
        let a = TerrainWorld::new(config.clone(), Arc::new(BiomeRegistry::defaults()), Box::new(StaticAmbient::default()));
        let b = TerrainWorld::new(config, Arc::new(BiomeRegistry::defaults()), Box::new(StaticAmbient::default()));
        assert_eq!(a.height_at(0.0, 0.0).to_bits(), b.height_at(0.0, 0.0).to_bits());
        assert_eq!(a.biome_at(0.0, 0.0), b.biome_at(0.0, 0.0));
        assert_eq!(a.seed(), 42);
    }

    #[test]
    fn test_point_query_matches_resident_chunk() {
        let mut world = test_world(7);
        let probes = [(3.2, 4.9), (31.99, 0.0), (-0.5, -12.25), (40.0, 63.0)];
        let direct: Vec<_> = probes.iter().map(|&(x, z)| (world.height_at(x, z), world.biome_at(x, z))).collect();
        assert!(world.resident_addresses().is_empty());

        world.generate_terrain(16.0, 16.0, 40.0);
        for (&(x, z), &(h, b)) in probes.iter().zip(&direct) {
            assert!(world.is_resident(ChunkAddress::containing(x, z, 32)));
            assert_eq!(world.height_at(x, z), h);
            assert_eq!(world.biome_at(x, z), b);
        }
    }

    #[test]
    fn test_point_queries_do_not_populate_cache() {
        let world = test_world(7);
        for i in 0..20 {
            world.height_at(i as f64 * 50.0, -(i as f64) * 30.0);
            world.biome_at(i as f64 * 50.0, 0.0);
        }
        assert!(world.resident_addresses().is_empty());
        assert_eq!(world.cache_stats().misses, 0);
    }

    #[test]
    fn test_shared_edge_agrees_across_chunks() {
        let mut world = test_world(11);
        let left = world.chunk(ChunkAddress::new(0, 0));
        let right = world.chunk(ChunkAddress::new(1, 0));
        let fresh = test_world(11);

        for z in 0..32 {
            // The edge point x = 32 belongs to the right-hand chunk
            let expected = fresh.height_at(32.0, z as f64);
            assert_eq!(right.height(0, z), expected);
            assert_eq!(world.height_at(32.0, z as f64), expected);
            // The last column of the left chunk is one cell away and close in value
            assert!((left.height(31, z) - expected).abs() < 3.0);
        }
    }

    #[test]
    fn test_region_covers_square() {
        let mut world = test_world(3);
        let region = world.generate_terrain(0.0, 0.0, 20.0);

        assert_eq!(region.chunk_count(), 4);
        let expected: Vec<_> = [(-1, -1), (0, -1), (-1, 0), (0, 0)]
            .iter()
            .map(|&(x, z)| ChunkAddress::new(x, z))
            .collect();
        for address in &expected {
            assert!(region.chunks.contains_key(address));
            assert_eq!(region.biomes[address], region.chunks[address].dominant_biome());
        }
        assert_eq!(region.bounds.min_x, -32.0);
        assert_eq!(region.bounds.max_z, 32.0);

        let feature_total: usize = region.chunks.values().map(|c| c.features().len()).sum();
        let element_total: usize = region.chunks.values().map(|c| c.destructibles().len()).sum();
        assert_eq!(region.features.len(), feature_total);
        assert_eq!(region.destructibles.len(), element_total);
        assert_eq!(region.ambient, StaticAmbient::default().snapshot());
        assert_eq!(region.biome_histogram().values().sum::<usize>(), 4 * 32 * 32);
    }

    #[test]
    fn test_region_reuses_cached_chunks() {
        let mut world = test_world(3);
        let first = world.generate_terrain(0.0, 0.0, 20.0);
        let second = world.generate_terrain(0.0, 0.0, 20.0);

        let stats = world.cache_stats();
        assert_eq!(stats.generated, 4);
        assert_eq!(stats.misses, 4);
        assert_eq!(stats.hits, 4);
        for (address, chunk) in &first.chunks {
            assert!(Arc::ptr_eq(chunk, &second.chunks[address]));
        }
    }

    #[test]
    fn test_cache_bound_scenario() {
        let config = TerrainConfig {
            max_cache_size: 2,
            ..test_config(5)
        };
        let mut world = TerrainWorld::new(config, Arc::new(BiomeRegistry::defaults()), Box::new(StaticAmbient::default()));
        let (a, b, c) = (ChunkAddress::new(0, 0), ChunkAddress::new(5, 0), ChunkAddress::new(0, 5));

        let original = world.chunk(a);
        world.chunk(b);
        world.chunk(c);
        assert_eq!(world.resident_addresses(), vec![b, c]);

        let misses = world.cache_stats().misses;
        let again = world.chunk(a);
        assert_eq!(world.cache_stats().misses, misses + 1);
        assert_eq!(again.heights(), original.heights());
        assert!(world.resident_addresses().len() <= 2);
    }

    #[test]
    fn test_large_region_outlives_eviction() {
        let config = TerrainConfig {
            max_cache_size: 2,
            ..test_config(5)
        };
        let mut world = TerrainWorld::new(config, Arc::new(BiomeRegistry::defaults()), Box::new(StaticAmbient::default()));
        let region = world.generate_terrain(0.0, 0.0, 40.0);
        assert_eq!(region.chunk_count(), 16);
        assert_eq!(world.resident_addresses().len(), 2);
    }

    #[test]
    fn test_modify_terrain_falloff() {
        let mut world = test_world(21);
        let before = world.chunk(ChunkAddress::new(0, 0));

        let changed = world.modify_terrain(16.0, 16.0, 8.0, -4.0);
        assert_eq!(changed, vec![ChunkAddress::new(0, 0)]);

        let delta = |x: usize, z: usize| world.height_at(x as f64, z as f64) - before.height(x, z);
        assert!((delta(16, 16) + 4.0).abs() < 1e-4);
        assert!((delta(20, 16) + 2.0).abs() < 1e-4);
        assert!((delta(16, 22) + 1.0).abs() < 1e-4);
        assert_eq!(delta(24, 16), 0.0);
        assert_eq!(delta(30, 30), 0.0);
        assert_eq!(delta(0, 0), 0.0);
    }

    #[test]
    fn test_modify_terrain_spans_resident_chunks_only() {
        let mut world = test_world(21);
        world.chunk(ChunkAddress::new(0, 0));
        world.chunk(ChunkAddress::new(1, 0));

        // Circle straddles x = 32 and reaches into the non-resident row z = -1
        let edit = world.edit_terrain(32.0, 2.0, 6.0, 3.0);
        assert_eq!(edit.chunks, vec![ChunkAddress::new(0, 0), ChunkAddress::new(1, 0)]);
        assert!(edit.cells > 0);
        assert!(!world.is_resident(ChunkAddress::new(0, -1)));

        assert!(world.modify_terrain(500.0, 500.0, 10.0, 3.0).is_empty());
        assert!(world.modify_terrain(16.0, 16.0, 0.0, 3.0).is_empty());
        assert_eq!(world.resident_addresses().len(), 2);
    }

    #[test]
    fn test_edit_leaves_earlier_region_untouched() {
        let mut world = test_world(21);
        let region = world.generate_terrain(16.0, 16.0, 4.0);
        let address = ChunkAddress::new(0, 0);
        let before = region.chunk(address).unwrap().height(16, 16);

        world.modify_terrain(16.0, 16.0, 4.0, 10.0);
        assert_eq!(region.chunk(address).unwrap().height(16, 16), before);
        assert!((world.height_at(16.0, 16.0) - before - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_edit_skips_chunks_without_covered_cells() {
        let mut world = test_world(21);
        let (left, right) = (ChunkAddress::new(0, 0), ChunkAddress::new(1, 0));
        let left_snapshot = world.chunk(left);
        let right_snapshot = world.chunk(right);

        // Reaches the left chunk's bounds (x < 32) but not its last cell column (x = 31)
        let edit = world.edit_terrain(32.5, 16.0, 0.6, -2.0);
        assert_eq!(edit.chunks, vec![right]);
        assert_eq!(edit.cells, 2);

        assert!(Arc::ptr_eq(&left_snapshot, &world.chunk(left)));
        assert!(!Arc::ptr_eq(&right_snapshot, &world.chunk(right)));
    }

    #[test]
    fn test_world_can_move_across_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<std::sync::Mutex<TerrainWorld>>();

        let world = std::sync::Mutex::new(test_world(4));
        let address = ChunkAddress::new(2, -1);
        std::thread::scope(|scope| {
            scope.spawn(|| {
                if let Ok(mut world) = world.lock() {
                    world.chunk(address);
                }
            });
        });
        let world = world.into_inner().unwrap();
        assert!(world.is_resident(address));
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut world = urban_world(9);
        let id = first_element(&mut world, true);
        let kind = world.element(id).unwrap().kind;

        let debris = world.destroy_element(id).unwrap();
        assert_eq!(debris.len(), kind.debris_count());
        assert!(debris.iter().all(|d| d.source == kind));

        let element = world.element(id).unwrap();
        assert!(element.destroyed);
        assert_eq!(element.health, 0.0);
        assert!(element.destroyed_at.is_some());

        assert_eq!(world.destroy_element(id), Err(DestroyError::AlreadyDestroyed(id)));
        assert_eq!(world.damage_element(id, 5.0), Err(DestroyError::AlreadyDestroyed(id)));
        assert_eq!(world.element(id).unwrap().health, 0.0);
    }

    #[test]
    fn test_destroy_unknown_element() {
        let mut world = urban_world(9);
        let missing = ElementId::new(ChunkAddress::new(40, 40), 0);
        assert_eq!(world.destroy_element(missing), Err(DestroyError::NotFound(missing)));

        let chunk = world.chunk(ChunkAddress::new(0, 0));
        let past_end = ElementId::new(chunk.address(), chunk.destructibles().len() as u32);
        assert_eq!(world.destroy_element(past_end), Err(DestroyError::NotFound(past_end)));
    }

    #[test]
    fn test_destroying_bound_element_damages_parent() {
        let mut world = urban_world(12);
        let id = first_element(&mut world, true);
        let element = world.element(id).unwrap().clone();
        let parent = element.parent.unwrap();
        let before = world.feature(parent).unwrap().health;

        world.destroy_element(id).unwrap();
        let after = world.feature(parent).unwrap().health;
        assert_eq!(after, (before - element.max_health).max(0.0));
    }

    #[test]
    fn test_partial_damage() {
        let mut world = urban_world(4);
        let id = first_element(&mut world, true);
        let max = world.element(id).unwrap().max_health;

        assert!(world.damage_element(id, max * 0.5).unwrap().is_empty());
        assert_eq!(world.element(id).unwrap().health, max * 0.5);
        assert!(!world.element(id).unwrap().destroyed);

        assert!(world.damage_element(id, -3.0).unwrap().is_empty());
        assert_eq!(world.element(id).unwrap().health, max * 0.5);

        assert!(!world.damage_element(id, max).unwrap().is_empty());
        assert!(world.element(id).unwrap().destroyed);
    }

    #[test]
    fn test_debris_is_seeded() {
        let mut a = urban_world(6);
        let mut b = urban_world(6);
        let id = first_element(&mut a, true);
        first_element(&mut b, true);
        assert_eq!(a.destroy_element(id).unwrap(), b.destroy_element(id).unwrap());
    }

    #[test]
    fn test_clear_cache_regenerates_identically() {
        let mut world = urban_world(15);
        let address = ChunkAddress::new(0, 0);
        let original = world.chunk(address);
        let id = first_element(&mut world, true);
        world.destroy_element(id).unwrap();
        world.modify_terrain(8.0, 8.0, 5.0, -2.0);

        world.clear_cache();
        assert!(!world.is_resident(address));
        let fresh = world.chunk(address);
        assert_eq!(fresh.heights(), original.heights());
        assert_eq!(fresh.biomes(), original.biomes());
        assert_eq!(fresh.features(), original.features());
        assert!(!fresh.element(id).unwrap().destroyed);
    }

    #[test]
    fn test_ambient_is_passed_through() {
        let mut world = test_world(1);
        let storm = StaticAmbient::new(
            WeatherSnapshot {
                label: "storm".to_string(),
                effects: vec!["lightning".to_string()],
                environment: BTreeMap::from([("visibility".to_string(), 0.3)]),
            },
            TimeOfDaySnapshot {
                phase: "night".to_string(),
                sun_height: -0.6,
                ambient_light: 0.1,
            },
        );
        world.set_ambient(Box::new(storm.clone()));
        let region = world.generate_terrain(0.0, 0.0, 1.0);
        assert_eq!(region.ambient, storm.snapshot());
        assert_eq!(world.ambient(), storm.snapshot());
    }

    #[test]
    fn test_unset_seed_is_resolved_once() {
        let config = TerrainConfig {
            seed: None,
            ..test_config(0)
        };
        let world = TerrainWorld::new(config, Arc::new(BiomeRegistry::defaults()), Box::new(StaticAmbient::default()));
        assert_eq!(world.config().seed, Some(world.seed()));
        assert_eq!(world.height_at(10.0, 10.0), world.height_at(10.0, 10.0));
    }
}
