//! Generated terrain chunk.
//!
//! A chunk is fixed at generation time except for two kinds of in-place edit:
//! additive height deltas (craters, collapses) and destructible health.

use chrono::{DateTime, Utc};

use crate::biomes::BiomeId;
use crate::coords::{ChunkAddress, ElementId, FeatureId, WorldBounds};
use crate::features::{DestructibleElement, Feature};
use crate::grid::Grid;

/// One square tile of generated terrain
#[derive(Clone, Debug)]
pub struct Chunk {
    address: ChunkAddress,
    size: usize,
    heights: Grid<f32>,
    biomes: Grid<BiomeId>,
    dominant_biome: BiomeId,
    features: Vec<Feature>,
    destructibles: Vec<DestructibleElement>,
    created_at: DateTime<Utc>,
}

impl Chunk {
    /// Assemble a chunk. The dominant biome is computed from `biomes`.
    pub fn new(
        address: ChunkAddress,
        heights: Grid<f32>,
        biomes: Grid<BiomeId>,
        features: Vec<Feature>,
        destructibles: Vec<DestructibleElement>,
    ) -> Self {
        debug_assert_eq!(heights.width, biomes.width);
        debug_assert_eq!(heights.height, biomes.height);
        let dominant_biome = dominant_biome(&biomes);
        Self {
            address,
            size: heights.width,
            heights,
            biomes,
            dominant_biome,
            features,
            destructibles,
            created_at: Utc::now(),
        }
    }

    pub fn address(&self) -> ChunkAddress {
        self.address
    }

    /// Edge length in cells (= world units)
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn heights(&self) -> &Grid<f32> {
        &self.heights
    }

    pub fn biomes(&self) -> &Grid<BiomeId> {
        &self.biomes
    }

    pub fn dominant_biome(&self) -> BiomeId {
        self.dominant_biome
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn destructibles(&self) -> &[DestructibleElement] {
        &self.destructibles
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn height(&self, x: usize, z: usize) -> f32 {
        *self.heights.get(x, z)
    }

    pub fn biome(&self, x: usize, z: usize) -> BiomeId {
        *self.biomes.get(x, z)
    }

    pub fn bounds(&self) -> WorldBounds {
        self.address.bounds(self.size)
    }

    /// World coordinates of a cell
    pub fn cell_world(&self, x: usize, z: usize) -> (f64, f64) {
        let (ox, oz) = self.address.origin(self.size);
        (ox + x as f64, oz + z as f64)
    }

    /// Cell owning a world point, if the point lies in this chunk
    pub fn local_cell(&self, world_x: f64, world_z: f64) -> Option<(usize, usize)> {
        let (ox, oz) = self.address.origin(self.size);
        let lx = (world_x - ox).floor();
        let lz = (world_z - oz).floor();
        if lx >= 0.0 && lz >= 0.0 && (lx as usize) < self.size && (lz as usize) < self.size {
            Some((lx as usize, lz as usize))
        } else {
            None
        }
    }

    pub fn feature(&self, id: FeatureId) -> Option<&Feature> {
        if id.chunk != self.address {
            return None;
        }
        self.features.get(id.index as usize)
    }

    pub(crate) fn feature_mut(&mut self, id: FeatureId) -> Option<&mut Feature> {
        if id.chunk != self.address {
            return None;
        }
        self.features.get_mut(id.index as usize)
    }

    pub fn element(&self, id: ElementId) -> Option<&DestructibleElement> {
        if id.chunk != self.address {
            return None;
        }
        self.destructibles.get(id.index as usize)
    }

    pub(crate) fn element_mut(&mut self, id: ElementId) -> Option<&mut DestructibleElement> {
        if id.chunk != self.address {
            return None;
        }
        self.destructibles.get_mut(id.index as usize)
    }

    /// Add `delta * (1 - distance / radius)` to every cell within `radius` of
    /// the world point `(center_x, center_z)`. Returns the number of cells edited.
    pub(crate) fn apply_radial_delta(
        &mut self,
        center_x: f64,
        center_z: f64,
        radius: f64,
        delta: f32,
    ) -> usize {
        if !(radius > 0.0) {
            return 0;
        }

        let (ox, oz) = self.address.origin(self.size);
        let last = self.size as f64 - 1.0;
        let min_x = (center_x - radius - ox).floor().clamp(0.0, last) as usize;
        let max_x = (center_x + radius - ox).ceil().clamp(0.0, last) as usize;
        let min_z = (center_z - radius - oz).floor().clamp(0.0, last) as usize;
        let max_z = (center_z + radius - oz).ceil().clamp(0.0, last) as usize;

        let mut edited = 0;
        for z in min_z..=max_z {
            for x in min_x..=max_x {
                let dx = ox + x as f64 - center_x;
                let dz = oz + z as f64 - center_z;
                let dist = (dx * dx + dz * dz).sqrt();
                if dist <= radius {
                    let falloff = (1.0 - dist / radius) as f32;
                    *self.heights.get_mut(x, z) += delta * falloff;
                    edited += 1;
                }
            }
        }
        edited
    }

    /// Whether any cell lies within `radius` of the world point. Same
    /// inclusion rule as [`Chunk::apply_radial_delta`].
    pub(crate) fn has_cell_within(&self, center_x: f64, center_z: f64, radius: f64) -> bool {
        let (ox, oz) = self.address.origin(self.size);
        let last = self.size as f64 - 1.0;
        // Nearest cell per axis: the rounded coordinate, clamped into the grid
        let dx = ox + (center_x - ox).round().clamp(0.0, last) - center_x;
        let dz = oz + (center_z - oz).round().clamp(0.0, last) - center_z;
        (dx * dx + dz * dz).sqrt() <= radius
    }

    /// Approximate heap footprint in bytes
    pub fn memory_size(&self) -> usize {
        std::mem::size_of::<Self>()
            + self.heights.len() * std::mem::size_of::<f32>()
            + self.biomes.len() * std::mem::size_of::<BiomeId>()
            + self.features.capacity() * std::mem::size_of::<Feature>()
            + self.destructibles.capacity() * std::mem::size_of::<DestructibleElement>()
    }
}

/// Most frequent biome in the grid; ties go to the lowest id
pub fn dominant_biome(biomes: &Grid<BiomeId>) -> BiomeId {
    let mut counts: Vec<usize> = Vec::new();
    for &id in biomes.as_slice() {
        let idx = id.index();
        if idx >= counts.len() {
            counts.resize(idx + 1, 0);
        }
        counts[idx] += 1;
    }

    let mut best = 0;
    for (idx, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = idx;
        }
    }
    BiomeId(best as u16)
}
