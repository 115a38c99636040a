//! Construction-time configuration.
//!
//! Every field is optional in JSON; missing fields take their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default chunk edge length in world units
pub const DEFAULT_CHUNK_SIZE: usize = 256;
/// Default maximum number of resident chunks
pub const DEFAULT_MAX_CACHE_SIZE: usize = 100;

const MAX_DETAIL_LEVEL: u32 = 16;

/// Terrain engine configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Chunk edge length in world units (one grid cell per unit)
    pub chunk_size: usize,
    /// Heightmap multiplier applied after remapping noise to [0, 1]
    pub height_scale: f32,
    /// Heightmap octave count
    pub detail_level: u32,
    /// World seed; drawn at random when unset
    pub seed: Option<u64>,
    /// Reserved: the quantized biome map does not blend
    pub enable_biome_blending: bool,
    /// Generate destructible elements
    pub enable_destructibles: bool,
    pub max_cache_size: usize,

    /// World-to-noise scale for elevation
    pub terrain_frequency: f64,
    /// World-to-noise scale for biomes (coarser than terrain)
    pub biome_frequency: f64,
    /// Cell stride of the feature placement pass
    pub feature_stride: usize,
    /// Cell stride of the free-standing destructible pass
    pub destructible_stride: usize,
    /// Acceptance probability for a free-standing destructible that passes the noise gate
    pub free_destructible_chance: f32,
    /// Detail-noise value a point must exceed to host a free-standing destructible
    pub free_destructible_threshold: f64,
    /// Derive placement draws from the world seed (reproducible content)
    pub deterministic_placement: bool,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            height_scale: 50.0,
            detail_level: 4,
            seed: None,
            enable_biome_blending: false,
            enable_destructibles: true,
            max_cache_size: DEFAULT_MAX_CACHE_SIZE,
            terrain_frequency: 0.01,
            biome_frequency: 0.002,
            feature_stride: 8,
            destructible_stride: 16,
            free_destructible_chance: 0.1,
            free_destructible_threshold: 0.3,
            deterministic_placement: true,
        }
    }
}

impl TerrainConfig {
    /// Default configuration with a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Parse a JSON configuration
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON configuration file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// The configured seed, or a fresh random one
    pub fn resolved_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// Clamp values the generator cannot work with, warning about each change.
    pub fn validated(mut self) -> Self {
        if self.chunk_size == 0 {
            log::warn!("chunk_size 0 is invalid, using {}", DEFAULT_CHUNK_SIZE);
            self.chunk_size = DEFAULT_CHUNK_SIZE;
        }
        if self.max_cache_size == 0 {
            log::warn!("max_cache_size 0 is invalid, using 1");
            self.max_cache_size = 1;
        }
        if self.detail_level == 0 || self.detail_level > MAX_DETAIL_LEVEL {
            let clamped = self.detail_level.clamp(1, MAX_DETAIL_LEVEL);
            log::warn!("detail_level {} out of range, using {}", self.detail_level, clamped);
            self.detail_level = clamped;
        }
        if self.feature_stride == 0 {
            log::warn!("feature_stride 0 is invalid, using 1");
            self.feature_stride = 1;
        }
        if self.destructible_stride == 0 {
            log::warn!("destructible_stride 0 is invalid, using 1");
            self.destructible_stride = 1;
        }
        if !(self.terrain_frequency > 0.0) {
            log::warn!("terrain_frequency {} is invalid, using 0.01", self.terrain_frequency);
            self.terrain_frequency = 0.01;
        }
        if !(self.biome_frequency > 0.0) {
            log::warn!("biome_frequency {} is invalid, using 0.002", self.biome_frequency);
            self.biome_frequency = 0.002;
        }
        if !(0.0..=1.0).contains(&self.free_destructible_chance) {
            let clamped = if self.free_destructible_chance > 1.0 { 1.0 } else { 0.0 };
            log::warn!(
                "free_destructible_chance {} out of range, using {}",
                self.free_destructible_chance,
                clamped
            );
            self.free_destructible_chance = clamped;
        }
        if !self.height_scale.is_finite() {
            log::warn!("height_scale {} is not finite, using 50", self.height_scale);
            self.height_scale = 50.0;
        }
        self
    }
}
