//! Biome registry.
//!
//! A biome is a read-only parameter set controlling elevation preference,
//! placement densities and eligible content. The registry is built once (from
//! the builtin table or a JSON file), wrapped in an `Arc` and shared by
//! reference; chunks store compact [`BiomeId`]s that index into it.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::features::{DestructibleKind, FeatureKind};

/// Index of a biome in its registry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BiomeId(pub u16);

impl BiomeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Generation parameters for one biome
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Biome {
    pub name: String,
    /// Tolerance around `base_height` before placement tails off (normalized units)
    pub height_variation: f32,
    /// Preferred normalized elevation, 0.0 (lowest) to 1.0 (highest)
    pub base_height: f32,
    pub vegetation_density: f32,
    pub building_density: f32,
    pub road_density: f32,
    #[serde(default)]
    pub rock_density: f32,
    /// Feature kinds the generator may place here
    #[serde(default)]
    pub features: Vec<FeatureKind>,
    /// Free-standing destructible kinds the generator may place here
    #[serde(default)]
    pub destructibles: Vec<DestructibleKind>,
    /// Tags consumed by the weather/effects layer
    #[serde(default)]
    pub weather_effects: Vec<String>,
}

impl Biome {
    /// Create a biome with no content
    pub fn new(name: &str, base_height: f32, height_variation: f32) -> Self {
        Self {
            name: name.to_string(),
            height_variation,
            base_height,
            vegetation_density: 0.0,
            building_density: 0.0,
            road_density: 0.0,
            rock_density: 0.0,
            features: Vec::new(),
            destructibles: Vec::new(),
            weather_effects: Vec::new(),
        }
    }

    /// Set vegetation, building and road densities
    pub fn with_densities(mut self, vegetation: f32, building: f32, road: f32) -> Self {
        self.vegetation_density = vegetation;
        self.building_density = building;
        self.road_density = road;
        self
    }

    pub fn with_rocks(mut self, density: f32) -> Self {
        self.rock_density = density;
        self
    }

    pub fn with_feature(mut self, kind: FeatureKind) -> Self {
        self.features.push(kind);
        self
    }

    pub fn with_destructible(mut self, kind: DestructibleKind) -> Self {
        self.destructibles.push(kind);
        self
    }

    pub fn with_weather(mut self, tag: &str) -> Self {
        self.weather_effects.push(tag.to_string());
        self
    }

    /// Density parameter governing a feature kind
    pub fn density_for(&self, kind: FeatureKind) -> f32 {
        match kind {
            FeatureKind::Building => self.building_density,
            FeatureKind::Road => self.road_density,
            FeatureKind::Tree | FeatureKind::Bush => self.vegetation_density,
            FeatureKind::Rock | FeatureKind::Wreck => self.rock_density,
        }
    }

    /// How well a normalized height suits this biome, in [0.2, 1.0]. Peaks at
    /// `base_height` and falls off quadratically over `height_variation`.
    pub fn elevation_affinity(&self, normalized_height: f32) -> f32 {
        let spread = self.height_variation.max(0.05);
        let d = (normalized_height - self.base_height) / spread;
        (1.0 - d * d).clamp(0.2, 1.0)
    }

    pub fn allows_feature(&self, kind: FeatureKind) -> bool {
        self.features.contains(&kind)
    }

    /// RGB color for previews
    pub fn color(&self) -> (u8, u8, u8) {
        match self.name.as_str() {
            "tundra" => (210, 220, 225),
            "mountains" => (130, 120, 115),
            "forest" => (40, 110, 45),
            "plains" => (120, 170, 80),
            "wasteland" => (150, 130, 90),
            "urban" => (110, 110, 120),
            "desert" => (220, 195, 130),
            other => {
                // Stable pseudo-color for custom biomes
                let h = other.bytes().fold(0u32, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u32));
                ((h & 0xff) as u8, ((h >> 8) & 0xff) as u8, ((h >> 16) & 0xff) as u8)
            }
        }
    }
}

/// On-disk layout of a biome table
#[derive(Debug, Deserialize, Serialize)]
struct BiomeFile {
    #[serde(default)]
    default: Option<String>,
    biomes: Vec<Biome>,
}

/// Ordered, read-only table of biomes with a designated fallback.
#[derive(Clone, Debug)]
pub struct BiomeRegistry {
    biomes: Vec<Biome>,
    default: BiomeId,
}

impl BiomeRegistry {
    /// Build a registry from an ordered list. Fails on an empty list or
    /// duplicate names. An unknown `default_name` falls back to the first biome.
    pub fn new(biomes: Vec<Biome>, default_name: Option<&str>) -> Result<Self, ConfigError> {
        if biomes.is_empty() {
            return Err(ConfigError::EmptyRegistry);
        }

        let mut seen = HashSet::new();
        for biome in &biomes {
            if !seen.insert(biome.name.as_str()) {
                return Err(ConfigError::DuplicateBiome(biome.name.clone()));
            }
        }

        let biomes: Vec<Biome> = biomes.into_iter().take(u16::MAX as usize).collect();
        let default = match default_name {
            Some(name) => match biomes.iter().position(|b| b.name == name) {
                Some(idx) => BiomeId(idx as u16),
                None => {
                    log::warn!(
                        "Default biome '{}' is not registered, falling back to '{}'",
                        name,
                        biomes[0].name
                    );
                    BiomeId(0)
                }
            },
            None => BiomeId(0),
        };

        Ok(Self { biomes, default })
    }

    /// Builtin table, ordered from cold highlands to hot lowlands so that
    /// neighbouring quantization bands are plausible neighbours.
    pub fn defaults() -> Self {
        let biomes = vec![
            Biome::new("tundra", 0.55, 0.35)
                .with_densities(0.05, 0.01, 0.02)
                .with_rocks(0.08)
                .with_feature(FeatureKind::Rock)
                .with_feature(FeatureKind::Tree)
                .with_feature(FeatureKind::Road)
                .with_destructible(DestructibleKind::Pole)
                .with_destructible(DestructibleKind::Sign)
                .with_weather("snow")
                .with_weather("frost"),
            Biome::new("mountains", 0.8, 0.3)
                .with_densities(0.04, 0.0, 0.01)
                .with_rocks(0.2)
                .with_feature(FeatureKind::Rock)
                .with_feature(FeatureKind::Tree)
                .with_feature(FeatureKind::Road)
                .with_destructible(DestructibleKind::Pole)
                .with_destructible(DestructibleKind::Fence)
                .with_weather("fog")
                .with_weather("snow"),
            Biome::new("forest", 0.5, 0.3)
                .with_densities(0.35, 0.01, 0.02)
                .with_rocks(0.04)
                .with_feature(FeatureKind::Tree)
                .with_feature(FeatureKind::Bush)
                .with_feature(FeatureKind::Rock)
                .with_feature(FeatureKind::Road)
                .with_destructible(DestructibleKind::Fence)
                .with_destructible(DestructibleKind::Crate)
                .with_weather("rain")
                .with_weather("fog"),
            Biome::new("plains", 0.4, 0.3)
                .with_densities(0.08, 0.03, 0.06)
                .with_rocks(0.02)
                .with_feature(FeatureKind::Tree)
                .with_feature(FeatureKind::Bush)
                .with_feature(FeatureKind::Building)
                .with_feature(FeatureKind::Road)
                .with_feature(FeatureKind::Wreck)
                .with_destructible(DestructibleKind::Fence)
                .with_destructible(DestructibleKind::Pole)
                .with_destructible(DestructibleKind::Barrel)
                .with_weather("rain")
                .with_weather("wind"),
            Biome::new("wasteland", 0.45, 0.4)
                .with_densities(0.02, 0.02, 0.04)
                .with_rocks(0.06)
                .with_feature(FeatureKind::Rock)
                .with_feature(FeatureKind::Wreck)
                .with_feature(FeatureKind::Building)
                .with_feature(FeatureKind::Road)
                .with_destructible(DestructibleKind::Barrel)
                .with_destructible(DestructibleKind::Crate)
                .with_destructible(DestructibleKind::Sign)
                .with_weather("dust")
                .with_weather("acid_rain"),
            Biome::new("urban", 0.35, 0.25)
                .with_densities(0.04, 0.15, 0.12)
                .with_rocks(0.03)
                .with_feature(FeatureKind::Building)
                .with_feature(FeatureKind::Road)
                .with_feature(FeatureKind::Wreck)
                .with_feature(FeatureKind::Tree)
                .with_destructible(DestructibleKind::Barrel)
                .with_destructible(DestructibleKind::Crate)
                .with_destructible(DestructibleKind::Pole)
                .with_destructible(DestructibleKind::Sign)
                .with_weather("smog")
                .with_weather("rain"),
            Biome::new("desert", 0.3, 0.35)
                .with_densities(0.01, 0.01, 0.03)
                .with_rocks(0.05)
                .with_feature(FeatureKind::Rock)
                .with_feature(FeatureKind::Wreck)
                .with_feature(FeatureKind::Road)
                .with_feature(FeatureKind::Bush)
                .with_destructible(DestructibleKind::Barrel)
                .with_destructible(DestructibleKind::Sign)
                .with_weather("sandstorm")
                .with_weather("heat_haze"),
        ];

        Self {
            biomes,
            default: BiomeId(3), // plains
        }
    }

    /// Parse a JSON biome table: `{ "default": "name", "biomes": [...] }`
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let file: BiomeFile = serde_json::from_str(json)?;
        Self::new(file.biomes, file.default.as_deref())
    }

    /// Load a JSON biome table from disk
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Serialize back to the JSON table format
    pub fn to_json(&self) -> Result<String, ConfigError> {
        let file = BiomeFile {
            default: Some(self.default_biome().name.clone()),
            biomes: self.biomes.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn len(&self) -> usize {
        self.biomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.biomes.is_empty()
    }

    pub fn get(&self, id: BiomeId) -> Option<&Biome> {
        self.biomes.get(id.index())
    }

    /// Resolve an id, falling back to the default biome for unknown ids
    pub fn resolve(&self, id: BiomeId) -> &Biome {
        self.get(id).unwrap_or_else(|| self.default_biome())
    }

    pub fn id_of(&self, name: &str) -> Option<BiomeId> {
        self.biomes
            .iter()
            .position(|b| b.name == name)
            .map(|idx| BiomeId(idx as u16))
    }

    /// Look up by name, falling back to the default biome
    pub fn by_name(&self, name: &str) -> &Biome {
        self.id_of(name)
            .and_then(|id| self.get(id))
            .unwrap_or_else(|| self.default_biome())
    }

    pub fn default_id(&self) -> BiomeId {
        self.default
    }

    pub fn default_biome(&self) -> &Biome {
        &self.biomes[self.default.index()]
    }

    pub fn contains(&self, id: BiomeId) -> bool {
        id.index() < self.biomes.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BiomeId, &Biome)> {
        self.biomes
            .iter()
            .enumerate()
            .map(|(idx, b)| (BiomeId(idx as u16), b))
    }

    /// Map a noise value in [-1, 1] linearly onto the ordered biome list.
    /// Out-of-range input is clamped, so the result is always registered.
    pub fn quantize(&self, value: f64) -> BiomeId {
        let count = self.biomes.len();
        let t = ((value + 1.0) * 0.5).clamp(0.0, 1.0);
        let idx = ((t * count as f64) as usize).min(count - 1);
        BiomeId(idx as u16)
    }
}

impl Default for BiomeRegistry {
    fn default() -> Self {
        Self::defaults()
    }
}
