//! Procedural terrain engine
//!
//! Seeded gradient noise, a biome registry, chunk generation with feature and
//! destructible placement, a bounded chunk cache and the world facade that
//! ties them together.

pub mod ambient;
pub mod biomes;
pub mod cache;
pub mod chunk;
pub mod config;
pub mod coords;
pub mod error;
pub mod export;
pub mod features;
pub mod generator;
pub mod gradient;
pub mod grid;
pub mod seeds;
pub mod world;

pub use ambient::{AmbientSnapshot, AmbientSource, StaticAmbient, TimeOfDaySnapshot, WeatherSnapshot};
pub use biomes::{Biome, BiomeId, BiomeRegistry};
pub use cache::{CacheStats, TerrainCache};
pub use chunk::Chunk;
pub use config::TerrainConfig;
pub use coords::{ChunkAddress, ElementId, FeatureId, WorldBounds, WorldPos};
pub use error::{ConfigError, DestroyError, ParseIdError};
pub use features::{Debris, DestructibleElement, DestructibleKind, Feature, FeatureGeometry, FeatureKind};
pub use generator::ChunkGenerator;
pub use gradient::GradientNoise;
pub use world::{TerrainEdit, TerrainRegion, TerrainWorld};
