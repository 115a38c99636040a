//! Debug previews of generated regions: a shaded biome map as PNG and a JSON
//! summary.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;

use chrono::{DateTime, Utc};
use image::{ImageBuffer, Rgb, RgbImage};
use serde::{Deserialize, Serialize};

use crate::ambient::AmbientSnapshot;
use crate::biomes::BiomeRegistry;
use crate::cache::CacheStats;
use crate::coords::{ChunkAddress, WorldBounds};
use crate::world::TerrainRegion;

const INTACT_ELEMENT_COLOR: [u8; 3] = [250, 220, 60];
const DESTROYED_ELEMENT_COLOR: [u8; 3] = [150, 20, 20];

/// Render a region: biome colors shaded by height with a hillshade, features
/// drawn as discs and destructibles as single pixels.
/// One pixel per world unit, `+x` right and `+z` down.
pub fn render_region(region: &TerrainRegion, registry: &BiomeRegistry, height_scale: f32) -> RgbImage {
    let width = region.bounds.width().max(1.0) as u32;
    let depth = region.bounds.depth().max(1.0) as u32;
    let mut img: RgbImage = ImageBuffer::from_pixel(width, depth, Rgb([0, 0, 0]));

    // Light from the northwest, elevated
    let light = normalize_vec3(-1.0, -1.0, 2.0);
    let scale = if height_scale > 0.0 { height_scale } else { 1.0 };

    for chunk in region.chunks.values() {
        let size = chunk.size();
        let (ox, oz) = chunk.cell_world(0, 0);
        let px0 = (ox - region.bounds.min_x) as u32;
        let pz0 = (oz - region.bounds.min_z) as u32;

        for (x, z, &h) in chunk.heights().iter() {
            let left = chunk.height(x.saturating_sub(1), z);
            let right = chunk.height((x + 1).min(size - 1), z);
            let up = chunk.height(x, z.saturating_sub(1));
            let down = chunk.height(x, (z + 1).min(size - 1));
            let normal = normalize_vec3(left - right, up - down, 2.0);
            let diffuse = (normal[0] * light[0] + normal[1] * light[1] + normal[2] * light[2]).max(0.0);

            let elevation = (h / scale).clamp(0.0, 1.0);
            let shade = 0.35 + 0.35 * diffuse + 0.3 * elevation;
            let (r, g, b) = registry.resolve(chunk.biome(x, z)).color();
            let color = [
                (r as f32 * shade).clamp(0.0, 255.0) as u8,
                (g as f32 * shade).clamp(0.0, 255.0) as u8,
                (b as f32 * shade).clamp(0.0, 255.0) as u8,
            ];
            put(&mut img, px0 + x as u32, pz0 + z as u32, color);
        }
    }

    for feature in &region.features {
        let (r, g, b) = feature.kind().color();
        let radius = (feature.geometry.footprint_radius() * feature.scale).clamp(0.5, 8.0);
        let cx = feature.position.x as f64 - region.bounds.min_x;
        let cz = feature.position.z as f64 - region.bounds.min_z;
        fill_disc(&mut img, cx, cz, radius as f64, [r, g, b]);
    }

    for element in &region.destructibles {
        let color = if element.destroyed {
            DESTROYED_ELEMENT_COLOR
        } else {
            INTACT_ELEMENT_COLOR
        };
        let px = element.position.x as f64 - region.bounds.min_x;
        let pz = element.position.z as f64 - region.bounds.min_z;
        if px >= 0.0 && pz >= 0.0 {
            put(&mut img, px as u32, pz as u32, color);
        }
    }

    img
}

/// Render a region and save it as PNG
pub fn export_region_png(
    region: &TerrainRegion,
    registry: &BiomeRegistry,
    height_scale: f32,
    path: &str,
) -> Result<(), image::ImageError> {
    render_region(region, registry, height_scale).save(path)
}

fn put(img: &mut RgbImage, x: u32, y: u32, color: [u8; 3]) {
    if x < img.width() && y < img.height() {
        img.put_pixel(x, y, Rgb(color));
    }
}

fn fill_disc(img: &mut RgbImage, cx: f64, cz: f64, radius: f64, color: [u8; 3]) {
    let min_x = (cx - radius).floor().max(0.0) as u32;
    let max_x = (cx + radius).ceil().max(0.0) as u32;
    let min_z = (cz - radius).floor().max(0.0) as u32;
    let max_z = (cz + radius).ceil().max(0.0) as u32;
    for z in min_z..=max_z {
        for x in min_x..=max_x {
            let dx = x as f64 + 0.5 - cx;
            let dz = z as f64 + 0.5 - cz;
            if dx * dx + dz * dz <= radius * radius {
                put(img, x, z, color);
            }
        }
    }
}

fn normalize_vec3(x: f32, y: f32, z: f32) -> [f32; 3] {
    let len = (x * x + y * y + z * z).sqrt();
    [x / len, y / len, z / len]
}

/// Exported region data
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegionSummary {
    pub generated_at: DateTime<Utc>,
    pub seed: u64,
    pub center: (f64, f64),
    pub radius: f64,
    pub bounds: WorldBounds,
    pub min_height: f32,
    pub max_height: f32,
    /// Cell count per biome name
    pub biome_cells: BTreeMap<String, usize>,
    /// Feature count per kind name
    pub features: BTreeMap<String, usize>,
    pub destructibles: DestructibleSummary,
    pub chunks: Vec<ChunkSummary>,
    pub ambient: AmbientSnapshot,
    pub cache: CacheSummary,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DestructibleSummary {
    pub total: usize,
    pub destroyed: usize,
    pub bound: usize,
    /// Count per kind name
    pub by_kind: BTreeMap<String, usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChunkSummary {
    pub address: ChunkAddress,
    pub dominant_biome: String,
    pub features: usize,
    pub destructibles: usize,
    pub min_height: f32,
    pub max_height: f32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CacheSummary {
    pub hits: usize,
    pub misses: usize,
    pub hit_rate: f32,
    pub generated: usize,
    pub evictions: usize,
    pub average_generation_ms: f64,
    pub resident: usize,
}

impl From<CacheStats> for CacheSummary {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            hit_rate: stats.hit_rate(),
            generated: stats.generated,
            evictions: stats.evictions,
            average_generation_ms: stats.average_generation_time().as_secs_f64() * 1000.0,
            resident: stats.resident,
        }
    }
}

/// Build the summary of a region
pub fn summarize_region(
    region: &TerrainRegion,
    registry: &BiomeRegistry,
    seed: u64,
    center: (f64, f64),
    radius: f64,
    stats: CacheStats,
) -> RegionSummary {
    let (min_height, max_height) = region.height_range().unwrap_or((0.0, 0.0));

    let biome_cells = region
        .biome_histogram()
        .into_iter()
        .map(|(id, count)| (registry.resolve(id).name.clone(), count))
        .collect();

    let mut features = BTreeMap::new();
    for feature in &region.features {
        *features.entry(feature.kind().name().to_string()).or_insert(0) += 1;
    }

    let mut destructibles = DestructibleSummary::default();
    for element in &region.destructibles {
        destructibles.total += 1;
        if element.destroyed {
            destructibles.destroyed += 1;
        }
        if element.parent.is_some() {
            destructibles.bound += 1;
        }
        *destructibles.by_kind.entry(element.kind.name().to_string()).or_insert(0) += 1;
    }

    let chunks = region
        .chunks
        .iter()
        .map(|(&address, chunk)| {
            let (lo, hi) = chunk.heights().min_max().unwrap_or((0.0, 0.0));
            ChunkSummary {
                address,
                dominant_biome: registry.resolve(chunk.dominant_biome()).name.clone(),
                features: chunk.features().len(),
                destructibles: chunk.destructibles().len(),
                min_height: lo,
                max_height: hi,
            }
        })
        .collect();

    RegionSummary {
        generated_at: Utc::now(),
        seed,
        center,
        radius,
        bounds: region.bounds,
        min_height,
        max_height,
        biome_cells,
        features,
        destructibles,
        chunks,
        ambient: region.ambient.clone(),
        cache: stats.into(),
    }
}

/// Write a region summary as pretty JSON
pub fn export_region_json(summary: &RegionSummary, path: &str) -> std::io::Result<()> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, summary)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::TerrainWorld;
    use crate::generator::tests::test_config;
    use crate::ambient::StaticAmbient;
    use std::sync::Arc;

    fn region() -> (TerrainWorld, TerrainRegion) {
        let mut world = TerrainWorld::new(
            test_config(17),
            Arc::new(BiomeRegistry::defaults()),
            Box::new(StaticAmbient::default()),
        );
        let region = world.generate_terrain(0.0, 0.0, 20.0);
        (world, region)
    }

    #[test]
    fn test_render_covers_region() {
        let (world, region) = region();
        let img = render_region(&region, world.registry(), world.config().height_scale);
        assert_eq!(img.width(), 64);
        assert_eq!(img.height(), 64);
        // Every pixel belongs to some chunk, so nothing is left black
        assert!(img.pixels().all(|p| p.0 != [0, 0, 0]));
    }

    #[test]
    fn test_summary_counts() {
        let (world, region) = region();
        let summary = summarize_region(&region, world.registry(), world.seed(), (0.0, 0.0), 20.0, world.cache_stats());

        assert_eq!(summary.seed, 17);
        assert_eq!(summary.chunks.len(), 4);
        assert_eq!(summary.biome_cells.values().sum::<usize>(), 4 * 32 * 32);
        assert_eq!(summary.features.values().sum::<usize>(), region.features.len());
        assert_eq!(summary.destructibles.total, region.destructibles.len());
        assert_eq!(summary.destructibles.destroyed, 0);
        assert_eq!(summary.cache.misses, 4);
        assert!(summary.min_height <= summary.max_height);
    }

    #[test]
    fn test_summary_json_file() {
        let (world, region) = region();
        let summary = summarize_region(&region, world.registry(), world.seed(), (0.0, 0.0), 20.0, world.cache_stats());
        let path = std::env::temp_dir().join(format!("terrain_summary_{}.json", std::process::id()));
        let path = path.to_string_lossy().to_string();

        export_region_json(&summary, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: RegionSummary = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.chunks.len(), summary.chunks.len());
        assert_eq!(parsed.destructibles, summary.destructibles);
        let _ = std::fs::remove_file(&path);
    }
}
