use std::sync::Arc;

use clap::Parser;

use survival_terrain::export::{export_region_json, export_region_png, summarize_region};
use survival_terrain::{BiomeRegistry, StaticAmbient, TerrainConfig, TerrainWorld};

#[derive(Parser, Debug)]
#[command(name = "terrain_preview")]
#[command(about = "Generate a terrain region and export previews")]
struct Args {
    /// Random seed (overrides the config file; random if neither sets one)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Terrain configuration JSON
    #[arg(long)]
    config: Option<String>,

    /// Biome table JSON (builtin biomes if not specified)
    #[arg(long)]
    biomes: Option<String>,

    /// Region center X in world units
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    x: f64,

    /// Region center Z in world units
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    z: f64,

    /// Region half-width in world units
    #[arg(short, long, default_value = "256")]
    radius: f64,

    /// Blast a crater at the region center, as radius:depth (e.g. "24:6")
    #[arg(long, value_parser = parse_crater)]
    crater: Option<(f64, f32)>,

    /// Destroy this many destructible elements in the region
    #[arg(long, default_value = "0")]
    destroy: usize,

    /// Export a shaded biome map to PNG
    #[arg(long)]
    png: Option<String>,

    /// Export a region summary to JSON
    #[arg(long)]
    json: Option<String>,
}

fn parse_crater(value: &str) -> Result<(f64, f32), String> {
    let (radius, depth) = value
        .split_once(':')
        .ok_or_else(|| format!("expected radius:depth, got '{}'", value))?;
    let radius = radius
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid crater radius '{}': {}", radius, e))?;
    let depth = depth
        .trim()
        .parse::<f32>()
        .map_err(|e| format!("invalid crater depth '{}': {}", depth, e))?;
    if !(radius > 0.0) {
        return Err(format!("crater radius must be positive, got {}", radius));
    }
    Ok((radius, depth))
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match TerrainConfig::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => TerrainConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let registry = match &args.biomes {
        Some(path) => match BiomeRegistry::load_from(path) {
            Ok(registry) => registry,
            Err(e) => {
                eprintln!("Failed to load biomes {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => BiomeRegistry::defaults(),
    };

    let mut world = TerrainWorld::new(config, Arc::new(registry), Box::new(StaticAmbient::default()));
    println!("Generating terrain with seed: {}", world.seed());
    println!(
        "Region: center ({:.1}, {:.1}), radius {:.1}, chunk size {}",
        args.x,
        args.z,
        args.radius,
        world.config().chunk_size
    );

    let region = world.generate_terrain(args.x, args.z, args.radius);
    println!(
        "Generated {} chunks: {} features, {} destructibles",
        region.chunk_count(),
        region.features.len(),
        region.destructibles.len()
    );
    if let Some((lo, hi)) = region.height_range() {
        println!("Height range: {:.2} to {:.2}", lo, hi);
    }
    println!(
        "Center: height {:.2}, biome {}",
        world.height_at(args.x, args.z),
        world.biome_name_at(args.x, args.z)
    );

    if args.destroy > 0 {
        let targets: Vec<_> = region
            .destructibles
            .iter()
            .filter(|d| !d.destroyed)
            .take(args.destroy)
            .map(|d| d.id)
            .collect();
        let mut destroyed = 0;
        let mut debris = 0;
        for id in targets {
            match world.destroy_element(id) {
                Ok(pieces) => {
                    destroyed += 1;
                    debris += pieces.len();
                }
                Err(e) => println!("  {}", e),
            }
        }
        println!("Destroyed {} elements ({} debris pieces)", destroyed, debris);
    }

    if let Some((radius, depth)) = args.crater {
        let edit = world.edit_terrain(args.x, args.z, radius, -depth);
        println!(
            "Crater r={:.1} d={:.1}: {} cells in {} chunks",
            radius,
            depth,
            edit.cells,
            edit.chunks.len()
        );
        println!("Center height after crater: {:.2}", world.height_at(args.x, args.z));
    }

    // Reassemble so exports show the edits
    let region = if args.destroy > 0 || args.crater.is_some() {
        world.generate_terrain(args.x, args.z, args.radius)
    } else {
        region
    };

    if let Some(path) = &args.png {
        println!("Exporting preview to {}...", path);
        if let Err(e) = export_region_png(&region, world.registry(), world.config().height_scale, path) {
            eprintln!("Failed to export PNG: {}", e);
        }
    }

    if let Some(path) = &args.json {
        println!("Exporting summary to {}...", path);
        let summary = summarize_region(
            &region,
            world.registry(),
            world.seed(),
            (args.x, args.z),
            args.radius,
            world.cache_stats(),
        );
        if let Err(e) = export_region_json(&summary, path) {
            eprintln!("Failed to export JSON: {}", e);
        }
    }

    println!("Cache: {}", world.cache_stats().summary());
    println!("Done!");
}
