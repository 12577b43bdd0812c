//! End-to-end conversion: level file in, brick model out
//!
//! Each stage runs to completion before the next one starts:
//! parse, refine, order by area, load data files and textures, build
//! plates, pack, scale and write.

use std::path::PathBuf;

use serde::Serialize;

use crate::bricks::{brickify, PartCatalog, PlacedPart};
use crate::color::{ColorMatcher, ColorTable};
use crate::core::config::{ConversionConfig, ConversionPaths, PLATE_HEIGHT};
use crate::core::error::{BrickError, Result};
use crate::ldraw::{scale_parts, write_model};
use crate::level::{load_level, order_by_priority, refine_level, RefinedSector};
use crate::plates::{referenced_textures, PlateBuilder};
use crate::texture::{FileTextureProvider, TextureProvider, TextureSet, VgaPalette};

/// Counts from one conversion run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionReport {
    pub sectors: usize,
    pub walls: usize,
    pub textures: usize,
    /// Texture names that were replaced by the fallback texture
    pub fallback_textures: Vec<String>,
    pub plates: usize,
    pub parts: usize,
    pub output: PathBuf,
}

/// In-memory result of the plate and packing stages
#[derive(Debug, Clone)]
pub struct BuiltModel {
    pub parts: Vec<PlacedPart>,
    pub plates: usize,
    pub textures: usize,
    pub fallback_textures: Vec<String>,
}

/// Plates and parts for already refined and ordered sectors
pub fn build_model(
    sectors: &[RefinedSector],
    provider: &dyn TextureProvider,
    fallback_texture: &str,
    matcher: &ColorMatcher,
    catalog: &PartCatalog,
    config: &ConversionConfig,
) -> Result<BuiltModel> {
    let names = referenced_textures(sectors, config);
    let textures = TextureSet::load(names, provider, fallback_texture)?;

    let plates = PlateBuilder::new(config, &textures, matcher).build(sectors);
    let parts = brickify(&plates, catalog, PLATE_HEIGHT);
    tracing::info!("Packed {} plates into {} parts", plates.len(), parts.len());

    Ok(BuiltModel {
        parts,
        plates: plates.len(),
        textures: textures.len(),
        fallback_textures: textures.missing().to_vec(),
    })
}

/// Run a complete conversion and write the model file
pub fn run(config: &ConversionConfig, paths: &ConversionPaths) -> Result<ConversionReport> {
    if !paths.level.is_file() {
        return Err(BrickError::LevelNotFound(paths.level.clone()));
    }
    let palette_path = paths.palette_path();
    if !palette_path.is_file() {
        return Err(BrickError::PaletteNotFound(palette_path));
    }
    config.validate().map_err(BrickError::InvalidConfig)?;

    tracing::info!("Converting {}", paths.level.display());
    let level = load_level(&paths.level)?;
    tracing::info!(
        "Parsed {} sectors, {} textures",
        level.sectors.len(),
        level.textures.len()
    );

    let mut sectors = refine_level(&level.sectors)?;
    order_by_priority(&mut sectors, config.priority);

    let table = ColorTable::load(&paths.colors)?;
    tracing::info!("Loaded {} part colors from {}", table.len(), paths.colors.display());
    let matcher = if config.direct_rgb {
        ColorMatcher::direct(table)
    } else {
        ColorMatcher::new(table)
    };

    let catalog = PartCatalog::load(&paths.parts)?;
    tracing::info!("Loaded {} part shapes from {}", catalog.len(), paths.parts.display());

    let palette = VgaPalette::load(&palette_path)?;
    let mut search_dirs = vec![paths.resources_dir()];
    let level_dir = paths.level_dir();
    if !search_dirs.contains(&level_dir) {
        search_dirs.push(level_dir);
    }
    let provider = FileTextureProvider::new(search_dirs, palette);

    let model = build_model(
        &sectors,
        &provider,
        &paths.fallback_texture,
        &matcher,
        &catalog,
        config,
    )?;

    let output = paths.output_path();
    write_model(&output, &scale_parts(&model.parts, config.output_scale))?;

    Ok(ConversionReport {
        sectors: sectors.len(),
        walls: sectors.iter().map(|s| s.walls.len()).sum(),
        textures: model.textures,
        fallback_textures: model.fallback_textures,
        plates: model.plates,
        parts: model.parts.len(),
        output,
    })
}
