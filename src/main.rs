//! Brickify - Entry Point
//!
//! Converts one level file into an LDraw brick model and prints a short
//! run report.

use std::path::PathBuf;
use std::process;

use brickify::core::config::{ConversionConfig, ConversionPaths, SectorPriority};
use brickify::core::error::Result;
use brickify::pipeline::{self, ConversionReport};
use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

/// Convert a level into a brick model
#[derive(Parser, Debug)]
#[command(name = "brickify")]
#[command(about = "Convert a sector-based level into an LDraw brick model")]
struct Args {
    /// Level file (.LEV)
    level: PathBuf,

    /// VGA palette (default: level path with .PAL)
    #[arg(long)]
    palette: Option<PathBuf>,

    /// Part color table
    #[arg(long, default_value = brickify::core::config::DEFAULT_COLORS_FILE)]
    colors: PathBuf,

    /// Part catalog
    #[arg(long, default_value = brickify::core::config::DEFAULT_PARTS_FILE)]
    parts: PathBuf,

    /// Texture directory searched before the level directory
    #[arg(long)]
    resources: Option<PathBuf>,

    /// Output model (default: level path with .LDR)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Texture used when a referenced one is missing
    #[arg(long, default_value = brickify::core::config::FALLBACK_TEXTURE)]
    fallback_texture: String,

    /// TOML file with conversion settings; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Which sectors win shared cells
    #[arg(long, value_enum)]
    priority: Option<SectorPriority>,

    /// Level units per stud, horizontally
    #[arg(long)]
    xy_scale: Option<f64>,

    /// Level units per stud, vertically
    #[arg(long)]
    z_scale: Option<f64>,

    /// Decimals to round converted geometry to
    #[arg(long)]
    rounding: Option<u32>,

    /// Skip ceilings
    #[arg(long)]
    no_ceilings: bool,

    /// Output multipliers x,y,height
    #[arg(long, value_delimiter = ',', num_args = 3, allow_negative_numbers = true)]
    output_scale: Option<Vec<f64>>,

    /// Use raw RGB direct colors instead of part colors
    #[arg(long)]
    direct_rgb: bool,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    format: ReportFormat,

    /// Debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

impl Args {
    fn conversion_config(&self) -> Result<ConversionConfig> {
        let mut config = match &self.config {
            Some(path) => ConversionConfig::from_file(path)?,
            None => ConversionConfig::default(),
        };

        if let Some(priority) = self.priority {
            config.priority = priority;
        }
        if let Some(xy_scale) = self.xy_scale {
            config.xy_scale = xy_scale;
        }
        if let Some(z_scale) = self.z_scale {
            config.z_scale = z_scale;
        }
        if let Some(rounding) = self.rounding {
            config.rounding = rounding;
        }
        if self.no_ceilings {
            config.generate_ceilings = false;
        }
        if let Some([x, y, h]) = self.output_scale.as_deref().and_then(|s| <[f64; 3]>::try_from(s).ok()) {
            config.output_scale = [x, y, h];
        }
        if self.direct_rgb {
            config.direct_rgb = true;
        }
        Ok(config)
    }

    fn conversion_paths(&self) -> ConversionPaths {
        ConversionPaths {
            level: self.level.clone(),
            palette: self.palette.clone(),
            colors: self.colors.clone(),
            parts: self.parts.clone(),
            resources: self.resources.clone(),
            output: self.output.clone(),
            fallback_texture: self.fallback_texture.clone(),
        }
    }
}

fn main() {
    let args = Args::parse();

    let directive = if args.verbose { "brickify=debug" } else { "brickify=info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let report = args
        .conversion_config()
        .and_then(|config| pipeline::run(&config, &args.conversion_paths()));

    match report {
        Ok(report) => print_report(&report, args.format),
        Err(e) => {
            tracing::error!("{}", e);
            process::exit(1);
        }
    }
}

fn print_report(report: &ConversionReport, format: ReportFormat) {
    match format {
        ReportFormat::Json => match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                tracing::error!("Failed to serialize report: {}", e);
                process::exit(1);
            }
        },
        ReportFormat::Text => {
            println!("=== CONVERSION COMPLETE ===");
            println!("Output:    {}", report.output.display());
            println!("Sectors:   {} ({} walls)", report.sectors, report.walls);
            println!("Textures:  {} ({} fallback)", report.textures, report.fallback_textures.len());
            for name in &report.fallback_textures {
                println!("  missing: {}", name);
            }
            println!("Plates:    {}", report.plates);
            println!("Parts:     {}", report.parts);
        }
    }
}
