//! Conversion configuration with documented constants
//!
//! All fixed numbers of the conversion are collected here with an
//! explanation of what they control. The tunable ones live on
//! [`ConversionConfig`], which can be overlaid from a TOML file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::error::Result;

// === FIXED CONSTANTS ===

/// Length of one sampling step when tiling a line (stud units).
///
/// Bounds how far apart two samples along a wall may be, so a wall can
/// never jump over a cell it passes through by more than this amount.
pub const TILING_STEP: f64 = 0.02;

/// Lines shorter than this (studs) are treated as a single point.
pub const DEGENERATE_LENGTH: f64 = 0.01;

/// Texture pixels per level distance unit (DFU). Fixed by the level format.
pub const PX_PER_DFU: f64 = 8.0;

/// Height of one plate, in studs.
pub const PLATE_HEIGHT: f64 = 0.4;

/// Multiplier applied to the wall height step.
///
/// Walking walls in 0.8 plate increments keeps float accumulation from
/// stepping over a discrete plate level once heights are rounded.
pub const STEP_REDUCTION: f64 = 0.8;

/// Texture used when a referenced one cannot be resolved.
pub const FALLBACK_TEXTURE: &str = "DEFAULT.BM";

/// Default part color table, relative to the working directory.
pub const DEFAULT_COLORS_FILE: &str = "data/brick.colors";

/// Default part catalog, relative to the working directory.
pub const DEFAULT_PARTS_FILE: &str = "data/brick.parts";

/// Which sectors win when plates of two sectors land in the same cell.
///
/// Sectors are processed in area order and later plates overwrite earlier
/// ones, so `Large` sorts ascending (large sectors write last).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SectorPriority {
    #[default]
    Large,
    Small,
}

/// Tunable parameters for one conversion run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionConfig {
    /// Which sectors overwrite shared boundary cells
    pub priority: SectorPriority,

    /// Level units (DFU) per stud, horizontally
    ///
    /// The default of 2 together with `z_scale` 1.8 gives roughly
    /// minifig scale.
    pub xy_scale: f64,

    /// Level units (DFU) per stud, vertically
    pub z_scale: f64,

    /// Decimals that converted geometry is rounded to
    ///
    /// Removes float noise so that walls sharing a vertex land on the
    /// same coordinates after scaling.
    pub rounding: u32,

    /// Whether ceilings are built for sectors without open sky
    pub generate_ceilings: bool,

    /// Output multipliers for x, y and height (LDraw units per stud/plate)
    ///
    /// Height is negative because LDraw's vertical axis points down.
    pub output_scale: [f64; 3],

    /// Emit raw RGB direct colors instead of matching part colors
    ///
    /// Prettier previews but produces colors no real part has.
    pub direct_rgb: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            priority: SectorPriority::Large,
            xy_scale: 2.0,
            z_scale: 1.8,
            rounding: 3,
            generate_ceilings: true,
            output_scale: [20.0, 20.0, -8.0],
            direct_rgb: false,
        }
    }
}

impl ConversionConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML overlay; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a TOML overlay from disk
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if !(self.xy_scale.is_finite() && self.xy_scale > 0.0) {
            return Err(format!("xy_scale ({}) must be positive", self.xy_scale));
        }
        if !(self.z_scale.is_finite() && self.z_scale > 0.0) {
            return Err(format!("z_scale ({}) must be positive", self.z_scale));
        }
        if self.rounding > 12 {
            return Err(format!("rounding ({}) must be at most 12 decimals", self.rounding));
        }
        if self.output_scale.iter().any(|s| !s.is_finite()) {
            return Err("output_scale must be finite".into());
        }
        Ok(())
    }

    /// Horizontal level units to studs, rounded
    #[inline]
    pub fn to_studs(&self, dfu: f64) -> f64 {
        round_to(dfu / self.xy_scale, self.rounding)
    }

    /// Vertical level units to studs, rounded
    #[inline]
    pub fn to_stud_height(&self, dfu: f64) -> f64 {
        round_to(dfu / self.z_scale, self.rounding)
    }

    /// Horizontal studs back to level units, rounded
    #[inline]
    pub fn to_dfu(&self, studs: f64) -> f64 {
        round_to(studs * self.xy_scale, self.rounding)
    }
}

/// Round to `decimals` places, ties to even
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}

/// File locations for one run. Unset entries are derived from the level path.
#[derive(Debug, Clone)]
pub struct ConversionPaths {
    pub level: PathBuf,
    pub palette: Option<PathBuf>,
    pub colors: PathBuf,
    pub parts: PathBuf,
    pub resources: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub fallback_texture: String,
}

impl ConversionPaths {
    pub fn new(level: impl Into<PathBuf>) -> Self {
        Self {
            level: level.into(),
            palette: None,
            colors: PathBuf::from(DEFAULT_COLORS_FILE),
            parts: PathBuf::from(DEFAULT_PARTS_FILE),
            resources: None,
            output: None,
            fallback_texture: FALLBACK_TEXTURE.to_string(),
        }
    }

    /// Directory holding the level file
    pub fn level_dir(&self) -> PathBuf {
        match self.level.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// The VGA palette: explicit, or the level path with a `.PAL` extension
    pub fn palette_path(&self) -> PathBuf {
        self.palette
            .clone()
            .unwrap_or_else(|| self.level.with_extension("PAL"))
    }

    /// Primary texture directory; the level directory unless overridden
    pub fn resources_dir(&self) -> PathBuf {
        self.resources.clone().unwrap_or_else(|| self.level_dir())
    }

    /// Output model: explicit, or the level path with a `.LDR` extension
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.level.with_extension("LDR"))
    }
}
