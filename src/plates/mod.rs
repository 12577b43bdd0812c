//! Unit plates: one colored 1x1 cell at a height

pub mod builder;

pub use builder::{referenced_textures, PlateBuilder};

use crate::core::types::ColorToken;

/// A 1x1 plate at cell (x, y). `height` is in studs and snapped to plate
/// levels only when packing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plate {
    pub x: i32,
    pub y: i32,
    pub height: f64,
    pub color: ColorToken,
}
