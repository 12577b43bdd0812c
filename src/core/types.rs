//! Core type definitions used throughout the codebase

use std::fmt;

use serde::{Deserialize, Serialize};

/// Integer grid cell (x, y) in stud units
pub type Cell = (i32, i32);

/// Discrete plate-grid coordinate (x, y, level) where level counts plates
pub type GridKey = (i32, i32, i32);

/// 8-bit RGB triplet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Sum of absolute per-channel differences
    #[inline]
    pub fn manhattan(&self, other: &Rgb) -> u32 {
        (self.r as i32 - other.r as i32).unsigned_abs()
            + (self.g as i32 - other.g as i32).unsigned_abs()
            + (self.b as i32 - other.b as i32).unsigned_abs()
    }
}

impl From<image::Rgb<u8>> for Rgb {
    fn from(px: image::Rgb<u8>) -> Self {
        Self::new(px.0[0], px.0[1], px.0[2])
    }
}

/// Color written into the output model for one part.
///
/// `Palette` is a part-color identifier from the color table. `Direct`
/// encodes the raw RGB as an LDraw direct color (`0x2RRGGBB`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorToken {
    Palette(u32),
    Direct(Rgb),
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorToken::Palette(id) => write!(f, "{}", id),
            ColorToken::Direct(rgb) => write!(f, "0x2{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_token_format() {
        let token = ColorToken::Direct(Rgb::new(0x0a, 0xff, 0x3c));
        assert_eq!(token.to_string(), "0x20aff3c");
        assert_eq!(ColorToken::Palette(71).to_string(), "71");
    }

    #[test]
    fn test_manhattan_distance() {
        let a = Rgb::new(10, 20, 30);
        let b = Rgb::new(20, 10, 30);
        assert_eq!(a.manhattan(&b), 20);
        assert_eq!(a.manhattan(&a), 0);
    }
}
