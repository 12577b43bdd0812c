//! Raw sector and wall records as read from a level file

use glam::DVec2;

/// 2D point in level units (DFU)
pub type Vertex = DVec2;

/// A texture reference together with its placement offset (DFU)
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBinding {
    pub texture: String,
    pub offset: DVec2,
}

impl TextureBinding {
    pub fn new(texture: impl Into<String>, offset: DVec2) -> Self {
        Self {
            texture: texture.into(),
            offset,
        }
    }
}

/// A wall as authored, before adjoins are resolved
#[derive(Debug, Clone, PartialEq)]
pub struct RawWall {
    pub start: Vertex,
    pub end: Vertex,
    pub mid: TextureBinding,
    pub top: TextureBinding,
    pub bottom: TextureBinding,
    /// Index of the sector on the other side, if any
    pub adjoin: Option<usize>,
}

/// Sector flag bits relevant to geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SectorFlags {
    /// No ceiling (open sky)
    pub open_sky: bool,
    /// No floor (pit)
    pub pit: bool,
    /// No walls (horizon)
    pub no_walls: bool,
}

impl SectorFlags {
    pub const OPEN_SKY: u32 = 1;
    pub const PIT: u32 = 128;
    pub const NO_WALLS: u32 = 1024;

    pub fn from_bits(bits: u32) -> Self {
        Self {
            open_sky: bits & Self::OPEN_SKY != 0,
            pit: bits & Self::PIT != 0,
            no_walls: bits & Self::NO_WALLS != 0,
        }
    }
}

/// A sector as authored: an extruded polygon with floor and ceiling
#[derive(Debug, Clone, PartialEq)]
pub struct RawSector {
    pub walls: Vec<RawWall>,
    pub floor: TextureBinding,
    pub ceiling: TextureBinding,
    /// Floor altitude; the ceiling is numerically above it
    pub floor_altitude: f64,
    pub ceiling_altitude: f64,
    pub flags: SectorFlags,
}

/// A parsed level: its texture table and sectors in file order
#[derive(Debug, Clone, Default)]
pub struct Level {
    pub textures: Vec<String>,
    pub sectors: Vec<RawSector>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_bits() {
        let flags = SectorFlags::from_bits(1 | 1024);
        assert!(flags.open_sky);
        assert!(!flags.pit);
        assert!(flags.no_walls);

        assert_eq!(SectorFlags::from_bits(0), SectorFlags::default());
        assert!(SectorFlags::from_bits(128 + 64).pit);
    }
}
