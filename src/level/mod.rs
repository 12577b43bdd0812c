//! Level geometry: sector model, LEV parsing and wall refinement

pub mod parser;
pub mod refine;
pub mod sector;

pub use parser::{load_level, parse_level};
pub use refine::{order_by_priority, polygon_area, refine_level, RefinedSector, RefinedWall};
pub use sector::{Level, RawSector, RawWall, SectorFlags, TextureBinding, Vertex};

use thiserror::Error;

/// Errors that can occur while reading or refining a level
#[derive(Debug, Error)]
pub enum LevelError {
    /// A numeric field did not parse
    #[error("line {line}: invalid number '{value}'")]
    InvalidNumber { line: usize, value: String },

    /// A required key or token is absent on a line
    #[error("line {line}: missing '{field}'")]
    MissingField { line: usize, field: &'static str },

    /// A texture index points outside the texture table
    #[error("line {line}: texture index {index} out of range ({count} textures)")]
    TextureOutOfRange { line: usize, index: i64, count: usize },

    /// A wall references a vertex that was not declared
    #[error("line {line}: vertex index {index} out of range ({count} vertices)")]
    VertexOutOfRange { line: usize, index: i64, count: usize },

    /// A wall appeared before any SECTOR header
    #[error("line {line}: wall outside of a sector")]
    WallOutsideSector { line: usize },

    /// A sector ended without a required property
    #[error("sector {sector}: missing {what}")]
    IncompleteSector { sector: usize, what: &'static str },

    /// A wall adjoins a sector that does not exist
    #[error("sector {sector} wall {wall}: adjoin {adjoin} out of range ({count} sectors)")]
    AdjoinOutOfRange {
        sector: usize,
        wall: usize,
        adjoin: i64,
        count: usize,
    },

    /// A sector index past the end of the level
    #[error("sector {index} out of range ({count} sectors)")]
    SectorOutOfRange { index: usize, count: usize },
}
