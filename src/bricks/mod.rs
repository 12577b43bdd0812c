//! Part catalog and brick packing

pub mod catalog;
pub mod packer;

pub use catalog::{PartCatalog, PartShape};
pub use packer::{brickify, pack_grid, PlacedPart, PlateGrid};
