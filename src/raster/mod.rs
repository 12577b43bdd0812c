//! Rasterization of level geometry onto the stud grid

pub mod line;
pub mod polygon;

pub use line::{cell_of, tile_line};
pub use polygon::{segments_cross, tile_polygon};
