//! Brickify - Level Geometry to Brick Model Converter
//!
//! Reads a sector-based level, rasterizes its walls, floors and ceilings
//! into colored unit plates sampled from the level textures, and packs the
//! plates greedily into larger parts for an LDraw model.

pub mod bricks;
pub mod color;
pub mod core;
pub mod ldraw;
pub mod level;
pub mod pipeline;
pub mod plates;
pub mod raster;
pub mod texture;
