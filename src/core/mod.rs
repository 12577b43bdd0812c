pub mod config;
pub mod error;
pub mod types;

pub use config::{ConversionConfig, ConversionPaths, SectorPriority};
pub use error::{BrickError, CatalogError, Result};
pub use types::{Cell, ColorToken, GridKey, Rgb};
