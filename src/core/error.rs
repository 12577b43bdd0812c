use std::path::PathBuf;
use thiserror::Error;

use crate::level::LevelError;
use crate::texture::TextureError;

#[derive(Error, Debug)]
pub enum BrickError {
    #[error("Missing level file: {0}")]
    LevelNotFound(PathBuf),

    #[error("Could not locate palette file: {0}")]
    PaletteNotFound(PathBuf),

    #[error("Level error: {0}")]
    Level(#[from] LevelError),

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors from the two tabular data files: the part color table and the
/// part catalog. Any malformed row rejects the whole file.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("{kind} line {line}: {reason}")]
    MalformedRow {
        kind: &'static str,
        line: usize,
        reason: String,
    },

    #[error("{0} contains no entries")]
    Empty(&'static str),

    #[error("part {0} has a zero dimension")]
    EmptyShape(String),

    #[error("part catalog has no 1x1x1 part, some plates could never be covered")]
    MissingUnitPart,

    #[error("failed to read {kind} {path}: {source}")]
    Io {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, BrickError>;
