//! Texture decoding and wrapped sampling

pub mod bm;
pub mod library;
pub mod pal;

pub use library::{FileTextureProvider, TextureSet};
pub use pal::VgaPalette;

use image::RgbImage;
use thiserror::Error;

use crate::core::types::Rgb;

/// Errors from texture resolution and decoding
#[derive(Debug, Error)]
pub enum TextureError {
    /// No candidate file exists for the reference
    #[error("texture not found: {0}")]
    NotFound(String),

    /// The file exists but is not a BM/PAL we can read
    #[error("{name}: {reason}")]
    Malformed { name: String, reason: String },

    /// Valid but unsupported variant (unknown BM compression mode)
    #[error("{name}: unsupported {variant}")]
    Unsupported { name: String, variant: &'static str },

    /// Decoding through the `image` crate failed
    #[error("{name}: {source}")]
    Image {
        name: String,
        #[source]
        source: image::ImageError,
    },

    /// Image has a zero dimension and cannot be sampled
    #[error("{name}: invalid dimensions {width}x{height}")]
    InvalidDimensions { name: String, width: u32, height: u32 },

    /// Even the fallback texture could not be decoded
    #[error("fallback texture '{name}' unavailable: {source}")]
    FallbackUnavailable {
        name: String,
        #[source]
        source: Box<TextureError>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A decoded texture. Sampling wraps on both axes, textures tile forever.
#[derive(Debug, Clone)]
pub struct Texture {
    image: RgbImage,
}

impl Texture {
    pub fn new(name: &str, image: RgbImage) -> Result<Self, TextureError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(TextureError::InvalidDimensions {
                name: name.to_string(),
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(Self { image })
    }

    /// Single-color texture of the given size
    pub fn solid(width: u32, height: u32, color: Rgb) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            image: RgbImage::from_pixel(width, height, image::Rgb([color.r, color.g, color.b])),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Pixel at (x, y) with both coordinates wrapped into range
    #[inline]
    pub fn sample(&self, x: i64, y: i64) -> Rgb {
        let px = x.rem_euclid(self.image.width() as i64) as u32;
        let py = y.rem_euclid(self.image.height() as i64) as u32;
        Rgb::from(*self.image.get_pixel(px, py))
    }
}

/// Source of decoded textures by reference name.
///
/// Implementations resolve and decode; wrapping and fallback are handled
/// by the caller.
pub trait TextureProvider {
    fn decode(&self, name: &str) -> Result<Texture, TextureError>;
}
