//! 256-color VGA palettes (`.PAL`)

use std::path::Path;

use super::TextureError;
use crate::core::types::Rgb;

/// Number of palette entries
pub const PALETTE_SIZE: usize = 256;

/// Raw VGA palette byte length: 256 entries of 3 six-bit channels
pub const PALETTE_BYTES: usize = PALETTE_SIZE * 3;

/// Palette indexed by the 8-bit pixel values of a BM
#[derive(Debug, Clone)]
pub struct VgaPalette {
    colors: Vec<Rgb>,
}

impl VgaPalette {
    /// Decode a raw VGA palette, scaling six-bit channels to eight bits
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, TextureError> {
        if bytes.len() < PALETTE_BYTES {
            return Err(TextureError::Malformed {
                name: name.to_string(),
                reason: format!("palette has {} bytes, expected {}", bytes.len(), PALETTE_BYTES),
            });
        }
        let colors = bytes[..PALETTE_BYTES]
            .chunks_exact(3)
            .map(|c| Rgb::new(vga_to_8bit(c[0]), vga_to_8bit(c[1]), vga_to_8bit(c[2])))
            .collect();
        Ok(Self { colors })
    }

    pub fn load(path: &Path) -> Result<Self, TextureError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&path.display().to_string(), &bytes)
    }

    /// Grayscale ramp, for tests and palette-less previews
    pub fn grayscale() -> Self {
        Self {
            colors: (0..PALETTE_SIZE).map(|i| Rgb::new(i as u8, i as u8, i as u8)).collect(),
        }
    }

    #[inline]
    pub fn color(&self, index: u8) -> Rgb {
        self.colors[index as usize]
    }
}

#[inline]
fn vga_to_8bit(v: u8) -> u8 {
    let v = v.min(63) as u32;
    ((v * 255 + 31) / 63) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_six_bit_scaling() {
        let mut bytes = vec![0u8; PALETTE_BYTES];
        bytes[3..6].copy_from_slice(&[63, 32, 1]);
        let pal = VgaPalette::from_bytes("test", &bytes).unwrap();
        assert_eq!(pal.color(0), Rgb::new(0, 0, 0));
        assert_eq!(pal.color(1), Rgb::new(255, 130, 4));
    }

    #[test]
    fn test_short_palette_rejected() {
        assert!(VgaPalette::from_bytes("short", &[0u8; 100]).is_err());
    }
}
