//! Paletted `.BM` bitmaps
//!
//! A BM is a 32-byte header followed by 8-bit palette indices stored column
//! by column, each column running bottom to top. Columns may be run-length
//! encoded, in which case a table of column offsets follows the pixel data.
//!
//! A header with width 1 and a non-unit height is a container of several
//! uncompressed frames (animated walls and switches). Only the first frame
//! is decoded.

use image::RgbImage;

use super::pal::VgaPalette;
use super::{Texture, TextureError};

pub const BM_MAGIC: [u8; 4] = *b"BM \x1e";
pub const HEADER_LEN: usize = 32;

/// Frame rate and a marker byte sit between the header and the frame table
const FRAME_TABLE_START: usize = HEADER_LEN + 2;
/// Header of one frame inside a multi-frame container
const FRAME_HEADER_LEN: usize = 28;

/// Column encoding of a single-frame BM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    /// Literal runs and repeated-byte runs
    Rle,
    /// Literal runs and transparent (index 0) runs
    Rle0,
}

/// Parsed BM header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmHeader {
    pub width: u16,
    pub height: u16,
    pub compression: Compression,
    /// Length of the compressed pixel data, where the column table starts
    pub data_size: u32,
}

impl BmHeader {
    pub fn parse(name: &str, bytes: &[u8]) -> Result<Self, TextureError> {
        if bytes.len() < HEADER_LEN {
            return Err(malformed(name, "truncated header"));
        }
        if bytes[..4] != BM_MAGIC {
            return Err(malformed(name, "bad magic"));
        }
        let compression = match i16::from_le_bytes([bytes[14], bytes[15]]) {
            0 => Compression::None,
            1 => Compression::Rle,
            2 => Compression::Rle0,
            _ => {
                return Err(TextureError::Unsupported {
                    name: name.to_string(),
                    variant: "BM compression mode",
                })
            }
        };
        Ok(Self {
            width: u16::from_le_bytes([bytes[4], bytes[5]]),
            height: u16::from_le_bytes([bytes[6], bytes[7]]),
            compression,
            data_size: u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
        })
    }

    /// Width 1 with a non-unit height marks a multi-frame container
    pub fn is_multi_frame(&self) -> bool {
        self.width == 1 && self.height != 1
    }
}

/// Palette indices of one bitmap, column-major and bottom-up
struct Pixels {
    width: usize,
    height: usize,
    indices: Vec<u8>,
}

/// Decode a BM through a palette into an upright RGB texture
pub fn decode(name: &str, bytes: &[u8], palette: &VgaPalette) -> Result<Texture, TextureError> {
    let header = BmHeader::parse(name, bytes)?;
    let pixels = if header.is_multi_frame() {
        first_frame(name, bytes)?
    } else {
        let (width, height) = (header.width as usize, header.height as usize);
        match header.compression {
            Compression::None => uncompressed(name, &bytes[HEADER_LEN..], width, height)?,
            Compression::Rle | Compression::Rle0 => decompress(name, bytes, &header)?,
        }
    };

    let height = pixels.height;
    let image = RgbImage::from_fn(pixels.width as u32, height as u32, |x, y| {
        let index = pixels.indices[x as usize * height + (height - 1 - y as usize)];
        let rgb = palette.color(index);
        image::Rgb([rgb.r, rgb.g, rgb.b])
    });
    Texture::new(name, image)
}

fn uncompressed(name: &str, data: &[u8], width: usize, height: usize) -> Result<Pixels, TextureError> {
    let len = width * height;
    let Some(indices) = data.get(..len) else {
        return Err(malformed(
            name,
            &format!("pixel data has {} bytes, expected {}", data.len(), len),
        ));
    };
    Ok(Pixels {
        width,
        height,
        indices: indices.to_vec(),
    })
}

/// Frame 0 of a container. Frame offsets count from the start of the table.
fn first_frame(name: &str, bytes: &[u8]) -> Result<Pixels, TextureError> {
    let offset = read_u32(bytes, FRAME_TABLE_START).ok_or_else(|| malformed(name, "truncated frame table"))?;
    let frame = bytes
        .get(FRAME_TABLE_START + offset as usize..)
        .filter(|frame| frame.len() >= FRAME_HEADER_LEN)
        .ok_or_else(|| malformed(name, "first frame out of bounds"))?;

    let width = u16::from_le_bytes([frame[0], frame[1]]) as usize;
    let height = u16::from_le_bytes([frame[2], frame[3]]) as usize;
    uncompressed(name, &frame[FRAME_HEADER_LEN..], width, height)
}

fn decompress(name: &str, bytes: &[u8], header: &BmHeader) -> Result<Pixels, TextureError> {
    let width = header.width as usize;
    let height = header.height as usize;
    let data = &bytes[HEADER_LEN..];
    let table = header.data_size as usize;

    let mut indices = Vec::with_capacity(width * height);
    for x in 0..width {
        let offset = read_u32(data, table + 4 * x).ok_or_else(|| malformed(name, "truncated column table"))?;
        let column = data
            .get(offset as usize..)
            .ok_or_else(|| malformed(name, &format!("column {} starts past the pixel data", x)))?;
        expand_column(name, column, height, header.compression, &mut indices)?;
    }
    Ok(Pixels { width, height, indices })
}

/// Append one decoded column of `height` indices to `out`
fn expand_column(
    name: &str,
    column: &[u8],
    height: usize,
    compression: Compression,
    out: &mut Vec<u8>,
) -> Result<(), TextureError> {
    let end = out.len() + height;
    let truncated = || malformed(name, "column ends mid-run");
    let mut pos = 0;

    while out.len() < end {
        let control = *column.get(pos).ok_or_else(truncated)?;
        pos += 1;
        if control < 128 {
            let count = control as usize;
            let run = column.get(pos..pos + count).ok_or_else(truncated)?;
            out.extend_from_slice(run);
            pos += count;
        } else {
            let count = (control - 128) as usize;
            let value = if compression == Compression::Rle {
                let value = *column.get(pos).ok_or_else(truncated)?;
                pos += 1;
                value
            } else {
                0
            };
            out.extend(std::iter::repeat(value).take(count));
        }
    }
    // A run may overshoot the column
    out.truncate(end);
    Ok(())
}

fn read_u32(bytes: &[u8], at: usize) -> Option<u32> {
    let b = bytes.get(at..at + 4)?;
    Some(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn malformed(name: &str, reason: &str) -> TextureError {
    TextureError::Malformed {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
pub(crate) fn encode_uncompressed(width: u16, height: u16, pixel: impl Fn(u16, u16) -> u8) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(HEADER_LEN + width as usize * height as usize);
    bytes.extend_from_slice(&BM_MAGIC);
    bytes.extend_from_slice(&width.to_le_bytes());
    bytes.extend_from_slice(&height.to_le_bytes());
    bytes.resize(HEADER_LEN, 0);
    for x in 0..width {
        for row in 0..height {
            // Stored bottom-up
            bytes.push(pixel(x, height - 1 - row));
        }
    }
    bytes
}

/// Header, the already encoded columns back to back, then the column table
#[cfg(test)]
pub(crate) fn encode_compressed(mode: i16, height: u16, columns: &[&[u8]]) -> Vec<u8> {
    let data_size: usize = columns.iter().map(|c| c.len()).sum();
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&BM_MAGIC);
    bytes.extend_from_slice(&(columns.len() as u16).to_le_bytes());
    bytes.extend_from_slice(&height.to_le_bytes());
    bytes.resize(14, 0);
    bytes.extend_from_slice(&mode.to_le_bytes());
    bytes.extend_from_slice(&(data_size as u32).to_le_bytes());
    bytes.resize(HEADER_LEN, 0);

    let mut offsets = Vec::with_capacity(columns.len());
    for column in columns {
        offsets.push((bytes.len() - HEADER_LEN) as u32);
        bytes.extend_from_slice(column);
    }
    for offset in offsets {
        bytes.extend_from_slice(&offset.to_le_bytes());
    }
    bytes
}

/// Container wrapping single-frame BMs as its frames
#[cfg(test)]
pub(crate) fn encode_multi_frame(frames: &[Vec<u8>]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&BM_MAGIC);
    bytes.extend_from_slice(&1u16.to_le_bytes());
    // Total size, patched below
    bytes.extend_from_slice(&0u16.to_le_bytes());
    bytes.extend_from_slice(&(-2i16).to_le_bytes());
    bytes.extend_from_slice(&(frames.len() as u16).to_le_bytes());
    bytes.resize(HEADER_LEN, 0);
    bytes.extend_from_slice(&[10, 2]);

    let bodies: Vec<Vec<u8>> = frames
        .iter()
        .map(|single| {
            let mut body = vec![0; FRAME_HEADER_LEN];
            body[..8].copy_from_slice(&single[4..12]);
            body.extend_from_slice(&single[HEADER_LEN..]);
            body
        })
        .collect();

    let mut offset = 4 * frames.len();
    for body in &bodies {
        bytes.extend_from_slice(&(offset as u32).to_le_bytes());
        offset += body.len();
    }
    for body in &bodies {
        bytes.extend_from_slice(body);
    }
    let total = (bytes.len() - HEADER_LEN) as u16;
    bytes[6..8].copy_from_slice(&total.to_le_bytes());
    bytes
}
