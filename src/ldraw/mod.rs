//! LDraw model output

use std::fmt::Write as _;
use std::path::Path;

use crate::bricks::PlacedPart;
use crate::core::error::Result;
use crate::core::types::ColorToken;

/// Rotation matrix for parts placed as authored
const IDENTITY: &str = "1 0 0 0 1 0 0 0 1";
/// Quarter turn about the vertical axis
const QUARTER_TURN: &str = "0 0 -1 0 1 0 1 0 0";

/// A placed part in integer output units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaledPart {
    pub x: i64,
    pub y: i64,
    pub height: i64,
    pub part: String,
    pub color: ColorToken,
    pub rotated: bool,
}

/// Scale part centers by `(x, y, height)` multipliers, rounding half to even
pub fn scale_parts(parts: &[PlacedPart], scale: [f64; 3]) -> Vec<ScaledPart> {
    parts
        .iter()
        .map(|p| ScaledPart {
            x: (p.x * scale[0]).round_ties_even() as i64,
            y: (p.y * scale[1]).round_ties_even() as i64,
            height: (p.height * scale[2]).round_ties_even() as i64,
            part: p.part.clone(),
            color: p.color,
            rotated: p.rotated,
        })
        .collect()
}

/// Render the model text. `name` is written in the header as is.
pub fn format_model(parts: &[ScaledPart], name: &str) -> String {
    let mut out = String::with_capacity(160 + parts.len() * 48);
    out.push_str("0 Untitled\n");
    let _ = writeln!(out, "0 Name: {}", name);
    out.push_str("0 Author: MILSGen\n");
    out.push_str("0 Unofficial Model\n");
    out.push_str("0 ROTATION CENTER 0 0 0 1 \"Custom\"\n");
    out.push_str("0 ROTATION CONFIG 0 0\n");

    for part in parts {
        let matrix = if part.rotated { QUARTER_TURN } else { IDENTITY };
        // LDraw's second coordinate is the vertical one
        let _ = writeln!(
            out,
            "1 {} {} {} {} {} {}",
            part.color, part.x, part.height, part.y, matrix, part.part
        );
    }
    out.push_str("0\n");
    out
}

/// Write the model to `path`, naming it after the file
pub fn write_model(path: &Path, parts: &[ScaledPart]) -> Result<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    std::fs::write(path, format_model(parts, &name))?;
    tracing::info!("Wrote {} parts to {}", parts.len(), path.display());
    Ok(())
}
