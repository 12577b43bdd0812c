//! Nearest part color search

use std::path::Path;

use crate::core::error::CatalogError;
use crate::core::types::{ColorToken, Rgb};

const KIND: &str = "color table";

/// One available part color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorEntry {
    pub id: u32,
    pub rgb: Rgb,
}

/// Ordered list of part colors. Order matters: ties go to the earlier entry.
#[derive(Debug, Clone, Default)]
pub struct ColorTable {
    entries: Vec<ColorEntry>,
}

impl ColorTable {
    pub fn new(entries: Vec<ColorEntry>) -> Self {
        Self { entries }
    }

    /// Parse rows of `id RRGGBB [name...]`; the first line is a header
    pub fn parse(content: &str) -> Result<Self, CatalogError> {
        let mut entries = Vec::new();
        for (idx, line) in content.lines().enumerate().skip(1) {
            let line_no = idx + 1;
            let mut fields = line.split_whitespace();
            let Some(id) = fields.next() else {
                continue;
            };
            let id: u32 = id.parse().map_err(|_| malformed(line_no, format!("invalid color id '{}'", id)))?;
            let hex = fields
                .next()
                .ok_or_else(|| malformed(line_no, "missing RGB hex".to_string()))?;
            let rgb = parse_hex(hex).ok_or_else(|| malformed(line_no, format!("invalid RGB hex '{}'", hex)))?;
            entries.push(ColorEntry { id, rgb });
        }
        if entries.is_empty() {
            return Err(CatalogError::Empty(KIND));
        }
        Ok(Self { entries })
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            kind: KIND,
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn entries(&self) -> &[ColorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_hex(hex: &str) -> Option<Rgb> {
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
    Some(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

fn malformed(line: usize, reason: String) -> CatalogError {
    CatalogError::MalformedRow {
        kind: KIND,
        line,
        reason,
    }
}

/// Maps sampled texture colors to output color tokens.
///
/// Owns its color table for the duration of one run.
#[derive(Debug, Clone)]
pub struct ColorMatcher {
    table: ColorTable,
    direct: bool,
}

impl ColorMatcher {
    pub fn new(table: ColorTable) -> Self {
        Self { table, direct: false }
    }

    /// Bypass matching and emit raw RGB direct colors
    pub fn direct(table: ColorTable) -> Self {
        Self { table, direct: true }
    }

    pub fn is_direct(&self) -> bool {
        self.direct
    }

    pub fn table(&self) -> &ColorTable {
        &self.table
    }

    /// Closest table color by summed channel difference; first entry wins ties
    pub fn match_rgb(&self, rgb: Rgb) -> ColorToken {
        if self.direct {
            return ColorToken::Direct(rgb);
        }

        let mut best: Option<(u32, u32)> = None;
        for entry in &self.table.entries {
            let diff = entry.rgb.manhattan(&rgb);
            if diff == 0 {
                return ColorToken::Palette(entry.id);
            }
            if best.map_or(true, |(_, best_diff)| diff < best_diff) {
                best = Some((entry.id, diff));
            }
        }

        // Tables are validated non-empty on parse; `new` may still get one
        match best {
            Some((id, _)) => ColorToken::Palette(id),
            None => ColorToken::Direct(rgb),
        }
    }
}
