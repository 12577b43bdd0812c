//! Available part shapes

use std::cmp::Reverse;
use std::path::Path;

use crate::core::error::CatalogError;

const KIND: &str = "part catalog";

/// A part footprint: `width` along x, `length` along y, `height` in plates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartShape {
    pub width: u32,
    pub length: u32,
    pub height: u32,
    /// Opaque identifier written to the model (e.g. `3001.dat`)
    pub part: String,
}

impl PartShape {
    pub fn new(width: u32, length: u32, height: u32, part: impl Into<String>) -> Self {
        Self {
            width,
            length,
            height,
            part: part.into(),
        }
    }

    pub fn volume(&self) -> u32 {
        self.width * self.length * self.height
    }

    pub fn is_unit(&self) -> bool {
        self.width == 1 && self.length == 1 && self.height == 1
    }
}

/// Part shapes in packing order: tallest first, then longest, then widest.
///
/// Non-square parts are listed in both orientations.
#[derive(Debug, Clone)]
pub struct PartCatalog {
    shapes: Vec<PartShape>,
}

impl PartCatalog {
    /// Build from shapes as authored; adds rotations, sorts, and checks
    /// that every dimension is positive and a 1x1x1 part is present
    pub fn from_shapes(shapes: impl IntoIterator<Item = PartShape>) -> Result<Self, CatalogError> {
        let mut all = Vec::new();
        for shape in shapes {
            if shape.width == 0 || shape.length == 0 || shape.height == 0 {
                return Err(CatalogError::EmptyShape(shape.part));
            }
            let rotated = (shape.width != shape.length)
                .then(|| PartShape::new(shape.length, shape.width, shape.height, shape.part.clone()));
            all.push(shape);
            all.extend(rotated);
        }
        if all.is_empty() {
            return Err(CatalogError::Empty(KIND));
        }
        if !all.iter().any(PartShape::is_unit) {
            return Err(CatalogError::MissingUnitPart);
        }

        // Stable, so equal shapes keep file order
        all.sort_by_key(|s| (Reverse(s.height), Reverse(s.length), Reverse(s.width)));
        Ok(Self { shapes: all })
    }

    /// Parse rows of `width,length,height,part`; `#` lines are comments
    pub fn parse(content: &str) -> Result<Self, CatalogError> {
        let mut shapes = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            let line_no = idx + 1;
            if line.starts_with('#') {
                continue;
            }
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split(',').collect();
            let [width, length, height, part] = fields[..] else {
                return Err(malformed(line_no, format!("expected 4 fields, found {}", fields.len())));
            };
            let dimension = |value: &str| -> Result<u32, CatalogError> {
                match value.trim().parse::<u32>() {
                    Ok(v) if v > 0 => Ok(v),
                    _ => Err(malformed(line_no, format!("invalid dimension '{}'", value.trim()))),
                }
            };
            let part = part.trim_matches(|c| c == '"' || c == '\'' || c == ' ');
            if part.is_empty() {
                return Err(malformed(line_no, "empty part identifier".to_string()));
            }
            shapes.push(PartShape::new(dimension(width)?, dimension(length)?, dimension(height)?, part));
        }
        Self::from_shapes(shapes)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            kind: KIND,
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn shapes(&self) -> &[PartShape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn malformed(line: usize, reason: String) -> CatalogError {
    CatalogError::MalformedRow {
        kind: KIND,
        line,
        reason,
    }
}
