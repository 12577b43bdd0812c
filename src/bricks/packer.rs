//! Greedy consolidation of unit plates into larger parts ("brickify")
//!
//! Parts are tried in catalog order. For each part every remaining cell is
//! tried as the part's low corner; the part is placed when all cells it
//! would cover are still present and share the corner's color, and those
//! cells are removed. Placements are never undone. Because the catalog ends
//! with a 1x1x1 part, every cell is covered exactly once.

use ahash::AHashMap;

use super::catalog::{PartCatalog, PartShape};
use crate::core::types::{ColorToken, GridKey};
use crate::plates::Plate;

/// A part placed in the model, positioned by its center
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedPart {
    /// Center x in studs
    pub x: f64,
    /// Center y in studs
    pub y: f64,
    /// Center height in plates
    pub height: f64,
    pub part: String,
    pub color: ColorToken,
    /// Placed with width and length swapped
    pub rotated: bool,
}

/// Sparse colored grid keyed by (x, y, plate level)
#[derive(Debug, Clone, Default)]
pub struct PlateGrid {
    cells: AHashMap<GridKey, ColorToken>,
}

impl PlateGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snap plate heights to plate levels; later plates overwrite earlier
    /// ones on the same cell
    pub fn from_plates(plates: &[Plate], plate_height: f64) -> Self {
        let mut grid = Self::new();
        grid.cells.reserve(plates.len());
        for plate in plates {
            let level = (plate.height / plate_height).round_ties_even() as i32;
            grid.cells.insert((plate.x, plate.y, level), plate.color);
        }
        grid
    }

    pub fn insert(&mut self, key: GridKey, color: ColorToken) {
        self.cells.insert(key, color);
    }

    pub fn get(&self, key: &GridKey) -> Option<ColorToken> {
        self.cells.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Occupied cells ordered by level, then x, then y
    pub fn sorted_keys(&self) -> Vec<GridKey> {
        let mut keys: Vec<GridKey> = self.cells.keys().copied().collect();
        keys.sort_unstable_by_key(|&(x, y, level)| (level, x, y));
        keys
    }

    /// Fill `footprint` with the cells `shape` covers from `anchor` and
    /// report whether they are all present in `color`
    fn fits(&self, anchor: GridKey, shape: &PartShape, color: ColorToken, footprint: &mut Vec<GridKey>) -> bool {
        footprint.clear();
        let (x, y, level) = anchor;
        for cz in level..level + shape.height as i32 {
            for cy in y..y + shape.length as i32 {
                for cx in x..x + shape.width as i32 {
                    let key = (cx, cy, cz);
                    if self.cells.get(&key) != Some(&color) {
                        return false;
                    }
                    footprint.push(key);
                }
            }
        }
        true
    }
}

/// Pack plates into parts from `catalog`
pub fn brickify(plates: &[Plate], catalog: &PartCatalog, plate_height: f64) -> Vec<PlacedPart> {
    let grid = PlateGrid::from_plates(plates, plate_height);
    tracing::info!(
        "Packing {} cells ({} plates) with {} part shapes",
        grid.len(),
        plates.len(),
        catalog.len()
    );
    pack_grid(grid, catalog)
}

/// Consume `grid` into parts
pub fn pack_grid(mut grid: PlateGrid, catalog: &PartCatalog) -> Vec<PlacedPart> {
    let mut parts = Vec::new();
    let mut anchors = grid.sorted_keys();
    let mut footprint = Vec::new();

    for shape in catalog.shapes() {
        let before = parts.len();
        // Key snapshot; cells consumed earlier in this pass are skipped
        for &anchor in &anchors {
            let Some(color) = grid.get(&anchor) else {
                continue;
            };
            if !grid.fits(anchor, shape, color, &mut footprint) {
                continue;
            }

            parts.push(place(anchor, shape, color));
            for key in &footprint {
                grid.cells.remove(key);
            }
        }
        anchors.retain(|key| grid.cells.contains_key(key));

        if parts.len() > before {
            tracing::debug!(
                "{}x{}x{} {}: {} placed, {} cells left",
                shape.width,
                shape.length,
                shape.height,
                shape.part,
                parts.len() - before,
                grid.len()
            );
        }
        if grid.is_empty() {
            break;
        }
    }

    if !grid.is_empty() {
        tracing::warn!("{} cells left uncovered by the catalog", grid.len());
    }
    parts
}

fn place(anchor: GridKey, shape: &PartShape, color: ColorToken) -> PlacedPart {
    let (x, y, level) = anchor;
    let mut height = level as f64 + shape.height as f64 / 2.0;
    // The 3-plate brick's origin sits one plate below its geometric center
    if shape.height == 3 {
        height += 1.0;
    }
    PlacedPart {
        x: x as f64 + shape.width as f64 / 2.0,
        y: y as f64 + shape.length as f64 / 2.0,
        height,
        part: shape.part.clone(),
        color,
        rotated: shape.length > shape.width,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PLATE_HEIGHT;

    const A: ColorToken = ColorToken::Palette(1);
    const B: ColorToken = ColorToken::Palette(2);

    fn plate(x: i32, y: i32, level: i32, color: ColorToken) -> Plate {
        Plate {
            x,
            y,
            height: level as f64 * PLATE_HEIGHT,
            color,
        }
    }

    fn catalog(shapes: &[(u32, u32, u32, &str)]) -> PartCatalog {
        PartCatalog::from_shapes(shapes.iter().map(|&(w, l, h, p)| PartShape::new(w, l, h, p))).unwrap()
    }

    #[test]
    fn test_floor_and_column_pack_into_two_parts() {
        let mut plates = Vec::new();
        for x in 0..4 {
            for y in 0..4 {
                plates.push(plate(x, y, 0, A));
            }
        }
        for level in 1..4 {
            plates.push(plate(0, 0, level, B));
        }

        let catalog = catalog(&[(4, 4, 1, "3031.dat"), (1, 1, 3, "3005.dat"), (1, 1, 1, "3024.dat")]);
        let parts = brickify(&plates, &catalog, PLATE_HEIGHT);

        assert_eq!(parts.len(), 2);
        let brick = parts.iter().find(|p| p.part == "3005.dat").unwrap();
        assert_eq!(brick.color, B);
        assert_eq!((brick.x, brick.y), (0.5, 0.5));
        // level 1 + 3/2, plus the 3-plate origin correction
        assert_eq!(brick.height, 3.5);

        let floor = parts.iter().find(|p| p.part == "3031.dat").unwrap();
        assert_eq!(floor.color, A);
        assert_eq!((floor.x, floor.y, floor.height), (2.0, 2.0, 0.5));
        assert!(!floor.rotated);
    }

    #[test]
    fn test_parts_never_span_colors() {
        let plates = vec![plate(0, 0, 0, A), plate(1, 0, 0, B)];
        let catalog = catalog(&[(2, 1, 1, "3023.dat"), (1, 1, 1, "3024.dat")]);
        let parts = brickify(&plates, &catalog, PLATE_HEIGHT);
        assert_eq!(parts.len(), 2);
        assert!(parts.iter().all(|p| p.part == "3024.dat"));
    }

    #[test]
    fn test_rotated_flag() {
        let plates = vec![plate(5, 5, 0, A), plate(5, 6, 0, A)];
        let catalog = catalog(&[(2, 1, 1, "3023.dat"), (1, 1, 1, "3024.dat")]);
        let parts = brickify(&plates, &catalog, PLATE_HEIGHT);
        assert_eq!(parts.len(), 1);
        assert!(parts[0].rotated);
        assert_eq!((parts[0].x, parts[0].y), (5.5, 6.0));
    }

    #[test]
    fn test_last_plate_wins_same_cell() {
        let plates = vec![plate(0, 0, 0, A), plate(0, 0, 0, B)];
        let grid = PlateGrid::from_plates(&plates, PLATE_HEIGHT);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.get(&(0, 0, 0)), Some(B));
    }

    #[test]
    fn test_heights_snap_to_nearest_level() {
        let plates = vec![
            Plate { x: 0, y: 0, height: 0.39, color: A },
            Plate { x: 0, y: 0, height: 0.62, color: B },
        ];
        let grid = PlateGrid::from_plates(&plates, PLATE_HEIGHT);
        assert_eq!(grid.get(&(0, 0, 1)), Some(A));
        assert_eq!(grid.get(&(0, 0, 2)), Some(B));
    }

    #[test]
    fn test_empty_input() {
        let catalog = catalog(&[(1, 1, 1, "3024.dat")]);
        assert!(brickify(&[], &catalog, PLATE_HEIGHT).is_empty());
    }
}
