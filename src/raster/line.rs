//! Cells crossed by a line segment

use ahash::AHashSet;
use glam::DVec2;

use crate::core::config::{DEGENERATE_LENGTH, TILING_STEP};
use crate::core::types::Cell;

/// Cell containing a point
#[inline]
pub fn cell_of(p: DVec2) -> Cell {
    (p.x.floor() as i32, p.y.floor() as i32)
}

/// All cells the segment from `start` to `end` passes through.
///
/// The segment is sampled every [`TILING_STEP`] studs and the exact end
/// point is always sampled last, so both endpoint cells are included
/// regardless of accumulated float error.
pub fn tile_line(start: DVec2, end: DVec2) -> AHashSet<Cell> {
    let delta = end - start;
    let length = delta.length();

    let mut cells = AHashSet::new();
    if length < DEGENERATE_LENGTH {
        cells.insert(cell_of(start));
        return cells;
    }

    let divisor = (length / TILING_STEP).max(1.0);
    let step = delta / divisor;
    let samples = divisor as usize;

    cells.reserve(samples / 8 + 2);
    for i in 0..samples {
        cells.insert(cell_of(start + step * i as f64));
    }
    cells.insert(cell_of(end));
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_segment_is_one_cell() {
        let p = DVec2::new(2.7, -0.3);
        let cells = tile_line(p, p + DVec2::new(0.001, 0.0));
        assert_eq!(cells.len(), 1);
        assert!(cells.contains(&(2, -1)));
    }

    #[test]
    fn test_horizontal_segment() {
        let cells = tile_line(DVec2::new(0.5, 0.5), DVec2::new(4.5, 0.5));
        let mut sorted: Vec<Cell> = cells.into_iter().collect();
        sorted.sort();
        assert_eq!(sorted, vec![(0, 0), (1, 0), (2, 0), (3, 0), (4, 0)]);
    }

    #[test]
    fn test_diagonal_includes_endpoints() {
        let a = DVec2::new(-3.2, 1.1);
        let b = DVec2::new(5.9, 7.4);
        let cells = tile_line(a, b);
        assert!(cells.contains(&cell_of(a)));
        assert!(cells.contains(&cell_of(b)));
    }

    #[test]
    fn test_cells_are_connected_along_axis_line() {
        let cells = tile_line(DVec2::new(0.0, 0.0), DVec2::new(0.0, 10.0));
        for y in 0..=10 {
            assert!(cells.contains(&(0, y)), "missing (0, {})", y);
        }
        assert_eq!(cells.len(), 11);
    }
}
