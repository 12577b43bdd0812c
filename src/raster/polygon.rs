//! Cells enclosed by a set of boundary segments (even-odd rule)

use glam::DVec2;

use crate::core::types::Cell;

/// Horizontal probe offset inside a cell
const PROBE_X: f64 = 0.5;
/// Probe starts half a cell below the cell's lower edge
const PROBE_Y: f64 = -0.5;

/// Cells whose center lies inside the boundary, by the even-odd rule.
///
/// The segments need not form a single clean loop: holes are just more
/// segments, winding does not matter and a disconnected edge only affects
/// the columns it spans. Each column is walked bottom to top with a short
/// vertical probe per cell; the running crossing count is odd inside.
/// Cells are returned column by column, bottom to top.
pub fn tile_polygon(segments: &[(DVec2, DVec2)]) -> Vec<Cell> {
    let Some((min, max)) = bounds(segments) else {
        return Vec::new();
    };

    let min_x = min.x.floor() as i32 - 2;
    let min_y = min.y.floor() as i32 - 2;
    let max_x = max.x.floor() as i32 + 3;
    let max_y = max.y.floor() as i32 + 3;

    let mut cells = Vec::new();
    for column in min_x..max_x {
        let probe_x = column as f64 + PROBE_X;
        let mut crossings = 0usize;
        for y in min_y..max_y {
            let a = DVec2::new(probe_x, y as f64 + PROBE_Y);
            let b = DVec2::new(probe_x, y as f64 + PROBE_Y + 1.0);
            crossings += segments
                .iter()
                .filter(|(wa, wb)| segments_cross(a, b, *wa, *wb))
                .count();
            if crossings % 2 == 1 {
                cells.push((column, y));
            }
        }
    }
    cells
}

/// Strict counter-clockwise orientation of a, b, c
#[inline]
fn ccw(a: DVec2, b: DVec2, c: DVec2) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

/// Whether segments ab and cd cross
#[inline]
pub fn segments_cross(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> bool {
    ccw(a, c, d) != ccw(b, c, d) && ccw(a, b, c) != ccw(a, b, d)
}

fn bounds(segments: &[(DVec2, DVec2)]) -> Option<(DVec2, DVec2)> {
    let mut points = segments.iter().flat_map(|(a, b)| [*a, *b]);
    let first = points.next()?;
    Some(points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring(points: &[(f64, f64)]) -> Vec<(DVec2, DVec2)> {
        (0..points.len())
            .map(|i| {
                let (ax, ay) = points[i];
                let (bx, by) = points[(i + 1) % points.len()];
                (DVec2::new(ax, ay), DVec2::new(bx, by))
            })
            .collect()
    }

    #[test]
    fn test_square_cells() {
        let cells = tile_polygon(&ring(&[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]));
        assert_eq!(cells.len(), 16);
        for x in 0..4 {
            for y in 0..4 {
                assert!(cells.contains(&(x, y)));
            }
        }
    }

    #[test]
    fn test_winding_does_not_matter() {
        let points = [(1.0, 1.0), (6.0, 2.0), (5.0, 7.0), (0.0, 5.0)];
        let mut reversed = points;
        reversed.reverse();
        let mut a = tile_polygon(&ring(&points));
        let mut b = tile_polygon(&ring(&reversed));
        a.sort();
        b.sort();
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_empty_input() {
        assert!(tile_polygon(&[]).is_empty());
    }

    #[test]
    fn test_segments_cross() {
        let o = DVec2::ZERO;
        assert!(segments_cross(o, DVec2::new(2.0, 2.0), DVec2::new(0.0, 2.0), DVec2::new(2.0, 0.0)));
        assert!(!segments_cross(o, DVec2::new(1.0, 0.0), DVec2::new(0.0, 1.0), DVec2::new(1.0, 1.0)));
    }
}
