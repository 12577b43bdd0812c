//! Resolve adjoined walls into single-texture wall segments
//!
//! An unadjoined wall spans its sector from floor to ceiling. An adjoined
//! wall only produces the visible steps: a lower wall where the far floor
//! is higher and an upper wall where the far ceiling is lower. Every sector
//! is refined from its own side; the neighbour produces its own copy.

use geo::{Area, LineString, Polygon};

use super::sector::{RawSector, SectorFlags, TextureBinding, Vertex};
use super::LevelError;
use crate::core::config::SectorPriority;

/// A wall segment with a single texture and explicit altitudes
#[derive(Debug, Clone, PartialEq)]
pub struct RefinedWall {
    pub start: Vertex,
    pub end: Vertex,
    pub bottom: f64,
    pub top: f64,
    pub texture: TextureBinding,
    /// Texture origin is the upper edge instead of the lower one
    pub anchored_from_top: bool,
}

/// A sector after refinement
#[derive(Debug, Clone)]
pub struct RefinedSector {
    pub walls: Vec<RefinedWall>,
    pub floor: TextureBinding,
    pub ceiling: TextureBinding,
    pub floor_altitude: f64,
    pub ceiling_altitude: f64,
    pub flags: SectorFlags,
    /// Absolute polygon area in square level units
    pub area: f64,
    /// Raw wall endpoints before refinement, used for interior tests
    pub boundary: Vec<(Vertex, Vertex)>,
}

/// Refine every sector of a level, in file order
pub fn refine_level(sectors: &[RawSector]) -> Result<Vec<RefinedSector>, LevelError> {
    let refined = sectors
        .iter()
        .enumerate()
        .map(|(index, _)| refine_sector(index, sectors))
        .collect::<Result<Vec<_>, _>>()?;

    tracing::info!(
        "Refined {} sectors into {} walls",
        refined.len(),
        refined.iter().map(|s| s.walls.len()).sum::<usize>()
    );
    Ok(refined)
}

/// Refine one sector, resolving adjoins against all sectors
pub fn refine_sector(index: usize, sectors: &[RawSector]) -> Result<RefinedSector, LevelError> {
    let sector = sectors.get(index).ok_or(LevelError::SectorOutOfRange {
        index,
        count: sectors.len(),
    })?;
    let mut walls = Vec::with_capacity(sector.walls.len());

    for (wall_index, wall) in sector.walls.iter().enumerate() {
        let Some(adjoin) = wall.adjoin else {
            walls.push(RefinedWall {
                start: wall.start,
                end: wall.end,
                bottom: sector.floor_altitude,
                top: sector.ceiling_altitude,
                texture: wall.mid.clone(),
                anchored_from_top: false,
            });
            continue;
        };

        let far = sectors.get(adjoin).ok_or(LevelError::AdjoinOutOfRange {
            sector: index,
            wall: wall_index,
            adjoin: adjoin as i64,
            count: sectors.len(),
        })?;

        // Step up on the far side
        if far.floor_altitude > sector.floor_altitude {
            walls.push(RefinedWall {
                start: wall.start,
                end: wall.end,
                bottom: sector.floor_altitude,
                top: far.floor_altitude,
                texture: wall.bottom.clone(),
                anchored_from_top: false,
            });
        }

        // Overhang on the far side
        if far.ceiling_altitude < sector.ceiling_altitude {
            walls.push(RefinedWall {
                start: wall.start,
                end: wall.end,
                bottom: far.ceiling_altitude,
                top: sector.ceiling_altitude,
                texture: wall.top.clone(),
                anchored_from_top: true,
            });
        }
    }

    let boundary: Vec<(Vertex, Vertex)> = sector.walls.iter().map(|w| (w.start, w.end)).collect();
    let outline: Vec<Vertex> = sector.walls.iter().map(|w| w.start).collect();

    Ok(RefinedSector {
        walls,
        floor: sector.floor.clone(),
        ceiling: sector.ceiling.clone(),
        floor_altitude: sector.floor_altitude,
        ceiling_altitude: sector.ceiling_altitude,
        flags: sector.flags,
        area: polygon_area(&outline),
        boundary,
    })
}

/// Absolute shoelace area of the polygon through `points`
///
/// Winding is not consistent across authoring tools, so only the magnitude
/// is meaningful.
pub fn polygon_area(points: &[Vertex]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let ring: LineString<f64> = points.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>().into();
    Polygon::new(ring, vec![]).unsigned_area()
}

/// Stable sort by area. Later sectors overwrite earlier ones, so the
/// prioritized end of the range goes last.
pub fn order_by_priority(sectors: &mut [RefinedSector], priority: SectorPriority) {
    match priority {
        SectorPriority::Large => sectors.sort_by(|a, b| a.area.total_cmp(&b.area)),
        SectorPriority::Small => sectors.sort_by(|a, b| b.area.total_cmp(&a.area)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::sector::RawWall;
    use glam::DVec2;

    fn binding(name: &str) -> TextureBinding {
        TextureBinding::new(name, DVec2::ZERO)
    }

    fn square(origin: DVec2, size: f64, floor: f64, ceiling: f64, adjoins: [Option<usize>; 4]) -> RawSector {
        let corners = [
            origin,
            origin + DVec2::new(size, 0.0),
            origin + DVec2::new(size, size),
            origin + DVec2::new(0.0, size),
        ];
        let walls = (0..4)
            .map(|i| RawWall {
                start: corners[i],
                end: corners[(i + 1) % 4],
                mid: binding("MID.BM"),
                top: binding("TOP.BM"),
                bottom: binding("BOT.BM"),
                adjoin: adjoins[i],
            })
            .collect();
        RawSector {
            walls,
            floor: binding("FLOOR.BM"),
            ceiling: binding("CEIL.BM"),
            floor_altitude: floor,
            ceiling_altitude: ceiling,
            flags: SectorFlags::default(),
        }
    }

    /// Two 4x4 rooms sharing the wall at x = 4
    fn pair(floor_b: f64, ceiling_b: f64) -> Vec<RawSector> {
        vec![
            square(DVec2::ZERO, 4.0, 0.0, 10.0, [None, Some(1), None, None]),
            square(DVec2::new(4.0, 0.0), 4.0, floor_b, ceiling_b, [None, None, None, Some(0)]),
        ]
    }

    #[test]
    fn test_unadjoined_wall_spans_sector() {
        let sectors = vec![square(DVec2::ZERO, 4.0, -2.0, 6.0, [None; 4])];
        let refined = refine_sector(0, &sectors).unwrap();

        assert_eq!(refined.walls.len(), 4);
        for wall in &refined.walls {
            assert_eq!(wall.bottom, -2.0);
            assert_eq!(wall.top, 6.0);
            assert_eq!(wall.texture.texture, "MID.BM");
            assert!(!wall.anchored_from_top);
        }
        assert_eq!(refined.boundary.len(), 4);
        assert!((refined.area - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_matching_altitudes_produce_no_wall() {
        let sectors = pair(0.0, 10.0);
        let a = refine_sector(0, &sectors).unwrap();
        let b = refine_sector(1, &sectors).unwrap();
        // Three outer walls each, the shared one vanishes on both sides
        assert_eq!(a.walls.len(), 3);
        assert_eq!(b.walls.len(), 3);
    }

    #[test]
    fn test_step_produces_bottom_wall_on_low_side_only() {
        let sectors = pair(3.0, 10.0);
        let a = refine_sector(0, &sectors).unwrap();
        let b = refine_sector(1, &sectors).unwrap();

        let step: Vec<_> = a.walls.iter().filter(|w| w.texture.texture == "BOT.BM").collect();
        assert_eq!(step.len(), 1);
        assert_eq!(step[0].bottom, 0.0);
        assert_eq!(step[0].top, 3.0);
        assert!(!step[0].anchored_from_top);
        assert_eq!(step[0].start, DVec2::new(4.0, 0.0));
        assert_eq!(step[0].end, DVec2::new(4.0, 4.0));

        // The high side sees a lower floor and the same ceiling
        assert_eq!(b.walls.len(), 3);
    }

    #[test]
    fn test_step_and_overhang_from_one_wall() {
        let sectors = pair(3.0, 7.0);
        let a = refine_sector(0, &sectors).unwrap();
        assert_eq!(a.walls.len(), 5);

        let upper = a.walls.iter().find(|w| w.texture.texture == "TOP.BM").unwrap();
        assert_eq!(upper.bottom, 7.0);
        assert_eq!(upper.top, 10.0);
        assert!(upper.anchored_from_top);
    }

    #[test]
    fn test_adjoin_out_of_range_is_fatal() {
        let sectors = vec![square(DVec2::ZERO, 4.0, 0.0, 10.0, [None, Some(5), None, None])];
        match refine_level(&sectors) {
            Err(LevelError::AdjoinOutOfRange { sector, wall, adjoin, count }) => {
                assert_eq!((sector, wall, adjoin, count), (0, 1, 5, 1));
            }
            other => panic!("Expected AdjoinOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_sector_index_out_of_range() {
        let sectors = pair(0.0, 10.0);
        assert!(matches!(
            refine_sector(2, &sectors),
            Err(LevelError::SectorOutOfRange { index: 2, count: 2 })
        ));
    }

    #[test]
    fn test_area_ignores_winding() {
        let ccw = [DVec2::new(0.0, 0.0), DVec2::new(3.0, 0.0), DVec2::new(3.0, 2.0), DVec2::new(0.0, 2.0)];
        let mut cw = ccw;
        cw.reverse();
        assert!((polygon_area(&ccw) - 6.0).abs() < 1e-9);
        assert!((polygon_area(&cw) - 6.0).abs() < 1e-9);
        assert_eq!(polygon_area(&ccw[..2]), 0.0);
    }

    #[test]
    fn test_priority_order() {
        let mut sectors = refine_level(&[
            square(DVec2::ZERO, 8.0, 0.0, 1.0, [None; 4]),
            square(DVec2::ZERO, 2.0, 0.0, 1.0, [None; 4]),
            square(DVec2::ZERO, 4.0, 0.0, 1.0, [None; 4]),
        ])
        .unwrap();

        order_by_priority(&mut sectors, SectorPriority::Large);
        let areas: Vec<f64> = sectors.iter().map(|s| s.area).collect();
        assert_eq!(areas, vec![4.0, 16.0, 64.0]);

        order_by_priority(&mut sectors, SectorPriority::Small);
        let areas: Vec<f64> = sectors.iter().map(|s| s.area).collect();
        assert_eq!(areas, vec![64.0, 16.0, 4.0]);
    }
}
