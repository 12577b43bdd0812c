//! Turn refined sectors into colored unit plates
//!
//! Walls are tiled as lines and extruded upward in sub-plate steps; floors
//! and ceilings are tiled as polygons at a single height. Every plate takes
//! its color from the texture pixel it maps to.

use ahash::AHashSet;
use glam::DVec2;
use rayon::prelude::*;

use super::Plate;
use crate::color::ColorMatcher;
use crate::core::config::{ConversionConfig, PLATE_HEIGHT, PX_PER_DFU, STEP_REDUCTION};
use crate::core::types::Rgb;
use crate::level::{RefinedSector, RefinedWall, TextureBinding};
use crate::raster::{tile_line, tile_polygon};
use crate::texture::{Texture, TextureSet};

/// Height increment while walking up a wall, in studs
const WALL_STEP: f64 = PLATE_HEIGHT * STEP_REDUCTION;

/// Builds plates for a run. Shares the preloaded textures and the color
/// matcher read-only across sectors.
pub struct PlateBuilder<'a> {
    config: &'a ConversionConfig,
    textures: &'a TextureSet,
    matcher: &'a ColorMatcher,
}

impl<'a> PlateBuilder<'a> {
    pub fn new(config: &'a ConversionConfig, textures: &'a TextureSet, matcher: &'a ColorMatcher) -> Self {
        Self {
            config,
            textures,
            matcher,
        }
    }

    /// Plates of every sector: all walls first, then all floors and
    /// ceilings, each group in sector order.
    ///
    /// Sectors are processed in parallel; results are concatenated in input
    /// order so overlapping cells resolve exactly as in a sequential run.
    pub fn build(&self, sectors: &[RefinedSector]) -> Vec<Plate> {
        let walls: Vec<Vec<Plate>> = sectors.par_iter().map(|s| self.wall_plates(s)).collect();
        let wall_count: usize = walls.iter().map(Vec::len).sum();
        tracing::info!("Generated {} wall plates", wall_count);

        let surfaces: Vec<Vec<Plate>> = sectors.par_iter().map(|s| self.surface_plates(s)).collect();
        let surface_count: usize = surfaces.iter().map(Vec::len).sum();
        tracing::info!("Generated {} floor and ceiling plates", surface_count);

        let mut plates = Vec::with_capacity(wall_count + surface_count);
        for chunk in walls.into_iter().chain(surfaces) {
            plates.extend(chunk);
        }
        plates
    }

    /// Plates for all walls of one sector; none when the sector has no walls
    pub fn wall_plates(&self, sector: &RefinedSector) -> Vec<Plate> {
        if sector.flags.no_walls {
            return Vec::new();
        }
        let mut plates = Vec::new();
        for wall in &sector.walls {
            self.extrude_wall(wall, &mut plates);
        }
        plates
    }

    fn extrude_wall(&self, wall: &RefinedWall, plates: &mut Vec<Plate>) {
        let Some(texture) = self.texture(&wall.texture) else {
            return;
        };
        let config = self.config;
        let start = self.to_studs(wall.start);
        let end = self.to_studs(wall.end);
        let bottom = config.to_stud_height(wall.bottom);
        let top = config.to_stud_height(wall.top);
        if top <= bottom {
            return;
        }
        let offset = wall.texture.offset;

        let mut cells: Vec<_> = tile_line(start, end).into_iter().collect();
        cells.sort_unstable();
        for (x, y) in cells {
            // Distance is measured from the cell's low corner
            let distance = DVec2::new(x as f64, y as f64).distance(start);
            let column = ((distance * config.xy_scale + offset.x) * PX_PER_DFU).max(0.0);
            let u = column as i64;

            // Accumulated, not rounded, so no plate level is stepped over
            let mut height = bottom;
            while height <= top {
                let rise = if wall.anchored_from_top {
                    top - height
                } else {
                    bottom - height
                };
                let row = ((rise * config.z_scale + offset.y) * PX_PER_DFU) as i64;
                plates.push(Plate {
                    x,
                    y,
                    height,
                    color: self.matcher.match_rgb(texture.sample(u, row)),
                });
                height += WALL_STEP;
            }
        }
    }

    /// Floor plates (unless the sector is a pit) and ceiling plates (when
    /// ceilings are generated and the sector is not open to the sky)
    pub fn surface_plates(&self, sector: &RefinedSector) -> Vec<Plate> {
        let config = self.config;
        let floor = if sector.flags.pit {
            None
        } else {
            self.texture(&sector.floor)
                .map(|t| (t, &sector.floor, config.to_stud_height(sector.floor_altitude)))
        };
        let ceiling = if config.generate_ceilings && !sector.flags.open_sky {
            self.texture(&sector.ceiling)
                .map(|t| (t, &sector.ceiling, config.to_stud_height(sector.ceiling_altitude)))
        } else {
            None
        };
        if floor.is_none() && ceiling.is_none() {
            return Vec::new();
        }

        let boundary: Vec<(DVec2, DVec2)> = sector
            .boundary
            .iter()
            .map(|&(a, b)| (self.to_studs(a), self.to_studs(b)))
            .collect();
        let cells = tile_polygon(&boundary);

        let mut plates = Vec::with_capacity(cells.len() * 2);
        for (x, y) in cells {
            let dfu = DVec2::new(config.to_dfu(x as f64), config.to_dfu(y as f64));
            for (texture, binding, height) in [floor, ceiling].into_iter().flatten() {
                plates.push(Plate {
                    x,
                    y,
                    height,
                    color: self.matcher.match_rgb(surface_pixel(texture, dfu + binding.offset)),
                });
            }
        }
        plates
    }

    fn texture(&self, binding: &TextureBinding) -> Option<&'a Texture> {
        let texture = self.textures.get(&binding.texture);
        if texture.is_none() {
            tracing::warn!("Texture {} was not preloaded, skipping", binding.texture);
        }
        texture
    }

    fn to_studs(&self, v: DVec2) -> DVec2 {
        DVec2::new(self.config.to_studs(v.x), self.config.to_studs(v.y))
    }
}

/// Texture pixel under a floor or ceiling position given in level units
fn surface_pixel(texture: &Texture, dfu: DVec2) -> Rgb {
    let px = (dfu.x * PX_PER_DFU).rem_euclid(texture.width() as f64) as i64;
    let py = (dfu.y * PX_PER_DFU).rem_euclid(texture.height() as f64) as i64;
    texture.sample(px, py)
}

/// Every texture name the plate builder will sample, in first-use order
pub fn referenced_textures<'s>(sectors: &'s [RefinedSector], config: &ConversionConfig) -> Vec<&'s str> {
    let mut seen = AHashSet::new();
    let mut names = Vec::new();
    let mut add = |name: &'s str| {
        if seen.insert(name) {
            names.push(name);
        }
    };

    for sector in sectors.iter().filter(|s| !s.flags.no_walls) {
        for wall in &sector.walls {
            add(wall.texture.texture.as_str());
        }
    }
    for sector in sectors {
        if !sector.flags.pit {
            add(sector.floor.texture.as_str());
        }
        if config.generate_ceilings && !sector.flags.open_sky {
            add(sector.ceiling.texture.as_str());
        }
    }
    names
}
