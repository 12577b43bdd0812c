//! Parse LEV text level files
//!
//! The format is line oriented: a texture table (`TEXTURE: NAME.BM`)
//! followed by `SECTOR` blocks carrying altitudes, textures, flags, a
//! vertex list and walls. Only the keys needed for geometry are read;
//! everything else is skipped.

use std::path::Path;
use std::str::FromStr;

use glam::DVec2;

use super::sector::{Level, RawSector, RawWall, SectorFlags, TextureBinding, Vertex};
use super::LevelError;
use crate::core::error::{BrickError, Result};

/// Load and parse a level file from disk
pub fn load_level(path: &Path) -> Result<Level> {
    if !path.is_file() {
        return Err(BrickError::LevelNotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(parse_level(&content)?)
}

/// Parse level text into sectors, keeping every sector at its file position
/// so that adjoin indices stay valid.
pub fn parse_level(content: &str) -> std::result::Result<Level, LevelError> {
    let mut level = Level::default();
    let mut current: Option<SectorBuilder> = None;
    let mut vertices: Vec<Vertex> = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_matches(|c| c == ' ' || c == '\t' || c == '\r');
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix("TEXTURE:") {
            let name = rest.split('#').next().unwrap_or("").trim();
            level.textures.push(name.to_string());
        } else if line.starts_with("SECTOR") {
            if let Some(builder) = current.take() {
                let index = level.sectors.len();
                level.sectors.push(builder.finish(index)?);
            }
            current = Some(SectorBuilder::default());
            vertices.clear();
        } else if let Some(rest) = line.strip_prefix("FLOOR ALTITUDE") {
            // File altitudes grow downward
            let altitude: f64 = number(rest.split_whitespace().next(), line_no, "FLOOR ALTITUDE")?;
            sector_mut(&mut current, line_no)?.floor_altitude = Some(-altitude);
        } else if let Some(rest) = line.strip_prefix("CEILING ALTITUDE") {
            let altitude: f64 = number(rest.split_whitespace().next(), line_no, "CEILING ALTITUDE")?;
            sector_mut(&mut current, line_no)?.ceiling_altitude = Some(-altitude);
        } else if let Some(rest) = line.strip_prefix("FLOOR TEXTURE") {
            let binding = texture_binding(rest, &level.textures, line_no, "FLOOR TEXTURE")?;
            sector_mut(&mut current, line_no)?.floor = Some(binding);
        } else if let Some(rest) = line.strip_prefix("CEILING TEXTURE") {
            let binding = texture_binding(rest, &level.textures, line_no, "CEILING TEXTURE")?;
            sector_mut(&mut current, line_no)?.ceiling = Some(binding);
        } else if let Some(rest) = line.strip_prefix("FLAGS") {
            let bits: u32 = number(rest.split_whitespace().next(), line_no, "FLAGS")?;
            sector_mut(&mut current, line_no)?.flags = SectorFlags::from_bits(bits);
        } else if line.starts_with("VERTICES") {
            vertices.clear();
        } else if let Some(rest) = line.strip_prefix("X:") {
            let x: f64 = number(rest.split_whitespace().next(), line_no, "X:")?;
            let z: f64 = number(after(line, "Z:", line_no)?.split_whitespace().next(), line_no, "Z:")?;
            vertices.push(DVec2::new(x, z));
        } else if line.starts_with("WALL ") {
            let builder = current
                .as_mut()
                .ok_or(LevelError::WallOutsideSector { line: line_no })?;
            let sector_index = level.sectors.len();
            let wall_index = builder.walls.len();
            let wall = parse_wall(line, line_no, &vertices, &level.textures, sector_index, wall_index)?;
            builder.walls.push(wall);
        }
    }

    if let Some(builder) = current.take() {
        let index = level.sectors.len();
        level.sectors.push(builder.finish(index)?);
    }

    tracing::debug!(
        "Parsed level: {} textures, {} sectors",
        level.textures.len(),
        level.sectors.len()
    );

    Ok(level)
}

#[derive(Default)]
struct SectorBuilder {
    walls: Vec<RawWall>,
    floor: Option<TextureBinding>,
    ceiling: Option<TextureBinding>,
    floor_altitude: Option<f64>,
    ceiling_altitude: Option<f64>,
    flags: SectorFlags,
}

impl SectorBuilder {
    fn finish(self, sector: usize) -> std::result::Result<RawSector, LevelError> {
        let missing = |what| LevelError::IncompleteSector { sector, what };
        Ok(RawSector {
            walls: self.walls,
            floor: self.floor.ok_or_else(|| missing("floor texture"))?,
            ceiling: self.ceiling.ok_or_else(|| missing("ceiling texture"))?,
            floor_altitude: self.floor_altitude.ok_or_else(|| missing("floor altitude"))?,
            ceiling_altitude: self.ceiling_altitude.ok_or_else(|| missing("ceiling altitude"))?,
            flags: self.flags,
        })
    }
}

fn sector_mut(
    current: &mut Option<SectorBuilder>,
    line: usize,
) -> std::result::Result<&mut SectorBuilder, LevelError> {
    current.as_mut().ok_or(LevelError::MissingField {
        line,
        field: "SECTOR",
    })
}

fn parse_wall(
    line: &str,
    line_no: usize,
    vertices: &[Vertex],
    textures: &[String],
    sector: usize,
    wall: usize,
) -> std::result::Result<RawWall, LevelError> {
    let left: i64 = number(after(line, "LEFT:", line_no)?.split_whitespace().next(), line_no, "LEFT:")?;
    let right: i64 = number(after(line, "RIGHT:", line_no)?.split_whitespace().next(), line_no, "RIGHT:")?;

    let mid = texture_binding(after(line, "MID:", line_no)?, textures, line_no, "MID:")?;
    let top = texture_binding(after(line, "TOP:", line_no)?, textures, line_no, "TOP:")?;
    let bottom = texture_binding(after(line, "BOT:", line_no)?, textures, line_no, "BOT:")?;

    let adjoin: i64 = number(after(line, "ADJOIN:", line_no)?.split_whitespace().next(), line_no, "ADJOIN:")?;
    let adjoin = match adjoin {
        -1 => None,
        a if a >= 0 => Some(a as usize),
        a => {
            return Err(LevelError::AdjoinOutOfRange {
                sector,
                wall,
                adjoin: a,
                count: 0,
            })
        }
    };

    Ok(RawWall {
        start: vertex(vertices, left, line_no)?,
        end: vertex(vertices, right, line_no)?,
        mid,
        top,
        bottom,
        adjoin,
    })
}

fn vertex(vertices: &[Vertex], index: i64, line: usize) -> std::result::Result<Vertex, LevelError> {
    usize::try_from(index)
        .ok()
        .and_then(|i| vertices.get(i).copied())
        .ok_or(LevelError::VertexOutOfRange {
            line,
            index,
            count: vertices.len(),
        })
}

/// Parse `index offset_x offset_y` into a binding against the texture table
fn texture_binding(
    rest: &str,
    textures: &[String],
    line: usize,
    field: &'static str,
) -> std::result::Result<TextureBinding, LevelError> {
    let mut tokens = rest.split_whitespace();
    let index: i64 = number(tokens.next(), line, field)?;
    let x: f64 = number(tokens.next(), line, field)?;
    let y: f64 = number(tokens.next(), line, field)?;

    let name = usize::try_from(index)
        .ok()
        .and_then(|i| textures.get(i))
        .ok_or(LevelError::TextureOutOfRange {
            line,
            index,
            count: textures.len(),
        })?;

    Ok(TextureBinding::new(name.clone(), DVec2::new(x, y)))
}

/// Text following `key` on the line
fn after<'a>(line: &'a str, key: &'static str, line_no: usize) -> std::result::Result<&'a str, LevelError> {
    line.find(key)
        .map(|pos| &line[pos + key.len()..])
        .ok_or(LevelError::MissingField {
            line: line_no,
            field: key,
        })
}

fn number<T: FromStr>(
    token: Option<&str>,
    line: usize,
    field: &'static str,
) -> std::result::Result<T, LevelError> {
    let token = token.ok_or(LevelError::MissingField { line, field })?;
    token.parse().map_err(|_| LevelError::InvalidNumber {
        line,
        value: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_ROOMS: &str = r#"
LEV 2.1
# comment line
TEXTURES 2
 TEXTURE: WALL.BM    # 0
 TEXTURE: FLOOR.BM   # 1
NUMSECTORS 2

SECTOR 0
 NAME room_a
 FLOOR TEXTURE 1 0.50 1.25 0
 FLOOR ALTITUDE 0.00
 CEILING TEXTURE 1 0.00 0.00 0
 CEILING ALTITUDE -16.00
 FLAGS 1 0 0
 VERTICES 4
  X: 0.00 Z: 0.00 # 0
  X: 8.00 Z: 0.00 # 1
  X: 8.00 Z: 8.00 # 2
  X: 0.00 Z: 8.00 # 3
 WALLS 4
  WALL LEFT: 0 RIGHT: 1 MID: 0 0.00 0.00 0 TOP: 0 0.00 0.00 0 BOT: 0 0.00 0.00 0 SIGN: -1 0.00 0.00 ADJOIN: -1 MIRROR: -1 WALK: -1 FLAGS: 0 0 0 LIGHT: 0
  WALL LEFT: 1 RIGHT: 2 MID: 0 2.00 0.00 0 TOP: 0 0.00 0.00 0 BOT: 1 0.00 3.00 0 SIGN: -1 0.00 0.00 ADJOIN: 1 MIRROR: 3 WALK: 1 FLAGS: 0 0 0 LIGHT: 0
  WALL LEFT: 2 RIGHT: 3 MID: 0 0.00 0.00 0 TOP: 0 0.00 0.00 0 BOT: 0 0.00 0.00 0 SIGN: -1 0.00 0.00 ADJOIN: -1 MIRROR: -1 WALK: -1 FLAGS: 0 0 0 LIGHT: 0
  WALL LEFT: 3 RIGHT: 0 MID: 0 0.00 0.00 0 TOP: 0 0.00 0.00 0 BOT: 0 0.00 0.00 0 SIGN: -1 0.00 0.00 ADJOIN: -1 MIRROR: -1 WALK: -1 FLAGS: 0 0 0 LIGHT: 0

SECTOR 1
 FLOOR TEXTURE 1 0.00 0.00 0
 FLOOR ALTITUDE -2.00
 CEILING TEXTURE 1 0.00 0.00 0
 CEILING ALTITUDE -12.00
 FLAGS 1152 0 0
 VERTICES 2
  X: 8.00 Z: 0.00 # 0
  X: 8.00 Z: 8.00 # 1
 WALLS 1
  WALL LEFT: 1 RIGHT: 0 MID: 0 0.00 0.00 0 TOP: 0 0.00 0.00 0 BOT: 0 0.00 0.00 0 SIGN: -1 0.00 0.00 ADJOIN: 0 MIRROR: 1 WALK: 0 FLAGS: 0 0 0 LIGHT: 0
"#;

    #[test]
    fn test_parse_two_sectors() {
        let level = parse_level(TWO_ROOMS).unwrap();
        assert_eq!(level.textures, vec!["WALL.BM", "FLOOR.BM"]);
        assert_eq!(level.sectors.len(), 2);

        let a = &level.sectors[0];
        assert_eq!(a.walls.len(), 4);
        assert_eq!(a.floor.texture, "FLOOR.BM");
        assert_eq!(a.floor.offset, DVec2::new(0.5, 1.25));
        // Altitudes are negated on read
        assert_eq!(a.floor_altitude, 0.0);
        assert_eq!(a.ceiling_altitude, 16.0);
        assert!(a.flags.open_sky);
        assert!(!a.flags.no_walls);

        let shared = &a.walls[1];
        assert_eq!(shared.start, DVec2::new(8.0, 0.0));
        assert_eq!(shared.end, DVec2::new(8.0, 8.0));
        assert_eq!(shared.adjoin, Some(1));
        assert_eq!(shared.mid.offset, DVec2::new(2.0, 0.0));
        assert_eq!(shared.bottom.texture, "FLOOR.BM");
        assert_eq!(shared.bottom.offset, DVec2::new(0.0, 3.0));

        let b = &level.sectors[1];
        assert_eq!(b.floor_altitude, 2.0);
        assert!(b.flags.pit);
        assert!(b.flags.no_walls);
        assert_eq!(b.walls[0].adjoin, Some(0));
    }

    #[test]
    fn test_texture_index_out_of_range() {
        let text = TWO_ROOMS.replace("FLOOR TEXTURE 1 0.50", "FLOOR TEXTURE 7 0.50");
        match parse_level(&text) {
            Err(LevelError::TextureOutOfRange { index, count, .. }) => {
                assert_eq!(index, 7);
                assert_eq!(count, 2);
            }
            other => panic!("Expected TextureOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_vertex_index_out_of_range() {
        let text = TWO_ROOMS.replace("WALL LEFT: 3 RIGHT: 0", "WALL LEFT: 9 RIGHT: 0");
        assert!(matches!(
            parse_level(&text),
            Err(LevelError::VertexOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn test_invalid_number() {
        let text = TWO_ROOMS.replace("FLOOR ALTITUDE -2.00", "FLOOR ALTITUDE abc");
        assert!(matches!(parse_level(&text), Err(LevelError::InvalidNumber { .. })));
    }

    #[test]
    fn test_incomplete_sector() {
        let text = "TEXTURE: A.BM\nSECTOR 0\n FLOOR TEXTURE 0 0 0\n FLOOR ALTITUDE 0\n";
        assert!(matches!(
            parse_level(text),
            Err(LevelError::IncompleteSector { sector: 0, .. })
        ));
    }

    #[test]
    fn test_wallless_sector_keeps_position() {
        let text = "TEXTURE: A.BM\n\
            SECTOR 0\n FLOOR TEXTURE 0 0 0\n FLOOR ALTITUDE 0\n CEILING TEXTURE 0 0 0\n CEILING ALTITUDE -8\n\
            SECTOR 1\n FLOOR TEXTURE 0 0 0\n FLOOR ALTITUDE 0\n CEILING TEXTURE 0 0 0\n CEILING ALTITUDE -4\n";
        let level = parse_level(text).unwrap();
        assert_eq!(level.sectors.len(), 2);
        assert!(level.sectors[0].walls.is_empty());
        assert_eq!(level.sectors[1].ceiling_altitude, 4.0);
    }
}
