use crate::errors::MapError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Builtin exploration map.
/// `#` wall (World layer, blocks movement), `"` tall grass (Grass layer), `.` path.
pub const BUILTIN_MAP: &str = "\
##############
#............#
#..\"\"\"\"\"\"....#
#..\"\"\"\"\"\"....#
#......##....#
#......##\"\"\"\"#
#........\"\"\"\"#
##############";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, direction: Direction) -> Position {
        let (dx, dy) = direction.delta();
        Position::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Terrain classification of a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerrainKind {
    Path,
    TallGrass,
    Wall,
}

impl TerrainKind {
    fn from_tile(tile: char) -> Option<TerrainKind> {
        match tile {
            '.' => Some(TerrainKind::Path),
            '"' => Some(TerrainKind::TallGrass),
            '#' => Some(TerrainKind::Wall),
            _ => None,
        }
    }

    fn tile(self) -> char {
        match self {
            TerrainKind::Path => '.',
            TerrainKind::TallGrass => '"',
            TerrainKind::Wall => '#',
        }
    }

    pub fn blocks_movement(self) -> bool {
        matches!(self, TerrainKind::Wall)
    }
}

/// Answers "what terrain is at this position?" for the encounter trigger.
pub trait TerrainSampler {
    fn terrain_at(&self, position: Position) -> TerrainKind;
}

/// A rectangular grid of terrain tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileMap {
    width: usize,
    height: usize,
    tiles: Vec<TerrainKind>,
}

impl TileMap {
    pub fn parse(text: &str) -> Result<TileMap, MapError> {
        let rows: Vec<&str> = text
            .lines()
            .map(str::trim_end)
            .filter(|row| !row.is_empty())
            .collect();
        let width = rows.first().map(|row| row.chars().count()).ok_or(MapError::Empty)?;

        let mut tiles = Vec::with_capacity(width * rows.len());
        for (row_index, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(MapError::RaggedRow {
                    row: row_index,
                    expected: width,
                    found,
                });
            }
            for (column, tile) in row.chars().enumerate() {
                let terrain = TerrainKind::from_tile(tile).ok_or(MapError::UnknownTile {
                    tile,
                    row: row_index,
                    column,
                })?;
                tiles.push(terrain);
            }
        }

        Ok(TileMap {
            width,
            height: rows.len(),
            tiles,
        })
    }

    pub fn builtin() -> TileMap {
        TileMap::parse(BUILTIN_MAP).expect("builtin map should parse")
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, position: Position) -> Option<usize> {
        let x = usize::try_from(position.x).ok()?;
        let y = usize::try_from(position.y).ok()?;
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    /// Move one tile unless the destination is blocked. Returns the resulting position.
    pub fn try_step(&self, from: Position, direction: Direction) -> Position {
        let to = from.step(direction);
        if self.terrain_at(to).blocks_movement() {
            from
        } else {
            to
        }
    }

    /// Render the map with the player drawn as `@`.
    pub fn render(&self, player: Position) -> String {
        let mut out = String::with_capacity((self.width + 1) * self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let here = Position::new(x as i32, y as i32);
                if here == player {
                    out.push('@');
                } else {
                    out.push(self.tiles[y * self.width + x].tile());
                }
            }
            out.push('\n');
        }
        out
    }
}

impl TerrainSampler for TileMap {
    /// Anything outside the map counts as a wall.
    fn terrain_at(&self, position: Position) -> TerrainKind {
        self.index(position)
            .map(|index| self.tiles[index])
            .unwrap_or(TerrainKind::Wall)
    }
}
