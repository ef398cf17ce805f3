//! # World Representation
//!
//! The tile grid for one dungeon floor.
//!
//! A grid is owned exclusively by its [`GameInstance`](crate::GameInstance)
//! and replaced wholesale on floor transitions; nothing mutates a grid across
//! floors.

use crate::Position;
use serde::{Deserialize, Serialize};

/// The kinds of tile a floor is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileType {
    /// Unexcavated rock; neither walkable nor carved
    Void,
    /// Opaque, impassable wall
    Wall,
    /// Open floor
    Floor,
    /// Doorway; walkable and transparent
    Door,
    /// Ascent to the previous floor
    StairsUp,
    /// Descent to the next floor
    StairsDown,
}

impl TileType {
    /// Whether entities may stand on this tile.
    pub fn is_walkable(self) -> bool {
        matches!(
            self,
            TileType::Floor | TileType::Door | TileType::StairsUp | TileType::StairsDown
        )
    }

    /// Whether this tile blocks line-of-sight.
    pub fn blocks_sight(self) -> bool {
        matches!(self, TileType::Wall)
    }
}

/// A rectangular grid of tiles, row-major.
///
/// All access is bounds-checked; out-of-bounds reads return `None` and
/// out-of-bounds writes are ignored, mirroring the engine-wide rule that
/// invalid operations are inert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileGrid {
    pub width: u32,
    pub height: u32,
    tiles: Vec<Vec<TileType>>,
}

impl TileGrid {
    /// Creates a grid of the given dimensions filled with [`TileType::Void`].
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            tiles: vec![vec![TileType::Void; width as usize]; height as usize],
        }
    }

    /// Whether a position lies inside the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }

    /// Gets the tile at a position, or `None` when out of bounds.
    pub fn get(&self, pos: Position) -> Option<TileType> {
        if self.in_bounds(pos) {
            Some(self.tiles[pos.y as usize][pos.x as usize])
        } else {
            None
        }
    }

    /// Sets the tile at a position. Returns `false` when out of bounds.
    pub fn set(&mut self, pos: Position, tile: TileType) -> bool {
        if self.in_bounds(pos) {
            self.tiles[pos.y as usize][pos.x as usize] = tile;
            true
        } else {
            false
        }
    }

    /// Whether the tile at `pos` exists and can be stood on.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.get(pos).map_or(false, TileType::is_walkable)
    }

    /// Scans for the first tile of the given kind, row by row.
    ///
    /// Used to locate stairs after generation. Returns `None` for degenerate
    /// floors that never placed one.
    pub fn find_tile(&self, kind: TileType) -> Option<Position> {
        for (y, row) in self.tiles.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if *tile == kind {
                    return Some(Position::new(x as i32, y as i32));
                }
            }
        }
        None
    }

    /// All walkable positions, row by row.
    pub fn walkable_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        for (y, row) in self.tiles.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if tile.is_walkable() {
                    positions.push(Position::new(x as i32, y as i32));
                }
            }
        }
        positions
    }

    /// All positions holding exactly [`TileType::Floor`].
    pub fn floor_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        for (y, row) in self.tiles.iter().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                if *tile == TileType::Floor {
                    positions.push(Position::new(x as i32, y as i32));
                }
            }
        }
        positions
    }

    /// Raw row access for snapshot serialization.
    pub fn rows(&self) -> &[Vec<TileType>] {
        &self.tiles
    }
}
