//! # Procedural Generation
//!
//! Floor layout generation and population. [`dungeon`] carves rooms and
//! corridors into a [`TileGrid`](crate::TileGrid); [`spawning`] fills the
//! result with depth-appropriate monsters and loot.

pub mod dungeon;
pub mod spawning;

pub use dungeon::{Dungeon, DungeonGenerator};
pub use spawning::MonsterTable;

use crate::Position;
use serde::{Deserialize, Serialize};

/// A rectangular room carved into the floor, in tile coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Room {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// The room's center tile, rounded down.
    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Whether the position lies on one of the room's floor tiles.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x && pos.x < self.x + self.width && pos.y >= self.y && pos.y < self.y + self.height
    }

    /// Whether this room overlaps `other` when each is padded by `margin`
    /// tiles. A one-tile margin keeps the wall shells of adjacent rooms
    /// from merging.
    pub fn intersects(&self, other: &Room, margin: i32) -> bool {
        self.x - margin < other.x + other.width
            && self.x + self.width + margin > other.x
            && self.y - margin < other.y + other.height
            && self.y + self.height + margin > other.y
    }

    /// Iterates every floor tile in the room.
    pub fn tiles(&self) -> impl Iterator<Item = Position> + '_ {
        let (x0, y0, w, h) = (self.x, self.y, self.width, self.height);
        (y0..y0 + h).flat_map(move |y| (x0..x0 + w).map(move |x| Position::new(x, y)))
    }
}
