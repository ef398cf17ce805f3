//! # Floor Layout Generation
//!
//! Classic rooms-and-corridors carving: scatter non-overlapping rectangular
//! rooms, connect consecutive room centers with L-shaped corridors, shell
//! every carved tile with walls, then drop the stairs in the first and last
//! rooms. Layout is fully determined by the rng state, so a floor can be
//! reproduced bit-for-bit from the same seed.

use crate::{Position, Room, TileGrid, TileType};
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

/// A fully carved floor, ready to be populated.
#[derive(Debug, Clone)]
pub struct Dungeon {
    pub grid: TileGrid,
    /// Carved rooms in acceptance order. The first and last are safe rooms:
    /// monsters neither spawn in nor enter them.
    pub rooms: Vec<Room>,
    pub stairs_up: Position,
    pub stairs_down: Position,
}

impl Dungeon {
    /// Whether the position lies inside a safe room (the entry room holding
    /// the up stairs, or the exit room holding the down stairs).
    pub fn in_safe_room(&self, pos: Position) -> bool {
        match (self.rooms.first(), self.rooms.last()) {
            (Some(first), Some(last)) => first.contains(pos) || last.contains(pos),
            _ => false,
        }
    }
}

/// Rooms-and-corridors layout generator.
#[derive(Debug, Clone, Copy)]
pub struct DungeonGenerator {
    pub width: u32,
    pub height: u32,
}

impl DungeonGenerator {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Carves a floor, attempting `max_rooms` room placements with side
    /// lengths in `min_room_size..=max_room_size`.
    ///
    /// Overlapping candidates (inclusive bounds, so shared walls count) are
    /// rejected rather than retried. A degenerate outcome with fewer than
    /// two accepted rooms is tolerated: both stairs land on the single
    /// room's center, or on `(0, 0)` when nothing fit.
    pub fn generate(
        &self,
        rng: &mut StdRng,
        max_rooms: usize,
        min_room_size: i32,
        max_room_size: i32,
    ) -> Dungeon {
        let mut grid = TileGrid::new(self.width, self.height);
        let mut rooms: Vec<Room> = Vec::new();

        for _ in 0..max_rooms {
            let w = rng.gen_range(min_room_size..=max_room_size);
            let h = rng.gen_range(min_room_size..=max_room_size);
            let max_x = self.width as i32 - w - 1;
            let max_y = self.height as i32 - h - 1;
            if max_x < 1 || max_y < 1 {
                continue;
            }
            let candidate = Room::new(rng.gen_range(1..=max_x), rng.gen_range(1..=max_y), w, h);
            if rooms.iter().any(|r| candidate.intersects(r, 1)) {
                continue;
            }
            carve_room(&mut grid, &candidate);
            if let Some(prev) = rooms.last() {
                carve_corridor(&mut grid, prev.center(), candidate.center(), rng);
            }
            rooms.push(candidate);
        }

        shell_with_walls(&mut grid);

        let (stairs_up, stairs_down) = match (rooms.first(), rooms.last()) {
            (Some(first), Some(last)) => (first.center(), last.center()),
            _ => (Position::origin(), Position::origin()),
        };
        grid.set(stairs_up, TileType::StairsUp);
        grid.set(stairs_down, TileType::StairsDown);

        debug!(
            "carved {} rooms on a {}x{} floor, stairs {:?} -> {:?}",
            rooms.len(),
            self.width,
            self.height,
            stairs_up,
            stairs_down
        );
        Dungeon {
            grid,
            rooms,
            stairs_up,
            stairs_down,
        }
    }
}

fn carve_room(grid: &mut TileGrid, room: &Room) {
    for pos in room.tiles() {
        grid.set(pos, TileType::Floor);
    }
}

/// Carves an L-shaped corridor between two points, flipping a coin for
/// which leg comes first so corridors don't all bend the same way.
fn carve_corridor(grid: &mut TileGrid, from: Position, to: Position, rng: &mut StdRng) {
    let corner = if rng.gen_bool(0.5) {
        Position::new(to.x, from.y)
    } else {
        Position::new(from.x, to.y)
    };
    carve_straight(grid, from, corner);
    carve_straight(grid, corner, to);
}

fn carve_straight(grid: &mut TileGrid, from: Position, to: Position) {
    let mut pos = from;
    loop {
        if grid.get(pos) == Some(TileType::Void) {
            grid.set(pos, TileType::Floor);
        }
        if pos == to {
            break;
        }
        pos = Position::new(
            pos.x + (to.x - pos.x).signum(),
            pos.y + (to.y - pos.y).signum(),
        );
    }
}

/// Hardens every void tile touching (8-way) a floor tile into a wall.
fn shell_with_walls(grid: &mut TileGrid) {
    let mut walls = Vec::new();
    for y in 0..grid.height as i32 {
        for x in 0..grid.width as i32 {
            let pos = Position::new(x, y);
            if grid.get(pos) != Some(TileType::Void) {
                continue;
            }
            let touches_floor = (-1..=1).any(|dy| {
                (-1..=1).any(|dx| {
                    grid.get(pos.offset(dx, dy))
                        .map_or(false, |t| t == TileType::Floor)
                })
            });
            if touches_floor {
                walls.push(pos);
            }
        }
    }
    for pos in walls {
        grid.set(pos, TileType::Wall);
    }
}
