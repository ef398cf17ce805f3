//! # Visibility
//!
//! Line-of-sight checks and per-player visible-tile computation used for
//! fog-of-war snapshots and for gating ranged attacks and AI aggression.
//!
//! Sight is traced with Bresenham's line algorithm. Walls block sight but
//! are themselves visible, so the boundary of a room renders even though
//! nothing behind it does.

use crate::{config, Position, TileGrid};
use std::collections::HashSet;

/// Walks the Bresenham line from `from` to `to`, inclusive of both
/// endpoints.
pub fn bresenham_line(from: Position, to: Position) -> Vec<Position> {
    let mut points = Vec::new();
    let dx = (to.x - from.x).abs();
    let dy = -(to.y - from.y).abs();
    let sx = if from.x < to.x { 1 } else { -1 };
    let sy = if from.y < to.y { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (from.x, from.y);
    loop {
        points.push(Position::new(x, y));
        if x == to.x && y == to.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
    points
}

/// Whether an unobstructed sight line runs between the two positions.
///
/// Only tiles strictly between the endpoints can block; a wall is visible
/// from the tile in front of it, and an attacker standing in a doorway can
/// see out of it.
pub fn has_line_of_sight(grid: &TileGrid, from: Position, to: Position) -> bool {
    let line = bresenham_line(from, to);
    if line.len() <= 2 {
        return true;
    }
    for pos in &line[1..line.len() - 1] {
        if grid.get(*pos).map_or(true, |t| t.blocks_sight()) {
            return false;
        }
    }
    true
}

/// All tiles visible from `origin` within [`config::VISION_RADIUS`]
/// (Euclidean), including `origin` itself.
pub fn visible_tiles(grid: &TileGrid, origin: Position) -> HashSet<Position> {
    visible_tiles_within(grid, origin, config::VISION_RADIUS)
}

/// As [`visible_tiles`], with an explicit radius.
pub fn visible_tiles_within(grid: &TileGrid, origin: Position, radius: i32) -> HashSet<Position> {
    let mut visible = HashSet::new();
    let limit = i64::from(radius) * i64::from(radius);
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let target = origin.offset(dx, dy);
            if !grid.in_bounds(target) || origin.distance_squared(target) > limit {
                continue;
            }
            if has_line_of_sight(grid, origin, target) {
                visible.insert(target);
            }
        }
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TileType;

    /// 11x11 grid of open floor.
    fn open_grid() -> TileGrid {
        let mut grid = TileGrid::new(11, 11);
        for y in 0..11 {
            for x in 0..11 {
                grid.set(Position::new(x, y), TileType::Floor);
            }
        }
        grid
    }

    #[test]
    fn test_bresenham_endpoints_and_contiguity() {
        let line = bresenham_line(Position::new(0, 0), Position::new(5, 3));
        assert_eq!(line.first(), Some(&Position::new(0, 0)));
        assert_eq!(line.last(), Some(&Position::new(5, 3)));
        for pair in line.windows(2) {
            let step = pair[1] - pair[0];
            assert!(step.x.abs() <= 1 && step.y.abs() <= 1);
        }
    }

    #[test]
    fn test_bresenham_single_point() {
        let p = Position::new(3, 3);
        assert_eq!(bresenham_line(p, p), vec![p]);
    }

    #[test]
    fn test_los_open_floor() {
        let grid = open_grid();
        assert!(has_line_of_sight(
            &grid,
            Position::new(1, 1),
            Position::new(9, 9)
        ));
    }

    #[test]
    fn test_wall_blocks_but_is_visible() {
        let mut grid = open_grid();
        // wall column at x=5
        for y in 0..11 {
            grid.set(Position::new(5, y), TileType::Wall);
        }
        let origin = Position::new(2, 5);
        assert!(!has_line_of_sight(&grid, origin, Position::new(8, 5)));
        // the wall tile itself is in sight
        assert!(has_line_of_sight(&grid, origin, Position::new(5, 5)));

        let visible = visible_tiles(&grid, origin);
        assert!(visible.contains(&Position::new(5, 5)));
        assert!(!visible.contains(&Position::new(8, 5)));
    }

    #[test]
    fn test_adjacent_always_visible() {
        let mut grid = open_grid();
        grid.set(Position::new(6, 5), TileType::Wall);
        let origin = Position::new(5, 5);
        for adj in origin.cardinal_adjacent_positions() {
            assert!(has_line_of_sight(&grid, origin, adj));
        }
    }

    #[test]
    fn test_visible_tiles_bounded_by_radius() {
        let mut grid = TileGrid::new(40, 40);
        for y in 0..40 {
            for x in 0..40 {
                grid.set(Position::new(x, y), TileType::Floor);
            }
        }
        let origin = Position::new(20, 20);
        let visible = visible_tiles(&grid, origin);
        assert!(visible.contains(&origin));
        let r = crate::config::VISION_RADIUS;
        let limit = i64::from(r) * i64::from(r);
        for pos in &visible {
            assert!(origin.distance_squared(*pos) <= limit);
        }
        assert!(visible.contains(&origin.offset(r, 0)));
        assert!(!visible.contains(&origin.offset(r + 1, 0)));
        // the corner of the bounding box lies outside the circle
        assert!(!visible.contains(&origin.offset(r, r)));
    }
}
