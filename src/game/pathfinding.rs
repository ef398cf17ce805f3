//! # Pathfinding
//!
//! Breadth-first search over the tile grid with a hard node budget, used by
//! monster AI to chase players. BFS on a uniform-cost 4-connected grid is
//! already optimal, and the budget keeps a floor full of monsters from
//! scanning the whole map every tick when a target is unreachable.

use crate::{config, Position, TileGrid};
use std::collections::{HashMap, HashSet, VecDeque};

/// Finds a shortest 4-connected path from `start` to `goal`.
///
/// Returns the steps after `start` through `goal` inclusive, or `None` when
/// no path exists within [`config::PATHFINDING_BUDGET`] expanded nodes.
/// Positions in `blocked` (occupied by living entities) are impassable,
/// except the goal itself so paths can terminate on an occupied tile.
pub fn find_path(
    grid: &TileGrid,
    start: Position,
    goal: Position,
    blocked: &HashSet<Position>,
) -> Option<Vec<Position>> {
    if start == goal {
        return Some(Vec::new());
    }
    if !grid.is_walkable(goal) {
        return None;
    }

    let mut frontier = VecDeque::new();
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    frontier.push_back(start);
    came_from.insert(start, start);

    let mut expanded = 0usize;
    while let Some(current) = frontier.pop_front() {
        expanded += 1;
        if expanded > config::PATHFINDING_BUDGET {
            return None;
        }
        for next in current.cardinal_adjacent_positions() {
            if came_from.contains_key(&next) || !grid.is_walkable(next) {
                continue;
            }
            if blocked.contains(&next) && next != goal {
                continue;
            }
            came_from.insert(next, current);
            if next == goal {
                return Some(reconstruct(&came_from, start, goal));
            }
            frontier.push_back(next);
        }
    }
    None
}

/// Convenience wrapper returning only the first step toward `goal`.
pub fn next_step(
    grid: &TileGrid,
    start: Position,
    goal: Position,
    blocked: &HashSet<Position>,
) -> Option<Position> {
    find_path(grid, start, goal, blocked)?.first().copied()
}

fn reconstruct(
    came_from: &HashMap<Position, Position>,
    start: Position,
    goal: Position,
) -> Vec<Position> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match came_from.get(&current) {
            Some(&prev) => current = prev,
            None => break,
        }
        if current != start {
            path.push(current);
        }
    }
    path.reverse();
    path
}
