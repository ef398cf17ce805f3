//! # Game Module
//!
//! World state management, the entity/item model, and the combat resolver.
//!
//! This module contains the fundamental building blocks of the Delve engine:
//! - Grid coordinates, directions, and entity identifiers
//! - The injectable clock that all cooldown math is measured against
//! - The tile grid, entities, items, and the event queue
//! - The game instance orchestrator and the multi-instance registry

pub mod ai;
pub mod combat;
pub mod entities;
pub mod events;
pub mod instance;
pub mod items;
pub mod pathfinding;
pub mod registry;
pub mod vision;
pub mod world;

pub use entities::*;
pub use events::*;
pub use instance::*;
pub use items::*;
pub use registry::*;
pub use world::*;

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Represents a 2D grid coordinate in a dungeon floor.
///
/// # Examples
///
/// ```
/// use delve::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
/// assert_eq!(pos.manhattan_distance(Position::new(13, 9)), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the origin position (0, 0).
    pub fn origin() -> Self {
        Self::new(0, 0)
    }

    /// Calculates the Manhattan distance to another position.
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Calculates the squared Euclidean distance to another position.
    ///
    /// Vision radius comparisons use this directly, so no square root is
    /// ever taken.
    pub fn distance_squared(self, other: Position) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }

    /// Returns the 4 cardinal adjacent positions.
    pub fn cardinal_adjacent_positions(self) -> [Position; 4] {
        [
            Position::new(self.x, self.y - 1), // N
            Position::new(self.x, self.y + 1), // S
            Position::new(self.x + 1, self.y), // E
            Position::new(self.x - 1, self.y), // W
        ]
    }

    /// Offsets this position by a delta.
    pub fn offset(self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Cardinal movement directions, as sent by player clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Converts a direction to an `(dx, dy)` delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::Direction;
    ///
    /// assert_eq!(Direction::Up.to_delta(), (0, -1));
    /// assert_eq!(Direction::Right.to_delta(), (1, 0));
    /// ```
    pub fn to_delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Converts a delta back to a direction, if it is a unit cardinal step.
    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        match (dx, dy) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }

    /// Returns all 4 cardinal directions.
    pub fn all() -> [Direction; 4] {
        [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ]
    }
}

/// Unique identifier for players and monsters.
pub type EntityId = Uuid;

/// Unique identifier for items.
pub type ItemId = Uuid;

/// Creates a new unique entity ID.
pub fn new_entity_id() -> EntityId {
    Uuid::new_v4()
}

/// Creates a new unique item ID.
pub fn new_item_id() -> ItemId {
    Uuid::new_v4()
}

/// Time source for all cooldown and throttle math.
///
/// Every timestamp an instance stores (`last_attack_at`, `last_moved_at`,
/// `died_at`) is a plain `f64` second count read from this trait, never from a
/// hidden global clock. Production uses [`SystemClock`]; tests drive a
/// [`ManualClock`] to make cooldown behavior exact.
pub trait Clock: Send {
    /// Seconds elapsed on this clock. Monotonic, arbitrary epoch.
    fn now(&self) -> f64;
}

/// Monotonic wall clock measured from its own creation.
#[derive(Debug)]
pub struct SystemClock {
    epoch: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }
}

/// Hand-advanced clock for tests and deterministic replay.
///
/// Clones share the same underlying time, so a test can keep one handle and
/// give another to the instance.
///
/// # Examples
///
/// ```
/// use delve::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// clock.advance(1.5);
/// assert_eq!(handle.now(), 1.5);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    bits: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `dt` seconds.
    pub fn advance(&self, dt: f64) {
        self.set(self.now() + dt);
    }

    /// Sets the clock to an absolute second count.
    pub fn set(&self, seconds: f64) {
        self.bits.store(seconds.to_bits(), Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}
