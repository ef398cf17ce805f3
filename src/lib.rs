//! # Delve
//!
//! The authoritative simulation core for a real-time, multi-room, multiplayer
//! dungeon crawler.
//!
//! ## Architecture Overview
//!
//! One [`GameInstance`] owns the entire world state for a single dungeon room:
//! the tile grid, the room list, the player/monster/item maps, and the ordered
//! event queue. Everything that changes entity position or health funnels
//! through a single resolver (`GameInstance::move_or_attack` and
//! `GameInstance::perform_ranged_attack`), which keeps the simulation
//! deterministic and replayable given a seed and an injected [`Clock`].
//!
//! The layers, leaves first:
//!
//! - **Generation** (`generation`): procedural floor layout and spawn tables
//! - **Vision** (`game::vision`): Bresenham line-of-sight and fog-of-war sets
//! - **Pathfinding** (`game::pathfinding`): budgeted BFS next-step search
//! - **Model** (`game::entities`, `game::items`): players, monsters, items
//! - **Resolver** (`game::combat`): movement, melee, ranged, revive
//! - **AI** (`game::ai`): per-tick monster intents by difficulty tier
//! - **Orchestration** (`game::instance`, `game::registry`): command handlers,
//!   the fixed tick, snapshots, and the per-instance critical section
//!
//! The network transport, client rendering, and persistence are external
//! collaborators; this crate is purely in-memory and never blocks on I/O.

pub mod game;
pub mod generation;

pub use game::*;
pub use generation::*;

// Explicit re-exports for the types external transports interact with.
pub use game::{
    CharacterClass, Clock, Difficulty, Direction, EntityId, Faction, GameEvent, GameInstance,
    InstanceRegistry, Item, ItemId, ItemKind, ManualClock, Monster, Player, Position,
    PotionEffect, ProjectileKind, SoundCue, StateSnapshot, SystemClock, TileGrid, TileType,
};

pub use generation::{DungeonGenerator, MonsterTable, Room};

/// Core error type for the Delve simulation engine.
///
/// Note that invalid *commands* are never errors: a bad move, an out-of-range
/// shot, or an equip without the strength for it simply does nothing (see the
/// resolver docs). `DelveError` covers genuine failures only.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Instance state is invalid
    #[error("Invalid instance state: {0}")]
    InvalidState(String),
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation tunables.
///
/// These are externally supplied parameters as far as the core algorithms are
/// concerned; balancing them is out of scope for the engine itself.
pub mod config {
    /// Default floor width in tiles
    pub const DEFAULT_DUNGEON_WIDTH: u32 = 60;

    /// Default floor height in tiles
    pub const DEFAULT_DUNGEON_HEIGHT: u32 = 40;

    /// Deepest reachable floor
    pub const MAX_DEPTH: u32 = 50;

    /// Every Nth floor hosts a boss and nothing else
    pub const BOSS_FLOOR_INTERVAL: u32 = 5;

    /// Player inventory slot count
    pub const INVENTORY_CAPACITY: usize = 20;

    /// Fog-of-war sight radius in tiles
    pub const VISION_RADIUS: i32 = 8;

    /// Visited-node budget for the BFS pathfinder
    pub const PATHFINDING_BUDGET: usize = 400;

    /// Per-tick chance that an un-throttled monster takes a random step
    pub const ROAM_CHANCE: f64 = 0.05;

    /// Hard-difficulty monsters hunt anything closer than this (Manhattan)
    pub const HARD_HUNT_RANGE: u32 = 20;

    /// Health fraction at or below which a hit player gets a warning cue
    pub const LOW_HEALTH_WARN_FRACTION: f64 = 0.3;

    /// Ticks over which a regen potion restores half of effective max health
    pub const REGEN_TICKS: u32 = 40;

    /// Seconds a dead monster lingers before being reaped from the live map
    pub const CORPSE_GRACE_SECS: f64 = 1.0;
}
