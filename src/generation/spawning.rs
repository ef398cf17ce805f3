//! # Floor Population
//!
//! Depth-banded monster table and loot rolls. Deeper floors unlock nastier
//! monsters and spawn more of them; every fifth floor spawns only the boss.
//! Safe rooms (the stair rooms) never receive spawns.

use crate::{config, new_entity_id, Dungeon, Item, Monster, Position, PotionEffect};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// One monster archetype: unlocked at `min_depth`, stats in the order
/// `(hp, attack, defense, evasion, speed)`.
struct MonsterRow {
    name: &'static str,
    min_depth: u32,
    hp: i32,
    attack: i32,
    defense: i32,
    evasion: f64,
    speed: f64,
}

const MONSTER_ROWS: &[MonsterRow] = &[
    MonsterRow { name: "Marsupial Rat", min_depth: 1, hp: 8, attack: 2, defense: 0, evasion: 0.05, speed: 1.0 },
    MonsterRow { name: "Sewer Snake", min_depth: 1, hp: 10, attack: 3, defense: 0, evasion: 0.10, speed: 1.2 },
    MonsterRow { name: "Albino Rat", min_depth: 3, hp: 12, attack: 3, defense: 1, evasion: 0.05, speed: 1.1 },
    MonsterRow { name: "Gnoll Scout", min_depth: 3, hp: 14, attack: 4, defense: 1, evasion: 0.10, speed: 1.0 },
    MonsterRow { name: "Sewer Crab", min_depth: 3, hp: 16, attack: 5, defense: 3, evasion: 0.0, speed: 0.8 },
    MonsterRow { name: "Skeleton", min_depth: 6, hp: 20, attack: 6, defense: 2, evasion: 0.05, speed: 1.0 },
    MonsterRow { name: "Gnoll Brute", min_depth: 8, hp: 26, attack: 8, defense: 3, evasion: 0.05, speed: 0.9 },
];

/// Depth-banded spawn table.
pub struct MonsterTable;

impl MonsterTable {
    /// Archetype names available at the given depth.
    pub fn available_at(depth: u32) -> Vec<&'static str> {
        MONSTER_ROWS
            .iter()
            .filter(|r| r.min_depth <= depth)
            .map(|r| r.name)
            .collect()
    }

    /// How many regular monsters a floor at this depth holds.
    pub fn population(depth: u32) -> usize {
        (5 + 2 * depth) as usize
    }

    /// Rolls one monster from the bands unlocked at `depth`, with hp and
    /// attack scaled up on deeper floors.
    fn roll(depth: u32, pos: Position, rng: &mut StdRng) -> Monster {
        let unlocked: Vec<&MonsterRow> = MONSTER_ROWS
            .iter()
            .filter(|r| r.min_depth <= depth)
            .collect();
        // depth 1 always unlocks at least two rows
        let row = unlocked[rng.gen_range(0..unlocked.len())];
        let depth_bonus = depth.saturating_sub(1) as i32;
        Monster::new(
            new_entity_id(),
            row.name,
            pos,
            row.hp + 2 * depth_bonus,
            row.attack + depth_bonus / 3,
            row.defense,
            row.evasion,
            row.speed,
        )
    }

    /// The floor boss, scaled to depth.
    pub fn boss(depth: u32, pos: Position) -> Monster {
        Monster::new(
            new_entity_id(),
            "Goo",
            pos,
            100 + 20 * depth as i32,
            10 + depth as i32,
            5 + depth as i32,
            0.0,
            0.7,
        )
        .boss()
    }
}

/// Populates a carved floor with monsters.
///
/// Boss floors get exactly one monster, the boss, somewhere outside the
/// safe rooms. Regular floors get [`MonsterTable::population`] monsters on
/// distinct walkable tiles outside the safe rooms.
pub fn spawn_monsters(dungeon: &Dungeon, depth: u32, rng: &mut StdRng) -> Vec<Monster> {
    let mut candidates = spawnable_tiles(dungeon);
    candidates.shuffle(rng);

    if depth % config::BOSS_FLOOR_INTERVAL == 0 {
        let lair = candidates.first().copied().unwrap_or(dungeon.stairs_down);
        return vec![MonsterTable::boss(depth, lair)];
    }

    candidates
        .into_iter()
        .take(MonsterTable::population(depth))
        .map(|pos| MonsterTable::roll(depth, pos, rng))
        .collect()
}

/// Scatters loot on the floor: `3 + rand(0..=2)` items on distinct walkable
/// tiles outside the safe rooms. Boss floors carry no loot.
pub fn spawn_items(dungeon: &Dungeon, depth: u32, rng: &mut StdRng) -> Vec<Item> {
    if depth % config::BOSS_FLOOR_INTERVAL == 0 {
        return Vec::new();
    }

    let mut candidates = spawnable_tiles(dungeon);
    candidates.shuffle(rng);
    let count = 3 + rng.gen_range(0..=2);
    candidates
        .into_iter()
        .take(count)
        .map(|pos| roll_item(rng).at(pos))
        .collect()
}

fn spawnable_tiles(dungeon: &Dungeon) -> Vec<Position> {
    dungeon
        .grid
        .floor_positions()
        .into_iter()
        .filter(|p| !dungeon.in_safe_room(*p))
        .collect()
}

fn roll_item(rng: &mut StdRng) -> Item {
    match rng.gen_range(0..100) {
        0..=29 => Item::potion("Potion of Healing", PotionEffect::Regen),
        30..=39 => Item::potion("Ankh", PotionEffect::Revive),
        40..=54 => Item::weapon("Mace", 4, 1, 11, 2.2),
        55..=64 => Item::weapon("Longsword", 5, 1, 13, 2.8),
        65..=79 => Item::wearable("Leather Armor", 9, 5),
        80..=89 => Item::wearable("Chain Mail", 12, 10),
        _ => Item::throwable("Throwing Knife", 2, 4, true),
    }
}
