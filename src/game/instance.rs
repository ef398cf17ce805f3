//! # Game Instance
//!
//! One `GameInstance` is one running dungeon shared by a party of players:
//! the current floor, every entity on it, the ground loot, the pending event
//! queue, and the instance's own seeded rng and clock. All mutation funnels
//! through the command methods here and the resolver; transports hold an
//! instance behind a mutex and never touch fields mid-command.
//!
//! Command methods are deliberately inert on invalid input: an unknown id,
//! an out-of-range request, or a command from a downed player does nothing
//! rather than erroring, because commands arrive from untrusted clients and
//! race against the simulation.

use crate::game::vision::visible_tiles;
use crate::generation::spawning::{spawn_items, spawn_monsters};
use crate::{
    config, CharacterClass, Clock, Difficulty, Direction, Dungeon, DungeonGenerator, EntityId,
    EventQueue, GameEvent, Item, ItemId, ItemKind, Monster, Player, Position, PotionEffect, Room,
    TileGrid, TileType,
};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A serializable view of an instance, either complete or fog-filtered for
/// one player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub instance_id: String,
    pub depth: u32,
    pub difficulty: Difficulty,
    pub width: u32,
    pub height: u32,
    pub tiles: Vec<Vec<TileType>>,
    pub players: Vec<Player>,
    pub monsters: Vec<Monster>,
    pub items: Vec<Item>,
    /// Present only in fog-filtered snapshots: the viewer's visible tiles
    pub visible_tiles: Option<Vec<Position>>,
}

/// One running dungeon simulation.
pub struct GameInstance {
    pub id: String,
    pub depth: u32,
    pub difficulty: Difficulty,
    pub floor: Dungeon,
    pub players: HashMap<EntityId, Player>,
    pub mobs: HashMap<EntityId, Monster>,
    pub ground_items: HashMap<ItemId, Item>,
    pub tick_count: u64,
    pub(crate) events: EventQueue,
    pub(crate) rng: StdRng,
    pub(crate) clock: Box<dyn Clock>,
}

impl GameInstance {
    /// Creates an instance, carves floor 1, and populates it.
    pub fn new(id: impl Into<String>, seed: u64, clock: Box<dyn Clock>) -> Self {
        let id = id.into();
        let mut rng = StdRng::seed_from_u64(seed);
        let floor = carve_floor(&mut rng, 1);
        let mut instance = Self {
            id,
            depth: 1,
            difficulty: Difficulty::Normal,
            floor,
            players: HashMap::new(),
            mobs: HashMap::new(),
            ground_items: HashMap::new(),
            tick_count: 0,
            events: EventQueue::new(),
            rng,
            clock,
        };
        instance.populate();
        info!(
            "instance {} created: seed {seed}, {} monsters, {} items",
            instance.id,
            instance.mobs.len(),
            instance.ground_items.len()
        );
        instance
    }

    pub fn grid(&self) -> &TileGrid {
        &self.floor.grid
    }

    pub fn rooms(&self) -> &[Room] {
        &self.floor.rooms
    }

    pub(crate) fn now(&self) -> f64 {
        self.clock.now()
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Spawns a player of the given class at the up stairs.
    pub fn add_player(&mut self, id: EntityId, name: &str, class: CharacterClass) -> &Player {
        let player = Player::new(id, name, self.floor.stairs_up, class);
        info!("player {} ({name}, {class:?}) joined instance {}", id, self.id);
        self.players.entry(id).or_insert(player)
    }

    /// Removes a player; their inventory leaves with them.
    pub fn remove_player(&mut self, id: EntityId) -> Option<Player> {
        let removed = self.players.remove(&id);
        if removed.is_some() {
            info!("player {id} left instance {}", self.id);
        }
        removed
    }

    /// Steps or bump-interacts one tile in the given direction.
    pub fn move_player(&mut self, id: EntityId, direction: Direction) {
        let (dx, dy) = direction.to_delta();
        self.move_or_attack(id, dx, dy);
    }

    /// Equips a weapon or wearable from the player's inventory. Inert when
    /// the player is missing or the item can't be equipped.
    pub fn equip(&mut self, player_id: EntityId, item_id: ItemId) -> bool {
        match self.players.get_mut(&player_id) {
            Some(player) => player.equip(item_id),
            None => false,
        }
    }

    /// Drops an inventory item at the player's feet, unequipping it first
    /// if it was equipped.
    pub fn drop_item(&mut self, player_id: EntityId, item_id: ItemId) -> bool {
        let player = match self.players.get_mut(&player_id) {
            Some(p) => p,
            None => return false,
        };
        let idx = match player.inventory.iter().position(|i| i.id == item_id) {
            Some(idx) => idx,
            None => return false,
        };
        if player.equipped_weapon == Some(item_id) {
            player.equipped_weapon = None;
        }
        if player.equipped_wearable == Some(item_id) {
            player.equipped_wearable = None;
            player.hp = player.hp.min(player.effective_max_hp());
        }
        let mut item = player.inventory.remove(idx);
        item.pos = Some(player.pos);
        debug!("player {player_id} dropped {} at {:?}", item.name, item.pos);
        self.ground_items.insert(item.id, item);
        true
    }

    /// Drinks a potion of regeneration from the player's inventory, starting
    /// a heal-over-time that the tick loop pays out. Other items are inert.
    pub fn use_item(&mut self, player_id: EntityId, item_id: ItemId) -> bool {
        let player = match self.players.get_mut(&player_id) {
            Some(p) if !p.downed => p,
            _ => return false,
        };
        let idx = match player.inventory.iter().position(|i| i.id == item_id) {
            Some(idx) => idx,
            None => return false,
        };
        match &player.inventory[idx].kind {
            ItemKind::Potion {
                effect: PotionEffect::Regen,
            } => {
                player.inventory.remove(idx);
                player.regen_ticks = config::REGEN_TICKS;
                debug!("player {player_id} drank a regen potion");
                true
            }
            _ => false,
        }
    }

    /// Changes the AI difficulty tier for the whole instance.
    pub fn change_difficulty(&mut self, difficulty: Difficulty) {
        info!("instance {}: difficulty -> {difficulty:?}", self.id);
        self.difficulty = difficulty;
    }

    /// Advances the simulation one step: reaps corpses past their grace
    /// period, pays out regeneration, then runs one AI pass.
    pub fn tick(&mut self) {
        let now = self.now();
        self.reap_corpses(now);
        self.regen_pass();
        self.run_ai();
        self.tick_count += 1;
    }

    fn reap_corpses(&mut self, now: f64) {
        self.mobs.retain(|_, m| {
            m.alive
                || m.died_at
                    .map_or(true, |t| now - t < config::CORPSE_GRACE_SECS)
        });
    }

    fn regen_pass(&mut self) {
        for player in self.players.values_mut() {
            if player.downed || player.regen_ticks == 0 {
                continue;
            }
            let per_tick = (player.effective_max_hp() / 2 / config::REGEN_TICKS as i32).max(1);
            player.heal(per_tick);
            player.regen_ticks -= 1;
        }
    }

    /// Regenerates everything at the next depth down. Players land on the
    /// new floor's up stairs. Inert at the bottom floor.
    pub fn next_floor(&mut self) {
        if self.depth >= config::MAX_DEPTH {
            return;
        }
        self.depth += 1;
        self.regenerate_floor(true);
        self.push_event(GameEvent::StairsDown { depth: self.depth });
    }

    /// Regenerates everything at the next depth up. Players land on the new
    /// floor's down stairs. Inert at depth 1.
    pub fn prev_floor(&mut self) {
        if self.depth <= 1 {
            return;
        }
        self.depth -= 1;
        self.regenerate_floor(false);
        self.push_event(GameEvent::StairsUp { depth: self.depth });
    }

    fn regenerate_floor(&mut self, descending: bool) {
        self.floor = carve_floor(&mut self.rng, self.depth);
        self.mobs.clear();
        self.ground_items.clear();
        self.populate();
        let spawn = if descending {
            self.floor.stairs_up
        } else {
            self.floor.stairs_down
        };
        for player in self.players.values_mut() {
            player.pos = spawn;
        }
        info!(
            "instance {}: floor {} ({} monsters, {} items)",
            self.id,
            self.depth,
            self.mobs.len(),
            self.ground_items.len()
        );
    }

    fn populate(&mut self) {
        for mob in spawn_monsters(&self.floor, self.depth, &mut self.rng) {
            self.mobs.insert(mob.id, mob);
        }
        for item in spawn_items(&self.floor, self.depth, &mut self.rng) {
            self.ground_items.insert(item.id, item);
        }
    }

    /// Snapshots the instance. With a viewer, the snapshot is fog-filtered:
    /// players are always included, monsters only when alive and in sight,
    /// ground items only when in sight.
    pub fn get_state(&self, viewer: Option<EntityId>) -> StateSnapshot {
        let mut snapshot = StateSnapshot {
            instance_id: self.id.clone(),
            depth: self.depth,
            difficulty: self.difficulty,
            width: self.floor.grid.width,
            height: self.floor.grid.height,
            tiles: self.floor.grid.rows().to_vec(),
            players: self.players.values().cloned().collect(),
            monsters: self.mobs.values().cloned().collect(),
            items: self.ground_items.values().cloned().collect(),
            visible_tiles: None,
        };
        if let Some(viewer) = viewer.and_then(|id| self.players.get(&id)) {
            let visible = visible_tiles(&self.floor.grid, viewer.pos);
            snapshot
                .monsters
                .retain(|m| m.alive && visible.contains(&m.pos));
            snapshot
                .items
                .retain(|i| i.pos.map_or(false, |p| visible.contains(&p)));
            let mut tiles: Vec<Position> = visible.into_iter().collect();
            tiles.sort_by_key(|p| (p.y, p.x));
            snapshot.visible_tiles = Some(tiles);
        }
        snapshot
    }

    /// Drains pending events in emission order.
    pub fn flush_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }
}

fn carve_floor(rng: &mut StdRng, depth: u32) -> Dungeon {
    let generator = DungeonGenerator::new(
        config::DEFAULT_DUNGEON_WIDTH,
        config::DEFAULT_DUNGEON_HEIGHT,
    );
    generator.generate(
        rng,
        (10 + depth) as usize,
        4,
        8 + (depth / 10) as i32,
    )
}
