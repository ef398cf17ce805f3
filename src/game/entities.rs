//! # Entity Model
//!
//! Players and monsters, plus the faction/class/difficulty tags that drive
//! combat and AI decisions.
//!
//! The two entity variants are deliberately separate structs dispatched by
//! exhaustive matching in the resolver. The one asymmetry that matters: a
//! monster at 0 hp is dead (`alive = false`), while a player at 0 hp is
//! *downed* — still alive, still occupying a tile, revivable by an ally.

use crate::{config, EntityId, Item, ItemId, ItemKind, PotionEffect, Position};
use serde::{Deserialize, Serialize};

/// Coarse allegiance tag gating who may damage whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    Player,
    Dungeon,
}

/// Room-wide AI difficulty tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    /// The base movement throttle for monsters at this tier, in seconds.
    /// Divided by each monster's speed multiplier.
    pub fn base_ai_cooldown(self) -> f64 {
        match self {
            Difficulty::Easy => 1.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 0.8,
        }
    }
}

/// Player character class, fixing base stats and the starting weapon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterClass {
    Warrior,
    Rogue,
    Huntress,
    Mage,
}

impl CharacterClass {
    /// `(max_hp, attack, defense, evasion, strength)` for a fresh level-1
    /// character of this class.
    pub fn base_stats(self) -> (i32, i32, i32, f64, i32) {
        match self {
            CharacterClass::Warrior => (25, 4, 1, 0.05, 12),
            CharacterClass::Rogue => (18, 3, 0, 0.15, 10),
            CharacterClass::Huntress => (18, 3, 0, 0.10, 10),
            CharacterClass::Mage => (16, 2, 0, 0.05, 9),
        }
    }

    /// The weapon every member of this class starts with, already equipped.
    pub fn starting_weapon(self) -> Item {
        use crate::ProjectileKind;
        match self {
            CharacterClass::Warrior => Item::weapon("Shortsword", 3, 1, 10, 3.0),
            CharacterClass::Rogue => Item::weapon("Dagger", 2, 1, 9, 1.5),
            CharacterClass::Huntress => {
                Item::ranged_weapon("Bow", 3, 6, 10, 2.0, ProjectileKind::Arrow)
            }
            CharacterClass::Mage => {
                Item::ranged_weapon("Staff", 2, 5, 9, 2.0, ProjectileKind::Magic)
            }
        }
    }
}

/// Timestamp for "has never happened". Far enough in the past to clear any
/// cooldown, but finite so it survives JSON serialization.
pub const NEVER: f64 = -1.0e9;

/// AI bookkeeping tag on monsters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiState {
    Idle,
    Hunting,
}

/// Whether a monster is rank-and-file or a floor boss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonsterKind {
    Normal,
    Boss,
}

/// A player character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    pub name: String,
    pub pos: Position,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    /// Probability an incoming hit misses this player
    pub evasion: f64,
    pub speed: f64,
    pub faction: Faction,
    pub alive: bool,
    /// Seconds (on the instance clock) of the last attack, melee or ranged
    pub last_attack_at: f64,
    /// Attack interval when no weapon cooldown applies
    pub base_attack_cooldown: f64,
    pub experience: u32,
    pub level: u32,
    pub strength: i32,
    pub class: CharacterClass,
    pub inventory: Vec<Item>,
    pub equipped_weapon: Option<ItemId>,
    pub equipped_wearable: Option<ItemId>,
    /// Remaining regeneration ticks from a drunk regen potion
    pub regen_ticks: u32,
    /// Down-but-not-out: 0 hp, still present, revivable
    pub downed: bool,
}

impl Player {
    /// Creates a level-1 player of the given class with its starting weapon
    /// equipped.
    pub fn new(id: EntityId, name: &str, pos: Position, class: CharacterClass) -> Self {
        let (max_hp, attack, defense, evasion, strength) = class.base_stats();
        let weapon = class.starting_weapon();
        let weapon_id = weapon.id;
        Self {
            id,
            name: name.to_string(),
            pos,
            hp: max_hp,
            max_hp,
            attack,
            defense,
            evasion,
            speed: 1.0,
            faction: Faction::Player,
            alive: true,
            last_attack_at: NEVER,
            base_attack_cooldown: 1.0,
            experience: 0,
            level: 1,
            strength,
            class,
            inventory: vec![weapon],
            equipped_weapon: Some(weapon_id),
            equipped_wearable: None,
            regen_ticks: 0,
            downed: false,
        }
    }

    /// Resolves the equipped weapon id against the inventory.
    pub fn equipped_weapon_item(&self) -> Option<&Item> {
        let id = self.equipped_weapon?;
        self.inventory.iter().find(|i| i.id == id)
    }

    /// Resolves the equipped wearable id against the inventory.
    pub fn equipped_wearable_item(&self) -> Option<&Item> {
        let id = self.equipped_wearable?;
        self.inventory.iter().find(|i| i.id == id)
    }

    /// Base attack plus the equipped weapon's damage.
    pub fn effective_attack(&self) -> i32 {
        let bonus = self
            .equipped_weapon_item()
            .and_then(Item::damage)
            .unwrap_or(0);
        self.attack + bonus
    }

    /// Base max health plus the equipped wearable's boost.
    pub fn effective_max_hp(&self) -> i32 {
        let bonus = match self.equipped_wearable_item().map(|i| &i.kind) {
            Some(ItemKind::Wearable { health_boost, .. }) => *health_boost,
            _ => 0,
        };
        self.max_hp + bonus
    }

    /// The attack interval enforced for this player: the equipped weapon's
    /// cooldown when one is held, else the base cooldown.
    pub fn effective_cooldown(&self) -> f64 {
        match self.equipped_weapon_item().map(|i| &i.kind) {
            Some(ItemKind::Weapon { attack_cooldown, .. }) => *attack_cooldown,
            _ => self.base_attack_cooldown,
        }
    }

    /// Adds an item to the inventory, handing it back when all
    /// [`config::INVENTORY_CAPACITY`] slots are taken.
    pub fn add_to_inventory(&mut self, item: Item) -> Result<(), Item> {
        if self.inventory.len() < config::INVENTORY_CAPACITY {
            self.inventory.push(item);
            Ok(())
        } else {
            Err(item)
        }
    }

    /// Equips a weapon or wearable from the inventory.
    ///
    /// Fails (returning `false`, changing nothing) when the item is missing,
    /// is not equippable, or its strength requirement exceeds the player's
    /// strength. Equipping a wearable clamps current health to the new
    /// effective maximum.
    pub fn equip(&mut self, item_id: ItemId) -> bool {
        let item = match self.inventory.iter().find(|i| i.id == item_id) {
            Some(i) => i,
            None => return false,
        };
        match &item.kind {
            ItemKind::Weapon { strength_requirement, .. } => {
                if self.strength < *strength_requirement {
                    return false;
                }
                self.equipped_weapon = Some(item_id);
                true
            }
            ItemKind::Wearable { strength_requirement, .. } => {
                if self.strength < *strength_requirement {
                    return false;
                }
                self.equipped_wearable = Some(item_id);
                self.hp = self.hp.min(self.effective_max_hp());
                self.assert_health_invariant();
                true
            }
            ItemKind::Potion { .. } | ItemKind::Throwable { .. } => false,
        }
    }

    /// Applies incoming attack power, returning the damage actually dealt.
    ///
    /// At 0 hp the player becomes downed rather than dead.
    pub fn take_damage(&mut self, attack_power: i32) -> i32 {
        let dmg = (attack_power - self.defense).max(0);
        self.hp -= dmg;
        if self.hp <= 0 {
            self.hp = 0;
            self.downed = true;
        }
        self.assert_health_invariant();
        dmg
    }

    /// Heals up to the effective maximum.
    pub fn heal(&mut self, amount: i32) {
        self.hp = (self.hp + amount).min(self.effective_max_hp());
        self.assert_health_invariant();
    }

    /// Whether the inventory holds a revive potion.
    pub fn has_revive_potion(&self) -> bool {
        self.inventory.iter().any(|i| i.is_potion(PotionEffect::Revive))
    }

    /// Removes one revive potion from the inventory, if present.
    pub fn consume_revive_potion(&mut self) -> bool {
        match self
            .inventory
            .iter()
            .position(|i| i.is_potion(PotionEffect::Revive))
        {
            Some(idx) => {
                self.inventory.remove(idx);
                true
            }
            None => false,
        }
    }

    pub(crate) fn assert_health_invariant(&self) {
        debug_assert!(
            self.hp >= 0 && self.hp <= self.effective_max_hp(),
            "player {} hp {} outside [0, {}]",
            self.id,
            self.hp,
            self.effective_max_hp()
        );
    }
}

/// A dungeon monster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Monster {
    pub id: EntityId,
    pub name: String,
    pub pos: Position,
    pub hp: i32,
    pub max_hp: i32,
    pub attack: i32,
    pub defense: i32,
    pub evasion: f64,
    /// Divides the AI movement throttle; faster monsters act more often
    pub speed: f64,
    pub faction: Faction,
    pub alive: bool,
    pub last_attack_at: f64,
    pub base_attack_cooldown: f64,
    pub kind: MonsterKind,
    pub ai_state: AiState,
    /// Non-owning id of the current hunt target; stale ids resolve to nothing
    pub target_id: Option<EntityId>,
    /// Movement-throttle timestamp, independent of the attack cooldown
    pub last_moved_at: f64,
    /// Set at death; drives the corpse grace period before reaping
    pub died_at: Option<f64>,
}

impl Monster {
    /// Creates a live monster with the given combat stats.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: EntityId,
        name: &str,
        pos: Position,
        hp: i32,
        attack: i32,
        defense: i32,
        evasion: f64,
        speed: f64,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            pos,
            hp,
            max_hp: hp,
            attack,
            defense,
            evasion,
            speed,
            faction: Faction::Dungeon,
            alive: true,
            last_attack_at: NEVER,
            base_attack_cooldown: 1.0,
            kind: MonsterKind::Normal,
            ai_state: AiState::Idle,
            target_id: None,
            last_moved_at: NEVER,
            died_at: None,
        }
    }

    /// Marks this monster as a floor boss.
    pub fn boss(mut self) -> Self {
        self.kind = MonsterKind::Boss;
        self
    }

    /// Applies incoming attack power, returning the damage actually dealt.
    /// A monster reduced to 0 hp dies.
    pub fn take_damage(&mut self, attack_power: i32) -> i32 {
        let dmg = (attack_power - self.defense).max(0);
        self.hp -= dmg;
        if self.hp <= 0 {
            self.hp = 0;
            self.alive = false;
        }
        debug_assert!(
            self.hp >= 0 && self.hp <= self.max_hp,
            "monster {} hp {} outside [0, {}]",
            self.id,
            self.hp,
            self.max_hp
        );
        dmg
    }
}
