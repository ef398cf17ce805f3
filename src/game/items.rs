//! # Item Model
//!
//! Weapons, wearables, potions, and throwables.
//!
//! Items are a closed tagged-variant type; the resolver dispatches on
//! [`ItemKind`] with exhaustive matching rather than any runtime type
//! inspection. An item either lies on the ground (`pos` is `Some`) or sits in
//! exactly one inventory (`pos` is `None`) — never both.

use crate::{new_item_id, ItemId, Position};
use serde::{Deserialize, Serialize};

/// What an item launches when used at range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectileKind {
    Arrow,
    Magic,
}

/// What drinking a potion does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotionEffect {
    /// Restores half of effective max health over a fixed number of ticks
    Regen,
    /// Brings a downed ally back up; consumed by bumping into them
    Revive,
}

/// Kind-specific item payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    Weapon {
        damage: i32,
        range: u32,
        strength_requirement: i32,
        attack_cooldown: f64,
        /// `Some` marks a ranged weapon (bow, staff)
        projectile: Option<ProjectileKind>,
    },
    Wearable {
        strength_requirement: i32,
        health_boost: i32,
        enchantment: Option<String>,
    },
    Potion {
        effect: PotionEffect,
    },
    Throwable {
        damage: i32,
        range: u32,
        /// Single-use on throw
        consumable: bool,
    },
}

/// A single item instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    /// Present only while lying on the ground
    pub pos: Option<Position>,
    #[serde(flatten)]
    pub kind: ItemKind,
}

impl Item {
    /// Creates a melee weapon.
    pub fn weapon(
        name: &str,
        damage: i32,
        range: u32,
        strength_requirement: i32,
        attack_cooldown: f64,
    ) -> Self {
        Self {
            id: new_item_id(),
            name: name.to_string(),
            pos: None,
            kind: ItemKind::Weapon {
                damage,
                range,
                strength_requirement,
                attack_cooldown,
                projectile: None,
            },
        }
    }

    /// Creates a ranged weapon firing the given projectile.
    pub fn ranged_weapon(
        name: &str,
        damage: i32,
        range: u32,
        strength_requirement: i32,
        attack_cooldown: f64,
        projectile: ProjectileKind,
    ) -> Self {
        Self {
            id: new_item_id(),
            name: name.to_string(),
            pos: None,
            kind: ItemKind::Weapon {
                damage,
                range,
                strength_requirement,
                attack_cooldown,
                projectile: Some(projectile),
            },
        }
    }

    /// Creates a wearable.
    pub fn wearable(name: &str, strength_requirement: i32, health_boost: i32) -> Self {
        Self {
            id: new_item_id(),
            name: name.to_string(),
            pos: None,
            kind: ItemKind::Wearable {
                strength_requirement,
                health_boost,
                enchantment: None,
            },
        }
    }

    /// Creates a potion.
    pub fn potion(name: &str, effect: PotionEffect) -> Self {
        Self {
            id: new_item_id(),
            name: name.to_string(),
            pos: None,
            kind: ItemKind::Potion { effect },
        }
    }

    /// Creates a throwable.
    pub fn throwable(name: &str, damage: i32, range: u32, consumable: bool) -> Self {
        Self {
            id: new_item_id(),
            name: name.to_string(),
            pos: None,
            kind: ItemKind::Throwable { damage, range, consumable },
        }
    }

    /// Places this item on the ground at `pos`.
    pub fn at(mut self, pos: Position) -> Self {
        self.pos = Some(pos);
        self
    }

    /// Whether this item can be used for a ranged attack.
    pub fn is_ranged(&self) -> bool {
        match &self.kind {
            ItemKind::Weapon { projectile, .. } => projectile.is_some(),
            ItemKind::Throwable { .. } => true,
            ItemKind::Wearable { .. } | ItemKind::Potion { .. } => false,
        }
    }

    /// Attack range in tiles, for weapons and throwables.
    pub fn range(&self) -> Option<u32> {
        match &self.kind {
            ItemKind::Weapon { range, .. } => Some(*range),
            ItemKind::Throwable { range, .. } => Some(*range),
            ItemKind::Wearable { .. } | ItemKind::Potion { .. } => None,
        }
    }

    /// Base damage contribution, for weapons and throwables.
    pub fn damage(&self) -> Option<i32> {
        match &self.kind {
            ItemKind::Weapon { damage, .. } => Some(*damage),
            ItemKind::Throwable { damage, .. } => Some(*damage),
            ItemKind::Wearable { .. } | ItemKind::Potion { .. } => None,
        }
    }

    /// Projectile kind for ranged weapons; `None` for everything else.
    pub fn projectile(&self) -> Option<ProjectileKind> {
        match &self.kind {
            ItemKind::Weapon { projectile, .. } => *projectile,
            _ => None,
        }
    }

    /// Whether this is a potion with the given effect.
    pub fn is_potion(&self, wanted: PotionEffect) -> bool {
        matches!(&self.kind, ItemKind::Potion { effect } if *effect == wanted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_melee_weapon_is_not_ranged() {
        let sword = Item::weapon("Shortsword", 3, 1, 10, 3.0);
        assert!(!sword.is_ranged());
        assert_eq!(sword.range(), Some(1));
        assert_eq!(sword.damage(), Some(3));
        assert_eq!(sword.projectile(), None);
    }

    #[test]
    fn test_ranged_capability() {
        let bow = Item::ranged_weapon("Bow", 3, 6, 10, 2.0, ProjectileKind::Arrow);
        assert!(bow.is_ranged());
        assert_eq!(bow.projectile(), Some(ProjectileKind::Arrow));

        let knife = Item::throwable("Throwing Knife", 3, 5, true);
        assert!(knife.is_ranged());
        assert_eq!(knife.range(), Some(5));

        let armor = Item::wearable("Cloth Armor", 8, 5);
        assert!(!armor.is_ranged());
        assert_eq!(armor.range(), None);
    }

    #[test]
    fn test_potion_effect_check() {
        let regen = Item::potion("Potion of Healing", PotionEffect::Regen);
        let revive = Item::potion("Ankh", PotionEffect::Revive);
        assert!(regen.is_potion(PotionEffect::Regen));
        assert!(!regen.is_potion(PotionEffect::Revive));
        assert!(revive.is_potion(PotionEffect::Revive));
    }

    #[test]
    fn test_ground_placement() {
        let item = Item::weapon("Dagger", 2, 1, 9, 1.5).at(Position::new(4, 7));
        assert_eq!(item.pos, Some(Position::new(4, 7)));
    }

    #[test]
    fn test_item_serialization_keeps_kind_fields() {
        let sword = Item::weapon("Sword", 10, 1, 5, 3.0);
        let json = serde_json::to_value(&sword).expect("serialize");
        assert_eq!(json["kind"], "weapon");
        assert_eq!(json["damage"], 10);
        assert_eq!(json["name"], "Sword");
    }
}
