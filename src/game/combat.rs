//! # Combat & Movement Resolver
//!
//! Every attempt by any entity to occupy an adjacent tile funnels through
//! [`GameInstance::move_or_attack`]: bumping an enemy is an attack, bumping
//! a downed ally with a revive potion is a revive, and stepping onto a free
//! tile moves (with pickup and stair handling for players). Ranged attacks
//! share the per-entity attack cooldown and go through
//! [`GameInstance::perform_ranged_attack`].
//!
//! All validation failures are inert: the caller gets no event and no state
//! changes.

use crate::game::vision::has_line_of_sight;
use crate::{
    config, EntityId, GameEvent, GameInstance, ItemId, ItemKind, Player, Position, ProjectileKind,
    SoundCue, TileType,
};
use log::{debug, trace};
use rand::Rng;

/// What the mover found on the destination tile.
enum Occupant {
    Nobody,
    Player(EntityId),
    Monster(EntityId),
}

impl GameInstance {
    /// Resolves one step of intent for the entity: attack, revive, move, or
    /// nothing. `dx`/`dy` is a unit cardinal delta.
    pub fn move_or_attack(&mut self, entity_id: EntityId, dx: i32, dy: i32) {
        let (from, is_player) = match self.actor_origin(entity_id) {
            Some(v) => v,
            None => return,
        };
        let dest = from.offset(dx, dy);
        if !self.floor.grid.in_bounds(dest) {
            return;
        }

        match self.occupant_at(dest, entity_id) {
            Occupant::Player(target_id) => {
                if is_player {
                    if !self.try_revive(entity_id, target_id) {
                        trace!("ally bump: {entity_id} into {target_id}");
                    }
                } else {
                    // monsters ignore downed players; they no longer fight back
                    let downed = self.players.get(&target_id).map_or(true, |p| p.downed);
                    if !downed {
                        self.attack_player(entity_id, target_id);
                    }
                }
            }
            Occupant::Monster(target_id) => {
                if is_player {
                    self.attack_monster(entity_id, target_id);
                }
                // monster-on-monster bumps are inert
            }
            Occupant::Nobody => self.try_move(entity_id, is_player, from, dest),
        }
    }

    /// Fires the item at a target tile. `item_id` may name the equipped
    /// ranged weapon or any ranged-capable inventory item.
    ///
    /// Returns `None` on any validation failure (nothing changes), or
    /// `Some(damage)` once the shot is loosed; a shot into empty space or an
    /// evaded shot is a successful zero.
    pub fn perform_ranged_attack(
        &mut self,
        player_id: EntityId,
        item_id: ItemId,
        target: Position,
    ) -> Option<i32> {
        let now = self.now();
        let (from, projectile, raw_damage, consumable) = {
            let player = match self.players.get(&player_id) {
                Some(p) if !p.downed => p,
                _ => return None,
            };
            let item = player.inventory.iter().find(|i| i.id == item_id)?;
            let range = item.range().filter(|_| item.is_ranged())?;
            if player.pos.manhattan_distance(target) > range {
                return None;
            }
            if now - player.last_attack_at < player.effective_cooldown() {
                return None;
            }
            let equipped = player.equipped_weapon == Some(item_id);
            let damage = if equipped {
                player.effective_attack()
            } else {
                item.damage().unwrap_or(0) + player.strength / 2
            };
            let consumable = matches!(item.kind, ItemKind::Throwable { consumable: true, .. });
            (player.pos, item.projectile(), damage, consumable)
        };
        if !has_line_of_sight(&self.floor.grid, from, target) {
            return None;
        }

        if let Some(player) = self.players.get_mut(&player_id) {
            player.last_attack_at = now;
            if consumable {
                player.inventory.retain(|i| i.id != item_id);
            }
        }
        let projectile_name = match projectile {
            Some(ProjectileKind::Arrow) => "ARROW",
            Some(ProjectileKind::Magic) => "MAGIC",
            None => "THROWN",
        };
        self.push_event(GameEvent::RangedAttack {
            attacker_id: player_id,
            from,
            to: target,
            projectile: projectile_name.to_string(),
        });

        let target_id = match self.occupant_at(target, player_id) {
            Occupant::Monster(id) => id,
            _ => return Some(0),
        };
        let evasion = self.mobs.get(&target_id).map_or(0.0, |m| m.evasion);
        if self.rng.gen_bool(evasion) {
            self.push_event(GameEvent::Miss {
                attacker_id: player_id,
                target_id,
            });
            return Some(0);
        }
        self.push_event(GameEvent::Attack {
            attacker_id: player_id,
            target_id,
        });
        let cue = match projectile {
            Some(ProjectileKind::Arrow) => SoundCue::HitArrow,
            Some(ProjectileKind::Magic) => SoundCue::HitMagic,
            None => SoundCue::HitBody,
        };
        Some(self.damage_monster(target_id, raw_damage, cue, now))
    }

    fn actor_origin(&self, entity_id: EntityId) -> Option<(Position, bool)> {
        if let Some(player) = self.players.get(&entity_id) {
            return (!player.downed).then_some((player.pos, true));
        }
        let mob = self.mobs.get(&entity_id)?;
        mob.alive.then_some((mob.pos, false))
    }

    /// The living entity on `pos`, excluding the actor itself. Corpses do
    /// not occupy their tile.
    fn occupant_at(&self, pos: Position, actor: EntityId) -> Occupant {
        if let Some(p) = self
            .players
            .values()
            .find(|p| p.id != actor && p.pos == pos)
        {
            return Occupant::Player(p.id);
        }
        if let Some(m) = self
            .mobs
            .values()
            .find(|m| m.id != actor && m.alive && m.pos == pos)
        {
            return Occupant::Monster(m.id);
        }
        Occupant::Nobody
    }

    /// Revives a downed ally with a revive potion from the actor's pack.
    fn try_revive(&mut self, actor_id: EntityId, target_id: EntityId) -> bool {
        let target_downed = self.players.get(&target_id).map_or(false, |p| p.downed);
        if !target_downed {
            return false;
        }
        let consumed = self
            .players
            .get_mut(&actor_id)
            .map_or(false, Player::consume_revive_potion);
        if !consumed {
            return false;
        }
        let hp = match self.players.get_mut(&target_id) {
            Some(target) => {
                target.downed = false;
                target.hp = target.effective_max_hp() / 2;
                target.assert_health_invariant();
                target.hp
            }
            None => return false,
        };
        debug!("player {target_id} revived by {actor_id} at {hp} hp");
        self.push_event(GameEvent::Revive {
            entity_id: target_id,
            by: actor_id,
            hp,
        });
        true
    }

    fn attack_monster(&mut self, attacker_id: EntityId, target_id: EntityId) {
        let now = self.now();
        let attack = {
            let attacker = match self.players.get(&attacker_id) {
                Some(p) => p,
                None => return,
            };
            if now - attacker.last_attack_at < attacker.effective_cooldown() {
                return;
            }
            attacker.effective_attack()
        };
        if let Some(attacker) = self.players.get_mut(&attacker_id) {
            attacker.last_attack_at = now;
        }
        let evasion = self.mobs.get(&target_id).map_or(0.0, |m| m.evasion);
        if self.rng.gen_bool(evasion) {
            self.push_event(GameEvent::Miss {
                attacker_id,
                target_id,
            });
            return;
        }
        self.push_event(GameEvent::Attack {
            attacker_id,
            target_id,
        });
        self.damage_monster(target_id, attack, SoundCue::HitSlash, now);
    }

    fn attack_player(&mut self, attacker_id: EntityId, target_id: EntityId) {
        let now = self.now();
        let attack = {
            let attacker = match self.mobs.get(&attacker_id) {
                Some(m) => m,
                None => return,
            };
            if now - attacker.last_attack_at < attacker.base_attack_cooldown {
                return;
            }
            attacker.attack
        };
        if let Some(attacker) = self.mobs.get_mut(&attacker_id) {
            attacker.last_attack_at = now;
        }
        let evasion = self.players.get(&target_id).map_or(0.0, |p| p.evasion);
        if self.rng.gen_bool(evasion) {
            self.push_event(GameEvent::Miss {
                attacker_id,
                target_id,
            });
            return;
        }
        self.push_event(GameEvent::Attack {
            attacker_id,
            target_id,
        });

        let (dealt, hp, warn, downed) = match self.players.get_mut(&target_id) {
            Some(target) => {
                let dealt = target.take_damage(attack);
                let warn_at =
                    (f64::from(target.effective_max_hp()) * config::LOW_HEALTH_WARN_FRACTION).ceil();
                (
                    dealt,
                    target.hp,
                    f64::from(target.hp) <= warn_at,
                    target.downed,
                )
            }
            None => return,
        };
        if dealt > 0 {
            self.push_event(GameEvent::Damage {
                target_id,
                amount: dealt,
                hp_remaining: hp,
            });
            self.push_event(GameEvent::PlaySound {
                sound: SoundCue::HitBody,
            });
        }
        if downed {
            debug!("player {target_id} downed by {attacker_id}");
            self.push_event(GameEvent::Death {
                entity_id: target_id,
            });
        } else if warn && dealt > 0 {
            self.push_event(GameEvent::PlaySound {
                sound: SoundCue::HealthWarn,
            });
        }
    }

    /// Applies damage to a monster and emits the trailing events. Returns
    /// the damage dealt.
    fn damage_monster(&mut self, target_id: EntityId, attack: i32, cue: SoundCue, now: f64) -> i32 {
        let (dealt, hp, died) = match self.mobs.get_mut(&target_id) {
            Some(target) => {
                let dealt = target.take_damage(attack);
                if !target.alive && target.died_at.is_none() {
                    target.died_at = Some(now);
                }
                (dealt, target.hp, !target.alive)
            }
            None => return 0,
        };
        if dealt > 0 {
            self.push_event(GameEvent::Damage {
                target_id,
                amount: dealt,
                hp_remaining: hp,
            });
            self.push_event(GameEvent::PlaySound { sound: cue });
        }
        if died {
            debug!("monster {target_id} slain");
            self.push_event(GameEvent::Death {
                entity_id: target_id,
            });
        }
        dealt
    }

    fn try_move(&mut self, entity_id: EntityId, is_player: bool, from: Position, dest: Position) {
        if !self.floor.grid.is_walkable(dest) {
            return;
        }
        if !is_player {
            // monsters never set foot in a safe room
            if self.floor.in_safe_room(dest) {
                return;
            }
            if let Some(mob) = self.mobs.get_mut(&entity_id) {
                mob.pos = dest;
            }
            return;
        }

        if let Some(player) = self.players.get_mut(&entity_id) {
            player.pos = dest;
        }
        self.push_event(GameEvent::Move {
            entity_id,
            from,
            to: dest,
        });
        self.pick_up_at(entity_id, dest);

        match self.floor.grid.get(dest) {
            Some(TileType::StairsDown) => self.next_floor(),
            Some(TileType::StairsUp) => self.prev_floor(),
            _ => {}
        }
    }

    /// Pockets every ground item on the tile that still fits the inventory;
    /// what doesn't fit stays on the ground.
    fn pick_up_at(&mut self, player_id: EntityId, pos: Position) {
        let here: Vec<ItemId> = self
            .ground_items
            .values()
            .filter(|i| i.pos == Some(pos))
            .map(|i| i.id)
            .collect();
        for item_id in here {
            let mut item = match self.ground_items.remove(&item_id) {
                Some(i) => i,
                None => continue,
            };
            item.pos = None;
            let name = item.name.clone();
            match self.players.get_mut(&player_id) {
                Some(player) => match player.add_to_inventory(item) {
                    Ok(()) => {
                        trace!("player {player_id} picked up {name}");
                        self.push_event(GameEvent::Pickup {
                            entity_id: player_id,
                            item_id,
                            item_name: name,
                        });
                    }
                    Err(mut rejected) => {
                        rejected.pos = Some(pos);
                        self.ground_items.insert(item_id, rejected);
                    }
                },
                None => {
                    item.pos = Some(pos);
                    self.ground_items.insert(item_id, item);
                }
            }
        }
    }
}
