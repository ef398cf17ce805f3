//! # Simulation Events
//!
//! Everything observable that happens in an instance is recorded as a
//! [`GameEvent`] on an ordered queue. Consumers drain the queue with
//! [`GameInstance::flush_events`](crate::GameInstance::flush_events) and
//! broadcast the batch to connected clients.
//!
//! Events serialize as `{"type": "...", "data": {...}}` envelopes so clients
//! can dispatch on the tag without knowing every payload shape.

use crate::{EntityId, ItemId, Position};
use serde::{Deserialize, Serialize};

/// Client-side audio cue attached to [`GameEvent::PlaySound`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SoundCue {
    /// Melee weapon connected
    HitSlash,
    /// Arrow projectile connected
    HitArrow,
    /// Magic projectile connected
    HitMagic,
    /// Unarmed or thrown-object hit
    HitBody,
    /// A player's health dropped below the warning threshold
    HealthWarn,
}

/// One observable occurrence inside a game instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEvent {
    /// An entity stepped to a new tile.
    Move {
        entity_id: EntityId,
        from: Position,
        to: Position,
    },
    /// An attack was attempted (melee bump or resolved ranged shot).
    Attack {
        attacker_id: EntityId,
        target_id: EntityId,
    },
    /// Damage landed on the target.
    Damage {
        target_id: EntityId,
        amount: i32,
        hp_remaining: i32,
    },
    /// The target evaded the attack.
    Miss {
        attacker_id: EntityId,
        target_id: EntityId,
    },
    /// A monster died, or a player was downed.
    Death { entity_id: EntityId },
    /// A downed player was brought back by an ally.
    Revive {
        entity_id: EntityId,
        by: EntityId,
        hp: i32,
    },
    /// A player walked over an item and pocketed it.
    Pickup {
        entity_id: EntityId,
        item_id: ItemId,
        item_name: String,
    },
    /// A projectile was loosed; emitted for hits and misses alike.
    RangedAttack {
        attacker_id: EntityId,
        from: Position,
        to: Position,
        projectile: String,
    },
    /// The party ascended a floor.
    StairsUp { depth: u32 },
    /// The party descended a floor.
    StairsDown { depth: u32 },
    /// Audio cue for clients.
    PlaySound { sound: SoundCue },
}

/// FIFO buffer of pending events for one instance.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event, preserving arrival order.
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Removes and returns all pending events in order.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::new_entity_id;

    #[test]
    fn test_drain_preserves_order_and_empties() {
        let mut queue = EventQueue::new();
        let id = new_entity_id();
        queue.push(GameEvent::Death { entity_id: id });
        queue.push(GameEvent::PlaySound {
            sound: SoundCue::HealthWarn,
        });
        assert_eq!(queue.len(), 2);

        let drained = queue.drain();
        assert_eq!(drained[0], GameEvent::Death { entity_id: id });
        assert_eq!(
            drained[1],
            GameEvent::PlaySound {
                sound: SoundCue::HealthWarn
            }
        );
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_event_wire_envelope() {
        let id = new_entity_id();
        let event = GameEvent::Damage {
            target_id: id,
            amount: 4,
            hp_remaining: 6,
        };
        let value = serde_json::to_value(&event).expect("serialize");
        assert_eq!(value["type"], "DAMAGE");
        assert_eq!(value["data"]["amount"], 4);
        assert_eq!(value["data"]["hp_remaining"], 6);
    }

    #[test]
    fn test_sound_cue_wire_names() {
        let value = serde_json::to_value(GameEvent::PlaySound {
            sound: SoundCue::HitSlash,
        })
        .expect("serialize");
        assert_eq!(value["data"]["sound"], "HIT_SLASH");
    }
}
