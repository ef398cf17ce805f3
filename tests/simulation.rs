//! End-to-end scenarios driving a full instance through the public API:
//! joining, fighting, looting, and descending, with a hand-advanced clock.

use delve::{
    config, new_entity_id, CharacterClass, Difficulty, Direction, GameEvent, GameInstance,
    ManualClock, MonsterKind, Position, TileType,
};

fn fresh_instance(seed: u64) -> (GameInstance, ManualClock) {
    let clock = ManualClock::default();
    let instance = GameInstance::new("it", seed, Box::new(clock.clone()));
    (instance, clock)
}

/// Finds a walkable neighbor of `pos` and the direction leading from it
/// onto `pos`.
fn approach(instance: &GameInstance, pos: Position) -> (Position, Direction) {
    for dir in Direction::all() {
        let (dx, dy) = dir.to_delta();
        let neighbor = pos.offset(-dx, -dy);
        if instance.grid().is_walkable(neighbor) {
            return (neighbor, dir);
        }
    }
    panic!("no walkable approach to {pos:?}");
}

#[test]
fn descending_the_stairs_regenerates_the_floor() {
    let (mut instance, _clock) = fresh_instance(42);
    let hero = new_entity_id();
    instance.add_player(hero, "Hero", CharacterClass::Warrior);
    instance.mobs.clear();

    let stairs = instance.floor.stairs_down;
    let (start, dir) = approach(&instance, stairs);
    instance.players.get_mut(&hero).unwrap().pos = start;
    let old_rooms = instance.rooms().to_vec();

    instance.move_player(hero, dir);

    assert_eq!(instance.depth, 2);
    assert_ne!(instance.rooms(), old_rooms.as_slice());
    assert!(!instance.mobs.is_empty(), "new floor is populated");
    assert_eq!(instance.players[&hero].pos, instance.floor.stairs_up);
    let events = instance.flush_events();
    assert!(events.contains(&GameEvent::StairsDown { depth: 2 }));

    // and straight back up
    let stairs = instance.floor.stairs_up;
    let (start, dir) = approach(&instance, stairs);
    instance.players.get_mut(&hero).unwrap().pos = start;
    instance.move_player(hero, dir);

    assert_eq!(instance.depth, 1);
    assert_eq!(instance.players[&hero].pos, instance.floor.stairs_down);
    assert!(instance
        .flush_events()
        .contains(&GameEvent::StairsUp { depth: 1 }));
}

#[test]
fn walking_over_loot_pockets_it() {
    let (mut instance, _clock) = fresh_instance(7);
    let hero = new_entity_id();
    instance.add_player(hero, "Hero", CharacterClass::Rogue);
    instance.mobs.clear();

    let (item_id, item_pos) = {
        let item = instance.ground_items.values().next().expect("spawned loot");
        (item.id, item.pos.expect("on ground"))
    };
    let (start, dir) = approach(&instance, item_pos);
    instance.players.get_mut(&hero).unwrap().pos = start;

    instance.move_player(hero, dir);

    let hero_ref = &instance.players[&hero];
    assert_eq!(hero_ref.pos, item_pos);
    let held = hero_ref
        .inventory
        .iter()
        .find(|i| i.id == item_id)
        .expect("picked up");
    assert_eq!(held.pos, None);
    assert!(!instance.ground_items.contains_key(&item_id));
    assert!(instance
        .flush_events()
        .iter()
        .any(|e| matches!(e, GameEvent::Pickup { item_id: id, .. } if *id == item_id)));
}

#[test]
fn melee_brawl_to_the_death() {
    let (mut instance, clock) = fresh_instance(3);
    let hero = new_entity_id();
    instance.add_player(hero, "Hero", CharacterClass::Warrior);

    // isolate one monster with no evasion next to the hero
    let mob_id = *instance.mobs.keys().next().expect("mob");
    instance.mobs.retain(|id, _| *id == mob_id);
    let hero_pos = {
        let mob = instance.mobs.get_mut(&mob_id).unwrap();
        mob.evasion = 0.0;
        mob.attack = 0;
        mob.pos
    };
    let (start, dir) = approach(&instance, hero_pos);
    instance.players.get_mut(&hero).unwrap().pos = start;

    let mut swings = 0;
    while instance.mobs.get(&mob_id).map_or(false, |m| m.alive) {
        clock.advance(3.5);
        instance.move_player(hero, dir);
        swings += 1;
        assert!(swings < 50, "fight should have ended");
    }

    let events = instance.flush_events();
    assert!(events.contains(&GameEvent::Death { entity_id: mob_id }));

    // the corpse lingers for the grace period, then the tick reaps it
    assert!(instance.mobs.contains_key(&mob_id));
    clock.advance(config::CORPSE_GRACE_SECS + 0.1);
    instance.tick();
    assert!(!instance.mobs.contains_key(&mob_id));
}

#[test]
fn fifth_floor_is_a_boss_floor() {
    let (mut instance, _clock) = fresh_instance(11);
    for _ in 0..4 {
        instance.next_floor();
    }
    assert_eq!(instance.depth, 5);
    assert_eq!(instance.mobs.len(), 1);
    let boss = instance.mobs.values().next().expect("boss");
    assert_eq!(boss.name, "Goo");
    assert_eq!(boss.kind, MonsterKind::Boss);
    assert_eq!(boss.hp, 100 + 20 * 5);
    assert!(instance.ground_items.is_empty());

    // the sixth floor goes back to a regular warren
    instance.next_floor();
    assert!(instance.mobs.len() > 1);
    assert!(instance
        .mobs
        .values()
        .all(|m| m.kind == MonsterKind::Normal));
}

#[test]
fn difficulty_is_instance_wide_and_live() {
    let (mut instance, clock) = fresh_instance(13);
    let hero = new_entity_id();
    instance.add_player(hero, "Hero", CharacterClass::Warrior);
    instance.change_difficulty(Difficulty::Easy);

    // on Easy nothing ever chases; monsters at most roam
    let hero_pos = instance.players[&hero].pos;
    for _ in 0..10 {
        clock.advance(1.0);
        instance.tick();
    }
    for mob in instance.mobs.values() {
        assert_ne!(mob.ai_state, delve::AiState::Hunting);
        // roaming never enters the safe rooms
        assert!(!instance.floor.in_safe_room(mob.pos));
    }
    assert_eq!(instance.players[&hero].pos, hero_pos);
}

#[test]
fn event_trace_serializes_as_tagged_envelopes() {
    let (mut instance, clock) = fresh_instance(17);
    let hero = new_entity_id();
    instance.add_player(hero, "Hero", CharacterClass::Warrior);
    instance.change_difficulty(Difficulty::Hard);

    for _ in 0..30 {
        clock.advance(0.5);
        instance.tick();
    }
    let events = instance.flush_events();
    for event in events {
        let value = serde_json::to_value(&event).expect("serialize");
        assert!(value["type"].is_string(), "missing type tag: {value}");
        assert!(value.get("data").is_some(), "missing data payload: {value}");
    }
}

#[test]
fn snapshot_hides_what_the_viewer_cannot_see() {
    let (mut instance, _clock) = fresh_instance(19);
    let hero = new_entity_id();
    instance.add_player(hero, "Hero", CharacterClass::Huntress);

    let fogged = instance.get_state(Some(hero));
    let visible = fogged.visible_tiles.expect("visibility list");
    let full = instance.get_state(None);

    assert!(fogged.monsters.len() <= full.monsters.len());
    assert!(fogged.items.len() <= full.items.len());
    for mob in &fogged.monsters {
        assert!(visible.contains(&mob.pos));
    }
    // the hero joined in the stair room, far from the spawns
    assert_eq!(fogged.players.len(), full.players.len());

    // snapshot survives a serde round trip
    let json = serde_json::to_string(&full).expect("serialize");
    let back: delve::StateSnapshot = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back.depth, full.depth);
    assert_eq!(back.monsters.len(), full.monsters.len());
    assert_eq!(back.tiles.len(), full.height as usize);
}

#[test]
fn stair_tiles_exist_on_every_generated_floor() {
    let (mut instance, _clock) = fresh_instance(23);
    for depth in 2..=8 {
        instance.next_floor();
        assert_eq!(instance.depth, depth);
        assert_eq!(
            instance.grid().get(instance.floor.stairs_down),
            Some(TileType::StairsDown)
        );
        assert_eq!(
            instance.grid().get(instance.floor.stairs_up),
            Some(TileType::StairsUp)
        );
    }
}
