//! Headless simulation driver: carves a dungeon, drops a player in, and runs
//! the simulation for a fixed number of ticks, printing the map and the
//! event trace. Useful for eyeballing generation and AI behavior without a
//! transport in front of the engine.

use clap::Parser;
use delve::{
    new_entity_id, CharacterClass, DelveResult, Difficulty, GameInstance, ManualClock,
    MonsterKind, Position, TileType,
};

#[derive(Parser, Debug)]
#[command(name = "delve", version, about = "Headless dungeon simulation driver")]
struct Args {
    /// World seed
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Floor to start on
    #[arg(long, default_value_t = 1)]
    depth: u32,

    /// Number of simulation steps
    #[arg(long, default_value_t = 100)]
    ticks: u32,

    /// Simulated seconds per step
    #[arg(long, default_value_t = 0.5)]
    tick_seconds: f64,

    /// AI difficulty: easy, normal, or hard
    #[arg(long, default_value = "normal")]
    difficulty: String,

    /// Player class: warrior, rogue, huntress, or mage
    #[arg(long, default_value = "warrior")]
    class: String,

    /// Print the final fog-filtered snapshot as JSON
    #[arg(long)]
    snapshot: bool,
}

fn main() -> DelveResult<()> {
    env_logger::init();
    let args = Args::parse();

    let difficulty = match args.difficulty.as_str() {
        "easy" => Difficulty::Easy,
        "hard" => Difficulty::Hard,
        _ => Difficulty::Normal,
    };
    let class = match args.class.as_str() {
        "rogue" => CharacterClass::Rogue,
        "huntress" => CharacterClass::Huntress,
        "mage" => CharacterClass::Mage,
        _ => CharacterClass::Warrior,
    };

    let clock = ManualClock::default();
    let mut instance = GameInstance::new("driver", args.seed, Box::new(clock.clone()));
    instance.change_difficulty(difficulty);
    for _ in 1..args.depth {
        instance.next_floor();
    }

    let hero = new_entity_id();
    instance.add_player(hero, "Hero", class);
    instance.flush_events();

    println!(
        "seed {} / depth {} / {:?} / {} monsters",
        args.seed,
        instance.depth,
        difficulty,
        instance.mobs.len()
    );
    print_map(&instance);

    for step in 0..args.ticks {
        clock.advance(args.tick_seconds);
        instance.tick();
        for event in instance.flush_events() {
            println!("[{step:4}] {}", serde_json::to_string(&event)?);
        }
    }

    print_map(&instance);
    if args.snapshot {
        let snapshot = instance.get_state(Some(hero));
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

fn print_map(instance: &GameInstance) {
    let grid = instance.grid();
    for y in 0..grid.height as i32 {
        let mut line = String::with_capacity(grid.width as usize);
        for x in 0..grid.width as i32 {
            let pos = Position::new(x, y);
            line.push(glyph_at(instance, pos));
        }
        println!("{line}");
    }
}

fn glyph_at(instance: &GameInstance, pos: Position) -> char {
    if instance.players.values().any(|p| p.pos == pos) {
        return '@';
    }
    if let Some(mob) = instance.mobs.values().find(|m| m.alive && m.pos == pos) {
        return match mob.kind {
            MonsterKind::Boss => 'B',
            MonsterKind::Normal => 'g',
        };
    }
    match instance.grid().get(pos) {
        Some(TileType::Wall) => '#',
        Some(TileType::Floor) => '.',
        Some(TileType::Door) => '+',
        Some(TileType::StairsUp) => '<',
        Some(TileType::StairsDown) => '>',
        Some(TileType::Void) | None => ' ',
    }
}
