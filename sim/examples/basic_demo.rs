//! Basic demonstration of the arena simulation.
//!
//! Run with: cargo run --example basic_demo
//! More detail: RUST_LOG=arena_sim=debug cargo run --example basic_demo

use arena_sim::{BattleScenario, Battlefield, Faction, Outcome, SpeciesTable};
use tracing_subscriber::EnvFilter;

const SPECIES: &str = include_str!("../data/species.json");

const SCENARIO: &str = r#"{
    "left": {"Grunt": 6, "Crusher": 1, "Hexcaster": 3},
    "right": {"Thornback": 2, "Mirelurk": 3, "Twinblade": 4},
    "result": "left"
}"#;

fn main() -> arena_sim::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("arena_sim=info")),
        )
        .init();

    println!("=== Arena - Simulation Demo ===\n");

    let table = SpeciesTable::from_json(SPECIES)?;
    let scenario = BattleScenario::from_json(SCENARIO)?;

    let mut field = Battlefield::new();
    field.setup_battle(&scenario.left, &scenario.right, &table)?;

    println!("Initial state:");
    print_snapshot(&mut field);

    // Up to two simulated minutes.
    let mut outcome = Outcome::Undecided;
    for _ in 0..3600 {
        outcome = field.run_one_tick()?;

        if field.current_tick() % 150 == 0 {
            println!(
                "\n--- Tick {} (t={:.1}s) ---",
                field.current_tick(),
                field.elapsed()
            );
            print_snapshot(&mut field);
        }
        if outcome.is_decided() {
            break;
        }
    }

    println!(
        "\n=== {:?} after {:.1}s (recorded result: {:?}) ===\n",
        outcome,
        field.elapsed(),
        scenario.result
    );
    println!("{}", field.snapshot().to_json_pretty()?);
    Ok(())
}

fn print_snapshot(field: &mut Battlefield) {
    let snapshot = field.snapshot();

    for faction in [Faction::Left, Faction::Right] {
        println!("  {:?} ({} alive):", faction, snapshot.count(faction));
        for c in snapshot.combatants.iter().filter(|c| c.faction == faction) {
            println!(
                "    #{:<3} {:<10} pos=({:.1}, {:.1}) hp={:.0}/{:.0} skill={:.0}/{:.0} [{:?}] target={:?}",
                c.id,
                c.species,
                c.x,
                c.y,
                c.health,
                c.health_max,
                c.skill,
                c.skill_max,
                c.state,
                c.primary_target()
            );
        }
    }
}
