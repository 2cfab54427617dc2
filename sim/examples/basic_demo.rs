//! Basic demonstration of the map-part simulation.
//!
//! Builds a small two-storey building, shoots out one of its columns and
//! watches the upper floor come down as rubble.
//!
//! Run with: cargo run --example basic_demo

use mappart_sim::{init_tracing_default, PartCatalog, SimWorld, TilePos};
use std::sync::Arc;

const CATALOG: &str = r#"{ "types": [
    { "id": "RUBBLE_1", "category": "Feature", "provides_support": true },
    { "id": "RUBBLE_2", "category": "Feature", "provides_support": true },
    { "id": "DIRT", "category": "Ground", "provides_support": true },
    { "id": "FLOOR", "category": "Ground", "provides_support": true,
      "constitution": 30, "destroyed_ground_tile": "DIRT", "rubble": ["RUBBLE_1", "RUBBLE_2"] },
    { "id": "COLUMN", "category": "Feature", "provides_support": true,
      "constitution": 40, "rubble": ["RUBBLE_1", "RUBBLE_2"] },
    { "id": "BRICK", "category": "LeftWall", "provides_support": true,
      "constitution": 50, "rubble": ["RUBBLE_1", "RUBBLE_2"] }
] }"#;

fn main() {
    println!("=== Map Part Simulation Demo ===\n");
    init_tracing_default();

    let catalog = Arc::new(PartCatalog::from_json(CATALOG).expect("demo catalog parses"));
    let mut sim = SimWorld::new(catalog, (5, 5, 4));

    // Ground floor everywhere, one column in the middle holding up a slab.
    for x in 0..5 {
        for y in 0..5 {
            sim.place_part("FLOOR", TilePos::new(x, y, 0)).unwrap();
        }
    }
    let column = sim.place_part("COLUMN", TilePos::new(2, 2, 0)).unwrap();
    sim.place_part("COLUMN", TilePos::new(2, 2, 1)).unwrap();
    for (x, y) in [(1, 2), (2, 2), (3, 2)] {
        sim.place_part("FLOOR", TilePos::new(x, y, 2)).unwrap();
    }
    sim.place_part("BRICK", TilePos::new(1, 1, 0)).unwrap();
    sim.place_part("BRICK", TilePos::new(1, 1, 1)).unwrap();

    let report = sim.settle();
    println!("Settled: {:?}\n", report);
    print_snapshot(&sim);

    println!("\n--- Shooting the lower column ---\n");
    sim.spawn_impact(column, 500);

    // Three seconds at 20 frames per second.
    for frame in 0..60 {
        sim.step(0.05);
        if (frame + 1) % 10 == 0 {
            println!("--- Tick {} (t={:.1}s) ---", sim.current_tick(), sim.current_time());
            print_snapshot(&sim);
        }
    }

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot().to_json_pretty().unwrap());
}

fn print_snapshot(sim: &SimWorld) {
    let snapshot = sim.snapshot();
    let falling = snapshot.parts.iter().filter(|p| p.falling).count();
    let pending = snapshot.parts.iter().filter(|p| p.ticks_until_collapse > 0).count();
    println!(
        "  {} parts on map, {} falling, {} about to collapse, {} effects",
        snapshot.parts.len(),
        falling,
        pending,
        snapshot.effects.len()
    );
    for part in snapshot.parts.iter().filter(|p| p.tile.is_some_and(|t| t.z > 0)) {
        println!(
            "    {:>3} {:<8} {:?} form={} hard={}",
            part.id, part.type_name, part.tile, part.form, part.hard_support
        );
    }
}
