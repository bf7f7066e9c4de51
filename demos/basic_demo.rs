//! Basic demonstration of the fauna simulation.
//!
//! Run with: cargo run --example basic_demo
//! Set `RUST_LOG=fauna_sim=debug` for per-tick logs.

use fauna_sim::{Ecosystem, EcosystemConfig, GroupKind, HeightField};
use tracing_subscriber::EnvFilter;

fn main() -> fauna_sim::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("=== Fauna Sim - Ecosystem Demo ===\n");

    // Gently rolling hills for the herds to walk over
    let terrain = HeightField::from_fn(200, 200, 4.0, |x, z| {
        (x * 0.02).sin() * 3.0 + (z * 0.015).cos() * 2.0
    })?;

    let config = EcosystemConfig {
        seed: Some(42),
        ..Default::default()
    };
    let mut eco = Ecosystem::with_terrain(config, terrain)?;

    println!("Initial state:");
    print_summary(&eco);

    // 10 seconds at 60 fps
    println!("\nRunning 600 ticks at 60 fps...\n");
    for tick in 0..600 {
        eco.step(1.0 / 60.0)?;

        if (tick + 1) % 120 == 0 {
            println!("--- Tick {} (t={:.1}s) ---", eco.current_tick(), eco.current_time());
            print_summary(&eco);
        }

        // Fish pause halfway through; their state is kept
        if tick == 299 {
            println!("\n--- Fish switched off ---\n");
            eco.set_enabled(GroupKind::School, false);
        }
    }

    println!("\n=== Final Group State (JSON) ===\n");
    println!("{}", serde_json::to_string_pretty(&eco.snapshot().groups)?);

    Ok(())
}

fn print_summary(eco: &Ecosystem) {
    let snapshot = eco.snapshot();
    println!(
        "  birds={} fish={} animals={}",
        snapshot.counts.birds, snapshot.counts.fish, snapshot.counts.animals
    );

    for group in &snapshot.groups {
        println!(
            "    {:>6} #{:<2} members={:<3} centroid=({:.1}, {:.1}, {:.1}){}",
            group.kind.label(),
            group.id.0,
            group.members,
            group.centroid.x,
            group.centroid.y,
            group.centroid.z,
            if group.enabled { "" } else { " [off]" }
        );
    }
}
