//! Deterministic engine demo binary.
//!
//! Boots a fresh [`Simulation`] on a hex-axial world, registers the periodic
//! scheduler, and ticks it forward for a fixed number of ticks, printing a
//! world-hash checkpoint line after every tick. A snapshot is written to disk
//! at a fixed tick cadence and a final snapshot on shutdown.
//!
//! Time progression here is tick-based only: the only wall-clock use in this
//! binary is the `std::thread::sleep` between ticks, which paces how fast
//! checkpoints are printed to the terminal and influences nothing in the
//! authoritative state.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use hexsim_engine::{PeriodicScheduler, Simulation, TopologyType, Value};
use tracing::{error, info};

#[derive(Debug, Clone)]
struct DemoConfig {
    master_seed: u64,
    hex_radius: i64,
    max_ticks: u64,
    snapshot_interval: u64,
    tick_pace_ms: u64,
    snapshot_dir: PathBuf,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            master_seed: 1337,
            hex_radius: 6,
            max_ticks: 240,
            snapshot_interval: 60,
            tick_pace_ms: 0,
            snapshot_dir: PathBuf::from("snapshots"),
        }
    }
}

fn parse_config() -> DemoConfig {
    let mut config = DemoConfig::default();

    if let Ok(v) = env::var("HEXSIM_SEED") {
        if let Ok(seed) = v.parse() {
            config.master_seed = seed;
        }
    }
    if let Ok(v) = env::var("HEXSIM_HEX_RADIUS") {
        if let Ok(radius) = v.parse() {
            config.hex_radius = radius;
        }
    }
    if let Ok(v) = env::var("HEXSIM_MAX_TICKS") {
        if let Ok(max_ticks) = v.parse() {
            config.max_ticks = max_ticks;
        }
    }
    if let Ok(v) = env::var("HEXSIM_SNAPSHOT_INTERVAL") {
        if let Ok(interval) = v.parse() {
            config.snapshot_interval = interval;
        }
    }
    if let Ok(v) = env::var("HEXSIM_TICK_PACE_MS") {
        if let Ok(pace) = v.parse() {
            config.tick_pace_ms = pace;
        }
    }
    if let Ok(v) = env::var("HEXSIM_SNAPSHOT_DIR") {
        config.snapshot_dir = PathBuf::from(v);
    }

    config
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    info!("═══════════════════════════════════════════════════════");
    info!("HEXSIM ENGINE BOOTSTRAP");
    info!("═══════════════════════════════════════════════════════");
    info!("Time model: DETERMINISTIC TICK-BASED (no wall-clock time in state)");
    info!("");

    let config = parse_config();
    info!(
        master_seed = config.master_seed,
        hex_radius = config.hex_radius,
        max_ticks = config.max_ticks,
        "demo configuration loaded"
    );

    std::fs::create_dir_all(&config.snapshot_dir)?;

    let topology_params =
        Value::Object(std::collections::BTreeMap::from([("radius".to_string(), Value::Int(config.hex_radius))]));
    let mut sim = match Simulation::new_with_seed_and_topology(
        config.master_seed,
        TopologyType::HexAxial,
        topology_params,
    ) {
        Ok(sim) => sim,
        Err(e) => {
            error!(error = %e, "BOOT FAILED: could not initialize simulation world");
            return Err("BOOT_FAILED: world genesis rejected".into());
        }
    };
    info!(tick = sim.current_tick(), hash = %sim.simulation_hash(), "simulation initialized");

    let mut scheduler = PeriodicScheduler::new();
    scheduler.register_task(&mut sim, "day_tick", sim.time().ticks_per_day, 0)?;
    scheduler.set_task_callback(
        "day_tick",
        Box::new(|_sim, tick| {
            info!(tick, "day boundary crossed");
        }),
    );
    sim.register_rule_module(Box::new(scheduler))?;

    let genesis_path = config.snapshot_dir.join("genesis.save");
    sim.save_game(&genesis_path, Value::object())?;
    info!(path = %genesis_path.display(), "genesis snapshot written");

    info!("");
    info!("MAIN TICK LOOP (DETERMINISTIC)");
    info!("──────────────────────────────────────────────────────");

    for _ in 0..config.max_ticks {
        if let Err(e) = sim.tick() {
            error!(tick = sim.current_tick(), error = %e, "TICK FAILED");
            return Err(format!("tick {} failed: {e}", sim.current_tick()).into());
        }

        let tick = sim.current_tick();
        let hash = sim.simulation_hash();
        info!(tick, %hash, "tick checkpoint");
        println!("WORLD_HASH_CHECKPOINT:tick={tick}:hash={hash}");

        if tick % config.snapshot_interval == 0 {
            let path = config.snapshot_dir.join(format!("tick-{tick}.save"));
            sim.save_game(&path, Value::object())?;
            info!(path = %path.display(), "snapshot written");
        }

        if config.tick_pace_ms > 0 {
            std::thread::sleep(Duration::from_millis(config.tick_pace_ms));
        }
    }

    let final_path = config.snapshot_dir.join("final.save");
    sim.save_game(&final_path, Value::object())?;
    info!(path = %final_path.display(), "final snapshot written");

    info!("");
    info!("═══════════════════════════════════════════════════════");
    info!("ENGINE SHUTDOWN COMPLETE");
    info!("═══════════════════════════════════════════════════════");
    info!(tick = sim.current_tick(), hash = %sim.simulation_hash(), "determinism guarantee: maintained");

    Ok(())
}
