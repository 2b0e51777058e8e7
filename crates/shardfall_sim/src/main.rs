use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use glam::{IVec3, Vec3};
use shardfall_core::SimConfig;
use shardfall_fx::{InstanceSnapshot, LoggingToneGenerator, PoolId, TextLabel, TextSink};
use shardfall_sim::consts::SIM_DT;
use shardfall_sim::{run, Simulation};
use tracing::{info, trace};

const WALK_SPEED: f32 = 3.0;
const WALK_LANE_Z: f32 = 8.5;
const STRIKE_INTERVAL_TICKS: u64 = 20;
const STRIKE_DAMAGE: u32 = 40;
const EYE_HEIGHT: f32 = 1.0;

/// Floating text goes to the log when there is no UI to put it on.
struct LogTextSink;

impl TextSink for LogTextSink {
    fn show(&mut self, slot: usize, label: &TextLabel<'_>) {
        trace!(
            "Text slot {} '{}' at ({:.0}, {:.0}) opacity {:.2}",
            slot,
            label.text,
            label.screen.x,
            label.screen.y,
            label.opacity
        );
    }

    fn hide(&mut self, _slot: usize) {}
}

/// Walks the focus east along a fixed lane, digging the column ahead.
fn walk_and_dig(sim: &mut Simulation<LoggingToneGenerator>) {
    let tick = sim.tick_count();
    let x = tick as f32 * SIM_DT * WALK_SPEED;
    let column = IVec3::new(x.floor() as i32, 0, WALK_LANE_Z.floor() as i32);

    let ground = sim
        .world()
        .surface_height(column.x, column.z)
        .map_or(0.0, |top| top as f32 + 1.0);
    sim.set_focus(Vec3::new(x, ground + EYE_HEIGHT, WALK_LANE_Z));

    if tick % STRIKE_INTERVAL_TICKS == 0 {
        let ahead = column.x + 1;
        if let Some(top) = sim.world().surface_height(ahead, column.z) {
            sim.queue_strike(IVec3::new(ahead, top, column.z), STRIKE_DAMAGE);
        }
    }
}

fn main() {
    let _ = tracing_subscriber::fmt().with_target(false).try_init();

    let mut config_path: Option<PathBuf> = None;
    let mut max_ticks: Option<u64> = None;
    let mut seed: Option<u64> = None;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let Some(value) = args.next() else {
                    eprintln!("--config expects a path argument");
                    std::process::exit(2);
                };
                config_path = Some(PathBuf::from(value));
            }
            "--ticks" => {
                let Some(value) = args.next() else {
                    eprintln!("--ticks expects a numeric argument");
                    std::process::exit(2);
                };
                match value.parse::<u64>() {
                    Ok(parsed) => max_ticks = Some(parsed),
                    Err(err) => {
                        eprintln!("invalid tick count '{value}': {err}");
                        std::process::exit(2);
                    }
                }
            }
            "--seed" => {
                let Some(value) = args.next() else {
                    eprintln!("--seed expects a numeric argument");
                    std::process::exit(2);
                };
                match value.parse::<u64>() {
                    Ok(parsed) => seed = Some(parsed),
                    Err(err) => {
                        eprintln!("invalid seed '{value}': {err}");
                        std::process::exit(2);
                    }
                }
            }
            "--help" | "-h" => {
                println!(
                    "Usage: shardfall_sim [--config <path>] [--ticks <u64>] [--seed <u64>]"
                );
                return;
            }
            other => {
                eprintln!("unknown argument: {other}");
                std::process::exit(2);
            }
        }
    }

    let mut config = match &config_path {
        Some(path) => match SimConfig::load(path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("failed to load config {}: {err}", path.display());
                std::process::exit(1);
            }
        },
        None => SimConfig::default(),
    };
    if let Some(seed) = seed {
        config.effects.rng_seed = seed;
    }
    let config = config.sanitize();

    let mut sim = match Simulation::new(&config, LoggingToneGenerator::new()) {
        Ok(sim) => sim,
        Err(err) => {
            eprintln!("failed to build world: {err}");
            std::process::exit(1);
        }
    };
    sim.effects_mut().set_ambient(true);

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        eprintln!("\nShutdown signal received, stopping simulation...");
        r.store(false, Ordering::SeqCst);
    }) {
        eprintln!("failed to set Ctrl+C handler: {err}");
        std::process::exit(1);
    }

    info!(
        "Starting Shardfall simulation (chunk size {}, render distance {}, seed {:#x})",
        config.world.chunk_size, config.world.render_distance, config.effects.rng_seed
    );

    let mut surface = InstanceSnapshot::new();
    let summary = run(
        &mut sim,
        &mut surface,
        &mut LogTextSink,
        &running,
        max_ticks,
        walk_and_dig,
    );

    for pool in PoolId::ALL {
        info!(
            "Pool {}: {}/{} active",
            pool.name(),
            sim.effects().active_count(pool),
            sim.effects().capacity(pool)
        );
    }
    info!(
        "{} chunks loaded, {} tones played, {} ticks",
        sim.world().loaded_count(),
        sim.audio().generator().played(),
        summary.ticks
    );
}
