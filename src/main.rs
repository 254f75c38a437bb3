//! rainscape - rain fountain, orbiting cloud and heightmap terrain
//!
//! Headless runner: steps the configured scene for a fixed number of frames
//! and reports what each emitter did.

mod config;
mod scene;

use anyhow::{Context, Result};
use clap::Parser;
use config::SceneConfig;
use rainscape_core::SimTick;
use rainscape_testkit::{FrameRecord, JsonlSink};
use scene::Scene;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless rain/particle scene runner", long_about = None)]
struct Args {
    /// Scene config (TOML); defaults to config/scene.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the number of frames to simulate
    #[arg(long)]
    frames: Option<u64>,

    /// Override the scene seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write one JSON line per frame to this path
    #[arg(long)]
    frame_log: Option<PathBuf>,

    /// Write a run summary (JSON) to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write the effective scene config to this path and exit
    #[arg(long)]
    dump_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // INFO by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting rainscape v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => SceneConfig::load_from_path(path),
        None => SceneConfig::load(),
    };
    if let Some(frames) = args.frames {
        config.run.frames = frames;
    }
    if let Some(seed) = args.seed {
        config.run.seed = seed;
    }

    if let Some(path) = &args.dump_config {
        config
            .save_to_path(path)
            .with_context(|| format!("Failed to write scene config {}", path.display()))?;
        info!(path = %path.display(), "scene config written");
        return Ok(());
    }

    let mut frame_log = match &args.frame_log {
        Some(path) => Some(
            JsonlSink::create(path)
                .with_context(|| format!("Failed to create frame log {}", path.display()))?,
        ),
        None => None,
    };

    let mut scene = Scene::build(&config);
    for _ in 0..scene.frames() {
        let summary = scene.step();
        if let Some(log) = frame_log.as_mut() {
            log.write(&FrameRecord {
                tick: SimTick(summary.frame),
                kind: "frame",
                data: &summary,
            })?;
        }
        if summary.frame % 60 == 0 {
            info!(
                frame = summary.frame,
                fountain = summary.fountain.map_or(0, |f| f.active),
                orbit = summary.orbit.map_or(0, |o| o.active),
                "progress"
            );
        }
    }

    if let Some(log) = frame_log.as_mut() {
        log.flush()?;
    }

    let report = scene.report("headless");
    for emitter in &report.emitters {
        info!(
            emitter = %emitter.label,
            active = emitter.final_active,
            peak = emitter.peak_active,
            spawned = emitter.spawned,
            respawned = emitter.respawned,
            "emitter summary"
        );
    }
    if !report.terrain_loaded && config.terrain.heightmap.is_some() {
        warn!("terrain was configured but not loaded");
    }
    if let Some(path) = &args.report {
        report
            .write_to(path)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
    }
    info!(frames = report.frames, draws = report.draw_calls, "run complete");
    Ok(())
}
