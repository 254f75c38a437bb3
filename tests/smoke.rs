use anyhow::Result;
use glam::Vec3;
use rainscape_core::{scoped_rng, SimTick};
use rainscape_particles::{Emitter, EmitterSettings, FountainEmitter, UpdateStats};
use rainscape_render::RecordingSink;
use rainscape_terrain::{Heightmap, Terrain};
use rainscape_testkit::{run_frame_test, FrameTestConfig};
use serde::Serialize;
use std::path::PathBuf;
use std::process::Command;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(name: &str, ext: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    std::env::temp_dir().join(format!("rainscape-{name}-{stamp}.{ext}"))
}

#[test]
fn headless_binary_writes_a_frame_log() -> Result<()> {
    let log = temp_path("frames", "jsonl");
    let report = temp_path("report", "json");
    let status = Command::new(env!("CARGO_BIN_EXE_rainscape"))
        .args(["--config", "/no/such/scene.toml", "--frames", "5"])
        .arg("--frame-log")
        .arg(&log)
        .arg("--report")
        .arg(&report)
        .env("RUST_LOG", "warn")
        .status()?;
    assert!(status.success());

    let lines = std::fs::read_to_string(&log)?;
    assert_eq!(lines.lines().count(), 5);
    let first: serde_json::Value = serde_json::from_str(lines.lines().next().unwrap_or(""))?;
    assert_eq!(first["kind"], "frame");
    assert_eq!(first["data"]["fountain"]["active"], 50);

    let summary: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report)?)?;
    assert_eq!(summary["frames"], 5);
    std::fs::remove_file(log)?;
    std::fs::remove_file(report)?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct FrameSnapshot {
    active: usize,
    spawned: usize,
    finite: bool,
}

#[test]
fn fountain_over_terrain_matches_snapshot() -> Result<()> {
    // A 9x9 bowl, 16 units across, rising to 40 at the rim.
    let samples = (0..81)
        .map(|i| {
            let (x, z) = ((i % 9) as f32 - 4.0, (i / 9) as f32 - 4.0);
            (x * x + z * z) / 32.0
        })
        .collect();
    let mut terrain = Terrain::new(rainscape_terrain::TerrainScale {
        height_scale: 40.0,
        block_scale: 2.0,
    });
    terrain.set_heightmap(&Heightmap::from_samples(9, 9, samples)?);
    let terrain = Rc::new(terrain);

    let settings = EmitterSettings::default()
        .with_count(200)
        .with_position(Vec3::new(0.0, 20.0, 0.0));
    let emitter = FountainEmitter::fountain(settings, scoped_rng(7, 1, SimTick::ZERO))
        .with_ground(terrain.clone());

    let snapshot_path =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/snapshots/fountain_over_terrain.json");
    let report = run_frame_test(
        FrameTestConfig::new("fountain_over_terrain", 6).with_snapshot(snapshot_path),
        (emitter, UpdateStats::default()),
        |clock, (emitter, stats)| {
            *stats = emitter.update(clock.time, clock.dt, Vec3::new(10.0, 10.0, 10.0));
        },
        |_, (emitter, stats)| FrameSnapshot {
            active: emitter.active_count(),
            spawned: stats.spawned,
            finite: emitter
                .pool()
                .active_slice()
                .iter()
                .all(|p| p.position.is_finite() && p.velocity.is_finite()),
        },
    )?;
    assert_eq!(report.last().map(|s| s.active), Some(200));

    let mut sink = RecordingSink::new();
    terrain.render(&mut sink);
    assert_eq!(sink.draws()[0].indices, Some(6 * 8 * 8));
    Ok(())
}
