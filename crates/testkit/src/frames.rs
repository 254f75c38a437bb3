//! Fixed-step frame harness for deterministic emitter tests.
//!
//! A frame test steps a small scene for a fixed number of frames at a constant
//! delta and captures a snapshot after every step. The report is returned to the
//! caller and, when a golden path is configured, compared against it.

use crate::snapshot::assert_json_snapshot;
use anyhow::Result;
use rainscape_core::SimTick;
use serde::Serialize;
use std::path::PathBuf;

/// Configuration for a frame test.
#[derive(Debug, Clone)]
pub struct FrameTestConfig {
    /// Human-readable name (written into the report).
    pub name: String,
    /// Number of frames to step.
    pub frames: u64,
    /// Fixed frame delta in seconds.
    pub dt: f32,
    /// Golden JSON file; `None` skips the snapshot comparison.
    pub snapshot_path: Option<PathBuf>,
}

impl FrameTestConfig {
    /// A 60 Hz run of `frames` frames without a golden file.
    pub fn new(name: impl Into<String>, frames: u64) -> Self {
        Self {
            name: name.into(),
            frames,
            dt: 1.0 / 60.0,
            snapshot_path: None,
        }
    }

    /// Builder: compare the report against `path`.
    pub fn with_snapshot(mut self, path: impl Into<PathBuf>) -> Self {
        self.snapshot_path = Some(path.into());
        self
    }
}

/// Timing handed to the step closure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameClock {
    /// Frame counter, starting at zero.
    pub tick: SimTick,
    /// Absolute time at the start of the frame.
    pub time: f32,
    /// Frame delta.
    pub dt: f32,
}

/// Snapshot captured after a frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot<S> {
    /// Frame number the snapshot was taken after.
    pub tick: u64,
    /// Snapshot payload.
    pub snapshot: S,
}

/// Full run output.
#[derive(Debug, Clone, Serialize)]
pub struct FrameReport<S> {
    /// Test name.
    pub name: String,
    /// One snapshot per stepped frame.
    pub frames: Vec<FrameSnapshot<S>>,
}

impl<S> FrameReport<S> {
    /// Snapshot taken after the last frame.
    pub fn last(&self) -> Option<&S> {
        self.frames.last().map(|frame| &frame.snapshot)
    }

    /// Iterate the snapshot payloads in frame order.
    pub fn snapshots(&self) -> impl Iterator<Item = &S> {
        self.frames.iter().map(|frame| &frame.snapshot)
    }
}

/// Step `state` for `config.frames` frames, snapshotting after each step.
pub fn run_frame_test<State, Snapshot, StepFn, SnapFn>(
    config: FrameTestConfig,
    mut state: State,
    mut step: StepFn,
    mut snapshot: SnapFn,
) -> Result<FrameReport<Snapshot>>
where
    Snapshot: Serialize,
    StepFn: FnMut(FrameClock, &mut State),
    SnapFn: FnMut(FrameClock, &State) -> Snapshot,
{
    let mut frames = Vec::with_capacity(config.frames as usize);
    let mut clock = FrameClock {
        tick: SimTick::ZERO,
        time: 0.0,
        dt: config.dt,
    };

    for _ in 0..config.frames {
        step(clock, &mut state);
        frames.push(FrameSnapshot {
            tick: clock.tick.0,
            snapshot: snapshot(clock, &state),
        });
        clock.tick = clock.tick.advance(1);
        clock.time += clock.dt;
    }

    let report = FrameReport {
        name: config.name,
        frames,
    };
    if let Some(path) = config.snapshot_path {
        assert_json_snapshot(path, &report)?;
    }
    Ok(report)
}
