//! Run summary exported by headless runs for CI artifacts.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Summary of one headless run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Scene or test identifier.
    pub scene: String,
    /// Collection time (RFC 3339).
    pub timestamp: String,
    /// Frames stepped.
    pub frames: u64,
    /// Per-emitter counters.
    pub emitters: Vec<EmitterMetrics>,
    /// Draw calls submitted over the whole run.
    pub draw_calls: usize,
    /// Whether a heightmap was loaded.
    pub terrain_loaded: bool,
}

/// Counters for a single emitter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmitterMetrics {
    /// Emitter label.
    pub label: String,
    /// Active particles after the last frame.
    pub final_active: usize,
    /// Largest active count seen.
    pub peak_active: usize,
    /// Particles activated by growth.
    pub spawned: usize,
    /// Particles recycled by their motion rule.
    pub respawned: usize,
}

impl EmitterMetrics {
    /// Empty counters for `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    /// Fold one frame's counters in.
    pub fn record(&mut self, active: usize, spawned: usize, respawned: usize) {
        self.final_active = active;
        self.peak_active = self.peak_active.max(active);
        self.spawned += spawned;
        self.respawned += respawned;
    }
}

impl RunReport {
    /// Start a report stamped with the current time.
    pub fn new(scene: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            frames: 0,
            emitters: Vec::new(),
            draw_calls: 0,
            terrain_loaded: false,
        }
    }

    /// Write the report as pretty JSON, creating parent directories if needed.
    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut file = File::create(path)?;
        let json = serde_json::to_string_pretty(self)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_tracks_peak_and_totals() {
        let mut metrics = EmitterMetrics::new("fountain");
        metrics.record(50, 50, 0);
        metrics.record(100, 50, 3);
        metrics.record(40, 0, 1);
        assert_eq!(metrics.final_active, 40);
        assert_eq!(metrics.peak_active, 100);
        assert_eq!(metrics.spawned, 100);
        assert_eq!(metrics.respawned, 4);
    }

    #[test]
    fn report_round_trips_through_disk() {
        let path = std::env::temp_dir().join(format!(
            "rainscape-report-{}-{}.json",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let mut report = RunReport::new("smoke");
        report.frames = 12;
        report.emitters.push(EmitterMetrics::new("orbit"));
        report.write_to(&path).expect("write");
        let text = fs::read_to_string(&path).expect("read");
        let parsed: RunReport = serde_json::from_str(&text).expect("parse");
        assert_eq!(parsed.frames, 12);
        assert_eq!(parsed.emitters[0].label, "orbit");
        let _ = fs::remove_file(&path);
    }
}
