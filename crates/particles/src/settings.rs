//! Per-frame emitter settings and the feed that supplies them.

use crate::wind::WindAxis;
use glam::Vec3;
use rainscape_core::SimTick;
use serde::{Deserialize, Serialize};

/// User-adjustable emitter parameters, polled once per frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmitterSettings {
    /// Target particle count.
    pub particle_count: usize,
    /// Emitter world position.
    pub emitter_position: Vec3,
    /// Height above which fountain particles are respawned.
    pub height_threshold: f32,
    /// Submit particles back to front.
    pub use_sorting: bool,
    /// Submit billboard rotations (identity otherwise).
    pub use_rotation: bool,
    /// Growth rate of a particle's X wind factor per X gust.
    pub wind_x_factor: f32,
    /// Growth rate of a particle's Z wind factor per Z gust.
    pub wind_z_factor: f32,
    /// Wind gusts raised since the previous poll.
    pub gusts: Vec<WindAxis>,
}

impl Default for EmitterSettings {
    fn default() -> Self {
        Self {
            particle_count: 50,
            emitter_position: Vec3::new(0.0, 60.0, 0.0),
            // Spawns sit 40 units above the emitter; anything lower than that
            // respawns every particle on every frame.
            height_threshold: 250.0,
            use_sorting: false,
            use_rotation: false,
            wind_x_factor: 5.1,
            wind_z_factor: 1.1,
            gusts: Vec::new(),
        }
    }
}

impl EmitterSettings {
    /// Builder: set the target count.
    pub fn with_count(mut self, particle_count: usize) -> Self {
        self.particle_count = particle_count;
        self
    }

    /// Builder: set the emitter position.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.emitter_position = position;
        self
    }

    /// Builder: set the respawn height threshold.
    pub fn with_height_threshold(mut self, height_threshold: f32) -> Self {
        self.height_threshold = height_threshold;
        self
    }
}

/// Source of emitter settings, polled at the top of every frame.
pub trait ConfigFeed {
    /// Settings for `tick`. Gusts returned here are applied exactly once.
    fn poll(&mut self, tick: SimTick) -> EmitterSettings;
}

impl<F> ConfigFeed for F
where
    F: FnMut(SimTick) -> EmitterSettings,
{
    fn poll(&mut self, tick: SimTick) -> EmitterSettings {
        self(tick)
    }
}

/// Feed that returns the same settings every frame.
#[derive(Debug, Clone, Default)]
pub struct FixedFeed {
    settings: EmitterSettings,
}

impl FixedFeed {
    /// Wrap fixed settings. Any gusts are dropped so they cannot repeat every frame.
    pub fn new(mut settings: EmitterSettings) -> Self {
        settings.gusts.clear();
        Self { settings }
    }
}

impl ConfigFeed for FixedFeed {
    fn poll(&mut self, _tick: SimTick) -> EmitterSettings {
        self.settings.clone()
    }
}
