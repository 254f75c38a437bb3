use anyhow::Result;
use glam::Vec3;
use rainscape_particles::{EmitterSettings, WindAxis, DEFAULT_MAX_PARTICLES};
use rainscape_terrain::TerrainScale;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};
use tracing::warn;

pub const DEFAULT_SCENE_PATH: &str = "config/scene.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SceneConfig {
    pub run: RunConfig,
    pub fountain: FountainConfig,
    pub orbit: OrbitConfig,
    pub terrain: TerrainConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Frames to simulate.
    pub frames: u64,
    /// Fixed frame delta in seconds.
    pub dt: f32,
    pub seed: u64,
    pub camera: Vec3,
    /// Half-open `[start, end)` frame spans during which emitters are frozen.
    pub pause: Vec<PauseSpan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PauseSpan {
    pub start: u64,
    pub end: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            dt: 1.0 / 60.0,
            seed: 0x5eed,
            camera: Vec3::new(10.0, 10.0, 10.0),
            pause: Vec::new(),
        }
    }
}

impl RunConfig {
    pub fn is_paused(&self, frame: u64) -> bool {
        self.pause
            .iter()
            .any(|span| (span.start..span.end).contains(&frame))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FountainConfig {
    pub enabled: bool,
    pub max_particles: usize,
    pub settings: EmitterSettings,
    /// Slider changes applied from their frame onward, sorted by frame on load.
    pub keyframes: Vec<Keyframe>,
}

impl Default for FountainConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_particles: DEFAULT_MAX_PARTICLES,
            settings: EmitterSettings::default(),
            keyframes: Vec::new(),
        }
    }
}

/// A scripted slider change. Unset fields keep their previous value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Keyframe {
    pub frame: u64,
    pub particle_count: Option<usize>,
    pub emitter_position: Option<Vec3>,
    pub height_threshold: Option<f32>,
    pub use_sorting: Option<bool>,
    pub use_rotation: Option<bool>,
    pub gusts: Vec<WindAxis>,
}

impl Keyframe {
    pub fn apply(&self, settings: &mut EmitterSettings) {
        if let Some(count) = self.particle_count {
            settings.particle_count = count;
        }
        if let Some(position) = self.emitter_position {
            settings.emitter_position = position;
        }
        if let Some(threshold) = self.height_threshold {
            settings.height_threshold = threshold;
        }
        if let Some(sorting) = self.use_sorting {
            settings.use_sorting = sorting;
        }
        if let Some(rotation) = self.use_rotation {
            settings.use_rotation = rotation;
        }
        settings.gusts.extend_from_slice(&self.gusts);
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OrbitConfig {
    pub enabled: bool,
    pub particle_count: usize,
    pub position: Vec3,
    pub radius: f32,
    /// Radians per second.
    pub angular_speed: f32,
    pub eccentricity: f32,
    pub spread: f32,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            particle_count: 10,
            position: Vec3::new(0.0, 30.0, 0.0),
            radius: 5.0,
            angular_speed: 6.0,
            eccentricity: 0.0,
            spread: 0.1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Raw heightmap; no terrain is loaded when unset.
    pub heightmap: Option<PathBuf>,
    pub bits_per_pixel: u32,
    pub width: u32,
    pub height: u32,
    pub translation: Vec3,
    pub slope_blend: bool,
    /// Let the fountain collide with the terrain instead of the y = 0 plane.
    pub collide: bool,
    pub render_normals: bool,
    pub scale: TerrainScale,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            heightmap: None,
            bits_per_pixel: 16,
            width: 257,
            height: 257,
            translation: Vec3::ZERO,
            slope_blend: false,
            collide: true,
            render_normals: false,
            scale: TerrainScale::default(),
        }
    }
}

impl SceneConfig {
    /// Load the scene from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_SCENE_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        let mut config = match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<SceneConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    SceneConfig::default()
                }
            },
            Err(err) => {
                if path != Path::new(DEFAULT_SCENE_PATH)
                    || err.kind() != std::io::ErrorKind::NotFound
                {
                    warn!("Failed to read {}: {err}. Using defaults", path.display());
                } else {
                    warn!("Scene config not found at {}. Using defaults", path.display());
                }
                SceneConfig::default()
            }
        };
        config.fountain.keyframes.sort_by_key(|keyframe| keyframe.frame);
        config
    }

    /// Save the scene to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}
