//! Headless scene: a fountain, an orbiting cloud and an optional terrain,
//! stepped at a fixed delta against a recording sink.

use crate::config::{Keyframe, RunConfig, SceneConfig};
use glam::Mat4;
use rainscape_core::{scoped_rng, Ground, SimTick};
use rainscape_particles::{
    ConfigFeed, Emitter, EmitterSettings, FountainEmitter, OrbitEmitter, OrbitMotion,
    ParticleEmitter, UpdateStats,
};
use rainscape_render::{DrawRecord, RecordingSink};
use rainscape_terrain::Terrain;
use rainscape_testkit::{EmitterMetrics, RunReport};
use serde::Serialize;
use std::rc::Rc;
use tracing::{debug, info, warn};

const FOUNTAIN_STREAM: u64 = 1;
const ORBIT_STREAM: u64 = 2;

/// Replays slider keyframes on top of base settings. Gusts are reported once.
#[derive(Debug, Clone)]
pub struct ScriptedFeed {
    current: EmitterSettings,
    keyframes: Vec<Keyframe>,
    next: usize,
}

impl ScriptedFeed {
    pub fn new(base: EmitterSettings, mut keyframes: Vec<Keyframe>) -> Self {
        keyframes.sort_by_key(|keyframe| keyframe.frame);
        let mut current = base;
        current.gusts.clear();
        Self {
            current,
            keyframes,
            next: 0,
        }
    }
}

impl ConfigFeed for ScriptedFeed {
    fn poll(&mut self, tick: SimTick) -> EmitterSettings {
        self.current.gusts.clear();
        while let Some(keyframe) = self.keyframes.get(self.next) {
            if keyframe.frame > tick.0 {
                break;
            }
            debug!(frame = keyframe.frame, "keyframe applied");
            keyframe.apply(&mut self.current);
            self.next += 1;
        }
        self.current.clone()
    }
}

/// Counters for one emitter in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmitterFrame {
    pub active: usize,
    pub spawned: usize,
    pub respawned: usize,
}

impl From<UpdateStats> for EmitterFrame {
    fn from(stats: UpdateStats) -> Self {
        Self {
            active: stats.active,
            spawned: stats.spawned,
            respawned: stats.respawned,
        }
    }
}

/// What happened in one frame; written to the frame log.
#[derive(Debug, Clone, Serialize)]
pub struct FrameSummary {
    pub frame: u64,
    pub time: f32,
    pub paused: bool,
    pub fountain: Option<EmitterFrame>,
    pub orbit: Option<EmitterFrame>,
    pub draws: Vec<DrawRecord>,
}

struct FountainSlot {
    emitter: FountainEmitter,
    feed: ScriptedFeed,
    metrics: EmitterMetrics,
}

struct OrbitSlot {
    emitter: OrbitEmitter,
    metrics: EmitterMetrics,
}

pub struct Scene {
    run: RunConfig,
    tick: SimTick,
    time: f32,
    fountain: Option<FountainSlot>,
    orbit: Option<OrbitSlot>,
    terrain: Rc<Terrain>,
    render_normals: bool,
    sink: RecordingSink,
    draw_calls: usize,
}

impl Scene {
    pub fn build(config: &SceneConfig) -> Self {
        let run = config.run.clone();

        let mut terrain = Terrain::new(config.terrain.scale)
            .with_slope_blend(config.terrain.slope_blend);
        if let Some(path) = &config.terrain.heightmap {
            // A bad heightmap leaves the terrain unloaded; the scene still runs.
            if let Err(err) = terrain.load_heightmap(
                path,
                config.terrain.bits_per_pixel,
                config.terrain.width,
                config.terrain.height,
            ) {
                warn!(path = %path.display(), %err, "terrain disabled");
            }
        }
        terrain.set_placement(Mat4::from_translation(config.terrain.translation));
        let terrain = Rc::new(terrain);

        let fountain = config.fountain.enabled.then(|| {
            let feed = ScriptedFeed::new(
                config.fountain.settings.clone(),
                config.fountain.keyframes.clone(),
            );
            let mut emitter = FountainEmitter::fountain(
                EmitterSettings {
                    gusts: Vec::new(),
                    ..config.fountain.settings.clone()
                },
                scoped_rng(run.seed, FOUNTAIN_STREAM, SimTick::ZERO),
            )
            .with_max_particles(config.fountain.max_particles);
            if config.terrain.collide && terrain.is_loaded() {
                let ground: Rc<dyn Ground> = terrain.clone();
                emitter = emitter.with_ground(ground);
            }
            FountainSlot {
                emitter,
                feed,
                metrics: EmitterMetrics::new("fountain"),
            }
        });

        let orbit = config.orbit.enabled.then(|| {
            let settings = EmitterSettings::default()
                .with_count(config.orbit.particle_count)
                .with_position(config.orbit.position);
            let motion = OrbitMotion::new(config.orbit.radius, config.orbit.angular_speed)
                .with_eccentricity(config.orbit.eccentricity)
                .with_spread(config.orbit.spread);
            OrbitSlot {
                emitter: ParticleEmitter::new(
                    motion,
                    settings,
                    scoped_rng(run.seed, ORBIT_STREAM, SimTick::ZERO),
                ),
                metrics: EmitterMetrics::new("orbit"),
            }
        });

        info!(
            fountain = fountain.is_some(),
            orbit = orbit.is_some(),
            terrain = terrain.is_loaded(),
            frames = run.frames,
            "scene built"
        );

        Self {
            run,
            tick: SimTick::ZERO,
            time: 0.0,
            fountain,
            orbit,
            terrain,
            render_normals: config.terrain.render_normals,
            sink: RecordingSink::new(),
            draw_calls: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.run.frames
    }

    /// Run one frame: poll settings, update every emitter, then render everything.
    pub fn step(&mut self) -> FrameSummary {
        let frame = self.tick.0;
        let paused = self.run.is_paused(frame);
        let (time, dt, camera) = (self.time, self.run.dt, self.run.camera);

        let mut fountain_stats = None;
        let mut orbit_stats = None;
        if !paused {
            if let Some(slot) = &mut self.fountain {
                let settings = slot.feed.poll(self.tick);
                slot.emitter.configure(&settings);
                let stats = slot.emitter.update(time, dt, camera);
                slot.metrics.record(stats.active, stats.spawned, stats.respawned);
                fountain_stats = Some(stats.into());
            }
            if let Some(slot) = &mut self.orbit {
                let stats = slot.emitter.update(time, dt, camera);
                slot.metrics.record(stats.active, stats.spawned, stats.respawned);
                orbit_stats = Some(stats.into());
            }
            self.time += dt;
        }

        self.sink.clear();
        self.terrain.render(&mut self.sink);
        if self.render_normals {
            self.terrain.render_normals(&mut self.sink);
        }
        if let Some(slot) = &mut self.fountain {
            slot.emitter.render(&mut self.sink);
        }
        if let Some(slot) = &mut self.orbit {
            slot.emitter.render(&mut self.sink);
        }
        self.draw_calls += self.sink.draws().len();

        let summary = FrameSummary {
            frame,
            time,
            paused,
            fountain: fountain_stats,
            orbit: orbit_stats,
            draws: self.sink.draws().to_vec(),
        };
        debug!(
            frame,
            paused,
            fountain = ?summary.fountain,
            orbit = ?summary.orbit,
            draws = summary.draws.len(),
            "frame stepped"
        );
        self.tick = self.tick.advance(1);
        summary
    }

    /// Summary of everything stepped so far.
    pub fn report(&self, name: &str) -> RunReport {
        let mut report = RunReport::new(name);
        report.frames = self.tick.0;
        report.draw_calls = self.draw_calls;
        report.terrain_loaded = self.terrain.is_loaded();
        if let Some(slot) = &self.fountain {
            report.emitters.push(slot.metrics.clone());
        }
        if let Some(slot) = &self.orbit {
            report.emitters.push(slot.metrics.clone());
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PauseSpan;
    use rainscape_particles::WindAxis;

    fn small_scene() -> SceneConfig {
        let mut config = SceneConfig::default();
        config.run.frames = 10;
        config.fountain.settings.particle_count = 120;
        config
    }

    #[test]
    fn feed_applies_keyframes_in_order_and_gusts_once() {
        let keyframes = vec![
            Keyframe {
                frame: 4,
                gusts: vec![WindAxis::X],
                ..Keyframe::default()
            },
            Keyframe {
                frame: 2,
                particle_count: Some(7),
                ..Keyframe::default()
            },
        ];
        let mut feed = ScriptedFeed::new(EmitterSettings::default(), keyframes);
        assert_eq!(feed.poll(SimTick(0)).particle_count, 50);
        assert_eq!(feed.poll(SimTick(3)).particle_count, 7);
        assert_eq!(feed.poll(SimTick(4)).gusts, vec![WindAxis::X]);
        let later = feed.poll(SimTick(5));
        assert!(later.gusts.is_empty());
        assert_eq!(later.particle_count, 7);
    }

    #[test]
    fn scene_grows_and_renders_both_emitters() {
        let mut scene = Scene::build(&small_scene());
        let first = scene.step();
        assert_eq!(first.fountain.map(|f| f.active), Some(50));
        assert_eq!(first.orbit.map(|o| o.active), Some(10));
        assert_eq!(first.draws.len(), 2);

        scene.step();
        let third = scene.step();
        assert_eq!(third.fountain.map(|f| f.active), Some(120));

        let report = scene.report("unit");
        assert_eq!(report.frames, 3);
        assert_eq!(report.draw_calls, 6);
        assert!(!report.terrain_loaded);
        assert_eq!(report.emitters[0].peak_active, 120);
    }

    #[test]
    fn paused_frames_skip_updates_but_still_render() {
        let mut config = small_scene();
        config.run.pause.push(PauseSpan { start: 1, end: 3 });
        let mut scene = Scene::build(&config);
        scene.step();
        let paused = scene.step();
        assert!(paused.paused);
        assert!(paused.fountain.is_none());
        assert_eq!(paused.draws.len(), 2);
        scene.step();
        let resumed = scene.step();
        assert_eq!(resumed.fountain.map(|f| f.active), Some(100));
        assert!((resumed.time - config.run.dt).abs() < 1e-6);
    }

    #[test]
    fn missing_heightmap_leaves_terrain_unloaded() {
        let mut config = small_scene();
        config.terrain.heightmap = Some("/no/such/heightmap.raw".into());
        let mut scene = Scene::build(&config);
        let frame = scene.step();
        assert!(frame.draws.iter().all(|d| d.label != "terrain"));
        assert!(!scene.report("unit").terrain_loaded);
    }
}
