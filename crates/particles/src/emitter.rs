//! Emitter capability set and the pool-backed emitter shared by every variant.
//!
//! An emitter is a [`ParticlePool`] plus a pluggable [`Motion`] rule. The pool
//! machinery (batched growth, immediate shrink, respawn-before-integrate
//! ordering, billboard refresh, render streams) lives here; a motion only says
//! how a particle spawns, when it must respawn and how it moves.

use crate::billboard::billboard_rotation;
use crate::particle::{Particle, Rotation};
use crate::pool::{ParticlePool, DEFAULT_MAX_PARTICLES, GROWTH_BATCH};
use crate::settings::EmitterSettings;
use crate::wind::{apply_gust, WindAxis};
use glam::{Vec3, Vec4};
use rainscape_core::{FlatGround, Ground};
use rainscape_render::{AttributeStream, DrawCall, PrimitiveKind, RenderSink};
use rand::rngs::StdRng;
use std::rc::Rc;
use tracing::{debug, trace};

/// Everything a motion rule may read during one frame.
pub struct FrameContext<'a> {
    /// Absolute time in seconds.
    pub time: f32,
    /// Frame delta in seconds.
    pub dt: f32,
    /// Camera world position.
    pub camera: Vec3,
    /// Emitter world position.
    pub emitter_position: Vec3,
    /// Fountain respawn ceiling.
    pub height_threshold: f32,
    /// Ground used for collision checks.
    pub ground: &'a dyn Ground,
}

/// Force/respawn rule plugged into a [`ParticleEmitter`].
pub trait Motion {
    /// Label used for draw submissions and logs.
    fn label(&self) -> &'static str;

    /// (Re)initialize the particle in `slot`.
    fn spawn(&mut self, slot: usize, particle: &mut Particle, ctx: &FrameContext<'_>, rng: &mut StdRng);

    /// Whether the particle must be respawned before integrating this frame.
    fn needs_respawn(&self, particle: &Particle, ctx: &FrameContext<'_>) -> bool;

    /// Integrate one frame.
    fn advance(&self, slot: usize, particle: &mut Particle, ctx: &FrameContext<'_>);

    /// Life value after integration.
    fn life(&self, particle: &Particle, ctx: &FrameContext<'_>) -> f32;

    /// Re-roll the wind-dependent velocity after an X gust. Default: keep it.
    fn reroll_velocity(&self, _particle: &mut Particle, _rng: &mut StdRng) {}
}

/// Per-frame counters returned by [`Emitter::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Particles activated by growth this frame.
    pub spawned: usize,
    /// Particles respawned by their motion rule this frame.
    pub respawned: usize,
    /// Active particles after the update.
    pub active: usize,
}

/// The capability set shared by fountain and orbit emitters.
pub trait Emitter {
    /// Apply freshly polled settings (count target, position, toggles, gusts).
    fn configure(&mut self, settings: &EmitterSettings);

    /// Change the target particle count.
    fn resize(&mut self, count: usize);

    /// Advance the simulation by one frame.
    fn update(&mut self, time: f32, dt: f32, camera: Vec3) -> UpdateStats;

    /// Submit one instanced draw for all active particles.
    fn render(&mut self, sink: &mut dyn RenderSink);

    /// Raise a wind gust along `axis`.
    fn gust(&mut self, axis: WindAxis);

    /// Number of simulated particles.
    fn active_count(&self) -> usize;
}

#[derive(Debug, Default)]
struct ParticleStreams {
    order: Vec<usize>,
    positions: Vec<Vec3>,
    rotations: Vec<Vec4>,
    life: Vec<f32>,
}

/// Pool-backed emitter driven by a [`Motion`] rule.
pub struct ParticleEmitter<M> {
    motion: M,
    pool: ParticlePool,
    settings: EmitterSettings,
    ground: Rc<dyn Ground>,
    rng: StdRng,
    streams: ParticleStreams,
}

impl<M: Motion> ParticleEmitter<M> {
    /// Build an emitter with the default particle cap and flat ground at y = 0.
    pub fn new(motion: M, settings: EmitterSettings, rng: StdRng) -> Self {
        let mut pool = ParticlePool::new(DEFAULT_MAX_PARTICLES);
        pool.resize(settings.particle_count);
        Self {
            motion,
            pool,
            settings,
            ground: Rc::new(FlatGround::default()),
            rng,
            streams: ParticleStreams::default(),
        }
    }

    /// Builder: replace the hard particle cap.
    pub fn with_max_particles(mut self, max_particles: usize) -> Self {
        self.pool = ParticlePool::new(max_particles);
        self.pool.resize(self.settings.particle_count);
        self
    }

    /// Builder: collide against `ground` instead of the y = 0 plane.
    pub fn with_ground(mut self, ground: Rc<dyn Ground>) -> Self {
        self.ground = ground;
        self
    }

    /// The underlying pool.
    pub fn pool(&self) -> &ParticlePool {
        &self.pool
    }

    /// The motion rule.
    pub fn motion(&self) -> &M {
        &self.motion
    }

    /// Settings applied by the last [`Emitter::configure`].
    pub fn settings(&self) -> &EmitterSettings {
        &self.settings
    }

    fn fill_streams(&mut self, camera_order: bool) {
        let particles = self.pool.active_slice();
        let streams = &mut self.streams;
        streams.order.clear();
        streams.order.extend(0..particles.len());
        if camera_order {
            // Farthest first so alpha blending composites correctly.
            streams.order.sort_by(|&a, &b| {
                particles[b]
                    .distance_to_camera
                    .total_cmp(&particles[a].distance_to_camera)
            });
        }

        streams.positions.clear();
        streams.rotations.clear();
        streams.life.clear();
        for &slot in &streams.order {
            let particle = &particles[slot];
            streams.positions.push(particle.position);
            let rotation = if self.settings.use_rotation {
                particle.rotation
            } else {
                Rotation::IDENTITY
            };
            streams.rotations.push(rotation.packed());
            streams.life.push(particle.life);
        }
    }
}

impl<M: Motion> Emitter for ParticleEmitter<M> {
    fn configure(&mut self, settings: &EmitterSettings) {
        self.resize(settings.particle_count);
        self.settings = EmitterSettings {
            gusts: Vec::new(),
            ..settings.clone()
        };
        for &axis in &settings.gusts {
            self.gust(axis);
        }
    }

    fn resize(&mut self, count: usize) {
        self.pool.resize(count);
        self.settings.particle_count = count;
    }

    fn update(&mut self, time: f32, dt: f32, camera: Vec3) -> UpdateStats {
        let Self {
            motion,
            pool,
            settings,
            ground,
            rng,
            ..
        } = self;
        let ctx = FrameContext {
            time,
            dt,
            camera,
            emitter_position: settings.emitter_position,
            height_threshold: settings.height_threshold,
            ground: &**ground,
        };

        // Particles activated by growth keep their spawn state until next frame.
        let settled = pool.active();
        let spawned = pool.grow(GROWTH_BATCH, |slot, particle| {
            motion.spawn(slot, particle, &ctx, rng);
        });

        let mut respawned = 0;
        for (slot, particle) in pool.active_slice_mut().iter_mut().enumerate() {
            if slot < settled {
                if motion.needs_respawn(particle, &ctx) {
                    motion.spawn(slot, particle, &ctx, rng);
                    respawned += 1;
                } else {
                    motion.advance(slot, particle, &ctx);
                    particle.rotation = billboard_rotation(particle.position, camera);
                    particle.life = motion.life(particle, &ctx);
                }
            }
            particle.distance_to_camera = particle.position.distance(camera);
        }

        let stats = UpdateStats {
            spawned,
            respawned,
            active: pool.active(),
        };
        trace!(emitter = motion.label(), ?stats, "emitter updated");
        stats
    }

    fn render(&mut self, sink: &mut dyn RenderSink) {
        if self.pool.active() == 0 {
            return;
        }
        self.fill_streams(self.settings.use_sorting);
        let streams = &self.streams;
        sink.submit(
            DrawCall::new(self.motion.label(), PrimitiveKind::Billboards, &streams.positions)
                .with_attribute(AttributeStream::from_pod("rotation", 4, &streams.rotations))
                .with_attribute(AttributeStream::from_pod("life", 1, &streams.life)),
        );
    }

    fn gust(&mut self, axis: WindAxis) {
        let rate = match axis {
            WindAxis::X => self.settings.wind_x_factor,
            WindAxis::Z => self.settings.wind_z_factor,
        };
        let active = self.pool.active();
        let mut strongest: f32 = 0.0;
        for (slot, particle) in self.pool.slots_mut().iter_mut().enumerate() {
            strongest = strongest.max(apply_gust(particle, axis, rate));
            if axis == WindAxis::X && slot < active {
                self.motion.reroll_velocity(particle, &mut self.rng);
            }
        }
        debug!(
            emitter = self.motion.label(),
            ?axis,
            rate,
            factor = strongest,
            "wind gust applied"
        );
    }

    fn active_count(&self) -> usize {
        self.pool.active()
    }
}
