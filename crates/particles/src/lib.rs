#![warn(missing_docs)]
//! Pool-backed rain and orbit particle emitters.
//!
//! Each emitter owns a [`ParticlePool`] and a [`Motion`] rule. Per frame the
//! host polls a [`ConfigFeed`], hands the settings to [`Emitter::configure`],
//! then calls [`Emitter::update`] and [`Emitter::render`].

mod billboard;
mod emitter;
mod fountain;
mod orbit;
mod particle;
mod pool;
mod settings;
mod wind;

pub use billboard::{billboard_rotation, FALLBACK_AXIS, QUAD_FACING};
pub use emitter::{Emitter, FrameContext, Motion, ParticleEmitter, UpdateStats};
pub use fountain::{
    FountainEmitter, FountainMotion, GRAVITY, MAX_DRIFT_X, MAX_FALL, SPAWN_HALF_EXTENT_X,
    SPAWN_HALF_EXTENT_Z, SPAWN_LIFE, SPAWN_OFFSET_Y,
};
pub use orbit::{OrbitEmitter, OrbitMotion, ORBIT_LIFE};
pub use particle::{Particle, Rotation, DEFAULT_DROP_SPEED, DEFAULT_FALL_SPEED};
pub use pool::{ParticlePool, PoolError, DEFAULT_MAX_PARTICLES, GROWTH_BATCH};
pub use settings::{ConfigFeed, EmitterSettings, FixedFeed};
pub use wind::{apply_gust, WindAxis};
