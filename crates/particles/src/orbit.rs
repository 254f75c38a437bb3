//! Orbiting cloud: particles travel a closed elliptical path around the emitter
//! and never hit a boundary.

use crate::emitter::{FrameContext, Motion, ParticleEmitter};
use crate::particle::{Particle, Rotation};
use crate::settings::EmitterSettings;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::Rng;
use std::f32::consts::TAU;

/// Life held by every orbiting particle.
pub const ORBIT_LIFE: f32 = 1.0;

#[derive(Debug, Clone, Copy, Default)]
struct OrbitLane {
    phase: f32,
    radius_scale: f32,
    height: f32,
}

/// Orbital motion rule.
#[derive(Debug, Clone)]
pub struct OrbitMotion {
    radius: f32,
    angular_speed: f32,
    eccentricity: f32,
    spread: f32,
    lanes: Vec<OrbitLane>,
}

/// An orbit emitter.
pub type OrbitEmitter = ParticleEmitter<OrbitMotion>;

impl OrbitEmitter {
    /// Build an orbit emitter circling at `radius` with `angular_speed` rad/s.
    pub fn orbit(settings: EmitterSettings, radius: f32, angular_speed: f32, rng: StdRng) -> Self {
        ParticleEmitter::new(OrbitMotion::new(radius, angular_speed), settings, rng)
    }
}

impl OrbitMotion {
    /// Circular orbit with a 10% radius spread.
    pub fn new(radius: f32, angular_speed: f32) -> Self {
        Self {
            radius,
            angular_speed,
            eccentricity: 0.0,
            spread: 0.1,
            lanes: Vec::new(),
        }
    }

    /// Builder: flatten the orbit along Z. `0` is a circle, values near `1` a thin ellipse.
    pub fn with_eccentricity(mut self, eccentricity: f32) -> Self {
        self.eccentricity = eccentricity.clamp(0.0, 0.99);
        self
    }

    /// Builder: relative radius jitter per particle.
    pub fn with_spread(mut self, spread: f32) -> Self {
        self.spread = spread.max(0.0);
        self
    }

    /// Nominal orbit radius.
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Angular speed in radians per second.
    pub fn angular_speed(&self) -> f32 {
        self.angular_speed
    }

    fn semi_axes(&self, lane: &OrbitLane) -> (f32, f32) {
        let rx = self.radius * lane.radius_scale;
        let rz = rx * (1.0 - self.eccentricity * self.eccentricity).sqrt();
        (rx, rz)
    }

    fn place(&self, lane: &OrbitLane, particle: &mut Particle, ctx: &FrameContext<'_>) {
        let (rx, rz) = self.semi_axes(lane);
        let w = self.angular_speed;
        let (sin, cos) = (lane.phase + w * ctx.time).sin_cos();
        particle.position = ctx.emitter_position + Vec3::new(rx * cos, lane.height, rz * sin);
        particle.velocity = Vec3::new(-rx * sin, 0.0, rz * cos) * w;
        particle.acceleration = Vec3::new(-rx * cos, 0.0, -rz * sin) * (w * w);
    }
}

impl Motion for OrbitMotion {
    fn label(&self) -> &'static str {
        "orbit"
    }

    fn spawn(&mut self, slot: usize, particle: &mut Particle, ctx: &FrameContext<'_>, rng: &mut StdRng) {
        if slot >= self.lanes.len() {
            self.lanes.resize(slot + 1, OrbitLane::default());
        }
        let lane = OrbitLane {
            phase: rng.gen_range(0.0..TAU),
            radius_scale: 1.0 + rng.gen_range(-1.0..=1.0) * self.spread,
            height: rng.gen_range(-1.0..=1.0) * self.radius * self.spread,
        };
        self.lanes[slot] = lane;
        self.place(&lane, particle, ctx);
        particle.mass = rng.gen::<f32>() / 2.0 - rng.gen::<f32>() / 4.0;
        particle.rotation = Rotation::new(Vec3::Y, rng.gen::<f32>() * 360.0);
        particle.life = ORBIT_LIFE;
    }

    fn needs_respawn(&self, particle: &Particle, _ctx: &FrameContext<'_>) -> bool {
        particle.life == 0.0
    }

    fn advance(&self, slot: usize, particle: &mut Particle, ctx: &FrameContext<'_>) {
        // Every active slot went through spawn, so it has a lane.
        let lane = self.lanes[slot];
        self.place(&lane, particle, ctx);
    }

    fn life(&self, _particle: &Particle, _ctx: &FrameContext<'_>) -> f32 {
        ORBIT_LIFE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Emitter;
    use rainscape_core::{scoped_rng, SimTick};

    fn emitter(count: usize) -> OrbitEmitter {
        let settings = EmitterSettings::default()
            .with_count(count)
            .with_position(Vec3::new(0.0, 30.0, 0.0));
        OrbitEmitter::orbit(settings, 5.0, 6.0, scoped_rng(4, 1, SimTick::ZERO))
    }

    #[test]
    fn particles_stay_on_their_orbit() {
        let mut orbit = emitter(10);
        let center = Vec3::new(0.0, 30.0, 0.0);
        let mut time = 0.0;
        for _ in 0..120 {
            orbit.update(time, 1.0 / 60.0, Vec3::new(20.0, 20.0, 20.0));
            time += 1.0 / 60.0;
            for particle in orbit.pool().active_slice() {
                let offset = particle.position - center;
                let horizontal = Vec3::new(offset.x, 0.0, offset.z).length();
                assert!(horizontal >= 5.0 * 0.9 - 1e-3 && horizontal <= 5.0 * 1.1 + 1e-3);
                assert!(offset.y.abs() <= 0.5 + 1e-3);
                assert_eq!(particle.life, ORBIT_LIFE);
            }
        }
        assert_eq!(orbit.active_count(), 10);
        assert_eq!(orbit.motion().radius(), 5.0);
        assert_eq!(orbit.motion().angular_speed(), 6.0);
    }

    #[test]
    fn velocity_is_tangent() {
        let mut orbit = emitter(3);
        orbit.update(0.0, 0.016, Vec3::ZERO);
        orbit.update(0.5, 0.016, Vec3::ZERO);
        for particle in orbit.pool().active_slice() {
            let radial = particle.position - Vec3::new(0.0, 30.0, 0.0);
            let radial = Vec3::new(radial.x, 0.0, radial.z);
            assert!(radial.dot(particle.velocity).abs() < 1e-2);
        }
    }

    #[test]
    fn eccentric_orbit_is_narrower_in_z() {
        let motion = OrbitMotion::new(10.0, 1.0).with_eccentricity(0.8).with_spread(0.0);
        let lane = OrbitLane {
            phase: 0.0,
            radius_scale: 1.0,
            height: 0.0,
        };
        let (rx, rz) = motion.semi_axes(&lane);
        assert_eq!(rx, 10.0);
        assert!((rz - 6.0).abs() < 1e-4);
    }
}
