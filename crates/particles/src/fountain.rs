//! Rain fountain: spray pulled toward the emitter's vertical axis, respawned at
//! the spawn box whenever it leaves the valid volume.

use crate::emitter::{FrameContext, Motion, ParticleEmitter};
use crate::particle::{Particle, Rotation};
use crate::settings::EmitterSettings;
use glam::Vec3;
use rand::rngs::StdRng;
use rand::Rng;

/// Half extents of the spawn box in X and Z; Y is a fixed offset above the emitter.
pub const SPAWN_HALF_EXTENT_X: f32 = 50.0;
/// Height of the spawn plane above the emitter.
pub const SPAWN_OFFSET_Y: f32 = 40.0;
/// Half extent of the spawn box in Z.
pub const SPAWN_HALF_EXTENT_Z: f32 = 23.0;

/// Life assigned to every freshly spawned drop.
pub const SPAWN_LIFE: f32 = 4.0;

/// Gravity applied as the initial acceleration.
pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.8, 0.0);

/// Drops this far below the emitter are recycled.
pub const MAX_FALL: f32 = 500.0;

/// Drops this far behind the emitter in X are recycled.
pub const MAX_DRIFT_X: f32 = 800.0;

/// Fountain motion rule.
#[derive(Debug, Clone, Copy, Default)]
pub struct FountainMotion;

/// A fountain emitter.
pub type FountainEmitter = ParticleEmitter<FountainMotion>;

impl FountainEmitter {
    /// Build a fountain emitter.
    pub fn fountain(settings: EmitterSettings, rng: StdRng) -> Self {
        ParticleEmitter::new(FountainMotion, settings, rng)
    }
}

impl FountainMotion {
    fn spawn_velocity(particle: &Particle, rng: &mut StdRng) -> Vec3 {
        Vec3::new(
            5.0 - rng.gen::<f32>() * particle.wind_x,
            -particle.drop_speed,
            5.0 - rng.gen::<f32>() * particle.wind_z,
        ) * particle.fall_speed
    }

    /// True when `position` lies in the spawn box of an emitter at `emitter`.
    pub fn in_spawn_box(position: Vec3, emitter: Vec3) -> bool {
        let offset = position - emitter;
        offset.x.abs() <= SPAWN_HALF_EXTENT_X
            && offset.z.abs() <= SPAWN_HALF_EXTENT_Z
            && (offset.y - SPAWN_OFFSET_Y).abs() <= 1e-3
    }

    /// Normalized progress from the emitter (1) to the height threshold (0).
    pub fn progress(y: f32, emitter_y: f32, height_threshold: f32) -> f32 {
        (height_threshold - y) / (height_threshold - emitter_y)
    }
}

impl Motion for FountainMotion {
    fn label(&self) -> &'static str {
        "fountain"
    }

    fn spawn(&mut self, _slot: usize, particle: &mut Particle, ctx: &FrameContext<'_>, rng: &mut StdRng) {
        particle.position = ctx.emitter_position
            + Vec3::new(
                rng.gen_range(-SPAWN_HALF_EXTENT_X..=SPAWN_HALF_EXTENT_X),
                SPAWN_OFFSET_Y,
                rng.gen_range(-SPAWN_HALF_EXTENT_Z..=SPAWN_HALF_EXTENT_Z),
            );
        particle.velocity = Self::spawn_velocity(particle, rng);
        particle.mass = rng.gen::<f32>() / 2.0 - rng.gen::<f32>() / 4.0;
        let axis = Vec3::new(
            1.0 - particle.wind_x * rng.gen::<f32>(),
            1.0 - 2.0 * rng.gen::<f32>(),
            1.0 - particle.wind_z * rng.gen::<f32>(),
        );
        particle.rotation = Rotation::new(
            axis.try_normalize().unwrap_or(Vec3::Y),
            rng.gen::<f32>() * 360.0,
        );
        particle.acceleration = GRAVITY;
        particle.life = SPAWN_LIFE;
    }

    fn needs_respawn(&self, particle: &Particle, ctx: &FrameContext<'_>) -> bool {
        let p = particle.position;
        let emitter = ctx.emitter_position;
        p.y < emitter.y - MAX_FALL
            || particle.life == 0.0
            || ctx.ground.is_below(p)
            || p.x < emitter.x - MAX_DRIFT_X
            || p.z < emitter.z
            || p.y > ctx.height_threshold
    }

    fn advance(&self, _slot: usize, particle: &mut Particle, ctx: &FrameContext<'_>) {
        // Pull toward the emitter's vertical axis rather than straight down.
        let offset = particle.position - ctx.emitter_position;
        let accel = Vec3::new(-offset.x, 0.0, -offset.z);
        let dt = ctx.dt;
        particle.acceleration = accel;
        particle.position += particle.velocity * dt + accel * (dt * dt) * 0.5;
        particle.velocity += accel * dt;
    }

    fn life(&self, particle: &Particle, ctx: &FrameContext<'_>) -> f32 {
        Self::progress(
            particle.position.y,
            ctx.emitter_position.y,
            ctx.height_threshold,
        )
    }

    fn reroll_velocity(&self, particle: &mut Particle, rng: &mut StdRng) {
        particle.velocity = Self::spawn_velocity(particle, rng);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Emitter;
    use crate::wind::WindAxis;
    use rainscape_core::{scoped_rng, FlatGround, SimTick};
    use rainscape_render::RecordingSink;

    fn ctx(ground: &FlatGround) -> FrameContext<'_> {
        FrameContext {
            time: 0.0,
            dt: 0.016,
            camera: Vec3::new(10.0, 10.0, 10.0),
            emitter_position: Vec3::new(0.0, 60.0, 0.0),
            height_threshold: 250.0,
            ground,
        }
    }

    #[test]
    fn spawn_lands_in_box_with_full_life() {
        let ground = FlatGround::default();
        let ctx = ctx(&ground);
        let mut rng = scoped_rng(1, 0, SimTick::ZERO);
        let mut motion = FountainMotion;
        for _ in 0..200 {
            let mut particle = Particle::default();
            motion.spawn(0, &mut particle, &ctx, &mut rng);
            assert_eq!(particle.life, SPAWN_LIFE);
            assert!(FountainMotion::in_spawn_box(particle.position, ctx.emitter_position));
            assert_eq!(particle.acceleration, GRAVITY);
            assert!(particle.rotation.axis.is_normalized());
            assert!((0.0..360.0).contains(&particle.rotation.angle_degrees));
            assert!(particle.velocity.y < 0.0);
        }
    }

    #[test]
    fn progress_hits_endpoints() {
        assert_eq!(FountainMotion::progress(250.0, 60.0, 250.0), 0.0);
        assert_eq!(FountainMotion::progress(60.0, 60.0, 250.0), 1.0);
    }

    #[test]
    fn respawn_conditions() {
        let ground = FlatGround::default();
        let ctx = ctx(&ground);
        let motion = FountainMotion;
        let alive = |position: Vec3| Particle {
            position,
            life: 0.5,
            ..Particle::default()
        };

        assert!(!motion.needs_respawn(&alive(Vec3::new(0.0, 100.0, 5.0)), &ctx));
        assert!(motion.needs_respawn(&alive(Vec3::new(0.0, -1.0, 5.0)), &ctx));
        assert!(motion.needs_respawn(&alive(Vec3::new(-801.0, 100.0, 5.0)), &ctx));
        assert!(motion.needs_respawn(&alive(Vec3::new(0.0, 100.0, -0.5)), &ctx));
        assert!(motion.needs_respawn(&alive(Vec3::new(0.0, 251.0, 5.0)), &ctx));

        let spent = Particle {
            life: 0.0,
            ..alive(Vec3::new(0.0, 100.0, 5.0))
        };
        assert!(motion.needs_respawn(&spent, &ctx));
    }

    #[test]
    fn integration_pulls_toward_emitter_axis() {
        let ground = FlatGround::default();
        let ctx = FrameContext {
            emitter_position: Vec3::new(30.0, 60.0, -12.0),
            ..ctx(&ground)
        };
        let mut particle = Particle {
            position: Vec3::new(40.0, 100.0, -8.0),
            velocity: Vec3::ZERO,
            life: 1.0,
            ..Particle::default()
        };
        FountainMotion.advance(0, &mut particle, &ctx);
        assert_eq!(particle.acceleration, Vec3::new(-10.0, 0.0, -4.0));
        assert!(particle.position.x < 40.0 && particle.position.x > 30.0);
        assert!(particle.position.z < -8.0 && particle.position.z > -12.0);
        assert_eq!(particle.position.y, 100.0);
        assert!((particle.velocity.x - (-10.0 * 0.016)).abs() < 1e-6);
        assert!((particle.velocity.z - (-4.0 * 0.016)).abs() < 1e-6);
    }

    #[test]
    fn x_gust_scales_factor_and_rerolls_velocity() {
        let settings = EmitterSettings::default().with_count(10);
        let mut emitter = FountainEmitter::fountain(settings, scoped_rng(9, 0, SimTick::ZERO));
        emitter.update(0.0, 0.016, Vec3::ZERO);
        emitter.gust(WindAxis::X);
        for particle in emitter.pool().active_slice() {
            assert!((particle.wind_x - 6.1).abs() < 1e-5);
            // 5 - r * 6.1 spans [-1.1, 5], times the fall speed.
            assert!(particle.velocity.x <= 25.0 && particle.velocity.x >= -30.5 - 1e-3);
        }
    }

    #[test]
    fn render_submits_single_instanced_draw() {
        let settings = EmitterSettings::default().with_count(30);
        let mut emitter = FountainEmitter::fountain(settings, scoped_rng(2, 0, SimTick::ZERO));
        let mut sink = RecordingSink::new();
        emitter.render(&mut sink);
        assert!(sink.draws().is_empty(), "nothing active yet");

        emitter.update(0.0, 0.016, Vec3::ZERO);
        emitter.render(&mut sink);
        let draws: Vec<_> = sink.draws_labeled("fountain").collect();
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].vertices, 30);
        assert_eq!(draws[0].streams, vec!["rotation".to_string(), "life".to_string()]);
    }
}
