//! Per-particle simulation state.

use glam::{Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Default Y drop speed of a fresh raindrop.
pub const DEFAULT_DROP_SPEED: f32 = 25.0;

/// Default multiplier applied to the whole spawn velocity.
pub const DEFAULT_FALL_SPEED: f32 = 5.0;

/// Axis + angle rotation of a particle's quad.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rotation {
    /// Unit rotation axis.
    pub axis: Vec3,
    /// Angle in degrees.
    pub angle_degrees: f32,
}

impl Rotation {
    /// No rotation (axis +Y, 0°).
    pub const IDENTITY: Self = Self {
        axis: Vec3::Y,
        angle_degrees: 0.0,
    };

    /// Build from an axis and an angle in degrees.
    pub fn new(axis: Vec3, angle_degrees: f32) -> Self {
        Self {
            axis,
            angle_degrees,
        }
    }

    /// Packed `(axis.x, axis.y, axis.z, angle)` as uploaded to the renderer.
    pub fn packed(&self) -> Vec4 {
        self.axis.extend(self.angle_degrees)
    }

    /// Equivalent quaternion.
    pub fn to_quat(&self) -> Quat {
        Quat::from_axis_angle(self.axis, self.angle_degrees.to_radians())
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// One simulated element of an emitter's pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// World-space position.
    pub position: Vec3,
    /// World-space velocity.
    pub velocity: Vec3,
    /// Acceleration applied by the last integration step.
    pub acceleration: Vec3,
    /// Randomized at spawn; not used by any motion rule yet.
    pub mass: f32,
    /// Normalized progress; `<= 0` means the particle is spent.
    pub life: f32,
    /// Billboard orientation.
    pub rotation: Rotation,
    /// Horizontal X wind bias. Survives respawn.
    pub wind_x: f32,
    /// Horizontal Z wind bias. Survives respawn.
    pub wind_z: f32,
    /// Multiplier on the spawn velocity.
    pub fall_speed: f32,
    /// Downward speed before `fall_speed` is applied.
    pub drop_speed: f32,
    /// Distance to the camera at the last update.
    pub distance_to_camera: f32,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            mass: 0.0,
            life: 0.0,
            rotation: Rotation::IDENTITY,
            wind_x: 1.0,
            wind_z: 1.0,
            fall_speed: DEFAULT_FALL_SPEED,
            drop_speed: DEFAULT_DROP_SPEED,
            distance_to_camera: 0.0,
        }
    }
}

impl Particle {
    /// True when the particle's life is exhausted.
    pub fn is_spent(&self) -> bool {
        self.life <= 0.0
    }
}
