//! Ground height queries used by particle collision checks.

use glam::Vec3;

/// Anything that can report the ground elevation under a world-space point.
pub trait Ground {
    /// Ground height below `position`, or `f32::MIN` when there is no ground there.
    fn height_at(&self, position: Vec3) -> f32;

    /// True when `position` lies below the ground surface.
    fn is_below(&self, position: Vec3) -> bool {
        position.y < self.height_at(position)
    }
}

/// Infinite horizontal plane at a fixed elevation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatGround {
    /// Elevation of the plane.
    pub elevation: f32,
}

impl Default for FlatGround {
    fn default() -> Self {
        Self { elevation: 0.0 }
    }
}

impl Ground for FlatGround {
    fn height_at(&self, _position: Vec3) -> f32 {
        self.elevation
    }
}
