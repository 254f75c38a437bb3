//! Camera-facing orientation for particle quads.

use crate::particle::Rotation;
use glam::Vec3;

/// Direction a particle quad faces before any rotation.
pub const QUAD_FACING: Vec3 = Vec3::Z;

/// Axis used when the facing direction gives no usable cross product.
pub const FALLBACK_AXIS: Vec3 = Vec3::Y;

/// Rotation that turns a quad facing [`QUAD_FACING`] toward `camera_position`.
///
/// A camera sitting exactly on the particle, or straight ahead of the quad,
/// yields `(FALLBACK_AXIS, 0°)`; a camera straight behind it yields
/// `(FALLBACK_AXIS, 180°)`. The result is never NaN.
pub fn billboard_rotation(particle_position: Vec3, camera_position: Vec3) -> Rotation {
    let Some(to_camera) = (camera_position - particle_position).try_normalize() else {
        return Rotation::IDENTITY;
    };

    let cos_angle = QUAD_FACING.dot(to_camera).clamp(-1.0, 1.0);
    match QUAD_FACING.cross(to_camera).try_normalize() {
        Some(axis) => Rotation::new(axis, cos_angle.acos().to_degrees()),
        None if cos_angle < 0.0 => Rotation::new(FALLBACK_AXIS, 180.0),
        None => Rotation::IDENTITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coincident_camera_falls_back() {
        let p = Vec3::new(4.0, 5.0, 6.0);
        let rotation = billboard_rotation(p, p);
        assert_eq!(rotation, Rotation::IDENTITY);
    }

    #[test]
    fn camera_ahead_needs_no_rotation() {
        let rotation = billboard_rotation(Vec3::ZERO, Vec3::new(0.0, 0.0, 25.0));
        assert!(rotation.angle_degrees.abs() < 1e-4);
        assert!(rotation.axis.is_normalized());
    }

    #[test]
    fn camera_behind_flips_half_turn() {
        let rotation = billboard_rotation(Vec3::ZERO, Vec3::new(0.0, 0.0, -3.0));
        assert_eq!(rotation.axis, FALLBACK_AXIS);
        assert!((rotation.angle_degrees - 180.0).abs() < 1e-4);
    }

    #[test]
    fn rotated_facing_points_at_camera() {
        let particle = Vec3::new(1.0, 2.0, 3.0);
        let camera = Vec3::new(10.0, 10.0, 10.0);
        let rotation = billboard_rotation(particle, camera);
        let facing = rotation.to_quat() * QUAD_FACING;
        let expected = (camera - particle).normalize();
        assert!((facing - expected).length() < 1e-4);
    }

    #[test]
    fn side_camera_is_quarter_turn() {
        let rotation = billboard_rotation(Vec3::ZERO, Vec3::X * 7.0);
        assert!((rotation.angle_degrees - 90.0).abs() < 1e-3);
        assert!((rotation.axis - Vec3::Y).length() < 1e-5);
    }
}
