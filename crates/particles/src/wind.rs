//! Wind gusts that bias particle drift.
//!
//! Every gust grows the affected factor multiplicatively (`f += f * rate`) with
//! no decay and no cap, so repeated gusts compound.

use crate::particle::Particle;
use serde::{Deserialize, Serialize};

/// Horizontal axis a gust pushes along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindAxis {
    /// Along world X.
    X,
    /// Along world Z.
    Z,
}

/// Grow a particle's factor for `axis` by `rate`. Returns the new factor.
pub fn apply_gust(particle: &mut Particle, axis: WindAxis, rate: f32) -> f32 {
    let factor = match axis {
        WindAxis::X => &mut particle.wind_x,
        WindAxis::Z => &mut particle.wind_z,
    };
    *factor += *factor * rate;
    *factor
}
