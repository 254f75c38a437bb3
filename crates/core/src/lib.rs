#![warn(missing_docs)]
//! Core primitives shared across the workspace.

mod ground;

use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

pub use ground::{FlatGround, Ground};

/// Frame counter for the cooperative simulation loop (one tick per displayed frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

/// Helper to derive a reproducible RNG seeded by scene + emitter stream domains.
///
/// `stream` separates emitters that share a scene seed so their particles do not
/// draw identical random sequences.
pub fn scoped_rng(scene_seed: u64, stream: u64, tick: SimTick) -> StdRng {
    let seed = scene_seed ^ stream.rotate_left(32) ^ tick.0;
    StdRng::seed_from_u64(seed)
}
