//! Fixed-capacity particle arena with a logical active length.
//!
//! Slots are never freed. Shrinking only lowers the active count; the slots
//! past it keep their state (wind factors included) and are re-initialized in
//! place when growth reaches them again.

use crate::particle::Particle;
use thiserror::Error;

/// Maximum number of new particles spawned by a single [`ParticlePool::grow`] call
/// issued from an emitter update.
pub const GROWTH_BATCH: usize = 50;

/// Default hard cap on pool size.
pub const DEFAULT_MAX_PARTICLES: usize = 20_000;

/// Pool access errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// Index at or past the active count.
    #[error("particle index {index} out of range (active: {active})")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Active count at the time of the request.
        active: usize,
    },
}

/// Arena of particles plus the active/target counts.
#[derive(Debug, Clone)]
pub struct ParticlePool {
    slots: Vec<Particle>,
    active: usize,
    target: usize,
    max_particles: usize,
}

impl ParticlePool {
    /// Create an empty pool that will never hold more than `max_particles`.
    pub fn new(max_particles: usize) -> Self {
        Self {
            slots: Vec::new(),
            active: 0,
            target: 0,
            max_particles,
        }
    }

    /// Set the target count (clamped to the hard cap).
    ///
    /// Shrinking takes effect immediately; growth happens through [`ParticlePool::grow`].
    pub fn resize(&mut self, target: usize) {
        self.target = target.min(self.max_particles);
        if self.target < self.active {
            self.active = self.target;
        }
    }

    /// Activate up to `batch` more particles toward the target, calling `spawn`
    /// on each newly activated slot. Returns how many were spawned.
    pub fn grow<F>(&mut self, batch: usize, mut spawn: F) -> usize
    where
        F: FnMut(usize, &mut Particle),
    {
        let count = self.target.saturating_sub(self.active).min(batch);
        for slot in self.active..self.active + count {
            if slot == self.slots.len() {
                self.slots.push(Particle::default());
            }
            spawn(slot, &mut self.slots[slot]);
        }
        self.active += count;
        count
    }

    /// Number of simulated particles.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Requested particle count.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Hard cap.
    pub fn max_particles(&self) -> usize {
        self.max_particles
    }

    /// Number of slots ever allocated (active or dormant).
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }

    /// True once growth has caught up with the target.
    pub fn is_settled(&self) -> bool {
        self.active == self.target
    }

    /// Access an active particle.
    ///
    /// # Panics
    /// Panics if `index >= active()`; that is a caller bug.
    pub fn get(&self, index: usize) -> &Particle {
        assert!(
            index < self.active,
            "particle index {index} out of range (active: {})",
            self.active
        );
        &self.slots[index]
    }

    /// Mutable access to an active particle.
    ///
    /// # Panics
    /// Panics if `index >= active()`.
    pub fn get_mut(&mut self, index: usize) -> &mut Particle {
        assert!(
            index < self.active,
            "particle index {index} out of range (active: {})",
            self.active
        );
        &mut self.slots[index]
    }

    /// Checked access to an active particle.
    pub fn try_get(&self, index: usize) -> Result<&Particle, PoolError> {
        if index < self.active {
            Ok(&self.slots[index])
        } else {
            Err(PoolError::OutOfRange {
                index,
                active: self.active,
            })
        }
    }

    /// Active particles in slot order.
    pub fn active_slice(&self) -> &[Particle] {
        &self.slots[..self.active]
    }

    /// Mutable active particles in slot order.
    pub fn active_slice_mut(&mut self) -> &mut [Particle] {
        &mut self.slots[..self.active]
    }

    /// Every allocated slot, dormant ones included.
    pub fn slots_mut(&mut self) -> &mut [Particle] {
        &mut self.slots
    }
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PARTICLES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mark_alive(_: usize, particle: &mut Particle) {
        particle.life = 4.0;
    }

    #[test]
    fn growth_is_batched() {
        let mut pool = ParticlePool::new(1000);
        pool.resize(120);
        assert_eq!(pool.grow(GROWTH_BATCH, mark_alive), 50);
        assert_eq!(pool.grow(GROWTH_BATCH, mark_alive), 50);
        assert_eq!(pool.grow(GROWTH_BATCH, mark_alive), 20);
        assert_eq!(pool.grow(GROWTH_BATCH, mark_alive), 0);
        assert_eq!(pool.active(), 120);
        assert!(pool.is_settled());
    }

    #[test]
    fn shrink_is_immediate_and_keeps_slots() {
        let mut pool = ParticlePool::new(1000);
        pool.resize(40);
        pool.grow(GROWTH_BATCH, mark_alive);
        pool.slots_mut()[30].wind_x = 7.0;

        pool.resize(10);
        assert_eq!(pool.active(), 10);
        assert_eq!(pool.allocated(), 40);

        pool.resize(40);
        pool.grow(GROWTH_BATCH, |_, _| {});
        assert_eq!(pool.get(30).wind_x, 7.0);
    }

    #[test]
    fn target_is_clamped_to_cap() {
        let mut pool = ParticlePool::new(60);
        pool.resize(500);
        assert_eq!(pool.target(), 60);
        while pool.grow(GROWTH_BATCH, mark_alive) > 0 {}
        assert_eq!(pool.active(), 60);
    }

    #[test]
    fn try_get_reports_out_of_range() {
        let mut pool = ParticlePool::new(10);
        pool.resize(2);
        pool.grow(GROWTH_BATCH, mark_alive);
        assert!(pool.try_get(1).is_ok());
        assert_eq!(
            pool.try_get(2),
            Err(PoolError::OutOfRange {
                index: 2,
                active: 2
            })
        );
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn get_past_active_panics() {
        let pool = ParticlePool::new(10);
        pool.get(0);
    }
}
