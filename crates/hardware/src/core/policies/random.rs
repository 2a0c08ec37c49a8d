//! Random Replacement Policy.
//!
//! This policy evicts a random cache line from the set. It uses the crate's xorshift
//! generator, so a given seed always produces the same victim sequence.

use super::{ReplacementPolicy, Step};
use crate::common::{PolicyError, XorShift64};
use crate::core::view::{SetMut, SetRef};

/// Random Policy state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RandomPolicy {
    /// Internal state for the pseudo-random number generator.
    rng: XorShift64,
}

impl RandomPolicy {
    /// Creates a new Random policy instance.
    ///
    /// # Arguments
    ///
    /// * `seed` - Seed of the victim sequence.
    pub const fn new(seed: u64) -> Self {
        Self {
            rng: XorShift64::new(seed),
        }
    }
}

impl ReplacementPolicy for RandomPolicy {
    fn reset_set(&mut self, mut set: SetMut<'_>) -> Result<Step, PolicyError> {
        set.clear();
        Ok(Step::Done)
    }

    /// Access patterns do not affect the state, so this is a no-op.
    fn touch(&mut self, _set: SetMut<'_>, _way: usize) {}

    /// Generates a pseudo-random number and maps it to a valid way index.
    fn select_victim(&mut self, set: SetRef<'_>) -> Result<usize, PolicyError> {
        Ok(self.rng.below(set.ways() as u64) as usize)
    }
}
