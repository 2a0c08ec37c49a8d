//! Most Recently Used (MRU) Replacement Policy.
//!
//! This policy evicts the cache line that was accessed most recently.
//! While counter-intuitive for standard workloads, MRU is optimal for
//! cyclic access patterns (loops) where the dataset is larger than the cache.
//! In such cases, the most recently used item is the least likely to be
//! needed again in the immediate future.

use super::{ReplacementPolicy, Step};
use crate::common::PolicyError;
use crate::core::view::{SetMut, SetRef};

/// MRU Policy state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MruPolicy {
    /// A vector of usage stacks (one per set).
    /// Index 0 is the MRU position (victim), last index is LRU.
    usage: Vec<Vec<usize>>,
}

impl MruPolicy {
    /// Creates a new MRU policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            usage: vec![(0..ways).collect(); sets],
        }
    }
}

impl ReplacementPolicy for MruPolicy {
    fn reset_set(&mut self, mut set: SetMut<'_>) -> Result<Step, PolicyError> {
        let ways = set.ways();
        let stack = self.usage.get_mut(set.index()).ok_or_else(|| {
            PolicyError::Unsupported(format!("policy has no state for set {}", set.index()))
        })?;
        set.clear();
        stack.clear();
        stack.extend(0..ways);
        Ok(Step::Done)
    }

    /// Moves the accessed `way` to the front of the usage stack (MRU position).
    fn touch(&mut self, set: SetMut<'_>, way: usize) {
        let Some(stack) = self.usage.get_mut(set.index()) else {
            return;
        };
        if let Some(pos) = stack.iter().position(|&x| x == way) {
            stack[..=pos].rotate_right(1);
        }
    }

    /// Returns the way at the top of the usage stack (the Most Recently Used).
    fn select_victim(&mut self, set: SetRef<'_>) -> Result<usize, PolicyError> {
        self.usage
            .get(set.index())
            .and_then(|stack| stack.first().copied())
            .ok_or(PolicyError::NoVictim { set: set.index() })
    }
}
