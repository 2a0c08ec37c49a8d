//! Least Recently Used (LRU) Replacement Policy.
//!
//! This policy evicts the cache line that has not been accessed for the longest time.
//! It maintains a usage stack for each set. When a line is accessed, it is moved
//! to the top (Most Recently Used position). The bottom of the stack represents
//! the Least Recently Used line.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()`: O(W) where W is the number of ways (associativity)
//!   - `select_victim()`: O(1)
//! - **Space Complexity:** O(S × W) where S is the number of sets
//! - **Best Case:** Sequential/streaming accesses with good temporal locality
//! - **Worst Case:** Scanning patterns larger than cache capacity (thrashing)

use super::{ReplacementPolicy, Step};
use crate::common::PolicyError;
use crate::core::view::{SetMut, SetRef};

/// LRU Policy state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LruPolicy {
    /// A vector of usage stacks (one per set).
    /// Index 0 is MRU, last index is LRU.
    usage: Vec<Vec<usize>>,
}

impl LruPolicy {
    /// Creates a new LRU policy instance.
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

    /// Usage stack of `set`, most recently used first.
    pub fn order(&self, set: usize) -> Option<&[usize]> {
        self.usage.get(set).map(Vec::as_slice)
    }
}

impl ReplacementPolicy for LruPolicy {
    /// Clears the set and restores the initial stack `[0, 1, .., ways - 1]`.
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

    /// Moves the accessed `way` to the front of the usage stack (MRU position),
    /// shifting other elements down.
    fn touch(&mut self, set: SetMut<'_>, way: usize) {
        let Some(stack) = self.usage.get_mut(set.index()) else {
            return;
        };
        if let Some(pos) = stack.iter().position(|&x| x == way) {
            stack[..=pos].rotate_right(1);
        }
    }

    /// Returns the way at the bottom of the usage stack (LRU position).
    fn select_victim(&mut self, set: SetRef<'_>) -> Result<usize, PolicyError> {
        self.usage
            .get(set.index())
            .and_then(|stack| stack.last().copied())
            .ok_or(PolicyError::NoVictim { set: set.index() })
    }
}
