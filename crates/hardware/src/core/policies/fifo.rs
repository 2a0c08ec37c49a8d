//! First-In, First-Out (FIFO) Replacement Policy.
//!
//! This policy evicts the oldest cache line in a set, regardless of how recently
//! it was accessed. It operates as a circular buffer (Round-Robin) for each set.
//! When a replacement is needed, the pointer advances to the next way.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()`: O(1)
//!   - `select_victim()`: O(1)
//! - **Space Complexity:** O(S) where S is the number of sets
//! - **Best Case:** Streaming accesses where all lines have equal importance
//! - **Worst Case:** Workloads with strong temporal locality (may evict frequently-used lines)

use super::{ReplacementPolicy, Step};
use crate::common::PolicyError;
use crate::core::view::{SetMut, SetRef};

/// FIFO Policy state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FifoPolicy {
    /// Tracks the next way to be evicted for each set.
    next_way: Vec<usize>,
    /// Number of ways in the cache.
    ways: usize,
}

impl FifoPolicy {
    /// Creates a new FIFO policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            next_way: vec![0; sets],
            ways,
        }
    }
}

impl ReplacementPolicy for FifoPolicy {
    fn reset_set(&mut self, mut set: SetMut<'_>) -> Result<Step, PolicyError> {
        let next = self.next_way.get_mut(set.index()).ok_or_else(|| {
            PolicyError::Unsupported(format!("policy has no state for set {}", set.index()))
        })?;
        set.clear();
        *next = 0;
        Ok(Step::Done)
    }

    /// If the accessed way matches the current eviction pointer, the pointer is
    /// advanced. Lines are filled lowest way first, so this keeps the "first-in"
    /// order as the set fills up.
    fn touch(&mut self, set: SetMut<'_>, way: usize) {
        if let Some(next) = self.next_way.get_mut(set.index()) {
            if *next == way {
                *next = (*next + 1) % self.ways;
            }
        }
    }

    /// Returns the current round-robin pointer for the specified set.
    fn select_victim(&mut self, set: SetRef<'_>) -> Result<usize, PolicyError> {
        self.next_way
            .get(set.index())
            .copied()
            .ok_or(PolicyError::NoVictim { set: set.index() })
    }
}
