//! Pseudo-LRU (PLRU) Replacement Policy.
//!
//! Approximates LRU with one "recently used" bit per way (bit-PLRU). Touching a way sets
//! its bit; when every bit would be set, all bits except the touched way's are cleared.
//! The victim is the lowest way whose bit is clear.
//!
//! # Performance
//!
//! - **Time Complexity:**
//!   - `touch()`: O(1)
//!   - `select_victim()`: O(W)
//! - **Space Complexity:** one bit per way (up to 64 ways)
//! - **Best Case:** Similar to LRU for most access patterns
//! - **Worst Case:** Pathological cases can cause premature eviction of useful lines

use super::{ReplacementPolicy, Step};
use crate::common::PolicyError;
use crate::core::geometry::low_mask;
use crate::core::view::{SetMut, SetRef};

/// PLRU Policy state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlruPolicy {
    /// MRU bit vector for each set.
    usage: Vec<u64>,
    /// Number of ways in the cache.
    ways: usize,
}

impl PlruPolicy {
    /// Creates a new PLRU policy instance.
    ///
    /// # Arguments
    ///
    /// * `sets` - The number of sets in the cache.
    /// * `ways` - The associativity (number of ways) of the cache.
    pub fn new(sets: usize, ways: usize) -> Self {
        Self {
            usage: vec![0; sets],
            ways,
        }
    }
}

impl ReplacementPolicy for PlruPolicy {
    fn reset_set(&mut self, mut set: SetMut<'_>) -> Result<Step, PolicyError> {
        if self.ways > u64::BITS as usize {
            return Err(PolicyError::Unsupported(format!(
                "bit-PLRU tracks at most 64 ways, cache has {}",
                self.ways
            )));
        }
        let bits = self.usage.get_mut(set.index()).ok_or_else(|| {
            PolicyError::Unsupported(format!("policy has no state for set {}", set.index()))
        })?;
        set.clear();
        *bits = 0;
        Ok(Step::Done)
    }

    /// Sets the bit of the accessed way, protecting it from immediate eviction.
    fn touch(&mut self, set: SetMut<'_>, way: usize) {
        let all_ones = low_mask(self.ways as u32);
        let Some(bits) = self.usage.get_mut(set.index()) else {
            return;
        };
        let mask = 1u64.checked_shl(way as u32).unwrap_or(0);
        *bits |= mask;
        if *bits & all_ones == all_ones {
            *bits = mask;
        }
    }

    /// Returns the lowest way whose bit is clear.
    fn select_victim(&mut self, set: SetRef<'_>) -> Result<usize, PolicyError> {
        let bits = self
            .usage
            .get(set.index())
            .copied()
            .ok_or(PolicyError::NoVictim { set: set.index() })?;
        Ok((0..self.ways).find(|&way| (bits >> way) & 1 == 0).unwrap_or(0))
    }
}
