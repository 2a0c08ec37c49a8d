//! Reference-Counter LRU Replacement Policy.
//!
//! Keeps an LRU order without any state outside the cache: every way stores a rank in
//! the metadata bits of its status byte. Ranks are a permutation of `0..ways`; the most
//! recently used way holds `ways - 1` and the least recently used way holds `0`.
//!
//! - **Reset:** clears the set and numbers the ways `0, 1, .., ways - 1`.
//! - **Touch:** every way ranked above the touched way moves down by one, the touched
//!   way takes the top rank.
//! - **Victim:** the first way with rank `0`.
//!
//! # Performance
//!
//! - **Time Complexity:** O(W) for touch and victim selection
//! - **Space Complexity:** zero bytes outside the headers
//! - **Limit:** the six metadata bits hold ranks for at most 64 ways

use super::{ReplacementPolicy, Step};
use crate::common::PolicyError;
use crate::common::constants::META_BITS;
use crate::core::view::{SetMut, SetRef};

/// Largest associativity whose ranks fit in the metadata bits.
pub const MAX_WAYS: usize = 1 << META_BITS;

/// LRU order stored in header metadata.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RefCountLru;

impl RefCountLru {
    /// Creates the policy; it carries no state of its own.
    pub const fn new() -> Self {
        Self
    }

    fn rank(set: &SetRef<'_>, way: usize) -> u8 {
        set.meta(way) & (set.ways() - 1) as u8
    }
}

impl ReplacementPolicy for RefCountLru {
    fn reset_set(&mut self, mut set: SetMut<'_>) -> Result<Step, PolicyError> {
        let ways = set.ways();
        if ways > MAX_WAYS {
            return Err(PolicyError::Unsupported(format!(
                "reference counters hold at most {MAX_WAYS} ways, cache has {ways}"
            )));
        }

        set.clear();
        for way in 0..ways {
            set.set_meta(way, way as u8);
        }
        Ok(Step::Done)
    }

    fn touch(&mut self, mut set: SetMut<'_>, way: usize) {
        let top = (set.ways() - 1) as u8;
        let touched = Self::rank(&set.as_view(), way);

        for other in 0..set.ways() {
            let rank = Self::rank(&set.as_view(), other);
            if rank > touched {
                set.set_meta(other, rank - 1);
            }
        }
        set.set_meta(way, top);
    }

    fn select_victim(&mut self, set: SetRef<'_>) -> Result<usize, PolicyError> {
        (0..set.ways())
            .find(|&way| Self::rank(&set, way) == 0)
            .ok_or(PolicyError::NoVictim { set: set.index() })
    }
}
