//! Cache Replacement Policies.
//!
//! The engine never decides which way to evict. It calls out to a [`ReplacementPolicy`]
//! at three points:
//!
//! - `reset_set`: once per set during a whole-cache reset; the policy initialises the
//!   set's headers and data and may ask to be resumed later.
//! - `touch`: after every successful hit, allocation or replacement.
//! - `select_victim`: when a write misses in a full set.
//!
//! # Policies
//!
//! - `RefCountLru`: LRU kept in the header metadata bits (reference counters).
//! - `Lru`: Least Recently Used (per-set usage stack).
//! - `Mru`: Most Recently Used.
//! - `Fifo`: First-In, First-Out.
//! - `Plru`: Pseudo-LRU (MRU bit vector).
//! - `Random`: Random selection.

/// First-In, First-Out replacement policy.
pub mod fifo;

/// Least Recently Used replacement policy.
pub mod lru;

/// Most Recently Used replacement policy.
pub mod mru;

/// Pseudo-LRU replacement policy.
pub mod plru;

/// Random replacement policy.
pub mod random;

/// Reference-counter LRU stored in the way headers.
pub mod refcount;

pub use fifo::FifoPolicy;
pub use lru::LruPolicy;
pub use mru::MruPolicy;
pub use plru::PlruPolicy;
pub use random::RandomPolicy;
pub use refcount::RefCountLru;

use super::geometry::Geometry;
use super::view::{SetMut, SetRef};
use crate::common::PolicyError;
use crate::config::ReplacementPolicy as PolicyType;

/// Progress reported by a resumable bulk-operation callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// This set (or way) is finished; continue with the next one.
    Done,
    /// Not ready; suspend the bulk operation here and resume later from the cursor.
    Yield,
}

/// Trait for cache replacement policies.
///
/// Policies may keep their own per-set state or store it in the metadata bits of the
/// way headers (see [`SetMut::set_meta`]). Victim ties must be broken deterministically,
/// lowest way first, so runs are reproducible.
pub trait ReplacementPolicy {
    /// Initialises one set during a whole-cache reset.
    ///
    /// Implementations normally clear the set (every way invalid and clean) and reset
    /// their own state for it.
    ///
    /// # Errors
    ///
    /// A [`PolicyError`] aborts the reset.
    fn reset_set(&mut self, set: SetMut<'_>) -> Result<Step, PolicyError>;

    /// Records that `way` of `set` was just used.
    fn touch(&mut self, set: SetMut<'_>, way: usize);

    /// Chooses the way to evict from a full set.
    ///
    /// # Errors
    ///
    /// A [`PolicyError`] fails the write that needed the victim.
    fn select_victim(&mut self, set: SetRef<'_>) -> Result<usize, PolicyError>;
}

impl<P: ReplacementPolicy + ?Sized> ReplacementPolicy for Box<P> {
    fn reset_set(&mut self, set: SetMut<'_>) -> Result<Step, PolicyError> {
        (**self).reset_set(set)
    }

    fn touch(&mut self, set: SetMut<'_>, way: usize) {
        (**self).touch(set, way);
    }

    fn select_victim(&mut self, set: SetRef<'_>) -> Result<usize, PolicyError> {
        (**self).select_victim(set)
    }
}

/// Builds the policy named by a configuration value.
///
/// # Arguments
///
/// * `kind` - Policy selected in the configuration.
/// * `geometry` - Geometry of the cache the policy will serve.
/// * `seed` - Seed for the random policy; ignored by the others.
pub fn build(kind: PolicyType, geometry: &Geometry, seed: u64) -> Box<dyn ReplacementPolicy> {
    let (sets, ways) = (geometry.set_count(), geometry.ways());
    match kind {
        PolicyType::RefCount => Box::new(RefCountLru::new()),
        PolicyType::Lru => Box::new(LruPolicy::new(sets, ways)),
        PolicyType::Mru => Box::new(MruPolicy::new(sets, ways)),
        PolicyType::Fifo => Box::new(FifoPolicy::new(sets, ways)),
        PolicyType::Plru => Box::new(PlruPolicy::new(sets, ways)),
        PolicyType::Random => Box::new(RandomPolicy::new(seed)),
    }
}
