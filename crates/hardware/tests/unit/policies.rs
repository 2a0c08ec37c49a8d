//! Cache Replacement Policy Tests.
//!
//! Verifies victim selection and reset behaviour for the reference-counter LRU and the
//! set-indexed LRU, MRU, FIFO, PLRU and Random policies. Each policy is driven directly
//! through set views built over plain buffers, then once more through the factory.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use waycache_core::common::PolicyError;
use waycache_core::config::ReplacementPolicy as PolicyType;
use waycache_core::core::policies::{
    self, FifoPolicy, LruPolicy, MruPolicy, PlruPolicy, RandomPolicy, RefCountLru,
    ReplacementPolicy, Step,
};
use waycache_core::core::{Geometry, Placement, SetMut, SetRef};

use crate::common::{memory_cache, reference_geometry};

/// Header and data bytes of one set, with the geometry they belong to.
struct SetBuf {
    geometry: Geometry,
    headers: Vec<u8>,
    data: Vec<u8>,
}

impl SetBuf {
    fn new(ways: usize) -> Self {
        let geometry = Geometry::new(32, 2, 2, ways).unwrap();
        Self {
            geometry,
            headers: vec![0; geometry.set_header_bytes()],
            data: vec![0; geometry.set_data_bytes()],
        }
    }

    fn view(&self, set: usize) -> SetRef<'_> {
        SetRef::new(set, &self.geometry, &self.headers, &self.data)
    }

    fn view_mut(&mut self, set: usize) -> SetMut<'_> {
        SetMut::new(set, &self.geometry, &mut self.headers, &mut self.data)
    }

    fn touch(&mut self, policy: &mut impl ReplacementPolicy, way: usize) {
        policy.touch(self.view_mut(0), way);
    }

    fn victim(&self, policy: &mut impl ReplacementPolicy) -> usize {
        policy.select_victim(self.view(0)).unwrap()
    }
}

// ══════════════════════════════════════════════════════════
// 1. Reference-counter LRU
// ══════════════════════════════════════════════════════════

/// Reset zeroes the set and numbers the ways 0..ways.
#[test]
fn refcount_reset_numbers_ways() {
    let mut set = SetBuf::new(4);
    set.data.fill(0xAA);
    set.headers.fill(0xFF);
    let mut policy = RefCountLru::new();

    assert_eq!(policy.reset_set(set.view_mut(0)).unwrap(), Step::Done);

    let view = set.view(0);
    for way in 0..4 {
        assert!(!view.is_valid(way));
        assert!(!view.is_dirty(way));
        assert_eq!(view.meta(way), way as u8);
        assert_eq!(view.tag(way), 0);
    }
    assert!(set.data.iter().all(|&b| b == 0));
}

/// The touched way takes the top rank; ranks above its old rank move down.
#[test]
fn refcount_touch_promotes_way() {
    let mut set = SetBuf::new(4);
    let mut policy = RefCountLru::new();
    let _ = policy.reset_set(set.view_mut(0)).unwrap();
    assert_eq!(set.victim(&mut policy), 0);

    set.touch(&mut policy, 0);
    assert_eq!(set.victim(&mut policy), 1);
    set.touch(&mut policy, 1);
    assert_eq!(set.victim(&mut policy), 2);

    let view = set.view(0);
    let ranks: Vec<u8> = (0..4).map(|way| view.meta(way)).collect();
    assert_eq!(ranks, vec![2, 3, 0, 1]);
}

/// Touching the most recent way again changes nothing.
#[test]
fn refcount_touch_top_is_stable() {
    let mut set = SetBuf::new(4);
    let mut policy = RefCountLru::new();
    let _ = policy.reset_set(set.view_mut(0)).unwrap();

    set.touch(&mut policy, 3);
    let view = set.view(0);
    let ranks: Vec<u8> = (0..4).map(|way| view.meta(way)).collect();
    assert_eq!(ranks, vec![0, 1, 2, 3]);
}

/// 64 ways fit in the metadata bits; 128 do not.
#[test]
fn refcount_way_limit() {
    let mut wide = SetBuf::new(64);
    let mut policy = RefCountLru::new();
    let _ = policy.reset_set(wide.view_mut(0)).unwrap();
    assert_eq!(wide.view(0).meta(63), 63);

    let mut too_wide = SetBuf::new(128);
    let err = policy.reset_set(too_wide.view_mut(0)).unwrap_err();
    assert!(matches!(err, PolicyError::Unsupported(_)));
}

/// Without a rank-0 way there is no victim.
#[test]
fn refcount_without_rank_zero_has_no_victim() {
    let mut set = SetBuf::new(2);
    for way in 0..2 {
        set.view_mut(0).set_meta(way, 1);
    }
    let err = RefCountLru::new().select_victim(set.view(3)).unwrap_err();
    assert_eq!(err, PolicyError::NoVictim { set: 3 });
}

proptest! {
    /// After any touch sequence the ranks stay a permutation of 0..ways.
    #[test]
    fn refcount_ranks_stay_a_permutation(touches in proptest::collection::vec(0usize..8, 0..64)) {
        let mut set = SetBuf::new(8);
        let mut policy = RefCountLru::new();
        let _ = policy.reset_set(set.view_mut(0)).unwrap();
        for &way in &touches {
            set.touch(&mut policy, way);
        }

        let view = set.view(0);
        let mut ranks: Vec<u8> = (0..8).map(|way| view.meta(way)).collect();
        ranks.sort_unstable();
        prop_assert_eq!(ranks, (0..8).collect::<Vec<u8>>());
        if let Some(&last) = touches.last() {
            prop_assert_eq!(view.meta(last), 7);
        }
    }
}

// ══════════════════════════════════════════════════════════
// 2. LRU Policy
// ══════════════════════════════════════════════════════════

/// Initial stack is [0, 1, 2, 3]: MRU = 0, LRU = 3.
#[test]
fn lru_initial_victim_is_last_way() {
    let set = SetBuf::new(4);
    let mut policy = LruPolicy::new(4, 4);
    assert_eq!(set.victim(&mut policy), 3);
}

/// Classic LRU scenario: access 0,1,2,3 then re-access 0, so the LRU becomes 1.
#[test]
fn lru_evicts_true_lru_after_reaccess() {
    let mut set = SetBuf::new(4);
    let mut policy = LruPolicy::new(4, 4);

    for way in 0..4 {
        set.touch(&mut policy, way);
    }
    assert_eq!(policy.order(0), Some(&[3, 2, 1, 0][..]));
    assert_eq!(set.victim(&mut policy), 0);

    set.touch(&mut policy, 0);
    assert_eq!(set.victim(&mut policy), 1);
    set.touch(&mut policy, 1);
    assert_eq!(set.victim(&mut policy), 2);
}

/// Reset clears the set and restores the initial stack for that set only.
#[test]
fn lru_reset_restores_stack() {
    let mut set = SetBuf::new(4);
    let mut policy = LruPolicy::new(4, 4);
    set.touch(&mut policy, 2);
    set.data.fill(0x55);

    assert_eq!(policy.reset_set(set.view_mut(0)).unwrap(), Step::Done);
    assert_eq!(policy.order(0), Some(&[0, 1, 2, 3][..]));
    assert!(set.data.iter().all(|&b| b == 0));
}

/// A set the policy was not sized for is reported, not indexed.
#[test]
fn lru_unknown_set_is_an_error() {
    let mut set = SetBuf::new(4);
    let mut policy = LruPolicy::new(1, 4);
    assert!(matches!(
        policy.reset_set(set.view_mut(2)),
        Err(PolicyError::Unsupported(_))
    ));
    assert_eq!(
        policy.select_victim(set.view(2)),
        Err(PolicyError::NoVictim { set: 2 })
    );
}

// ══════════════════════════════════════════════════════════
// 3. MRU Policy
// ══════════════════════════════════════════════════════════

/// MRU evicts the most recently touched way.
#[test]
fn mru_evicts_most_recent() {
    let mut set = SetBuf::new(4);
    let mut policy = MruPolicy::new(4, 4);
    assert_eq!(set.victim(&mut policy), 0);

    set.touch(&mut policy, 2);
    assert_eq!(set.victim(&mut policy), 2);
    set.touch(&mut policy, 1);
    assert_eq!(set.victim(&mut policy), 1);
}

// ══════════════════════════════════════════════════════════
// 4. FIFO Policy
// ══════════════════════════════════════════════════════════

/// The pointer advances only when the way it points at is touched, and wraps.
#[test]
fn fifo_round_robin() {
    let mut set = SetBuf::new(2);
    let mut policy = FifoPolicy::new(4, 2);
    assert_eq!(set.victim(&mut policy), 0);

    set.touch(&mut policy, 1);
    assert_eq!(set.victim(&mut policy), 0);
    set.touch(&mut policy, 0);
    assert_eq!(set.victim(&mut policy), 1);
    set.touch(&mut policy, 1);
    assert_eq!(set.victim(&mut policy), 0);
}

/// Reset rewinds the pointer.
#[test]
fn fifo_reset_rewinds() {
    let mut set = SetBuf::new(4);
    let mut policy = FifoPolicy::new(4, 4);
    set.touch(&mut policy, 0);
    assert_eq!(set.victim(&mut policy), 1);

    let _ = policy.reset_set(set.view_mut(0)).unwrap();
    assert_eq!(set.victim(&mut policy), 0);
}

// ══════════════════════════════════════════════════════════
// 5. PLRU Policy
// ══════════════════════════════════════════════════════════

/// The lowest untouched way is the victim; touching the last one clears the others.
#[test]
fn plru_tracks_recent_bits() {
    let mut set = SetBuf::new(4);
    let mut policy = PlruPolicy::new(4, 4);
    assert_eq!(set.victim(&mut policy), 0);

    set.touch(&mut policy, 0);
    set.touch(&mut policy, 2);
    assert_eq!(set.victim(&mut policy), 1);
    set.touch(&mut policy, 1);
    assert_eq!(set.victim(&mut policy), 3);
    set.touch(&mut policy, 3);
    assert_eq!(set.victim(&mut policy), 0);
}

/// 64 ways use every bit of the vector without overflowing.
#[test]
fn plru_handles_64_ways() {
    let mut set = SetBuf::new(64);
    let mut policy = PlruPolicy::new(4, 64);
    for way in 0..63 {
        set.touch(&mut policy, way);
    }
    assert_eq!(set.victim(&mut policy), 63);
    set.touch(&mut policy, 63);
    assert_eq!(set.victim(&mut policy), 0);
}

// ══════════════════════════════════════════════════════════
// 6. Random Policy
// ══════════════════════════════════════════════════════════

/// Equal seeds produce equal victim sequences, always in range.
#[test]
fn random_is_reproducible() {
    let set = SetBuf::new(8);
    let mut a = RandomPolicy::new(42);
    let mut b = RandomPolicy::new(42);

    let first: Vec<usize> = (0..32).map(|_| set.victim(&mut a)).collect();
    let second: Vec<usize> = (0..32).map(|_| set.victim(&mut b)).collect();
    assert_eq!(first, second);
    assert!(first.iter().all(|&way| way < 8));
}

// ══════════════════════════════════════════════════════════
// 7. Factory
// ══════════════════════════════════════════════════════════

/// Every configured policy resets the cache and picks a victim for a full set.
#[rstest]
#[case(PolicyType::RefCount)]
#[case(PolicyType::Lru)]
#[case(PolicyType::Mru)]
#[case(PolicyType::Fifo)]
#[case(PolicyType::Plru)]
#[case(PolicyType::Random)]
fn factory_policies_replace(#[case] kind: PolicyType) {
    let geometry = reference_geometry();
    let mut cache = memory_cache(geometry, policies::build(kind, &geometry, 7));
    let _ = cache.reset_all().unwrap();

    let _ = cache.write(geometry.compose(1, 2, 0), &[1, 1]).unwrap();
    let _ = cache.write(geometry.compose(2, 2, 0), &[2, 2]).unwrap();
    let access = cache.write(geometry.compose(3, 2, 0), &[3, 3]).unwrap();

    assert_eq!(access.placement, Placement::Replaced);
    assert_eq!(cache.probe(geometry.compose(3, 2, 0)), Some(access.way));
}
