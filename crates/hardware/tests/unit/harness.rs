//! Fuzz Harness Tests.
//!
//! Verifies the verdicts, the report tree, seed determinism and the persistence of the
//! per-set accumulators.

use std::io;

use pretty_assertions::assert_eq;
use rstest::rstest;
use waycache_core::common::{CacheError, Completion, Status};
use waycache_core::config::ReplacementPolicy as PolicyKind;
use waycache_core::core::policies::{self, ReplacementPolicy};
use waycache_core::core::{Bulk, Geometry, ResetCursor, WriteBack};
use waycache_core::{Cache, CacheTest, Verdict};

use crate::common::{
    ScriptedPolicy, TruncatingPolicy, memory_cache, reference_geometry, reset_cache,
};

/// Writer whose every write fails.
struct BrokenPipe;

impl io::Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Runs `test` against `cache` and returns the verdict with the report text.
fn run_with_report<P: ReplacementPolicy, W: WriteBack>(
    test: &mut CacheTest,
    cache: &mut Cache<'_, P, W>,
) -> (Verdict, String) {
    let mut out = Vec::<u8>::new();
    let verdict = test.run(cache, Some(&mut out)).unwrap();
    (verdict, String::from_utf8(out).unwrap())
}

// ══════════════════════════════════════════════════════════
// 1. Verdicts
// ══════════════════════════════════════════════════════════

/// A freshly reset reference cache passes for any seed.
#[rstest]
#[case(1)]
#[case(42)]
#[case(0xDEAD_BEEF)]
fn reference_cache_passes(#[case] seed: u64) {
    let geometry = reference_geometry();
    let mut cache = reset_cache(geometry);
    let mut test = CacheTest::new(&geometry, seed);

    let verdict = test.run(&mut cache, None).unwrap();
    assert_eq!(verdict, Verdict::Passed);
    assert_eq!(verdict.status(), Status::Success);
    assert!(test.accumulators().iter().all(|&acc| acc == 0));
}

/// Every built-in policy passes on a larger geometry.
#[rstest]
fn every_policy_passes(
    #[values(
        PolicyKind::RefCount,
        PolicyKind::Lru,
        PolicyKind::Plru,
        PolicyKind::Fifo,
        PolicyKind::Random,
        PolicyKind::Mru
    )]
    kind: PolicyKind,
) {
    let geometry = Geometry::new(32, 3, 3, 4).unwrap();
    let mut cache = memory_cache(geometry, policies::build(kind, &geometry, 9));
    assert_eq!(cache.reset_all().unwrap(), Bulk::Complete);

    let mut test = CacheTest::new(&geometry, 2024);
    assert_eq!(test.run(&mut cache, None).unwrap(), Verdict::Passed);
}

/// Corrupted line contents show up as read-back mismatches in every set.
#[test]
fn corrupted_lines_fail() {
    let geometry = reference_geometry();
    let mut cache = memory_cache(geometry, TruncatingPolicy::default());
    assert_eq!(cache.reset_all().unwrap(), Bulk::Complete);

    let mut test = CacheTest::new(&geometry, 7);
    let (verdict, report) = run_with_report(&mut test, &mut cache);

    assert_eq!(verdict, Verdict::Failed);
    assert_eq!(verdict.status(), Status::Failure);
    assert!(test.accumulators().iter().all(|&acc| acc != 0));
    assert!(report.ends_with("| TEST FAILED\n"));
}

/// A pending reset makes the run return `Waiting` without touching the cache.
#[test]
fn pending_reset_waits() {
    let geometry = reference_geometry();
    let mut policy = ScriptedPolicy::new();
    policy.yield_at = Some(1);
    let mut cache = memory_cache(geometry, policy);
    assert_eq!(cache.reset(&mut ResetCursor::default()).unwrap(), Bulk::Suspended);

    let mut test = CacheTest::new(&geometry, 3);
    let (verdict, report) = run_with_report(&mut test, &mut cache);

    assert_eq!(verdict, Verdict::Waiting);
    assert_eq!(verdict.status(), Status::Waiting);
    assert!(report.is_empty());
    assert_eq!(cache.stats().writes, 0);
    assert_eq!(cache.stats().waits, 0);
}

// ══════════════════════════════════════════════════════════
// 2. Report
// ══════════════════════════════════════════════════════════

/// The report is a tree: one block per set, one check line per way.
#[test]
fn report_tree_shape() {
    let geometry = reference_geometry();
    let mut cache = reset_cache(geometry);
    let mut test = CacheTest::new(&geometry, 11);

    let (verdict, report) = run_with_report(&mut test, &mut cache);
    assert_eq!(verdict, Verdict::Passed);

    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines[0], "TEST CACHE");
    assert_eq!(lines[1], ".---------");
    assert_eq!(lines.last().copied(), Some("| TEST PASSED"));
    assert_eq!(lines.len(), 63);

    let sets: Vec<&str> = lines.iter().copied().filter(|l| l.starts_with("| SET ")).collect();
    assert_eq!(sets, vec!["| SET 0", "| SET 1", "| SET 2", "| SET 3"]);

    let checks: Vec<&&str> = lines.iter().filter(|l| l.starts_with("| | CHECK WAY ")).collect();
    assert_eq!(checks.len(), 8);
    assert!(checks.iter().all(|l| l.ends_with(": 0x000000")));

    assert_eq!(lines.iter().filter(|l| l.starts_with("| | | WRITE ")).count(), 8);
    assert_eq!(lines.iter().filter(|l| l.starts_with("| | | REPL ")).count(), 8);
    assert!(
        lines
            .iter()
            .filter(|l| l.starts_with("| | | READ ") || l.starts_with("| | | WRITE "))
            .all(|l| l.ends_with(": 0"))
    );
}

/// The same seed yields the same report.
#[test]
fn seed_is_deterministic() {
    let geometry = reference_geometry();
    let (_, first) = run_with_report(&mut CacheTest::new(&geometry, 99), &mut reset_cache(geometry));
    let (_, second) = run_with_report(&mut CacheTest::new(&geometry, 99), &mut reset_cache(geometry));
    assert_eq!(first, second);
}

/// A failing report sink surfaces as an I/O error.
#[test]
fn report_io_error_propagates() {
    let geometry = reference_geometry();
    let mut cache = reset_cache(geometry);
    let mut test = CacheTest::new(&geometry, 5);

    let mut out = BrokenPipe;
    let err = test.run(&mut cache, Some(&mut out)).unwrap_err();
    assert!(matches!(err, CacheError::Io(_)));
}

// ══════════════════════════════════════════════════════════
// 3. Accumulators
// ══════════════════════════════════════════════════════════

/// A failure keeps later runs failing until the accumulators are cleared.
#[test]
fn accumulators_persist_until_cleared() {
    let geometry = reference_geometry();
    let mut test = CacheTest::new(&geometry, 13);

    let mut broken = memory_cache(geometry, TruncatingPolicy::default());
    let _ = broken.reset_all().unwrap();
    assert_eq!(test.run(&mut broken, None).unwrap(), Verdict::Failed);

    let mut healthy = reset_cache(geometry);
    assert_eq!(test.run(&mut healthy, None).unwrap(), Verdict::Failed);

    test.clear();
    assert!(test.accumulators().iter().all(|&acc| acc == 0));
    let mut healthy = reset_cache(geometry);
    assert_eq!(test.run(&mut healthy, None).unwrap(), Verdict::Passed);
}

/// Attaching to a cache with another set count resizes and zeroes the accumulators.
#[test]
fn attach_resizes_accumulators() {
    let geometry = reference_geometry();
    let mut test = CacheTest::new(&geometry, 17);
    assert_eq!(test.accumulators().len(), 4);

    let mut broken = memory_cache(geometry, TruncatingPolicy::default());
    let _ = broken.reset_all().unwrap();
    assert_eq!(test.run(&mut broken, None).unwrap(), Verdict::Failed);

    let wider = Geometry::new(48, 1, 3, 2).unwrap();
    test.attach(&wider);
    assert_eq!(test.accumulators(), &[0; 8]);

    let mut cache = reset_cache(wider);
    assert_eq!(test.run(&mut cache, None).unwrap(), Verdict::Passed);
}
