//! Simulation drivers.
//!
//! Provides the seeded fuzz harness that exercises a cache end to end.

/// Write/read/replace fuzz harness.
pub mod harness;

pub use harness::{CacheTest, Verdict};
