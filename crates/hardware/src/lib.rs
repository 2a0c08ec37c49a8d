//! Set-associative cache model.
//!
//! This crate implements a software model of a hardware-style set-associative cache:
//! 1. **Geometry:** Address split into tag, set index and block offset; derived sizes and masks.
//! 2. **Storage:** Line data and bit-exact way headers in owned or caller-supplied buffers.
//! 3. **Engine:** Gated read and write with hit, allocate and replace placement.
//! 4. **Policies:** Pluggable replacement policies and write-back sinks.
//! 5. **Maintenance:** Resumable whole-cache reset and flush driven by explicit cursors.
//! 6. **Simulation:** A seeded fuzz harness, configuration and statistics.

/// Common types and constants (addresses, errors, outcome codes, randomness).
pub mod common;
/// Cache and harness configuration (defaults, enums, JSON loading).
pub mod config;
/// The cache model (geometry, headers, store, engine, policies, bulk operations).
pub mod core;
/// Fuzz harness.
pub mod sim;
/// Access statistics collection and reporting.
pub mod stats;

/// Error and outcome types returned by every operation.
pub use crate::common::{CacheError, Completion, PolicyError, Status};
/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// The cache, its builder and the bulk-operation cursors.
pub use crate::core::{Bulk, Cache, CacheBuilder, FlushCursor, Geometry, ResetCursor};
/// Fuzz harness and its verdict.
pub use crate::sim::{CacheTest, Verdict};
/// Access counters.
pub use crate::stats::CacheStats;
