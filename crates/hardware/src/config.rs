//! Configuration for cache instances and harness runs.
//!
//! This module defines the configuration structures and enums used to parameterize
//! a cache. It provides:
//! 1. **Defaults:** The reference geometry (48-bit addresses, 4 sets, 2-byte lines, 2 ways).
//! 2. **Structures:** Cache geometry and policy selection, plus harness settings.
//! 3. **Enums:** Replacement policy and write-back sink types.
//!
//! Configuration is supplied as JSON via [`Config::from_json`], or use `Config::default()`.
//! The engine itself never reads configuration; the CLI turns it into a geometry,
//! a policy and a sink and hands those to the builder.

use serde::Deserialize;

use crate::common::CacheError;
use crate::core::geometry::Geometry;

/// Default configuration constants.
///
/// These values reproduce the reference scenario: a 48-bit address space split into
/// a 1-bit block offset and a 2-bit set index, two ways per set.
mod defaults {
    /// Width of an address in bits.
    pub const ADDRESS_BITS: u32 = 48;

    /// Width of the block offset (2-byte lines).
    pub const OFFSET_BITS: u32 = 1;

    /// Width of the set index (4 sets).
    pub const INDEX_BITS: u32 = 2;

    /// Associativity.
    pub const WAYS: usize = 2;

    /// Whether the harness prints its report tree.
    pub const REPORT: bool = true;
}

/// Cache replacement policy algorithms.
///
/// Determines which cache line to evict when a new line must be installed in a
/// full cache set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ReplacementPolicy {
    /// LRU order kept as reference counters in the header metadata bits.
    ///
    /// Needs no state outside the cache; limited to 64 ways.
    #[default]
    #[serde(alias = "RefCount", alias = "refcount")]
    RefCount,
    /// Least Recently Used replacement policy.
    ///
    /// Evicts the cache line that was accessed least recently.
    #[serde(alias = "Lru", alias = "lru")]
    Lru,
    /// Pseudo-LRU (bit vector) replacement policy.
    ///
    /// Approximates LRU with one bit per way.
    #[serde(alias = "Plru", alias = "plru")]
    Plru,
    /// First In First Out replacement policy.
    ///
    /// Evicts the oldest cache line in the set (round-robin).
    #[serde(alias = "Fifo", alias = "fifo")]
    Fifo,
    /// Random replacement policy.
    ///
    /// Evicts a randomly selected cache line from the set.
    #[serde(alias = "Random", alias = "random")]
    Random,
    /// Most Recently Used replacement policy.
    ///
    /// Evicts the cache line that was accessed most recently.
    /// Effective for cyclic access patterns larger than the cache.
    #[serde(alias = "Mru", alias = "mru")]
    Mru,
}

/// Where flushed lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WriteBackKind {
    /// Print each dirty way to stdout.
    #[default]
    #[serde(alias = "Dump", alias = "dump")]
    Dump,
    /// Keep written-back lines in memory.
    #[serde(alias = "Memory", alias = "memory")]
    Memory,
    /// Drop written-back lines.
    #[serde(alias = "Discard", alias = "discard")]
    Discard,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Cache geometry and policies
    #[serde(default)]
    pub cache: CacheConfig,
    /// Fuzz harness settings
    #[serde(default)]
    pub harness: HarnessConfig,
}

impl Config {
    /// Parses a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Config`] if the text is not valid configuration JSON.
    pub fn from_json(text: &str) -> Result<Self, CacheError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Geometry and policy selection of one cache.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CacheConfig {
    /// Address width in bits
    #[serde(default = "CacheConfig::default_address_bits")]
    pub address_bits: u32,

    /// Block offset width in bits
    #[serde(default = "CacheConfig::default_offset_bits")]
    pub offset_bits: u32,

    /// Set index width in bits
    #[serde(default = "CacheConfig::default_index_bits")]
    pub index_bits: u32,

    /// Associativity (power of two)
    #[serde(default = "CacheConfig::default_ways")]
    pub ways: usize,

    /// Replacement policy
    #[serde(default)]
    pub policy: ReplacementPolicy,

    /// Flush target
    #[serde(default)]
    pub writeback: WriteBackKind,

    /// Seed of the random replacement policy; the harness seed is used when absent
    #[serde(default)]
    pub random_seed: Option<u64>,
}

impl CacheConfig {
    fn default_address_bits() -> u32 {
        defaults::ADDRESS_BITS
    }

    fn default_offset_bits() -> u32 {
        defaults::OFFSET_BITS
    }

    fn default_index_bits() -> u32 {
        defaults::INDEX_BITS
    }

    fn default_ways() -> usize {
        defaults::WAYS
    }

    /// Validates the widths and derives the geometry.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Geometry`] when the widths do not describe a usable cache.
    pub fn geometry(&self) -> Result<Geometry, CacheError> {
        Geometry::new(self.address_bits, self.offset_bits, self.index_bits, self.ways)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            address_bits: defaults::ADDRESS_BITS,
            offset_bits: defaults::OFFSET_BITS,
            index_bits: defaults::INDEX_BITS,
            ways: defaults::WAYS,
            policy: ReplacementPolicy::default(),
            writeback: WriteBackKind::default(),
            random_seed: None,
        }
    }
}

/// Fuzz harness settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HarnessConfig {
    /// Seed of the address/data generator; the CLI falls back to the clock when absent
    #[serde(default)]
    pub seed: Option<u64>,

    /// Print the report tree
    #[serde(default = "HarnessConfig::default_report")]
    pub report: bool,
}

impl HarnessConfig {
    fn default_report() -> bool {
        defaults::REPORT
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            seed: None,
            report: defaults::REPORT,
        }
    }
}
