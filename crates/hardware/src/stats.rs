//! Cache statistics collection and reporting.
//!
//! This module tracks access counters for one cache instance. It provides:
//! 1. **Foreground accesses:** Reads, writes, hits, misses and how lines were placed.
//! 2. **Gating:** Accesses refused while a bulk operation was pending.
//! 3. **Maintenance:** Completed resets and lines handed to the write-back sink.

use std::fmt;

/// Access counters of a cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Read calls that passed the pending-operation gate.
    pub reads: u64,
    /// Write calls that passed the pending-operation gate.
    pub writes: u64,
    /// Reads that found their line.
    pub read_hits: u64,
    /// Reads that found no valid matching way.
    pub read_misses: u64,
    /// Writes that found their line.
    pub write_hits: u64,
    /// Writes installed in an invalid way.
    pub allocations: u64,
    /// Writes that evicted a victim.
    pub replacements: u64,
    /// Reads and writes refused while a reset or flush was pending.
    pub waits: u64,
    /// Dirty ways accepted by the write-back sink.
    pub writebacks: u64,
    /// Resets run to completion.
    pub resets: u64,
}

impl CacheStats {
    /// Fraction of gated accesses that hit, in `0.0..=1.0`.
    ///
    /// Returns `0.0` before the first access.
    pub fn hit_rate(&self) -> f64 {
        let accesses = self.reads + self.writes;
        if accesses == 0 {
            return 0.0;
        }
        (self.read_hits + self.write_hits) as f64 / accesses as f64
    }

    /// Prints the counters to stdout.
    pub fn print(&self) {
        println!("{self}");
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "==========================================================")?;
        writeln!(f, "CACHE STATISTICS")?;
        writeln!(f, "----------------------------------------------------------")?;
        writeln!(
            f,
            "  reads        {:<12} hits {:<10} misses {}",
            self.reads, self.read_hits, self.read_misses
        )?;
        writeln!(
            f,
            "  writes       {:<12} hits {:<10} alloc {:<8} repl {}",
            self.writes, self.write_hits, self.allocations, self.replacements
        )?;
        writeln!(f, "  hit rate     {:.2}%", self.hit_rate() * 100.0)?;
        writeln!(f, "  waits        {}", self.waits)?;
        writeln!(f, "  writebacks   {}", self.writebacks)?;
        writeln!(f, "  resets       {}", self.resets)?;
        write!(f, "==========================================================")
    }
}
