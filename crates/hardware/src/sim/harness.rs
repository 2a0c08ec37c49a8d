//! Seeded fuzz harness.
//!
//! Exercises a cache set by set and records every outcome:
//! 1. **Write/read:** For each way, a random address in the set receives random bytes
//!    from a random offset to the end of the line; the bytes are read back and compared.
//! 2. **Replacement:** One more random write per way, forcing the policy to evict.
//! 3. **Check:** Each way folds its outcomes into a 32-bit code (write status in bits
//!    0..8, read status in 8..16, comparison in 16..24, replacement write in 24..32,
//!    each the signed outcome code truncated to a byte) and the set accumulates them.
//!
//! The run passes only when every set accumulator is zero. Accumulators persist across
//! runs until [`CacheTest::clear`], so one failure keeps later runs failing.

use std::io::Write;

use tracing::debug;

use crate::common::{CacheError, Completion, Status, XorShift64};
use crate::core::engine::Cache;
use crate::core::geometry::Geometry;
use crate::core::policies::ReplacementPolicy;
use crate::core::writeback::WriteBack;

/// Writes one line of the report tree when a report sink is attached.
macro_rules! report {
    ($out:expr, $($arg:tt)*) => {
        if let Some(out) = $out.as_deref_mut() {
            writeln!(out, $($arg)*)?;
        }
    };
}

/// Outcome of a harness run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Every access succeeded and every read matched.
    Passed,
    /// At least one set recorded a nonzero code.
    Failed,
    /// A reset or flush is pending; nothing ran.
    Waiting,
}

impl Completion for Verdict {
    fn status(&self) -> Status {
        match self {
            Self::Passed => Status::Success,
            Self::Failed => Status::Failure,
            Self::Waiting => Status::Waiting,
        }
    }
}

/// Fuzz harness state: the generator and one failure accumulator per set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheTest {
    rng: XorShift64,
    sets: Vec<u32>,
}

impl CacheTest {
    /// Creates a harness sized for `geometry`.
    ///
    /// # Arguments
    ///
    /// * `geometry` - Geometry of the cache under test.
    /// * `seed` - Seed of the address and data generator.
    pub fn new(geometry: &Geometry, seed: u64) -> Self {
        Self {
            rng: XorShift64::new(seed),
            sets: vec![0; geometry.set_count()],
        }
    }

    /// Resizes the accumulators for another cache, discarding them if the set count differs.
    pub fn attach(&mut self, geometry: &Geometry) {
        if self.sets.len() != geometry.set_count() {
            self.sets = vec![0; geometry.set_count()];
        }
    }

    /// Per-set failure accumulators.
    pub fn accumulators(&self) -> &[u32] {
        &self.sets
    }

    /// Zeroes every accumulator.
    pub fn clear(&mut self) {
        self.sets.fill(0);
    }

    /// Runs the write/read/replace scenario over every set of `cache`.
    ///
    /// # Arguments
    ///
    /// * `cache` - Cache under test; normally freshly reset.
    /// * `out` - Receives the report tree when present.
    ///
    /// # Returns
    ///
    /// `Waiting` without touching the cache while a bulk operation is pending,
    /// otherwise `Passed` or `Failed`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if writing the report fails.
    pub fn run<P: ReplacementPolicy, W: WriteBack>(
        &mut self,
        cache: &mut Cache<'_, P, W>,
        mut out: Option<&mut dyn Write>,
    ) -> Result<Verdict, CacheError> {
        if let Some(op) = cache.status().pending() {
            debug!(%op, "harness refused, bulk operation pending");
            return Ok(Verdict::Waiting);
        }

        let geometry = *cache.geometry();
        self.attach(&geometry);

        let ways = geometry.ways();
        let mut wr_buf = vec![0u8; geometry.line_bytes()];
        let mut rd_buf = vec![0u8; geometry.line_bytes()];
        let mut codes = vec![0u32; ways];

        report!(out, "TEST CACHE");
        report!(out, ".---------");

        for set in 0..geometry.set_count() {
            report!(out, "| SET {set}");
            codes.fill(0);

            for (way, code) in codes.iter_mut().enumerate() {
                report!(out, "| | WAY {way}");
                let addr = self.random_address(&geometry, set);
                let len = self.random_data(&geometry, addr, &mut wr_buf);
                rd_buf.fill(0);

                let wr = cache.write(addr, &wr_buf[..len]).status();
                report!(out, "| | | WRITE {len} BYTES AT 0x{addr:X}: {wr}");

                let rd = cache.read(addr, &mut rd_buf[..len]).status();
                report!(out, "| | | READ  {len} BYTES AT 0x{addr:X}: {rd}");

                let cmp = wr_buf[..len].cmp(&rd_buf[..len]) as i8;
                report!(out, "| | | COMP  {len} BYTES: {cmp}");

                *code |= u32::from(wr.code_byte())
                    | u32::from(rd.code_byte()) << 8
                    | u32::from(cmp as u8) << 16;
            }

            for (way, code) in codes.iter_mut().enumerate() {
                report!(out, "| | WAY {way}");
                let addr = self.random_address(&geometry, set);
                let len = self.random_data(&geometry, addr, &mut wr_buf);

                let wr = cache.write(addr, &wr_buf[..len]).status();
                report!(out, "| | | REPL  {len} BYTES AT 0x{addr:X}: {wr}");

                *code |= u32::from(wr.code_byte()) << 24;
            }

            for (way, &code) in codes.iter().enumerate() {
                self.sets[set] |= code;
                report!(out, "| | CHECK WAY {way}: 0x{code:06X}");
            }
        }

        let verdict = if self.sets.iter().all(|&acc| acc == 0) {
            report!(out, "| TEST PASSED");
            Verdict::Passed
        } else {
            report!(out, "| TEST FAILED");
            Verdict::Failed
        };
        debug!(?verdict, "harness run finished");
        Ok(verdict)
    }

    /// Random address mapping to `set`, with a random tag and offset.
    fn random_address(&mut self, geometry: &Geometry, set: usize) -> u64 {
        let offset = (u64::from(self.rng.next_u32()) & geometry.offset_mask()) as usize;
        let tag = self.rng.next_u64() & geometry.tag_mask();
        geometry.compose(tag, set, offset)
    }

    /// Fills `buf` with random bytes from the offset of `addr` to the end of its line.
    ///
    /// Returns the number of bytes generated.
    fn random_data(&mut self, geometry: &Geometry, addr: u64, buf: &mut [u8]) -> usize {
        let len = geometry.line_bytes() - geometry.decompose(addr).offset;
        self.rng.fill(&mut buf[..len]);
        len
    }
}
