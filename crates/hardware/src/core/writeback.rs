//! Write-Back Sinks.
//!
//! A flush hands every dirty way to a [`WriteBack`] sink. The sink decides what
//! "writing back" means and may yield when its backing store is not ready.
//!
//! # Sinks
//!
//! - `Discard`: Accepts every line and drops it.
//! - `Memory`: Collects written-back lines keyed by line address.
//! - `Dump`: Prints one row per dirty way to any `io::Write`.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{self, Write};

use super::policies::Step;
use super::view::WayRef;
use crate::common::PolicyError;
use crate::config::WriteBackKind;

/// Trait for flush targets.
pub trait WriteBack {
    /// Writes back one dirty way.
    ///
    /// Returning [`Step::Done`] lets the engine clear the dirty bit and continue;
    /// [`Step::Yield`] suspends the flush at this way.
    ///
    /// # Errors
    ///
    /// A [`PolicyError`] aborts the flush; the way stays dirty.
    fn flush_way(&mut self, way: WayRef<'_>) -> Result<Step, PolicyError>;

    /// Called once at the start of every flush call, resumed ones included.
    fn begin_flush(&mut self) {}
}

impl<S: WriteBack + ?Sized> WriteBack for Box<S> {
    fn flush_way(&mut self, way: WayRef<'_>) -> Result<Step, PolicyError> {
        (**self).flush_way(way)
    }

    fn begin_flush(&mut self) {
        (**self).begin_flush();
    }
}

/// Drops every line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DiscardWriteBack;

impl WriteBack for DiscardWriteBack {
    fn flush_way(&mut self, _way: WayRef<'_>) -> Result<Step, PolicyError> {
        Ok(Step::Done)
    }
}

/// Backing store held in memory.
///
/// A line written back twice keeps only its latest contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryWriteBack {
    lines: BTreeMap<u64, Vec<u8>>,
}

impl MemoryWriteBack {
    /// Creates an empty store.
    pub const fn new() -> Self {
        Self {
            lines: BTreeMap::new(),
        }
    }

    /// Contents last written back for the line at `addr`.
    pub fn line(&self, addr: u64) -> Option<&[u8]> {
        self.lines.get(&addr).map(Vec::as_slice)
    }

    /// Every stored line, ordered by address.
    pub const fn lines(&self) -> &BTreeMap<u64, Vec<u8>> {
        &self.lines
    }

    /// Number of distinct lines stored.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing was written back yet.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl WriteBack for MemoryWriteBack {
    fn flush_way(&mut self, way: WayRef<'_>) -> Result<Step, PolicyError> {
        let _ = self.lines.insert(way.line_address(), way.data().to_vec());
        Ok(Step::Done)
    }
}

/// Prints dirty ways as a table, one block per set.
///
/// Every flush call opens a new block, even when it continues in the set where the
/// previous one stopped.
///
/// Rows read `way [ V D ref 0xTAG | bytes.. ]`; an upper-case letter means the flag is
/// set. `ref` is the way's reference counter as kept by
/// [`RefCountLru`](super::policies::RefCountLru).
pub struct DumpWriteBack<W: Write> {
    out: W,
    last_set: Option<usize>,
}

impl<W: Write> DumpWriteBack<W> {
    /// Creates a sink printing to `out`.
    pub const fn new(out: W) -> Self {
        Self {
            out,
            last_set: None,
        }
    }

    /// The underlying writer.
    pub const fn get_ref(&self) -> &W {
        &self.out
    }

    fn print(&mut self, way: WayRef<'_>) -> io::Result<()> {
        if self.last_set != Some(way.set()) {
            writeln!(self.out, "\nSet {}", way.set())?;
            self.last_set = Some(way.set());
        }

        let ways = way.geometry().ways();
        let rank = way.meta() & (ways - 1) as u8;
        write!(
            self.out,
            "{:X} [ {} {} {:X} 0x{:016X} |",
            way.way(),
            if way.is_valid() { 'V' } else { 'v' },
            if way.is_dirty() { 'D' } else { 'd' },
            rank,
            way.tag()
        )?;
        for byte in way.data() {
            write!(self.out, " {byte:02X}")?;
        }
        writeln!(self.out, " ]")
    }
}

impl<W: Write> WriteBack for DumpWriteBack<W> {
    fn flush_way(&mut self, way: WayRef<'_>) -> Result<Step, PolicyError> {
        self.print(way)
            .map_err(|err| PolicyError::Backend(err.to_string()))?;
        Ok(Step::Done)
    }

    fn begin_flush(&mut self) {
        self.last_set = None;
    }
}

impl<W: Write> fmt::Debug for DumpWriteBack<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DumpWriteBack")
            .field("last_set", &self.last_set)
            .finish_non_exhaustive()
    }
}

/// Builds the sink named by a configuration value; the dump sink prints to stdout.
pub fn build(kind: WriteBackKind) -> Box<dyn WriteBack> {
    match kind {
        WriteBackKind::Dump => Box::new(DumpWriteBack::new(io::stdout())),
        WriteBackKind::Memory => Box::new(MemoryWriteBack::new()),
        WriteBackKind::Discard => Box::new(DiscardWriteBack),
    }
}
