//! Set-associative cache engine.
//!
//! This module implements the foreground half of the cache model. It provides:
//! 1. **Construction:** A builder that allocates the line store or adopts caller buffers.
//! 2. **Access:** Gated `read` and `write` with hit, allocate and replace placement.
//! 3. **Lifecycle:** Teardown that releases exactly the resources the cache owns.
//!
//! The engine never picks a victim or writes a line back on its own; both are delegated
//! to the [`ReplacementPolicy`] and [`WriteBack`] the cache was built with. Whole-cache
//! reset and flush live in [`bulk`](super::bulk).

use std::fmt;

use tracing::{debug, trace, warn};

use super::geometry::Geometry;
use super::header;
use super::policies::ReplacementPolicy;
use super::status::StatusRegister;
use super::store::{Layout, LineStore, Region, Released};
use super::view::{SetRef, WayRef};
use super::writeback::WriteBack;
use crate::common::{CacheError, Completion, LineAddr, PolicyError, Status};
use crate::stats::CacheStats;

/// How a successful access found its way.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Placement {
    /// A valid way already held the line.
    Hit,
    /// The line was installed in the first invalid way.
    Allocated,
    /// The line replaced the victim chosen by the policy.
    Replaced,
}

/// Result of a successful read or write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Access {
    /// Set the address mapped to.
    pub set: usize,
    /// Way that served the access.
    pub way: usize,
    /// Byte offset inside the line.
    pub offset: usize,
    /// Bytes copied after clamping to the end of the line.
    pub len: usize,
    /// How the way was found.
    pub placement: Placement,
}

impl Completion for Access {
    fn status(&self) -> Status {
        Status::Success
    }
}

/// Configures and constructs a [`Cache`].
///
/// Buffers are optional; whatever is not supplied is allocated.
pub struct CacheBuilder<'a, P, W> {
    geometry: Geometry,
    policy: P,
    writeback: W,
    data: Option<&'a mut [u8]>,
    headers: Option<&'a mut [u8]>,
}

impl<'a, P: ReplacementPolicy, W: WriteBack> CacheBuilder<'a, P, W> {
    /// Starts a builder for the given geometry and policies.
    ///
    /// # Arguments
    ///
    /// * `geometry` - Validated cache geometry.
    /// * `policy` - Replacement policy (reset, touch and victim callbacks).
    /// * `writeback` - Sink receiving dirty ways during a flush.
    pub const fn new(geometry: Geometry, policy: P, writeback: W) -> Self {
        Self {
            geometry,
            policy,
            writeback,
            data: None,
            headers: None,
        }
    }

    /// Uses `buf` for line data.
    ///
    /// Without a header buffer, `buf` must also hold the header region after the data
    /// (`geometry.total_bytes()` in all); with one, `geometry.data_bytes()` suffices.
    #[must_use]
    pub fn data_buffer(mut self, buf: &'a mut [u8]) -> Self {
        self.data = Some(buf);
        self
    }

    /// Uses `buf` for the way headers (`geometry.header_region_bytes()` bytes).
    #[must_use]
    pub fn header_buffer(mut self, buf: &'a mut [u8]) -> Self {
        self.headers = Some(buf);
        self
    }

    /// Builds a cache owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::BufferTooSmall`] for an undersized caller buffer and
    /// [`CacheError::Allocation`] when the line store cannot be allocated. Nothing is
    /// retained on failure.
    pub fn build(self) -> Result<Cache<'a, P, W>, CacheError> {
        let geometry = self.geometry;
        let (layout, status) = Self::layout(&geometry, self.data, self.headers)?;
        debug!(%geometry, ?status, "cache built");
        Ok(Cache {
            geometry,
            status,
            store: LineStore::new(layout),
            policy: self.policy,
            writeback: self.writeback,
            stats: CacheStats::default(),
        })
    }

    /// Builds a heap-allocated cache that releases itself on [`Cache::destroy`].
    ///
    /// # Errors
    ///
    /// Same as [`CacheBuilder::build`].
    pub fn build_boxed(self) -> Result<Box<Cache<'a, P, W>>, CacheError> {
        let mut cache = Box::new(self.build()?);
        cache.status.set_struct_owned();
        Ok(cache)
    }

    fn layout(
        geometry: &Geometry,
        data: Option<&'a mut [u8]>,
        headers: Option<&'a mut [u8]>,
    ) -> Result<(Layout<'a>, StatusRegister), CacheError> {
        let mut status = StatusRegister::default();
        let split = geometry.data_bytes();

        let layout = match (data, headers) {
            (None, None) => {
                status.set_buffers_owned();
                status.set_header_sub_range();
                Layout::Combined {
                    region: Region::allocate(geometry.total_bytes())?,
                    split,
                }
            }
            (None, Some(headers)) => {
                check_len("header", geometry.header_region_bytes(), headers)?;
                let data = Region::allocate(geometry.data_bytes())?;
                status.set_buffers_owned();
                Layout::Split {
                    data,
                    headers: Region::Borrowed(headers),
                }
            }
            (Some(data), None) => {
                check_len("data", geometry.total_bytes(), data)?;
                status.set_header_sub_range();
                Layout::Combined {
                    region: Region::Borrowed(data),
                    split,
                }
            }
            (Some(data), Some(headers)) => {
                check_len("data", geometry.data_bytes(), data)?;
                check_len("header", geometry.header_region_bytes(), headers)?;
                Layout::Split {
                    data: Region::Borrowed(data),
                    headers: Region::Borrowed(headers),
                }
            }
        };

        Ok((layout, status))
    }
}

fn check_len(region: &'static str, required: usize, buf: &[u8]) -> Result<(), CacheError> {
    if buf.len() < required {
        return Err(CacheError::BufferTooSmall {
            region,
            required,
            actual: buf.len(),
        });
    }
    Ok(())
}

impl<P, W> fmt::Debug for CacheBuilder<'_, P, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheBuilder")
            .field("geometry", &self.geometry)
            .field("data", &self.data.as_ref().map(|buf| buf.len()))
            .field("headers", &self.headers.as_ref().map(|buf| buf.len()))
            .finish_non_exhaustive()
    }
}

/// A set-associative cache over caller-chosen policies.
///
/// `'a` is the lifetime of any caller-supplied buffer; caches that own their line
/// store can be `Cache<'static, P, W>`.
pub struct Cache<'a, P, W> {
    pub(super) geometry: Geometry,
    pub(super) status: StatusRegister,
    pub(super) store: LineStore<'a>,
    pub(super) policy: P,
    pub(super) writeback: W,
    pub(super) stats: CacheStats,
}

impl<'a, P: ReplacementPolicy, W: WriteBack> Cache<'a, P, W> {
    /// Shorthand for [`CacheBuilder::new`].
    pub const fn builder(geometry: Geometry, policy: P, writeback: W) -> CacheBuilder<'a, P, W> {
        CacheBuilder::new(geometry, policy, writeback)
    }

    /// Writes `bytes` at `addr`, installing the line if it is not present.
    ///
    /// At most `line_bytes - offset` bytes are written; the rest of `bytes` is ignored,
    /// so a slice of at least that length fills the line to its end. The way is marked
    /// valid and dirty and the policy is touched.
    ///
    /// # Errors
    ///
    /// - [`CacheError::Waiting`] while a reset or flush is pending; nothing is modified.
    /// - [`CacheError::EmptyWrite`] when `bytes` is empty; the set is not touched.
    /// - [`CacheError::Policy`] when the set is full and the policy names no usable victim.
    pub fn write(&mut self, addr: u64, bytes: &[u8]) -> Result<Access, CacheError> {
        self.gate()?;
        if bytes.is_empty() {
            return Err(CacheError::EmptyWrite { addr });
        }
        self.stats.writes += 1;

        let LineAddr { tag, set, offset } = self.geometry.decompose(addr);
        let len = bytes.len().min(self.geometry.line_bytes() - offset);
        let (way, placement) = self.place(set, tag)?;

        let tag_bits = self.geometry.tag_bits();
        let mut view = self.store.set_mut(&self.geometry, set);
        let hdr = view.header_mut(way);
        if placement != Placement::Hit {
            header::pack_tag(hdr, tag_bits, tag);
            header::set_valid(hdr);
        }
        header::set_dirty(hdr);
        view.line_mut(way)[offset..offset + len].copy_from_slice(&bytes[..len]);
        self.policy.touch(view, way);

        match placement {
            Placement::Hit => self.stats.write_hits += 1,
            Placement::Allocated => self.stats.allocations += 1,
            Placement::Replaced => self.stats.replacements += 1,
        }
        trace!(addr, set, way, len, ?placement, "write");

        Ok(Access {
            set,
            way,
            offset,
            len,
            placement,
        })
    }

    /// Reads up to `buf.len()` bytes at `addr` into `buf`.
    ///
    /// At most `line_bytes - offset` bytes are copied. A hit touches the policy.
    ///
    /// # Errors
    ///
    /// - [`CacheError::Waiting`] while a reset or flush is pending.
    /// - [`CacheError::Miss`] when no valid way holds the line; nothing is allocated.
    pub fn read(&mut self, addr: u64, buf: &mut [u8]) -> Result<Access, CacheError> {
        self.gate()?;
        self.stats.reads += 1;

        let LineAddr { tag, set, offset } = self.geometry.decompose(addr);
        let Some(way) = self.store.set(&self.geometry, set).find(tag) else {
            self.stats.read_misses += 1;
            trace!(addr, set, "read miss");
            return Err(CacheError::Miss { addr });
        };

        let len = buf.len().min(self.geometry.line_bytes() - offset);
        let view = self.store.set_mut(&self.geometry, set);
        buf[..len].copy_from_slice(&view.line(way)[offset..offset + len]);
        self.policy.touch(view, way);

        self.stats.read_hits += 1;
        trace!(addr, set, way, len, "read hit");

        Ok(Access {
            set,
            way,
            offset,
            len,
            placement: Placement::Hit,
        })
    }

    /// Way holding `addr`, if any, without touching the policy or the gate.
    pub fn probe(&self, addr: u64) -> Option<usize> {
        let LineAddr { tag, set, .. } = self.geometry.decompose(addr);
        self.store.set(&self.geometry, set).find(tag)
    }

    /// Finds the way for a write: the matching way, the first invalid way, or a victim.
    fn place(&mut self, set: usize, tag: u64) -> Result<(usize, Placement), CacheError> {
        let view = self.store.set(&self.geometry, set);
        if let Some(way) = view.find(tag) {
            return Ok((way, Placement::Hit));
        }
        if let Some(way) = view.first_invalid() {
            return Ok((way, Placement::Allocated));
        }

        let ways = self.geometry.ways();
        let way = self
            .policy
            .select_victim(view)
            .and_then(|way| {
                if way < ways {
                    Ok(way)
                } else {
                    Err(PolicyError::VictimOutOfRange { way, ways })
                }
            })
            .inspect_err(|err| warn!(set, %err, "victim selection failed"))?;
        Ok((way, Placement::Replaced))
    }

    /// Refuses foreground access while a bulk operation is pending.
    fn gate(&mut self) -> Result<(), CacheError> {
        match self.status.pending() {
            Some(op) => {
                self.stats.waits += 1;
                trace!(%op, "access refused, bulk operation pending");
                Err(CacheError::Waiting(op))
            }
            None => Ok(()),
        }
    }
}

impl<'a, P, W> Cache<'a, P, W> {
    /// Geometry the cache was built with.
    pub const fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Ownership and pending-operation flags.
    pub const fn status(&self) -> StatusRegister {
        self.status
    }

    /// Layout of the line store.
    pub const fn layout(&self) -> &Layout<'a> {
        self.store.layout()
    }

    /// Access counters.
    pub const fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Zeroes the access counters.
    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// The replacement policy.
    pub const fn policy(&self) -> &P {
        &self.policy
    }

    /// The replacement policy, mutably.
    pub const fn policy_mut(&mut self) -> &mut P {
        &mut self.policy
    }

    /// The write-back sink.
    pub const fn writeback(&self) -> &W {
        &self.writeback
    }

    /// The write-back sink, mutably.
    pub const fn writeback_mut(&mut self) -> &mut W {
        &mut self.writeback
    }

    /// Read-only view of `set`, or `None` past the last set.
    pub fn set(&self, set: usize) -> Option<SetRef<'_>> {
        (set < self.geometry.set_count()).then(|| self.store.set(&self.geometry, set))
    }

    /// Read-only view of one way, or `None` when out of range.
    pub fn way(&self, set: usize, way: usize) -> Option<WayRef<'_>> {
        let view = self.set(set)?;
        (way < self.geometry.ways()).then(|| view.way(way))
    }

    /// Releases the owned line store, then the cache itself.
    ///
    /// Borrowed buffers are left untouched and become available to the caller again.
    pub fn teardown(mut self) -> Released {
        let mut released = self.release();
        released.struct_released = self.status.struct_owned();
        released
    }

    /// Tears down a heap-allocated cache; `None` is a no-op.
    ///
    /// The line store is released before the allocation holding the cache.
    pub fn destroy(cache: Option<Box<Self>>) -> Option<Released> {
        let mut cache = cache?;
        let mut released = cache.release();
        released.struct_released = cache.status.struct_owned();
        cache.status.clear_struct_owned();
        drop(cache);
        Some(released)
    }

    fn release(&mut self) -> Released {
        let released = self.store.release();
        self.status.clear_buffers_owned();
        debug!(
            data_bytes = released.data_bytes,
            header_bytes = released.header_bytes,
            "cache torn down"
        );
        released
    }
}

impl<P, W> fmt::Debug for Cache<'_, P, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("geometry", &self.geometry)
            .field("status", &self.status)
            .field("store", &self.store)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
