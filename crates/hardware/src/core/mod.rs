//! Cache model.
//!
//! This module contains the set-associative cache itself, from the address arithmetic
//! up to the resumable maintenance operations:
//! 1. **Geometry and headers:** Field widths, address decomposition and the tag codec.
//! 2. **Storage:** The line store, its ownership layouts and the set/way views.
//! 3. **Engine:** Construction, gated reads and writes, teardown.
//! 4. **Policies:** Replacement policies and write-back sinks the engine calls out to.
//! 5. **Bulk operations:** Resumable reset and flush.

/// Resumable reset and flush.
pub mod bulk;

/// Cache construction, access and teardown.
pub mod engine;

/// Field widths, masks and sizes derived from the address layout.
pub mod geometry;

/// Way header flags and the packed tag codec.
pub mod header;

/// Replacement policies.
pub mod policies;

/// Ownership and pending-operation flags.
pub mod status;

/// Data and header regions.
pub mod store;

/// Views of a set or way handed to policy callbacks.
pub mod view;

/// Write-back sinks.
pub mod writeback;

pub use self::bulk::{Bulk, FlushCursor, ResetCursor};
pub use self::engine::{Access, Cache, CacheBuilder, Placement};
pub use self::geometry::Geometry;
pub use self::policies::{ReplacementPolicy, Step};
pub use self::status::StatusRegister;
pub use self::store::{Layout, Region, Released};
pub use self::view::{SetMut, SetRef, WayRef};
pub use self::writeback::{DiscardWriteBack, DumpWriteBack, MemoryWriteBack, WriteBack};
