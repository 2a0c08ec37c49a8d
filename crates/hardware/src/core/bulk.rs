//! Resumable whole-cache maintenance.
//!
//! Reset and flush walk every set (and, for flush, every way) and call out to the
//! policy for each step. A callback may yield; the walk then stops, records where it
//! stopped in the caller's cursor and raises the pending flag of the operation. While
//! any pending flag is raised the cache refuses foreground reads and writes.
//!
//! 1. **Reset:** `reset_set` for each set from `cursor.set`.
//! 2. **Flush:** `flush_way` for each dirty way from `(cursor.set, cursor.way)`; the dirty
//!    bit is cleared once the sink accepts the line. Lines stay valid.
//!
//! Completing a walk clears its pending flag and rewinds the cursor. A callback error
//! aborts the walk and leaves both the cursor and the flags as they were.

use tracing::{debug, warn};

use super::engine::Cache;
use super::header;
use super::policies::{ReplacementPolicy, Step};
use super::writeback::WriteBack;
use crate::common::{BulkOp, CacheError, Completion, PolicyError, Status};

/// Position of a suspended reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResetCursor {
    /// Next set to reset.
    pub set: usize,
}

/// Position of a suspended flush.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FlushCursor {
    /// Set of the next way to inspect.
    pub set: usize,
    /// Next way to inspect within `set`.
    pub way: usize,
}

/// Outcome of one call to a bulk operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bulk {
    /// Every set (or way) was processed.
    Complete,
    /// A callback yielded; call again with the same cursor to resume.
    Suspended,
}

impl Completion for Bulk {
    fn status(&self) -> Status {
        match self {
            Self::Complete => Status::Success,
            Self::Suspended => Status::Waiting,
        }
    }
}

impl<P: ReplacementPolicy, W: WriteBack> Cache<'_, P, W> {
    /// Re-initialises every set from `cursor.set` onwards through the policy.
    ///
    /// # Returns
    ///
    /// `Complete` once the last set is done, `Suspended` if the policy yielded.
    ///
    /// # Errors
    ///
    /// [`CacheError::Policy`] if a `reset_set` callback fails.
    pub fn reset(&mut self, cursor: &mut ResetCursor) -> Result<Bulk, CacheError> {
        for set in cursor.set..self.geometry.set_count() {
            let view = self.store.set_mut(&self.geometry, set);
            match self.policy.reset_set(view) {
                Ok(Step::Done) => {}
                Ok(Step::Yield) => {
                    cursor.set = set;
                    return Ok(self.suspend(BulkOp::Reset));
                }
                Err(err) => return Err(Self::abort(BulkOp::Reset, err)),
            }
        }

        *cursor = ResetCursor::default();
        self.stats.resets += 1;
        Ok(self.complete(BulkOp::Reset))
    }

    /// Hands every dirty way from `(cursor.set, cursor.way)` onwards to the write-back sink.
    ///
    /// # Returns
    ///
    /// `Complete` once the last way is done, `Suspended` if the sink yielded.
    ///
    /// # Errors
    ///
    /// [`CacheError::Policy`] if a `flush_way` callback fails; that way stays dirty.
    pub fn flush(&mut self, cursor: &mut FlushCursor) -> Result<Bulk, CacheError> {
        let ways = self.geometry.ways();
        let mut first_way = cursor.way;
        self.writeback.begin_flush();

        for set in cursor.set..self.geometry.set_count() {
            for way in first_way..ways {
                let view = self.store.set(&self.geometry, set);
                if !view.is_dirty(way) {
                    continue;
                }
                match self.writeback.flush_way(view.way(way)) {
                    Ok(Step::Done) => {
                        let mut view = self.store.set_mut(&self.geometry, set);
                        header::clear_dirty(view.header_mut(way));
                        self.stats.writebacks += 1;
                    }
                    Ok(Step::Yield) => {
                        *cursor = FlushCursor { set, way };
                        return Ok(self.suspend(BulkOp::Flush));
                    }
                    Err(err) => return Err(Self::abort(BulkOp::Flush, err)),
                }
            }
            first_way = 0;
        }

        *cursor = FlushCursor::default();
        Ok(self.complete(BulkOp::Flush))
    }

    /// Runs a reset from the first set.
    ///
    /// # Errors
    ///
    /// See [`Cache::reset`].
    pub fn reset_all(&mut self) -> Result<Bulk, CacheError> {
        self.reset(&mut ResetCursor::default())
    }

    /// Runs a flush from the first way of the first set.
    ///
    /// # Errors
    ///
    /// See [`Cache::flush`].
    pub fn flush_all(&mut self) -> Result<Bulk, CacheError> {
        self.flush(&mut FlushCursor::default())
    }

    fn suspend(&mut self, op: BulkOp) -> Bulk {
        self.status.set_pending(op);
        debug!(%op, "bulk operation suspended");
        Bulk::Suspended
    }

    fn complete(&mut self, op: BulkOp) -> Bulk {
        self.status.clear_pending(op);
        debug!(%op, "bulk operation complete");
        Bulk::Complete
    }

    fn abort(op: BulkOp, err: PolicyError) -> CacheError {
        warn!(%op, %err, "bulk operation failed");
        err.into()
    }
}
