//! Cache status register.
//!
//! Five flags describe what a cache instance owns and whether a bulk operation is
//! suspended. The raw bits never leave this module; callers use the named
//! predicates and the crate-internal mutators.

use std::fmt;

use crate::common::BulkOp;

const STRUCT_OWNED: u8 = 1 << 0;
const BUFFERS_OWNED: u8 = 1 << 1;
const HEADER_SUB_RANGE: u8 = 1 << 2;
const RESET_PENDING: u8 = 1 << 4;
const FLUSH_PENDING: u8 = 1 << 5;

/// Ownership and bulk-operation flags of a cache.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StatusRegister {
    bits: u8,
}

impl StatusRegister {
    /// The cache itself lives in an allocation made by the builder.
    pub const fn struct_owned(self) -> bool {
        self.bits & STRUCT_OWNED != 0
    }

    /// The line store holds at least one region allocated by the builder.
    pub const fn buffers_owned(self) -> bool {
        self.bits & BUFFERS_OWNED != 0
    }

    /// The header region is the tail of the data allocation and is never released on its own.
    pub const fn header_sub_range(self) -> bool {
        self.bits & HEADER_SUB_RANGE != 0
    }

    /// A reset suspended and has not yet been resumed to completion.
    pub const fn reset_pending(self) -> bool {
        self.bits & RESET_PENDING != 0
    }

    /// A flush suspended and has not yet been resumed to completion.
    pub const fn flush_pending(self) -> bool {
        self.bits & FLUSH_PENDING != 0
    }

    /// The bulk operation currently blocking foreground access, reset first.
    pub const fn pending(self) -> Option<BulkOp> {
        if self.reset_pending() {
            Some(BulkOp::Reset)
        } else if self.flush_pending() {
            Some(BulkOp::Flush)
        } else {
            None
        }
    }

    pub(crate) const fn set_struct_owned(&mut self) {
        self.bits |= STRUCT_OWNED;
    }

    pub(crate) const fn clear_struct_owned(&mut self) {
        self.bits &= !STRUCT_OWNED;
    }

    pub(crate) const fn set_buffers_owned(&mut self) {
        self.bits |= BUFFERS_OWNED;
    }

    pub(crate) const fn clear_buffers_owned(&mut self) {
        self.bits &= !BUFFERS_OWNED;
    }

    pub(crate) const fn set_header_sub_range(&mut self) {
        self.bits |= HEADER_SUB_RANGE;
    }

    pub(crate) const fn set_pending(&mut self, op: BulkOp) {
        self.bits |= Self::pending_bit(op);
    }

    pub(crate) const fn clear_pending(&mut self, op: BulkOp) {
        self.bits &= !Self::pending_bit(op);
    }

    const fn pending_bit(op: BulkOp) -> u8 {
        match op {
            BulkOp::Reset => RESET_PENDING,
            BulkOp::Flush => FLUSH_PENDING,
        }
    }
}

impl fmt::Debug for StatusRegister {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusRegister")
            .field("struct_owned", &self.struct_owned())
            .field("buffers_owned", &self.buffers_owned())
            .field("header_sub_range", &self.header_sub_range())
            .field("reset_pending", &self.reset_pending())
            .field("flush_pending", &self.flush_pending())
            .finish()
    }
}
