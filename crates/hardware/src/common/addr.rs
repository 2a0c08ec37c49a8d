//! Decomposed cache addresses.
//!
//! An address presented to the cache splits into three fields, from low to high bits:
//! 1. **Offset:** Byte position inside the line.
//! 2. **Set:** Index of the only set that may hold the line.
//! 3. **Tag:** Remaining high bits, stored in the way header to identify the line.

use std::fmt;

/// An address split into its tag, set index and byte offset.
///
/// Produced by [`Geometry::decompose`](crate::core::Geometry::decompose); every field is
/// already masked to the width of its bit-field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LineAddr {
    /// High-order address bits above the set index.
    pub tag: u64,
    /// Set selected by the index bits.
    pub set: usize,
    /// Byte offset inside the line.
    pub offset: usize,
}

impl LineAddr {
    /// Creates a decomposed address from already-masked fields.
    #[inline(always)]
    pub const fn new(tag: u64, set: usize, offset: usize) -> Self {
        Self { tag, set, offset }
    }
}

impl fmt::Display for LineAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tag={:#x} set={} offset={}",
            self.tag, self.set, self.offset
        )
    }
}
