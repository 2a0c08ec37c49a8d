//! Way header codec.
//!
//! Every way of the cache owns a header of [`Geometry::header_bytes`](super::Geometry::header_bytes)
//! bytes:
//!
//! ```text
//! byte 0                 bytes 1..
//! +---+---+-----------+  +---------+---------+-----+-------------------+
//! | V | D | policy    |  | tag 7:0 | tag15:8 | ... | tag high (masked) |
//! +---+---+-----------+  +---------+---------+-----+-------------------+
//!  b0  b1  b2..b7
//! ```
//!
//! The tag is stored least-significant byte first. When `tag_bits` is not a multiple of
//! eight the last byte holds only the remaining high bits and its unused upper bits are
//! always zero. Policy bits are opaque to the engine.

use crate::common::constants::{DIRTY_BIT, META_MASK, META_SHIFT, STATUS_BYTES, VALID_BIT};

/// Whether the way holds a line.
#[inline(always)]
pub fn is_valid(header: &[u8]) -> bool {
    header[0] & VALID_BIT != 0
}

/// Whether the line was modified since it was last written back.
#[inline(always)]
pub fn is_dirty(header: &[u8]) -> bool {
    header[0] & DIRTY_BIT != 0
}

/// Marks the way as holding a line.
#[inline(always)]
pub fn set_valid(header: &mut [u8]) {
    header[0] |= VALID_BIT;
}

/// Marks the way as empty.
#[inline(always)]
pub fn clear_valid(header: &mut [u8]) {
    header[0] &= !VALID_BIT;
}

/// Marks the line as modified.
#[inline(always)]
pub fn set_dirty(header: &mut [u8]) {
    header[0] |= DIRTY_BIT;
}

/// Marks the line as written back.
#[inline(always)]
pub fn clear_dirty(header: &mut [u8]) {
    header[0] &= !DIRTY_BIT;
}

/// Policy-owned bits of the status byte, shifted down to bit 0.
#[inline(always)]
pub fn meta(header: &[u8]) -> u8 {
    (header[0] & META_MASK) >> META_SHIFT
}

/// Replaces the policy-owned bits, leaving valid and dirty untouched.
///
/// Bits of `value` that do not fit in the metadata field are dropped.
#[inline(always)]
pub fn set_meta(header: &mut [u8], value: u8) {
    header[0] = (header[0] & !META_MASK) | ((value << META_SHIFT) & META_MASK);
}

/// Packs the low `tag_bits` bits of `tag` into the header bytes after the status byte.
///
/// # Panics
///
/// Panics if `header` is shorter than `1 + ceil(tag_bits / 8)` bytes.
pub fn pack_tag(header: &mut [u8], tag_bits: u32, tag: u64) {
    let bytes = &mut header[STATUS_BYTES..];
    let whole = (tag_bits / 8) as usize;
    let rem = tag_bits % 8;

    let mut value = tag;
    for byte in &mut bytes[..whole] {
        *byte = value as u8;
        value >>= 8;
    }

    if rem != 0 {
        let mask = (1u8 << rem) - 1;
        bytes[whole] = (value as u8) & mask;
    }
}

/// Reconstructs the tag packed by [`pack_tag`].
///
/// All bits at or above `tag_bits` in the result are zero.
///
/// # Panics
///
/// Panics if `header` is shorter than `1 + ceil(tag_bits / 8)` bytes.
pub fn unpack_tag(header: &[u8], tag_bits: u32) -> u64 {
    let bytes = &header[STATUS_BYTES..];
    let whole = (tag_bits / 8) as usize;
    let rem = tag_bits % 8;

    let mut tag = bytes[..whole]
        .iter()
        .rev()
        .fold(0u64, |acc, &byte| (acc << 8) | byte as u64);

    if rem != 0 {
        let mask = (1u8 << rem) - 1;
        tag |= ((bytes[whole] & mask) as u64) << (whole * 8);
    }

    tag
}
