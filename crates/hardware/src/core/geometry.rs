//! Cache Geometry.
//!
//! Derives every bit-field width, count, mask and region size of a cache from four
//! parameters: address width, block-offset width, set-index width and associativity.
//! All values are computed once in [`Geometry::new`] and never change afterwards.
//!
//! # Address Layout
//!
//! ```text
//!  address_bits-1          tag_start_bit   offset_bits     0
//! +------------------------+---------------+---------------+
//! |          tag           |   set index   |    offset     |
//! +------------------------+---------------+---------------+
//! ```

use std::fmt;

use crate::common::LineAddr;
use crate::common::constants::{MAX_ADDRESS_BITS, MAX_FIELD_BITS, STATUS_BYTES};
use crate::common::error::CacheError;

/// Returns a mask with the low `bits` bits set.
#[inline(always)]
pub const fn low_mask(bits: u32) -> u64 {
    if bits >= u64::BITS {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Immutable shape of a set-associative cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Geometry {
    address_bits: u32,
    offset_bits: u32,
    index_bits: u32,
    tag_start_bit: u32,
    tag_bits: u32,
    set_count: usize,
    ways: usize,
    line_bytes: usize,
    header_bytes: usize,
    tag_mask: u64,
    set_mask: u64,
    offset_mask: u64,
    set_data_bytes: usize,
    set_header_bytes: usize,
    data_bytes: usize,
    header_region_bytes: usize,
}

impl Geometry {
    /// Derives a geometry and validates it.
    ///
    /// # Arguments
    ///
    /// * `address_bits` - Width of the addresses presented to the cache (1..=64).
    /// * `offset_bits` - Width of the byte-offset field; lines hold `2^offset_bits` bytes.
    /// * `index_bits` - Width of the set-index field; the cache has `2^index_bits` sets.
    /// * `ways` - Associativity; must be a nonzero power of two.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Geometry`] when the fields leave no room for a tag, a field
    /// is wider than 31 bits, `ways` is not a power of two, or the regions would not fit
    /// in the address space of the host.
    pub fn new(
        address_bits: u32,
        offset_bits: u32,
        index_bits: u32,
        ways: usize,
    ) -> Result<Self, CacheError> {
        if address_bits == 0 || address_bits > MAX_ADDRESS_BITS {
            return Err(CacheError::Geometry(format!(
                "address width {address_bits} is outside 1..={MAX_ADDRESS_BITS}"
            )));
        }
        if offset_bits > MAX_FIELD_BITS || index_bits > MAX_FIELD_BITS {
            return Err(CacheError::Geometry(format!(
                "offset ({offset_bits}) and index ({index_bits}) fields are limited to {MAX_FIELD_BITS} bits"
            )));
        }
        let tag_start_bit = offset_bits + index_bits;
        if tag_start_bit >= address_bits {
            return Err(CacheError::Geometry(format!(
                "offset ({offset_bits}) + index ({index_bits}) bits leave no tag in a {address_bits}-bit address"
            )));
        }
        if !ways.is_power_of_two() {
            return Err(CacheError::Geometry(format!(
                "associativity {ways} is not a nonzero power of two"
            )));
        }

        let tag_bits = address_bits - tag_start_bit;
        let set_count = 1usize << index_bits;
        let line_bytes = 1usize << offset_bits;
        let header_bytes = STATUS_BYTES + tag_bits.div_ceil(8) as usize;

        let overflow = || CacheError::Geometry("line store does not fit in memory".to_string());
        let set_data_bytes = ways.checked_mul(line_bytes).ok_or_else(overflow)?;
        let set_header_bytes = ways.checked_mul(header_bytes).ok_or_else(overflow)?;
        let data_bytes = set_count
            .checked_mul(set_data_bytes)
            .ok_or_else(overflow)?;
        let header_region_bytes = set_count
            .checked_mul(set_header_bytes)
            .ok_or_else(overflow)?;
        let _ = data_bytes
            .checked_add(header_region_bytes)
            .ok_or_else(overflow)?;

        Ok(Self {
            address_bits,
            offset_bits,
            index_bits,
            tag_start_bit,
            tag_bits,
            set_count,
            ways,
            line_bytes,
            header_bytes,
            tag_mask: low_mask(tag_bits),
            set_mask: low_mask(index_bits),
            offset_mask: low_mask(offset_bits),
            set_data_bytes,
            set_header_bytes,
            data_bytes,
            header_region_bytes,
        })
    }

    /// Width of addresses presented to the cache.
    #[inline(always)]
    pub const fn address_bits(&self) -> u32 {
        self.address_bits
    }

    /// Width of the byte-offset field.
    #[inline(always)]
    pub const fn offset_bits(&self) -> u32 {
        self.offset_bits
    }

    /// Width of the set-index field.
    #[inline(always)]
    pub const fn index_bits(&self) -> u32 {
        self.index_bits
    }

    /// Lowest bit of the tag field (`offset_bits + index_bits`).
    #[inline(always)]
    pub const fn tag_start_bit(&self) -> u32 {
        self.tag_start_bit
    }

    /// Width of the tag field.
    #[inline(always)]
    pub const fn tag_bits(&self) -> u32 {
        self.tag_bits
    }

    /// Number of sets (`2^index_bits`).
    #[inline(always)]
    pub const fn set_count(&self) -> usize {
        self.set_count
    }

    /// Associativity.
    #[inline(always)]
    pub const fn ways(&self) -> usize {
        self.ways
    }

    /// Bytes per line (`2^offset_bits`).
    #[inline(always)]
    pub const fn line_bytes(&self) -> usize {
        self.line_bytes
    }

    /// Bytes per way header: one status byte plus the byte-aligned tag.
    #[inline(always)]
    pub const fn header_bytes(&self) -> usize {
        self.header_bytes
    }

    /// Mask exactly as wide as the tag field.
    #[inline(always)]
    pub const fn tag_mask(&self) -> u64 {
        self.tag_mask
    }

    /// Mask exactly as wide as the set-index field.
    #[inline(always)]
    pub const fn set_mask(&self) -> u64 {
        self.set_mask
    }

    /// Mask exactly as wide as the offset field.
    #[inline(always)]
    pub const fn offset_mask(&self) -> u64 {
        self.offset_mask
    }

    /// Data bytes of one set.
    #[inline(always)]
    pub const fn set_data_bytes(&self) -> usize {
        self.set_data_bytes
    }

    /// Header bytes of one set.
    #[inline(always)]
    pub const fn set_header_bytes(&self) -> usize {
        self.set_header_bytes
    }

    /// Size of the whole data region.
    #[inline(always)]
    pub const fn data_bytes(&self) -> usize {
        self.data_bytes
    }

    /// Size of the whole header region.
    #[inline(always)]
    pub const fn header_region_bytes(&self) -> usize {
        self.header_region_bytes
    }

    /// Size of a combined allocation holding both regions.
    #[inline(always)]
    pub const fn total_bytes(&self) -> usize {
        self.data_bytes + self.header_region_bytes
    }

    /// Splits `addr` into tag, set index and byte offset.
    ///
    /// Bits above `address_bits` are ignored.
    #[inline(always)]
    pub const fn decompose(&self, addr: u64) -> LineAddr {
        LineAddr {
            tag: (addr >> self.tag_start_bit) & self.tag_mask,
            set: ((addr >> self.offset_bits) & self.set_mask) as usize,
            offset: (addr & self.offset_mask) as usize,
        }
    }

    /// Rebuilds an address from its fields; the inverse of [`Geometry::decompose`].
    ///
    /// Each field is masked to its width first.
    #[inline(always)]
    pub const fn compose(&self, tag: u64, set: usize, offset: usize) -> u64 {
        let tag = tag & self.tag_mask;
        let set = set as u64 & self.set_mask;
        let offset = offset as u64 & self.offset_mask;
        (tag << self.tag_start_bit) | (set << self.offset_bits) | offset
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-bit addresses, {} sets x {} ways x {}-byte lines, {}-byte headers ({} tag bits)",
            self.address_bits,
            self.set_count,
            self.ways,
            self.line_bytes,
            self.header_bytes,
            self.tag_bits
        )
    }
}
