//! Global Cache Constants.
//!
//! This module defines constants shared by the geometry, header and policy code. It includes:
//! 1. **Header Layout:** Bit positions inside the per-way status byte.
//! 2. **Geometry Limits:** Widest address and field widths the model accepts.
//! 3. **Outcome Codes:** Signed codes of the three operation outcomes.

/// Number of bytes occupied by the status byte at the front of every way header.
pub const STATUS_BYTES: usize = 1;

/// Status byte bit marking a way as holding a line.
pub const VALID_BIT: u8 = 0x01;

/// Status byte bit marking a line as modified since it was last written back.
pub const DIRTY_BIT: u8 = 0x02;

/// First status byte bit available to replacement policies.
pub const META_SHIFT: u32 = 2;

/// Status byte bits owned by the replacement policy.
pub const META_MASK: u8 = !(VALID_BIT | DIRTY_BIT);

/// Number of metadata bits a policy may store in the status byte.
pub const META_BITS: u32 = u8::BITS - META_SHIFT;

/// Widest address the model can decompose.
pub const MAX_ADDRESS_BITS: u32 = u64::BITS;

/// Widest offset or index field.
///
/// Keeps `line_bytes` and `set_count` representable as `u32` values on every host.
pub const MAX_FIELD_BITS: u32 = 31;

/// Outcome code of a fully completed operation.
pub const CODE_SUCCESS: i8 = 0;

/// Outcome code of an operation that was held back by a pending bulk operation.
pub const CODE_WAITING: i8 = 1;

/// Outcome code of an operation that failed unrecoverably.
pub const CODE_FAILURE: i8 = -1;
