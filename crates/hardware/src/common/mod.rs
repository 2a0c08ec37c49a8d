//! Common utilities and types used throughout the cache model.
//!
//! This module provides the building blocks shared by every component. It includes:
//! 1. **Address Types:** Decomposed tag / set / offset addresses.
//! 2. **Constants:** Header bit layout, geometry limits and outcome codes.
//! 3. **Error Handling:** Cache and policy errors plus the uniform outcome kinds.
//! 4. **Randomness:** The seeded generator used by the random policy and the fuzz harness.

/// Decomposed address type.
pub mod addr;

/// Common constants used throughout the cache model.
pub mod constants;

/// Error types and outcome kinds.
pub mod error;

/// Seeded xorshift generator.
pub mod rng;

pub use addr::LineAddr;
pub use error::{BulkOp, CacheError, Completion, PolicyError, Status};
pub use rng::XorShift64;
