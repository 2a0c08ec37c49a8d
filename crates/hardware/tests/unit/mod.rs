//! # Unit Components
//!
//! This module serves as the central hub for the per-component cache tests,
//! ordered from the address arithmetic up to the fuzz harness.





/// Fuzz harness verdicts, accumulators and report format.
pub mod harness;

/// Way header flags and the tag codec.
pub mod header;

/// Replacement policies in isolation.
pub mod policies;
