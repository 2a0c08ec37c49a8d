//! Error and outcome definitions.
//!
//! This module defines how cache operations report their results. It provides:
//! 1. **Cache Errors:** Every reason an operation may not complete, via `thiserror`.
//! 2. **Policy Errors:** Hard failures signalled by replacement policies and write-back sinks.
//! 3. **Outcome Kinds:** The uniform SUCCESS / WAITING / FAILURE classification and its
//!    signed codes, shared by the engine, the bulk operations and the fuzz harness.

use std::collections::TryReserveError;
use std::fmt;
use std::io;

use thiserror::Error;

use super::constants::{CODE_FAILURE, CODE_SUCCESS, CODE_WAITING};

/// Whole-cache maintenance operations that can be left pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BulkOp {
    /// Re-initialisation of every set.
    Reset,
    /// Write-back of every dirty way.
    Flush,
}

impl fmt::Display for BulkOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reset => f.write_str("reset"),
            Self::Flush => f.write_str("flush"),
        }
    }
}

/// Unrecoverable conditions reported by a policy callback.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    /// The replacement policy could not nominate any way of a full set.
    #[error("no victim available in set {set}")]
    NoVictim {
        /// Set that needed a victim.
        set: usize,
    },

    /// The replacement policy nominated a way the set does not have.
    #[error("victim way {way} is out of range for a {ways}-way set")]
    VictimOutOfRange {
        /// Way returned by the policy.
        way: usize,
        /// Associativity of the cache.
        ways: usize,
    },

    /// The policy cannot operate on this geometry.
    #[error("unsupported geometry: {0}")]
    Unsupported(String),

    /// The backing store behind a write-back sink failed.
    #[error("write-back failed: {0}")]
    Backend(String),
}

/// Errors returned by cache construction, access and maintenance.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Address-width parameters do not describe a usable cache.
    #[error("invalid geometry: {0}")]
    Geometry(String),

    /// A caller-supplied buffer cannot hold its region.
    #[error("{region} buffer holds {actual} bytes, {required} required")]
    BufferTooSmall {
        /// Which region the buffer was meant for.
        region: &'static str,
        /// Bytes the region needs.
        required: usize,
        /// Bytes the caller supplied.
        actual: usize,
    },

    /// The line store could not be allocated.
    #[error("failed to allocate {bytes} bytes for the line store")]
    Allocation {
        /// Size of the failed request.
        bytes: usize,
        /// Allocator error.
        #[source]
        source: TryReserveError,
    },

    /// A suspended bulk operation must be resumed before foreground access.
    #[error("cache is waiting on a pending {0}")]
    Waiting(BulkOp),

    /// A write carried no bytes; installing its line would expose stale data.
    #[error("empty write at {addr:#x}")]
    EmptyWrite {
        /// Requested address.
        addr: u64,
    },

    /// No valid way holds the requested line.
    #[error("miss at {addr:#x}")]
    Miss {
        /// Requested address.
        addr: u64,
    },

    /// A policy callback reported a hard error.
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Configuration could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// Writing a report or reading a configuration file failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CacheError {
    /// Classifies the error as one of the three outcome kinds.
    ///
    /// Only [`CacheError::Waiting`] is retryable; everything else is a failure.
    pub const fn status(&self) -> Status {
        match self {
            Self::Waiting(_) => Status::Waiting,
            _ => Status::Failure,
        }
    }
}

/// Uniform outcome of any cache operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Status {
    /// The operation fully completed.
    Success,
    /// The operation did not run, or yielded and must be resumed via its cursor.
    Waiting,
    /// The operation failed unrecoverably.
    Failure,
}

impl Status {
    /// Signed code of the outcome: `0` success, `+1` waiting, `-1` failure.
    pub const fn code(self) -> i8 {
        match self {
            Self::Success => CODE_SUCCESS,
            Self::Waiting => CODE_WAITING,
            Self::Failure => CODE_FAILURE,
        }
    }

    /// The code truncated to one byte, as packed into harness reports.
    pub const fn code_byte(self) -> u8 {
        self.code() as u8
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Values that map onto an outcome kind.
///
/// Implemented by the success values of the engine (accesses, bulk steps) and lifted to
/// `Result<T, CacheError>` so any call site can be classified in one place.
pub trait Completion {
    /// Outcome kind of this value.
    fn status(&self) -> Status;
}

impl<T: Completion> Completion for Result<T, CacheError> {
    fn status(&self) -> Status {
        match self {
            Ok(value) => value.status(),
            Err(err) => err.status(),
        }
    }
}
