//! Line store.
//!
//! Holds the data region (`set_count x ways x line_bytes` bytes) and the header region
//! (`set_count x ways x header_bytes` bytes). Ownership is tagged at the type level:
//! 1. **Region:** A byte buffer that is either owned outright or borrowed from the caller.
//! 2. **Layout:** Either one combined region whose tail is the header region, or two
//!    independent regions.
//!
//! Releasing a store frees exactly the owned regions. A header region that is a sub-range
//! of a combined allocation is released together with its parent and never on its own.

use std::fmt;
use std::mem;

use super::geometry::Geometry;
use super::view::{SetMut, SetRef};
use crate::common::error::CacheError;

/// A byte buffer with explicit ownership.
pub enum Region<'a> {
    /// Allocated by the builder; released on teardown.
    Owned(Box<[u8]>),
    /// Supplied by the caller; never released by the cache.
    Borrowed(&'a mut [u8]),
}

impl Region<'_> {
    /// Allocates a zeroed region, reporting allocation failure instead of aborting.
    pub(crate) fn allocate(bytes: usize) -> Result<Self, CacheError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(bytes)
            .map_err(|source| CacheError::Allocation { bytes, source })?;
        buf.resize(bytes, 0);
        Ok(Self::Owned(buf.into_boxed_slice()))
    }

    /// Whether the region is released with the cache.
    pub const fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }

    /// Length of the underlying buffer.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Whether the region holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The whole buffer.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Owned(buf) => buf,
            Self::Borrowed(buf) => buf,
        }
    }

    /// The whole buffer, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Self::Owned(buf) => buf,
            Self::Borrowed(buf) => buf,
        }
    }

    /// Gives up the buffer, returning how many owned bytes were freed.
    ///
    /// Borrowed buffers are handed back untouched and count as zero.
    fn release(&mut self) -> usize {
        match mem::take(self) {
            Self::Owned(buf) => buf.len(),
            Self::Borrowed(_) => 0,
        }
    }
}

impl Default for Region<'_> {
    fn default() -> Self {
        Self::Owned(Box::default())
    }
}

impl fmt::Debug for Region<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_owned() { "Owned" } else { "Borrowed" };
        write!(f, "{kind}({} bytes)", self.len())
    }
}

/// How the two regions are laid out in memory.
#[derive(Debug)]
pub enum Layout<'a> {
    /// One buffer; data occupies `..split`, headers start at `split`.
    Combined {
        /// Buffer holding both regions.
        region: Region<'a>,
        /// First byte of the header region.
        split: usize,
    },
    /// Independent data and header buffers.
    Split {
        /// Data region.
        data: Region<'a>,
        /// Header region.
        headers: Region<'a>,
    },
}

/// Bytes freed by a teardown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Released {
    /// Owned data bytes freed (includes a sub-range header region).
    pub data_bytes: usize,
    /// Owned bytes of an independent header region freed.
    pub header_bytes: usize,
    /// Whether the cache struct itself was an owned allocation that was freed.
    pub struct_released: bool,
}

impl Released {
    /// Total bytes freed, excluding the struct.
    pub const fn total_bytes(&self) -> usize {
        self.data_bytes + self.header_bytes
    }
}

/// The data and header regions of a cache.
#[derive(Debug)]
pub struct LineStore<'a> {
    layout: Layout<'a>,
}

impl<'a> LineStore<'a> {
    pub(crate) const fn new(layout: Layout<'a>) -> Self {
        Self { layout }
    }

    /// Current layout.
    pub const fn layout(&self) -> &Layout<'a> {
        &self.layout
    }

    /// Data and header regions, trimmed to the sizes `geometry` needs.
    pub fn regions(&self, geometry: &Geometry) -> (&[u8], &[u8]) {
        let (data, headers) = match &self.layout {
            Layout::Combined { region, split } => region.as_slice().split_at(*split),
            Layout::Split { data, headers } => (data.as_slice(), headers.as_slice()),
        };
        (
            &data[..geometry.data_bytes()],
            &headers[..geometry.header_region_bytes()],
        )
    }

    /// Mutable data and header regions, trimmed to the sizes `geometry` needs.
    pub fn regions_mut(&mut self, geometry: &Geometry) -> (&mut [u8], &mut [u8]) {
        let (data, headers) = match &mut self.layout {
            Layout::Combined { region, split } => region.as_mut_slice().split_at_mut(*split),
            Layout::Split { data, headers } => (data.as_mut_slice(), headers.as_mut_slice()),
        };
        (
            &mut data[..geometry.data_bytes()],
            &mut headers[..geometry.header_region_bytes()],
        )
    }

    /// Read-only view of one set.
    ///
    /// # Panics
    ///
    /// Panics if `set >= geometry.set_count()`.
    pub fn set<'s>(&'s self, geometry: &'s Geometry, set: usize) -> SetRef<'s> {
        let (data, headers) = self.regions(geometry);
        let data_len = geometry.set_data_bytes();
        let header_len = geometry.set_header_bytes();
        SetRef::new(
            set,
            geometry,
            &headers[set * header_len..(set + 1) * header_len],
            &data[set * data_len..(set + 1) * data_len],
        )
    }

    /// Mutable view of one set.
    ///
    /// # Panics
    ///
    /// Panics if `set >= geometry.set_count()`.
    pub fn set_mut<'s>(&'s mut self, geometry: &'s Geometry, set: usize) -> SetMut<'s> {
        let (data, headers) = self.regions_mut(geometry);
        let data_len = geometry.set_data_bytes();
        let header_len = geometry.set_header_bytes();
        SetMut::new(
            set,
            geometry,
            &mut headers[set * header_len..(set + 1) * header_len],
            &mut data[set * data_len..(set + 1) * data_len],
        )
    }

    /// Frees every owned region and reports the freed sizes.
    ///
    /// Afterwards the store holds empty regions and must not be viewed again.
    pub(crate) fn release(&mut self) -> Released {
        match &mut self.layout {
            Layout::Combined { region, split } => {
                *split = 0;
                Released {
                    data_bytes: region.release(),
                    ..Released::default()
                }
            }
            Layout::Split { data, headers } => Released {
                data_bytes: data.release(),
                header_bytes: headers.release(),
                struct_released: false,
            },
        }
    }
}
