//! Set and way views.
//!
//! Policies never see the line store directly. Each callback receives a view of exactly
//! the bytes it may inspect or modify:
//! 1. **`SetRef`:** Read-only headers and data of one set (victim selection).
//! 2. **`SetMut`:** Mutable headers and data of one set (reset and touch).
//! 3. **`WayRef`:** Read-only header and data of one way (write-back).

use std::fmt;

use super::geometry::Geometry;
use super::header;

/// Read-only view of one set.
#[derive(Clone, Copy)]
pub struct SetRef<'s> {
    index: usize,
    geometry: &'s Geometry,
    headers: &'s [u8],
    data: &'s [u8],
}

impl<'s> SetRef<'s> {
    /// Wraps the header and data bytes of one set.
    ///
    /// `headers` must hold `ways x header_bytes` bytes and `data` `ways x line_bytes`
    /// bytes; per-way accessors panic otherwise. Useful for exercising a policy on its own.
    pub const fn new(
        index: usize,
        geometry: &'s Geometry,
        headers: &'s [u8],
        data: &'s [u8],
    ) -> Self {
        Self {
            index,
            geometry,
            headers,
            data,
        }
    }

    /// Index of the set.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Geometry of the cache the set belongs to.
    pub const fn geometry(&self) -> &'s Geometry {
        self.geometry
    }

    /// Associativity.
    pub const fn ways(&self) -> usize {
        self.geometry.ways()
    }

    /// All headers of the set, way 0 first.
    pub const fn headers(&self) -> &'s [u8] {
        self.headers
    }

    /// All line data of the set, way 0 first.
    pub const fn data(&self) -> &'s [u8] {
        self.data
    }

    /// Header of `way`.
    pub fn header(&self, way: usize) -> &'s [u8] {
        let len = self.geometry.header_bytes();
        let headers = self.headers;
        &headers[way * len..(way + 1) * len]
    }

    /// Line data of `way`.
    pub fn line(&self, way: usize) -> &'s [u8] {
        let len = self.geometry.line_bytes();
        let data = self.data;
        &data[way * len..(way + 1) * len]
    }

    /// Whether `way` holds a line.
    pub fn is_valid(&self, way: usize) -> bool {
        header::is_valid(self.header(way))
    }

    /// Whether `way` holds a modified line.
    pub fn is_dirty(&self, way: usize) -> bool {
        header::is_dirty(self.header(way))
    }

    /// Policy bits of `way`.
    pub fn meta(&self, way: usize) -> u8 {
        header::meta(self.header(way))
    }

    /// Tag stored in `way`; meaningful only when the way is valid.
    pub fn tag(&self, way: usize) -> u64 {
        header::unpack_tag(self.header(way), self.geometry.tag_bits())
    }

    /// First valid way holding `tag`.
    pub fn find(&self, tag: u64) -> Option<usize> {
        (0..self.ways()).find(|&way| self.is_valid(way) && self.tag(way) == tag)
    }

    /// First way not holding a line.
    pub fn first_invalid(&self) -> Option<usize> {
        (0..self.ways()).find(|&way| !self.is_valid(way))
    }

    /// View of a single way.
    pub fn way(&self, way: usize) -> WayRef<'s> {
        WayRef {
            set: self.index,
            way,
            geometry: self.geometry,
            header: self.header(way),
            data: self.line(way),
        }
    }
}

impl fmt::Debug for SetRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetRef")
            .field("index", &self.index)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Mutable view of one set.
pub struct SetMut<'s> {
    index: usize,
    geometry: &'s Geometry,
    headers: &'s mut [u8],
    data: &'s mut [u8],
}

impl<'s> SetMut<'s> {
    /// Wraps the header and data bytes of one set, mutably.
    ///
    /// Sizes as for [`SetRef::new`].
    pub const fn new(
        index: usize,
        geometry: &'s Geometry,
        headers: &'s mut [u8],
        data: &'s mut [u8],
    ) -> Self {
        Self {
            index,
            geometry,
            headers,
            data,
        }
    }

    /// Read-only view of the same set.
    pub fn as_view(&self) -> SetRef<'_> {
        SetRef::new(self.index, self.geometry, &*self.headers, &*self.data)
    }

    /// Index of the set.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Geometry of the cache the set belongs to.
    pub const fn geometry(&self) -> &'s Geometry {
        self.geometry
    }

    /// Associativity.
    pub const fn ways(&self) -> usize {
        self.geometry.ways()
    }

    /// Header of `way`.
    pub fn header(&self, way: usize) -> &[u8] {
        let len = self.geometry.header_bytes();
        &self.headers[way * len..(way + 1) * len]
    }

    /// Header of `way`, mutably.
    pub fn header_mut(&mut self, way: usize) -> &mut [u8] {
        let len = self.geometry.header_bytes();
        &mut self.headers[way * len..(way + 1) * len]
    }

    /// Line data of `way`.
    pub fn line(&self, way: usize) -> &[u8] {
        let len = self.geometry.line_bytes();
        &self.data[way * len..(way + 1) * len]
    }

    /// Line data of `way`, mutably.
    pub fn line_mut(&mut self, way: usize) -> &mut [u8] {
        let len = self.geometry.line_bytes();
        &mut self.data[way * len..(way + 1) * len]
    }

    /// Whether `way` holds a line.
    pub fn is_valid(&self, way: usize) -> bool {
        header::is_valid(self.header(way))
    }

    /// Whether `way` holds a modified line.
    pub fn is_dirty(&self, way: usize) -> bool {
        header::is_dirty(self.header(way))
    }

    /// Policy bits of `way`.
    pub fn meta(&self, way: usize) -> u8 {
        header::meta(self.header(way))
    }

    /// Replaces the policy bits of `way`.
    pub fn set_meta(&mut self, way: usize, value: u8) {
        header::set_meta(self.header_mut(way), value);
    }

    /// Zeroes every header and data byte of the set.
    pub fn clear(&mut self) {
        self.headers.fill(0);
        self.data.fill(0);
    }

    /// View of a single way.
    pub fn way(&self, way: usize) -> WayRef<'_> {
        let geometry = self.geometry;
        WayRef {
            set: self.index,
            way,
            geometry,
            header: self.header(way),
            data: self.line(way),
        }
    }
}

impl fmt::Debug for SetMut<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_view().fmt(f)
    }
}

/// Read-only view of one way, handed to write-back sinks.
#[derive(Clone, Copy)]
pub struct WayRef<'s> {
    set: usize,
    way: usize,
    geometry: &'s Geometry,
    header: &'s [u8],
    data: &'s [u8],
}

impl<'s> WayRef<'s> {
    /// Set index of the way.
    pub const fn set(&self) -> usize {
        self.set
    }

    /// Way index within its set.
    pub const fn way(&self) -> usize {
        self.way
    }

    /// Geometry of the cache the way belongs to.
    pub const fn geometry(&self) -> &'s Geometry {
        self.geometry
    }

    /// Raw header bytes.
    pub const fn header(&self) -> &'s [u8] {
        self.header
    }

    /// Line data.
    pub const fn data(&self) -> &'s [u8] {
        self.data
    }

    /// Whether the way holds a line.
    pub fn is_valid(&self) -> bool {
        header::is_valid(self.header)
    }

    /// Whether the line is modified.
    pub fn is_dirty(&self) -> bool {
        header::is_dirty(self.header)
    }

    /// Policy bits.
    pub fn meta(&self) -> u8 {
        header::meta(self.header)
    }

    /// Stored tag.
    pub fn tag(&self) -> u64 {
        header::unpack_tag(self.header, self.geometry.tag_bits())
    }

    /// Address of the first byte of the line.
    pub fn line_address(&self) -> u64 {
        self.geometry.compose(self.tag(), self.set, 0)
    }
}

impl fmt::Debug for WayRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WayRef")
            .field("set", &self.set)
            .field("way", &self.way)
            .field("header", &self.header)
            .field("data", &self.data)
            .finish()
    }
}
