//! Fixed-width record arrays
//!
//! Tile, quad and overlay data is stored exactly as it appears inflated on
//! disk: one contiguous byte buffer of equally sized records. Records are
//! decoded on access, so a 1000x1000 layer costs 4 MB rather than a
//! million heap objects.

pub mod overlay;
pub mod quad;
pub mod tile;

pub use overlay::{SpeedupTile, TeleTile};
pub use quad::{Color, Point, Quad};
pub use tile::{Rotation, Tile, TileFlags};

use crate::error::{MapError, Result};
use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;

/// A record with a fixed little-endian encoding of `WIDTH` bytes
pub trait PackedRecord: Sized {
    const WIDTH: usize;

    /// Decode from exactly `WIDTH` bytes
    fn decode(bytes: &[u8]) -> Self;

    /// Encode into exactly `WIDTH` bytes
    fn encode(&self, out: &mut [u8]);
}

/// Contiguous buffer of `R` records
pub struct PackedArray<R> {
    bytes: Vec<u8>,
    _record: PhantomData<fn() -> R>,
}

impl<R: PackedRecord> PackedArray<R> {
    pub fn new() -> Self {
        PackedArray {
            bytes: Vec::new(),
            _record: PhantomData,
        }
    }

    /// `len` default records
    pub fn with_len(len: usize) -> Self
    where
        R: Default,
    {
        let mut array = Self::new();
        array.resize(len);
        array
    }

    /// Wrap an inflated blob; its length must be a whole number of records
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() % R::WIDTH != 0 {
            return Err(MapError::MisalignedRecords {
                len: bytes.len(),
                width: R::WIDTH,
            });
        }
        Ok(PackedArray {
            bytes,
            _record: PhantomData,
        })
    }

    pub fn from_records<I: IntoIterator<Item = R>>(records: I) -> Self {
        let mut array = Self::new();
        array.extend(records);
        array
    }

    pub fn len(&self) -> usize {
        self.bytes.len() / R::WIDTH
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    fn check(&self, index: usize) -> Result<Range<usize>> {
        if index >= self.len() {
            return Err(MapError::IndexOutOfBounds {
                index,
                len: self.len(),
            });
        }
        let start = index * R::WIDTH;
        Ok(start..start + R::WIDTH)
    }

    pub fn get(&self, index: usize) -> Result<R> {
        let range = self.check(index)?;
        Ok(R::decode(&self.bytes[range]))
    }

    pub fn set(&mut self, index: usize, record: &R) -> Result<()> {
        let range = self.check(index)?;
        record.encode(&mut self.bytes[range]);
        Ok(())
    }

    pub fn push(&mut self, record: &R) {
        let start = self.bytes.len();
        self.bytes.resize(start + R::WIDTH, 0);
        record.encode(&mut self.bytes[start..]);
    }

    /// Remove record `index`, shifting later records down
    pub fn remove(&mut self, index: usize) -> Result<R> {
        let range = self.check(index)?;
        let record = R::decode(&self.bytes[range.clone()]);
        self.bytes.drain(range);
        Ok(record)
    }

    pub fn pop(&mut self) -> Option<R> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        let start = (len - 1) * R::WIDTH;
        let record = R::decode(&self.bytes[start..]);
        self.bytes.truncate(start);
        Some(record)
    }

    /// Copy of records in `range`
    pub fn slice(&self, range: Range<usize>) -> Result<Self> {
        if range.start > range.end || range.end > self.len() {
            return Err(MapError::IndexOutOfBounds {
                index: range.end,
                len: self.len(),
            });
        }
        Ok(PackedArray {
            bytes: self.bytes[range.start * R::WIDTH..range.end * R::WIDTH].to_vec(),
            _record: PhantomData,
        })
    }

    /// Append `other`'s records in `range`, clamped to `other`'s length
    pub fn extend_from_range(&mut self, other: &Self, range: Range<usize>) {
        let end = range.end.min(other.len());
        let start = range.start.min(end);
        self.bytes
            .extend_from_slice(&other.bytes[start * R::WIDTH..end * R::WIDTH]);
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = R> + '_ {
        self.bytes.chunks_exact(R::WIDTH).map(R::decode)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Grow with default records or truncate to `len`
    pub fn resize(&mut self, len: usize)
    where
        R: Default,
    {
        let current = self.len();
        if len <= current {
            self.bytes.truncate(len * R::WIDTH);
            return;
        }
        let filler = R::default();
        self.bytes.reserve((len - current) * R::WIDTH);
        for _ in current..len {
            self.push(&filler);
        }
    }
}

impl<R: PackedRecord> Extend<R> for PackedArray<R> {
    fn extend<I: IntoIterator<Item = R>>(&mut self, records: I) {
        for record in records {
            self.push(&record);
        }
    }
}

impl<R: PackedRecord> Default for PackedArray<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> Clone for PackedArray<R> {
    fn clone(&self) -> Self {
        PackedArray {
            bytes: self.bytes.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> PartialEq for PackedArray<R> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl<R> Eq for PackedArray<R> {}

impl<R: PackedRecord> fmt::Debug for PackedArray<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackedArray")
            .field("len", &self.len())
            .field("width", &R::WIDTH)
            .finish()
    }
}

pub type TileArray = PackedArray<Tile>;
pub type QuadArray = PackedArray<Quad>;
pub type TeleArray = PackedArray<TeleTile>;
pub type SpeedupArray = PackedArray<SpeedupTile>;
