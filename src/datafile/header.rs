use super::{extend_i32s, read_i32s, to_count};
use crate::error::{MapError, Result};
use std::ops::Range;
use tracing::warn;

pub const MAGIC: [u8; 4] = *b"DATA";
/// Signature written by big-endian hosts
pub const MAGIC_SWAPPED: [u8; 4] = *b"ATAD";
pub const VERSION: i32 = 4;
/// Magic plus eight i32 header fields
pub const PREAMBLE_SIZE: usize = 36;
/// `type<<16 | id` and payload length ahead of every item record
pub const ITEM_PREFIX_SIZE: usize = 8;
const ITEM_TYPE_ENTRY_SIZE: usize = 12;

/// Datafile preamble
///
/// The `size` and `swaplen` fields are bookkeeping for the original
/// engine's loader; they are recomputed on every write and only
/// round-tripped on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// "DATA" or the swapped "ATAD"
    pub magic: [u8; 4],

    /// Container format version (always 4)
    pub version: i32,

    /// Total file size minus 16
    pub size: i32,

    /// Size of the swappable region (everything but blob data) minus 16
    pub swaplen: i32,

    pub num_item_types: i32,
    pub num_items: i32,
    pub num_raw_data: i32,

    /// Total byte size of all item records, prefixes included
    pub item_size: i32,

    /// Total byte size of all compressed blobs
    pub data_size: i32,
}

impl Header {
    pub fn new() -> Self {
        Header {
            magic: MAGIC,
            version: VERSION,
            size: 0,
            swaplen: 0,
            num_item_types: 0,
            num_items: 0,
            num_raw_data: 0,
            item_size: 0,
            data_size: 0,
        }
    }

    /// Whether the file carries the byte-swapped signature
    ///
    /// Swapped files are accepted but still read as little-endian; no
    /// byte swapping is performed anywhere downstream.
    pub fn swapped(&self) -> bool {
        self.magic == MAGIC_SWAPPED
    }

    /// Validate the signature, version and count fields
    pub fn validate(&self) -> Result<()> {
        if self.magic != MAGIC && self.magic != MAGIC_SWAPPED {
            return Err(MapError::InvalidMagic(self.magic));
        }

        if self.version != VERSION {
            return Err(MapError::UnsupportedVersion(self.version));
        }

        to_count(self.num_item_types, "num_item_types")?;
        to_count(self.num_items, "num_items")?;
        to_count(self.num_raw_data, "num_raw_data")?;
        to_count(self.item_size, "item_size")?;
        to_count(self.data_size, "data_size")?;

        Ok(())
    }

    /// Byte offset of the first item record
    pub fn table_region_size(&self) -> usize {
        PREAMBLE_SIZE
            + self.num_item_types.max(0) as usize * ITEM_TYPE_ENTRY_SIZE
            + (self.num_items.max(0) as usize + 2 * self.num_raw_data.max(0) as usize) * 4
    }

    /// Byte offset of the first compressed blob
    pub fn data_region_start(&self) -> usize {
        self.table_region_size() + self.item_size.max(0) as usize
    }

    /// Serialize header to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PREAMBLE_SIZE);
        bytes.extend_from_slice(&self.magic);
        extend_i32s(
            &mut bytes,
            &[
                self.version,
                self.size,
                self.swaplen,
                self.num_item_types,
                self.num_items,
                self.num_raw_data,
                self.item_size,
                self.data_size,
            ],
        );
        bytes
    }

    /// Deserialize header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < PREAMBLE_SIZE {
            return Err(MapError::Truncated {
                context: "header",
                needed: PREAMBLE_SIZE,
                available: bytes.len(),
            });
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        if magic != MAGIC && magic != MAGIC_SWAPPED {
            return Err(MapError::InvalidMagic(magic));
        }

        let fields = read_i32s(bytes, 4, 8, "header")?;
        let header = Header {
            magic,
            version: fields[0],
            size: fields[1],
            swaplen: fields[2],
            num_item_types: fields[3],
            num_items: fields[4],
            num_raw_data: fields[5],
            item_size: fields[6],
            data_size: fields[7],
        };

        if header.swapped() {
            warn!("Datafile has swapped signature; reading fields as little-endian anyway");
        }

        header.validate()?;

        Ok(header)
    }
}

impl Default for Header {
    fn default() -> Self {
        Self::new()
    }
}

/// One run of same-typed items in the global item array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemTypeEntry {
    pub type_id: i32,
    pub start: i32,
    pub num: i32,
}

impl ItemTypeEntry {
    pub fn range(&self) -> Range<usize> {
        let start = self.start.max(0) as usize;
        start..start + self.num.max(0) as usize
    }
}

/// The four index tables following the preamble
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OffsetTables {
    pub item_types: Vec<ItemTypeEntry>,
    /// Record offsets relative to the item region
    pub item_offsets: Vec<i32>,
    /// Blob offsets relative to the data region
    pub data_offsets: Vec<i32>,
    /// Inflated length of every blob
    pub data_sizes: Vec<i32>,
}

impl OffsetTables {
    /// Parse the tables that follow a validated header
    pub fn parse(header: &Header, bytes: &[u8]) -> Result<Self> {
        let num_item_types = to_count(header.num_item_types, "num_item_types")?;
        let num_items = to_count(header.num_items, "num_items")?;
        let num_raw_data = to_count(header.num_raw_data, "num_raw_data")?;

        let mut offset = PREAMBLE_SIZE;
        let raw_types = read_i32s(bytes, offset, num_item_types * 3, "item type table")?;
        offset += num_item_types * ITEM_TYPE_ENTRY_SIZE;

        let item_types: Vec<ItemTypeEntry> = raw_types
            .chunks_exact(3)
            .map(|entry| ItemTypeEntry {
                type_id: entry[0],
                start: entry[1],
                num: entry[2],
            })
            .collect();

        let item_offsets = read_i32s(bytes, offset, num_items, "item offset table")?;
        offset += num_items * 4;

        let data_offsets = read_i32s(bytes, offset, num_raw_data, "data offset table")?;
        offset += num_raw_data * 4;

        let data_sizes = read_i32s(bytes, offset, num_raw_data, "uncompressed size table")?;

        let tables = OffsetTables {
            item_types,
            item_offsets,
            data_offsets,
            data_sizes,
        };
        tables.check_runs(num_items)?;

        Ok(tables)
    }

    /// Item-type runs must stay inside the item array and never overlap
    fn check_runs(&self, num_items: usize) -> Result<()> {
        let mut runs: Vec<Range<usize>> = Vec::with_capacity(self.item_types.len());
        for entry in &self.item_types {
            if entry.start < 0 || entry.num < 0 {
                return Err(MapError::MalformedItem {
                    kind: "item type table",
                    reason: format!(
                        "negative run for type {}: start {} num {}",
                        entry.type_id, entry.start, entry.num
                    ),
                });
            }
            let range = entry.range();
            if range.end > num_items {
                return Err(MapError::ItemIndexOutOfRange {
                    index: range.end,
                    count: num_items,
                });
            }
            runs.push(range);
        }

        runs.sort_by_key(|r| r.start);
        for pair in runs.windows(2) {
            if pair[0].end > pair[1].start {
                return Err(MapError::MalformedItem {
                    kind: "item type table",
                    reason: format!("overlapping runs {:?} and {:?}", pair[0], pair[1]),
                });
            }
        }

        let covered: usize = runs.iter().map(|r| r.len()).sum();
        if covered != num_items {
            warn!(covered, num_items, "Item type table does not cover every item");
        }

        Ok(())
    }

    /// Index range of all items with the given type tag
    pub fn find_type(&self, type_id: i32) -> Range<usize> {
        self.item_types
            .iter()
            .find(|entry| entry.type_id == type_id)
            .map(|entry| entry.range())
            .unwrap_or(0..0)
    }

    /// Byte size of item record `index`, prefix included
    pub fn item_record_size(&self, header: &Header, index: usize) -> Result<usize> {
        if index >= self.item_offsets.len() {
            return Err(MapError::ItemIndexOutOfRange {
                index,
                count: self.item_offsets.len(),
            });
        }
        let end = match self.item_offsets.get(index + 1) {
            Some(&next) => next,
            None => header.item_size,
        };
        Self::delta(&self.item_offsets, index, end, "item record")
    }

    /// Compressed byte size of blob `index`
    pub fn blob_size(&self, header: &Header, index: usize) -> Result<usize> {
        if index >= self.data_offsets.len() {
            return Err(MapError::BlobIndexOutOfRange {
                index: index as i64,
                count: self.data_offsets.len(),
            });
        }
        let end = match self.data_offsets.get(index + 1) {
            Some(&next) => next,
            None => header.data_size,
        };
        Self::delta(&self.data_offsets, index, end, "blob")
    }

    fn delta(offsets: &[i32], index: usize, end: i32, context: &str) -> Result<usize> {
        let start = offsets[index];
        if start < 0 || end < start {
            return Err(MapError::SizeMismatch {
                context: format!("{} {} offsets", context, index),
                expected: start.max(0) as usize,
                found: end.max(0) as usize,
            });
        }
        Ok((end - start) as usize)
    }

    /// Serialize tables in on-disk order
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(
            self.item_types.len() * ITEM_TYPE_ENTRY_SIZE
                + (self.item_offsets.len() + 2 * self.data_offsets.len()) * 4,
        );
        for entry in &self.item_types {
            extend_i32s(&mut bytes, &[entry.type_id, entry.start, entry.num]);
        }
        extend_i32s(&mut bytes, &self.item_offsets);
        extend_i32s(&mut bytes, &self.data_offsets);
        extend_i32s(&mut bytes, &self.data_sizes);
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Header {
        Header {
            num_item_types: 2,
            num_items: 3,
            num_raw_data: 1,
            item_size: 40,
            data_size: 12,
            ..Header::new()
        }
    }

    fn sample_tables() -> OffsetTables {
        OffsetTables {
            item_types: vec![
                ItemTypeEntry {
                    type_id: 0,
                    start: 0,
                    num: 1,
                },
                ItemTypeEntry {
                    type_id: 4,
                    start: 1,
                    num: 2,
                },
            ],
            item_offsets: vec![0, 12, 24],
            data_offsets: vec![0],
            data_sizes: vec![100],
        }
    }

    #[test]
    fn test_header_creation() {
        let header = Header::new();
        assert_eq!(header.magic, MAGIC);
        assert_eq!(header.version, VERSION);
        assert!(!header.swapped());
        assert!(header.validate().is_ok());
    }

    #[test]
    fn test_invalid_magic() {
        let mut bytes = Header::new().to_bytes();
        bytes[0..4].copy_from_slice(b"NOPE");
        assert!(matches!(
            Header::from_bytes(&bytes),
            Err(MapError::InvalidMagic(m)) if &m == b"NOPE"
        ));
    }

    #[test]
    fn test_invalid_version() {
        let mut header = Header::new();
        header.version = 3;
        assert!(matches!(
            Header::from_bytes(&header.to_bytes()),
            Err(MapError::UnsupportedVersion(3))
        ));
    }

    #[test]
    fn test_swapped_magic_accepted() {
        let mut header = Header::new();
        header.magic = MAGIC_SWAPPED;
        let parsed = Header::from_bytes(&header.to_bytes()).unwrap();
        assert!(parsed.swapped());
    }

    #[test]
    fn test_truncated_header() {
        assert!(matches!(
            Header::from_bytes(b"DATA\x04\x00"),
            Err(MapError::Truncated { context: "header", .. })
        ));
    }

    #[test]
    fn test_header_serialization() {
        let header = sample_header();
        let bytes = header.to_bytes();
        assert_eq!(bytes.len(), PREAMBLE_SIZE);
        assert_eq!(Header::from_bytes(&bytes).unwrap(), header);
    }

    #[test]
    fn test_table_region_size() {
        // 36 + 2*12 + (3 + 2*1)*4
        assert_eq!(sample_header().table_region_size(), 80);
        assert_eq!(sample_header().data_region_start(), 120);
    }

    #[test]
    fn test_tables_round_trip() {
        let header = sample_header();
        let tables = sample_tables();
        let mut bytes = header.to_bytes();
        bytes.extend_from_slice(&tables.to_bytes());
        assert_eq!(bytes.len(), header.table_region_size());

        let parsed = OffsetTables::parse(&header, &bytes).unwrap();
        assert_eq!(parsed, tables);
        assert_eq!(parsed.find_type(4), 1..3);
        assert_eq!(parsed.find_type(6), 0..0);
    }

    #[test]
    fn test_derived_sizes() {
        let header = sample_header();
        let tables = sample_tables();
        assert_eq!(tables.item_record_size(&header, 0).unwrap(), 12);
        assert_eq!(tables.item_record_size(&header, 2).unwrap(), 16);
        assert_eq!(tables.blob_size(&header, 0).unwrap(), 12);
        assert!(tables.blob_size(&header, 1).is_err());
    }

    #[test]
    fn test_overlapping_runs_rejected() {
        let header = sample_header();
        let mut tables = sample_tables();
        tables.item_types[1].start = 0;
        let mut bytes = header.to_bytes();
        bytes.extend_from_slice(&tables.to_bytes());
        assert!(matches!(
            OffsetTables::parse(&header, &bytes),
            Err(MapError::MalformedItem { .. })
        ));
    }

    #[test]
    fn test_run_past_item_count_rejected() {
        let header = sample_header();
        let mut tables = sample_tables();
        tables.item_types[1].num = 5;
        let mut bytes = header.to_bytes();
        bytes.extend_from_slice(&tables.to_bytes());
        assert!(matches!(
            OffsetTables::parse(&header, &bytes),
            Err(MapError::ItemIndexOutOfRange { .. })
        ));
    }
}
