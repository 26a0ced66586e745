use super::blob::BlobPool;
use super::header::{Header, OffsetTables, ITEM_PREFIX_SIZE};
use super::read_i32s;
use crate::error::{MapError, Result};
use std::ops::Range;
use tracing::{debug, warn};

/// One decoded item record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawItem {
    pub type_id: i32,
    pub id: i32,
    pub payload: Vec<i32>,
}

/// Random access over a datafile held in memory
pub struct DataFileReader<'a> {
    bytes: &'a [u8],
    header: Header,
    tables: OffsetTables,
}

impl<'a> DataFileReader<'a> {
    /// Parse header and tables; items and blobs are decoded on demand
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        let header = Header::from_bytes(bytes)?;
        let tables = OffsetTables::parse(&header, bytes)?;

        let needed = header.data_region_start() + header.data_size as usize;
        if bytes.len() < needed {
            return Err(MapError::Truncated {
                context: "datafile",
                needed,
                available: bytes.len(),
            });
        }

        debug!(
            item_types = header.num_item_types,
            items = header.num_items,
            blobs = header.num_raw_data,
            item_size = header.item_size,
            data_size = header.data_size,
            "Parsed datafile header"
        );

        Ok(DataFileReader {
            bytes,
            header,
            tables,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn tables(&self) -> &OffsetTables {
        &self.tables
    }

    pub fn num_items(&self) -> usize {
        self.tables.item_offsets.len()
    }

    /// Global index range of items with `type_id`
    pub fn find_type(&self, type_id: i32) -> Range<usize> {
        self.tables.find_type(type_id)
    }

    /// Decode item record `index`
    pub fn item(&self, index: usize) -> Result<RawItem> {
        let record_size = self.tables.item_record_size(&self.header, index)?;
        if record_size < ITEM_PREFIX_SIZE {
            return Err(MapError::MalformedItem {
                kind: "record",
                reason: format!(
                    "item {} is {} bytes, shorter than its prefix",
                    index, record_size
                ),
            });
        }

        let payload_size = record_size - ITEM_PREFIX_SIZE;
        if payload_size % 4 != 0 {
            return Err(MapError::MalformedItem {
                kind: "record",
                reason: format!(
                    "item {} payload of {} bytes is not int-aligned",
                    index, payload_size
                ),
            });
        }

        let start = self.header.table_region_size() + self.tables.item_offsets[index] as usize;
        let prefix = read_i32s(self.bytes, start, 2, "item record")?;
        let payload = read_i32s(
            self.bytes,
            start + ITEM_PREFIX_SIZE,
            payload_size / 4,
            "item record",
        )?;

        if prefix[1] as usize != payload_size {
            warn!(
                index,
                recorded = prefix[1],
                derived = payload_size,
                "Item size field disagrees with offset table"
            );
        }

        Ok(RawItem {
            type_id: (prefix[0] >> 16) & 0xffff,
            id: prefix[0] & 0xffff,
            payload,
        })
    }

    /// Decode every item in on-disk order
    pub fn items(&self) -> impl Iterator<Item = Result<RawItem>> + '_ {
        (0..self.num_items()).map(move |index| self.item(index))
    }

    /// The blob pool of this file
    pub fn blobs(&self) -> BlobPool<'_> {
        let start = self.header.data_region_start();
        let end = start + self.header.data_size as usize;
        BlobPool::new(&self.bytes[start..end], &self.header, &self.tables)
    }
}
