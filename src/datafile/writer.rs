use super::blob::{BlobWriter, CompressionConfig, StreamCache};
use super::extend_i32s;
use super::header::{Header, ItemTypeEntry, OffsetTables, ITEM_PREFIX_SIZE};
use crate::error::Result;
use tracing::debug;

#[derive(Debug, Clone)]
struct PendingItem {
    type_id: i32,
    id: i32,
    payload: Vec<i32>,
}

impl PendingItem {
    fn record_size(&self) -> usize {
        ITEM_PREFIX_SIZE + self.payload.len() * 4
    }
}

/// Assembles a datafile from items and blobs
///
/// Header totals and every table are computed in [`finish`](Self::finish),
/// after the full item and blob sets are known.
pub struct DataFileWriter<'c> {
    items: Vec<PendingItem>,
    blobs: BlobWriter<'c>,
}

impl<'c> DataFileWriter<'c> {
    pub fn new(config: CompressionConfig, cache: Option<&'c StreamCache>) -> Self {
        DataFileWriter {
            items: Vec::new(),
            blobs: BlobWriter::new(config, cache),
        }
    }

    /// Queue an item record; order of calls does not matter
    pub fn add_item(&mut self, type_id: i32, id: i32, payload: Vec<i32>) {
        self.items.push(PendingItem {
            type_id,
            id,
            payload,
        });
    }

    /// Compress a payload into the pool and return its blob index
    pub fn add_blob(&mut self, data: &[u8]) -> Result<i32> {
        self.blobs.put(data)
    }

    pub fn num_items(&self) -> usize {
        self.items.len()
    }

    pub fn num_blobs(&self) -> usize {
        self.blobs.len()
    }

    /// Lay out the file: magic, header, tables, item records, blob data
    pub fn finish(self) -> Vec<u8> {
        let mut items = self.items;
        items.sort_by_key(|item| (item.type_id, item.id));
        let blobs = self.blobs.into_blobs();

        let mut item_types: Vec<ItemTypeEntry> = Vec::new();
        for (index, item) in items.iter().enumerate() {
            match item_types.last_mut() {
                Some(entry) if entry.type_id == item.type_id => entry.num += 1,
                _ => item_types.push(ItemTypeEntry {
                    type_id: item.type_id,
                    start: index as i32,
                    num: 1,
                }),
            }
        }

        let mut item_offsets = Vec::with_capacity(items.len());
        let mut item_size = 0usize;
        for item in &items {
            item_offsets.push(item_size as i32);
            item_size += item.record_size();
        }

        let mut data_offsets = Vec::with_capacity(blobs.len());
        let mut data_sizes = Vec::with_capacity(blobs.len());
        let mut data_size = 0usize;
        for blob in &blobs {
            data_offsets.push(data_size as i32);
            data_sizes.push(blob.uncompressed_len as i32);
            data_size += blob.compressed.len();
        }

        let tables = OffsetTables {
            item_types,
            item_offsets,
            data_offsets,
            data_sizes,
        };

        let mut header = Header {
            num_item_types: tables.item_types.len() as i32,
            num_items: items.len() as i32,
            num_raw_data: blobs.len() as i32,
            item_size: item_size as i32,
            data_size: data_size as i32,
            ..Header::new()
        };
        let file_size = header.data_region_start() + data_size;
        header.size = file_size as i32 - 16;
        header.swaplen = (file_size - data_size) as i32 - 16;

        debug!(
            items = header.num_items,
            item_types = header.num_item_types,
            blobs = header.num_raw_data,
            file_size,
            "Assembled datafile"
        );

        let mut bytes = Vec::with_capacity(file_size);
        bytes.extend_from_slice(&header.to_bytes());
        bytes.extend_from_slice(&tables.to_bytes());
        for item in &items {
            let key = ((item.type_id & 0xffff) << 16) | (item.id & 0xffff);
            let payload_len = (item.payload.len() * 4) as i32;
            extend_i32s(&mut bytes, &[key, payload_len]);
            extend_i32s(&mut bytes, &item.payload);
        }
        for blob in &blobs {
            bytes.extend_from_slice(&blob.compressed);
        }

        bytes
    }
}
