//! Compressed blob pool
//!
//! Every blob is an independent zlib stream. Blobs are addressed by index;
//! their compressed extent comes from the data-offset table and their
//! inflated length from the uncompressed-size table.
//!
//! **Design**:
//! - Reads inflate one blob at a time and check the inflated length
//! - Writes deflate each payload on its own (no shared stream)
//! - A [`StreamCache`] remembers the compressed streams seen on load so an
//!   unmodified payload is written back with its original bytes

use super::header::{Header, OffsetTables};
use crate::error::{MapError, Result};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::collections::HashMap;
use std::io::{Read, Write};
use tracing::trace;
use xxhash_rust::xxh3::xxh3_64;

/// Compression configuration for saving
#[derive(Debug, Clone)]
pub struct CompressionConfig {
    /// zlib level, 0 (store) to 9 (best)
    pub level: u32,

    /// Write unchanged payloads with the stream they were loaded from
    pub reuse_original_streams: bool,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        CompressionConfig {
            level: 6,
            reuse_original_streams: true,
        }
    }
}

impl CompressionConfig {
    /// Fastest compression, still reusing loaded streams
    pub fn fast() -> Self {
        CompressionConfig {
            level: 1,
            ..Default::default()
        }
    }

    /// Best compression; recompresses everything
    pub fn best() -> Self {
        CompressionConfig {
            level: 9,
            reuse_original_streams: false,
        }
    }
}

/// Deflate `data` into a standalone zlib stream
pub fn compress(data: &[u8], level: u32) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::with_capacity(data.len() / 2), Compression::new(level));
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Inflate blob `index` and check it against the recorded length
pub fn decompress(data: &[u8], expected_size: usize, index: usize) -> Result<Vec<u8>> {
    let mut output = Vec::with_capacity(expected_size);
    ZlibDecoder::new(data)
        .read_to_end(&mut output)
        .map_err(|source| MapError::Decompression { index, source })?;

    if output.len() != expected_size {
        return Err(MapError::SizeMismatch {
            context: format!("inflated blob {}", index),
            expected: expected_size,
            found: output.len(),
        });
    }

    Ok(output)
}

/// Read side of the pool, borrowing the loaded file
pub struct BlobPool<'a> {
    region: &'a [u8],
    header: &'a Header,
    tables: &'a OffsetTables,
}

impl<'a> BlobPool<'a> {
    pub fn new(region: &'a [u8], header: &'a Header, tables: &'a OffsetTables) -> Self {
        BlobPool {
            region,
            header,
            tables,
        }
    }

    pub fn len(&self) -> usize {
        self.tables.data_offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `index` names an existing blob (negative means "none")
    pub fn contains(&self, index: i32) -> bool {
        index >= 0 && (index as usize) < self.len()
    }

    /// Raw compressed bytes of blob `index`
    pub fn compressed(&self, index: i32) -> Result<&'a [u8]> {
        if !self.contains(index) {
            return Err(MapError::BlobIndexOutOfRange {
                index: index as i64,
                count: self.len(),
            });
        }
        let index = index as usize;
        let start = self.tables.data_offsets[index] as usize;
        let size = self.tables.blob_size(self.header, index)?;
        self.region
            .get(start..start + size)
            .ok_or(MapError::Truncated {
                context: "blob data",
                needed: start + size,
                available: self.region.len(),
            })
    }

    /// Inflated contents of blob `index`
    pub fn get(&self, index: i32) -> Result<Vec<u8>> {
        let compressed = self.compressed(index)?;
        let expected = self.tables.data_sizes[index as usize];
        if expected < 0 {
            return Err(MapError::MalformedItem {
                kind: "blob table",
                reason: format!("negative uncompressed size {} for blob {}", expected, index),
            });
        }
        trace!(
            index,
            compressed = compressed.len(),
            inflated = expected,
            "Inflating blob"
        );
        decompress(compressed, expected as usize, index as usize)
    }

    /// Remember every blob's original stream, keyed by inflated content
    pub fn fill_cache(&self, cache: &mut StreamCache) -> Result<()> {
        for index in 0..self.len() as i32 {
            let compressed = self.compressed(index)?;
            let inflated = self.get(index)?;
            cache.insert(&inflated, compressed.to_vec());
        }
        Ok(())
    }
}

/// Original compressed streams by content hash
#[derive(Debug, Clone, Default)]
pub struct StreamCache {
    streams: HashMap<(u64, usize), Vec<u8>>,
}

impl StreamCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, inflated: &[u8], compressed: Vec<u8>) {
        self.streams
            .insert((xxh3_64(inflated), inflated.len()), compressed);
    }

    pub fn lookup(&self, inflated: &[u8]) -> Option<&[u8]> {
        self.streams
            .get(&(xxh3_64(inflated), inflated.len()))
            .map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.streams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    pub fn clear(&mut self) {
        self.streams.clear();
    }
}

/// A compressed blob waiting to be written
#[derive(Debug, Clone)]
pub struct PendingBlob {
    pub compressed: Vec<u8>,
    pub uncompressed_len: usize,
}

/// Write side of the pool
pub struct BlobWriter<'c> {
    blobs: Vec<PendingBlob>,
    config: CompressionConfig,
    cache: Option<&'c StreamCache>,
}

impl<'c> BlobWriter<'c> {
    pub fn new(config: CompressionConfig, cache: Option<&'c StreamCache>) -> Self {
        BlobWriter {
            blobs: Vec::new(),
            config,
            cache,
        }
    }

    /// Compress `data` as a new blob and return its index
    pub fn put(&mut self, data: &[u8]) -> Result<i32> {
        let reused = if self.config.reuse_original_streams {
            self.cache.and_then(|cache| cache.lookup(data))
        } else {
            None
        };

        let compressed = match reused {
            Some(stream) => stream.to_vec(),
            None => compress(data, self.config.level)?,
        };

        let index = self.blobs.len() as i32;
        trace!(
            index,
            inflated = data.len(),
            compressed = compressed.len(),
            reused = reused.is_some(),
            "Queued blob"
        );
        self.blobs.push(PendingBlob {
            compressed,
            uncompressed_len: data.len(),
        });
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }

    pub fn into_blobs(self) -> Vec<PendingBlob> {
        self.blobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_config_defaults() {
        let config = CompressionConfig::default();
        assert_eq!(config.level, 6);
        assert!(config.reuse_original_streams);

        assert_eq!(CompressionConfig::fast().level, 1);
        assert!(!CompressionConfig::best().reuse_original_streams);
    }

    #[test]
    fn test_zlib_round_trip() {
        let data = b"grass_main\0".repeat(50);
        let compressed = compress(&data, 6).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(decompress(&compressed, data.len(), 0).unwrap(), data);
    }

    #[test]
    fn test_empty_payload_is_valid_stream() {
        let compressed = compress(&[], 6).unwrap();
        assert!(!compressed.is_empty());
        assert!(decompress(&compressed, 0, 0).unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_stream() {
        let result = decompress(b"definitely not zlib", 10, 3);
        assert!(matches!(result, Err(MapError::Decompression { index: 3, .. })));
    }

    #[test]
    fn test_size_bookkeeping() {
        let compressed = compress(b"abcd", 6).unwrap();
        assert!(matches!(
            decompress(&compressed, 5, 1),
            Err(MapError::SizeMismatch { expected: 5, found: 4, .. })
        ));
    }

    #[test]
    fn test_writer_reuses_cached_stream() {
        let payload = vec![7u8; 256];
        // A stream the writer would never produce itself at level 6
        let original = compress(&payload, 0).unwrap();

        let mut cache = StreamCache::new();
        cache.insert(&payload, original.clone());

        let mut writer = BlobWriter::new(CompressionConfig::default(), Some(&cache));
        assert_eq!(writer.put(&payload).unwrap(), 0);
        assert_eq!(writer.put(&[1, 2, 3]).unwrap(), 1);

        let blobs = writer.into_blobs();
        assert_eq!(blobs[0].compressed, original);
        assert_eq!(blobs[0].uncompressed_len, 256);
        assert_eq!(decompress(&blobs[1].compressed, 3, 1).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_writer_ignores_cache_when_disabled() {
        let payload = vec![7u8; 256];
        let original = compress(&payload, 0).unwrap();
        let mut cache = StreamCache::new();
        cache.insert(&payload, original.clone());

        let mut writer = BlobWriter::new(CompressionConfig::best(), Some(&cache));
        writer.put(&payload).unwrap();
        assert_ne!(writer.into_blobs()[0].compressed, original);
    }

    #[test]
    fn test_pool_lookup() {
        let first = compress(b"first\0", 6).unwrap();
        let second = compress(b"second blob", 6).unwrap();
        let mut region = first.clone();
        region.extend_from_slice(&second);

        let header = Header {
            num_raw_data: 2,
            data_size: region.len() as i32,
            ..Header::new()
        };
        let tables = OffsetTables {
            data_offsets: vec![0, first.len() as i32],
            data_sizes: vec![6, 11],
            ..Default::default()
        };

        let pool = BlobPool::new(&region, &header, &tables);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.get(0).unwrap(), b"first\0");
        assert_eq!(pool.get(1).unwrap(), b"second blob");
        assert!(!pool.contains(-1));
        assert!(matches!(
            pool.get(2),
            Err(MapError::BlobIndexOutOfRange { index: 2, count: 2 })
        ));

        let mut cache = StreamCache::new();
        pool.fill_cache(&mut cache).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.lookup(b"second blob"), Some(second.as_slice()));
    }
}
