//! Datafile container: header, offset tables, item records and blob pool
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Preamble (36 bytes)                          │
//! │  - Magic "DATA" / "ATAD"                     │
//! │  - version, size, swaplen, counts, totals    │
//! ├──────────────────────────────────────────────┤
//! │ Item-type table   (num_item_types × 12)      │
//! │ Item offsets      (num_items × 4)            │
//! │ Data offsets      (num_raw_data × 4)         │
//! │ Uncompressed sizes (num_raw_data × 4)        │
//! ├──────────────────────────────────────────────┤
//! │ Item records: [type<<16|id][len][i32 × n]    │
//! ├──────────────────────────────────────────────┤
//! │ Blob data: one zlib stream per blob          │
//! └──────────────────────────────────────────────┘
//! ```

pub mod blob;
pub mod header;
pub mod reader;
pub mod writer;

pub use blob::{BlobPool, BlobWriter, CompressionConfig, StreamCache};
pub use header::{Header, ItemTypeEntry, OffsetTables};
pub use reader::{DataFileReader, RawItem};
pub use writer::DataFileWriter;

use crate::error::{MapError, Result};

/// Reads `count` little-endian i32 values starting at `offset`
pub(crate) fn read_i32s(
    bytes: &[u8],
    offset: usize,
    count: usize,
    context: &'static str,
) -> Result<Vec<i32>> {
    let needed = offset + count * 4;
    if bytes.len() < needed {
        return Err(MapError::Truncated {
            context,
            needed,
            available: bytes.len(),
        });
    }

    Ok(bytes[offset..needed]
        .chunks_exact(4)
        .map(|chunk| i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect())
}

/// Converts a count field to usize, rejecting negative values
pub(crate) fn to_count(value: i32, context: &'static str) -> Result<usize> {
    usize::try_from(value).map_err(|_| MapError::MalformedItem {
        kind: "header",
        reason: format!("negative {}: {}", context, value),
    })
}

pub(crate) fn extend_i32s(out: &mut Vec<u8>, values: &[i32]) {
    for value in values {
        out.extend_from_slice(&value.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_i32s() {
        let mut bytes = Vec::new();
        extend_i32s(&mut bytes, &[1, -1, 0x7fff_ffff]);
        assert_eq!(
            read_i32s(&bytes, 4, 2, "test").unwrap(),
            vec![-1, 0x7fff_ffff]
        );
    }

    #[test]
    fn test_read_i32s_truncated() {
        let bytes = [0u8; 7];
        assert!(matches!(
            read_i32s(&bytes, 0, 2, "test"),
            Err(MapError::Truncated {
                needed: 8,
                available: 7,
                ..
            })
        ));
    }

    #[test]
    fn test_negative_count_rejected() {
        assert!(to_count(-1, "num_items").is_err());
        assert_eq!(to_count(3, "num_items").unwrap(), 3);
    }
}
