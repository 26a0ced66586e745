//! Error types for map loading, saving and editing

use thiserror::Error;

/// Map operation result type
pub type Result<T> = std::result::Result<T, MapError>;

/// Coarse classification of a [`MapError`]
///
/// Parse failures (`Format`, `CorruptData`) abort a load entirely, while
/// `Validation` means the file parsed but does not describe a usable map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad signature or unsupported container/map version
    Format,
    /// Structurally broken file content
    CorruptData,
    /// Semantically invalid document
    Validation,
    /// Per-call coordinate or index access outside a layer or manager
    Bounds,
    /// Underlying I/O failure
    Io,
}

#[derive(Error, Debug)]
pub enum MapError {
    #[error("Invalid datafile signature: {0:?}")]
    InvalidMagic([u8; 4]),

    #[error("Unsupported datafile version: {0} (expected 4)")]
    UnsupportedVersion(i32),

    #[error("Unsupported map version item: {0} (expected 1)")]
    UnsupportedMapVersion(i32),

    #[error("Invalid file extension: {0} (expected .map)")]
    InvalidExtension(String),

    #[error("Truncated {context}: need {needed} bytes, have {available}")]
    Truncated {
        context: &'static str,
        needed: usize,
        available: usize,
    },

    #[error("Decompression of blob {index} failed: {source}")]
    Decompression {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Size mismatch for {context}: expected {expected}, found {found}")]
    SizeMismatch {
        context: String,
        expected: usize,
        found: usize,
    },

    #[error("Blob index {index} out of range ({count} blobs)")]
    BlobIndexOutOfRange { index: i64, count: usize },

    #[error("Item index {index} out of range ({count} items)")]
    ItemIndexOutOfRange { index: usize, count: usize },

    #[error("Unknown item type: {0}")]
    UnknownItemType(i32),

    #[error("Unknown layer type: {0}")]
    UnknownLayerType(i32),

    #[error("Unknown tile layer role: {0}")]
    UnknownLayerRole(i32),

    #[error("Malformed {kind} item: {reason}")]
    MalformedItem { kind: &'static str, reason: String },

    #[error("Required item missing: {0}")]
    MissingItem(&'static str),

    #[error("Image index {index} out of range ({count} images)")]
    ImageIndexOutOfRange { index: i32, count: usize },

    #[error("Record buffer of {len} bytes is not a multiple of record width {width}")]
    MisalignedRecords { len: usize, width: usize },

    #[error("Map has no game layer")]
    NoGameLayer,

    #[error("Map has {0} game layers (exactly one required)")]
    MultipleGameLayers(usize),

    #[error("Group {group} layer range {start}+{num} exceeds {total} layers")]
    LayerRangeOutOfBounds {
        group: usize,
        start: i32,
        num: i32,
        total: usize,
    },

    #[error("Envelope {envelope} point range {start}+{num} exceeds {total} envpoints")]
    PointRangeOutOfBounds {
        envelope: usize,
        start: i32,
        num: i32,
        total: usize,
    },

    #[error("Layer {index} is claimed by more than one group")]
    SharedLayer { index: usize },

    #[error("Tile ({x}, {y}) outside layer of {width}x{height}")]
    TileOutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("Index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("Invalid layer dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to persist map file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

impl MapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MapError::InvalidMagic(_)
            | MapError::UnsupportedVersion(_)
            | MapError::UnsupportedMapVersion(_)
            | MapError::InvalidExtension(_) => ErrorCategory::Format,

            MapError::Truncated { .. }
            | MapError::Decompression { .. }
            | MapError::SizeMismatch { .. }
            | MapError::BlobIndexOutOfRange { .. }
            | MapError::ItemIndexOutOfRange { .. }
            | MapError::UnknownItemType(_)
            | MapError::UnknownLayerType(_)
            | MapError::UnknownLayerRole(_)
            | MapError::MalformedItem { .. }
            | MapError::MissingItem(_)
            | MapError::ImageIndexOutOfRange { .. }
            | MapError::MisalignedRecords { .. } => ErrorCategory::CorruptData,

            MapError::NoGameLayer
            | MapError::MultipleGameLayers(_)
            | MapError::LayerRangeOutOfBounds { .. }
            | MapError::PointRangeOutOfBounds { .. }
            | MapError::SharedLayer { .. } => ErrorCategory::Validation,

            MapError::TileOutOfBounds { .. }
            | MapError::IndexOutOfBounds { .. }
            | MapError::InvalidDimensions { .. } => ErrorCategory::Bounds,

            MapError::Io(_) | MapError::Persist(_) => ErrorCategory::Io,
        }
    }

    /// True for errors describing a parsed but unusable map
    pub fn is_validation(&self) -> bool {
        self.category() == ErrorCategory::Validation
    }
}
