use crate::datafile::CompressionConfig;

/// Load behavior
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Fail when the map version item is absent
    pub require_version_item: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            require_version_item: true,
        }
    }
}

impl LoadOptions {
    /// Accept files without a version item, for inspecting damaged maps
    pub fn lenient() -> Self {
        LoadOptions {
            require_version_item: false,
        }
    }
}

/// Save behavior
#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub compression: CompressionConfig,
    /// Write through a temp file and rename into place
    pub atomic: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        SaveOptions {
            compression: CompressionConfig::default(),
            atomic: true,
        }
    }
}

impl SaveOptions {
    pub fn with_compression(mut self, compression: CompressionConfig) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }
}
