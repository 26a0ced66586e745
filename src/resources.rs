//! Side resources referenced by name
//!
//! External images are stored in a map only by name; their pixels live in
//! the game's resource directory. Lookups go through [`ResourceResolver`]
//! so callers can serve them from anywhere.

use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

pub trait ResourceResolver {
    /// Raw bytes of the resource called `name`
    fn resolve(&self, name: &str) -> Result<Vec<u8>>;
}

/// Resolves `<dir>/<name>.png`
#[derive(Debug, Clone)]
pub struct DirResolver {
    root: PathBuf,
}

impl DirResolver {
    pub fn new(root: impl AsRef<Path>) -> Self {
        DirResolver {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.png", name))
    }
}

impl ResourceResolver for DirResolver {
    fn resolve(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.path_for(name);
        debug!(path = %path.display(), "Resolving external resource");
        Ok(fs::read(path)?)
    }
}
