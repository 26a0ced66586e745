//! Disk I/O for map files

use crate::datafile::header::{Header, PREAMBLE_SIZE};
use crate::error::{MapError, Result};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub const MAP_EXTENSION: &str = "map";

/// Apply the extension rule: none means `.map`, anything else is rejected
pub fn map_path<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    match path.extension() {
        None => Ok(path.with_extension(MAP_EXTENSION)),
        Some(ext) if ext == MAP_EXTENSION => Ok(path.to_path_buf()),
        Some(ext) => Err(MapError::InvalidExtension(ext.to_string_lossy().into_owned())),
    }
}

/// Read a whole map file
pub fn read_map<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = map_path(path)?;
    let bytes = fs::read(&path)?;
    debug!(path = %path.display(), size = bytes.len(), "Read map file");
    Ok(bytes)
}

/// Read and validate only the preamble
pub fn read_header<P: AsRef<Path>>(path: P) -> Result<Header> {
    let path = map_path(path)?;
    let mut file = File::open(path)?;
    let mut buffer = Vec::with_capacity(PREAMBLE_SIZE);
    std::io::Read::by_ref(&mut file)
        .take(PREAMBLE_SIZE as u64)
        .read_to_end(&mut buffer)?;
    Header::from_bytes(&buffer)
}

/// Write `bytes` to `path`
///
/// With `atomic`, the data goes to a temp file in the target directory
/// which is then renamed over the destination.
pub fn write_map<P: AsRef<Path>>(path: P, bytes: &[u8], atomic: bool) -> Result<PathBuf> {
    let path = map_path(path)?;

    if !atomic {
        fs::write(&path, bytes)?;
    } else {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut temp = NamedTempFile::new_in(&dir)?;
        temp.write_all(bytes)?;
        temp.flush()?;
        temp.as_file().sync_all()?;
        temp.persist(&path)?;
    }

    debug!(path = %path.display(), size = bytes.len(), atomic, "Wrote map file");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_extension_rule() {
        assert_eq!(map_path("maps/dm1").unwrap(), PathBuf::from("maps/dm1.map"));
        assert_eq!(map_path("dm1.map").unwrap(), PathBuf::from("dm1.map"));
        assert!(matches!(
            map_path("dm1.png"),
            Err(MapError::InvalidExtension(ext)) if ext == "png"
        ));
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let written = write_map(dir.path().join("copy"), b"payload", true).unwrap();
        assert_eq!(written, dir.path().join("copy.map"));
        assert_eq!(read_map(dir.path().join("copy")).unwrap(), b"payload");

        write_map(&written, b"plain", false).unwrap();
        assert_eq!(read_map(&written).unwrap(), b"plain");
    }

    #[test]
    fn test_atomic_write_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dm1.map");
        fs::write(&path, vec![0u8; 4096]).unwrap();
        write_map(&path, b"short", true).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"short");
        // Only the destination remains in the directory
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_read_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("h.map");
        fs::write(&path, Header::new().to_bytes()).unwrap();
        assert_eq!(read_header(&path).unwrap(), Header::new());

        fs::write(&path, b"DATA").unwrap();
        assert!(matches!(
            read_header(&path),
            Err(MapError::Truncated { .. })
        ));
    }
}
