use crate::error::Result;
use crate::resources::ResourceResolver;

/// A tileset or quad texture
///
/// Embedded images carry raw RGBA pixels; external ones only a name that
/// the game resolves against its own resource directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub external: bool,
    /// Pixel payload, always `None` for external images
    pub data: Option<Vec<u8>>,
}

impl Image {
    pub fn external(name: impl Into<String>, width: i32, height: i32) -> Self {
        Image {
            name: name.into(),
            width,
            height,
            external: true,
            data: None,
        }
    }

    pub fn embedded(name: impl Into<String>, width: i32, height: i32, data: Vec<u8>) -> Self {
        Image {
            name: name.into(),
            width,
            height,
            external: false,
            data: Some(data),
        }
    }

    /// Load the pixels of an external image through `resolver`
    pub fn resolve_external(&self, resolver: &dyn ResourceResolver) -> Result<Vec<u8>> {
        resolver.resolve(&self.name)
    }
}
