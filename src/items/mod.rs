//! Item codec
//!
//! Turns raw item records into typed map items and back. Dispatch is a
//! closed match over [`ItemKind`]; tags outside it are decode errors.

pub mod layout;
pub mod names;
pub mod records;

pub use names::{pack_name, unpack_name};
pub use records::{
    layer_type, EnvelopeItem, Envpoint, GroupItem, ImageItem, InfoItem, LayerBody, LayerItem,
    QuadsItem, TilemapItem, VersionItem,
};

use crate::datafile::RawItem;
use crate::error::{MapError, Result};

/// Item type tags in the datafile
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemKind {
    Version = 0,
    Info = 1,
    Image = 2,
    Envelope = 3,
    Group = 4,
    Layer = 5,
    Envpoints = 6,
}

impl ItemKind {
    pub const ALL: [ItemKind; 7] = [
        ItemKind::Version,
        ItemKind::Info,
        ItemKind::Image,
        ItemKind::Envelope,
        ItemKind::Group,
        ItemKind::Layer,
        ItemKind::Envpoints,
    ];

    pub fn from_tag(tag: i32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.tag() == tag)
            .ok_or(MapError::UnknownItemType(tag))
    }

    pub fn tag(self) -> i32 {
        self as i32
    }

    pub fn name(self) -> &'static str {
        match self {
            ItemKind::Version => "version",
            ItemKind::Info => "info",
            ItemKind::Image => "image",
            ItemKind::Envelope => "envelope",
            ItemKind::Group => "group",
            ItemKind::Layer => "layer",
            ItemKind::Envpoints => "envpoints",
        }
    }
}

/// A decoded item of any kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapItem {
    Version(VersionItem),
    Info(InfoItem),
    Image(ImageItem),
    Envelope(EnvelopeItem),
    Group(GroupItem),
    Layer(LayerItem),
    Envpoints(Vec<Envpoint>),
}

impl MapItem {
    /// Decode a raw record according to its type tag
    pub fn decode(raw: &RawItem) -> Result<Self> {
        let payload = raw.payload.as_slice();
        let item = match ItemKind::from_tag(raw.type_id)? {
            ItemKind::Version => MapItem::Version(VersionItem::decode(payload)?),
            ItemKind::Info => MapItem::Info(InfoItem::decode(payload)?),
            ItemKind::Image => MapItem::Image(ImageItem::decode(payload)?),
            ItemKind::Envelope => MapItem::Envelope(EnvelopeItem::decode(payload)?),
            ItemKind::Group => MapItem::Group(GroupItem::decode(payload)?),
            ItemKind::Layer => MapItem::Layer(LayerItem::decode(payload)?),
            ItemKind::Envpoints => MapItem::Envpoints(Envpoint::decode_all(payload)?),
        };
        Ok(item)
    }

    pub fn kind(&self) -> ItemKind {
        match self {
            MapItem::Version(_) => ItemKind::Version,
            MapItem::Info(_) => ItemKind::Info,
            MapItem::Image(_) => ItemKind::Image,
            MapItem::Envelope(_) => ItemKind::Envelope,
            MapItem::Group(_) => ItemKind::Group,
            MapItem::Layer(_) => ItemKind::Layer,
            MapItem::Envpoints(_) => ItemKind::Envpoints,
        }
    }

    /// Payload in the current layout
    pub fn encode(&self) -> Vec<i32> {
        match self {
            MapItem::Version(item) => item.encode(),
            MapItem::Info(item) => item.encode(),
            MapItem::Image(item) => item.encode(),
            MapItem::Envelope(item) => item.encode(),
            MapItem::Group(item) => item.encode(),
            MapItem::Layer(item) => item.encode(),
            MapItem::Envpoints(points) => Envpoint::encode_all(points),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_kind_tags() {
        for kind in ItemKind::ALL {
            assert_eq!(ItemKind::from_tag(kind.tag()).unwrap(), kind);
        }
        assert!(matches!(
            ItemKind::from_tag(7),
            Err(MapError::UnknownItemType(7))
        ));
        assert!(matches!(
            ItemKind::from_tag(0xffff),
            Err(MapError::UnknownItemType(0xffff))
        ));
    }

    #[test]
    fn test_decode_dispatch() {
        let raw = RawItem {
            type_id: 2,
            id: 0,
            payload: vec![1, 64, 32, 1, 0, -1],
        };
        let item = MapItem::decode(&raw).unwrap();
        assert_eq!(item.kind(), ItemKind::Image);
        let MapItem::Image(image) = &item else {
            panic!("expected image");
        };
        assert!(image.external);
        assert_eq!(image.data, -1);
        assert_eq!(item.encode(), raw.payload);
    }

    #[test]
    fn test_decode_unknown_type() {
        let raw = RawItem {
            type_id: 42,
            id: 0,
            payload: vec![],
        };
        assert!(matches!(
            MapItem::decode(&raw),
            Err(MapError::UnknownItemType(42))
        ));
    }

    #[test]
    fn test_version_item_always_encodes_current() {
        let item = MapItem::Version(VersionItem { version: 1 });
        assert_eq!(item.encode(), vec![1]);
    }
}
