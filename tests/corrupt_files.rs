//! Loading damaged and inconsistent map files
//!
//! Broken bytes come from mutating a valid file; inconsistent but well
//! formed files are assembled item by item with `DataFileWriter`.

mod common;

use teemap::items::{GroupItem, LayerBody, LayerItem, QuadsItem, TilemapItem, VersionItem};
use teemap::{
    CompressionConfig, DataFileWriter, ErrorCategory, ItemKind, LoadOptions, MapError, Teemap,
};

fn vanilla_bytes() -> Vec<u8> {
    common::vanilla().to_bytes().unwrap()
}

fn group(start_layer: i32, num_layers: i32) -> GroupItem {
    GroupItem {
        version: 3,
        offset_x: 0,
        offset_y: 0,
        parallax_x: 100,
        parallax_y: 100,
        start_layer,
        num_layers,
        use_clipping: false,
        clip_x: 0,
        clip_y: 0,
        clip_w: 0,
        clip_h: 0,
        name: None,
    }
}

fn quad_layer(data: i32, image: i32) -> LayerItem {
    LayerItem {
        version: 1,
        detail: false,
        body: LayerBody::Quads(QuadsItem {
            version: 2,
            num_quads: 0,
            data,
            image,
            name: None,
        }),
    }
}

fn game_layer(width: i32, height: i32, data: i32) -> LayerItem {
    LayerItem {
        version: 1,
        detail: false,
        body: LayerBody::Tiles(TilemapItem {
            version: 3,
            width,
            height,
            flags: 1,
            color: [255; 4],
            color_env: -1,
            color_env_offset: 0,
            image: -1,
            data,
            name: None,
            tele: None,
            speedup: None,
            has_overlay_slots: false,
        }),
    }
}

/// A datafile holding the given groups and layers plus a version item
fn assemble(groups: &[GroupItem], layers: &[LayerItem], blobs: &[Vec<u8>]) -> Vec<u8> {
    let mut writer = DataFileWriter::new(CompressionConfig::default(), None);
    writer.add_item(
        ItemKind::Version.tag(),
        0,
        VersionItem { version: 1 }.encode(),
    );
    for blob in blobs {
        writer.add_blob(blob).unwrap();
    }
    for (id, item) in groups.iter().enumerate() {
        writer.add_item(ItemKind::Group.tag(), id as i32, item.encode());
    }
    for (id, item) in layers.iter().enumerate() {
        writer.add_item(ItemKind::Layer.tag(), id as i32, item.encode());
    }
    writer.finish()
}

#[test]
fn test_bad_magic() {
    let mut bytes = vanilla_bytes();
    bytes[..4].copy_from_slice(b"NOPE");
    let err = Teemap::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, MapError::InvalidMagic(magic) if &magic == b"NOPE"));
    assert_eq!(err.category(), ErrorCategory::Format);
}

#[test]
fn test_swapped_magic_is_accepted() {
    let mut bytes = vanilla_bytes();
    bytes[..4].copy_from_slice(b"ATAD");
    let map = Teemap::from_bytes(&bytes).unwrap();
    assert_eq!(map.num_layers(), 6);
}

#[test]
fn test_unsupported_container_version() {
    let mut bytes = vanilla_bytes();
    bytes[4..8].copy_from_slice(&3i32.to_le_bytes());
    assert!(matches!(
        Teemap::from_bytes(&bytes),
        Err(MapError::UnsupportedVersion(3))
    ));
}

#[test]
fn test_truncation_is_detected_everywhere() {
    let bytes = vanilla_bytes();
    for len in [0, 10, 35, 36, 100, bytes.len() / 2, bytes.len() - 1] {
        let err = Teemap::from_bytes(&bytes[..len]).unwrap_err();
        assert_eq!(
            err.category(),
            ErrorCategory::CorruptData,
            "length {} gave {:?}",
            len,
            err
        );
    }
}

#[test]
fn test_check_on_garbage_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("garbage.map");
    std::fs::write(&path, b"definitely not a map").unwrap();
    assert!(!Teemap::check(&path));
    assert!(Teemap::load(&path).is_err());
}

#[test]
fn test_missing_version_item() {
    let mut writer = DataFileWriter::new(CompressionConfig::default(), None);
    writer.add_item(ItemKind::Group.tag(), 0, group(0, 0).encode());
    let bytes = writer.finish();

    assert!(matches!(
        Teemap::from_bytes(&bytes),
        Err(MapError::MissingItem("version"))
    ));

    let map = Teemap::from_bytes_with(&bytes, &LoadOptions::lenient()).unwrap();
    assert_eq!(map.groups.len(), 1);
    assert!(matches!(map.validate(), Err(MapError::NoGameLayer)));
}

#[test]
fn test_unsupported_map_version() {
    let mut writer = DataFileWriter::new(CompressionConfig::default(), None);
    writer.add_item(
        ItemKind::Version.tag(),
        0,
        VersionItem { version: 2 }.encode(),
    );
    let bytes = writer.finish();
    assert!(matches!(
        Teemap::from_bytes(&bytes),
        Err(MapError::UnsupportedMapVersion(2))
    ));
}

#[test]
fn test_shared_layer() {
    let bytes = assemble(
        &[group(0, 2), group(1, 1)],
        &[quad_layer(0, -1), quad_layer(0, -1)],
        &[Vec::new()],
    );
    let err = Teemap::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, MapError::SharedLayer { index: 1 }));
    assert!(err.is_validation());
}

#[test]
fn test_group_range_past_layer_list() {
    let bytes = assemble(&[group(0, 3)], &[quad_layer(0, -1)], &[Vec::new()]);
    assert!(matches!(
        Teemap::from_bytes(&bytes),
        Err(MapError::LayerRangeOutOfBounds { group: 0, .. })
    ));
}

#[test]
fn test_orphan_layer_is_dropped() {
    let bytes = assemble(
        &[group(0, 1)],
        &[game_layer(2, 2, 0), quad_layer(1, -1)],
        &[vec![0; 16], Vec::new()],
    );
    let map = Teemap::from_bytes(&bytes).unwrap();
    assert_eq!(map.num_layers(), 1);
    map.validate().unwrap();
}

#[test]
fn test_image_index_out_of_range() {
    let bytes = assemble(&[group(0, 1)], &[quad_layer(0, 4)], &[Vec::new()]);
    let err = Teemap::from_bytes(&bytes).unwrap_err();
    assert!(matches!(
        err,
        MapError::ImageIndexOutOfRange { index: 4, count: 0 }
    ));
    assert_eq!(err.category(), ErrorCategory::CorruptData);
}

#[test]
fn test_tile_data_size_mismatch() {
    // 3x3 layer needs 36 bytes of tile data
    let bytes = assemble(&[group(0, 1)], &[game_layer(3, 3, 0)], &[vec![0; 16]]);
    assert!(matches!(
        Teemap::from_bytes(&bytes),
        Err(MapError::SizeMismatch {
            expected: 9,
            found: 4,
            ..
        })
    ));
}

#[test]
fn test_blob_index_out_of_range() {
    let bytes = assemble(&[group(0, 1)], &[game_layer(2, 2, 5)], &[vec![0; 16]]);
    assert!(matches!(
        Teemap::from_bytes(&bytes),
        Err(MapError::BlobIndexOutOfRange { index: 5, .. })
    ));
}

#[test]
fn test_unknown_item_type() {
    let mut writer = DataFileWriter::new(CompressionConfig::default(), None);
    writer.add_item(
        ItemKind::Version.tag(),
        0,
        VersionItem { version: 1 }.encode(),
    );
    writer.add_item(0x7fff, 0, vec![1, 2, 3]);
    let bytes = writer.finish();
    assert!(matches!(
        Teemap::from_bytes(&bytes),
        Err(MapError::UnknownItemType(0x7fff))
    ));
}

#[test]
fn test_multiple_game_layers_fail_validation() {
    let bytes = assemble(
        &[group(0, 2)],
        &[game_layer(2, 2, 0), game_layer(2, 2, 0)],
        &[vec![0; 16]],
    );
    let map = Teemap::from_bytes(&bytes).unwrap();
    assert!(matches!(
        map.validate(),
        Err(MapError::MultipleGameLayers(2))
    ));
}
