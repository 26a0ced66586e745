//! Document to datafile
//!
//! Items are always written in the current layout. Blob indices are
//! assigned in a fixed order: info strings, images, then every layer's
//! data group by group. The same document therefore always produces the
//! same bytes.

use super::{Layer, LayerRole, MapInfo, Teemap};
use crate::datafile::{CompressionConfig, DataFileWriter, StreamCache};
use crate::error::Result;
use crate::items::{
    EnvelopeItem, Envpoint, GroupItem, ImageItem, InfoItem, ItemKind, LayerBody, LayerItem,
    QuadsItem, TilemapItem, VersionItem,
};
use std::collections::HashMap;
use tracing::debug;

/// Bytes a text field is written as: UTF-8 plus a NUL terminator
fn text_bytes(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len() + 1);
    bytes.extend_from_slice(text.as_bytes());
    bytes.push(0);
    bytes
}

/// Image reference as written: the index, or -1 for none
fn index_or_none(index: Option<usize>) -> i32 {
    index.map_or(-1, |index| index as i32)
}

/// Where a text blob is referenced from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum TextSlot {
    Author,
    MapVersion,
    Credits,
    License,
    ImageName(usize),
}

/// Details of the loaded file that the document model does not carry
///
/// Text is decoded lossily and cut at the first NUL, so a blob without a
/// terminator or with invalid UTF-8 decodes to a string that would not
/// encode back to the same bytes. While a slot's decoded value is unchanged
/// the loaded bytes are written instead.
#[derive(Debug, Clone, Default)]
pub(crate) struct Verbatim {
    texts: HashMap<TextSlot, (String, Vec<u8>)>,
    settings: Option<(Vec<String>, Vec<u8>)>,
    /// The file had no envpoints item at all
    pub no_envpoints_item: bool,
}

impl Verbatim {
    pub fn remember(&mut self, slot: TextSlot, text: &str, raw: Vec<u8>) {
        if text_bytes(text) != raw {
            self.texts.insert(slot, (text.to_string(), raw));
        }
    }

    pub fn remember_settings(&mut self, commands: Vec<String>, raw: Vec<u8>) {
        self.settings = Some((commands, raw));
    }

    fn text(&self, slot: TextSlot, text: &str) -> Option<&[u8]> {
        match self.texts.get(&slot) {
            Some((loaded, raw)) if loaded == text => Some(raw.as_slice()),
            _ => None,
        }
    }

    fn settings(&self, commands: &[String]) -> Option<&[u8]> {
        match &self.settings {
            Some((loaded, raw)) if loaded.as_slice() == commands => Some(raw.as_slice()),
            _ => None,
        }
    }
}

/// Write `text` NUL-terminated, or return −1 for `None`
fn put_text(
    writer: &mut DataFileWriter<'_>,
    verbatim: &Verbatim,
    slot: TextSlot,
    text: Option<&str>,
) -> Result<i32> {
    match text {
        Some(text) => match verbatim.text(slot, text) {
            Some(raw) => writer.add_blob(raw),
            None => writer.add_blob(&text_bytes(text)),
        },
        None => Ok(-1),
    }
}

fn encode_info(
    writer: &mut DataFileWriter<'_>,
    verbatim: &Verbatim,
    info: &MapInfo,
) -> Result<InfoItem> {
    let mut text = |slot, value: &Option<String>| {
        put_text(writer, verbatim, slot, value.as_deref())
    };
    let author = text(TextSlot::Author, &info.author)?;
    let map_version = text(TextSlot::MapVersion, &info.map_version)?;
    let credits = text(TextSlot::Credits, &info.credits)?;
    let license = text(TextSlot::License, &info.license)?;
    let settings = match verbatim.settings(&info.settings) {
        Some(bytes) => writer.add_blob(bytes)?,
        None if info.settings.is_empty() => -1,
        None => writer.add_blob(&info.settings_blob())?,
    };
    Ok(InfoItem {
        version: 1,
        author,
        map_version,
        credits,
        license,
        settings,
    })
}

pub(crate) fn encode(
    map: &Teemap,
    config: &CompressionConfig,
    cache: Option<&StreamCache>,
    verbatim: &Verbatim,
) -> Result<Vec<u8>> {
    map.check_references()?;

    let mut writer = DataFileWriter::new(config.clone(), cache);

    writer.add_item(
        ItemKind::Version.tag(),
        0,
        VersionItem { version: 1 }.encode(),
    );

    if let Some(info) = &map.info {
        let item = encode_info(&mut writer, verbatim, info)?;
        writer.add_item(ItemKind::Info.tag(), 0, item.encode());
    }

    for (id, image) in map.images.iter().enumerate() {
        let name = put_text(
            &mut writer,
            verbatim,
            TextSlot::ImageName(id),
            Some(&image.name),
        )?;
        let data = match (&image.data, image.external) {
            (Some(pixels), false) => writer.add_blob(pixels)?,
            _ => -1,
        };
        let item = ImageItem {
            version: 1,
            width: image.width,
            height: image.height,
            external: image.external,
            name,
            data,
        };
        writer.add_item(ItemKind::Image.tag(), id as i32, item.encode());
    }

    for (id, envelope) in map.envelopes.iter().enumerate() {
        let item = EnvelopeItem {
            version: 1,
            channels: envelope.channels,
            start_point: envelope.start_point as i32,
            num_points: envelope.num_points as i32,
            name: envelope.name.clone(),
        };
        writer.add_item(ItemKind::Envelope.tag(), id as i32, item.encode());
    }

    // Overlay slots go on every tile layer once any layer needs them
    let overlay_slots = map
        .layers()
        .any(|layer| matches!(layer.role(), Some(LayerRole::Tele | LayerRole::Speedup)));

    let mut layer_id = 0usize;
    for (group_id, group) in map.groups.iter().enumerate() {
        let item = GroupItem {
            version: 3,
            offset_x: group.offset_x,
            offset_y: group.offset_y,
            parallax_x: group.parallax_x,
            parallax_y: group.parallax_y,
            start_layer: layer_id as i32,
            num_layers: group.layers.len() as i32,
            use_clipping: group.use_clipping,
            clip_x: group.clip_x,
            clip_y: group.clip_y,
            clip_w: group.clip_w,
            clip_h: group.clip_h,
            name: group.name.clone(),
        };
        writer.add_item(ItemKind::Group.tag(), group_id as i32, item.encode());

        for layer in &group.layers {
            let item = encode_layer(&mut writer, layer, overlay_slots)?;
            writer.add_item(ItemKind::Layer.tag(), layer_id as i32, item.encode());
            layer_id += 1;
        }
    }

    if !(map.envpoints.is_empty() && verbatim.no_envpoints_item) {
        writer.add_item(
            ItemKind::Envpoints.tag(),
            0,
            Envpoint::encode_all(&map.envpoints),
        );
    }

    debug!(
        items = writer.num_items(),
        blobs = writer.num_blobs(),
        "Encoded map"
    );
    Ok(writer.finish())
}

fn encode_layer(
    writer: &mut DataFileWriter<'_>,
    layer: &Layer,
    overlay_slots: bool,
) -> Result<LayerItem> {
    let (detail, body) = match layer {
        Layer::Tiles(tiles) => {
            let data = writer.add_blob(tiles.tiles.as_bytes())?;
            let tele = match &tiles.tele {
                Some(tele) if tiles.role == LayerRole::Tele => {
                    Some(writer.add_blob(tele.as_bytes())?)
                }
                _ => None,
            };
            let speedup = match &tiles.speedup {
                Some(speedup) if tiles.role == LayerRole::Speedup => {
                    Some(writer.add_blob(speedup.as_bytes())?)
                }
                _ => None,
            };
            let item = TilemapItem {
                version: 3,
                width: tiles.width() as i32,
                height: tiles.height() as i32,
                flags: tiles.role.flags(),
                color: [tiles.color.r, tiles.color.g, tiles.color.b, tiles.color.a],
                color_env: tiles.color_env,
                color_env_offset: tiles.color_env_offset,
                image: index_or_none(tiles.image),
                data,
                name: tiles.name.clone(),
                tele,
                speedup,
                has_overlay_slots: overlay_slots,
            };
            (tiles.detail, LayerBody::Tiles(item))
        }
        Layer::Quads(quads) => {
            let data = writer.add_blob(quads.quads.as_bytes())?;
            let item = QuadsItem {
                version: 2,
                num_quads: quads.quads.len() as i32,
                data,
                image: index_or_none(quads.image),
                name: quads.name.clone(),
            };
            (quads.detail, LayerBody::Quads(item))
        }
    };

    Ok(LayerItem {
        version: 1,
        detail,
        body,
    })
}
