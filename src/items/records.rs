//! Typed item records
//!
//! Records mirror the on-disk ints one to one, except that names are
//! unpacked and optional fields become `Option`s. Blob and image
//! references stay raw indices; the resolver turns them into data.

use super::layout::{self, base_len, current};
use super::names::{pack_name, unpack_name};
use crate::error::{MapError, Result};
use tracing::warn;

fn require_len(payload: &[i32], len: usize, kind: &'static str) -> Result<()> {
    if payload.len() < len {
        return Err(MapError::MalformedItem {
            kind,
            reason: format!("payload has {} ints, need at least {}", payload.len(), len),
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionItem {
    pub version: i32,
}

impl VersionItem {
    pub fn decode(payload: &[i32]) -> Result<Self> {
        require_len(payload, base_len::VERSION, "version")?;
        Ok(VersionItem {
            version: payload[0],
        })
    }

    pub fn encode(&self) -> Vec<i32> {
        vec![current::MAP]
    }
}

/// Map metadata; every field is a blob index, −1 when absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoItem {
    pub version: i32,
    pub author: i32,
    pub map_version: i32,
    pub credits: i32,
    pub license: i32,
    pub settings: i32,
}

impl InfoItem {
    pub fn decode(payload: &[i32]) -> Result<Self> {
        require_len(payload, base_len::INFO, "info")?;
        let version = payload[0];
        Ok(InfoItem {
            version,
            author: payload[1],
            map_version: payload[2],
            credits: payload[3],
            license: payload[4],
            settings: layout::INFO_SETTINGS
                .read_int(payload, version)
                .unwrap_or(-1),
        })
    }

    pub fn encode(&self) -> Vec<i32> {
        vec![
            current::INFO,
            self.author,
            self.map_version,
            self.credits,
            self.license,
            self.settings,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageItem {
    pub version: i32,
    pub width: i32,
    pub height: i32,
    pub external: bool,
    /// Blob holding the NUL-terminated name
    pub name: i32,
    /// Pixel blob, −1 for external images
    pub data: i32,
}

impl ImageItem {
    pub fn decode(payload: &[i32]) -> Result<Self> {
        require_len(payload, base_len::IMAGE, "image")?;
        Ok(ImageItem {
            version: payload[0],
            width: payload[1],
            height: payload[2],
            external: payload[3] != 0,
            name: payload[4],
            data: payload[5],
        })
    }

    pub fn encode(&self) -> Vec<i32> {
        vec![
            current::IMAGE,
            self.width,
            self.height,
            self.external as i32,
            self.name,
            self.data,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeItem {
    pub version: i32,
    pub channels: i32,
    pub start_point: i32,
    pub num_points: i32,
    pub name: Option<String>,
}

impl EnvelopeItem {
    pub fn decode(payload: &[i32]) -> Result<Self> {
        require_len(payload, base_len::ENVELOPE, "envelope")?;
        let version = payload[0];
        Ok(EnvelopeItem {
            version,
            channels: payload[1],
            start_point: payload[2],
            num_points: payload[3],
            name: unpack_name(layout::ENVELOPE_NAME.read_partial(payload, version)),
        })
    }

    pub fn encode(&self) -> Vec<i32> {
        let mut payload = vec![
            current::ENVELOPE,
            self.channels,
            self.start_point,
            self.num_points,
        ];
        payload.extend(pack_name(
            self.name.as_deref().unwrap_or(""),
            layout::ENVELOPE_NAME.len,
        ));
        payload
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupItem {
    pub version: i32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub parallax_x: i32,
    pub parallax_y: i32,
    pub start_layer: i32,
    pub num_layers: i32,
    pub use_clipping: bool,
    pub clip_x: i32,
    pub clip_y: i32,
    pub clip_w: i32,
    pub clip_h: i32,
    pub name: Option<String>,
}

impl GroupItem {
    pub fn decode(payload: &[i32]) -> Result<Self> {
        require_len(payload, base_len::GROUP, "group")?;
        let version = payload[0];
        let clipping = layout::GROUP_CLIPPING
            .read(payload, version)
            .unwrap_or(&[0; 5]);

        Ok(GroupItem {
            version,
            offset_x: payload[1],
            offset_y: payload[2],
            parallax_x: payload[3],
            parallax_y: payload[4],
            start_layer: payload[5],
            num_layers: payload[6],
            use_clipping: clipping[0] != 0,
            clip_x: clipping[1],
            clip_y: clipping[2],
            clip_w: clipping[3],
            clip_h: clipping[4],
            name: layout::GROUP_NAME
                .read(payload, version)
                .and_then(unpack_name),
        })
    }

    pub fn encode(&self) -> Vec<i32> {
        let mut payload = vec![
            current::GROUP,
            self.offset_x,
            self.offset_y,
            self.parallax_x,
            self.parallax_y,
            self.start_layer,
            self.num_layers,
            self.use_clipping as i32,
            self.clip_x,
            self.clip_y,
            self.clip_w,
            self.clip_h,
        ];
        payload.extend(pack_name(
            self.name.as_deref().unwrap_or(""),
            layout::GROUP_NAME.len,
        ));
        payload
    }
}

/// Layer type tags
pub mod layer_type {
    pub const INVALID: i32 = 0;
    /// Only written by ancient editors; read as a tile layer
    pub const GAME: i32 = 1;
    pub const TILES: i32 = 2;
    pub const QUADS: i32 = 3;
}

/// Bit 0 of the shared layer flags field
const LAYER_FLAG_DETAIL: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerItem {
    pub version: i32,
    pub detail: bool,
    pub body: LayerBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayerBody {
    Tiles(TilemapItem),
    Quads(QuadsItem),
}

impl LayerItem {
    pub fn decode(payload: &[i32]) -> Result<Self> {
        require_len(payload, base_len::LAYER, "layer")?;
        let body = match payload[1] {
            layer_type::TILES => LayerBody::Tiles(TilemapItem::decode(payload)?),
            layer_type::QUADS => LayerBody::Quads(QuadsItem::decode(payload)?),
            layer_type::GAME => {
                warn!("Legacy game layer type tag; reading as tile layer");
                LayerBody::Tiles(TilemapItem::decode(payload)?)
            }
            other => return Err(MapError::UnknownLayerType(other)),
        };

        Ok(LayerItem {
            version: payload[0],
            detail: payload[2] & LAYER_FLAG_DETAIL != 0,
            body,
        })
    }

    pub fn encode(&self) -> Vec<i32> {
        let (type_tag, body) = match &self.body {
            LayerBody::Tiles(tiles) => (layer_type::TILES, tiles.encode()),
            LayerBody::Quads(quads) => (layer_type::QUADS, quads.encode()),
        };
        let mut payload = vec![current::LAYER, type_tag, self.detail as i32];
        payload.extend(body);
        payload
    }
}

/// Tile layer fields, positions counted from the start of the layer payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilemapItem {
    pub version: i32,
    pub width: i32,
    pub height: i32,
    /// Layer role as stored (game, tele, speedup or plain)
    pub flags: i32,
    pub color: [i32; 4],
    pub color_env: i32,
    pub color_env_offset: i32,
    pub image: i32,
    pub data: i32,
    pub name: Option<String>,
    /// Overlay blob indices; `None` when the slot is missing or negative
    pub tele: Option<i32>,
    pub speedup: Option<i32>,
    /// Whether the overlay slots are written on encode
    pub has_overlay_slots: bool,
}

impl TilemapItem {
    fn decode(payload: &[i32]) -> Result<Self> {
        require_len(payload, base_len::TILEMAP, "tile layer")?;
        let version = payload[3];
        let tele = layout::TILEMAP_TELE.read_int(payload, version);
        let speedup = layout::TILEMAP_SPEEDUP.read_int(payload, version);

        Ok(TilemapItem {
            version,
            width: payload[4],
            height: payload[5],
            flags: payload[6],
            color: [payload[7], payload[8], payload[9], payload[10]],
            color_env: payload[11],
            color_env_offset: payload[12],
            image: payload[13],
            data: payload[14],
            name: layout::TILEMAP_NAME
                .read(payload, version)
                .and_then(unpack_name),
            has_overlay_slots: tele.is_some() || speedup.is_some(),
            tele: tele.filter(|&index| index >= 0),
            speedup: speedup.filter(|&index| index >= 0),
        })
    }

    fn encode(&self) -> Vec<i32> {
        let mut payload = vec![
            current::TILEMAP,
            self.width,
            self.height,
            self.flags,
            self.color[0],
            self.color[1],
            self.color[2],
            self.color[3],
            self.color_env,
            self.color_env_offset,
            self.image,
            self.data,
        ];
        payload.extend(pack_name(
            self.name.as_deref().unwrap_or(""),
            layout::TILEMAP_NAME.len,
        ));
        if self.has_overlay_slots || self.tele.is_some() || self.speedup.is_some() {
            payload.push(self.tele.unwrap_or(-1));
            payload.push(self.speedup.unwrap_or(-1));
        }
        payload
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuadsItem {
    pub version: i32,
    pub num_quads: i32,
    pub data: i32,
    pub image: i32,
    pub name: Option<String>,
}

impl QuadsItem {
    fn decode(payload: &[i32]) -> Result<Self> {
        require_len(payload, base_len::QUADS, "quad layer")?;
        let version = payload[3];
        Ok(QuadsItem {
            version,
            num_quads: payload[4],
            data: payload[5],
            image: payload[6],
            name: layout::QUADS_NAME
                .read(payload, version)
                .and_then(unpack_name),
        })
    }

    fn encode(&self) -> Vec<i32> {
        let mut payload = vec![current::QUADS, self.num_quads, self.data, self.image];
        payload.extend(pack_name(
            self.name.as_deref().unwrap_or(""),
            layout::QUADS_NAME.len,
        ));
        payload
    }
}

/// One keyframe of an envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Envpoint {
    /// Milliseconds from envelope start
    pub time: i32,
    pub curve_type: i32,
    pub values: [i32; 4],
}

impl Envpoint {
    /// Split the envpoints item into points
    pub fn decode_all(payload: &[i32]) -> Result<Vec<Self>> {
        if payload.len() % base_len::ENVPOINT != 0 {
            return Err(MapError::MalformedItem {
                kind: "envpoints",
                reason: format!("{} ints is not a whole number of points", payload.len()),
            });
        }
        Ok(payload
            .chunks_exact(base_len::ENVPOINT)
            .map(|point| Envpoint {
                time: point[0],
                curve_type: point[1],
                values: [point[2], point[3], point[4], point[5]],
            })
            .collect())
    }

    pub fn encode_all(points: &[Envpoint]) -> Vec<i32> {
        let mut payload = Vec::with_capacity(points.len() * base_len::ENVPOINT);
        for point in points {
            payload.push(point.time);
            payload.push(point.curve_type);
            payload.extend_from_slice(&point.values);
        }
        payload
    }
}
