//! Wire decoded items into a document
//!
//! Items reference each other by position: groups own a run of the flat
//! layer list, envelopes a run of the flat envpoint list, and layers point
//! at images and blobs by index. Every reference is checked here so the
//! resulting [`Teemap`] never holds a dangling index.

use crate::datafile::{BlobPool, DataFileReader, StreamCache};
use crate::error::{MapError, Result};
use crate::items::{
    EnvelopeItem, Envpoint, GroupItem, ImageItem, InfoItem, LayerBody, LayerItem, MapItem,
    QuadsItem, TilemapItem,
};
use crate::map::{
    Envelope, Group, Image, Layer, LayerRole, LoadOptions, MapInfo, QuadLayer, TextSlot,
    Teemap, TileLayer, Verbatim,
};
use crate::packed::{Color, QuadArray, SpeedupArray, TeleArray, TileArray};
use tracing::{debug, warn};

/// Decoded items grouped by kind, each in on-disk order
#[derive(Debug, Default)]
struct ItemSet {
    version: Option<i32>,
    info: Option<InfoItem>,
    images: Vec<ImageItem>,
    envelopes: Vec<EnvelopeItem>,
    groups: Vec<GroupItem>,
    layers: Vec<LayerItem>,
    envpoints: Vec<Envpoint>,
    has_envpoints: bool,
}

impl ItemSet {
    fn collect(reader: &DataFileReader<'_>) -> Result<Self> {
        let mut set = ItemSet::default();

        for raw in reader.items() {
            let raw = raw?;
            match MapItem::decode(&raw)? {
                MapItem::Version(item) => {
                    if set.version.is_none() {
                        set.version = Some(item.version);
                    }
                }
                MapItem::Info(item) => {
                    if set.info.is_some() {
                        warn!(id = raw.id, "Ignoring extra info item");
                    } else {
                        set.info = Some(item);
                    }
                }
                MapItem::Image(item) => set.images.push(item),
                MapItem::Envelope(item) => set.envelopes.push(item),
                MapItem::Group(item) => set.groups.push(item),
                MapItem::Layer(item) => set.layers.push(item),
                MapItem::Envpoints(points) => {
                    if set.has_envpoints {
                        warn!(id = raw.id, "Ignoring extra envpoints item");
                    } else {
                        set.envpoints = points;
                        set.has_envpoints = true;
                    }
                }
            }
        }

        Ok(set)
    }
}

/// Blob contents as text, cut at the first NUL; `None` for index −1
fn read_text(
    pool: &BlobPool<'_>,
    verbatim: &mut Verbatim,
    slot: TextSlot,
    index: i32,
) -> Result<Option<String>> {
    if index < 0 {
        return Ok(None);
    }
    let bytes = pool.get(index)?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let text = String::from_utf8_lossy(&bytes[..end]).into_owned();
    verbatim.remember(slot, &text, bytes);
    Ok(Some(text))
}

fn image_ref(index: i32, count: usize) -> Result<Option<usize>> {
    match index {
        -1 => Ok(None),
        i if i >= 0 && (i as usize) < count => Ok(Some(i as usize)),
        i => Err(MapError::ImageIndexOutOfRange { index: i, count }),
    }
}

fn dimension(value: i32, kind: &'static str) -> Result<usize> {
    usize::try_from(value).map_err(|_| MapError::MalformedItem {
        kind,
        reason: format!("negative dimension {}", value),
    })
}

/// Build a document from a parsed datafile
pub(crate) fn resolve(reader: &DataFileReader<'_>, options: &LoadOptions) -> Result<Teemap> {
    let items = ItemSet::collect(reader)?;
    match items.version {
        Some(1) => {}
        Some(other) => return Err(MapError::UnsupportedMapVersion(other)),
        None if options.require_version_item => return Err(MapError::MissingItem("version")),
        None => warn!("Map has no version item"),
    }

    let pool = reader.blobs();
    let mut streams = StreamCache::new();
    pool.fill_cache(&mut streams)?;
    let mut verbatim = Verbatim::default();
    verbatim.no_envpoints_item = !items.has_envpoints;

    let info = items
        .info
        .map(|item| resolve_info(&pool, &mut verbatim, &item))
        .transpose()?;

    let images = items
        .images
        .iter()
        .enumerate()
        .map(|(index, item)| resolve_image(&pool, &mut verbatim, index, item))
        .collect::<Result<Vec<_>>>()?;

    let envelopes = resolve_envelopes(&items.envelopes, items.envpoints.len())?;

    let mut layers: Vec<Option<Layer>> = items
        .layers
        .iter()
        .enumerate()
        .map(|(index, item)| resolve_layer(&pool, item, images.len(), index).map(Some))
        .collect::<Result<_>>()?;

    let groups = resolve_groups(&items.groups, &mut layers)?;

    let orphans = layers.iter().filter(|layer| layer.is_some()).count();
    if orphans > 0 {
        warn!(orphans, "Dropping layers that belong to no group");
    }

    debug!(
        groups = groups.len(),
        layers = items.layers.len() - orphans,
        images = images.len(),
        envelopes = envelopes.len(),
        envpoints = items.envpoints.len(),
        "Resolved map"
    );

    Ok(Teemap::from_parts(
        info,
        images,
        envelopes,
        items.envpoints,
        groups,
        streams,
        verbatim,
    ))
}

fn resolve_info(
    pool: &BlobPool<'_>,
    verbatim: &mut Verbatim,
    item: &InfoItem,
) -> Result<MapInfo> {
    let settings = if item.settings >= 0 {
        let blob = pool.get(item.settings)?;
        let commands = MapInfo::parse_settings(&blob);
        verbatim.remember_settings(commands.clone(), blob);
        commands
    } else {
        Vec::new()
    };
    Ok(MapInfo {
        author: read_text(pool, verbatim, TextSlot::Author, item.author)?,
        map_version: read_text(pool, verbatim, TextSlot::MapVersion, item.map_version)?,
        credits: read_text(pool, verbatim, TextSlot::Credits, item.credits)?,
        license: read_text(pool, verbatim, TextSlot::License, item.license)?,
        settings,
    })
}

fn resolve_image(
    pool: &BlobPool<'_>,
    verbatim: &mut Verbatim,
    index: usize,
    item: &ImageItem,
) -> Result<Image> {
    let name = read_text(pool, verbatim, TextSlot::ImageName(index), item.name)?
        .unwrap_or_default();
    let data = if !item.external && item.data >= 0 {
        Some(pool.get(item.data)?)
    } else {
        None
    };
    Ok(Image {
        name,
        width: item.width,
        height: item.height,
        external: item.external,
        data,
    })
}

fn resolve_envelopes(items: &[EnvelopeItem], total: usize) -> Result<Vec<Envelope>> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let out_of_bounds = || MapError::PointRangeOutOfBounds {
                envelope: index,
                start: item.start_point,
                num: item.num_points,
                total,
            };
            let start = usize::try_from(item.start_point).map_err(|_| out_of_bounds())?;
            let num = usize::try_from(item.num_points).map_err(|_| out_of_bounds())?;
            if start + num > total {
                return Err(out_of_bounds());
            }
            Ok(Envelope {
                name: item.name.clone(),
                channels: item.channels,
                start_point: start,
                num_points: num,
            })
        })
        .collect()
}

fn resolve_groups(items: &[GroupItem], layers: &mut [Option<Layer>]) -> Result<Vec<Group>> {
    let total = layers.len();
    let mut groups = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let out_of_bounds = || MapError::LayerRangeOutOfBounds {
            group: index,
            start: item.start_layer,
            num: item.num_layers,
            total,
        };
        let start = usize::try_from(item.start_layer).map_err(|_| out_of_bounds())?;
        let num = usize::try_from(item.num_layers).map_err(|_| out_of_bounds())?;
        if start + num > total {
            return Err(out_of_bounds());
        }

        let mut owned = Vec::with_capacity(num);
        for layer_index in start..start + num {
            let layer = layers[layer_index]
                .take()
                .ok_or(MapError::SharedLayer { index: layer_index })?;
            owned.push(layer);
        }

        groups.push(Group {
            name: item.name.clone(),
            offset_x: item.offset_x,
            offset_y: item.offset_y,
            parallax_x: item.parallax_x,
            parallax_y: item.parallax_y,
            use_clipping: item.use_clipping,
            clip_x: item.clip_x,
            clip_y: item.clip_y,
            clip_w: item.clip_w,
            clip_h: item.clip_h,
            layers: owned,
        });
    }

    Ok(groups)
}

fn resolve_layer(
    pool: &BlobPool<'_>,
    item: &LayerItem,
    image_count: usize,
    index: usize,
) -> Result<Layer> {
    let mut layer = match &item.body {
        LayerBody::Tiles(tiles) => {
            Layer::Tiles(resolve_tile_layer(pool, tiles, image_count, index)?)
        }
        LayerBody::Quads(quads) => {
            Layer::Quads(resolve_quad_layer(pool, quads, image_count, index)?)
        }
    };
    match &mut layer {
        Layer::Tiles(tiles) => tiles.detail = item.detail,
        Layer::Quads(quads) => quads.detail = item.detail,
    }
    Ok(layer)
}

/// Overlay blob index if it names an existing blob
fn overlay_blob(pool: &BlobPool<'_>, index: Option<i32>) -> Option<i32> {
    index.filter(|&i| pool.contains(i))
}

fn resolve_tile_layer(
    pool: &BlobPool<'_>,
    item: &TilemapItem,
    image_count: usize,
    index: usize,
) -> Result<TileLayer> {
    let width = dimension(item.width, "tile layer")?;
    let height = dimension(item.height, "tile layer")?;
    let role = LayerRole::from_flags(item.flags)?;

    let tiles = TileArray::from_bytes(pool.get(item.data)?)?;

    let tele = match (role, overlay_blob(pool, item.tele)) {
        (LayerRole::Tele, Some(blob)) => Some(TeleArray::from_bytes(pool.get(blob)?)?),
        _ => None,
    };
    let speedup = match (role, overlay_blob(pool, item.speedup)) {
        (LayerRole::Speedup, Some(blob)) => Some(SpeedupArray::from_bytes(pool.get(blob)?)?),
        _ => None,
    };
    if role == LayerRole::Tele && tele.is_none() {
        warn!(layer = index, "Tele layer has no tele data");
    }
    if role == LayerRole::Speedup && speedup.is_none() {
        warn!(layer = index, "Speedup layer has no speedup data");
    }

    let mut layer = TileLayer::from_parts(width, height, tiles, tele, speedup)?;
    layer.name = item.name.clone();
    layer.role = role;
    layer.color = Color {
        r: item.color[0],
        g: item.color[1],
        b: item.color[2],
        a: item.color[3],
    };
    layer.color_env = item.color_env;
    layer.color_env_offset = item.color_env_offset;
    layer.image = image_ref(item.image, image_count)?;
    Ok(layer)
}

fn resolve_quad_layer(
    pool: &BlobPool<'_>,
    item: &QuadsItem,
    image_count: usize,
    index: usize,
) -> Result<QuadLayer> {
    let quads = if item.data >= 0 {
        QuadArray::from_bytes(pool.get(item.data)?)?
    } else {
        QuadArray::new()
    };
    if quads.len() as i64 != item.num_quads as i64 {
        warn!(
            layer = index,
            recorded = item.num_quads,
            found = quads.len(),
            "Quad count disagrees with quad data"
        );
    }

    Ok(QuadLayer {
        name: item.name.clone(),
        detail: false,
        image: image_ref(item.image, image_count)?,
        quads,
    })
}
