//! The map document
//!
//! A [`Teemap`] owns every group, layer, image, envelope and envpoint of a
//! map. Entities refer to each other by position in their owning vector;
//! the flat layer list is derived from the groups on demand.
//!
//! # Example
//!
//! ```no_run
//! use teemap::{Teemap, Tile};
//!
//! # fn main() -> teemap::Result<()> {
//! let mut map = Teemap::load("maps/dm1")?;
//! if let Some(game) = map.game_layer_mut() {
//!     game.set_tile(3, 4, &Tile::new(1))?;
//! }
//! map.validate()?;
//! map.save("maps/dm1_edited")?;
//! # Ok(())
//! # }
//! ```

mod encode;
pub mod envelope;
pub mod group;
pub mod image;
pub mod info;
pub mod layer;
pub mod options;

pub use envelope::Envelope;
pub use group::Group;
pub use image::Image;
pub use info::MapInfo;
pub use layer::{Layer, LayerRole, QuadLayer, TileLayer};
pub use options::{LoadOptions, SaveOptions};

pub(crate) use encode::{TextSlot, Verbatim};

use crate::datafile::{CompressionConfig, DataFileReader, StreamCache};
use crate::error::{MapError, Result};
use crate::io;
use crate::items::Envpoint;
use crate::packed::{Color, Point, Quad, Tile};
use crate::resolve::resolve;
use crate::summary::MapSummary;
use crate::tiles;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct Teemap {
    pub info: Option<MapInfo>,
    pub images: Vec<Image>,
    pub envelopes: Vec<Envelope>,
    /// Shared keyframe pool; envelopes own ranges of it
    pub envpoints: Vec<Envpoint>,
    pub groups: Vec<Group>,
    /// Compressed streams seen on load, reused for unchanged payloads
    streams: StreamCache,
    /// Loaded text bytes and item presence, reused for unchanged content
    verbatim: Verbatim,
}

impl Teemap {
    /// Empty document with no groups
    pub fn new() -> Self {
        Self::default()
    }

    /// The editor's starting point: a backdrop quad and a 50x50 game layer
    pub fn with_default_layout() -> Self {
        let mut map = Teemap::new();

        let mut background = Group {
            parallax_x: 0,
            parallax_y: 0,
            ..Group::default()
        };
        let mut backdrop = QuadLayer::new("Quads");
        let sky_top = Color {
            r: 94,
            g: 132,
            b: 174,
            a: 255,
        };
        let sky_bottom = Color {
            r: 204,
            g: 232,
            b: 255,
            a: 255,
        };
        backdrop.push(Quad {
            points: [
                Point::new(-800 << 10, -600 << 10),
                Point::new(800 << 10, -600 << 10),
                Point::new(-800 << 10, 600 << 10),
                Point::new(800 << 10, 600 << 10),
                Point::new(0, 0),
            ],
            colors: [sky_top, sky_top, sky_bottom, sky_bottom],
            ..Quad::default()
        });
        background.add_layer(backdrop);
        map.add_group(background);

        let mut game = Group::named("Game");
        if let Ok(layer) = TileLayer::game(50, 50) {
            game.add_layer(layer);
        }
        map.add_group(game);

        map
    }

    pub(crate) fn from_parts(
        info: Option<MapInfo>,
        images: Vec<Image>,
        envelopes: Vec<Envelope>,
        envpoints: Vec<Envpoint>,
        groups: Vec<Group>,
        streams: StreamCache,
        verbatim: Verbatim,
    ) -> Self {
        Teemap {
            info,
            images,
            envelopes,
            envpoints,
            groups,
            streams,
            verbatim,
        }
    }

    /// Quick signature and version probe
    pub fn check<P: AsRef<Path>>(path: P) -> bool {
        match io::read_header(path) {
            Ok(_) => true,
            Err(err) => {
                debug!(error = %err, "Not a valid map file");
                false
            }
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with(path, &LoadOptions::default())
    }

    pub fn load_with<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        let bytes = io::read_map(&path)?;
        let map = Self::from_bytes_with(&bytes, options)?;
        info!(
            path = %path.as_ref().display(),
            groups = map.groups.len(),
            layers = map.num_layers(),
            "Loaded map"
        );
        Ok(map)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes_with(bytes, &LoadOptions::default())
    }

    pub fn from_bytes_with(bytes: &[u8], options: &LoadOptions) -> Result<Self> {
        let reader = DataFileReader::parse(bytes)?;
        resolve(&reader, options)
    }

    /// Serialize with default compression
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_with(&CompressionConfig::default())
    }

    pub fn to_bytes_with(&self, config: &CompressionConfig) -> Result<Vec<u8>> {
        encode::encode(self, config, Some(&self.streams), &self.verbatim)
    }

    /// Save to `path`, appending `.map` when it has no extension
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        self.save_with(path, &SaveOptions::default())
    }

    pub fn save_with<P: AsRef<Path>>(&self, path: P, options: &SaveOptions) -> Result<PathBuf> {
        let target = io::map_path(&path)?;
        let bytes = self.to_bytes_with(&options.compression)?;
        let written = io::write_map(target, &bytes, options.atomic)?;
        info!(path = %written.display(), size = bytes.len(), "Saved map");
        Ok(written)
    }

    /// Check the invariants a playable map needs
    ///
    /// Exactly one game layer, on top of [`Teemap::check_references`].
    pub fn validate(&self) -> Result<()> {
        let game_layers = self.layers().filter(|layer| layer.is_game()).count();
        match game_layers {
            0 => return Err(MapError::NoGameLayer),
            1 => {}
            n => return Err(MapError::MultipleGameLayers(n)),
        }
        self.check_references()
    }

    /// Check what the loader would reject: envelope ranges, image
    /// references and tile array lengths
    ///
    /// Saving runs this first so a written map always loads again.
    pub fn check_references(&self) -> Result<()> {
        for (index, envelope) in self.envelopes.iter().enumerate() {
            if envelope.slice(&self.envpoints).is_none() {
                return Err(MapError::PointRangeOutOfBounds {
                    envelope: index,
                    start: envelope.start_point as i32,
                    num: envelope.num_points as i32,
                    total: self.envpoints.len(),
                });
            }
        }

        for layer in self.layers() {
            if let Layer::Tiles(tiles) = layer {
                tiles.check_size()?;
            }
            if let Some(image) = layer.image() {
                if image >= self.images.len() {
                    return Err(MapError::ImageIndexOutOfRange {
                        index: image as i32,
                        count: self.images.len(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Every layer, in group order
    pub fn layers(&self) -> impl Iterator<Item = &Layer> + '_ {
        self.groups.iter().flat_map(|group| group.layers.iter())
    }

    pub fn layers_mut(&mut self) -> impl Iterator<Item = &mut Layer> + '_ {
        self.groups.iter_mut().flat_map(|group| group.layers.iter_mut())
    }

    pub fn num_layers(&self) -> usize {
        self.groups.iter().map(|group| group.layers.len()).sum()
    }

    /// Layer `index` of the flat layer list
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers().nth(index)
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut Layer> {
        self.layers_mut().nth(index)
    }

    fn first_with_role(&self, role: LayerRole) -> Option<&TileLayer> {
        self.layers()
            .filter_map(Layer::as_tiles)
            .find(|layer| layer.role == role)
    }

    pub fn game_layer(&self) -> Option<&TileLayer> {
        self.first_with_role(LayerRole::Game)
    }

    pub fn game_layer_mut(&mut self) -> Option<&mut TileLayer> {
        self.layers_mut()
            .filter_map(Layer::as_tiles_mut)
            .find(|layer| layer.is_game())
    }

    pub fn tele_layer(&self) -> Option<&TileLayer> {
        self.first_with_role(LayerRole::Tele)
    }

    pub fn speedup_layer(&self) -> Option<&TileLayer> {
        self.first_with_role(LayerRole::Speedup)
    }

    /// Game layer width
    pub fn width(&self) -> Option<usize> {
        self.game_layer().map(TileLayer::width)
    }

    /// Game layer height
    pub fn height(&self) -> Option<usize> {
        self.game_layer().map(TileLayer::height)
    }

    /// Keyframes of envelope `index`
    pub fn envelope_points(&self, index: usize) -> Option<&[Envpoint]> {
        self.envelopes.get(index)?.slice(&self.envpoints)
    }

    pub fn add_group(&mut self, group: Group) -> usize {
        self.groups.push(group);
        self.groups.len() - 1
    }

    pub fn add_image(&mut self, image: Image) -> usize {
        self.images.push(image);
        self.images.len() - 1
    }

    /// Append `points` to the pool and an envelope spanning them
    pub fn add_envelope(
        &mut self,
        name: Option<String>,
        channels: i32,
        points: Vec<Envpoint>,
    ) -> usize {
        let envelope = Envelope {
            name,
            channels,
            start_point: self.envpoints.len(),
            num_points: points.len(),
        };
        self.envpoints.extend(points);
        self.envelopes.push(envelope);
        self.envelopes.len() - 1
    }

    /// Number of game layer tiles matching `predicate`, 0 without a game layer
    pub fn count_tiles<F>(&self, predicate: F) -> usize
    where
        F: Fn(&Tile) -> bool,
    {
        self.game_layer()
            .map(|layer| layer.tiles.iter().filter(|tile| predicate(tile)).count())
            .unwrap_or(0)
    }

    /// Game layer count of every pickup in [`tiles::PICKUPS`], zeros included
    pub fn count_pickups(&self) -> Vec<(&'static str, usize)> {
        let histogram = self.tile_histogram();
        tiles::PICKUPS
            .iter()
            .map(|&(name, index)| (name, histogram.get(&index).copied().unwrap_or(0)))
            .collect()
    }

    /// Occurrences of every tile index in the game layer
    pub fn tile_histogram(&self) -> BTreeMap<u8, usize> {
        let mut histogram = BTreeMap::new();
        if let Some(layer) = self.game_layer() {
            for tile in layer.tiles.iter() {
                *histogram.entry(tile.index).or_insert(0) += 1;
            }
        }
        histogram
    }

    pub fn summary(&self) -> MapSummary {
        MapSummary::of(self)
    }

    /// Forget the streams remembered on load so every blob is recompressed
    pub fn clear_stream_cache(&mut self) {
        self.streams.clear();
    }
}
