//! # teemap - Teeworlds Map Reader and Writer
//!
//! `teemap` loads, edits and saves maps in the Teeworlds datafile format:
//! a container of versioned integer items plus zlib-compressed blobs,
//! located entirely through offset tables.
//!
//! - **Datafile engine**: header, offset tables, item records and blob pool
//! - **Typed items** with per-version field layouts
//! - **Document model**: groups of tile and quad layers, images, envelopes
//! - **Packed records**: tiles, quads and race-mod overlays stored compactly
//! - **Faithful round trips**: saving an unmodified map reproduces its bytes
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use teemap::{Result, Teemap};
//!
//! # fn main() -> Result<()> {
//! // `.map` is appended when the path has no extension
//! let map = Teemap::load("maps/ctf1")?;
//! map.validate()?;
//!
//! if let Some(game) = map.game_layer() {
//!     println!("{}x{}", game.width(), game.height());
//! }
//! for (index, layer) in map.layers().enumerate() {
//!     println!("{}: {} {:?}", index, layer.kind(), layer.name());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Building a Map
//!
//! ```rust,no_run
//! use teemap::{Group, QuadLayer, Quad, Result, Teemap, TileLayer};
//!
//! # fn main() -> Result<()> {
//! let mut map = Teemap::new();
//!
//! let mut background = Group::new();
//! let mut quads = QuadLayer::new("Sky");
//! quads.push(Quad::rect(-1024, -1024, 2048, 2048));
//! background.add_layer(quads);
//! map.add_group(background);
//!
//! let mut game = Group::named("Game");
//! game.add_layer(TileLayer::game(100, 60)?);
//! map.add_group(game);
//!
//! map.validate()?;
//! map.save("maps/new_map")?;
//! # Ok(())
//! # }
//! ```

pub mod datafile;
pub mod error;
pub mod io;
pub mod items;
pub mod map;
pub mod packed;
mod resolve;
pub mod resources;
pub mod summary;
pub mod tiles;

pub use datafile::{CompressionConfig, DataFileReader, DataFileWriter, Header, RawItem};
pub use error::{ErrorCategory, MapError, Result};
pub use items::{Envpoint, ItemKind, MapItem};
pub use map::{
    Envelope, Group, Image, Layer, LayerRole, LoadOptions, MapInfo, QuadLayer, SaveOptions,
    Teemap, TileLayer,
};
pub use packed::{
    Color, PackedArray, PackedRecord, Point, Quad, QuadArray, Rotation, SpeedupArray,
    SpeedupTile, TeleArray, TeleTile, Tile, TileArray, TileFlags,
};
pub use resources::{DirResolver, ResourceResolver};
pub use summary::MapSummary;
