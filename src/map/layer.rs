//! Tile and quad layers

use crate::error::{MapError, Result};
use crate::packed::{Color, Quad, QuadArray, SpeedupArray, TeleArray, Tile, TileArray};
use serde::Serialize;

/// Gameplay meaning of a tile layer, stored in its flags field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerRole {
    /// Purely visual
    #[default]
    Normal,
    /// Collision and entities
    Game,
    /// Teleporters (race mods)
    Tele,
    /// Speed boosters (race mods)
    Speedup,
}

impl LayerRole {
    pub fn from_flags(flags: i32) -> Result<Self> {
        match flags {
            0 => Ok(LayerRole::Normal),
            1 => Ok(LayerRole::Game),
            2 => Ok(LayerRole::Tele),
            4 => Ok(LayerRole::Speedup),
            other => Err(MapError::UnknownLayerRole(other)),
        }
    }

    pub fn flags(self) -> i32 {
        match self {
            LayerRole::Normal => 0,
            LayerRole::Game => 1,
            LayerRole::Tele => 2,
            LayerRole::Speedup => 4,
        }
    }
}

/// A rectangular grid of tiles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    pub name: Option<String>,
    pub detail: bool,
    pub role: LayerRole,
    pub color: Color,
    pub color_env: i32,
    pub color_env_offset: i32,
    /// Tileset image, `None` for untextured layers
    pub image: Option<usize>,
    width: usize,
    height: usize,
    /// Row-major, `width * height` records
    pub tiles: TileArray,
    /// Present on tele layers only
    pub tele: Option<TeleArray>,
    /// Present on speedup layers only
    pub speedup: Option<SpeedupArray>,
}

impl TileLayer {
    /// Empty layer of default tiles
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MapError::InvalidDimensions { width, height });
        }
        Ok(TileLayer {
            width,
            height,
            tiles: TileArray::with_len(width * height),
            ..Self::blank()
        })
    }

    /// Default settings with no cells
    fn blank() -> Self {
        TileLayer {
            name: None,
            detail: false,
            role: LayerRole::Normal,
            color: Color::WHITE,
            color_env: -1,
            color_env_offset: 0,
            image: None,
            width: 0,
            height: 0,
            tiles: TileArray::new(),
            tele: None,
            speedup: None,
        }
    }

    /// Layer with the given role; overlay roles get a zeroed overlay array
    pub fn with_role(width: usize, height: usize, role: LayerRole) -> Result<Self> {
        let mut layer = Self::new(width, height)?;
        layer.role = role;
        match role {
            LayerRole::Tele => layer.tele = Some(TeleArray::with_len(width * height)),
            LayerRole::Speedup => layer.speedup = Some(SpeedupArray::with_len(width * height)),
            LayerRole::Normal | LayerRole::Game => {}
        }
        Ok(layer)
    }

    pub fn game(width: usize, height: usize) -> Result<Self> {
        let mut layer = Self::with_role(width, height, LayerRole::Game)?;
        layer.name = Some("Game".to_string());
        Ok(layer)
    }

    /// Assemble a layer from decoded parts, checking every array's length
    pub(crate) fn from_parts(
        width: usize,
        height: usize,
        tiles: TileArray,
        tele: Option<TeleArray>,
        speedup: Option<SpeedupArray>,
    ) -> Result<Self> {
        let layer = TileLayer {
            width,
            height,
            tiles,
            tele,
            speedup,
            ..Self::blank()
        };
        layer.check_size()?;
        Ok(layer)
    }

    /// Every cell array must hold exactly `width * height` records
    pub fn check_size(&self) -> Result<()> {
        let cells = self.width * self.height;
        let lengths = [
            ("tile data", Some(self.tiles.len())),
            ("tele data", self.tele.as_ref().map(TeleArray::len)),
            ("speedup data", self.speedup.as_ref().map(SpeedupArray::len)),
        ];
        for (context, len) in lengths {
            if let Some(found) = len {
                if found != cells {
                    return Err(MapError::SizeMismatch {
                        context: format!("{} of {}x{} layer", context, self.width, self.height),
                        expected: cells,
                        found,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_game(&self) -> bool {
        self.role == LayerRole::Game
    }

    fn cell(&self, x: usize, y: usize) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(MapError::TileOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y * self.width + x)
    }

    pub fn get_tile(&self, x: usize, y: usize) -> Result<Tile> {
        let cell = self.cell(x, y)?;
        self.tiles.get(cell)
    }

    pub fn set_tile(&mut self, x: usize, y: usize, tile: &Tile) -> Result<()> {
        let cell = self.cell(x, y)?;
        self.tiles.set(cell, tile)
    }

    /// Copy of the region at `(x, y)` of up to `width x height` cells
    ///
    /// The origin is clamped into the layer and the extent to what remains
    /// of it, so this never fails; overlays are cut along with the tiles.
    pub fn select(&self, x: usize, y: usize, width: usize, height: usize) -> TileLayer {
        let x = x.min(self.width.saturating_sub(1));
        let y = y.min(self.height.saturating_sub(1));
        let width = width.min(self.width - x);
        let height = height.min(self.height - y);

        let mut selected = TileLayer {
            width,
            height,
            tiles: TileArray::new(),
            tele: self.tele.as_ref().map(|_| TeleArray::new()),
            speedup: self.speedup.as_ref().map(|_| SpeedupArray::new()),
            ..self.clone_settings()
        };

        for row in y..y + height {
            let start = row * self.width + x;
            let cells = start..start + width;
            selected.tiles.extend_from_range(&self.tiles, cells.clone());
            if let (Some(dst), Some(src)) = (selected.tele.as_mut(), self.tele.as_ref()) {
                dst.extend_from_range(src, cells.clone());
            }
            if let (Some(dst), Some(src)) = (selected.speedup.as_mut(), self.speedup.as_ref()) {
                dst.extend_from_range(src, cells);
            }
        }

        selected
    }

    /// Change the layer size, keeping the top-left content
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(MapError::InvalidDimensions { width, height });
        }

        let keep_w = width.min(self.width);
        let keep_h = height.min(self.height);

        let mut tiles = TileArray::with_len(width * height);
        for row in 0..keep_h {
            for col in 0..keep_w {
                tiles.set(row * width + col, &self.tiles.get(row * self.width + col)?)?;
            }
        }

        if let Some(tele) = self.tele.as_ref() {
            let mut resized = TeleArray::with_len(width * height);
            for row in 0..keep_h {
                for col in 0..keep_w {
                    resized.set(row * width + col, &tele.get(row * self.width + col)?)?;
                }
            }
            self.tele = Some(resized);
        }

        if let Some(speedup) = self.speedup.as_ref() {
            let mut resized = SpeedupArray::with_len(width * height);
            for row in 0..keep_h {
                for col in 0..keep_w {
                    resized.set(row * width + col, &speedup.get(row * self.width + col)?)?;
                }
            }
            self.speedup = Some(resized);
        }

        self.tiles = tiles;
        self.width = width;
        self.height = height;
        Ok(())
    }

    /// Everything but size and cell data
    fn clone_settings(&self) -> TileLayer {
        TileLayer {
            name: self.name.clone(),
            detail: self.detail,
            role: self.role,
            color: self.color,
            color_env: self.color_env,
            color_env_offset: self.color_env_offset,
            image: self.image,
            ..Self::blank()
        }
    }
}

/// A list of free-form textured quads
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuadLayer {
    pub name: Option<String>,
    pub detail: bool,
    pub image: Option<usize>,
    pub quads: QuadArray,
}

impl QuadLayer {
    pub fn new(name: impl Into<String>) -> Self {
        QuadLayer {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn push(&mut self, quad: Quad) {
        self.quads.push(&quad);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
    Tiles(TileLayer),
    Quads(QuadLayer),
}

impl Layer {
    pub fn name(&self) -> Option<&str> {
        match self {
            Layer::Tiles(layer) => layer.name.as_deref(),
            Layer::Quads(layer) => layer.name.as_deref(),
        }
    }

    pub fn image(&self) -> Option<usize> {
        match self {
            Layer::Tiles(layer) => layer.image,
            Layer::Quads(layer) => layer.image,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Layer::Tiles(_) => "tiles",
            Layer::Quads(_) => "quads",
        }
    }

    pub fn role(&self) -> Option<LayerRole> {
        self.as_tiles().map(|layer| layer.role)
    }

    pub fn is_game(&self) -> bool {
        self.role() == Some(LayerRole::Game)
    }

    pub fn as_tiles(&self) -> Option<&TileLayer> {
        match self {
            Layer::Tiles(layer) => Some(layer),
            Layer::Quads(_) => None,
        }
    }

    pub fn as_tiles_mut(&mut self) -> Option<&mut TileLayer> {
        match self {
            Layer::Tiles(layer) => Some(layer),
            Layer::Quads(_) => None,
        }
    }

    pub fn as_quads(&self) -> Option<&QuadLayer> {
        match self {
            Layer::Quads(layer) => Some(layer),
            Layer::Tiles(_) => None,
        }
    }

    pub fn as_quads_mut(&mut self) -> Option<&mut QuadLayer> {
        match self {
            Layer::Quads(layer) => Some(layer),
            Layer::Tiles(_) => None,
        }
    }
}

impl From<TileLayer> for Layer {
    fn from(layer: TileLayer) -> Self {
        Layer::Tiles(layer)
    }
}

impl From<QuadLayer> for Layer {
    fn from(layer: QuadLayer) -> Self {
        Layer::Quads(layer)
    }
}
