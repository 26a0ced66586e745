use super::PackedRecord;

/// Orientation flag bits of a [`Tile`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileFlags(u8);

impl TileFlags {
    pub const VFLIP: u8 = 1;
    pub const HFLIP: u8 = 2;
    /// Set by the editor for fully opaque tiles; never read here
    pub const OPAQUE: u8 = 4;
    pub const ROTATE: u8 = 8;

    pub fn from_bits(bits: u8) -> Self {
        TileFlags(bits)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn contains(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    pub fn set(&mut self, bit: u8, value: bool) {
        if value {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }

    pub fn toggle(&mut self, bit: u8) {
        self.0 ^= bit;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    /// Clockwise quarter turn
    Right,
    /// Counter-clockwise quarter turn
    Left,
}

/// One cell of a tile layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Tile {
    /// Index into the 16x16 tileset grid
    pub index: u8,
    pub flags: TileFlags,
    pub skip: u8,
    pub reserved: u8,
}

impl Tile {
    pub fn new(index: u8) -> Self {
        Tile {
            index,
            ..Default::default()
        }
    }

    /// Column and row of the tile in its tileset image
    pub fn coords(&self) -> (u8, u8) {
        (self.index % 16, self.index / 16)
    }

    pub fn is_empty(&self) -> bool {
        self.index == 0
    }

    pub fn vflipped(&self) -> bool {
        self.flags.contains(TileFlags::VFLIP)
    }

    pub fn hflipped(&self) -> bool {
        self.flags.contains(TileFlags::HFLIP)
    }

    pub fn rotated(&self) -> bool {
        self.flags.contains(TileFlags::ROTATE)
    }

    /// Mirror on the vertical axis as seen on screen
    ///
    /// A rotated tile swaps the meaning of the two flip bits.
    pub fn vflip(&mut self) {
        if self.rotated() {
            self.flags.toggle(TileFlags::HFLIP);
        } else {
            self.flags.toggle(TileFlags::VFLIP);
        }
    }

    /// Mirror on the horizontal axis as seen on screen
    pub fn hflip(&mut self) {
        if self.rotated() {
            self.flags.toggle(TileFlags::VFLIP);
        } else {
            self.flags.toggle(TileFlags::HFLIP);
        }
    }

    /// Quarter turn; four turns in one direction are the identity
    pub fn rotate(&mut self, direction: Rotation) {
        if self.rotated() {
            self.flags.toggle(TileFlags::HFLIP);
            self.flags.toggle(TileFlags::VFLIP);
        }
        self.flags.toggle(TileFlags::ROTATE);

        if direction == Rotation::Left {
            self.vflip();
            self.hflip();
        }
    }
}

impl PackedRecord for Tile {
    const WIDTH: usize = 4;

    fn decode(bytes: &[u8]) -> Self {
        Tile {
            index: bytes[0],
            flags: TileFlags(bytes[1]),
            skip: bytes[2],
            reserved: bytes[3],
        }
    }

    fn encode(&self, out: &mut [u8]) {
        out[0] = self.index;
        out[1] = self.flags.0;
        out[2] = self.skip;
        out[3] = self.reserved;
    }
}
