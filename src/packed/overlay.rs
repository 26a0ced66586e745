//! Per-cell data of the race-mod tele and speedup layers

use super::PackedRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TeleTile {
    /// Teleporter pairing number
    pub number: u8,
    /// Game tile index of the tele entity
    pub tile_type: u8,
}

impl PackedRecord for TeleTile {
    const WIDTH: usize = 2;

    fn decode(bytes: &[u8]) -> Self {
        TeleTile {
            number: bytes[0],
            tile_type: bytes[1],
        }
    }

    fn encode(&self, out: &mut [u8]) {
        out[0] = self.number;
        out[1] = self.tile_type;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SpeedupTile {
    pub force: u8,
    pub tile_type: u8,
    /// Degrees, stored as a little-endian i16
    pub angle: i16,
}

impl PackedRecord for SpeedupTile {
    const WIDTH: usize = 4;

    fn decode(bytes: &[u8]) -> Self {
        SpeedupTile {
            force: bytes[0],
            tile_type: bytes[1],
            angle: i16::from_le_bytes([bytes[2], bytes[3]]),
        }
    }

    fn encode(&self, out: &mut [u8]) {
        out[0] = self.force;
        out[1] = self.tile_type;
        out[2..4].copy_from_slice(&self.angle.to_le_bytes());
    }
}
