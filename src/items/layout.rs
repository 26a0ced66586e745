//! Versioned field positions
//!
//! Optional trailing fields moved between item versions. Every such field
//! is described once here: where it sits in the current layout, from which
//! item version on, and where (if anywhere) older versions kept it.

/// Location of an optional field inside an item payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSlot {
    /// First item version using the `current` position
    pub current_since: i32,
    /// Int offset in the current layout
    pub current: usize,
    /// Int offset for versions before `current_since`, if the field existed
    pub legacy: Option<usize>,
    /// Field width in ints
    pub len: usize,
}

impl FieldSlot {
    const fn new(current_since: i32, current: usize, legacy: Option<usize>, len: usize) -> Self {
        FieldSlot {
            current_since,
            current,
            legacy,
            len,
        }
    }

    /// Int offset of the field for an item of `version`
    pub fn locate(&self, version: i32) -> Option<usize> {
        if version >= self.current_since {
            Some(self.current)
        } else {
            self.legacy
        }
    }

    /// The whole field, or `None` when absent or cut short
    pub fn read<'p>(&self, payload: &'p [i32], version: i32) -> Option<&'p [i32]> {
        let start = self.locate(version)?;
        payload.get(start..start + self.len)
    }

    /// Whatever part of the field the payload holds, possibly empty
    pub fn read_partial<'p>(&self, payload: &'p [i32], version: i32) -> &'p [i32] {
        match self.locate(version) {
            Some(start) if start < payload.len() => {
                &payload[start..payload.len().min(start + self.len)]
            }
            _ => &[],
        }
    }

    /// Single-int field
    pub fn read_int(&self, payload: &[i32], version: i32) -> Option<i32> {
        self.read(payload, version).map(|field| field[0])
    }
}

/// Fixed prefix length of each item kind, in ints
pub mod base_len {
    pub const VERSION: usize = 1;
    /// Settings joined the info item later and are optional
    pub const INFO: usize = 5;
    pub const IMAGE: usize = 6;
    pub const ENVELOPE: usize = 4;
    pub const GROUP: usize = 7;
    /// `version, type, flags` shared by every layer
    pub const LAYER: usize = 3;
    pub const TILEMAP: usize = 15;
    pub const QUADS: usize = 7;
    pub const ENVPOINT: usize = 6;
}

pub const INFO_SETTINGS: FieldSlot = FieldSlot::new(0, 5, None, 1);

/// `use_clipping, clip_x, clip_y, clip_w, clip_h`
pub const GROUP_CLIPPING: FieldSlot = FieldSlot::new(2, 7, None, 5);
pub const GROUP_NAME: FieldSlot = FieldSlot::new(3, 12, None, 3);

pub const TILEMAP_NAME: FieldSlot = FieldSlot::new(3, 15, None, 3);
pub const TILEMAP_TELE: FieldSlot = FieldSlot::new(3, 18, Some(15), 1);
pub const TILEMAP_SPEEDUP: FieldSlot = FieldSlot::new(3, 19, Some(16), 1);

pub const QUADS_NAME: FieldSlot = FieldSlot::new(2, 7, None, 3);

pub const ENVELOPE_NAME: FieldSlot = FieldSlot::new(0, 4, None, 8);

/// Versions written on save
pub mod current {
    pub const MAP: i32 = 1;
    pub const INFO: i32 = 1;
    pub const IMAGE: i32 = 1;
    pub const ENVELOPE: i32 = 1;
    pub const GROUP: i32 = 3;
    pub const LAYER: i32 = 1;
    pub const TILEMAP: i32 = 3;
    pub const QUADS: i32 = 2;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_requires_version() {
        let payload: Vec<i32> = (0..18).collect();
        assert_eq!(TILEMAP_NAME.read(&payload, 3), Some(&payload[15..18]));
        assert_eq!(TILEMAP_NAME.read(&payload, 2), None);
        assert_eq!(GROUP_NAME.read(&payload, 2), None);
        assert_eq!(QUADS_NAME.read(&payload, 2), Some(&payload[7..10]));
        assert_eq!(QUADS_NAME.read(&payload, 1), None);
    }

    #[test]
    fn test_overlay_positions_shift() {
        let payload: Vec<i32> = (0..20).collect();
        assert_eq!(TILEMAP_TELE.read_int(&payload, 3), Some(18));
        assert_eq!(TILEMAP_SPEEDUP.read_int(&payload, 3), Some(19));
        assert_eq!(TILEMAP_TELE.read_int(&payload, 2), Some(15));
        assert_eq!(TILEMAP_SPEEDUP.read_int(&payload, 2), Some(16));
    }

    #[test]
    fn test_missing_trailing_fields() {
        let payload: Vec<i32> = (0..18).collect();
        assert_eq!(TILEMAP_TELE.read_int(&payload, 3), None);

        let short = [1, 2, 0, 4, 7, 7];
        assert_eq!(ENVELOPE_NAME.read_partial(&short, 1), &[7, 7]);
        assert!(ENVELOPE_NAME.read_partial(&short[..4], 1).is_empty());
    }
}
