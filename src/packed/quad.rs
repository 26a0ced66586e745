use super::PackedRecord;

/// Fixed-point position (22.10 for world points, 1024 = 1.0 for texcoords)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: i32,
    pub g: i32,
    pub b: i32,
    pub a: i32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// A textured quad: four corners plus a pivot
///
/// `points[4]` is the pivot used for position envelopes. Envelope indices
/// of -1 disable animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quad {
    pub points: [Point; 5],
    pub colors: [Color; 4],
    pub texcoords: [Point; 4],
    pub pos_env: i32,
    pub pos_env_offset: i32,
    pub color_env: i32,
    pub color_env_offset: i32,
}

const QUAD_INTS: usize = 38;

impl Default for Quad {
    fn default() -> Self {
        Quad {
            points: [Point::default(); 5],
            colors: [Color::WHITE; 4],
            texcoords: [
                Point::new(0, 0),
                Point::new(1 << 10, 0),
                Point::new(0, 1 << 10),
                Point::new(1 << 10, 1 << 10),
            ],
            pos_env: -1,
            pos_env_offset: 0,
            color_env: -1,
            color_env_offset: 0,
        }
    }
}

impl Quad {
    /// Axis-aligned quad covering `(x, y)..(x + w, y + h)` with a centered pivot
    pub fn rect(x: i32, y: i32, w: i32, h: i32) -> Self {
        Quad {
            points: [
                Point::new(x, y),
                Point::new(x + w, y),
                Point::new(x, y + h),
                Point::new(x + w, y + h),
                Point::new(x + w / 2, y + h / 2),
            ],
            ..Default::default()
        }
    }

    fn to_ints(self) -> [i32; QUAD_INTS] {
        let mut ints = [0i32; QUAD_INTS];
        let mut at = 0;
        for point in &self.points {
            ints[at] = point.x;
            ints[at + 1] = point.y;
            at += 2;
        }
        for color in &self.colors {
            ints[at..at + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
            at += 4;
        }
        for texcoord in &self.texcoords {
            ints[at] = texcoord.x;
            ints[at + 1] = texcoord.y;
            at += 2;
        }
        ints[at..].copy_from_slice(&[
            self.pos_env,
            self.pos_env_offset,
            self.color_env,
            self.color_env_offset,
        ]);
        ints
    }

    fn from_ints(ints: &[i32]) -> Self {
        let point = |i: usize| Point::new(ints[i], ints[i + 1]);
        let color = |i: usize| Color {
            r: ints[i],
            g: ints[i + 1],
            b: ints[i + 2],
            a: ints[i + 3],
        };
        Quad {
            points: [point(0), point(2), point(4), point(6), point(8)],
            colors: [color(10), color(14), color(18), color(22)],
            texcoords: [point(26), point(28), point(30), point(32)],
            pos_env: ints[34],
            pos_env_offset: ints[35],
            color_env: ints[36],
            color_env_offset: ints[37],
        }
    }
}

impl PackedRecord for Quad {
    const WIDTH: usize = QUAD_INTS * 4;

    fn decode(bytes: &[u8]) -> Self {
        let ints: Vec<i32> = bytes
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Quad::from_ints(&ints)
    }

    fn encode(&self, out: &mut [u8]) {
        for (chunk, value) in out.chunks_exact_mut(4).zip(self.to_ints()) {
            chunk.copy_from_slice(&value.to_le_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width() {
        assert_eq!(Quad::WIDTH, 152);
    }

    #[test]
    fn test_default_is_unit_quad() {
        let quad = Quad::default();
        assert_eq!(quad.colors, [Color::WHITE; 4]);
        assert_eq!(quad.texcoords[3], Point::new(1024, 1024));
        assert_eq!(quad.pos_env, -1);
        assert_eq!(quad.color_env, -1);
    }

    #[test]
    fn test_field_order() {
        let mut quad = Quad::rect(-32, -32, 64, 64);
        quad.colors[1].g = 7;
        quad.color_env = 2;

        let mut buf = [0u8; 152];
        quad.encode(&mut buf);
        let int_at = |i: usize| {
            i32::from_le_bytes([buf[i * 4], buf[i * 4 + 1], buf[i * 4 + 2], buf[i * 4 + 3]])
        };

        assert_eq!(int_at(0), -32);
        assert_eq!((int_at(8), int_at(9)), (0, 0));
        assert_eq!(int_at(15), 7);
        assert_eq!(int_at(28), 1024);
        assert_eq!(int_at(34), -1);
        assert_eq!(int_at(36), 2);
        assert_eq!(Quad::decode(&buf), quad);
    }
}
