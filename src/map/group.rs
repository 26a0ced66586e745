use super::layer::Layer;

/// A set of layers sharing offset, parallax and clipping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub name: Option<String>,
    pub offset_x: i32,
    pub offset_y: i32,
    /// Percent; 100 scrolls with the camera
    pub parallax_x: i32,
    pub parallax_y: i32,
    pub use_clipping: bool,
    pub clip_x: i32,
    pub clip_y: i32,
    pub clip_w: i32,
    pub clip_h: i32,
    pub layers: Vec<Layer>,
}

impl Default for Group {
    fn default() -> Self {
        Group {
            name: None,
            offset_x: 0,
            offset_y: 0,
            parallax_x: 100,
            parallax_y: 100,
            use_clipping: false,
            clip_x: 0,
            clip_y: 0,
            clip_w: 0,
            clip_h: 0,
            layers: Vec::new(),
        }
    }
}

impl Group {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Group {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Append a layer and return its index within the group
    pub fn add_layer(&mut self, layer: impl Into<Layer>) -> usize {
        self.layers.push(layer.into());
        self.layers.len() - 1
    }
}
