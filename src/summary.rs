//! Serializable overview of a map, used by the CLI's `inspect`

use crate::map::{Layer, LayerRole, MapInfo, Teemap};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapSummary {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub info: Option<MapInfo>,
    pub groups: Vec<GroupSummary>,
    pub images: Vec<ImageSummary>,
    pub envelopes: Vec<EnvelopeSummary>,
    pub envpoints: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub name: Option<String>,
    pub parallax: (i32, i32),
    pub offset: (i32, i32),
    pub layers: Vec<LayerSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayerSummary {
    pub name: Option<String>,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<LayerRole>,
    /// `width x height` for tile layers, quad count for quad layers
    pub size: String,
    pub image: Option<usize>,
    pub detail: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageSummary {
    pub name: String,
    pub width: i32,
    pub height: i32,
    pub external: bool,
    pub data_len: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeSummary {
    pub name: Option<String>,
    pub channels: i32,
    pub points: usize,
}

impl LayerSummary {
    fn of(layer: &Layer) -> Self {
        match layer {
            Layer::Tiles(tiles) => LayerSummary {
                name: tiles.name.clone(),
                kind: layer.kind(),
                role: Some(tiles.role),
                size: format!("{}x{}", tiles.width(), tiles.height()),
                image: tiles.image,
                detail: tiles.detail,
            },
            Layer::Quads(quads) => LayerSummary {
                name: quads.name.clone(),
                kind: layer.kind(),
                role: None,
                size: format!("{} quads", quads.quads.len()),
                image: quads.image,
                detail: quads.detail,
            },
        }
    }
}

impl MapSummary {
    pub fn of(map: &Teemap) -> Self {
        MapSummary {
            width: map.width(),
            height: map.height(),
            info: map.info.clone(),
            groups: map
                .groups
                .iter()
                .map(|group| GroupSummary {
                    name: group.name.clone(),
                    parallax: (group.parallax_x, group.parallax_y),
                    offset: (group.offset_x, group.offset_y),
                    layers: group.layers.iter().map(LayerSummary::of).collect(),
                })
                .collect(),
            images: map
                .images
                .iter()
                .map(|image| ImageSummary {
                    name: image.name.clone(),
                    width: image.width,
                    height: image.height,
                    external: image.external,
                    data_len: image.data.as_ref().map(Vec::len),
                })
                .collect(),
            envelopes: map
                .envelopes
                .iter()
                .map(|envelope| EnvelopeSummary {
                    name: envelope.name.clone(),
                    channels: envelope.channels,
                    points: envelope.num_points,
                })
                .collect(),
            envpoints: map.envpoints.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_of_default_layout() {
        let summary = Teemap::with_default_layout().summary();
        assert_eq!(summary.width, Some(50));
        assert_eq!(summary.groups.len(), 2);
        assert_eq!(summary.groups[0].layers[0].size, "1 quads");
        assert_eq!(summary.groups[1].name.as_deref(), Some("Game"));

        let game = &summary.groups[1].layers[0];
        assert_eq!(game.role, Some(LayerRole::Game));
        assert_eq!(game.size, "50x50");
    }

    #[test]
    fn test_summary_json() {
        let summary = Teemap::with_default_layout().summary();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["groups"][1]["layers"][0]["role"], "game");
        assert_eq!(json["groups"][1]["layers"][0]["kind"], "tiles");
        assert!(json["groups"][0]["layers"][0].get("role").is_none());
    }
}
