//! Shared fixtures for integration tests

#![allow(dead_code)]

use teemap::{
    Envpoint, Group, Image, LayerRole, MapInfo, Quad, QuadLayer, Teemap, Tile, TileFlags,
    TileLayer,
};

/// Flag bytes of the first six tiles of the "TestTiles" layer
pub const TEST_TILE_FLAGS: [u8; 6] = [
    TileFlags::HFLIP,
    TileFlags::VFLIP,
    TileFlags::HFLIP | TileFlags::VFLIP,
    TileFlags::ROTATE | TileFlags::HFLIP | TileFlags::VFLIP,
    TileFlags::ROTATE,
    0,
];

fn points(count: i32, step: i32) -> Vec<Envpoint> {
    (0..count)
        .map(|i| Envpoint {
            time: i * step,
            curve_type: 1,
            values: [i << 10, -(i << 10), 0, 1024],
        })
        .collect()
}

fn test_tiles() -> TileLayer {
    let mut layer = TileLayer::new(5, 3).unwrap();
    layer.name = Some("TestTiles".to_string());
    layer.image = Some(0);

    // Indices 0..4 on the first row, 251..255 on the last
    for x in 0..5 {
        let mut tile = Tile::new(x as u8);
        tile.flags = TileFlags::from_bits(TEST_TILE_FLAGS.get(x).copied().unwrap_or(0));
        layer.set_tile(x, 0, &tile).unwrap();
        layer.set_tile(x, 2, &Tile::new(251 + x as u8)).unwrap();
    }
    let mut sixth = layer.get_tile(0, 1).unwrap();
    sixth.flags = TileFlags::from_bits(TEST_TILE_FLAGS[5]);
    layer.set_tile(0, 1, &sixth).unwrap();
    layer
}

/// The reference map used across integration tests
///
/// Seven groups holding `[1, 2, 1, 0, 2, 0, 0]` layers, two envelopes
/// over nine envpoints, three images and a 20x15 game layer.
pub fn vanilla() -> Teemap {
    let mut map = Teemap::new();
    map.info = Some(MapInfo {
        author: Some("teemap".to_string()),
        map_version: Some("1.0".to_string()),
        credits: None,
        license: Some("CC0".to_string()),
        settings: vec!["sv_gametype ctf".to_string(), "sv_scorelimit 400".to_string()],
    });

    map.add_image(Image::external("grass_main", 1024, 1024));
    map.add_image(Image::embedded("test", 2, 2, vec![0xAB; 2 * 2 * 4]));
    map.add_image(Image::external("generic_unhookable", 1024, 1024));

    map.add_envelope(Some("PosEnv".to_string()), 3, points(4, 500));
    map.add_envelope(Some("ColorEnv".to_string()), 4, points(5, 250));

    // Group 0: one quad layer
    let mut background = Group::new();
    background.parallax_x = 0;
    background.parallax_y = 0;
    let mut test_quads = QuadLayer::new("TestQuads");
    test_quads.image = Some(1);
    test_quads.push(Quad::rect(-512, -512, 1024, 1024));
    let mut moving = Quad::rect(0, 0, 64, 64);
    moving.pos_env = 0;
    moving.color_env = 1;
    test_quads.push(moving);
    background.add_layer(test_quads);
    map.add_group(background);

    // Group 1: quads then tiles
    let mut scenery = Group::new();
    scenery.offset_x = 32;
    scenery.parallax_x = 50;
    scenery.add_layer(QuadLayer::new("Quads"));
    scenery.add_layer(test_tiles());
    map.add_group(scenery);

    // Group 2: the game layer
    let mut game = Group::named("Game");
    let mut game_layer = TileLayer::game(20, 15).unwrap();
    for x in 0..20 {
        game_layer.set_tile(x, 14, &Tile::new(1)).unwrap();
    }
    game.add_layer(game_layer);
    map.add_group(game);

    map.add_group(Group::named("NamedGroup"));

    // Group 4: an unnamed layer then "LastTiles"
    let mut front = Group::new();
    front.use_clipping = true;
    front.clip_w = 640;
    front.clip_h = 480;
    let mut unnamed = TileLayer::new(4, 4).unwrap();
    unnamed.image = Some(2);
    unnamed.detail = true;
    front.add_layer(unnamed);
    let mut last = TileLayer::new(3, 3).unwrap();
    last.name = Some("LastTiles".to_string());
    last.color.a = 128;
    last.color_env = 1;
    front.add_layer(last);
    map.add_group(front);

    map.add_group(Group::new());
    map.add_group(Group::named("OtherGroup"));

    map
}

/// `vanilla` plus a tele and a speedup layer in the game group
pub fn race() -> Teemap {
    let mut map = vanilla();
    let game = &mut map.groups[2];

    let mut tele = TileLayer::with_role(20, 15, LayerRole::Tele).unwrap();
    tele.name = Some("Tele".to_string());
    if let Some(overlay) = tele.tele.as_mut() {
        overlay
            .set(
                3,
                &teemap::TeleTile {
                    number: 1,
                    tile_type: 26,
                },
            )
            .unwrap();
    }
    game.add_layer(tele);

    let mut speedup = TileLayer::with_role(20, 15, LayerRole::Speedup).unwrap();
    speedup.name = Some("Speedup".to_string());
    if let Some(overlay) = speedup.speedup.as_mut() {
        overlay
            .set(
                7,
                &teemap::SpeedupTile {
                    force: 30,
                    tile_type: 28,
                    angle: -90,
                },
            )
            .unwrap();
    }
    game.add_layer(speedup);

    map
}
