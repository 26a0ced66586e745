//! End-to-end runs of the teemap binary

mod common;

use std::path::Path;
use std::process::Output;
use teemap::{tiles, Image, Teemap, Tile};

fn run(args: &[&Path]) -> Output {
    std::process::Command::new(env!("CARGO_BIN_EXE_teemap"))
        .args(args)
        .output()
        .expect("Failed to run teemap")
}

#[test]
fn test_extract_images_stays_inside_target() {
    let dir = tempfile::tempdir().unwrap();
    let map_path = dir.path().join("escape.map");
    let out_dir = dir.path().join("out");

    let mut map = common::vanilla();
    map.add_image(Image::embedded("../escaped", 2, 2, vec![0xCD; 16]));
    map.save(&map_path).unwrap();

    let output = run(&[
        Path::new("extract-images"),
        map_path.as_path(),
        out_dir.as_path(),
    ]);
    assert!(output.status.success(), "extract-images failed: {:?}", output);

    assert!(out_dir.join("test.rgba").exists());
    assert_eq!(std::fs::read(out_dir.join("test.rgba")).unwrap(), vec![0xAB; 16]);
    assert!(!dir.path().join("escaped.rgba").exists());
    assert_eq!(std::fs::read_dir(&out_dir).unwrap().count(), 1);
}

#[test]
fn test_count_tiles_labels_pickups() {
    let dir = tempfile::tempdir().unwrap();
    let map_path = dir.path().join("pickups.map");

    let mut map = common::vanilla();
    let game = map.game_layer_mut().unwrap();
    game.set_tile(2, 2, &Tile::new(tiles::SHOTGUN)).unwrap();
    game.set_tile(3, 2, &Tile::new(tiles::SHOTGUN)).unwrap();
    game.set_tile(4, 2, &Tile::new(tiles::ARMOR)).unwrap();
    map.save(&map_path).unwrap();

    let output = run(&[Path::new("count-tiles"), map_path.as_path()]);
    assert!(output.status.success(), "count-tiles failed: {:?}", output);
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.lines().any(|line| line.trim_start() == "shotgun: 2"), "{}", stdout);
    assert!(stdout.lines().any(|line| line.trim_start() == "armor: 1"), "{}", stdout);
    assert!(stdout.lines().any(|line| line.trim_start() == "ninja: 0"), "{}", stdout);
}

#[test]
fn test_validate_reports_invalid_map() {
    let dir = tempfile::tempdir().unwrap();
    let map_path = dir.path().join("no_game.map");
    Teemap::new().save(&map_path).unwrap();

    let output = run(&[Path::new("validate"), map_path.as_path()]);
    assert!(!output.status.success());
}
