//! teemap command line tool
//!
//! Inspect, validate and re-save Teeworlds maps

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Component, Path, PathBuf};
use teemap::{tiles, CompressionConfig, LoadOptions, SaveOptions, Teemap};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "teemap")]
#[command(about = "Inspect and rewrite Teeworlds map files")]
struct Args {
    /// Load maps even when the version item is missing
    #[arg(long, global = true)]
    lenient: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print an overview of groups, layers, images and envelopes
    Inspect {
        map: PathBuf,

        /// Emit pretty-printed JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the map is playable
    Validate { map: PathBuf },

    /// Load and save again, recomputing every table
    Resave {
        map: PathBuf,
        out: PathBuf,

        /// zlib level for recompressed blobs (0-9)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=9))]
        level: Option<u32>,
    },

    /// Write embedded image pixels as `<name>.rgba`
    ExtractImages { map: PathBuf, dir: PathBuf },

    /// Histogram of game layer tile indices and a pickup count
    CountTiles { map: PathBuf },
}

fn load(path: &PathBuf, lenient: bool) -> Result<Teemap> {
    let options = if lenient {
        LoadOptions::lenient()
    } else {
        LoadOptions::default()
    };
    Teemap::load_with(path, &options)
        .with_context(|| format!("Failed to load {}", path.display()))
}

fn inspect(map: &Teemap, json: bool) -> Result<()> {
    let summary = map.summary();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    match (summary.width, summary.height) {
        (Some(w), Some(h)) => println!("Size: {}x{}", w, h),
        _ => println!("Size: no game layer"),
    }
    if let Some(info) = &summary.info {
        if let Some(author) = &info.author {
            println!("Author: {}", author);
        }
        if let Some(version) = &info.map_version {
            println!("Version: {}", version);
        }
    }

    let mut layer_index = 0;
    for (index, group) in summary.groups.iter().enumerate() {
        println!(
            "Group {} {:?} parallax {:?}",
            index,
            group.name.as_deref().unwrap_or(""),
            group.parallax
        );
        for layer in &group.layers {
            let role = layer
                .role
                .map(|role| format!(" {:?}", role).to_lowercase())
                .unwrap_or_default();
            println!(
                "  Layer {} {:?} {}{} {}",
                layer_index,
                layer.name.as_deref().unwrap_or(""),
                layer.kind,
                role,
                layer.size
            );
            layer_index += 1;
        }
    }

    for (index, image) in summary.images.iter().enumerate() {
        let source = if image.external { "external" } else { "embedded" };
        println!(
            "Image {} {:?} {}x{} {}",
            index, image.name, image.width, image.height, source
        );
    }
    for (index, envelope) in summary.envelopes.iter().enumerate() {
        println!(
            "Envelope {} {:?} channels {} points {}",
            index,
            envelope.name.as_deref().unwrap_or(""),
            envelope.channels,
            envelope.points
        );
    }
    Ok(())
}

/// `name` if it is a single plain path component
fn plain_file_name(name: &str) -> Option<&str> {
    if name.contains(['/', '\\', '\0']) {
        return None;
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Some(name),
        _ => None,
    }
}

fn extract_images(map: &Teemap, dir: &PathBuf) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    let mut written = 0;
    for image in &map.images {
        let Some(data) = &image.data else {
            info!(name = %image.name, "Skipping external image");
            continue;
        };
        let Some(name) = plain_file_name(&image.name) else {
            warn!(name = %image.name, "Skipping image whose name is not a plain file name");
            continue;
        };
        let path = dir.join(format!("{}.rgba", name));
        fs::write(&path, data).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("{} ({}x{})", path.display(), image.width, image.height);
        written += 1;
    }
    info!(written, "Extracted images");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match &args.command {
        Command::Inspect { map, json } => {
            let map = load(map, args.lenient)?;
            inspect(&map, *json)?;
        }
        Command::Validate { map: path } => {
            let map = load(path, args.lenient)?;
            if let Err(err) = map.validate() {
                bail!("{} is invalid: {}", path.display(), err);
            }
            println!("{}: ok", path.display());
        }
        Command::Resave { map, out, level } => {
            let loaded = load(map, args.lenient)?;
            let compression = match level {
                Some(level) => CompressionConfig {
                    level: *level,
                    ..CompressionConfig::default()
                },
                None => CompressionConfig::default(),
            };
            let options = SaveOptions::default().with_compression(compression);
            let written = loaded
                .save_with(out, &options)
                .with_context(|| format!("Failed to save {}", out.display()))?;
            println!("{}", written.display());
        }
        Command::ExtractImages { map, dir } => {
            let map = load(map, args.lenient)?;
            extract_images(&map, dir)?;
        }
        Command::CountTiles { map: path } => {
            let map = load(path, args.lenient)?;
            if map.game_layer().is_none() {
                bail!("{} has no game layer", path.display());
            }
            for (index, count) in map.tile_histogram() {
                match tiles::name(index) {
                    Some(name) => println!("{:3} {} ({})", index, count, name),
                    None => println!("{:3} {}", index, count),
                }
            }
            println!();
            for (name, count) in map.count_pickups() {
                println!("{:>8}: {}", name, count);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_file_name() {
        assert_eq!(plain_file_name("grass_main"), Some("grass_main"));
        assert_eq!(plain_file_name("bg.v2"), Some("bg.v2"));
        assert_eq!(plain_file_name("../escaped"), None);
        assert_eq!(plain_file_name(".."), None);
        assert_eq!(plain_file_name("."), None);
        assert_eq!(plain_file_name(""), None);
        assert_eq!(plain_file_name("/etc/passwd"), None);
        assert_eq!(plain_file_name("nested/name"), None);
        assert_eq!(plain_file_name("..\\escaped"), None);
    }
}
