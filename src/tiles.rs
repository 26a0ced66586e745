//! Game layer tile indices
//!
//! Indices 0 to 3 are collision, entities start after `ENTITY_OFFSET`.

pub const AIR: u8 = 0;
pub const SOLID: u8 = 1;
pub const DEATH: u8 = 2;
pub const NOHOOK: u8 = 3;

pub const ENTITY_OFFSET: u8 = 255 - 16 * 4;

pub const SPAWN: u8 = ENTITY_OFFSET + 1;
pub const SPAWN_RED: u8 = ENTITY_OFFSET + 2;
pub const SPAWN_BLUE: u8 = ENTITY_OFFSET + 3;
pub const FLAGSTAND_RED: u8 = ENTITY_OFFSET + 4;
pub const FLAGSTAND_BLUE: u8 = ENTITY_OFFSET + 5;
pub const ARMOR: u8 = ENTITY_OFFSET + 6;
pub const HEALTH: u8 = ENTITY_OFFSET + 7;
pub const SHOTGUN: u8 = ENTITY_OFFSET + 8;
pub const GRENADE: u8 = ENTITY_OFFSET + 9;
pub const NINJA: u8 = ENTITY_OFFSET + 10;
pub const RIFLE: u8 = ENTITY_OFFSET + 11;

/// Pickups a player can collect, in the order they are usually listed
pub const PICKUPS: [(&str, u8); 6] = [
    ("shotgun", SHOTGUN),
    ("grenade", GRENADE),
    ("rifle", RIFLE),
    ("ninja", NINJA),
    ("health", HEALTH),
    ("armor", ARMOR),
];

/// Name of a known game layer index
pub fn name(index: u8) -> Option<&'static str> {
    let name = match index {
        AIR => "air",
        SOLID => "solid",
        DEATH => "death",
        NOHOOK => "nohook",
        SPAWN => "spawn",
        SPAWN_RED => "spawn_red",
        SPAWN_BLUE => "spawn_blue",
        FLAGSTAND_RED => "flagstand_red",
        FLAGSTAND_BLUE => "flagstand_blue",
        ARMOR => "armor",
        HEALTH => "health",
        SHOTGUN => "shotgun",
        GRENADE => "grenade",
        NINJA => "ninja",
        RIFLE => "rifle",
        _ => return None,
    };
    Some(name)
}
