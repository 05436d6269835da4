use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::geometry::Vec2;
use crate::tilemap::TileKind;

pub const DEFAULT_FRAME_DURATION: u32 = 5;

/// Asset keys the game loop reads every frame. Checked once before the loop starts.
pub const GAME_REQUIRED_KEYS: &[&str] = &[
    "grass",
    "stone",
    "decor",
    "large_decor",
    "player/idle",
    "player/run",
    "player/jump",
    "player/wall_slide",
    "enemy/idle",
    "enemy/run",
    "projectile",
];

/// The editor palette offers every tile group, spawners included.
pub const EDITOR_REQUIRED_KEYS: &[&str] = &["grass", "stone", "decor", "large_decor", "spawners"];

enum SpriteSource {
    File(&'static str),
    Dir(&'static str),
}

const SPRITE_GROUPS: &[(&str, SpriteSource)] = &[
    ("background", SpriteSource::File("background.png")),
    ("grass", SpriteSource::Dir("tiles/grass")),
    ("stone", SpriteSource::Dir("tiles/stone")),
    ("decor", SpriteSource::Dir("tiles/decor")),
    ("large_decor", SpriteSource::Dir("tiles/large_decor")),
    ("spawners", SpriteSource::Dir("tiles/spawners")),
    ("projectile", SpriteSource::File("projectile.png")),
];

const ANIMATIONS: &[(&str, &str, u32, bool)] = &[
    ("player/idle", "entities/player/idle", 6, true),
    ("player/run", "entities/player/run", 4, true),
    ("player/jump", "entities/player/jump", DEFAULT_FRAME_DURATION, true),
    ("player/wall_slide", "entities/player/wall_slide", DEFAULT_FRAME_DURATION, true),
    ("enemy/idle", "entities/enemy/idle", 6, true),
    ("enemy/run", "entities/enemy/run", 4, true),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteInfo {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl SpriteInfo {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationDesc {
    pub frames: Vec<SpriteInfo>,
    pub frame_duration: u32,
    pub looping: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetKeyError {
    #[error("asset key must not be empty")]
    Empty,
    #[error("asset key must not start or end with '/'")]
    DanglingSlash,
    #[error("asset key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("missing required asset key '{key}'")]
    MissingKey { key: String },
    #[error("invalid asset key '{key}': {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: AssetKeyError,
    },
    #[error("failed to list sprite directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read sprite {path}: {source}")]
    ReadImage {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("sprite group at {path} contains no png files")]
    EmptyGroup { path: PathBuf },
}

/// Size lookup for indexed sprites; the only asset fact the world core needs.
pub trait SpriteLookup {
    fn sprite_size(&self, key: &str, index: usize) -> Option<Vec2>;
}

/// Sprite metadata by key: `"<tileType>"` for indexed sprite groups and
/// `"<entityKind>/<state>"` for animations. Pixel data stays with the external renderer.
#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    sprite_groups: BTreeMap<String, Vec<SpriteInfo>>,
    animations: BTreeMap<String, AnimationDesc>,
}

impl AssetCatalog {
    /// Loads every known group and animation found under `images_root`. Missing
    /// directories are skipped here and reported by [`AssetCatalog::require`].
    pub fn load_from_dir(images_root: &Path) -> Result<Self, AssetError> {
        let mut catalog = Self::default();

        for (key, source) in SPRITE_GROUPS {
            let sprites = match source {
                SpriteSource::File(file) => {
                    let path = images_root.join(file);
                    if !path.is_file() {
                        debug!(key, path = %path.display(), "asset_source_missing");
                        continue;
                    }
                    vec![read_sprite_info(&path)?]
                }
                SpriteSource::Dir(dir) => {
                    let path = images_root.join(dir);
                    if !path.is_dir() {
                        debug!(key, path = %path.display(), "asset_source_missing");
                        continue;
                    }
                    load_sprite_dir(&path)?
                }
            };
            catalog.insert_group(key, sprites)?;
        }

        for (key, dir, frame_duration, looping) in ANIMATIONS {
            let path = images_root.join(dir);
            if !path.is_dir() {
                debug!(key, path = %path.display(), "asset_source_missing");
                continue;
            }
            catalog.insert_animation(
                key,
                AnimationDesc {
                    frames: load_sprite_dir(&path)?,
                    frame_duration: *frame_duration,
                    looping: *looping,
                },
            )?;
        }

        info!(
            root = %images_root.display(),
            sprite_groups = catalog.sprite_groups.len(),
            animations = catalog.animations.len(),
            "assets_loaded"
        );
        Ok(catalog)
    }

    pub fn insert_group(&mut self, key: &str, sprites: Vec<SpriteInfo>) -> Result<(), AssetError> {
        validate_asset_key(key).map_err(|source| AssetError::InvalidKey {
            key: key.to_string(),
            source,
        })?;
        self.sprite_groups.insert(key.to_string(), sprites);
        Ok(())
    }

    pub fn insert_animation(&mut self, key: &str, animation: AnimationDesc) -> Result<(), AssetError> {
        validate_asset_key(key).map_err(|source| AssetError::InvalidKey {
            key: key.to_string(),
            source,
        })?;
        self.animations.insert(key.to_string(), animation);
        Ok(())
    }

    pub fn group(&self, key: &str) -> Option<&[SpriteInfo]> {
        self.sprite_groups.get(key).map(Vec::as_slice)
    }

    pub fn animation(&self, key: &str) -> Option<&AnimationDesc> {
        self.animations.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.sprite_groups.contains_key(key) || self.animations.contains_key(key)
    }

    pub fn variant_count(&self, kind: TileKind) -> usize {
        self.group(kind.asset_key()).map_or(0, <[SpriteInfo]>::len)
    }

    /// Fails on the first key with no group or animation behind it.
    pub fn require(&self, keys: &[&str]) -> Result<(), AssetError> {
        match keys.iter().find(|key| !self.contains_key(key)) {
            Some(key) => Err(AssetError::MissingKey {
                key: (*key).to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl SpriteLookup for AssetCatalog {
    fn sprite_size(&self, key: &str, index: usize) -> Option<Vec2> {
        if let Some(group) = self.sprite_groups.get(key) {
            return group.get(index).map(SpriteInfo::size);
        }
        self.animations
            .get(key)
            .and_then(|animation| animation.frames.get(index))
            .map(SpriteInfo::size)
    }
}

/// Reads every png in `dir`, ordered by file name so variant indices are stable.
pub fn load_sprite_dir(dir: &Path) -> Result<Vec<SpriteInfo>, AssetError> {
    let entries = fs::read_dir(dir).map_err(|source| AssetError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| AssetError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_png = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("png"));
        if path.is_file() && is_png {
            paths.push(path);
        }
    }
    if paths.is_empty() {
        return Err(AssetError::EmptyGroup {
            path: dir.to_path_buf(),
        });
    }
    paths.sort();
    paths.iter().map(|path| read_sprite_info(path)).collect()
}

fn read_sprite_info(path: &Path) -> Result<SpriteInfo, AssetError> {
    let (width, height) = image::image_dimensions(path).map_err(|source| AssetError::ReadImage {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(SpriteInfo {
        path: path.to_path_buf(),
        width,
        height,
    })
}

fn validate_asset_key(key: &str) -> Result<(), AssetKeyError> {
    if key.is_empty() {
        return Err(AssetKeyError::Empty);
    }
    if key.starts_with('/') || key.ends_with('/') {
        return Err(AssetKeyError::DanglingSlash);
    }
    match key
        .chars()
        .find(|ch| !(ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/')))
    {
        Some(character) => Err(AssetKeyError::InvalidCharacter { character }),
        None => Ok(()),
    }
}
