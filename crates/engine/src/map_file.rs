use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{ser, Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::geometry::{GridPos, Vec2};
use crate::tilemap::{GridTile, OffgridTile, TileKind, Tilemap};

#[derive(Debug, Error)]
pub enum MapError {
    #[error("map not found: {path}")]
    NotFound { path: PathBuf },
    #[error("failed to read map {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt map {path}: {message}")]
    Corrupt { path: PathBuf, message: String },
    #[error("failed to encode map {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write map {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MapError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, MapError::NotFound { .. })
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, MapError::Corrupt { .. })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct MapDocument {
    tile_size: u32,
    grid_tiles: BTreeMap<String, GridTileRecord>,
    offgrid_tiles: Vec<OffgridTileRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GridTileRecord {
    #[serde(rename = "type")]
    kind: TileKind,
    variant: u32,
    pos: GridPos,
}

#[derive(Debug, Serialize, Deserialize)]
struct OffgridTileRecord {
    #[serde(rename = "type")]
    kind: TileKind,
    variant: u32,
    pos: [f32; 2],
}

/// Map-file key for a grid cell: `"{x};{y}"`.
pub fn format_grid_key(pos: GridPos) -> String {
    format!("{};{}", pos.x, pos.y)
}

/// Accepts only the canonical form written by [`format_grid_key`].
pub fn parse_grid_key(key: &str) -> Option<GridPos> {
    let (x, y) = key.split_once(';')?;
    let pos = GridPos::new(x.parse().ok()?, y.parse().ok()?);
    (format_grid_key(pos) == key).then_some(pos)
}

impl Tilemap {
    /// Writes the map as JSON. The file is replaced atomically.
    pub fn save(&self, path: &Path) -> Result<(), MapError> {
        let text = encode_map(self).map_err(|source| MapError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        write_text_atomic(path, &text).map_err(|source| MapError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            path = %path.display(),
            grid_tiles = self.grid_tile_count(),
            offgrid_tiles = self.offgrid_tiles().len(),
            "map_saved"
        );
        Ok(())
    }

    /// Replaces this map with the one stored at `path`. On error the map is untouched.
    pub fn load(&mut self, path: &Path) -> Result<(), MapError> {
        *self = load_map(path)?;
        Ok(())
    }
}

pub fn load_map(path: &Path) -> Result<Tilemap, MapError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(source) if source.kind() == io::ErrorKind::NotFound => {
            return Err(MapError::NotFound {
                path: path.to_path_buf(),
            });
        }
        Err(source) => {
            return Err(MapError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let tilemap = decode_map(&raw).map_err(|message| MapError::Corrupt {
        path: path.to_path_buf(),
        message,
    })?;
    info!(
        path = %path.display(),
        tile_size = tilemap.tile_size(),
        grid_tiles = tilemap.grid_tile_count(),
        offgrid_tiles = tilemap.offgrid_tiles().len(),
        "map_loaded"
    );
    Ok(tilemap)
}

pub fn encode_map(tilemap: &Tilemap) -> Result<String, serde_json::Error> {
    let document = MapDocument {
        tile_size: tilemap.tile_size(),
        grid_tiles: tilemap
            .grid_tiles()
            .map(|tile| {
                (
                    format_grid_key(tile.pos),
                    GridTileRecord {
                        kind: tile.kind,
                        variant: tile.variant,
                        pos: tile.pos,
                    },
                )
            })
            .collect(),
        offgrid_tiles: tilemap
            .offgrid_tiles()
            .iter()
            .enumerate()
            .map(|(index, tile)| {
                if !(tile.pos.x.is_finite() && tile.pos.y.is_finite()) {
                    return Err(<serde_json::Error as ser::Error>::custom(format!(
                        "offgrid_tiles[{index}].pos: expected finite numbers"
                    )));
                }
                Ok(OffgridTileRecord {
                    kind: tile.kind,
                    variant: tile.variant,
                    pos: [tile.pos.x, tile.pos.y],
                })
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?,
    };
    serde_json::to_string(&document)
}

/// Parses and validates a whole document before building the map, so a bad file never
/// yields a partial map.
pub fn decode_map(raw: &str) -> Result<Tilemap, String> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let document = match serde_path_to_error::deserialize::<_, MapDocument>(&mut deserializer) {
        Ok(document) => document,
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            return if path.is_empty() || path == "." {
                Err(format!("parse map json: {source}"))
            } else {
                Err(format!("parse map json at {path}: {source}"))
            };
        }
    };

    let mut grid_tiles = Vec::with_capacity(document.grid_tiles.len());
    for (key, record) in document.grid_tiles {
        let cell = parse_grid_key(&key)
            .ok_or_else(|| format!("grid_tiles: malformed key '{key}'"))?;
        if cell != record.pos {
            return Err(format!(
                "grid_tiles.{key}: key does not match tile pos [{}, {}]",
                record.pos.x, record.pos.y
            ));
        }
        grid_tiles.push(GridTile {
            kind: record.kind,
            variant: record.variant,
            pos: record.pos,
        });
    }

    let offgrid_tiles = document
        .offgrid_tiles
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let [x, y] = record.pos;
            if !(x.is_finite() && y.is_finite()) {
                return Err(format!("offgrid_tiles[{index}].pos: expected finite numbers"));
            }
            Ok(OffgridTile {
                kind: record.kind,
                variant: record.variant,
                pos: Vec2::new(x, y),
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    Tilemap::from_parts(document.tile_size, grid_tiles, offgrid_tiles)
        .map_err(|error| format!("tile_size: {error}"))
}

fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, text)?;
    replace_file(&tmp_path, path)
}

/// Removes the old file first; `rename` will not overwrite an existing target everywhere.
fn replace_file(tmp_path: &Path, final_path: &Path) -> io::Result<()> {
    match fs::remove_file(final_path) {
        Ok(()) => {}
        Err(error) if error.kind() == io::ErrorKind::NotFound => {}
        Err(error) => {
            let _ = fs::remove_file(tmp_path);
            return Err(error);
        }
    }

    if let Err(error) = fs::rename(tmp_path, final_path) {
        let _ = fs::remove_file(tmp_path);
        return Err(error);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut tmp_name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("map.json"));
    tmp_name.push(".tmp");
    path.with_file_name(tmp_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    fn sample_map() -> Tilemap {
        let grid = [
            GridTile {
                kind: TileKind::Grass,
                variant: 1,
                pos: GridPos::new(0, 0),
            },
            GridTile {
                kind: TileKind::Stone,
                variant: 8,
                pos: GridPos::new(-4, 12),
            },
            GridTile {
                kind: TileKind::Spawners,
                variant: 0,
                pos: GridPos::new(3, -1),
            },
        ];
        let offgrid = vec![
            OffgridTile {
                kind: TileKind::LargeDecor,
                variant: 2,
                pos: Vec2::new(101.25, -7.5),
            },
            OffgridTile {
                kind: TileKind::Decor,
                variant: 0,
                pos: Vec2::new(3.0, 4.0),
            },
            OffgridTile {
                kind: TileKind::Decor,
                variant: 0,
                pos: Vec2::new(3.0, 4.0),
            },
        ];
        Tilemap::from_parts(16, grid, offgrid).expect("tilemap")
    }

    #[test]
    fn save_then_load_reproduces_the_map() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("maps").join("0.json");
        let original = sample_map();
        original.save(&path).expect("save");

        let loaded = load_map(&path).expect("load");
        assert_eq!(loaded, original);
        assert!(!dir.path().join("maps").join("0.json.tmp").exists());
    }

    #[test]
    fn document_uses_string_cell_keys() {
        let text = encode_map(&sample_map()).expect("encode");
        let value: Value = serde_json::from_str(&text).expect("json");
        assert_eq!(value["tile_size"], json!(16));
        assert_eq!(
            value["grid_tiles"]["-4;12"],
            json!({"type": "stone", "variant": 8, "pos": [-4, 12]})
        );
        assert_eq!(
            value["offgrid_tiles"][0],
            json!({"type": "large_decor", "variant": 2, "pos": [101.25, -7.5]})
        );
        assert_eq!(value["offgrid_tiles"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn loads_documents_with_integer_offgrid_positions() {
        let raw = r#"{
            "tile_size": 16,
            "grid_tiles": {"2;5": {"type": "grass", "variant": 0, "pos": [2, 5]}},
            "offgrid_tiles": [{"type": "decor", "variant": 3, "pos": [40, 72]}]
        }"#;
        let tilemap = decode_map(raw).expect("decode");
        assert_eq!(tilemap.grid_tile_count(), 1);
        assert_eq!(tilemap.offgrid_tiles()[0].pos, Vec2::new(40.0, 72.0));
    }

    #[test]
    fn missing_file_is_not_found_not_corrupt() {
        let dir = tempdir().expect("tempdir");
        let err = load_map(&dir.path().join("nope.json")).expect_err("err");
        assert!(err.is_not_found());
        assert!(!err.is_corrupt());
    }

    #[test]
    fn failed_load_leaves_current_map_untouched() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{"tile_size": 16, "grid_tiles": {}"#).expect("write");

        let mut tilemap = sample_map();
        let err = tilemap.load(&path).expect_err("err");
        assert!(err.is_corrupt());
        assert_eq!(tilemap, sample_map());
    }

    #[test]
    fn wrong_types_report_json_path() {
        let raw = r#"{
            "tile_size": 16,
            "grid_tiles": {"0;0": {"type": "grass", "variant": "one", "pos": [0, 0]}},
            "offgrid_tiles": []
        }"#;
        let message = decode_map(raw).expect_err("err");
        assert!(message.contains("grid_tiles.0;0.variant"), "message={message}");
    }

    #[test]
    fn unknown_tile_type_and_missing_keys_are_corrupt() {
        let unknown = r#"{"tile_size": 16, "grid_tiles": {}, "offgrid_tiles": [{"type": "lava", "variant": 0, "pos": [0, 0]}]}"#;
        assert!(decode_map(unknown).is_err());
        let missing = r#"{"tile_size": 16, "grid_tiles": {}}"#;
        assert!(decode_map(missing).expect_err("err").contains("offgrid_tiles"));
    }

    #[test]
    fn key_must_match_tile_position() {
        let raw = r#"{
            "tile_size": 16,
            "grid_tiles": {"1;1": {"type": "stone", "variant": 0, "pos": [1, 2]}},
            "offgrid_tiles": []
        }"#;
        let message = decode_map(raw).expect_err("err");
        assert!(message.contains("1;1"), "message={message}");
    }

    #[test]
    fn zero_tile_size_is_corrupt() {
        let raw = r#"{"tile_size": 0, "grid_tiles": {}, "offgrid_tiles": []}"#;
        assert!(decode_map(raw).expect_err("err").starts_with("tile_size"));
    }

    #[test]
    fn grid_keys_are_canonical() {
        assert_eq!(format_grid_key(GridPos::new(-3, 10)), "-3;10");
        assert_eq!(parse_grid_key("-3;10"), Some(GridPos::new(-3, 10)));
        for bad in ["03;1", "+1;2", "1,2", "1;", ";1", "1;2;3", " 1;2"] {
            assert_eq!(parse_grid_key(bad), None, "key={bad}");
        }
    }

    #[test]
    fn edge_cell_keys_load_and_auto_tile() {
        let raw = r#"{
            "tile_size": 16,
            "grid_tiles": {"2147483647;0": {"type": "grass", "variant": 4, "pos": [2147483647, 0]}},
            "offgrid_tiles": []
        }"#;
        let mut tilemap = decode_map(raw).expect("decode");
        assert_eq!(tilemap.auto_tile(), 0);
        assert_eq!(
            tilemap.grid_tile(GridPos::new(i32::MAX, 0)).map(|tile| tile.variant),
            Some(4)
        );
    }

    #[test]
    fn non_finite_offgrid_positions_are_refused_on_save() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("0.json");
        sample_map().save(&path).expect("first save");
        let before = fs::read(&path).expect("read");

        let mut tilemap = sample_map();
        tilemap.push_offgrid_tile(OffgridTile {
            kind: TileKind::Decor,
            variant: 1,
            pos: Vec2::new(f32::NAN, -3.0),
        });

        let message = encode_map(&tilemap).expect_err("nan").to_string();
        assert!(message.contains("offgrid_tiles[3].pos"), "message={message}");
        let err = tilemap.save(&path).expect_err("save");
        assert!(matches!(err, MapError::Encode { .. }));
        assert_eq!(fs::read(&path).expect("read"), before);
    }

    #[test]
    fn save_replaces_an_existing_map() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("0.json");
        Tilemap::default().save(&path).expect("first save");
        sample_map().save(&path).expect("second save");

        assert_eq!(load_map(&path).expect("load"), sample_map());
        assert!(!dir.path().join("0.json.tmp").exists());
    }

    #[test]
    fn save_errors_propagate() {
        let dir = tempdir().expect("tempdir");
        let target = dir.path().join("occupied");
        fs::create_dir_all(target.join("child")).expect("mkdir");

        let err = sample_map().save(&target).expect_err("err");
        assert!(matches!(err, MapError::Write { .. }));
    }
}
