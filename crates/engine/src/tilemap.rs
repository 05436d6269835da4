use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::SpriteLookup;
use crate::geometry::{Facing, GridPos, Rect, Vec2};
use crate::render::{RenderTarget, SpriteRef, GRID_TILE_OUTLINE, OFFGRID_TILE_OUTLINE};

pub const DEFAULT_TILE_SIZE: u32 = 16;

/// Probe offset used by patrol AI to look for ground one step ahead.
pub const LEDGE_PROBE_AHEAD_PX: f32 = 7.0;
pub const LEDGE_PROBE_DOWN_PX: f32 = 23.0;

/// 3x3 neighborhood scan order. Collision resolution resolves overlaps in this order.
const NEIGHBOR_OFFSETS: [(i32, i32); 9] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (0, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

const EAST: u8 = 1 << 0;
const WEST: u8 = 1 << 1;
const NORTH: u8 = 1 << 2;
const SOUTH: u8 = 1 << 3;

const AUTO_TILE_SHIFTS: [(i32, i32, u8); 4] =
    [(1, 0, EAST), (-1, 0, WEST), (0, -1, NORTH), (0, 1, SOUTH)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Grass,
    Stone,
    Decor,
    LargeDecor,
    Spawners,
}

impl TileKind {
    pub const ALL: [TileKind; 5] = [
        TileKind::Grass,
        TileKind::Stone,
        TileKind::Decor,
        TileKind::LargeDecor,
        TileKind::Spawners,
    ];

    /// Sprite group key for this kind; also the type tag in map files.
    pub fn asset_key(self) -> &'static str {
        match self {
            TileKind::Grass => "grass",
            TileKind::Stone => "stone",
            TileKind::Decor => "decor",
            TileKind::LargeDecor => "large_decor",
            TileKind::Spawners => "spawners",
        }
    }

    pub fn from_asset_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.asset_key() == key)
    }

    pub fn is_solid(self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Stone)
    }

    pub fn is_auto_tiled(self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Stone)
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.asset_key())
    }
}

/// Grid cell packed into one integer: high 32 bits x, low 32 bits y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridKey(u64);

impl GridKey {
    pub fn from_pos(pos: GridPos) -> Self {
        Self(((pos.x as u32 as u64) << 32) | pos.y as u32 as u64)
    }

    pub fn to_pos(self) -> GridPos {
        GridPos::new((self.0 >> 32) as u32 as i32, self.0 as u32 as i32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridTile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: GridPos,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffgridTile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: Vec2,
}

/// Copy handed out by extraction queries; `pos` is always in world pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtractedTile {
    pub kind: TileKind,
    pub variant: u32,
    pub pos: Vec2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TilemapError {
    #[error("tile size must be positive, got {tile_size}")]
    InvalidTileSize { tile_size: u32 },
}

/// Sparse tile world. Most of a level is air, so grid tiles live in an ordered map keyed by
/// cell; decorative tiles that do not snap to the grid live in a plain list.
#[derive(Debug, Clone, PartialEq)]
pub struct Tilemap {
    tile_size: u32,
    grid_tiles: BTreeMap<GridKey, GridTile>,
    offgrid_tiles: Vec<OffgridTile>,
}

impl Default for Tilemap {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            grid_tiles: BTreeMap::new(),
            offgrid_tiles: Vec::new(),
        }
    }
}

impl Tilemap {
    pub fn new(tile_size: u32) -> Result<Self, TilemapError> {
        if tile_size == 0 {
            return Err(TilemapError::InvalidTileSize { tile_size });
        }
        Ok(Self {
            tile_size,
            ..Self::default()
        })
    }

    pub fn from_parts(
        tile_size: u32,
        grid_tiles: impl IntoIterator<Item = GridTile>,
        offgrid_tiles: Vec<OffgridTile>,
    ) -> Result<Self, TilemapError> {
        let mut tilemap = Self::new(tile_size)?;
        for tile in grid_tiles {
            tilemap.set_grid_tile(tile);
        }
        tilemap.offgrid_tiles = offgrid_tiles;
        Ok(tilemap)
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    fn tile_size_px(&self) -> f32 {
        self.tile_size as f32
    }

    pub fn world_to_grid(&self, pos: Vec2) -> GridPos {
        let size = self.tile_size_px();
        GridPos::new((pos.x / size).floor() as i32, (pos.y / size).floor() as i32)
    }

    pub fn grid_to_world(&self, cell: GridPos) -> Vec2 {
        let size = self.tile_size_px();
        Vec2::new(cell.x as f32 * size, cell.y as f32 * size)
    }

    pub fn cell_rect(&self, cell: GridPos) -> Rect {
        let size = self.tile_size_px();
        Rect::from_origin_size(self.grid_to_world(cell), Vec2::new(size, size))
    }

    pub fn grid_tile(&self, cell: GridPos) -> Option<&GridTile> {
        self.grid_tiles.get(&GridKey::from_pos(cell))
    }

    pub fn grid_tiles(&self) -> impl Iterator<Item = &GridTile> {
        self.grid_tiles.values()
    }

    pub fn grid_tile_count(&self) -> usize {
        self.grid_tiles.len()
    }

    pub fn offgrid_tiles(&self) -> &[OffgridTile] {
        &self.offgrid_tiles
    }

    pub fn is_empty(&self) -> bool {
        self.grid_tiles.is_empty() && self.offgrid_tiles.is_empty()
    }

    /// Upserts by the tile's own position, returning the tile it replaced.
    pub fn set_grid_tile(&mut self, tile: GridTile) -> Option<GridTile> {
        self.grid_tiles.insert(GridKey::from_pos(tile.pos), tile)
    }

    pub fn remove_grid_tile(&mut self, cell: GridPos) -> Option<GridTile> {
        self.grid_tiles.remove(&GridKey::from_pos(cell))
    }

    pub fn push_offgrid_tile(&mut self, tile: OffgridTile) {
        self.offgrid_tiles.push(tile);
    }

    /// Removes every offgrid tile matching `predicate` and returns how many were dropped.
    pub fn remove_offgrid_tiles<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&OffgridTile) -> bool,
    {
        let before = self.offgrid_tiles.len();
        self.offgrid_tiles.retain(|tile| !predicate(tile));
        before - self.offgrid_tiles.len()
    }

    pub fn neighbors_of(&self, pos: Vec2) -> Vec<GridTile> {
        let cell = self.world_to_grid(pos);
        NEIGHBOR_OFFSETS
            .iter()
            .filter_map(|&(dx, dy)| self.grid_tile(cell.offset(dx, dy)).copied())
            .collect()
    }

    pub fn collision_rects_near(&self, pos: Vec2) -> Vec<Rect> {
        self.neighbors_of(pos)
            .into_iter()
            .filter(|tile| tile.kind.is_solid())
            .map(|tile| self.cell_rect(tile.pos))
            .collect()
    }

    pub fn is_solid_at(&self, pos: Vec2) -> bool {
        self.grid_tile(self.world_to_grid(pos))
            .is_some_and(|tile| tile.kind.is_solid())
    }

    pub fn solid_underfoot(&self, pos: Vec2, facing: Facing) -> bool {
        let probe = Vec2::new(
            pos.x + LEDGE_PROBE_AHEAD_PX * facing.sign(),
            pos.y + LEDGE_PROBE_DOWN_PX,
        );
        self.is_solid_at(probe)
    }

    /// Copies of every tile whose `(kind, variant)` is listed, offgrid tiles first.
    pub fn extract_tiles(&self, wanted: &[(TileKind, u32)]) -> Vec<ExtractedTile> {
        let mut matches = self
            .offgrid_tiles
            .iter()
            .filter(|tile| is_wanted(wanted, tile.kind, tile.variant))
            .map(|tile| ExtractedTile {
                kind: tile.kind,
                variant: tile.variant,
                pos: tile.pos,
            })
            .collect::<Vec<_>>();
        matches.extend(
            self.grid_tiles
                .values()
                .filter(|tile| is_wanted(wanted, tile.kind, tile.variant))
                .map(|tile| ExtractedTile {
                    kind: tile.kind,
                    variant: tile.variant,
                    pos: self.grid_to_world(tile.pos),
                }),
        );
        matches
    }

    /// Consuming variant of [`Tilemap::extract_tiles`]: matched tiles are removed from the
    /// map. A second call with the same selection returns nothing.
    pub fn drain_matching(&mut self, wanted: &[(TileKind, u32)]) -> Vec<ExtractedTile> {
        let drained = self.extract_tiles(wanted);
        self.offgrid_tiles
            .retain(|tile| !is_wanted(wanted, tile.kind, tile.variant));
        self.grid_tiles
            .retain(|_, tile| !is_wanted(wanted, tile.kind, tile.variant));
        drained
    }

    /// Rewrites auto-tileable variants from their orthogonal same-kind neighbors. Returns
    /// the number of tiles whose variant changed.
    pub fn auto_tile(&mut self) -> usize {
        let updates = self
            .grid_tiles
            .iter()
            .filter(|(_, tile)| tile.kind.is_auto_tiled())
            .filter_map(|(key, tile)| {
                let mask = AUTO_TILE_SHIFTS
                    .iter()
                    .filter(|&&(dx, dy, _)| {
                        self.grid_tile(tile.pos.offset(dx, dy))
                            .is_some_and(|neighbor| neighbor.kind == tile.kind)
                    })
                    .fold(0u8, |mask, &(_, _, bit)| mask | bit);
                auto_tile_variant(mask)
                    .filter(|variant| *variant != tile.variant)
                    .map(|variant| (*key, variant))
            })
            .collect::<Vec<_>>();

        for (key, variant) in &updates {
            if let Some(tile) = self.grid_tiles.get_mut(key) {
                tile.variant = *variant;
            }
        }
        updates.len()
    }

    pub fn render(&self, target: &mut dyn RenderTarget, offset: Vec2) {
        for tile in &self.offgrid_tiles {
            target.draw_sprite(
                SpriteRef {
                    key: tile.kind.asset_key(),
                    index: tile.variant as usize,
                },
                tile.pos - offset,
                false,
            );
        }

        for tile in self.grid_tiles.values() {
            target.draw_sprite(
                SpriteRef {
                    key: tile.kind.asset_key(),
                    index: tile.variant as usize,
                },
                self.grid_to_world(tile.pos) - offset,
                false,
            );
        }
    }

    /// Debug overlay: outlines each tile's sprite footprint.
    pub fn render_tile_rects(
        &self,
        target: &mut dyn RenderTarget,
        offset: Vec2,
        sprites: &dyn SpriteLookup,
    ) {
        let fallback = Vec2::new(self.tile_size_px(), self.tile_size_px());
        for tile in &self.offgrid_tiles {
            let size = sprites
                .sprite_size(tile.kind.asset_key(), tile.variant as usize)
                .unwrap_or(fallback);
            target.draw_rect_outline(
                Rect::from_origin_size(tile.pos - offset, size),
                OFFGRID_TILE_OUTLINE,
            );
        }

        for tile in self.grid_tiles.values() {
            let size = sprites
                .sprite_size(tile.kind.asset_key(), tile.variant as usize)
                .unwrap_or(fallback);
            target.draw_rect_outline(
                Rect::from_origin_size(self.grid_to_world(tile.pos) - offset, size),
                GRID_TILE_OUTLINE,
            );
        }
    }
}

fn is_wanted(wanted: &[(TileKind, u32)], kind: TileKind, variant: u32) -> bool {
    wanted.iter().any(|&(k, v)| k == kind && v == variant)
}

/// Sprite variant for a set of same-kind orthogonal neighbors. Isolated tiles, vertical or
/// horizontal runs, and single-neighbor ends have no entry.
pub fn auto_tile_variant(neighbor_mask: u8) -> Option<u32> {
    match neighbor_mask {
        m if m == EAST | SOUTH => Some(0),
        m if m == EAST | SOUTH | WEST => Some(1),
        m if m == WEST | SOUTH => Some(2),
        m if m == WEST | NORTH | SOUTH => Some(3),
        m if m == WEST | NORTH => Some(4),
        m if m == WEST | NORTH | EAST => Some(5),
        m if m == EAST | NORTH => Some(6),
        m if m == EAST | NORTH | SOUTH => Some(7),
        m if m == EAST | WEST | NORTH | SOUTH => Some(8),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{DrawCommand, DrawList};

    fn grass(x: i32, y: i32) -> GridTile {
        tile(TileKind::Grass, 0, x, y)
    }

    fn tile(kind: TileKind, variant: u32, x: i32, y: i32) -> GridTile {
        GridTile {
            kind,
            variant,
            pos: GridPos::new(x, y),
        }
    }

    fn map_with(tiles: &[GridTile]) -> Tilemap {
        Tilemap::from_parts(16, tiles.iter().copied(), Vec::new()).expect("tilemap")
    }

    #[test]
    fn new_rejects_zero_tile_size() {
        assert_eq!(
            Tilemap::new(0).expect_err("err"),
            TilemapError::InvalidTileSize { tile_size: 0 }
        );
    }

    #[test]
    fn grid_world_transforms_are_inverse_including_negatives() {
        let tilemap = Tilemap::default();
        for gx in -40..40 {
            for gy in [-17, -1, 0, 1, 23] {
                let cell = GridPos::new(gx, gy);
                assert_eq!(tilemap.world_to_grid(tilemap.grid_to_world(cell)), cell);
            }
        }
    }

    #[test]
    fn world_to_grid_floors_negative_coordinates() {
        let tilemap = Tilemap::default();
        assert_eq!(tilemap.world_to_grid(Vec2::new(-0.5, -16.0)), GridPos::new(-1, -1));
        assert_eq!(tilemap.world_to_grid(Vec2::new(-16.1, 15.9)), GridPos::new(-2, 0));
        assert_eq!(tilemap.world_to_grid(Vec2::new(31.9, 32.0)), GridPos::new(1, 2));
    }

    #[test]
    fn grid_key_packs_negative_cells_losslessly() {
        for pos in [
            GridPos::new(0, 0),
            GridPos::new(-1, 5),
            GridPos::new(7, -9),
            GridPos::new(i32::MIN, i32::MAX),
        ] {
            assert_eq!(GridKey::from_pos(pos).to_pos(), pos);
        }
        assert_ne!(
            GridKey::from_pos(GridPos::new(1, 0)),
            GridKey::from_pos(GridPos::new(0, 1))
        );
    }

    #[test]
    fn placing_on_occupied_cell_overwrites() {
        let mut tilemap = map_with(&[grass(2, 3)]);
        let replaced = tilemap.set_grid_tile(tile(TileKind::Stone, 4, 2, 3));
        assert_eq!(replaced, Some(grass(2, 3)));
        assert_eq!(tilemap.grid_tile_count(), 1);
        assert_eq!(
            tilemap.grid_tile(GridPos::new(2, 3)).map(|t| t.kind),
            Some(TileKind::Stone)
        );
    }

    #[test]
    fn removing_missing_tile_is_noop() {
        let mut tilemap = map_with(&[grass(0, 0)]);
        assert_eq!(tilemap.remove_grid_tile(GridPos::new(5, 5)), None);
        assert_eq!(tilemap.remove_grid_tile(GridPos::new(0, 0)), Some(grass(0, 0)));
        assert_eq!(tilemap.remove_grid_tile(GridPos::new(0, 0)), None);
    }

    #[test]
    fn neighbors_skip_absent_cells_and_follow_scan_order() {
        let tilemap = map_with(&[grass(1, 1), grass(0, 0), grass(2, 2), grass(5, 5)]);
        let found = tilemap
            .neighbors_of(Vec2::new(20.0, 20.0))
            .into_iter()
            .map(|t| t.pos)
            .collect::<Vec<_>>();
        assert_eq!(
            found,
            vec![GridPos::new(0, 0), GridPos::new(1, 1), GridPos::new(2, 2)]
        );
    }

    #[test]
    fn collision_rects_only_include_solid_tiles() {
        let tilemap = map_with(&[
            grass(0, 1),
            tile(TileKind::Decor, 0, 1, 1),
            tile(TileKind::Stone, 1, -1, 1),
        ]);
        let rects = tilemap.collision_rects_near(Vec2::new(4.0, 4.0));
        assert_eq!(rects.len(), 2);
        assert!(rects.contains(&Rect::new(0.0, 16.0, 16.0, 16.0)));
        assert!(rects.contains(&Rect::new(-16.0, 16.0, 16.0, 16.0)));
    }

    #[test]
    fn point_and_ledge_queries() {
        let tilemap = map_with(&[grass(1, 1), tile(TileKind::Decor, 0, 2, 1)]);
        assert!(tilemap.is_solid_at(Vec2::new(16.0, 16.0)));
        assert!(tilemap.is_solid_at(Vec2::new(31.9, 31.9)));
        assert!(!tilemap.is_solid_at(Vec2::new(32.0, 16.0)));
        assert!(!tilemap.is_solid_at(Vec2::new(-1.0, 16.0)));

        // probe lands at (x +/- 7, y + 23)
        assert!(tilemap.solid_underfoot(Vec2::new(12.0, 0.0), Facing::Right));
        assert!(!tilemap.solid_underfoot(Vec2::new(12.0, 0.0), Facing::Left));
        assert!(!tilemap.solid_underfoot(Vec2::new(28.0, 0.0), Facing::Right));
    }

    #[test]
    fn extract_converts_grid_positions_and_keeps_map_intact() {
        let mut tilemap = map_with(&[tile(TileKind::Spawners, 1, 3, -2), grass(0, 0)]);
        tilemap.push_offgrid_tile(OffgridTile {
            kind: TileKind::Spawners,
            variant: 0,
            pos: Vec2::new(5.5, 7.25),
        });

        let wanted = [(TileKind::Spawners, 0), (TileKind::Spawners, 1)];
        let found = tilemap.extract_tiles(&wanted);
        assert_eq!(
            found,
            vec![
                ExtractedTile {
                    kind: TileKind::Spawners,
                    variant: 0,
                    pos: Vec2::new(5.5, 7.25),
                },
                ExtractedTile {
                    kind: TileKind::Spawners,
                    variant: 1,
                    pos: Vec2::new(48.0, -32.0),
                },
            ]
        );
        assert_eq!(tilemap.grid_tile_count(), 2);
        assert_eq!(
            tilemap.grid_tile(GridPos::new(3, -2)).map(|t| t.pos),
            Some(GridPos::new(3, -2))
        );
    }

    #[test]
    fn drain_matching_is_a_destructive_read() {
        let mut tilemap = map_with(&[tile(TileKind::Spawners, 1, 3, 0), grass(0, 0)]);
        tilemap.push_offgrid_tile(OffgridTile {
            kind: TileKind::Spawners,
            variant: 1,
            pos: Vec2::new(1.0, 1.0),
        });
        tilemap.push_offgrid_tile(OffgridTile {
            kind: TileKind::Decor,
            variant: 1,
            pos: Vec2::new(1.0, 1.0),
        });

        let first = tilemap.drain_matching(&[(TileKind::Spawners, 1)]);
        assert_eq!(first.len(), 2);
        assert_eq!(tilemap.grid_tile_count(), 1);
        assert_eq!(tilemap.offgrid_tiles().len(), 1);
        assert!(tilemap.drain_matching(&[(TileKind::Spawners, 1)]).is_empty());
    }

    #[test]
    fn auto_tile_resolves_corner_and_surrounded_tiles() {
        let mut tilemap = map_with(&[
            grass(0, 0),
            grass(1, 0),
            grass(0, 1),
            // plus shape around (5,5)
            grass(5, 5),
            grass(6, 5),
            grass(4, 5),
            grass(5, 4),
            grass(5, 6),
        ]);
        tilemap.auto_tile();
        assert_eq!(tilemap.grid_tile(GridPos::new(0, 0)).map(|t| t.variant), Some(0));
        assert_eq!(tilemap.grid_tile(GridPos::new(5, 5)).map(|t| t.variant), Some(8));
    }

    #[test]
    fn cells_at_the_i32_edge_do_not_overflow() {
        let mut tilemap = map_with(&[
            tile(TileKind::Stone, 0, i32::MAX, 0),
            tile(TileKind::Stone, 0, i32::MAX, 1),
        ]);
        assert_eq!(tilemap.auto_tile(), 0);

        let corner = tilemap.grid_to_world(GridPos::new(i32::MAX, 0));
        assert_eq!(tilemap.neighbors_of(corner).len(), 2);
        assert_eq!(
            GridPos::new(i32::MAX, 0).offset(1, 0),
            GridPos::new(i32::MIN, 0)
        );
    }

    #[test]
    fn auto_tile_leaves_unmapped_configurations_unchanged() {
        let mut tilemap = map_with(&[
            tile(TileKind::Grass, 3, 0, 0),
            tile(TileKind::Grass, 5, 0, 1),
            tile(TileKind::Grass, 7, 10, 10),
        ]);
        assert_eq!(tilemap.auto_tile(), 0);
        assert_eq!(tilemap.grid_tile(GridPos::new(0, 0)).map(|t| t.variant), Some(3));
        assert_eq!(tilemap.grid_tile(GridPos::new(0, 1)).map(|t| t.variant), Some(5));
        assert_eq!(tilemap.grid_tile(GridPos::new(10, 10)).map(|t| t.variant), Some(7));
    }

    #[test]
    fn auto_tile_only_counts_same_kind_and_skips_decor() {
        let mut tilemap = map_with(&[
            tile(TileKind::Stone, 9, 0, 0),
            tile(TileKind::Stone, 9, 1, 0),
            grass(0, 1),
            tile(TileKind::Decor, 2, 4, 4),
            tile(TileKind::Decor, 2, 5, 4),
            tile(TileKind::Decor, 2, 4, 5),
        ]);
        tilemap.auto_tile();
        // stone at (0,0) has only an east neighbor of its own kind
        assert_eq!(tilemap.grid_tile(GridPos::new(0, 0)).map(|t| t.variant), Some(9));
        assert_eq!(tilemap.grid_tile(GridPos::new(4, 4)).map(|t| t.variant), Some(2));
    }

    #[test]
    fn auto_tile_table_covers_all_nine_shapes() {
        let shapes = [
            (EAST | SOUTH, 0),
            (EAST | SOUTH | WEST, 1),
            (WEST | SOUTH, 2),
            (WEST | NORTH | SOUTH, 3),
            (WEST | NORTH, 4),
            (WEST | NORTH | EAST, 5),
            (EAST | NORTH, 6),
            (EAST | NORTH | SOUTH, 7),
            (EAST | WEST | NORTH | SOUTH, 8),
        ];
        for (mask, variant) in shapes {
            assert_eq!(auto_tile_variant(mask), Some(variant), "mask={mask:#06b}");
        }
        for mask in [0, EAST, WEST | EAST, NORTH | SOUTH, SOUTH] {
            assert_eq!(auto_tile_variant(mask), None, "mask={mask:#06b}");
        }
    }

    #[test]
    fn render_draws_offgrid_before_grid_with_camera_offset() {
        let mut tilemap = map_with(&[tile(TileKind::Stone, 2, 1, 1)]);
        tilemap.push_offgrid_tile(OffgridTile {
            kind: TileKind::LargeDecor,
            variant: 2,
            pos: Vec2::new(40.0, 8.0),
        });
        let mut draws = DrawList::default();
        tilemap.render(&mut draws, Vec2::new(10.0, 4.0));
        assert_eq!(
            draws.commands(),
            &[
                DrawCommand::Sprite {
                    key: "large_decor".to_string(),
                    index: 2,
                    screen_pos: Vec2::new(30.0, 4.0),
                    flip_x: false,
                },
                DrawCommand::Sprite {
                    key: "stone".to_string(),
                    index: 2,
                    screen_pos: Vec2::new(6.0, 12.0),
                    flip_x: false,
                },
            ]
        );
    }

    #[test]
    fn tile_kind_asset_keys_round_trip() {
        for kind in TileKind::ALL {
            assert_eq!(TileKind::from_asset_key(kind.asset_key()), Some(kind));
        }
        assert_eq!(TileKind::from_asset_key("lava"), None);
    }
}
