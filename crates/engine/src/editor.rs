use std::path::Path;

use tracing::{debug, info, warn};

use crate::assets::{AssetCatalog, SpriteLookup};
use crate::geometry::{Rect, Vec2};
use crate::map_file::MapError;
use crate::render::{RenderTarget, SpriteRef};
use crate::tilemap::{GridTile, OffgridTile, TileKind, Tilemap};

/// Tile groups in palette order with the number of variants each offers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    groups: Vec<(TileKind, usize)>,
    group: usize,
    variant: usize,
}

impl Palette {
    /// Groups without any sprite are left out.
    pub fn new(groups: impl IntoIterator<Item = (TileKind, usize)>) -> Self {
        Self {
            groups: groups.into_iter().filter(|(_, count)| *count > 0).collect(),
            group: 0,
            variant: 0,
        }
    }

    pub fn from_catalog(assets: &AssetCatalog) -> Self {
        Self::new(
            TileKind::ALL
                .iter()
                .map(|kind| (*kind, assets.variant_count(*kind))),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn selection(&self) -> Option<(TileKind, u32)> {
        self.groups
            .get(self.group)
            .map(|(kind, _)| (*kind, self.variant as u32))
    }

    pub fn next_group(&mut self) {
        self.step_group(1);
    }

    pub fn prev_group(&mut self) {
        self.step_group(-1);
    }

    pub fn next_variant(&mut self) {
        self.step_variant(1);
    }

    pub fn prev_variant(&mut self) {
        self.step_variant(-1);
    }

    /// Jumps straight to a `(kind, variant)` pair; false if the palette does not offer it.
    pub fn select(&mut self, kind: TileKind, variant: u32) -> bool {
        let Some(group) = self.groups.iter().position(|(k, _)| *k == kind) else {
            return false;
        };
        if variant as usize >= self.groups[group].1 {
            return false;
        }
        self.group = group;
        self.variant = variant as usize;
        true
    }

    fn step_group(&mut self, step: isize) {
        if self.groups.is_empty() {
            return;
        }
        self.group = wrap(self.group, step, self.groups.len());
        self.variant = 0;
    }

    fn step_variant(&mut self, step: isize) {
        if let Some((_, count)) = self.groups.get(self.group) {
            self.variant = wrap(self.variant, step, *count);
        }
    }
}

fn wrap(index: usize, step: isize, len: usize) -> usize {
    (index as isize + step).rem_euclid(len as isize) as usize
}

/// Map editing session: the tilemap under edit, palette, placement mode and the dirty flag.
#[derive(Debug, Clone)]
pub struct EditorState {
    tilemap: Tilemap,
    assets: AssetCatalog,
    palette: Palette,
    on_grid: bool,
    changed: bool,
}

impl EditorState {
    pub fn new(tilemap: Tilemap, assets: AssetCatalog) -> Self {
        let palette = Palette::from_catalog(&assets);
        Self::with_palette(tilemap, assets, palette)
    }

    pub fn with_palette(tilemap: Tilemap, assets: AssetCatalog, palette: Palette) -> Self {
        Self {
            tilemap,
            assets,
            palette,
            on_grid: true,
            changed: false,
        }
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    pub fn is_on_grid(&self) -> bool {
        self.on_grid
    }

    pub fn toggle_grid(&mut self) -> bool {
        self.on_grid = !self.on_grid;
        self.on_grid
    }

    pub fn set_on_grid(&mut self, on_grid: bool) {
        self.on_grid = on_grid;
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    fn sprite_size(&self, kind: TileKind, variant: u32) -> Vec2 {
        let tile = self.tilemap.tile_size() as f32;
        self.assets
            .sprite_size(kind.asset_key(), variant as usize)
            .unwrap_or(Vec2::new(tile, tile))
    }

    /// Places the palette selection at `pointer` (world pixels) in the current mode.
    pub fn place(&mut self, pointer: Vec2) -> bool {
        match self.palette.selection() {
            Some((kind, variant)) if self.on_grid => {
                self.place_on_grid(kind, variant, pointer);
                true
            }
            Some((kind, variant)) => {
                self.place_offgrid(kind, variant, pointer);
                true
            }
            None => false,
        }
    }

    /// Upserts into the cell under the pointer. Oversized sprites are centered on the pointer
    /// before snapping.
    pub fn place_on_grid(&mut self, kind: TileKind, variant: u32, pointer: Vec2) -> GridTile {
        let size = self.sprite_size(kind, variant);
        let tile = self.tilemap.tile_size() as f32;
        let target = Vec2::new(
            pointer.x - (size.x - tile).max(0.0) * 0.5,
            pointer.y - (size.y - tile).max(0.0) * 0.5,
        );
        let placed = GridTile {
            kind,
            variant,
            pos: self.tilemap.world_to_grid(target),
        };
        self.tilemap.set_grid_tile(placed);
        self.changed = true;
        debug!(kind = %kind, variant, x = placed.pos.x, y = placed.pos.y, "grid_tile_placed");
        placed
    }

    /// Appends a free tile with its sprite centered under the pointer.
    pub fn place_offgrid(&mut self, kind: TileKind, variant: u32, pointer: Vec2) -> OffgridTile {
        let size = self.sprite_size(kind, variant);
        let placed = OffgridTile {
            kind,
            variant,
            pos: Vec2::new(pointer.x - size.x * 0.5, pointer.y - size.y * 0.5),
        };
        self.tilemap.push_offgrid_tile(placed);
        self.changed = true;
        debug!(kind = %kind, variant, x = placed.pos.x, y = placed.pos.y, "offgrid_tile_placed");
        placed
    }

    /// Removes the grid tile in the pointer's cell and every free tile whose sprite covers
    /// the pointer. Returns how many tiles went away.
    pub fn remove(&mut self, pointer: Vec2) -> usize {
        let mut removed = 0;
        let cell = self.tilemap.world_to_grid(pointer);
        if self.tilemap.remove_grid_tile(cell).is_some() {
            removed += 1;
        }

        let tile_size = self.tilemap.tile_size() as f32;
        let assets = &self.assets;
        removed += self.tilemap.remove_offgrid_tiles(|tile| {
            let size = assets
                .sprite_size(tile.kind.asset_key(), tile.variant as usize)
                .unwrap_or(Vec2::new(tile_size, tile_size));
            Rect::from_origin_size(tile.pos, size).contains_point(pointer)
        });

        if removed > 0 {
            self.changed = true;
            debug!(x = pointer.x, y = pointer.y, removed, "tiles_removed");
        }
        removed
    }

    pub fn auto_tile(&mut self) -> usize {
        let updated = self.tilemap.auto_tile();
        if updated > 0 {
            self.changed = true;
        }
        info!(updated, "auto_tile_applied");
        updated
    }

    pub fn save(&mut self, path: &Path) -> Result<(), MapError> {
        self.tilemap.save(path)?;
        self.changed = false;
        Ok(())
    }

    /// Replaces the map from `path`. A missing or unreadable file leaves the current map in
    /// place; the error is logged and handed back so callers can tell the two apart.
    pub fn load_or_keep(&mut self, path: &Path) -> Result<(), MapError> {
        match self.tilemap.load(path) {
            Ok(()) => {
                self.changed = false;
                Ok(())
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "map_load_skipped");
                Err(err)
            }
        }
    }

    /// Map plus a ghost of the current selection under the pointer.
    pub fn render(&self, target: &mut dyn RenderTarget, offset: Vec2, pointer: Option<Vec2>) {
        self.tilemap.render(target, offset);
        self.tilemap.render_tile_rects(target, offset, &self.assets);

        let (Some(pointer), Some((kind, variant))) = (pointer, self.palette.selection()) else {
            return;
        };
        let sprite = SpriteRef {
            key: kind.asset_key(),
            index: variant as usize,
        };
        let pos = if self.on_grid {
            self.tilemap.grid_to_world(self.tilemap.world_to_grid(pointer))
        } else {
            let size = self.sprite_size(kind, variant);
            Vec2::new(pointer.x - size.x * 0.5, pointer.y - size.y * 0.5)
        };
        target.draw_sprite(sprite, pos - offset, false);
    }
}
