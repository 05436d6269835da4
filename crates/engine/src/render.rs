use crate::geometry::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const GRID_TILE_OUTLINE: Rgb = Rgb(0, 0, 255);
pub const OFFGRID_TILE_OUTLINE: Rgb = Rgb(255, 255, 255);

/// Sprite reference by asset key: an indexed sprite group (`"grass"`, 3) or an animation
/// frame (`"player/run"`, 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpriteRef<'a> {
    pub key: &'a str,
    pub index: usize,
}

/// Draw surface owned by the embedding renderer. Positions are already camera-relative.
pub trait RenderTarget {
    fn begin_frame(&mut self) {}
    fn draw_sprite(&mut self, sprite: SpriteRef<'_>, screen_pos: Vec2, flip_x: bool);
    fn draw_rect_outline(&mut self, rect: Rect, color: Rgb);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Sprite {
        key: String,
        index: usize,
        screen_pos: Vec2,
        flip_x: bool,
    },
    RectOutline {
        rect: Rect,
        color: Rgb,
    },
}

/// Records draw calls in submission order. Used by headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl RenderTarget for DrawList {
    fn begin_frame(&mut self) {
        self.commands.clear();
    }

    fn draw_sprite(&mut self, sprite: SpriteRef<'_>, screen_pos: Vec2, flip_x: bool) {
        self.commands.push(DrawCommand::Sprite {
            key: sprite.key.to_string(),
            index: sprite.index,
            screen_pos,
            flip_x,
        });
    }

    fn draw_rect_outline(&mut self, rect: Rect, color: Rgb) {
        self.commands.push(DrawCommand::RectOutline { rect, color });
    }
}
