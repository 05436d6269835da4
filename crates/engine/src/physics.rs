use crate::geometry::{Facing, Rect, Vec2};
use crate::tilemap::Tilemap;

pub const GRAVITY: f32 = 0.1;
pub const TERMINAL_VELOCITY_Y: f32 = 5.0;

/// Which sides of the body touched a solid tile during the last update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionFlags {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl CollisionFlags {
    pub fn any_side(&self) -> bool {
        self.left || self.right
    }
}

/// Box that moves through the tile world. Behaviors steer it through `movement` and
/// `velocity`; it only knows about the tilemap's collision rects.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicBody {
    pub pos: Vec2,
    pub size: Vec2,
    pub velocity: Vec2,
    pub facing: Facing,
    pub gravity: f32,
    pub terminal_velocity_y: f32,
    collisions: CollisionFlags,
    last_movement: Vec2,
}

impl KinematicBody {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            pos,
            size,
            velocity: Vec2::ZERO,
            facing: Facing::Right,
            gravity: GRAVITY,
            terminal_velocity_y: TERMINAL_VELOCITY_Y,
            collisions: CollisionFlags::default(),
            last_movement: Vec2::ZERO,
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.pos, self.size)
    }

    pub fn collisions(&self) -> CollisionFlags {
        self.collisions
    }

    /// Displacement applied by the most recent update (movement intent plus velocity).
    pub fn last_movement(&self) -> Vec2 {
        self.last_movement
    }

    /// One tick: move on x and resolve, then on y and resolve, then apply gravity.
    ///
    /// When several tiles overlap on one axis they are resolved in the tilemap's neighbor
    /// order and the last one decides the final position.
    pub fn update(&mut self, tilemap: &Tilemap, movement: Vec2) {
        let frame_movement = movement + self.velocity;
        self.last_movement = frame_movement;
        self.collisions = CollisionFlags::default();

        if movement.x > 0.0 {
            self.facing = Facing::Right;
        } else if movement.x < 0.0 {
            self.facing = Facing::Left;
        }

        self.pos.x += frame_movement.x;
        let mut body = self.rect();
        for tile in tilemap.collision_rects_near(self.pos) {
            if !body.overlaps(&tile) {
                continue;
            }
            if frame_movement.x > 0.0 {
                body.set_right(tile.left());
                self.collisions.right = true;
            }
            if frame_movement.x < 0.0 {
                body.set_left(tile.right());
                self.collisions.left = true;
            }
            self.pos.x = body.x;
        }

        self.pos.y += frame_movement.y;
        let mut body = self.rect();
        for tile in tilemap.collision_rects_near(self.pos) {
            if !body.overlaps(&tile) {
                continue;
            }
            if frame_movement.y > 0.0 {
                body.set_bottom(tile.top());
                self.collisions.bottom = true;
            }
            if frame_movement.y < 0.0 {
                body.set_top(tile.bottom());
                self.collisions.top = true;
            }
            self.pos.y = body.y;
        }

        self.velocity.y = (self.velocity.y + self.gravity).min(self.terminal_velocity_y);

        if self.collisions.top || self.collisions.bottom {
            self.velocity.y = 0.0;
        }
    }
}
