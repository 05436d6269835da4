use crate::enemy::PlayerView;
use crate::geometry::Vec2;
use crate::player::DASH_ACTIVE_THRESHOLD;
use crate::render::{RenderTarget, SpriteRef};
use crate::tilemap::Tilemap;

pub const PROJECTILE_LIFESPAN: u32 = 360;
pub const PROJECTILE_SPRITE_KEY: &str = "projectile";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectileOutcome {
    Flying,
    HitWall,
    Expired,
    HitPlayer,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub pos: Vec2,
    pub velocity_x: f32,
    age: u32,
}

impl Projectile {
    pub fn new(pos: Vec2, velocity_x: f32) -> Self {
        Self {
            pos,
            velocity_x,
            age: 0,
        }
    }

    /// Advances one tick. A player still inside the dash window is not hit; the shot flies
    /// through.
    pub fn update(&mut self, tilemap: &Tilemap, player: Option<&PlayerView>) -> ProjectileOutcome {
        self.pos.x += self.velocity_x;
        self.age += 1;

        if tilemap.is_solid_at(self.pos) {
            return ProjectileOutcome::HitWall;
        }
        if self.age > PROJECTILE_LIFESPAN {
            return ProjectileOutcome::Expired;
        }
        match player {
            Some(player)
                if player.dash_timer.abs() < DASH_ACTIVE_THRESHOLD
                    && player.rect.contains_point(self.pos) =>
            {
                ProjectileOutcome::HitPlayer
            }
            _ => ProjectileOutcome::Flying,
        }
    }

    /// Draws the sprite centered on the projectile position.
    pub fn render(&self, target: &mut dyn RenderTarget, offset: Vec2, sprite_size: Vec2) {
        let top_left = Vec2::new(
            self.pos.x - sprite_size.x * 0.5,
            self.pos.y - sprite_size.y * 0.5,
        );
        target.draw_sprite(
            SpriteRef {
                key: PROJECTILE_SPRITE_KEY,
                index: 0,
            },
            top_left - offset,
            self.velocity_x < 0.0,
        );
    }
}
