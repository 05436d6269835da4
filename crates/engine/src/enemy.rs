use std::ops::RangeInclusive;

use rand::{Rng, RngCore};

use crate::events::{SoundCue, SoundSink, SpawnRequest};
use crate::geometry::{Facing, Rect, Vec2};
use crate::physics::KinematicBody;
use crate::player::DASH_ACTIVE_THRESHOLD;
use crate::tilemap::Tilemap;

pub const ENEMY_SIZE: Vec2 = Vec2::new(8.0, 15.0);
pub const PATROL_SPEED: f32 = 0.5;
pub const PATROL_START_CHANCE: f64 = 0.01;
pub const PATROL_FRAMES: RangeInclusive<u32> = 30..=120;
pub const SHOT_VERTICAL_RANGE: f32 = 16.0;
pub const SHOT_MUZZLE_OFFSET: f32 = 7.0;
pub const PROJECTILE_SPEED: f32 = 1.5;

/// What an enemy is allowed to know about the player on a given tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerView {
    pub pos: Vec2,
    pub rect: Rect,
    pub dash_timer: i32,
}

impl PlayerView {
    pub fn is_dashing(&self) -> bool {
        self.dash_timer.abs() > DASH_ACTIVE_THRESHOLD
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyAction {
    Idle,
    Run,
}

impl EnemyAction {
    pub fn name(self) -> &'static str {
        match self {
            EnemyAction::Idle => "idle",
            EnemyAction::Run => "run",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyOutcome {
    Alive,
    Killed,
}

/// Per-tick collaborators an enemy needs besides its own body.
pub struct EnemyContext<'a> {
    pub tilemap: &'a Tilemap,
    pub player: Option<PlayerView>,
    pub rng: &'a mut dyn RngCore,
    pub sounds: &'a mut dyn SoundSink,
    pub spawns: &'a mut Vec<SpawnRequest>,
}

/// Patrol-and-shoot AI. Idle enemies occasionally start a patrol; a patrol walks until a
/// ledge or wall turns it around, and ends with a shot if the player is lined up ahead.
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyBehavior {
    walking_frames: u32,
    action: EnemyAction,
}

impl Default for EnemyBehavior {
    fn default() -> Self {
        Self {
            walking_frames: 0,
            action: EnemyAction::Idle,
        }
    }
}

impl EnemyBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn walking_frames(&self) -> u32 {
        self.walking_frames
    }

    pub fn start_patrol(&mut self, frames: u32) {
        self.walking_frames = frames;
    }

    pub fn action(&self) -> EnemyAction {
        self.action
    }

    pub fn update(
        &mut self,
        body: &mut KinematicBody,
        ctx: &mut EnemyContext<'_>,
        movement: Vec2,
    ) -> EnemyOutcome {
        let mut movement = movement;

        if self.walking_frames > 0 {
            let probe_origin = Vec2::new(body.rect().center().x, body.pos.y);
            if ctx.tilemap.solid_underfoot(probe_origin, body.facing) {
                if body.collisions().any_side() {
                    body.facing = body.facing.flipped();
                } else {
                    movement.x += PATROL_SPEED * body.facing.sign();
                }
            } else {
                body.facing = body.facing.flipped();
            }

            self.walking_frames -= 1;
            if self.walking_frames == 0 {
                if let Some(player) = ctx.player {
                    self.try_shoot(body, &player, ctx);
                }
            }
        } else if ctx.rng.random_bool(PATROL_START_CHANCE) {
            self.walking_frames = ctx.rng.random_range(PATROL_FRAMES);
        }

        body.update(ctx.tilemap, movement);

        self.action = if movement.x != 0.0 {
            EnemyAction::Run
        } else {
            EnemyAction::Idle
        };

        match ctx.player {
            Some(player) if player.is_dashing() && body.rect().overlaps(&player.rect) => {
                EnemyOutcome::Killed
            }
            _ => EnemyOutcome::Alive,
        }
    }

    fn try_shoot(&self, body: &KinematicBody, player: &PlayerView, ctx: &mut EnemyContext<'_>) {
        let offset = player.pos - body.pos;
        if offset.y.abs() >= SHOT_VERTICAL_RANGE {
            return;
        }

        let lined_up = match body.facing {
            Facing::Left => offset.x < 0.0,
            Facing::Right => offset.x > 0.0,
        };
        if !lined_up {
            return;
        }

        let center = body.rect().center();
        let sign = body.facing.sign();
        ctx.spawns.push(SpawnRequest::Projectile {
            pos: Vec2::new(center.x + SHOT_MUZZLE_OFFSET * sign, center.y),
            velocity_x: PROJECTILE_SPEED * sign,
        });
        ctx.sounds.play(SoundCue::Shoot);
    }
}
