use crate::events::{SoundCue, SoundSink};
use crate::geometry::{Facing, Vec2};
use crate::physics::KinematicBody;
use crate::tilemap::Tilemap;

pub const PLAYER_SIZE: Vec2 = Vec2::new(8.0, 15.0);
pub const MAX_JUMPS: u32 = 2;
pub const JUMP_VELOCITY: f32 = -3.0;
pub const WALL_KICK_VELOCITY: Vec2 = Vec2::new(3.5, -2.5);
pub const WALL_KICK_AIRBORNE_FRAMES: u32 = 5;
pub const WALL_SLIDE_MIN_AIRBORNE: u32 = 4;
pub const WALL_SLIDE_MAX_FALL: f32 = 0.5;
pub const DASH_FRAMES: i32 = 60;
pub const DASH_ACTIVE_THRESHOLD: i32 = 50;
pub const DASH_SPEED: f32 = 8.0;
pub const DASH_END_FACTOR: f32 = 0.1;
pub const FRICTION: f32 = 0.1;
pub const FATAL_AIRBORNE_FRAMES: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    Idle,
    Run,
    Jump,
    WallSlide,
}

impl PlayerAction {
    pub fn name(self) -> &'static str {
        match self {
            PlayerAction::Idle => "idle",
            PlayerAction::Run => "run",
            PlayerAction::Jump => "jump",
            PlayerAction::WallSlide => "wall_slide",
        }
    }
}

/// Player-specific state layered on top of a [`KinematicBody`].
///
/// `dash_timer` is signed: its sign is the dash direction and its magnitude counts down from
/// [`DASH_FRAMES`]. The dash is "active" (lethal to enemies, immune to projectiles) while the
/// magnitude is above [`DASH_ACTIVE_THRESHOLD`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerBehavior {
    airborne_frames: u32,
    jumps: u32,
    dash_timer: i32,
    wall_slide: bool,
    action: PlayerAction,
}

impl Default for PlayerBehavior {
    fn default() -> Self {
        Self {
            airborne_frames: 0,
            jumps: MAX_JUMPS,
            dash_timer: 0,
            wall_slide: false,
            action: PlayerAction::Idle,
        }
    }
}

impl PlayerBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn airborne_frames(&self) -> u32 {
        self.airborne_frames
    }

    pub fn jumps(&self) -> u32 {
        self.jumps
    }

    pub fn dash_timer(&self) -> i32 {
        self.dash_timer
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_timer.abs() > DASH_ACTIVE_THRESHOLD
    }

    pub fn is_wall_sliding(&self) -> bool {
        self.wall_slide
    }

    pub fn action(&self) -> PlayerAction {
        self.action
    }

    pub fn has_fallen_out(&self) -> bool {
        self.airborne_frames > FATAL_AIRBORNE_FRAMES
    }

    pub fn update(&mut self, body: &mut KinematicBody, tilemap: &Tilemap, movement: Vec2) {
        body.update(tilemap, movement);
        let collisions = body.collisions();

        self.airborne_frames = self.airborne_frames.saturating_add(1);
        if collisions.bottom {
            self.airborne_frames = 0;
            self.jumps = MAX_JUMPS;
        }

        self.wall_slide = false;
        if collisions.any_side() && self.airborne_frames > WALL_SLIDE_MIN_AIRBORNE {
            self.wall_slide = true;
            body.velocity.y = body.velocity.y.min(WALL_SLIDE_MAX_FALL);
            body.facing = if collisions.right {
                Facing::Right
            } else {
                Facing::Left
            };
        }

        self.action = if self.wall_slide {
            PlayerAction::WallSlide
        } else if self.airborne_frames > WALL_SLIDE_MIN_AIRBORNE {
            PlayerAction::Jump
        } else if movement.x != 0.0 {
            PlayerAction::Run
        } else {
            PlayerAction::Idle
        };

        self.dash_timer -= self.dash_timer.signum();
        if self.dash_timer.abs() > DASH_ACTIVE_THRESHOLD {
            body.velocity.x = self.dash_timer.signum() as f32 * DASH_SPEED;
            if self.dash_timer.abs() == DASH_ACTIVE_THRESHOLD + 1 {
                body.velocity.x *= DASH_END_FACTOR;
            }
        }

        body.velocity.x = if body.velocity.x > 0.0 {
            (body.velocity.x - FRICTION).max(0.0)
        } else {
            (body.velocity.x + FRICTION).min(0.0)
        };
    }

    /// Wall kick while sliding and pushing into the wall, otherwise a vertical jump.
    /// Both consume one charge; with no charges left nothing happens.
    pub fn jump(&mut self, body: &mut KinematicBody, sounds: &mut dyn SoundSink) -> bool {
        if self.jumps == 0 {
            return false;
        }

        let pushing = body.last_movement().x;
        if self.wall_slide && body.facing.is_left() && pushing < 0.0 {
            body.velocity = WALL_KICK_VELOCITY;
            self.airborne_frames = WALL_KICK_AIRBORNE_FRAMES;
        } else if self.wall_slide && !body.facing.is_left() && pushing > 0.0 {
            body.velocity = Vec2::new(-WALL_KICK_VELOCITY.x, WALL_KICK_VELOCITY.y);
            self.airborne_frames = WALL_KICK_AIRBORNE_FRAMES;
        } else {
            body.velocity.y = JUMP_VELOCITY;
            self.airborne_frames = WALL_KICK_AIRBORNE_FRAMES;
        }

        self.jumps -= 1;
        sounds.play(SoundCue::Jump);
        true
    }

    /// Starts a dash in the facing direction; ignored while a dash is still counting down.
    pub fn dash(&mut self, body: &KinematicBody, sounds: &mut dyn SoundSink) -> bool {
        if self.dash_timer != 0 {
            return false;
        }
        self.dash_timer = if body.facing.is_left() {
            -DASH_FRAMES
        } else {
            DASH_FRAMES
        };
        sounds.play(SoundCue::Dash);
        true
    }
}
