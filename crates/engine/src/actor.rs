use crate::animation::AnimationClock;
use crate::assets::AssetCatalog;
use crate::enemy::{EnemyBehavior, EnemyContext, EnemyOutcome, PlayerView, ENEMY_SIZE};
use crate::geometry::{Rect, Vec2};
use crate::physics::KinematicBody;
use crate::player::{PlayerBehavior, PLAYER_SIZE};
use crate::render::{RenderTarget, SpriteRef};

/// Sprites are drawn this far from the body origin so the collision box sits inside the art.
pub const SPRITE_OFFSET: Vec2 = Vec2::new(-3.0, -3.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorKind {
    Player,
    Enemy,
}

impl ActorKind {
    pub fn name(self) -> &'static str {
        match self {
            ActorKind::Player => "player",
            ActorKind::Enemy => "enemy",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Player(PlayerBehavior),
    Enemy(EnemyBehavior),
}

/// A body plus the behavior driving it. Action changes restart the animation clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub body: KinematicBody,
    pub behavior: Behavior,
    animation: AnimationClock,
    action: &'static str,
}

impl Actor {
    pub fn player(pos: Vec2) -> Self {
        Self::new(
            KinematicBody::new(pos, PLAYER_SIZE),
            Behavior::Player(PlayerBehavior::new()),
        )
    }

    pub fn enemy(pos: Vec2) -> Self {
        Self::new(
            KinematicBody::new(pos, ENEMY_SIZE),
            Behavior::Enemy(EnemyBehavior::new()),
        )
    }

    fn new(body: KinematicBody, behavior: Behavior) -> Self {
        Self {
            body,
            behavior,
            animation: AnimationClock::default(),
            action: "idle",
        }
    }

    pub fn kind(&self) -> ActorKind {
        match self.behavior {
            Behavior::Player(_) => ActorKind::Player,
            Behavior::Enemy(_) => ActorKind::Enemy,
        }
    }

    pub fn rect(&self) -> Rect {
        self.body.rect()
    }

    pub fn action(&self) -> &'static str {
        self.action
    }

    /// Asset key of the animation for the current action, e.g. `"player/wall_slide"`.
    pub fn animation_key(&self) -> String {
        format!("{}/{}", self.kind().name(), self.action)
    }

    pub fn as_player(&self) -> Option<&PlayerBehavior> {
        match &self.behavior {
            Behavior::Player(player) => Some(player),
            Behavior::Enemy(_) => None,
        }
    }

    pub fn player_view(&self) -> Option<PlayerView> {
        self.as_player().map(|player| PlayerView {
            pos: self.body.pos,
            rect: self.body.rect(),
            dash_timer: player.dash_timer(),
        })
    }

    /// One tick of whichever behavior this actor carries. Only enemies can report a kill.
    pub fn update(&mut self, ctx: &mut EnemyContext<'_>, movement: Vec2) -> EnemyOutcome {
        let (outcome, action) = match &mut self.behavior {
            Behavior::Player(player) => {
                player.update(&mut self.body, ctx.tilemap, movement);
                (EnemyOutcome::Alive, player.action().name())
            }
            Behavior::Enemy(enemy) => {
                let outcome = enemy.update(&mut self.body, ctx, movement);
                (outcome, enemy.action().name())
            }
        };

        if action != self.action {
            self.action = action;
            self.animation.restart();
        } else {
            self.animation.advance();
        }
        outcome
    }

    pub fn render(&self, target: &mut dyn RenderTarget, offset: Vec2, assets: &AssetCatalog) {
        if self.as_player().is_some_and(PlayerBehavior::is_dashing) {
            return;
        }

        let key = self.animation_key();
        let index = assets
            .animation(&key)
            .map_or(0, |animation| self.animation.frame_index(animation));
        target.draw_sprite(
            SpriteRef { key: &key, index },
            self.body.pos - offset + SPRITE_OFFSET,
            self.body.facing.is_left(),
        );
    }
}
