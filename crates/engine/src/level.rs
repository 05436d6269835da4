use std::path::Path;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::actor::{Actor, Behavior};
use crate::assets::{AssetCatalog, SpriteLookup};
use crate::enemy::{EnemyContext, EnemyOutcome};
use crate::events::{SoundCue, SoundSink, SpawnRequest};
use crate::geometry::{Rect, Vec2};
use crate::map_file::{load_map, MapError};
use crate::projectile::{Projectile, ProjectileOutcome, PROJECTILE_SPRITE_KEY};
use crate::render::RenderTarget;
use crate::tilemap::{TileKind, Tilemap};

pub const PLAYER_SPAWNER: (TileKind, u32) = (TileKind::Spawners, 0);
pub const ENEMY_SPAWNER: (TileKind, u32) = (TileKind::Spawners, 1);
pub const LEAF_TREE: (TileKind, u32) = (TileKind::LargeDecor, 2);
pub const DEFAULT_PLAYER_SPAWN: Vec2 = Vec2::new(50.0, 50.0);
pub const DEATH_RELOAD_FRAMES: u32 = 40;
pub const CLEAR_TRANSITION_FRAMES: u32 = 30;

/// Player input for one tick. `jump` and `dash` are edge-triggered presses.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    pub horizontal: f32,
    pub jump: bool,
    pub dash: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelStatus {
    Playing,
    /// Frames since the player died, counting from 1.
    PlayerDead { frames: u32 },
    /// Every spawned enemy is gone; frames since the last one died.
    Cleared { frames: u32 },
}

impl LevelStatus {
    pub fn wants_reload(self) -> bool {
        matches!(self, LevelStatus::PlayerDead { frames } if frames > DEATH_RELOAD_FRAMES)
    }

    pub fn wants_next_level(self) -> bool {
        matches!(self, LevelStatus::Cleared { frames } if frames > CLEAR_TRANSITION_FRAMES)
    }
}

/// One loaded map with its actors. Spawners are consumed at load; everything else in the
/// tilemap stays as level geometry and decoration.
#[derive(Debug, Clone)]
pub struct Level {
    tilemap: Tilemap,
    player: Actor,
    enemies: Vec<Actor>,
    projectiles: Vec<Projectile>,
    leaf_emitters: Vec<Rect>,
    enemies_spawned: usize,
    dead_frames: u32,
    cleared_frames: u32,
    rng: StdRng,
}

impl Level {
    pub fn load(path: &Path, seed: u64) -> Result<Self, MapError> {
        let tilemap = load_map(path)?;
        let level = Self::from_tilemap(tilemap, seed);
        info!(
            path = %path.display(),
            enemies = level.enemies.len(),
            leaf_emitters = level.leaf_emitters.len(),
            "level_loaded"
        );
        Ok(level)
    }

    pub fn from_tilemap(mut tilemap: Tilemap, seed: u64) -> Self {
        let leaf_emitters = tilemap
            .extract_tiles(&[LEAF_TREE])
            .into_iter()
            .map(|tree| Rect::new(tree.pos.x + 4.0, tree.pos.y + 4.0, 23.0, 13.0))
            .collect();

        let mut player_spawn = DEFAULT_PLAYER_SPAWN;
        let mut enemies = Vec::new();
        for spawner in tilemap.drain_matching(&[PLAYER_SPAWNER, ENEMY_SPAWNER]) {
            if spawner.variant == PLAYER_SPAWNER.1 {
                player_spawn = spawner.pos;
            } else {
                enemies.push(Actor::enemy(spawner.pos));
            }
        }

        Self {
            tilemap,
            player: Actor::player(player_spawn),
            enemies_spawned: enemies.len(),
            enemies,
            projectiles: Vec::new(),
            leaf_emitters,
            dead_frames: 0,
            cleared_frames: 0,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn tilemap(&self) -> &Tilemap {
        &self.tilemap
    }

    pub fn player(&self) -> &Actor {
        &self.player
    }

    pub fn enemies(&self) -> &[Actor] {
        &self.enemies
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn leaf_emitters(&self) -> &[Rect] {
        &self.leaf_emitters
    }

    pub fn is_player_dead(&self) -> bool {
        self.dead_frames > 0
    }

    pub fn status(&self) -> LevelStatus {
        if self.dead_frames > 0 {
            LevelStatus::PlayerDead {
                frames: self.dead_frames,
            }
        } else if self.enemies_spawned > 0 && self.enemies.is_empty() {
            LevelStatus::Cleared {
                frames: self.cleared_frames,
            }
        } else {
            LevelStatus::Playing
        }
    }

    /// Enemies, then the player, then projectiles. Spawn requests raised during the enemy
    /// pass become projectiles in the same tick.
    pub fn tick(&mut self, intent: PlayerIntent, sounds: &mut dyn SoundSink) -> LevelStatus {
        if self.dead_frames > 0 {
            self.dead_frames += 1;
            return self.status();
        }
        if self.enemies_spawned > 0 && self.enemies.is_empty() {
            self.cleared_frames += 1;
        }

        let mut spawns = Vec::new();
        let mut ctx = EnemyContext {
            tilemap: &self.tilemap,
            player: self.player.player_view(),
            rng: &mut self.rng,
            sounds,
            spawns: &mut spawns,
        };

        self.enemies.retain_mut(|enemy| {
            match enemy.update(&mut ctx, Vec2::ZERO) {
                EnemyOutcome::Killed => {
                    ctx.sounds.play(SoundCue::Hit);
                    debug!(x = enemy.body.pos.x, y = enemy.body.pos.y, "enemy_killed");
                    false
                }
                EnemyOutcome::Alive => true,
            }
        });

        if let Behavior::Player(player) = &mut self.player.behavior {
            if intent.jump {
                player.jump(&mut self.player.body, ctx.sounds);
            }
            if intent.dash {
                player.dash(&self.player.body, ctx.sounds);
            }
        }
        ctx.player = None;
        self.player.update(&mut ctx, Vec2::new(intent.horizontal, 0.0));

        if self
            .player
            .as_player()
            .is_some_and(|player| player.has_fallen_out())
        {
            self.kill_player("fell");
        }

        self.projectiles
            .extend(spawns.drain(..).map(|request| match request {
                SpawnRequest::Projectile { pos, velocity_x } => Projectile::new(pos, velocity_x),
            }));

        let player_view = if self.dead_frames == 0 {
            self.player.player_view()
        } else {
            None
        };
        let mut player_hit = false;
        let tilemap = &self.tilemap;
        self.projectiles.retain_mut(|projectile| {
            match projectile.update(tilemap, player_view.as_ref()) {
                ProjectileOutcome::Flying => true,
                ProjectileOutcome::HitPlayer => {
                    player_hit = true;
                    false
                }
                ProjectileOutcome::HitWall | ProjectileOutcome::Expired => false,
            }
        });
        if player_hit {
            sounds.play(SoundCue::Hit);
            self.kill_player("shot");
        }

        self.status()
    }

    fn kill_player(&mut self, cause: &'static str) {
        if self.dead_frames == 0 {
            self.dead_frames = 1;
            info!(
                cause,
                x = self.player.body.pos.x,
                y = self.player.body.pos.y,
                "player_died"
            );
        }
    }

    /// Tiles, enemies, the living player, projectiles, in that order.
    pub fn render(&self, target: &mut dyn RenderTarget, offset: Vec2, assets: &AssetCatalog) {
        self.tilemap.render(target, offset);
        for enemy in &self.enemies {
            enemy.render(target, offset, assets);
        }
        if self.dead_frames == 0 {
            self.player.render(target, offset, assets);
        }
        let projectile_size = assets
            .sprite_size(PROJECTILE_SPRITE_KEY, 0)
            .unwrap_or(Vec2::ZERO);
        for projectile in &self.projectiles {
            projectile.render(target, offset, projectile_size);
        }
    }
}
