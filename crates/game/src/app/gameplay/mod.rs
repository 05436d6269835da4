use engine::{
    AppPaths, AssetCatalog, Camera2D, InputAction, InputSnapshot, Level, LevelStatus, PlayerIntent,
    RenderTarget, Scene, SceneCommand, SceneError, SoundCue, SoundSink, SpriteRef, Vec2,
};
use tracing::{debug, error, info, warn};

const BACKGROUND_KEY: &str = "background";

/// Sound cues go to the log until an audio backend is wired in.
#[derive(Debug, Clone, Default)]
pub(crate) struct LoggedSounds {
    played: u64,
}

impl LoggedSounds {
    pub(crate) fn played(&self) -> u64 {
        self.played
    }
}

impl SoundSink for LoggedSounds {
    fn play(&mut self, cue: SoundCue) {
        self.played += 1;
        debug!(cue = cue.name(), "sound_cue");
    }
}

/// Counts the contiguous run of `maps/0.json`, `maps/1.json`, ...
pub(crate) fn count_levels(paths: &AppPaths) -> usize {
    (0..).take_while(|index| paths.level_map(*index).is_file()).count()
}

/// Plays the numbered maps in order. A death reloads the current map; clearing the last map
/// replays it.
pub(crate) struct GameplayScene {
    paths: AppPaths,
    assets: AssetCatalog,
    seed: u64,
    start_level: usize,
    level_index: usize,
    level_count: usize,
    level: Option<Level>,
    camera: Camera2D,
    sounds: LoggedSounds,
    reloads: u32,
}

impl GameplayScene {
    pub(crate) fn new(paths: AppPaths, assets: AssetCatalog, start_level: usize, seed: u64) -> Self {
        Self {
            paths,
            assets,
            seed,
            start_level,
            level_index: start_level,
            level_count: 0,
            level: None,
            camera: Camera2D::default(),
            sounds: LoggedSounds::default(),
            reloads: 0,
        }
    }

    fn enter_level(&mut self, index: usize) -> Result<(), SceneError> {
        let path = self.paths.level_map(index);
        let level = Level::load(&path, self.seed.wrapping_add(index as u64))?;
        self.level_index = index;
        self.level = Some(level);
        info!(level = index, count = self.level_count, "level_started");
        Ok(())
    }

    fn player_center(&self) -> Option<Vec2> {
        self.level
            .as_ref()
            .map(|level| level.player().rect().center())
    }

    fn apply_status(&mut self, status: LevelStatus) -> Result<(), SceneError> {
        if status.wants_next_level() {
            let next = (self.level_index + 1).min(self.level_count.saturating_sub(1));
            info!(from = self.level_index, to = next, "level_cleared");
            self.enter_level(next)
        } else if status.wants_reload() {
            self.reloads += 1;
            self.enter_level(self.level_index)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
impl GameplayScene {
    pub(crate) fn level_index(&self) -> usize {
        self.level_index
    }

    pub(crate) fn level(&self) -> Option<&Level> {
        self.level.as_ref()
    }

    pub(crate) fn camera(&self) -> &Camera2D {
        &self.camera
    }

    pub(crate) fn reloads(&self) -> u32 {
        self.reloads
    }

    pub(crate) fn sounds(&self) -> &LoggedSounds {
        &self.sounds
    }
}

impl Scene for GameplayScene {
    fn load(&mut self) -> Result<(), SceneError> {
        self.level_count = count_levels(&self.paths);
        if self.level_count == 0 {
            return Err(SceneError::NoLevels {
                dir: self.paths.maps_dir.clone(),
            });
        }

        let mut start = self.start_level;
        if start >= self.level_count {
            warn!(
                requested = start,
                count = self.level_count,
                "start_level_out_of_range"
            );
            start = self.level_count - 1;
        }
        self.enter_level(start)?;
        if let Some(center) = self.player_center() {
            self.camera.snap_to(center);
        }
        Ok(())
    }

    fn update(&mut self, input: &InputSnapshot) -> SceneCommand {
        let intent = PlayerIntent {
            horizontal: input.horizontal_axis(),
            jump: input.is_down(InputAction::Jump),
            dash: input.is_down(InputAction::Dash),
        };
        let Some(level) = self.level.as_mut() else {
            return SceneCommand::Quit;
        };
        let status = level.tick(intent, &mut self.sounds);

        if let Some(center) = self.player_center() {
            self.camera.follow(center);
        }

        if let Err(err) = self.apply_status(status) {
            error!(error = %err, level = self.level_index, "level_transition_failed");
            return SceneCommand::Quit;
        }
        SceneCommand::None
    }

    fn render(&self, target: &mut dyn RenderTarget) {
        if self.assets.contains_key(BACKGROUND_KEY) {
            target.draw_sprite(
                SpriteRef {
                    key: BACKGROUND_KEY,
                    index: 0,
                },
                Vec2::ZERO,
                false,
            );
        }
        if let Some(level) = &self.level {
            level.render(target, self.camera.render_offset(), &self.assets);
        }
    }

    fn unload(&mut self) {
        info!(
            level = self.level_index,
            reloads = self.reloads,
            sounds = self.sounds.played(),
            "gameplay_unloaded"
        );
        self.level = None;
    }

    fn debug_title(&self) -> Option<String> {
        Some(format!(
            "PyNinja | level {}/{}",
            self.level_index + 1,
            self.level_count.max(1)
        ))
    }
}

#[cfg(test)]
mod tests;
