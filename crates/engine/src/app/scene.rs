use std::path::PathBuf;

use thiserror::Error;

use super::input::{ActionStates, InputAction};
use crate::assets::AssetError;
use crate::geometry::Vec2;
use crate::map_file::MapError;
use crate::render::RenderTarget;

pub const CAMERA_EASING: f32 = 30.0;
pub const DEFAULT_VIEWPORT: Vec2 = Vec2::new(320.0, 240.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Map(#[from] MapError),
    #[error(transparent)]
    Assets(#[from] AssetError),
    #[error("no level maps found in {}", dir.display())]
    NoLevels { dir: PathBuf },
}

/// Input for a single tick. Movement actions are held states; jump and dash are presses
/// that last exactly one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    quit_requested: bool,
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested || self.actions.is_down(InputAction::Quit)
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn with_quit_requested(mut self, quit_requested: bool) -> Self {
        self.quit_requested = quit_requested;
        self
    }

    /// -1, 0 or 1; opposite directions cancel.
    pub fn horizontal_axis(&self) -> f32 {
        let mut axis = 0.0;
        if self.is_down(InputAction::MoveLeft) {
            axis -= 1.0;
        }
        if self.is_down(InputAction::MoveRight) {
            axis += 1.0;
        }
        axis
    }
}

/// Top-left of the visible region in world pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub viewport: Vec2,
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            viewport: DEFAULT_VIEWPORT,
        }
    }
}

impl Camera2D {
    pub fn new(viewport: Vec2) -> Self {
        Self {
            position: Vec2::ZERO,
            viewport,
        }
    }

    /// Moves a fraction of the remaining distance toward centering `target`.
    pub fn follow(&mut self, target: Vec2) {
        self.position.x += (target.x - self.viewport.x * 0.5 - self.position.x) / CAMERA_EASING;
        self.position.y += (target.y - self.viewport.y * 0.5 - self.position.y) / CAMERA_EASING;
    }

    pub fn snap_to(&mut self, target: Vec2) {
        self.position = Vec2::new(
            target.x - self.viewport.x * 0.5,
            target.y - self.viewport.y * 0.5,
        );
    }

    /// Whole-pixel offset handed to renderers.
    pub fn render_offset(&self) -> Vec2 {
        Vec2::new(self.position.x.trunc(), self.position.y.trunc())
    }
}

pub trait Scene {
    fn load(&mut self) -> Result<(), SceneError>;
    fn update(&mut self, input: &InputSnapshot) -> SceneCommand;
    fn render(&self, target: &mut dyn RenderTarget);
    fn unload(&mut self) {}
    fn debug_title(&self) -> Option<String> {
        None
    }
}
