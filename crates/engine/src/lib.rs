use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub mod actor;
pub mod animation;
pub mod app;
pub mod assets;
pub mod editor;
pub mod enemy;
pub mod events;
pub mod geometry;
pub mod level;
pub mod map_file;
pub mod physics;
pub mod player;
pub mod projectile;
pub mod render;
pub mod tilemap;

pub use actor::{Actor, ActorKind, Behavior};
pub use app::{
    run_app, AppError, Camera2D, InputAction, InputSnapshot, InputSource, LoopConfig,
    LoopSummary, Scene, SceneCommand, SceneError, StopReason,
};
pub use assets::{
    AnimationDesc, AssetCatalog, AssetError, SpriteInfo, SpriteLookup, EDITOR_REQUIRED_KEYS,
    GAME_REQUIRED_KEYS,
};
pub use editor::{EditorState, Palette};
pub use enemy::{EnemyBehavior, EnemyOutcome, PlayerView};
pub use events::{MuteSound, SoundCue, SoundSink, SpawnRequest};
pub use geometry::{Facing, GridPos, Rect, Vec2};
pub use level::{Level, LevelStatus, PlayerIntent};
pub use map_file::{load_map, MapError};
pub use physics::{CollisionFlags, KinematicBody};
pub use player::{PlayerAction, PlayerBehavior};
pub use projectile::{Projectile, ProjectileOutcome};
pub use render::{DrawCommand, DrawList, RenderTarget, Rgb, SpriteRef};
pub use tilemap::{ExtractedTile, GridTile, OffgridTile, TileKind, Tilemap, TilemapError};

pub const ROOT_ENV_VAR: &str = "PYNINJA_ROOT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    pub root: PathBuf,
    pub images_dir: PathBuf,
    pub maps_dir: PathBuf,
}

impl AppPaths {
    pub fn under(root: PathBuf) -> Self {
        Self {
            images_dir: root.join("assets").join("images"),
            maps_dir: root.join("maps"),
            root,
        }
    }

    /// `maps/<index>.json`
    pub fn level_map(&self, index: usize) -> PathBuf {
        self.maps_dir.join(format!("{index}.json"))
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("current executable path has no parent directory: {0}")]
    ExeHasNoParent(PathBuf),
    #[error("failed to create maps directory at {path}: {source}")]
    CreateMapsDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(
        "{env_var} is set but does not point to a valid project root: {path}\n\
A valid root must contain Cargo.toml and either crates/ or assets/."
    )]
    InvalidEnvRoot { path: PathBuf, env_var: &'static str },
    #[error(
        "Could not detect project root by walking upward from executable directory: {start_dir}\n\
Expected a directory containing Cargo.toml and either crates/ or assets/.\n\
Set {env_var} explicitly, for example:\n\
export {env_var}=\"/path/to/pyninja\""
    )]
    RootNotFound {
        start_dir: PathBuf,
        env_var: &'static str,
    },
}

pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let paths = AppPaths::under(resolve_root()?);
    fs::create_dir_all(&paths.maps_dir).map_err(|source| StartupError::CreateMapsDir {
        path: paths.maps_dir.clone(),
        source,
    })?;
    Ok(paths)
}

fn resolve_root() -> Result<PathBuf, StartupError> {
    match env::var(ROOT_ENV_VAR) {
        Ok(value) => {
            let normalized = normalize_path(Path::new(&value));
            if is_repo_marker(&normalized) {
                Ok(normalized)
            } else {
                Err(StartupError::InvalidEnvRoot {
                    path: normalized,
                    env_var: ROOT_ENV_VAR,
                })
            }
        }
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            let exe_dir = exe
                .parent()
                .map(Path::to_path_buf)
                .ok_or_else(|| StartupError::ExeHasNoParent(exe.clone()))?;
            find_root_above(&exe_dir).ok_or_else(|| StartupError::RootNotFound {
                start_dir: normalize_path(&exe_dir),
                env_var: ROOT_ENV_VAR,
            })
        }
        Err(source) => Err(StartupError::EnvVar {
            var: ROOT_ENV_VAR,
            source,
        }),
    }
}

fn find_root_above(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|candidate| is_repo_marker(candidate))
        .map(normalize_path)
}

fn is_repo_marker(path: &Path) -> bool {
    let cargo_toml = path.join("Cargo.toml").is_file();
    let has_crates = path.join("crates").is_dir();
    let has_assets = path.join("assets").is_dir();

    cargo_toml && (has_crates || has_assets)
}

fn normalize_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
