mod input;
mod loop_runner;
mod metrics;
mod scene;

pub use input::InputAction;
pub use loop_runner::{run_app, AppError, InputSource, LoopConfig, LoopSummary, StopReason};
pub use metrics::LoopMetricsSnapshot;
pub use scene::{
    Camera2D, InputSnapshot, Scene, SceneCommand, SceneError, CAMERA_EASING, DEFAULT_VIEWPORT,
};
