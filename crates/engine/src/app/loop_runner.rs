use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{info, warn};

use super::metrics::MetricsAccumulator;
use super::scene::SceneError;
use super::{InputSnapshot, Scene, SceneCommand};
use crate::render::RenderTarget;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    pub metrics_log_interval: Duration,
    /// Stop after this many simulation ticks.
    pub max_ticks: Option<u64>,
    /// Pace ticks against the wall clock. Off, every frame runs exactly one tick.
    pub realtime: bool,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            metrics_log_interval: Duration::from_secs(1),
            max_ticks: None,
            realtime: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load scene: {0}")]
    SceneLoad(#[source] SceneError),
}

/// Supplies one input snapshot per simulation tick; `None` ends the run.
pub trait InputSource {
    fn next_tick(&mut self) -> Option<InputSnapshot>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QuitRequested,
    InputExhausted,
    TickLimit,
}

impl StopReason {
    pub fn name(self) -> &'static str {
        match self {
            StopReason::QuitRequested => "quit_requested",
            StopReason::InputExhausted => "input_exhausted",
            StopReason::TickLimit => "tick_limit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSummary {
    pub ticks: u64,
    pub frames: u64,
    pub stop_reason: StopReason,
}

pub fn run_app(
    config: &LoopConfig,
    scene: &mut dyn Scene,
    input: &mut dyn InputSource,
    target: &mut dyn RenderTarget,
) -> Result<LoopSummary, AppError> {
    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);

    scene.load().map_err(AppError::SceneLoad)?;
    info!(title = scene.debug_title().as_deref(), "scene_loaded");
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        max_ticks = config.max_ticks,
        realtime = config.realtime,
        "loop_config"
    );

    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut metrics = MetricsAccumulator::new(metrics_log_interval, last_frame_instant);
    let mut frames = 0u64;

    let stop_reason = 'frames: loop {
        let frame_start = Instant::now();
        let frame_dt = if config.realtime {
            let raw = frame_start.saturating_duration_since(last_frame_instant);
            clamp_frame_delta(raw, max_frame_delta)
        } else {
            fixed_dt
        };
        last_frame_instant = frame_start;
        accumulator = accumulator.saturating_add(frame_dt);

        let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
        for _ in 0..step_plan.ticks_to_run {
            if config
                .max_ticks
                .is_some_and(|limit| metrics.total_ticks() >= limit)
            {
                break 'frames StopReason::TickLimit;
            }
            let Some(snapshot) = input.next_tick() else {
                break 'frames StopReason::InputExhausted;
            };
            metrics.record_tick();
            if snapshot.quit_requested() || scene.update(&snapshot) == SceneCommand::Quit {
                break 'frames StopReason::QuitRequested;
            }
        }
        accumulator = step_plan.remaining_accumulator;

        if step_plan.dropped_backlog > Duration::ZERO {
            warn!(
                dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                max_ticks_per_frame, "sim_clamp_triggered"
            );
        }

        target.begin_frame();
        scene.render(target);
        frames += 1;
        metrics.record_frame(frame_dt);

        if let Some(snapshot) = metrics.maybe_snapshot(Instant::now()) {
            info!(
                fps = snapshot.fps,
                tps = snapshot.tps,
                frame_time_ms = snapshot.frame_time_ms,
                total_ticks = snapshot.total_ticks,
                "loop_metrics"
            );
        }

        if config.realtime {
            let elapsed = Instant::now().saturating_duration_since(frame_start);
            let sleep = compute_frame_sleep(elapsed, fixed_dt);
            if sleep > Duration::ZERO {
                thread::sleep(sleep);
            }
        }
    };

    scene.unload();
    let summary = LoopSummary {
        ticks: metrics.total_ticks(),
        frames,
        stop_reason,
    };
    info!(
        ticks = summary.ticks,
        frames = summary.frames,
        reason = stop_reason.name(),
        "shutdown"
    );
    Ok(summary)
}

#[derive(Debug, Clone, Copy)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn compute_frame_sleep(elapsed: Duration, frame_target: Duration) -> Duration {
    frame_target.saturating_sub(elapsed)
}
