use std::process::ExitCode;

use engine::{run_app, DrawList};
use tracing::{error, info};

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let AppWiring {
        config,
        mut scene,
        mut input,
    } = app;
    let mut target = DrawList::default();

    match run_app(&config, &mut scene, input.as_mut(), &mut target) {
        Ok(summary) => {
            info!(
                ticks = summary.ticks,
                frames = summary.frames,
                reason = summary.stop_reason.name(),
                last_frame_draws = target.len(),
                "run_finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}
