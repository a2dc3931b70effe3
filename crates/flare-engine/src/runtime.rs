//! Offscreen frame loop.

use anyhow::{Context, Result};

use crate::core::{App, AppControl, FrameCtx};
use crate::device::{Gpu, GpuInit};
use crate::time::{FrameClock, TimeStep};

/// Run configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Shown in log lines.
    pub label: String,
    pub width: u32,
    pub height: u32,
    /// Frames to render. `None` runs until the app returns [`AppControl::Exit`].
    pub frames: Option<u64>,
    pub time_step: TimeStep,
    /// Read the final frame back into [`RunReport::image`].
    pub capture: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            label: "flare".to_string(),
            width: 1280,
            height: 720,
            frames: Some(300),
            time_step: TimeStep::default(),
            capture: false,
        }
    }
}

/// Why the loop stopped.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExitReason {
    /// Rendered the configured number of frames.
    FrameLimit,
    /// The app returned [`AppControl::Exit`].
    AppRequested,
}

/// Summary of a finished run.
#[derive(Debug)]
pub struct RunReport {
    pub frames: u64,
    /// Simulation seconds covered by the run.
    pub elapsed: f32,
    pub exit: ExitReason,
    /// Last rendered frame, when capture was requested.
    pub image: Option<image::RgbaImage>,
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Creates the GPU context and drives `app` frame by frame.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: &mut A) -> Result<RunReport>
    where
        A: App,
    {
        let gpu = Gpu::new_blocking(gpu_init, config.width, config.height)
            .with_context(|| format!("{}: failed to initialize GPU", config.label))?;
        log::info!(
            "{}: rendering {}x{} offscreen ({:?})",
            config.label,
            config.width,
            config.height,
            config.time_step
        );

        let mut clock = FrameClock::new(config.time_step);
        let mut frames = 0u64;
        let mut elapsed = 0.0f32;
        let mut exit = ExitReason::FrameLimit;

        while config.frames.is_none_or(|limit| frames < limit) {
            let time = clock.tick();
            let mut ctx = FrameCtx::new(&gpu, time);

            let control = app
                .on_frame(&mut ctx)
                .with_context(|| format!("{}: frame {} failed", config.label, time.frame_index))?;

            frames += 1;
            elapsed = time.elapsed;

            if control == AppControl::Exit {
                exit = ExitReason::AppRequested;
                break;
            }
        }

        let image = if config.capture {
            Some(gpu.capture().context("failed to capture final frame")?)
        } else {
            None
        };

        log::info!(
            "{}: finished after {frames} frame(s), {elapsed:.2}s simulated ({exit:?})",
            config.label
        );

        Ok(RunReport {
            frames,
            elapsed,
            exit,
            image,
        })
    }
}
