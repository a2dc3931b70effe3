//! Offscreen particle demo.
//!
//! Loads emitter presets, renders a fixed number of frames headless and
//! optionally writes the last one to a PNG.

mod app;
mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use flare_engine::device::GpuInit;
use flare_engine::logging::{LoggingConfig, init_logging};
use flare_engine::runtime::{Runtime, RuntimeConfig};
use flare_engine::time::TimeStep;
use flare_particles::PresetFile;

use crate::app::DemoApp;
use crate::cli::Cli;

const DEFAULT_PRESETS: &str = include_str!("../presets/default.json");

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..Default::default()
    });

    let presets = match &cli.presets {
        Some(path) => PresetFile::load(path)
            .with_context(|| format!("failed to load presets from {}", path.display()))?,
        None => PresetFile::from_json_str(DEFAULT_PRESETS).context("built-in presets are invalid")?,
    };
    anyhow::ensure!(!presets.emitters.is_empty(), "preset file defines no emitters");

    let config = RuntimeConfig {
        label: "flare-demo".to_string(),
        width: cli.width,
        height: cli.height,
        frames: Some(cli.frames),
        time_step: TimeStep::fps(cli.fps),
        capture: cli.out.is_some(),
    };
    let gpu_init = GpuInit {
        force_fallback_adapter: cli.software,
        ..Default::default()
    };

    let mut app = DemoApp::new(presets, cli.seed, cli.stats_every);
    let report = Runtime::run(config, gpu_init, &mut app)?;

    if let (Some(path), Some(image)) = (&cli.out, &report.image) {
        image
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }

    Ok(())
}
