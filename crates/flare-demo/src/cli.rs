//! Command-line interface for flare-demo

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "flare-demo")]
#[command(about = "Renders ring-buffer particle emitters offscreen", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Number of frames to simulate and render
    #[arg(long, default_value_t = 240)]
    pub frames: u64,

    /// Fixed simulation rate in frames per second
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Render target width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Render target height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Emitter preset file (JSON); the built-in presets are used when omitted
    #[arg(long)]
    pub presets: Option<PathBuf>,

    /// Seed for velocity jitter
    #[arg(long, default_value_t = 0x5EED)]
    pub seed: u64,

    /// Write the last frame to this PNG file
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Log filter (env_logger syntax); overrides RUST_LOG
    #[arg(long)]
    pub log: Option<String>,

    /// Log emitter stats every N frames (0 disables)
    #[arg(long, default_value_t = 60)]
    pub stats_every: u64,

    /// Use a software adapter
    #[arg(long)]
    pub software: bool,
}
