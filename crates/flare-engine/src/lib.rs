//! Flare engine crate.
//!
//! Headless GPU runtime for the particle emitters in `flare-particles`: device
//! and offscreen target, frame timing, logging, the app loop, and the wgpu
//! realisation of the emitter backend traits.

pub mod device;
pub mod time;
pub mod core;
pub mod runtime;

pub mod logging;
pub mod render;
