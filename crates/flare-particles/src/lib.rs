//! Ring-buffer particle emitter.
//!
//! A fixed-capacity particle pool whose live subset is tracked by two circular
//! indices. Every frame the live subset is staged into a GPU-visible structured
//! buffer (oldest first) and drawn as one indexed call over a precomputed quad
//! index buffer; per-particle attributes are fetched by the shader from the
//! structured buffer, so there is no vertex buffer and no per-particle draw.
//!
//! This crate does not depend on any graphics API. Renderers plug in through
//! the traits in [`backend`].
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`particle`] | `Particle` GPU record, quad index generation |
//! | [`ring`] | `LiveWindow`: first-alive / first-dead bookkeeping |
//! | [`staging`] | `stage_live`: split copy of the live window |
//! | [`backend`] | `ParticleBackend`, `ParticleDevice`, `ParticlePass`, `Camera`, `Transform` |
//! | [`config`] | `EmitterConfig`, `EmissionRate`, `ParticleVisuals` |
//! | [`preset`] | JSON emitter presets |
//! | [`emitter`] | `Emitter`: update, emit, stage, draw |
//! | [`error`] | `EmitterError` |

pub mod backend;
pub mod config;
pub mod emitter;
pub mod error;
pub mod particle;
pub mod preset;
pub mod ring;
pub mod staging;

#[cfg(test)]
mod testing;

pub use backend::{Camera, ParticleBackend, ParticleDevice, ParticlePass, Transform};
pub use config::{EmissionRate, EmitterConfig, ParticleVisuals};
pub use emitter::{Emitter, EmitterStats};
pub use error::EmitterError;
pub use particle::Particle;
pub use preset::{EmitterPreset, PresetFile};
pub use ring::LiveWindow;
pub use staging::stage_live;
