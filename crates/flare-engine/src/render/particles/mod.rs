//! wgpu realisation of the emitter backend traits.
//!
//! Per frame:
//! 1. [`ParticleRenderer::begin`] lazily builds the pipeline for the target
//!    format and hands out a [`ParticleFrame`].
//! 2. Each emitter draws with `frame.device` (staging through
//!    `queue.write_buffer`) and `frame.pass` (per-draw uniforms + bind group).
//! 3. [`WgpuParticlePass::finish`] encodes every recorded draw into a single
//!    render pass over the target.
//!
//! The vertex shader pulls particle `vertex_index / 4` from the storage buffer;
//! there is no vertex buffer.

mod device;
mod pass;
mod pipeline;
mod uniforms;

pub use device::{ParticleBuffer, Wgpu, WgpuMapping, WgpuParticleDevice};
pub use pass::WgpuParticlePass;
pub use pipeline::{ParticleFrame, ParticleRenderer};
pub use uniforms::ParticleUniforms;

use flare_particles::Emitter;

/// Emitter drawn by the wgpu backend.
pub type WgpuEmitter = Emitter<Wgpu>;
