//! GPU rendering subsystem.
//!
//! Renderers issue GPU commands via wgpu and own their own GPU resources
//! (pipelines, layouts). Emitter resources are owned by the emitters.
//!
//! Convention:
//! - world space is right-handed, +Y up
//! - particle quads are billboarded in view space by the vertex shader

pub mod camera;
mod ctx;
pub mod particles;
pub mod texture;

pub use camera::OrbitCamera;
pub use ctx::{RenderCtx, RenderTarget};
pub use particles::{ParticleFrame, ParticleRenderer, Wgpu};
pub use texture::ParticleTexture;
