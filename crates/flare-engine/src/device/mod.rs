//! GPU device + offscreen target management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue without a window
//! - owning the color texture every frame renders into
//! - acquiring frames and providing encoders/views for rendering
//! - reading the target back into an image

mod capture;
mod frame;
mod gpu;
mod init;

pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
