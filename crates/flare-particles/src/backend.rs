//! Seams between the emitter and a rendering backend.
//!
//! The emitter never owns graphics objects directly. It holds opaque handles
//! chosen by the backend ([`ParticleBackend`]), allocates through a
//! [`ParticleDevice`], and records bindings + draws into a [`ParticlePass`].
//! Device, shader, texture and sampler lifetimes stay with the application.

use std::ops::DerefMut;

use anyhow::Result;
use glam::{Mat4, Vec3, Vec4};

use crate::particle::Particle;

/// Names used for shading-stage bindings.
///
/// Backends map these to uniform fields / bind slots; unknown names are the
/// backend's policy (the wgpu backend ignores them with a one-time log).
pub mod names {
    pub const VIEW: &str = "view";
    pub const PROJECTION: &str = "projection";
    pub const CURRENT_TIME: &str = "current_time";
    pub const START_COLOR: &str = "start_color";
    pub const END_COLOR: &str = "end_color";
    pub const START_SIZE: &str = "start_size";
    pub const END_SIZE: &str = "end_size";
    pub const FADE_OUT: &str = "fade_out";
    pub const LIFETIME: &str = "lifetime";
    pub const ACCELERATION: &str = "acceleration";

    pub const PARTICLE_DATA: &str = "particle_data";
    pub const PARTICLE_TEXTURE: &str = "particle_texture";
    pub const PARTICLE_SAMPLER: &str = "particle_sampler";
}

/// Opaque handle types of a rendering backend.
pub trait ParticleBackend {
    /// Write-mappable structured buffer of `Particle` records.
    type ParticleBuffer;
    /// Immutable `u32` index buffer.
    type IndexBuffer;
    /// Texture sampled by the pixel stage.
    type Texture;
    type Sampler;
}

/// Resource allocation and CPU→GPU transfer.
pub trait ParticleDevice {
    type Backend: ParticleBackend;

    /// Scoped exclusive write view of a particle buffer.
    ///
    /// Previous contents are discarded. Dropping the guard publishes the
    /// written records and releases the mapping, also when unwinding.
    type Mapping<'m>: DerefMut<Target = [Particle]>
    where
        Self: 'm;

    /// Allocates a structured buffer for `capacity` particles
    /// (stride `size_of::<Particle>()`).
    fn create_particle_buffer(
        &mut self,
        capacity: usize,
    ) -> Result<<Self::Backend as ParticleBackend>::ParticleBuffer>;

    /// Allocates an immutable index buffer initialised from `indices`.
    fn create_index_buffer(
        &mut self,
        indices: &[u32],
    ) -> Result<<Self::Backend as ParticleBackend>::IndexBuffer>;

    /// Maps the first `len` records of `buffer` for writing.
    fn map_write<'m>(
        &'m mut self,
        buffer: &'m <Self::Backend as ParticleBackend>::ParticleBuffer,
        len: usize,
    ) -> Result<Self::Mapping<'m>>;
}

/// Shading-stage bindings and draw submission for one frame.
///
/// Uniform setters only record pending values; [`commit`](Self::commit)
/// flushes them together with the resource bindings and must be called
/// before [`draw_indexed`](Self::draw_indexed).
pub trait ParticlePass<'r, B: ParticleBackend> {
    fn set_index_buffer(&mut self, buffer: &'r B::IndexBuffer);

    fn set_matrix4(&mut self, name: &str, value: Mat4);
    fn set_float(&mut self, name: &str, value: f32);
    fn set_float3(&mut self, name: &str, value: Vec3);
    fn set_float4(&mut self, name: &str, value: Vec4);

    fn set_particle_data(&mut self, name: &str, buffer: &'r B::ParticleBuffer);
    fn set_texture(&mut self, name: &str, texture: &'r B::Texture);
    fn set_sampler(&mut self, name: &str, sampler: &'r B::Sampler);

    /// Flushes pending uniform writes and resource bindings.
    fn commit(&mut self) -> Result<()>;

    /// Draws `index_count` indices from the bound index buffer.
    fn draw_indexed(&mut self, index_count: u32);
}

/// View + projection source for drawing.
pub trait Camera {
    fn view(&self) -> Mat4;
    fn projection(&self) -> Mat4;
}

/// Emitter placement. Spawned particles copy `position` at spawn time.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Transform {
    position: Vec3,
}

impl Transform {
    #[inline]
    pub const fn from_position(position: Vec3) -> Self {
        Self { position }
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    #[inline]
    pub fn translate(&mut self, offset: Vec3) {
        self.position += offset;
    }
}
