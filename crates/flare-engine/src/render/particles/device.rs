use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use anyhow::Result;
use bytemuck::Zeroable;
use flare_particles::{Particle, ParticleBackend, ParticleDevice};
use wgpu::util::DeviceExt;

/// Backend marker for emitters drawn through wgpu.
pub struct Wgpu;

impl ParticleBackend for Wgpu {
    type ParticleBuffer = ParticleBuffer;
    type IndexBuffer = wgpu::Buffer;
    type Texture = Arc<wgpu::TextureView>;
    type Sampler = Arc<wgpu::Sampler>;
}

/// Storage buffer holding up to `capacity` particle records.
pub struct ParticleBuffer {
    buffer: wgpu::Buffer,
    capacity: usize,
}

impl ParticleBuffer {
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn raw(&self) -> &wgpu::Buffer {
        &self.buffer
    }
}

/// Allocation and staging for emitters, borrowed for one frame.
///
/// Mapped records are written into a CPU scratch slice and uploaded with
/// `queue.write_buffer` when the mapping is dropped; the upload lands before
/// the frame's command buffer executes.
pub struct WgpuParticleDevice<'a> {
    device: &'a wgpu::Device,
    queue: &'a wgpu::Queue,
    scratch: &'a mut Vec<Particle>,
}

impl<'a> WgpuParticleDevice<'a> {
    pub fn new(
        device: &'a wgpu::Device,
        queue: &'a wgpu::Queue,
        scratch: &'a mut Vec<Particle>,
    ) -> Self {
        Self { device, queue, scratch }
    }
}

/// Scoped write view returned by [`WgpuParticleDevice::map_write`].
pub struct WgpuMapping<'m> {
    queue: &'m wgpu::Queue,
    buffer: &'m wgpu::Buffer,
    staged: &'m mut [Particle],
}

impl Deref for WgpuMapping<'_> {
    type Target = [Particle];
    fn deref(&self) -> &[Particle] {
        self.staged
    }
}

impl DerefMut for WgpuMapping<'_> {
    fn deref_mut(&mut self) -> &mut [Particle] {
        self.staged
    }
}

impl Drop for WgpuMapping<'_> {
    fn drop(&mut self) {
        if !self.staged.is_empty() {
            self.queue
                .write_buffer(self.buffer, 0, bytemuck::cast_slice(self.staged));
        }
    }
}

impl ParticleDevice for WgpuParticleDevice<'_> {
    type Backend = Wgpu;
    type Mapping<'m>
        = WgpuMapping<'m>
    where
        Self: 'm;

    fn create_particle_buffer(&mut self, capacity: usize) -> Result<ParticleBuffer> {
        let size = Particle::STRIDE * capacity as u64;
        let max = u64::from(self.device.limits().max_storage_buffer_binding_size);
        anyhow::ensure!(
            size <= max,
            "particle buffer of {capacity} records ({size} bytes) exceeds the storage binding limit ({max} bytes)"
        );

        let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("flare particle buffer"),
            size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        log::debug!("particle buffer: {capacity} records, {size} bytes");

        Ok(ParticleBuffer { buffer, capacity })
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> Result<wgpu::Buffer> {
        anyhow::ensure!(!indices.is_empty(), "index buffer must not be empty");
        Ok(self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("flare particle ibo"),
                contents: bytemuck::cast_slice(indices),
                usage: wgpu::BufferUsages::INDEX,
            }))
    }

    fn map_write<'m>(
        &'m mut self,
        buffer: &'m ParticleBuffer,
        len: usize,
    ) -> Result<WgpuMapping<'m>> {
        anyhow::ensure!(
            len <= buffer.capacity,
            "cannot map {len} records of a {}-record particle buffer",
            buffer.capacity
        );

        self.scratch.clear();
        self.scratch.resize(len, Particle::zeroed());

        Ok(WgpuMapping {
            queue: self.queue,
            buffer: &buffer.buffer,
            staged: self.scratch.as_mut_slice(),
        })
    }
}
