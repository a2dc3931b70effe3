//! In-memory backend that records every allocation, mapping and pass call.

use std::ops::{Deref, DerefMut};

use anyhow::{Result, bail};
use glam::{Mat4, Vec3, Vec4};

use crate::backend::{Camera, ParticleBackend, ParticleDevice, ParticlePass};
use crate::particle::Particle;

pub(crate) struct Recording;

impl ParticleBackend for Recording {
    type ParticleBuffer = usize;
    type IndexBuffer = usize;
    type Texture = &'static str;
    type Sampler = &'static str;
}

#[derive(Default)]
pub(crate) struct RecordingDevice {
    pub particle_buffers: Vec<Vec<Particle>>,
    pub index_buffers: Vec<Vec<u32>>,
    pub maps: usize,
    pub unmaps: usize,
    pub fail_allocations: bool,
}

pub(crate) struct RecordingMapping<'m> {
    records: &'m mut [Particle],
    unmaps: &'m mut usize,
}

impl Deref for RecordingMapping<'_> {
    type Target = [Particle];
    fn deref(&self) -> &[Particle] {
        self.records
    }
}

impl DerefMut for RecordingMapping<'_> {
    fn deref_mut(&mut self) -> &mut [Particle] {
        self.records
    }
}

impl Drop for RecordingMapping<'_> {
    fn drop(&mut self) {
        *self.unmaps += 1;
    }
}

impl ParticleDevice for RecordingDevice {
    type Backend = Recording;
    type Mapping<'m>
        = RecordingMapping<'m>
    where
        Self: 'm;

    fn create_particle_buffer(&mut self, capacity: usize) -> Result<usize> {
        if self.fail_allocations {
            bail!("out of device memory");
        }
        self.particle_buffers.push(vec![Particle::default(); capacity]);
        Ok(self.particle_buffers.len() - 1)
    }

    fn create_index_buffer(&mut self, indices: &[u32]) -> Result<usize> {
        if self.fail_allocations {
            bail!("out of device memory");
        }
        self.index_buffers.push(indices.to_vec());
        Ok(self.index_buffers.len() - 1)
    }

    fn map_write<'m>(&'m mut self, buffer: &'m usize, len: usize) -> Result<RecordingMapping<'m>> {
        self.maps += 1;
        let Some(records) = self.particle_buffers.get_mut(*buffer) else {
            bail!("unknown particle buffer {buffer}");
        };
        Ok(RecordingMapping {
            records: &mut records[..len],
            unmaps: &mut self.unmaps,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PassOp {
    IndexBuffer(usize),
    Matrix(String, Mat4),
    Float(String, f32),
    Float3(String, Vec3),
    Float4(String, Vec4),
    ParticleData(String, usize),
    Texture(String, &'static str),
    Sampler(String, &'static str),
    Commit,
    DrawIndexed(u32),
}

#[derive(Default)]
pub(crate) struct RecordingPass {
    pub ops: Vec<PassOp>,
}

impl RecordingPass {
    pub fn draws(&self) -> Vec<u32> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                PassOp::DrawIndexed(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    pub fn float(&self, name: &str) -> Option<f32> {
        self.ops.iter().rev().find_map(|op| match op {
            PassOp::Float(n, v) if n == name => Some(*v),
            _ => None,
        })
    }
}

impl<'r> ParticlePass<'r, Recording> for RecordingPass {
    fn set_index_buffer(&mut self, buffer: &'r usize) {
        self.ops.push(PassOp::IndexBuffer(*buffer));
    }
    fn set_matrix4(&mut self, name: &str, value: Mat4) {
        self.ops.push(PassOp::Matrix(name.to_owned(), value));
    }
    fn set_float(&mut self, name: &str, value: f32) {
        self.ops.push(PassOp::Float(name.to_owned(), value));
    }
    fn set_float3(&mut self, name: &str, value: Vec3) {
        self.ops.push(PassOp::Float3(name.to_owned(), value));
    }
    fn set_float4(&mut self, name: &str, value: Vec4) {
        self.ops.push(PassOp::Float4(name.to_owned(), value));
    }
    fn set_particle_data(&mut self, name: &str, buffer: &'r usize) {
        self.ops.push(PassOp::ParticleData(name.to_owned(), *buffer));
    }
    fn set_texture(&mut self, name: &str, texture: &'r &'static str) {
        self.ops.push(PassOp::Texture(name.to_owned(), *texture));
    }
    fn set_sampler(&mut self, name: &str, sampler: &'r &'static str) {
        self.ops.push(PassOp::Sampler(name.to_owned(), *sampler));
    }
    fn commit(&mut self) -> Result<()> {
        self.ops.push(PassOp::Commit);
        Ok(())
    }
    fn draw_indexed(&mut self, index_count: u32) {
        self.ops.push(PassOp::DrawIndexed(index_count));
    }
}

pub(crate) struct FixedCamera;

impl Camera for FixedCamera {
    fn view(&self) -> Mat4 {
        Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::Y)
    }
    fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(1.0, 1.0, 0.1, 100.0)
    }
}
