use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Quad corners per particle, pulled by the vertex shader as `vertex_index % 4`.
pub const VERTICES_PER_PARTICLE: u32 = 4;

/// Two triangles per particle quad.
pub const INDICES_PER_PARTICLE: u32 = 6;

/// A single particle as it is laid out in the GPU structured buffer.
///
/// Tightly packed (28 bytes, 4-byte aligned): the stride used by the
/// structured buffer is exactly `size_of::<Particle>()`. A record is only
/// meaningful while its slot is inside the live window; dead slots keep
/// whatever was last written and are overwritten on reuse.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Particle {
    /// Simulation time at which the particle was spawned.
    pub emit_time: f32,
    /// World-space spawn position, copied from the emitter transform.
    pub start_position: Vec3,
    /// Initial velocity: base velocity plus a per-axis random offset.
    pub start_velocity: Vec3,
}

impl Particle {
    /// Byte stride of one record in the structured buffer.
    pub const STRIDE: u64 = std::mem::size_of::<Particle>() as u64;

    /// Age of the particle at `now`.
    #[inline]
    pub fn age(&self, now: f32) -> f32 {
        now - self.emit_time
    }
}

/// Builds the index list for `quads` independent quads.
///
/// Quad `q` uses vertices `4q..4q+4` as the triangles `{i, i+1, i+2}` and
/// `{i, i+2, i+3}`. The list is built once per emitter and never mutated.
pub fn quad_indices(quads: usize) -> Vec<u32> {
    let mut indices = Vec::with_capacity(quads * INDICES_PER_PARTICLE as usize);
    for q in 0..quads as u32 {
        let i = q * VERTICES_PER_PARTICLE;
        indices.extend_from_slice(&[i, i + 1, i + 2, i, i + 2, i + 3]);
    }
    indices
}

/// Number of indices needed to draw `particles` quads.
#[inline]
pub fn index_count(particles: usize) -> u32 {
    particles as u32 * INDICES_PER_PARTICLE
}
