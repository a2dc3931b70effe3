use std::sync::Arc;

use anyhow::{Result, bail};
use flare_particles::ParticlePass;
use flare_particles::backend::names;
use glam::{Mat4, Vec3, Vec4};
use wgpu::util::DeviceExt;

use crate::render::RenderTarget;

use super::device::{ParticleBuffer, Wgpu};
use super::uniforms::ParticleUniforms;

/// One committed emitter draw.
struct ParticleDraw<'r> {
    bind_group: wgpu::BindGroup,
    index_buffer: &'r wgpu::Buffer,
    index_count: u32,
}

/// Records emitter bindings and draws for one frame.
///
/// Every [`commit`](ParticlePass::commit) snapshots the pending uniforms into
/// its own uniform buffer and bind group, so several emitters can share a
/// pass without overwriting each other's values before the GPU reads them.
pub struct WgpuParticlePass<'r> {
    device: &'r wgpu::Device,
    pipeline: &'r wgpu::RenderPipeline,
    layout: &'r wgpu::BindGroupLayout,

    uniforms: ParticleUniforms,
    index_buffer: Option<&'r wgpu::Buffer>,
    particle_data: Option<&'r wgpu::Buffer>,
    texture: Option<&'r wgpu::TextureView>,
    sampler: Option<&'r wgpu::Sampler>,

    committed: Option<wgpu::BindGroup>,
    draws: Vec<ParticleDraw<'r>>,

    warned_unknown: bool,
    warned_uncommitted: bool,
}

impl<'r> WgpuParticlePass<'r> {
    pub(super) fn new(
        device: &'r wgpu::Device,
        pipeline: &'r wgpu::RenderPipeline,
        layout: &'r wgpu::BindGroupLayout,
    ) -> Self {
        Self {
            device,
            pipeline,
            layout,
            uniforms: ParticleUniforms::default(),
            index_buffer: None,
            particle_data: None,
            texture: None,
            sampler: None,
            committed: None,
            draws: Vec::new(),
            warned_unknown: false,
            warned_uncommitted: false,
        }
    }

    /// Number of draws recorded so far.
    pub fn draw_count(&self) -> usize {
        self.draws.len()
    }

    /// Pending uniform values (what the next commit will upload).
    pub fn uniforms(&self) -> &ParticleUniforms {
        &self.uniforms
    }

    /// Encodes all recorded draws into one render pass over `target`.
    pub fn finish(self, target: &mut RenderTarget<'_>) {
        if self.draws.is_empty() {
            return;
        }

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("flare particle pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(self.pipeline);
        for draw in &self.draws {
            rpass.set_bind_group(0, &draw.bind_group, &[]);
            rpass.set_index_buffer(draw.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..draw.index_count, 0, 0..1);
        }
    }

    fn unknown(&mut self, name: &str) {
        if !self.warned_unknown {
            log::debug!("particle pass: ignoring unknown binding {name:?}");
            self.warned_unknown = true;
        }
    }
}

impl<'r> ParticlePass<'r, Wgpu> for WgpuParticlePass<'r> {
    fn set_index_buffer(&mut self, buffer: &'r wgpu::Buffer) {
        self.index_buffer = Some(buffer);
    }

    fn set_matrix4(&mut self, name: &str, value: Mat4) {
        if !self.uniforms.set_matrix4(name, value) {
            self.unknown(name);
        }
    }

    fn set_float(&mut self, name: &str, value: f32) {
        if !self.uniforms.set_float(name, value) {
            self.unknown(name);
        }
    }

    fn set_float3(&mut self, name: &str, value: Vec3) {
        if !self.uniforms.set_float3(name, value) {
            self.unknown(name);
        }
    }

    fn set_float4(&mut self, name: &str, value: Vec4) {
        if !self.uniforms.set_float4(name, value) {
            self.unknown(name);
        }
    }

    fn set_particle_data(&mut self, name: &str, buffer: &'r ParticleBuffer) {
        match name {
            names::PARTICLE_DATA => self.particle_data = Some(buffer.raw()),
            _ => self.unknown(name),
        }
    }

    fn set_texture(&mut self, name: &str, texture: &'r Arc<wgpu::TextureView>) {
        match name {
            names::PARTICLE_TEXTURE => self.texture = Some(texture.as_ref()),
            _ => self.unknown(name),
        }
    }

    fn set_sampler(&mut self, name: &str, sampler: &'r Arc<wgpu::Sampler>) {
        match name {
            names::PARTICLE_SAMPLER => self.sampler = Some(sampler.as_ref()),
            _ => self.unknown(name),
        }
    }

    fn commit(&mut self) -> Result<()> {
        let (Some(particle_data), Some(texture), Some(sampler)) =
            (self.particle_data, self.texture, self.sampler)
        else {
            bail!("particle pass committed before particle data, texture and sampler were bound");
        };

        let ubo = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("flare particle ubo"),
                contents: bytemuck::bytes_of(&self.uniforms),
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("flare particle bind group"),
            layout: self.layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: ubo.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: particle_data.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(texture),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        self.committed = Some(bind_group);
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32) {
        let (Some(bind_group), Some(index_buffer)) = (self.committed.take(), self.index_buffer)
        else {
            if !self.warned_uncommitted {
                log::warn!("particle pass: draw without a committed bind group or index buffer");
                self.warned_uncommitted = true;
            }
            return;
        };
        if index_count == 0 {
            return;
        }

        self.draws.push(ParticleDraw {
            bind_group,
            index_buffer,
            index_count,
        });
    }
}
