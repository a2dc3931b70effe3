use std::sync::Arc;

use wgpu::util::DeviceExt;

/// Texture + sampler pair bound to emitters.
///
/// Handles are `Arc`s so one texture can be shared by many emitters; the
/// emitter only holds a clone of the handle.
#[derive(Clone)]
pub struct ParticleTexture {
    pub view: Arc<wgpu::TextureView>,
    pub sampler: Arc<wgpu::Sampler>,
}

impl ParticleTexture {
    /// Edge length of the procedural texture, in pixels.
    pub const SIZE: u32 = 64;

    /// White disc with a quadratic alpha falloff to the edge.
    pub fn soft_disc(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let size = Self::SIZE;
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some("flare soft disc"),
                size: wgpu::Extent3d {
                    width: size,
                    height: size,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &soft_disc_pixels(size),
        );

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("flare particle sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            view: Arc::new(texture.create_view(&wgpu::TextureViewDescriptor::default())),
            sampler: Arc::new(sampler),
        }
    }
}

/// RGBA8 pixels of a `size × size` soft disc.
pub(crate) fn soft_disc_pixels(size: u32) -> Vec<u8> {
    let mut px = Vec::with_capacity((size * size * 4) as usize);
    let half = size as f32 / 2.0;
    for y in 0..size {
        for x in 0..size {
            let dx = (x as f32 + 0.5 - half) / half;
            let dy = (y as f32 + 0.5 - half) / half;
            let d = (dx * dx + dy * dy).sqrt().min(1.0);
            let alpha = (1.0 - d) * (1.0 - d);
            px.extend_from_slice(&[255, 255, 255, (alpha * 255.0).round() as u8]);
        }
    }
    px
}
