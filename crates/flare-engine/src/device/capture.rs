//! Texture → CPU readback.

use std::sync::mpsc;

use anyhow::{Context, Result};

const BYTES_PER_PIXEL: u32 = 4;

/// Row pitch of a `width`-pixel RGBA8 row, rounded up to the copy alignment.
pub(super) fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width * BYTES_PER_PIXEL;
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    unpadded.div_ceil(align) * align
}

/// Drops the per-row padding of a readback buffer.
pub(super) fn unpad_rows(padded: &[u8], width: u32, height: u32, pitch: u32) -> Vec<u8> {
    let row = (width * BYTES_PER_PIXEL) as usize;
    let mut pixels = Vec::with_capacity(row * height as usize);
    for chunk in padded.chunks(pitch as usize).take(height as usize) {
        pixels.extend_from_slice(&chunk[..row]);
    }
    pixels
}

/// Copies an RGBA8 texture into a new image. Blocks until the GPU is done.
pub(super) fn read_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
) -> Result<image::RgbaImage> {
    let (width, height) = (texture.width(), texture.height());
    let pitch = padded_bytes_per_row(width);

    let readback = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("flare capture readback"),
        size: pitch as u64 * height as u64,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("flare capture encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &readback,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(pitch),
                rows_per_image: Some(height),
            },
        },
        texture.size(),
    );
    queue.submit(std::iter::once(encoder.finish()));

    let slice = readback.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device
        .poll(wgpu::PollType::wait_indefinitely())
        .context("failed to wait for capture readback")?;
    rx.recv()
        .context("capture map callback was dropped")?
        .context("failed to map capture readback buffer")?;

    let pixels = {
        let mapped = slice.get_mapped_range();
        unpad_rows(&mapped, width, height, pitch)
    };
    readback.unmap();

    image::RgbaImage::from_raw(width, height, pixels)
        .context("capture size does not match the target texture")
}
