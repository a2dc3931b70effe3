use anyhow::{Context, Result};

use super::capture;
use super::frame::GpuFrame;
use super::init::GpuInit;

/// Owns wgpu core objects and the offscreen color target.
///
/// This type is the low-level rendering context:
/// - creates and stores Instance/Adapter/Device/Queue
/// - owns the texture every frame renders into
/// - acquires frames and provides an encoder + view for rendering
pub struct Gpu {
    /// Kept alive for the lifetime of the adapter.
    #[allow(dead_code)]
    instance: wgpu::Instance,

    /// Selected adapter.
    adapter: wgpu::Adapter,

    /// Logical device.
    device: wgpu::Device,

    /// Command queue.
    queue: wgpu::Queue,

    /// Offscreen color target.
    target: wgpu::Texture,

    format: wgpu::TextureFormat,
}

impl Gpu {
    /// Creates a headless GPU context with a `width × height` target.
    ///
    /// Adapter/device acquisition is asynchronous under wgpu.
    pub async fn new(init: GpuInit, width: u32, height: u32) -> Result<Self> {
        anyhow::ensure!(width > 0 && height > 0, "render target has zero size");

        // Use all backends to allow wgpu to select the optimal platform backend.
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: None,
                force_fallback_adapter: init.force_fallback_adapter,
            })
            .await
            .context("failed to find a suitable GPU adapter")?;

        let info = adapter.get_info();
        log::info!("using adapter {:?} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("flare-engine device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create wgpu device/queue")?;

        let format = init.target_format();
        let target = create_target(&device, format, width, height);

        Ok(Gpu {
            instance,
            adapter,
            device,
            queue,
            target,
            format,
        })
    }

    /// Blocking wrapper around [`Gpu::new`].
    pub fn new_blocking(init: GpuInit, width: u32, height: u32) -> Result<Self> {
        pollster::block_on(Self::new(init, width, height))
    }

    /// Returns the target format.
    pub fn target_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Returns the target size in pixels.
    pub fn size(&self) -> (u32, u32) {
        (self.target.width(), self.target.height())
    }

    pub fn adapter_info(&self) -> wgpu::AdapterInfo {
        self.adapter.get_info()
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Recreates the target at a new size. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.size() {
            return;
        }
        self.target = create_target(&self.device, self.format, width, height);
    }

    /// Creates a view of the target and an encoder for this frame.
    pub fn begin_frame(&self) -> GpuFrame {
        let view = self
            .target
            .create_view(&wgpu::TextureViewDescriptor::default());

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("flare frame encoder"),
            });

        GpuFrame { view, encoder }
    }

    /// Submits the recorded commands for the given frame.
    pub fn submit(&self, frame: GpuFrame) {
        self.queue.submit(std::iter::once(frame.encoder.finish()));
    }

    /// Reads the current target contents back to the CPU.
    pub fn capture(&self) -> Result<image::RgbaImage> {
        let image = capture::read_texture(&self.device, &self.queue, &self.target)?;
        log::info!("captured {}x{} frame", image.width(), image.height());
        Ok(image)
    }
}

fn create_target(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> wgpu::Texture {
    device.create_texture(&wgpu::TextureDescriptor {
        label: Some("flare offscreen target"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}
