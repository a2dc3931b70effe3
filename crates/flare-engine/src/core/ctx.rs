use anyhow::Result;

use crate::device::Gpu;
use crate::render::{RenderCtx, RenderTarget};
use crate::time::FrameTime;

/// Per-frame context passed to `core::App::on_frame`.
pub struct FrameCtx<'a> {
    pub gpu: &'a Gpu,
    pub time: FrameTime,
}

impl<'a> FrameCtx<'a> {
    #[inline]
    pub fn new(gpu: &'a Gpu, time: FrameTime) -> Self {
        Self { gpu, time }
    }

    /// Clears the target with `clear`, calls `draw` with a ready [`RenderCtx`]
    /// and [`RenderTarget`], then submits the frame.
    ///
    /// Nothing is submitted if `draw` fails.
    pub fn render<F>(&mut self, clear: wgpu::Color, draw: F) -> Result<()>
    where
        F: FnOnce(&RenderCtx<'_>, &mut RenderTarget<'_>) -> Result<()>,
    {
        let mut frame = self.gpu.begin_frame();

        // Clear pass, dropped before the encoder is moved into submit().
        {
            let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("flare clear"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view:           &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load:  wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes:         None,
                occlusion_query_set:      None,
                multiview_mask:           None,
            });
        }

        let (width, height) = self.gpu.size();
        let rctx = RenderCtx::new(
            self.gpu.device(),
            self.gpu.queue(),
            self.gpu.target_format(),
            width,
            height,
        );

        // RenderTarget borrows frame.encoder; dropped before submit() takes frame.
        {
            let mut target = RenderTarget::new(&mut frame.encoder, &frame.view);
            draw(&rctx, &mut target)?;
        }

        self.gpu.submit(frame);
        Ok(())
    }
}
