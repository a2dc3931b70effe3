/// Represents a single frame being recorded.
///
/// This object is short-lived: record into `encoder`, then hand it back to
/// [`Gpu::submit`](super::Gpu::submit).
pub struct GpuFrame {
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
