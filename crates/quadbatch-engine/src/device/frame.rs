/// One acquired surface frame plus the encoder recording into it.
///
/// Holding the surface texture blocks acquisition of the next frame; submit
/// promptly through [`Gpu::submit`](super::Gpu::submit).
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
