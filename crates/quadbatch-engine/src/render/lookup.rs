//! Integer lookup texture: one red, one green and one blue texel.

use super::error::GraphicsError;

/// Texels in the lookup texture.
pub const LOOKUP_TEXELS: u32 = 3;

const FULL: i32 = i32::MAX;

/// Texel data, RGBA per texel: red, green, blue.
pub const LOOKUP_DATA: [[i32; 4]; LOOKUP_TEXELS as usize] = [
    [FULL, 0, 0, FULL],
    [0, FULL, 0, FULL],
    [0, 0, FULL, FULL],
];

/// Texel sampled when nothing else was selected (red).
pub const DEFAULT_LOOKUP_TEXEL: u32 = 0;

/// Validates a texel index for the lookup shader.
pub fn check_texel(index: u32) -> Result<u32, GraphicsError> {
    if index < LOOKUP_TEXELS {
        Ok(index)
    } else {
        Err(GraphicsError::InvalidLookupTexel(index))
    }
}

/// GPU copy of [`LOOKUP_DATA`] (`Rgba32Sint`, 3x1, read with `textureLoad`).
pub(super) struct LookupTexture {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl LookupTexture {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let size = wgpu::Extent3d {
            width: LOOKUP_TEXELS,
            height: 1,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("quadbatch lookup texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Sint,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&LOOKUP_DATA),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(LOOKUP_TEXELS * std::mem::size_of::<[i32; 4]>() as u32),
                rows_per_image: Some(1),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { _texture: texture, view }
    }
}
