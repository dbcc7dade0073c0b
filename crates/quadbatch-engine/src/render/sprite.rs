//! RGBA8 sprite texture sampled by textured quads.

use super::error::{check_texture_size, GraphicsError};

/// Straight-alpha RGBA8 pixels, row-major, top row first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl SpriteImage {
    /// Wraps `rgba`, which must hold exactly `width * height * 4` bytes.
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, GraphicsError> {
        let expected = width as usize * height as usize * 4;
        if expected == 0 || rgba.len() != expected {
            return Err(GraphicsError::InvalidTexture {
                expected,
                actual: rgba.len(),
            });
        }
        Ok(Self { width, height, rgba })
    }

    /// 1x1 opaque white; textured quads then show their vertex color.
    pub fn white() -> Self {
        Self {
            width: 1,
            height: 1,
            rgba: vec![255; 4],
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }
}

pub(super) struct SpriteTexture {
    _texture: wgpu::Texture,
    pub view: wgpu::TextureView,
}

impl SpriteTexture {
    /// Uploads `image`, rejecting sizes the device cannot hold.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &SpriteImage,
    ) -> Result<Self, GraphicsError> {
        check_texture_size(image.width, image.height, device.limits().max_texture_dimension_2d)?;

        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("quadbatch sprite texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
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
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * 4),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Ok(Self { _texture: texture, view })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exact_length() {
        let img = SpriteImage::new(2, 3, vec![0; 24]).unwrap();
        assert_eq!((img.width(), img.height(), img.rgba().len()), (2, 3, 24));
    }

    #[test]
    fn rejects_wrong_length() {
        let err = SpriteImage::new(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(err, GraphicsError::InvalidTexture { expected: 16, actual: 15 }));
    }

    #[test]
    fn rejects_empty_image() {
        assert!(SpriteImage::new(0, 4, Vec::new()).is_err());
    }

    #[test]
    fn white_is_single_opaque_pixel() {
        assert_eq!(SpriteImage::white().rgba(), &[255, 255, 255, 255]);
    }
}
