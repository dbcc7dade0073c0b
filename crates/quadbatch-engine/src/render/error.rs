use thiserror::Error;

/// Failures surfaced by the quad renderer instead of being silently ignored.
#[derive(Debug, Error)]
pub enum GraphicsError {
    /// A buffer allocation would exceed the device's maximum buffer size.
    #[error("buffer of {requested} bytes exceeds the device limit of {limit} bytes")]
    BufferTooLarge { requested: u64, limit: u64 },

    /// Texture bytes do not match the declared dimensions.
    #[error("texture data is {actual} bytes, expected {expected}")]
    InvalidTexture { expected: usize, actual: usize },

    /// Texture dimensions exceed the device's 2D texture limit.
    #[error("texture of {width}x{height} exceeds the device limit of {limit} per side")]
    TextureTooLarge { width: u32, height: u32, limit: u32 },

    /// Lookup texel index outside the lookup texture.
    #[error("lookup texel {0} is out of range")]
    InvalidLookupTexel(u32),

    /// The surface could not produce a frame and cannot recover.
    #[error("surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

/// Checks a 2D texture size against `max_texture_dimension_2d`.
pub(super) fn check_texture_size(width: u32, height: u32, limit: u32) -> Result<(), GraphicsError> {
    if width > limit || height > limit {
        return Err(GraphicsError::TextureTooLarge { width, height, limit });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texture_size_limit_is_inclusive() {
        assert!(check_texture_size(8192, 8192, 8192).is_ok());
        assert!(matches!(
            check_texture_size(9000, 1, 8192),
            Err(GraphicsError::TextureTooLarge { width: 9000, height: 1, limit: 8192 })
        ));
        assert!(check_texture_size(1, 8193, 8192).is_err());
    }
}
