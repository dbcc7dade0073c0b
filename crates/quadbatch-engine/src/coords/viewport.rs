use super::Vec2;

/// Screen size in pixels.
///
/// The batch treats this as read-only configuration: quad offsets are relative
/// to the screen center, and shaders map `[0, width] x [0, height]` to NDC.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }

    /// Half the screen size, truncated to whole pixels.
    #[inline]
    pub fn half_extents(self) -> Vec2 {
        Vec2::new((self.width / 2.0).trunc(), (self.height / 2.0).trunc())
    }

    /// Size in whole pixels, at least 1x1. Used for render target allocation.
    #[inline]
    pub fn pixel_size(self) -> (u32, u32) {
        (self.width.max(1.0) as u32, self.height.max(1.0) as u32)
    }
}
