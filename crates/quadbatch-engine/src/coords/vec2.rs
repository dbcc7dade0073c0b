use core::ops::{Add, Sub};

/// 2D vector in screen pixels.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Rotates `self` around `origin` by `degrees`.
    ///
    /// Applies `[cos, -sin; sin, cos]` to `self - origin`, then translates back.
    /// With +Y pointing down, positive angles turn clockwise on screen.
    #[inline]
    pub fn rotated_about(self, origin: Vec2, degrees: f32) -> Vec2 {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let d = self - origin;
        Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos) + origin
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rotate_quarter_turn() {
        let p = Vec2::new(2.0, 1.0).rotated_about(Vec2::new(1.0, 1.0), 90.0);
        assert_abs_diff_eq!(p.x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(p.y, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn origin_is_fixed_point() {
        let o = Vec2::new(640.0, 360.0);
        let p = o.rotated_about(o, 37.0);
        assert_abs_diff_eq!(p.x, o.x, epsilon = 1e-4);
        assert_abs_diff_eq!(p.y, o.y, epsilon = 1e-4);
    }

    #[test]
    fn negative_angle_undoes_positive() {
        let o = Vec2::new(10.0, -4.0);
        let p = Vec2::new(25.0, 3.0);
        let back = p.rotated_about(o, 60.0).rotated_about(o, -60.0);
        assert_abs_diff_eq!(back.x, p.x, epsilon = 1e-4);
        assert_abs_diff_eq!(back.y, p.y, epsilon = 1e-4);
    }
}
