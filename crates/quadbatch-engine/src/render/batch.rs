use bytemuck::{Pod, Zeroable};

use crate::coords::{ColorRgba, Vec2, Viewport};

use super::group_color::GroupColorState;

/// Edge length of a quad at scale 1.0, in pixels.
pub const BASE_QUAD_SIZE: f32 = 50.0;

/// Indices emitted per quad.
pub const INDICES_PER_QUAD: usize = 4;

/// Vertices emitted per quad.
pub const VERTICES_PER_QUAD: usize = 4;

/// Texture coordinates of the four corners, in corner order.
const CORNER_TEX_COORDS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Interleaved vertex record (36 bytes).
///
///  offset  0  pos         [f32; 3]
///  offset 12  tex_coords  [f32; 2]
///  offset 20  color       [f32; 4]
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub tex_coords: [f32; 2],
    pub color: [f32; 4],
}

/// How big a quad is.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum QuadSize {
    /// Explicit width and height in pixels.
    Explicit { width: f32, height: f32 },
    /// Multiplier on [`BASE_QUAD_SIZE`]. Non-positive values are treated as 1.0.
    Scale(f32),
}

impl QuadSize {
    /// Half width and half height, truncated to whole pixels.
    fn half_extents(self) -> Vec2 {
        match self {
            QuadSize::Explicit { width, height } => {
                Vec2::new((width / 2.0).trunc(), (height / 2.0).trunc())
            }
            QuadSize::Scale(scale) => {
                let scale = if scale > 0.0 { scale } else { 1.0 };
                let size = (BASE_QUAD_SIZE * scale).trunc();
                let half = (size / 2.0).trunc();
                Vec2::new(half, half)
            }
        }
    }
}

/// Where a quad's color comes from.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Fill {
    /// Fixed color.
    Solid(ColorRgba),
    /// Color of the current group. `new_group` starts a fresh group first.
    Group { new_group: bool },
}

/// One quad to append to a [`QuadBatch`].
///
/// `center` is an offset from the screen center, in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quad {
    pub center: Vec2,
    pub size: QuadSize,
    pub rotation_degrees: f32,
    pub fill: Fill,
}

impl Quad {
    /// Quad with explicit width and height, solid red, unrotated.
    pub fn sized(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            center: Vec2::new(x, y),
            size: QuadSize::Explicit { width, height },
            rotation_degrees: 0.0,
            fill: Fill::Solid(ColorRgba::red()),
        }
    }

    /// Square of `scale * BASE_QUAD_SIZE` pixels, continuing the current group.
    pub fn scaled(x: f32, y: f32, scale: f32) -> Self {
        Self {
            center: Vec2::new(x, y),
            size: QuadSize::Scale(scale),
            rotation_degrees: 0.0,
            fill: Fill::Group { new_group: false },
        }
    }

    pub fn rotated(mut self, degrees: f32) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    pub fn color(mut self, color: ColorRgba) -> Self {
        self.fill = Fill::Solid(color);
        self
    }

    /// Makes this quad start a new color group.
    pub fn new_group(mut self) -> Self {
        self.fill = Fill::Group { new_group: true };
        self
    }
}

/// Batch configuration.
#[derive(Debug, Clone, Copy)]
pub struct BatchConfig {
    /// Screen size; quad centers are offsets from its midpoint.
    pub screen: Viewport,
    /// Group color used until the first quad starts a new group.
    pub initial_group_color: ColorRgba,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            screen: Viewport::new(1280.0, 720.0),
            initial_group_color: ColorRgba::red(),
        }
    }
}

/// Per-frame quad geometry.
///
/// Clear it at the start of a frame, append quads, then hand it to
/// [`GpuBufferPair::synchronize`](super::GpuBufferPair::synchronize) (or a
/// [`QuadRenderer`](super::QuadRenderer)). Allocated capacity is kept across
/// frames.
#[derive(Debug, Clone)]
pub struct QuadBatch {
    screen: Viewport,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    groups: GroupColorState,
}

impl QuadBatch {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            screen: config.screen,
            vertices: Vec::new(),
            indices: Vec::new(),
            groups: GroupColorState::new(config.initial_group_color),
        }
    }

    /// Drops all geometry and resets the group color state.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.groups.reset();
    }

    #[inline]
    pub fn screen(&self) -> Viewport {
        self.screen
    }

    /// Updates the screen size used for subsequent quads (e.g. after a resize).
    ///
    /// Degenerate sizes (a minimized window reports 0x0) keep the previous
    /// screen; returns whether `screen` was taken.
    pub fn set_screen(&mut self, screen: Viewport) -> bool {
        if !screen.is_valid() {
            log::debug!("ignoring degenerate screen {}x{}", screen.width, screen.height);
            return false;
        }
        self.screen = screen;
        true
    }

    /// Appends four vertices and four indices for `quad`.
    pub fn add_quad(&mut self, quad: Quad) {
        let half = quad.size.half_extents();
        let center = quad.center + self.screen.half_extents();

        let top_left = center - half;
        let bottom_right = center + half;
        let corners = [
            top_left,
            Vec2::new(bottom_right.x, top_left.y),
            bottom_right,
            Vec2::new(top_left.x, bottom_right.y),
        ];

        // Rotation origin is the corner-derived center, which matches `center`
        // because the half extents are already whole pixels.
        let origin = top_left + half;

        let color = match quad.fill {
            Fill::Solid(c) => c,
            Fill::Group { new_group: true } => self.groups.advance(),
            Fill::Group { new_group: false } => self.groups.current(),
        }
        .to_array();

        let first = self.vertices.len() as u32;

        for (corner, tex_coords) in corners.into_iter().zip(CORNER_TEX_COORDS) {
            let p = if quad.rotation_degrees == 0.0 {
                corner
            } else {
                corner.rotated_about(origin, quad.rotation_degrees)
            };
            self.vertices.push(Vertex {
                pos: [p.x, p.y, 0.0],
                tex_coords,
                color,
            });
        }

        self.indices.extend(first..first + INDICES_PER_QUAD as u32);
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Quad indices, four per quad.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of quad indices (four per quad).
    #[inline]
    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / VERTICES_PER_QUAD
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn group_counter(&self) -> u32 {
        self.groups.counter()
    }
}

impl Default for QuadBatch {
    fn default() -> Self {
        Self::new(BatchConfig::default())
    }
}

/// Triangle-list indices drawn per quad.
pub const TRIANGLE_INDICES_PER_QUAD: usize = 6;

/// Expands quad indices `a, b, c, d` into triangles `a, b, c, a, c, d`.
///
/// wgpu has no quad primitive. Trailing indices that do not form a full quad
/// are ignored.
pub fn triangulate_quads(quad_indices: &[u32], out: &mut Vec<u32>) {
    out.clear();
    out.reserve(quad_indices.len() / INDICES_PER_QUAD * TRIANGLE_INDICES_PER_QUAD);
    for q in quad_indices.chunks_exact(INDICES_PER_QUAD) {
        out.extend_from_slice(&[q[0], q[1], q[2], q[0], q[2], q[3]]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn batch() -> QuadBatch {
        QuadBatch::new(BatchConfig::default())
    }

    fn corners(b: &QuadBatch, quad: usize) -> Vec<(f32, f32)> {
        b.vertices()[quad * 4..quad * 4 + 4]
            .iter()
            .map(|v| (v.pos[0], v.pos[1]))
            .collect()
    }

    fn assert_corners_eq(actual: &[(f32, f32)], expected: &[(f32, f32)]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(a.0, e.0, epsilon = 1e-3);
            assert_abs_diff_eq!(a.1, e.1, epsilon = 1e-3);
        }
    }

    // ── indices ───────────────────────────────────────────────────────────

    #[test]
    fn each_quad_appends_four_sequential_indices() {
        let mut b = batch();
        for i in 0..5 {
            let n = b.vertex_count() as u32;
            b.add_quad(Quad::scaled(i as f32 * 10.0, 0.0, 1.0).rotated(i as f32 * 15.0));
            assert_eq!(b.vertex_count(), (i + 1) * 4);
            assert_eq!(b.index_count(), (i + 1) * 4);
            assert_eq!(&b.indices()[i * 4..], &[n, n + 1, n + 2, n + 3]);
        }
        assert_eq!(b.quad_count(), 5);
    }

    #[test]
    fn clear_empties_geometry() {
        let mut b = batch();
        b.add_quad(Quad::sized(0.0, 0.0, 10.0, 10.0));
        b.clear();
        assert!(b.is_empty());
        assert_eq!(b.index_count(), 0);

        b.add_quad(Quad::sized(0.0, 0.0, 10.0, 10.0));
        assert_eq!(b.indices(), &[0, 1, 2, 3]);
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn centered_256_quad_on_720p() {
        let mut b = batch();
        b.add_quad(Quad::sized(0.0, 0.0, 256.0, 256.0));
        assert_corners_eq(
            &corners(&b, 0),
            &[(512.0, 232.0), (768.0, 232.0), (768.0, 488.0), (512.0, 488.0)],
        );
        assert!(b.vertices().iter().all(|v| v.pos[2] == 0.0));
    }

    #[test]
    fn zero_rotation_keeps_axis_aligned_corners() {
        let mut b = batch();
        b.add_quad(Quad::scaled(-48.0, 48.0, 3.0).rotated(0.0));
        // 150 px square, half 75, centered at (640 - 48, 360 + 48)
        assert_corners_eq(
            &corners(&b, 0),
            &[(517.0, 333.0), (667.0, 333.0), (667.0, 483.0), (517.0, 483.0)],
        );
    }

    #[test]
    fn full_turn_matches_no_rotation() {
        let mut b = batch();
        b.add_quad(Quad::scaled(64.0, -32.0, 2.0));
        b.add_quad(Quad::scaled(64.0, -32.0, 2.0).rotated(360.0));
        assert_corners_eq(&corners(&b, 1), &corners(&b, 0));
    }

    #[test]
    fn rotation_keeps_center_and_edge_length() {
        let mut b = batch();
        b.add_quad(Quad::scaled(100.0, 100.0, 3.0).rotated(30.0));
        let c = corners(&b, 0);

        let cx = c.iter().map(|p| p.0).sum::<f32>() / 4.0;
        let cy = c.iter().map(|p| p.1).sum::<f32>() / 4.0;
        assert_abs_diff_eq!(cx, 740.0, epsilon = 1e-3);
        assert_abs_diff_eq!(cy, 460.0, epsilon = 1e-3);

        let edge = ((c[1].0 - c[0].0).powi(2) + (c[1].1 - c[0].1).powi(2)).sqrt();
        assert_abs_diff_eq!(edge, 150.0, epsilon = 1e-3);
    }

    #[test]
    fn quarter_turn_moves_top_left_to_top_right() {
        let mut b = batch();
        b.add_quad(Quad::sized(0.0, 0.0, 100.0, 100.0).rotated(90.0));
        // +Y is down, so a positive turn is clockwise on screen.
        assert_corners_eq(
            &corners(&b, 0),
            &[(690.0, 310.0), (690.0, 410.0), (590.0, 410.0), (590.0, 310.0)],
        );
    }

    #[test]
    fn non_positive_scale_is_treated_as_one() {
        let mut b = batch();
        b.add_quad(Quad::scaled(0.0, 0.0, 0.0));
        b.add_quad(Quad::scaled(0.0, 0.0, -4.0));
        b.add_quad(Quad::scaled(0.0, 0.0, 1.0));
        let expected = [(615.0, 335.0), (665.0, 335.0), (665.0, 385.0), (615.0, 385.0)];
        for q in 0..3 {
            assert_corners_eq(&corners(&b, q), &expected);
        }
    }

    #[test]
    fn sizes_truncate_to_whole_pixels() {
        let mut b = batch();
        // 50 * 1.5 = 75 px, half truncates to 37
        b.add_quad(Quad::scaled(0.0, 0.0, 1.5));
        assert_corners_eq(
            &corners(&b, 0),
            &[(603.0, 323.0), (677.0, 323.0), (677.0, 397.0), (603.0, 397.0)],
        );
    }

    #[test]
    fn screen_size_moves_the_origin() {
        let mut b = QuadBatch::new(BatchConfig {
            screen: Viewport::new(800.0, 600.0),
            ..BatchConfig::default()
        });
        b.add_quad(Quad::sized(0.0, 0.0, 100.0, 100.0));
        assert_eq!(corners(&b, 0)[0], (350.0, 250.0));

        b.set_screen(Viewport::new(200.0, 200.0));
        b.add_quad(Quad::sized(0.0, 0.0, 100.0, 100.0));
        assert_eq!(corners(&b, 1)[0], (50.0, 50.0));
    }

    #[test]
    fn tex_coords_follow_corner_order() {
        let mut b = batch();
        b.add_quad(Quad::scaled(0.0, 0.0, 1.0).rotated(45.0));
        let uvs: Vec<[f32; 2]> = b.vertices().iter().map(|v| v.tex_coords).collect();
        assert_eq!(uvs, CORNER_TEX_COORDS.to_vec());
    }

    // ── color ─────────────────────────────────────────────────────────────

    #[test]
    fn solid_color_is_replicated() {
        let mut b = batch();
        let c = ColorRgba::new(0.25, 0.5, 0.75, 1.0);
        b.add_quad(Quad::sized(0.0, 0.0, 10.0, 10.0).color(c));
        assert!(b.vertices().iter().all(|v| v.color == c.to_array()));
        assert_eq!(b.group_counter(), 0);
    }

    #[test]
    fn groups_advance_only_on_new_group() {
        let mut b = QuadBatch::new(BatchConfig {
            initial_group_color: ColorRgba::blue(),
            ..BatchConfig::default()
        });

        b.add_quad(Quad::scaled(0.0, 0.0, 1.0));
        b.add_quad(Quad::scaled(0.0, 0.0, 1.0).new_group());
        b.add_quad(Quad::scaled(0.0, 0.0, 1.0));
        b.add_quad(Quad::scaled(0.0, 0.0, 1.0).new_group());

        let color_of = |q: usize| b.vertices()[q * 4].color;
        let group1 = ColorRgba::from_rgba8([0, 190, 0, 255]).to_array();
        let group2 = ColorRgba::from_rgba8([0, 125, 189, 255]).to_array();

        assert_eq!(color_of(0), ColorRgba::blue().to_array());
        assert_eq!(color_of(1), group1);
        assert_eq!(color_of(2), group1);
        assert_eq!(color_of(3), group2);
        assert_eq!(b.group_counter(), 2);

        b.clear();
        assert_eq!(b.group_counter(), 0);
        b.add_quad(Quad::scaled(0.0, 0.0, 1.0));
        assert_eq!(b.vertices()[0].color, ColorRgba::blue().to_array());
    }

    // ── triangulation ─────────────────────────────────────────────────────

    #[test]
    fn triangulate_two_quads() {
        let mut out = vec![99];
        triangulate_quads(&[0, 1, 2, 3, 4, 5, 6, 7], &mut out);
        assert_eq!(out, vec![0, 1, 2, 0, 2, 3, 4, 5, 6, 4, 6, 7]);
    }

    #[test]
    fn triangulate_ignores_partial_quad() {
        let mut out = Vec::new();
        triangulate_quads(&[0, 1, 2, 3, 4, 5], &mut out);
        assert_eq!(out, vec![0, 1, 2, 0, 2, 3]);
    }

    #[test]
    fn degenerate_screen_is_ignored() {
        let mut b = batch();
        assert!(!b.set_screen(Viewport::new(0.0, 0.0)));
        assert!(!b.set_screen(Viewport::new(f32::NAN, 720.0)));
        assert_eq!(b.screen(), Viewport::new(1280.0, 720.0));

        assert!(b.set_screen(Viewport::new(800.0, 600.0)));
        assert_eq!(b.screen(), Viewport::new(800.0, 600.0));
    }
}
