use bitflags::bitflags;

use super::batch::Vertex;

bitflags! {
    /// Feature set of a quad pipeline.
    ///
    /// Selects which optional vertex attributes are bound, which shader
    /// variant is used and whether the batch is drawn through an offscreen
    /// silhouette target.
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u8 {
        const TEX_COORDS   = 0b001;
        const VERTEX_COLOR = 0b010;
        const OFFSCREEN    = 0b100;
    }
}

/// Shader variant implied by a capability set.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderVariant {
    /// Position only; color comes from the integer lookup texture.
    Lookup,
    /// Per-vertex color.
    Flat,
    /// Sprite texture, no vertex color.
    Sprite,
    /// Sprite texture tinted by the vertex color wherever both are opaque.
    Silhouette,
}

impl ShaderVariant {
    pub fn source(self) -> &'static str {
        match self {
            ShaderVariant::Lookup => include_str!("shaders/lookup.wgsl"),
            ShaderVariant::Flat => include_str!("shaders/flat.wgsl"),
            ShaderVariant::Sprite => include_str!("shaders/sprite.wgsl"),
            ShaderVariant::Silhouette => include_str!("shaders/silhouette.wgsl"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ShaderVariant::Lookup => "quadbatch lookup shader",
            ShaderVariant::Flat => "quadbatch flat shader",
            ShaderVariant::Sprite => "quadbatch sprite shader",
            ShaderVariant::Silhouette => "quadbatch silhouette shader",
        }
    }
}

pub const POSITION_LOCATION: u32 = 0;
pub const TEX_COORDS_LOCATION: u32 = 1;
pub const COLOR_LOCATION: u32 = 2;

const POSITION_ATTR: wgpu::VertexAttribute = wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x3,
    offset: std::mem::offset_of!(Vertex, pos) as u64,
    shader_location: POSITION_LOCATION,
};

const TEX_COORDS_ATTR: wgpu::VertexAttribute = wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x2,
    offset: std::mem::offset_of!(Vertex, tex_coords) as u64,
    shader_location: TEX_COORDS_LOCATION,
};

const COLOR_ATTR: wgpu::VertexAttribute = wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x4,
    offset: std::mem::offset_of!(Vertex, color) as u64,
    shader_location: COLOR_LOCATION,
};

impl Capabilities {
    pub fn shader_variant(self) -> ShaderVariant {
        match (
            self.contains(Capabilities::TEX_COORDS),
            self.contains(Capabilities::VERTEX_COLOR),
        ) {
            (false, false) => ShaderVariant::Lookup,
            (false, true) => ShaderVariant::Flat,
            (true, false) => ShaderVariant::Sprite,
            (true, true) => ShaderVariant::Silhouette,
        }
    }

    /// Vertex attributes bound for this capability set.
    ///
    /// Stride is always `size_of::<Vertex>()`; disabled attributes are simply
    /// not bound.
    pub fn vertex_attributes(self) -> Vec<wgpu::VertexAttribute> {
        let mut attrs = vec![POSITION_ATTR];
        if self.contains(Capabilities::TEX_COORDS) {
            attrs.push(TEX_COORDS_ATTR);
        }
        if self.contains(Capabilities::VERTEX_COLOR) {
            attrs.push(COLOR_ATTR);
        }
        attrs
    }

    #[inline]
    pub fn uses_lookup_texture(self) -> bool {
        self.shader_variant() == ShaderVariant::Lookup
    }

    #[inline]
    pub fn uses_sprite_texture(self) -> bool {
        self.contains(Capabilities::TEX_COORDS)
    }
}

/// Vertex buffer layout for `attributes`.
pub fn vertex_layout(attributes: &[wgpu::VertexAttribute]) -> wgpu::VertexBufferLayout<'_> {
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locations(caps: Capabilities) -> Vec<u32> {
        caps.vertex_attributes().iter().map(|a| a.shader_location).collect()
    }

    #[test]
    fn position_is_always_bound() {
        assert_eq!(locations(Capabilities::empty()), vec![POSITION_LOCATION]);
        assert_eq!(locations(Capabilities::OFFSCREEN), vec![POSITION_LOCATION]);
    }

    #[test]
    fn optional_attributes_follow_flags() {
        assert_eq!(
            locations(Capabilities::VERTEX_COLOR),
            vec![POSITION_LOCATION, COLOR_LOCATION]
        );
        assert_eq!(
            locations(Capabilities::TEX_COORDS | Capabilities::VERTEX_COLOR),
            vec![POSITION_LOCATION, TEX_COORDS_LOCATION, COLOR_LOCATION]
        );
    }

    #[test]
    fn attribute_offsets_match_vertex_record() {
        let attrs = (Capabilities::TEX_COORDS | Capabilities::VERTEX_COLOR).vertex_attributes();
        let offsets: Vec<u64> = attrs.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 12, 20]);
        assert_eq!(std::mem::size_of::<Vertex>(), 36);
    }

    #[test]
    fn shader_variant_selection() {
        assert_eq!(Capabilities::empty().shader_variant(), ShaderVariant::Lookup);
        assert_eq!(Capabilities::VERTEX_COLOR.shader_variant(), ShaderVariant::Flat);
        assert_eq!(Capabilities::TEX_COORDS.shader_variant(), ShaderVariant::Sprite);
        assert_eq!(
            (Capabilities::all()).shader_variant(),
            ShaderVariant::Silhouette
        );
        // offscreen does not change the shader
        assert_eq!(
            (Capabilities::VERTEX_COLOR | Capabilities::OFFSCREEN).shader_variant(),
            ShaderVariant::Flat
        );
    }

    #[test]
    fn texture_requirements() {
        assert!(Capabilities::empty().uses_lookup_texture());
        assert!(!Capabilities::VERTEX_COLOR.uses_lookup_texture());
        assert!(Capabilities::TEX_COORDS.uses_sprite_texture());
        assert!(!Capabilities::VERTEX_COLOR.uses_sprite_texture());
    }
}
