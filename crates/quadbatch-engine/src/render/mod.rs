//! Quad batching and GPU rendering.
//!
//! Convention:
//! - CPU geometry is in pixels (top-left origin, +Y down).
//! - Vertex shaders convert to NDC using a viewport uniform.

mod batch;
mod buffers;
mod caps;
mod ctx;
mod error;
mod group_color;
mod lookup;
mod offscreen;
mod pipeline;
mod renderer;
mod sprite;

pub use batch::{
    triangulate_quads, BatchConfig, Fill, Quad, QuadBatch, QuadSize, Vertex, BASE_QUAD_SIZE,
    INDICES_PER_QUAD, TRIANGLE_INDICES_PER_QUAD, VERTICES_PER_QUAD,
};
pub use buffers::{BufferDevice, BufferKind, GpuBufferPair, SyncOutcome};
pub use caps::{vertex_layout, Capabilities, ShaderVariant};
pub use ctx::{RenderCtx, RenderTarget};
pub use error::GraphicsError;
pub use group_color::{derive_group_color, GroupColorState};
pub use lookup::{LOOKUP_DATA, LOOKUP_TEXELS};
pub use offscreen::OFFSCREEN_FORMAT;
pub use renderer::QuadRenderer;
pub use sprite::SpriteImage;
