use crate::coords::ColorRgba;

use super::batch::QuadBatch;
use super::buffers::{GpuBufferPair, SyncOutcome};
use super::caps::{Capabilities, ShaderVariant};
use super::error::GraphicsError;
use super::lookup::{check_texel, LookupTexture, DEFAULT_LOOKUP_TEXEL};
use super::offscreen::{OffscreenTarget, OFFSCREEN_FORMAT};
use super::pipeline::{nearest_sampler, QuadPipeline, QuadUniform};
use super::sprite::{SpriteImage, SpriteTexture};
use super::{RenderCtx, RenderTarget};

/// Draws a [`QuadBatch`] with the pipeline its [`Capabilities`] select.
///
/// GPU resources are created lazily on the first `render` and rebuilt only
/// when their inputs change (surface format, sprite image). Vertex and index
/// storage lives in a [`GpuBufferPair`] and persists across frames.
pub struct QuadRenderer {
    caps: Capabilities,

    pipeline: Option<QuadPipeline>,
    bind_group: Option<wgpu::BindGroup>,
    uniform: Option<wgpu::Buffer>,

    lookup: Option<LookupTexture>,
    lookup_texel: u32,

    sprite_image: SpriteImage,
    sprite: Option<SpriteTexture>,
    sampler: Option<wgpu::Sampler>,

    offscreen: Option<OffscreenTarget>,

    buffers: GpuBufferPair<wgpu::Buffer>,
    last_sync: SyncOutcome,
}

impl QuadRenderer {
    pub fn new(caps: Capabilities) -> Self {
        Self {
            caps,
            pipeline: None,
            bind_group: None,
            uniform: None,
            lookup: None,
            lookup_texel: DEFAULT_LOOKUP_TEXEL,
            sprite_image: SpriteImage::white(),
            sprite: None,
            sampler: None,
            offscreen: None,
            buffers: GpuBufferPair::new(),
            last_sync: SyncOutcome::Skipped,
        }
    }

    #[inline]
    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Vertex capacity of the GPU storage.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffers.capacity()
    }

    /// What the most recent `render` did to the GPU storage.
    #[inline]
    pub fn last_sync(&self) -> SyncOutcome {
        self.last_sync
    }

    #[inline]
    pub fn lookup_texel(&self) -> u32 {
        self.lookup_texel
    }

    /// Replaces the sprite sampled by textured quads.
    pub fn set_sprite(&mut self, rgba: Vec<u8>, width: u32, height: u32) -> Result<(), GraphicsError> {
        self.sprite_image = SpriteImage::new(width, height, rgba)?;
        self.sprite = None;
        self.bind_group = None;
        Ok(())
    }

    /// Selects the lookup texel used when quads carry neither color nor texture.
    pub fn set_lookup_texel(&mut self, index: u32) -> Result<(), GraphicsError> {
        self.lookup_texel = check_texel(index)?;
        Ok(())
    }

    /// Uploads `batch` and draws it into `target`.
    ///
    /// With [`Capabilities::OFFSCREEN`] the batch goes through the silhouette
    /// target (cleared to transparent) and is then composited; otherwise it is
    /// drawn on top of whatever `target` already holds.
    pub fn render(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        batch: &QuadBatch,
    ) -> Result<(), GraphicsError> {
        self.ensure_pipeline(ctx);
        self.ensure_textures(ctx)?;
        self.ensure_bindings(ctx);
        self.write_uniform(ctx, batch);

        self.last_sync = self.buffers.synchronize(ctx, batch)?;

        let index_count = self.buffers.draw_index_count();
        if index_count == 0 {
            return Ok(());
        }

        let Some(quad) = self.pipeline.as_ref() else { return Ok(()) };
        let Some(bind_group) = self.bind_group.as_ref() else { return Ok(()) };
        let Some((vbo, ibo)) = self.buffers.buffers() else { return Ok(()) };

        let draw = BatchDraw {
            pipeline: &quad.pipeline,
            bind_group,
            vbo,
            ibo,
            index_count,
        };

        match self.offscreen.as_mut() {
            Some(offscreen) => {
                let view = offscreen.prepare(ctx.device, ctx.viewport)?;
                draw.encode(
                    target.encoder,
                    view,
                    wgpu::LoadOp::Clear(ColorRgba::transparent().to_wgpu()),
                );
                offscreen.composite(target.encoder, target.color_view);
            }
            None => draw.encode(target.encoder, target.color_view, wgpu::LoadOp::Load),
        }

        Ok(())
    }

    fn ensure_pipeline(&mut self, ctx: &RenderCtx<'_>) {
        let offscreen = self.caps.contains(Capabilities::OFFSCREEN);
        let format = if offscreen {
            OFFSCREEN_FORMAT
        } else {
            ctx.surface_format
        };

        if self.pipeline.as_ref().map(|p| p.format) != Some(format) {
            self.pipeline = Some(QuadPipeline::new(ctx.device, self.caps, format));
            self.bind_group = None;
        }

        if offscreen && self.offscreen.as_ref().map(|o| o.surface_format()) != Some(ctx.surface_format) {
            self.offscreen = Some(OffscreenTarget::new(ctx.device, ctx.surface_format));
        }
    }

    fn ensure_textures(&mut self, ctx: &RenderCtx<'_>) -> Result<(), GraphicsError> {
        if self.caps.uses_lookup_texture() && self.lookup.is_none() {
            self.lookup = Some(LookupTexture::new(ctx.device, ctx.queue));
            self.bind_group = None;
        }

        if self.caps.uses_sprite_texture() {
            if self.sprite.is_none() {
                self.sprite = Some(SpriteTexture::new(ctx.device, ctx.queue, &self.sprite_image)?);
                self.bind_group = None;
            }
            if self.sampler.is_none() {
                self.sampler = Some(nearest_sampler(ctx.device, "quadbatch sprite sampler"));
            }
        }

        Ok(())
    }

    fn ensure_bindings(&mut self, ctx: &RenderCtx<'_>) {
        if self.bind_group.is_some() {
            return;
        }
        let Some(quad) = self.pipeline.as_ref() else { return };

        let uniform = self.uniform.get_or_insert_with(|| {
            ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("quadbatch globals ubo"),
                size: std::mem::size_of::<QuadUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        });

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform.as_entire_binding(),
        }];

        match quad.variant {
            ShaderVariant::Flat => {}
            ShaderVariant::Lookup => {
                let Some(lookup) = self.lookup.as_ref() else { return };
                entries.push(wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&lookup.view),
                });
            }
            ShaderVariant::Sprite | ShaderVariant::Silhouette => {
                let (Some(sprite), Some(sampler)) = (self.sprite.as_ref(), self.sampler.as_ref())
                else {
                    return;
                };
                entries.push(wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&sprite.view),
                });
                entries.push(wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                });
            }
        }

        self.bind_group = Some(ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("quadbatch bind group"),
            layout: &quad.bind_group_layout,
            entries: &entries,
        }));
    }

    fn write_uniform(&self, ctx: &RenderCtx<'_>, batch: &QuadBatch) {
        let Some(ubo) = self.uniform.as_ref() else { return };
        let screen = batch.screen();
        let u = QuadUniform {
            viewport: [screen.width, screen.height],
            lookup_texel: self.lookup_texel,
            _pad: 0,
        };
        ctx.queue.write_buffer(ubo, 0, bytemuck::bytes_of(&u));
    }
}

/// Borrowed state for one indexed draw of the batch.
struct BatchDraw<'a> {
    pipeline: &'a wgpu::RenderPipeline,
    bind_group: &'a wgpu::BindGroup,
    vbo: &'a wgpu::Buffer,
    ibo: &'a wgpu::Buffer,
    index_count: u32,
}

impl BatchDraw<'_> {
    fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        load: wgpu::LoadOp<wgpu::Color>,
    ) {
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("quadbatch pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(self.pipeline);
        rpass.set_bind_group(0, self.bind_group, &[]);
        rpass.set_vertex_buffer(0, self.vbo.slice(..));
        rpass.set_index_buffer(self.ibo.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}
