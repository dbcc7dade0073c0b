mod scene;

use anyhow::{Context, Result};
use quadbatch_engine::coords::ColorRgba;
use quadbatch_engine::core::{App, AppControl, FrameCtx};
use quadbatch_engine::device::GpuInit;
use quadbatch_engine::logging::{init_logging, LoggingConfig};
use quadbatch_engine::render::{QuadBatch, QuadRenderer, SyncOutcome};
use quadbatch_engine::window::{Runtime, RuntimeConfig};

use scene::Scene;

/// Every scene starts from transparent black.
const CLEAR: ColorRgba = ColorRgba::transparent();

struct Demo {
    scene: Scene,
    batch: QuadBatch,
    renderer: QuadRenderer,
}

impl Demo {
    fn new(scene: Scene) -> Result<Self> {
        let mut renderer = QuadRenderer::new(scene.capabilities());
        if let Some(sprite) = scene.sprite() {
            renderer
                .set_sprite(sprite.rgba().to_vec(), sprite.width(), sprite.height())
                .context("invalid sprite")?;
        }

        Ok(Self {
            scene,
            batch: QuadBatch::new(scene.batch_config()),
            renderer,
        })
    }
}

impl App for Demo {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        self.batch.set_screen(ctx.viewport());
        self.batch.clear();
        self.scene.fill(&mut self.batch);

        let (batch, renderer) = (&self.batch, &mut self.renderer);
        let control = ctx.render(CLEAR, |rctx, target| renderer.render(rctx, target, batch));

        if let SyncOutcome::Reallocated { capacity } = renderer.last_sync() {
            log::debug!("{:?}: quad storage now holds {capacity} vertices", self.scene);
        }

        control
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let scene = match std::env::args().nth(1) {
        Some(name) => name.parse::<Scene>()?,
        None => Scene::default(),
    };
    log::info!("scene: {scene:?}");

    let demo = Demo::new(scene)?;

    Runtime::run(
        RuntimeConfig {
            title: format!("quadbatch - {}", scene.name()),
            ..RuntimeConfig::default()
        },
        GpuInit::default(),
        demo,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_clear_to_transparent_black() {
        assert_eq!(CLEAR.to_array(), [0.0; 4]);
    }
}
