use std::str::FromStr;

use anyhow::bail;
use quadbatch_engine::coords::ColorRgba;
use quadbatch_engine::render::{BatchConfig, Capabilities, Quad, QuadBatch, SpriteImage};

/// Demo scenes, one per pipeline configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum Scene {
    /// One quad colored from the lookup texture.
    Lookup,
    /// One solid red quad.
    Single,
    /// Rotated, scaled quads in derived group colors, drawn offscreen first.
    Groups,
    /// Textured quads tinted by group color through the offscreen target.
    #[default]
    Silhouette,
}

/// `(x, y, rotation, scale, starts new group)`
type Placement = (f32, f32, f32, f32, bool);

const GROUPS: [Placement; 9] = [
    (-100.0, 100.0, 0.0, 2.0, false),
    (0.0, 0.0, 0.0, 3.0, false),
    (-48.0, -48.0, -12.0, 3.0, true),
    (-148.0, -124.0, 45.0, 3.0, false),
    (64.0, -32.0, -60.0, 2.0, true),
    (0.0, 0.0, 45.0, 1.0, true),
    (100.0, 100.0, 30.0, 3.0, true),
    (130.0, 200.0, 60.0, 2.0, false),
    (200.0, 200.0, 16.0, 1.0, false),
];

const SILHOUETTES: [Placement; 4] = [
    (0.0, 0.0, 0.0, 3.0, true),
    (48.0, 48.0, -12.0, 3.0, true),
    (-48.0, -48.0, 45.0, 3.0, false),
    (64.0, -32.0, -60.0, 2.0, true),
];

pub const SPRITE_SIZE: u32 = 50;

impl Scene {
    pub const NAMES: [&'static str; 4] = ["lookup", "single", "groups", "silhouette"];

    pub fn name(self) -> &'static str {
        match self {
            Scene::Lookup => "lookup",
            Scene::Single => "single",
            Scene::Groups => "groups",
            Scene::Silhouette => "silhouette",
        }
    }

    pub fn capabilities(self) -> Capabilities {
        match self {
            Scene::Lookup => Capabilities::empty(),
            Scene::Single => Capabilities::VERTEX_COLOR,
            Scene::Groups => Capabilities::VERTEX_COLOR | Capabilities::OFFSCREEN,
            Scene::Silhouette => Capabilities::all(),
        }
    }

    pub fn batch_config(self) -> BatchConfig {
        let initial_group_color = match self {
            Scene::Groups => ColorRgba::blue(),
            _ => ColorRgba::red(),
        };
        BatchConfig {
            initial_group_color,
            ..BatchConfig::default()
        }
    }

    /// Appends this frame's quads.
    pub fn fill(self, batch: &mut QuadBatch) {
        match self {
            Scene::Lookup | Scene::Single => batch.add_quad(Quad::sized(0.0, 0.0, 256.0, 256.0)),
            Scene::Groups => place(batch, &GROUPS),
            Scene::Silhouette => place(batch, &SILHOUETTES),
        }
    }

    pub fn sprite(self) -> Option<SpriteImage> {
        (self == Scene::Silhouette).then(disc_sprite)
    }
}

impl FromStr for Scene {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "lookup" => Scene::Lookup,
            "single" => Scene::Single,
            "groups" => Scene::Groups,
            "silhouette" => Scene::Silhouette,
            other => bail!(
                "unknown scene `{other}`; expected one of: {}",
                Scene::NAMES.join(", ")
            ),
        })
    }
}

fn place(batch: &mut QuadBatch, placements: &[Placement]) {
    for &(x, y, rotation, scale, new_group) in placements {
        let quad = Quad::scaled(x, y, scale).rotated(rotation);
        batch.add_quad(if new_group { quad.new_group() } else { quad });
    }
}

/// Light gray disc on a transparent square.
fn disc_sprite() -> SpriteImage {
    let n = SPRITE_SIZE;
    let r = n as f32 / 2.0;
    let mut rgba = Vec::with_capacity((n * n * 4) as usize);
    for y in 0..n {
        for x in 0..n {
            let dx = x as f32 + 0.5 - r;
            let dy = y as f32 + 0.5 - r;
            let inside = dx * dx + dy * dy <= r * r;
            rgba.extend_from_slice(if inside { &[220, 220, 220, 255] } else { &[0, 0, 0, 0] });
        }
    }
    // sizes agree by construction
    SpriteImage::new(n, n, rgba).unwrap_or_else(|_| SpriteImage::white())
}
