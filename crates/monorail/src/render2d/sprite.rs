//! Sprites: a texture plus the part of it to draw.
//!
//! The source rectangle can be given in either of two conventions and the
//! other is derived:
//!
//! ```text
//!  pixels (image)            UV (GPU)
//!  (0,0)───────▶ x           (0,1)
//!    │  ┌────┐                 ▲  ┌────┐
//!    │  │    │                 │  │    │
//!    ▼  └────┘                 │  └────┘
//!    y                       (0,0)───────▶ u
//! ```

use serde::{Deserialize, Serialize};

use super::renderer::Renderer2d;
use crate::error::ResourceError;
use crate::math::{Color, Rect, Transform2d};
use crate::render::{RenderBackend, Texture};

/// Integer rectangle in texture pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    texture: Texture,
    source: PixelRect,
    uniform_source: Option<Rect>,
}

impl Sprite {
    /// A sprite covering the whole texture.
    pub fn new(texture: Texture) -> Self {
        let mut sprite = Self {
            texture,
            source: PixelRect::default(),
            uniform_source: None,
        };
        sprite.set_uniform_source(None);
        sprite
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Source in pixels. The whole texture when no source was set.
    pub fn source(&self) -> PixelRect {
        self.source
    }

    /// Source in UV space, or `None` for the whole texture.
    pub fn uniform_source(&self) -> Option<Rect> {
        self.uniform_source
    }

    /// Set the source in pixels. `None` selects the whole texture.
    pub fn set_source(&mut self, source: Option<PixelRect>) -> &mut Self {
        let (width, height) = (self.texture.width() as f32, self.texture.height() as f32);
        match source {
            Some(px) => {
                self.uniform_source = Some(Rect::new(
                    px.x as f32 / width,
                    1.0 - (px.y + px.height) as f32 / height,
                    px.width as f32 / width,
                    px.height as f32 / height,
                ));
                self.source = px;
            }
            None => {
                self.uniform_source = None;
                self.source = self.full();
            }
        }
        self
    }

    /// Set the source in UV space. `None` selects the whole texture.
    pub fn set_uniform_source(&mut self, source: Option<Rect>) -> &mut Self {
        self.uniform_source = source;
        self.source = match source {
            Some(uv) => {
                let (width, height) = (self.texture.width(), self.texture.height());
                let top = ((uv.y + uv.height) * height as f32) as u32;
                PixelRect::new(
                    (uv.x * width as f32) as u32,
                    height.saturating_sub(top),
                    (uv.width * width as f32) as u32,
                    (uv.height * height as f32) as u32,
                )
            }
            None => self.full(),
        };
        self
    }

    fn full(&self) -> PixelRect {
        PixelRect::new(0, 0, self.texture.width(), self.texture.height())
    }
}

/// Draws a [`Sprite`] as a quad placed by its entity's transform.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteRenderer {
    pub sprite: Option<Sprite>,
    pub modulate: Color,
    depth: f32,
}

impl Default for SpriteRenderer {
    fn default() -> Self {
        Self {
            sprite: None,
            modulate: Color::WHITE,
            depth: 0.0,
        }
    }
}

impl SpriteRenderer {
    pub fn new(sprite: Sprite) -> Self {
        Self {
            sprite: Some(sprite),
            ..Self::default()
        }
    }

    pub fn from_texture(texture: Texture) -> Self {
        Self::new(Sprite::new(texture))
    }

    pub fn with_modulate(mut self, modulate: Color) -> Self {
        self.modulate = modulate;
        self
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Values outside `[-1, 1]` are ignored.
    pub fn set_depth(&mut self, depth: f32) -> &mut Self {
        if (-1.0..=1.0).contains(&depth) {
            self.depth = depth;
        }
        self
    }

    /// Queue the sprite at `world`. Does nothing without a sprite.
    pub fn render<B: RenderBackend>(
        &self,
        renderer: &mut Renderer2d,
        backend: &mut B,
        world: &Transform2d,
    ) -> Result<(), ResourceError> {
        let Some(sprite) = &self.sprite else {
            return Ok(());
        };
        renderer.draw_quad(
            backend,
            world,
            self.modulate,
            self.depth,
            Some(sprite.texture()),
            sprite.uniform_source(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Mat4;
    use crate::render::HeadlessBackend;
    use crate::render2d::RendererConfig;

    fn texture(backend: &mut HeadlessBackend, width: u32, height: u32) -> Texture {
        let rgba = vec![255; (width * height * 4) as usize];
        backend.create_texture(width, height, &rgba).unwrap()
    }

    #[test]
    fn defaults_to_whole_texture() {
        let mut backend = HeadlessBackend::new();
        let sprite = Sprite::new(texture(&mut backend, 64, 32));
        assert_eq!(sprite.source(), PixelRect::new(0, 0, 64, 32));
        assert_eq!(sprite.uniform_source(), None);
    }

    #[test]
    fn pixel_source_flips_to_uv() {
        let mut backend = HeadlessBackend::new();
        let mut sprite = Sprite::new(texture(&mut backend, 100, 200));
        // Top-left quarter in image space is the upper-left of UV space.
        sprite.set_source(Some(PixelRect::new(0, 0, 50, 100)));
        assert_eq!(sprite.uniform_source(), Some(Rect::new(0.0, 0.5, 0.5, 0.5)));

        sprite.set_source(None);
        assert_eq!(sprite.uniform_source(), None);
        assert_eq!(sprite.source(), PixelRect::new(0, 0, 100, 200));
    }

    #[test]
    fn uv_source_flips_to_pixels() {
        let mut backend = HeadlessBackend::new();
        let mut sprite = Sprite::new(texture(&mut backend, 100, 200));
        sprite.set_uniform_source(Some(Rect::new(0.5, 0.0, 0.5, 0.25)));
        // Bottom strip in UV space is the bottom of the image: y = 200 - 50.
        assert_eq!(sprite.source(), PixelRect::new(50, 150, 50, 50));
    }

    #[test]
    fn depth_ignores_out_of_range() {
        let mut renderer = SpriteRenderer::default();
        renderer.set_depth(0.5);
        assert_eq!(renderer.depth(), 0.5);
        renderer.set_depth(2.0).set_depth(-1.5);
        assert_eq!(renderer.depth(), 0.5);
        renderer.set_depth(-1.0);
        assert_eq!(renderer.depth(), -1.0);
    }

    #[test]
    fn render_queues_textured_quad() {
        let mut backend = HeadlessBackend::new();
        let tex = texture(&mut backend, 4, 4);
        let mut r = Renderer2d::new(&mut backend, RendererConfig::default()).unwrap();

        let mut sprite = Sprite::new(tex);
        sprite.set_uniform_source(Some(Rect::new(0.0, 0.0, 0.5, 0.5)));
        let mut sprite_renderer = SpriteRenderer::new(sprite).with_modulate(Color::RED);
        sprite_renderer.set_depth(0.25);

        r.begin_with(&mut backend, &Mat4::IDENTITY, None);
        sprite_renderer
            .render(&mut r, &mut backend, &Transform2d::IDENTITY)
            .unwrap();
        SpriteRenderer::default()
            .render(&mut r, &mut backend, &Transform2d::IDENTITY)
            .unwrap();

        let vertices = r.batcher().vertices();
        assert_eq!(vertices.len(), 4);
        assert!(vertices.iter().all(|v| v.texture_index == 1));
        assert!(vertices.iter().all(|v| v.color == Color::RED.to_array()));
        assert_eq!(vertices[2].uv, [0.5, 0.5]);
        assert_eq!(vertices[0].position[2], 0.25);
        r.end(&mut backend).unwrap();
    }
}
