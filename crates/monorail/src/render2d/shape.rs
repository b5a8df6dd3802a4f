//! Untextured-by-default primitives as a scene component.

use serde::{Deserialize, Serialize};

use super::ellipse::clamp_segments;
use super::renderer::Renderer2d;
use crate::error::ResourceError;
use crate::math::{Color, Transform2d, Vec2};
use crate::render::{RenderBackend, Texture};

/// Geometry in the entity's local space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape2d {
    /// Unit quad, sized by the transform's scale.
    Quad,
    Ellipse {
        radius: f32,
        /// Derived from the on-screen size when `None`. Values outside
        /// `MIN_SEGMENTS..=MAX_SEGMENTS` are clamped at render time.
        segments: Option<u32>,
    },
    Triangle {
        points: [Vec2; 3],
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapeRenderer {
    pub shape: Shape2d,
    pub color: Color,
    pub texture: Option<Texture>,
}

impl ShapeRenderer {
    pub fn new(shape: Shape2d, color: Color) -> Self {
        Self {
            shape,
            color,
            texture: None,
        }
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn render<B: RenderBackend>(
        &self,
        renderer: &mut Renderer2d,
        backend: &mut B,
        world: &Transform2d,
    ) -> Result<(), ResourceError> {
        let texture = self.texture.as_ref();
        match self.shape {
            Shape2d::Quad => renderer.draw_quad(backend, world, self.color, 0.0, texture, None),
            Shape2d::Ellipse { radius, segments } => {
                let segments = segments.map(clamp_segments);
                renderer.draw_ellipse(backend, world, self.color, radius, texture, segments)
            }
            Shape2d::Triangle { points } => {
                let matrix = world.matrix();
                let points = points.map(|p| matrix.transform_point2(p));
                renderer.draw_triangle(backend, &points, &[self.color; 3], texture, None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Mat4;
    use crate::render::HeadlessBackend;
    use crate::render2d::{MAX_SEGMENTS, RendererConfig};

    #[test]
    fn triangle_points_follow_world_transform() {
        let mut backend = HeadlessBackend::new();
        let mut r = Renderer2d::new(&mut backend, RendererConfig::default()).unwrap();
        let shape = ShapeRenderer::new(
            Shape2d::Triangle {
                points: [Vec2::ZERO, Vec2::X, Vec2::Y],
            },
            Color::BLUE,
        );

        r.begin_with(&mut backend, &Mat4::IDENTITY, None);
        let world = Transform2d::from_xy(10.0, 20.0).with_scale(2.0, 3.0);
        shape.render(&mut r, &mut backend, &world).unwrap();

        let positions: Vec<Vec2> = r
            .batcher()
            .vertices()
            .iter()
            .map(|v| v.position().truncate())
            .collect();
        assert_eq!(
            positions,
            vec![Vec2::new(10.0, 20.0), Vec2::new(12.0, 20.0), Vec2::new(10.0, 23.0)]
        );
        r.end(&mut backend).unwrap();
    }

    #[test]
    fn ellipse_and_quad_dispatch() {
        let mut backend = HeadlessBackend::new();
        let mut r = Renderer2d::new(&mut backend, RendererConfig::default()).unwrap();
        r.begin_with(&mut backend, &Mat4::IDENTITY, None);

        ShapeRenderer::new(Shape2d::Quad, Color::WHITE)
            .render(&mut r, &mut backend, &Transform2d::IDENTITY)
            .unwrap();
        ShapeRenderer::new(
            Shape2d::Ellipse {
                radius: 1.0,
                segments: Some(4),
            },
            Color::WHITE,
        )
        .render(&mut r, &mut backend, &Transform2d::IDENTITY)
        .unwrap();

        assert_eq!(r.batcher().vertices().len(), 4 + 5);
        assert_eq!(r.batcher().indices().len(), 6 + 12);
        r.end(&mut backend).unwrap();
    }

    #[test]
    fn loaded_segment_counts_are_clamped() {
        let shape: Shape2d = serde_json::from_str(r#"{"Ellipse":{"radius":1.0,"segments":0}}"#).unwrap();
        let mut backend = HeadlessBackend::new();
        let mut r = Renderer2d::new(&mut backend, RendererConfig::default()).unwrap();
        r.begin_with(&mut backend, &Mat4::IDENTITY, None);

        ShapeRenderer::new(shape, Color::WHITE)
            .render(&mut r, &mut backend, &Transform2d::IDENTITY)
            .unwrap();
        // Two segments: center plus two ring points, two fan triangles.
        assert_eq!(r.batcher().vertices().len(), 3);
        assert_eq!(r.batcher().indices().len(), 6);

        let huge = Shape2d::Ellipse {
            radius: 1.0,
            segments: Some(u32::MAX),
        };
        ShapeRenderer::new(huge, Color::WHITE)
            .render(&mut r, &mut backend, &Transform2d::IDENTITY)
            .unwrap();
        assert_eq!(r.batcher().vertices().len(), 3 + MAX_SEGMENTS as usize + 1);
        r.end(&mut backend).unwrap();
    }
}
