//! The frame-scoped 2D renderer.
//!
//! ```text
//! begin(camera) ──▶ draw_quad / draw_triangle / draw_ellipse ... ──▶ end()
//!      │                     │                                       │
//!  upload PV,           cull against bounds,                     flush the
//!  remember bounds      resolve texture slot,                    remaining
//!                       append vertices + indices                batch
//! ```
//!
//! Calling a draw outside `begin`/`end`, or `begin` twice, is a bug in the
//! calling code and panics.

use serde::{Deserialize, Serialize};

use super::batcher::{Batcher, DEFAULT_BATCH_SIZE};
use super::ellipse::{EllipseCache, clamp_segments, default_segments};
use super::slots::TextureSlots;
use super::vertex::{NO_TEXTURE, Vertex2d};
use crate::camera::{Camera, Camera2d};
use crate::error::{ResourceError, ResourceKind};
use crate::hierarchy::Transforms2d;
use crate::math::{Color, Mat4, Rect, Transform2d, Vec2};
use crate::render::{MAX_TEXTURE_SLOTS, Program, RenderBackend, RenderStats, Texture, uniforms};

/// Corners of the unit quad: bottom-left, top-left, top-right, bottom-right.
const QUAD_CORNERS: [Vec2; 4] = [
    Vec2::new(-0.5, -0.5),
    Vec2::new(-0.5, 0.5),
    Vec2::new(0.5, 0.5),
    Vec2::new(0.5, -0.5),
];

/// Two triangles over [`QUAD_CORNERS`]: BL-TL-TR, TR-BR-BL.
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Initial batch capacity in quads. Buffers grow past this on demand.
    pub batch_size: usize,
    /// Texture slots per batch, capped by the backend.
    pub texture_slots: usize,
    /// Skip primitives whose bounding box misses the visible area.
    pub cull: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            texture_slots: MAX_TEXTURE_SLOTS,
            cull: true,
        }
    }
}

pub struct Renderer2d {
    config: RendererConfig,
    batcher: Batcher,
    slots: TextureSlots,
    ellipses: EllipseCache,
    cull_bounds: Option<Rect>,
    begun: bool,
    stats: RenderStats,
}

impl Renderer2d {
    pub fn new<B: RenderBackend>(backend: &mut B, config: RendererConfig) -> Result<Self, ResourceError> {
        let supported = backend.max_texture_slots().min(MAX_TEXTURE_SLOTS);
        if supported == 0 {
            return Err(ResourceError::new(
                ResourceKind::Texture,
                "backend reports no texture slots",
            ));
        }
        let slot_count = config.texture_slots.clamp(1, supported);
        if slot_count != config.texture_slots {
            log::warn!(
                "requested {} texture slots, backend supports {slot_count}",
                config.texture_slots
            );
        }

        let samplers: Vec<i32> = (0..slot_count as i32).collect();
        backend.set_int_array(Program::Sprite2d, uniforms::TEXTURES, &samplers);

        let batcher = Batcher::new(backend, config.batch_size)?;
        log::info!(
            "2D renderer ready: {} quads/batch, {slot_count} texture slots",
            config.batch_size
        );

        Ok(Self {
            config,
            batcher,
            slots: TextureSlots::new(slot_count),
            ellipses: EllipseCache::new(),
            cull_bounds: None,
            begun: false,
            stats: RenderStats::default(),
        })
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn is_begun(&self) -> bool {
        self.begun
    }

    /// Geometry batched since the last flush.
    pub fn batcher(&self) -> &Batcher {
        &self.batcher
    }

    pub fn texture_slots(&self) -> &TextureSlots {
        &self.slots
    }

    pub fn ellipse_cache(&self) -> &EllipseCache {
        &self.ellipses
    }

    // ── Frame protocol ──────────────────────────────────────────────────

    /// Start a frame seen through `camera`. Primitives outside the camera
    /// bounds are culled.
    pub fn begin<B: RenderBackend>(&mut self, backend: &mut B, camera: &mut Camera2d, transforms: &mut Transforms2d) {
        let projection_view = camera.projection_view(transforms);
        let bounds = camera.bounds(transforms);
        self.begin_with(backend, &projection_view, Some(bounds));
    }

    /// Start a frame with an explicit matrix. `cull_bounds` is the visible
    /// world rectangle (e.g. an editor viewport).
    ///
    /// `None` means no culling for this frame: there is no camera to derive
    /// bounds from, and a raw matrix says nothing about the render target.
    /// Callers wanting culling pass the target's rect in world space.
    ///
    /// # Panics
    ///
    /// If the renderer has already begun.
    pub fn begin_with<B: RenderBackend>(&mut self, backend: &mut B, projection_view: &Mat4, cull_bounds: Option<Rect>) {
        assert!(!self.begun, "Renderer has already begun");
        self.begun = true;
        self.batcher.clear();
        self.slots.reset();
        self.stats = RenderStats::default();
        self.cull_bounds = if self.config.cull { cull_bounds } else { None };
        backend.set_mat4(Program::Sprite2d, uniforms::PROJECTION_VIEW, projection_view);
    }

    /// Finish the frame, drawing whatever is still batched.
    ///
    /// # Panics
    ///
    /// If the renderer hasn't begun.
    pub fn end<B: RenderBackend>(&mut self, backend: &mut B) -> Result<(), ResourceError> {
        assert!(self.begun, "Renderer hasn't begun");
        let result = self.flush(backend);
        self.cull_bounds = None;
        self.begun = false;
        result
    }

    /// Draw, clear and release texture slots. The batch is dropped and the
    /// slots released even when the upload fails.
    fn flush<B: RenderBackend>(&mut self, backend: &mut B) -> Result<(), ResourceError> {
        let result = if self.batcher.is_empty() {
            Ok(())
        } else {
            self.batcher.flush_data(backend).map(|()| {
                if self.batcher.draw(backend, Program::Sprite2d) {
                    self.stats.draw_calls += 1;
                }
            })
        };
        if let Err(err) = &result {
            log::error!("dropping {} batched indices: {err}", self.batcher.indices().len());
        }
        self.batcher.clear();
        for slot in 0..self.slots.offset() {
            backend.unbind_texture(slot as u32);
        }
        self.slots.reset();
        result
    }

    // ── Primitives ──────────────────────────────────────────────────────

    /// Draw a unit quad placed by `transform` (a world pose).
    ///
    /// `source` selects a sub-rectangle of the texture in UV space, origin
    /// bottom-left with V up. `None` uses the whole texture.
    pub fn draw_quad<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        transform: &Transform2d,
        color: Color,
        depth: f32,
        texture: Option<&Texture>,
        source: Option<Rect>,
    ) -> Result<(), ResourceError> {
        self.assert_begun();

        let rotation = Vec2::from_angle(transform.rotation);
        let corners = QUAD_CORNERS.map(|c| transform.position + rotation.rotate(c * transform.scale));
        if self.is_culled(&Rect::enclosing(&corners)) {
            return Ok(());
        }

        let src = source.unwrap_or(Rect::UNIT);
        let uvs = [
            Vec2::new(src.x, src.y),
            Vec2::new(src.x, src.y + src.height),
            Vec2::new(src.x + src.width, src.y + src.height),
            Vec2::new(src.x + src.width, src.y),
        ];

        let texture_index = self.batch_texture(backend, texture)?;
        let base = self.batcher.vertex_offset();
        for (corner, uv) in corners.iter().zip(uvs) {
            self.batcher
                .push_vertex(Vertex2d::new(corner.extend(depth), color, uv, texture_index));
        }
        self.batcher.push_indices(&QUAD_INDICES.map(|i| base + i));
        self.record(4, 6);
        Ok(())
    }

    /// Draw a triangle from world-space points.
    ///
    /// Without `uvs`, each corner's UV is its normalized position inside
    /// the triangle's bounding box.
    ///
    /// # Panics
    ///
    /// If `positions`, `colors` or `uvs` don't have exactly 3 elements.
    pub fn draw_triangle<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        positions: &[Vec2],
        colors: &[Color],
        texture: Option<&Texture>,
        uvs: Option<&[Vec2]>,
    ) -> Result<(), ResourceError> {
        self.assert_begun();
        assert_eq!(positions.len(), 3, "a triangle needs 3 positions");
        assert_eq!(colors.len(), 3, "a triangle needs 3 colors");
        if let Some(uvs) = uvs {
            assert_eq!(uvs.len(), 3, "a triangle needs 3 UVs");
        }

        let bbox = Rect::enclosing(positions);
        if self.is_culled(&bbox) {
            return Ok(());
        }

        let texture_index = self.batch_texture(backend, texture)?;
        let base = self.batcher.vertex_offset();
        for i in 0..3 {
            let uv = match uvs {
                Some(uvs) => uvs[i],
                None => normalized_in(&bbox, positions[i]),
            };
            self.batcher
                .push_vertex(Vertex2d::new(positions[i].extend(0.0), colors[i], uv, texture_index));
        }
        self.batcher.push_indices(&[base, base + 1, base + 2]);
        self.record(3, 3);
        Ok(())
    }

    /// Draw an ellipse of `radius` placed by `transform`; the transform's
    /// scale stretches it. `segments` defaults to a count that grows with
    /// the on-screen size. Any count is capped at [`MAX_SEGMENTS`].
    ///
    /// # Panics
    ///
    /// If `segments` is given and less than 2.
    ///
    /// [`MAX_SEGMENTS`]: super::MAX_SEGMENTS
    pub fn draw_ellipse<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        transform: &Transform2d,
        color: Color,
        radius: f32,
        texture: Option<&Texture>,
        segments: Option<u32>,
    ) -> Result<(), ResourceError> {
        self.assert_begun();
        if let Some(segments) = segments {
            assert!(segments >= 2, "an ellipse needs at least 2 segments, got {segments}");
        }

        let axes = transform.scale * radius;
        let (sin, cos) = transform.rotation.sin_cos();
        let half_extent = Vec2::new(
            ((axes.x * cos).powi(2) + (axes.y * sin).powi(2)).sqrt(),
            ((axes.x * sin).powi(2) + (axes.y * cos).powi(2)).sqrt(),
        );
        let bbox = Rect::from_min_max(transform.position - half_extent, transform.position + half_extent);
        if self.is_culled(&bbox) {
            return Ok(());
        }

        let segments = match segments {
            Some(segments) => clamp_segments(segments),
            None => default_segments(radius, transform.scale.abs().max_element()),
        };
        let texture_index = self.batch_texture(backend, texture)?;
        let rotation = Vec2::from_angle(transform.rotation);
        let center = self.batcher.vertex_offset();

        self.batcher.push_vertex(Vertex2d::new(
            transform.position.extend(0.0),
            color,
            Vec2::splat(0.5),
            texture_index,
        ));
        let ring = self.ellipses.ring(segments);
        for point in ring {
            let world = transform.position + rotation.rotate(*point * axes);
            self.batcher
                .push_vertex(Vertex2d::new(world.extend(0.0), color, *point * 0.5 + 0.5, texture_index));
        }
        for i in 0..segments {
            let next = (i + 1) % segments;
            self.batcher
                .push_indices(&[center, center + 1 + i, center + 1 + next]);
        }
        self.record(segments + 1, segments * 3);
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn assert_begun(&self) {
        assert!(self.begun, "Renderer hasn't begun");
    }

    fn is_culled(&mut self, bbox: &Rect) -> bool {
        let culled = self
            .cull_bounds
            .is_some_and(|bounds| !bounds.intersects(bbox));
        if culled {
            self.stats.culled += 1;
        }
        culled
    }

    fn record(&mut self, vertices: u32, indices: u32) {
        self.stats.primitives += 1;
        self.stats.vertices += vertices;
        self.stats.indices += indices;
    }

    /// Vertex texture index for `texture`: 0 for none, otherwise its slot
    /// plus one. Flushes the batch first if every slot is taken.
    fn batch_texture<B: RenderBackend>(&mut self, backend: &mut B, texture: Option<&Texture>) -> Result<u8, ResourceError> {
        let Some(texture) = texture else {
            return Ok(NO_TEXTURE);
        };
        if let Some(slot) = self.slots.find(texture) {
            return Ok(slot as u8 + 1);
        }
        if self.slots.is_full() {
            log::debug!(
                "all {} texture slots in use, flushing batch early",
                self.slots.capacity()
            );
            self.flush(backend)?;
        }
        let slot = self.slots.push(*texture);
        backend.bind_texture(slot as u32, texture);
        Ok(slot as u8 + 1)
    }
}

/// Position of `point` inside `rect`, in `[0, 1]` per axis.
fn normalized_in(rect: &Rect, point: Vec2) -> Vec2 {
    let size = rect.size();
    let axis = |offset: f32, extent: f32| if extent == 0.0 { 0.0 } else { offset / extent };
    let offset = point - rect.min();
    Vec2::new(axis(offset.x, size.x), axis(offset.y, size.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Command, HeadlessBackend};

    fn camera_setup() -> (Transforms2d, Camera2d) {
        let mut transforms = Transforms2d::new();
        let eye = transforms.insert(Transform2d::IDENTITY);
        (transforms, Camera2d::new(eye, Vec2::new(200.0, 200.0)))
    }

    fn renderer(backend: &mut HeadlessBackend) -> Renderer2d {
        Renderer2d::new(backend, RendererConfig::default()).unwrap()
    }

    fn quad_at(x: f32, y: f32, size: f32) -> Transform2d {
        Transform2d::from_xy(x, y).with_scale(size, size)
    }

    fn textures(backend: &mut HeadlessBackend, count: usize) -> Vec<Texture> {
        (0..count)
            .map(|_| backend.create_texture(1, 1, &[255; 4]).unwrap())
            .collect()
    }

    #[test]
    fn single_quad_end_to_end() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        let (mut t, mut cam) = camera_setup();
        assert_eq!(cam.bounds(&mut t), Rect::new(-100.0, -100.0, 200.0, 200.0));

        r.begin(&mut backend, &mut cam, &mut t);
        r.draw_quad(&mut backend, &quad_at(0.0, 0.0, 50.0), Color::WHITE, 0.0, None, None)
            .unwrap();

        let corners: Vec<Vec2> = r
            .batcher()
            .vertices()
            .iter()
            .map(|v| v.position().truncate())
            .collect();
        assert_eq!(
            corners,
            vec![
                Vec2::new(-25.0, -25.0),
                Vec2::new(-25.0, 25.0),
                Vec2::new(25.0, 25.0),
                Vec2::new(25.0, -25.0),
            ]
        );
        assert_eq!(r.batcher().indices(), &[0, 1, 2, 2, 3, 0]);
        assert!(r.batcher().vertices().iter().all(|v| v.texture_index == NO_TEXTURE));

        r.end(&mut backend).unwrap();
        assert_eq!(backend.draws(), vec![(Program::Sprite2d, 6)]);
        assert_eq!(r.stats().draw_calls, 1);
    }

    #[test]
    fn begin_uploads_projection_view_and_samplers() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        let (mut t, mut cam) = camera_setup();
        r.begin(&mut backend, &mut cam, &mut t);
        r.end(&mut backend).unwrap();

        let expected = cam.projection_view(&mut t);
        assert!(backend.commands().iter().any(|c| matches!(
            c,
            Command::SetMat4 { name, value, .. } if name == uniforms::PROJECTION_VIEW && *value == expected
        )));
        assert!(backend.commands().iter().any(|c| matches!(
            c,
            Command::SetIntArray { values, .. } if values.len() == 32 && values[31] == 31
        )));
        assert_eq!(backend.draw_calls(), 0);
    }

    #[test]
    fn offscreen_quad_is_culled() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        let (mut t, mut cam) = camera_setup();
        r.begin(&mut backend, &mut cam, &mut t);

        r.draw_quad(&mut backend, &quad_at(500.0, 500.0, 50.0), Color::RED, 0.0, None, None)
            .unwrap();
        assert_eq!(r.batcher().vertices().len(), 0);
        assert_eq!(r.batcher().indices().len(), 0);

        r.draw_quad(&mut backend, &quad_at(10.0, -10.0, 50.0), Color::RED, 0.0, None, None)
            .unwrap();
        assert_eq!(r.batcher().vertices().len(), 4);
        assert_eq!(r.batcher().indices().len(), 6);

        r.end(&mut backend).unwrap();
        assert_eq!(r.stats().culled, 1);
        assert_eq!(r.stats().primitives, 1);
    }

    #[test]
    fn partially_visible_quad_is_kept() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        let (mut t, mut cam) = camera_setup();
        r.begin(&mut backend, &mut cam, &mut t);
        r.draw_quad(&mut backend, &quad_at(120.0, 0.0, 50.0), Color::RED, 0.0, None, None)
            .unwrap();
        assert_eq!(r.batcher().vertices().len(), 4);
        r.end(&mut backend).unwrap();
    }

    #[test]
    fn culling_disabled_without_bounds() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        r.begin_with(&mut backend, &Mat4::IDENTITY, None);
        r.draw_quad(&mut backend, &quad_at(1.0e6, 0.0, 1.0), Color::RED, 0.0, None, None)
            .unwrap();
        assert_eq!(r.batcher().vertices().len(), 4);
        r.end(&mut backend).unwrap();
        assert_eq!(r.stats().culled, 0);
    }

    #[test]
    fn explicit_bounds_cull_like_a_viewport() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        let viewport = Rect::new(0.0, 0.0, 640.0, 480.0);
        r.begin_with(&mut backend, &Mat4::IDENTITY, Some(viewport));
        r.draw_quad(&mut backend, &quad_at(1.0e6, 0.0, 1.0), Color::RED, 0.0, None, None)
            .unwrap();
        r.draw_quad(&mut backend, &quad_at(320.0, 240.0, 1.0), Color::RED, 0.0, None, None)
            .unwrap();
        assert_eq!(r.batcher().vertices().len(), 4);
        r.end(&mut backend).unwrap();
        assert_eq!(r.stats().culled, 1);
    }

    #[test]
    fn same_texture_reuses_slot() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        let tex = textures(&mut backend, 1)[0];
        let (mut t, mut cam) = camera_setup();
        r.begin(&mut backend, &mut cam, &mut t);

        r.draw_quad(&mut backend, &quad_at(0.0, 0.0, 10.0), Color::WHITE, 0.0, Some(&tex), None)
            .unwrap();
        assert_eq!(r.texture_slots().offset(), 1);
        r.draw_quad(&mut backend, &quad_at(5.0, 0.0, 10.0), Color::WHITE, 0.0, Some(&tex), None)
            .unwrap();
        assert_eq!(r.texture_slots().offset(), 1);

        let indices: Vec<u8> = r.batcher().vertices().iter().map(|v| v.texture_index).collect();
        assert_eq!(indices, vec![1; 8]);
        let binds = backend
            .commands()
            .iter()
            .filter(|c| matches!(c, Command::BindTexture { .. }))
            .count();
        assert_eq!(binds, 1);
        r.end(&mut backend).unwrap();
        assert_eq!(backend.draw_calls(), 1);
    }

    #[test]
    fn thirty_two_textures_fit_one_batch() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        let texs = textures(&mut backend, 32);
        let (mut t, mut cam) = camera_setup();
        r.begin(&mut backend, &mut cam, &mut t);
        for tex in &texs {
            r.draw_quad(&mut backend, &quad_at(0.0, 0.0, 10.0), Color::WHITE, 0.0, Some(tex), None)
                .unwrap();
        }
        assert_eq!(r.batcher().vertices().last().map(|v| v.texture_index), Some(32));
        r.end(&mut backend).unwrap();
        assert_eq!(backend.draw_calls(), 1);
    }

    #[test]
    fn thirty_third_texture_forces_one_flush() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        let texs = textures(&mut backend, 33);
        let (mut t, mut cam) = camera_setup();
        r.begin(&mut backend, &mut cam, &mut t);
        for tex in &texs[..32] {
            r.draw_quad(&mut backend, &quad_at(0.0, 0.0, 10.0), Color::WHITE, 0.0, Some(tex), None)
                .unwrap();
        }
        assert_eq!(backend.draw_calls(), 0);

        r.draw_quad(&mut backend, &quad_at(0.0, 0.0, 10.0), Color::WHITE, 0.0, Some(&texs[32]), None)
            .unwrap();
        assert_eq!(backend.draws(), vec![(Program::Sprite2d, 32 * 6)]);
        // The new texture starts over in slot 0 of a fresh batch.
        assert_eq!(r.texture_slots().offset(), 1);
        assert_eq!(r.batcher().vertices().len(), 4);
        assert_eq!(r.batcher().indices(), &[0, 1, 2, 2, 3, 0]);
        assert!(r.batcher().vertices().iter().all(|v| v.texture_index == 1));

        r.end(&mut backend).unwrap();
        assert_eq!(backend.draws(), vec![(Program::Sprite2d, 192), (Program::Sprite2d, 6)]);
        assert_eq!(r.stats().draw_calls, 2);
    }

    #[test]
    fn backend_slot_limit_is_respected() {
        let mut backend = HeadlessBackend::with_texture_slots(2);
        let mut r = renderer(&mut backend);
        assert_eq!(r.texture_slots().capacity(), 2);
        let texs = textures(&mut backend, 3);
        r.begin_with(&mut backend, &Mat4::IDENTITY, None);
        for tex in &texs {
            r.draw_quad(&mut backend, &quad_at(0.0, 0.0, 1.0), Color::WHITE, 0.0, Some(tex), None)
                .unwrap();
        }
        r.end(&mut backend).unwrap();
        assert_eq!(backend.draw_calls(), 2);
    }

    #[test]
    fn backend_without_texture_slots_is_an_error() {
        let mut backend = HeadlessBackend::with_texture_slots(0);
        let err = Renderer2d::new(&mut backend, RendererConfig::default())
            .err()
            .unwrap();
        assert_eq!(err.kind, ResourceKind::Texture);
        assert!(backend.commands().is_empty());
    }

    #[test]
    fn failed_flush_still_releases_batch() {
        let mut backend = HeadlessBackend::new();
        let config = RendererConfig {
            batch_size: 1,
            ..RendererConfig::default()
        };
        let mut r = Renderer2d::new(&mut backend, config).unwrap();
        let tex = textures(&mut backend, 1)[0];
        backend.set_max_buffer_size(0);

        r.begin_with(&mut backend, &Mat4::IDENTITY, None);
        for x in 0..2 {
            r.draw_quad(&mut backend, &quad_at(x as f32, 0.0, 1.0), Color::WHITE, 0.0, Some(&tex), None)
                .unwrap();
        }
        assert!(r.end(&mut backend).is_err());
        assert!(r.batcher().vertices().is_empty());
        assert!(r.batcher().is_empty());
        assert_eq!(r.texture_slots().offset(), 0);
        assert_eq!(backend.bound_texture(0), None);
        assert_eq!(backend.draw_calls(), 0);
        assert!(!r.is_begun());

        // The next frame starts clean and fits the existing buffers.
        r.begin_with(&mut backend, &Mat4::IDENTITY, None);
        r.draw_quad(&mut backend, &quad_at(0.0, 0.0, 1.0), Color::WHITE, 0.0, Some(&tex), None)
            .unwrap();
        r.end(&mut backend).unwrap();
        assert_eq!(backend.draws(), vec![(Program::Sprite2d, 6)]);
    }

    #[test]
    fn quad_uvs_follow_source() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        r.begin_with(&mut backend, &Mat4::IDENTITY, None);
        let source = Rect::new(0.25, 0.5, 0.25, 0.5);
        r.draw_quad(&mut backend, &quad_at(0.0, 0.0, 1.0), Color::WHITE, 0.5, None, Some(source))
            .unwrap();
        let uvs: Vec<Vec2> = r.batcher().vertices().iter().map(|v| v.uv()).collect();
        assert_eq!(
            uvs,
            vec![
                Vec2::new(0.25, 0.5),
                Vec2::new(0.25, 1.0),
                Vec2::new(0.5, 1.0),
                Vec2::new(0.5, 0.5),
            ]
        );
        assert!(r.batcher().vertices().iter().all(|v| v.position[2] == 0.5));
        r.end(&mut backend).unwrap();
    }

    #[test]
    fn rotated_quad_corners() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        r.begin_with(&mut backend, &Mat4::IDENTITY, None);
        let transform = Transform2d::from_xy(10.0, 0.0)
            .with_scale(2.0, 4.0)
            .with_rotation(std::f32::consts::FRAC_PI_2);
        r.draw_quad(&mut backend, &transform, Color::WHITE, 0.0, None, None)
            .unwrap();
        // Bottom-left (-1, -2) rotated 90° → (2, -1).
        let bl = r.batcher().vertices()[0].position().truncate();
        assert!((bl - Vec2::new(12.0, -1.0)).length() < 1e-5);
        r.end(&mut backend).unwrap();
    }

    #[test]
    fn triangle_generates_uvs_and_culls() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        let (mut t, mut cam) = camera_setup();
        r.begin(&mut backend, &mut cam, &mut t);

        let far = [Vec2::new(300.0, 300.0), Vec2::new(310.0, 300.0), Vec2::new(300.0, 310.0)];
        r.draw_triangle(&mut backend, &far, &[Color::RED; 3], None, None)
            .unwrap();
        assert_eq!(r.batcher().vertices().len(), 0);

        let near = [Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::new(0.0, 20.0)];
        r.draw_triangle(&mut backend, &near, &[Color::RED, Color::GREEN, Color::BLUE], None, None)
            .unwrap();
        let uvs: Vec<Vec2> = r.batcher().vertices().iter().map(|v| v.uv()).collect();
        assert_eq!(uvs, vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)]);
        assert_eq!(r.batcher().indices(), &[0, 1, 2]);
        assert_eq!(r.batcher().vertices()[1].color, Color::GREEN.to_array());
        r.end(&mut backend).unwrap();
    }

    #[test]
    #[should_panic(expected = "3 colors")]
    fn triangle_color_count_mismatch_panics() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        r.begin_with(&mut backend, &Mat4::IDENTITY, None);
        let points = [Vec2::ZERO, Vec2::X, Vec2::Y];
        let _ = r.draw_triangle(&mut backend, &points, &[Color::RED; 2], None, None);
    }

    #[test]
    fn ellipse_fan_and_cache() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        r.begin_with(&mut backend, &Mat4::IDENTITY, None);

        let transform = Transform2d::from_xy(5.0, 5.0);
        r.draw_ellipse(&mut backend, &transform, Color::WHITE, 10.0, None, Some(8))
            .unwrap();
        let first: Vec<Vertex2d> = r.batcher().vertices().to_vec();
        assert_eq!(first.len(), 9);
        assert_eq!(r.batcher().indices().len(), 24);
        assert_eq!(&r.batcher().indices()[21..], &[0, 8, 1]);
        assert!((first[1].position().truncate() - Vec2::new(15.0, 5.0)).length() < 1e-5);

        r.draw_ellipse(&mut backend, &transform, Color::WHITE, 10.0, None, Some(8))
            .unwrap();
        let second = &r.batcher().vertices()[9..];
        assert_eq!(second, first.as_slice());
        assert_eq!(r.ellipse_cache().len(), 1);
        assert_eq!(r.batcher().indices()[24], 9);
        r.end(&mut backend).unwrap();
    }

    #[test]
    fn ellipse_default_segments_scale_with_size() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        r.begin_with(&mut backend, &Mat4::IDENTITY, None);
        r.draw_ellipse(&mut backend, &Transform2d::IDENTITY, Color::WHITE, 1.0, None, None)
            .unwrap();
        // 6 * cbrt(1) = 6 segments → center + 6 ring points.
        assert_eq!(r.batcher().vertices().len(), 7);
        r.end(&mut backend).unwrap();
    }

    #[test]
    fn huge_ellipse_segment_count_is_capped() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        r.begin_with(&mut backend, &Mat4::IDENTITY, None);
        let transform = Transform2d::IDENTITY.with_scale(f32::MAX, f32::MAX);
        r.draw_ellipse(&mut backend, &transform, Color::WHITE, f32::MAX, None, None)
            .unwrap();
        r.draw_ellipse(&mut backend, &Transform2d::IDENTITY, Color::WHITE, 1.0, None, Some(u32::MAX))
            .unwrap();
        let ring = crate::render2d::MAX_SEGMENTS as usize;
        assert_eq!(r.batcher().vertices().len(), 2 * (ring + 1));
        assert_eq!(r.batcher().indices().len(), 2 * ring * 3);
        assert_eq!(r.ellipse_cache().len(), 1);
        r.end(&mut backend).unwrap();
    }

    #[test]
    fn offscreen_ellipse_is_culled() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        let (mut t, mut cam) = camera_setup();
        r.begin(&mut backend, &mut cam, &mut t);
        r.draw_ellipse(&mut backend, &Transform2d::from_xy(0.0, 400.0), Color::WHITE, 50.0, None, Some(32))
            .unwrap();
        assert_eq!(r.batcher().vertices().len(), 0);
        assert!(r.ellipse_cache().is_empty());
        r.end(&mut backend).unwrap();
    }

    #[test]
    fn counters_reset_at_begin() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        for _ in 0..2 {
            r.begin_with(&mut backend, &Mat4::IDENTITY, None);
            r.draw_quad(&mut backend, &quad_at(0.0, 0.0, 1.0), Color::WHITE, 0.0, None, None)
                .unwrap();
            r.end(&mut backend).unwrap();
            assert_eq!(r.stats().draw_calls, 1);
            assert_eq!(r.stats().vertices, 4);
        }
        assert_eq!(backend.draw_calls(), 2);
    }

    #[test]
    #[should_panic(expected = "Renderer has already begun")]
    fn double_begin_panics() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        r.begin_with(&mut backend, &Mat4::IDENTITY, None);
        r.begin_with(&mut backend, &Mat4::IDENTITY, None);
    }

    #[test]
    #[should_panic(expected = "Renderer hasn't begun")]
    fn draw_before_begin_panics() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        let _ = r.draw_quad(&mut backend, &Transform2d::IDENTITY, Color::WHITE, 0.0, None, None);
    }

    #[test]
    #[should_panic(expected = "Renderer hasn't begun")]
    fn end_without_begin_panics() {
        let mut backend = HeadlessBackend::new();
        let mut r = renderer(&mut backend);
        let _ = r.end(&mut backend);
    }
}
