use super::mesh::MeshRenderer;
use crate::camera::{Camera, Camera3d};
use crate::hierarchy::Transforms3d;
use crate::math::Mat4;
use crate::render::{Program, RenderBackend, RenderStats, uniforms};

/// One draw call per mesh, same begin/draw/end protocol as
/// [`Renderer2d`](crate::render2d::Renderer2d).
#[derive(Debug, Default)]
pub struct Renderer3d {
    begun: bool,
    stats: RenderStats,
}

impl Renderer3d {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn is_begun(&self) -> bool {
        self.begun
    }

    pub fn begin<B: RenderBackend>(&mut self, backend: &mut B, camera: &mut Camera3d, transforms: &mut Transforms3d) {
        let projection_view = camera.projection_view(transforms);
        self.begin_with(backend, &projection_view);
    }

    /// # Panics
    ///
    /// If the renderer has already begun.
    pub fn begin_with<B: RenderBackend>(&mut self, backend: &mut B, projection_view: &Mat4) {
        assert!(!self.begun, "Renderer has already begun");
        self.begun = true;
        self.stats = RenderStats::default();
        backend.set_mat4(Program::Mesh3d, uniforms::PROJECTION_VIEW, projection_view);
    }

    /// Draw `mesh` with `model` as its world matrix. The mesh texture, if
    /// any, is bound to slot 0 for the duration of the draw.
    ///
    /// # Panics
    ///
    /// If the renderer hasn't begun.
    pub fn draw_mesh<B: RenderBackend>(&mut self, backend: &mut B, mesh: &MeshRenderer, model: &Mat4) {
        assert!(self.begun, "Renderer hasn't begun");
        if mesh.index_count() == 0 {
            return;
        }

        backend.set_mat4(Program::Mesh3d, uniforms::MODEL, model);
        if let Some(texture) = &mesh.texture {
            backend.bind_texture(0, texture);
        }
        backend.draw_indexed(Program::Mesh3d, mesh.vertex_buffer(), mesh.index_buffer(), mesh.index_count());
        if mesh.texture.is_some() {
            backend.unbind_texture(0);
        }

        self.stats.draw_calls += 1;
        self.stats.primitives += 1;
        self.stats.indices += mesh.index_count();
    }

    /// # Panics
    ///
    /// If the renderer hasn't begun.
    pub fn end(&mut self) {
        assert!(self.begun, "Renderer hasn't begun");
        self.begun = false;
    }
}
