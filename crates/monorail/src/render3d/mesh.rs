//! # Meshes
//!
//! A [`Mesh`] is CPU-side geometry. A [`MeshRenderer`] is the component that
//! owns the mesh's GPU buffers and an optional texture; it is created once
//! and drawn every frame without re-uploading.
//!
//! ## Winding Order
//!
//! Front faces are counter-clockwise when seen from outside, matching
//! `FrontFace::Ccw` with back-face culling. The cube's six faces are built
//! from `(normal, u, v)` frames with `u × v = normal`, so walking the
//! corners `(-,-) (+,-) (+,+) (-,+)` in the face plane is always CCW from
//! the outside.

use bytemuck::{Pod, Zeroable};

use crate::error::ResourceError;
use crate::math::Vec3;
use crate::render::{BufferId, BufferKind, RenderBackend, Texture};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Origin bottom-left, V up.
    pub uv: [f32; 2],
}

impl MeshVertex {
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2],
    };
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<MeshVertex>,
    indices: Vec<u32>,
}

impl Mesh {
    /// # Panics
    ///
    /// If an index refers past the end of `vertices`.
    pub fn new(vertices: Vec<MeshVertex>, indices: Vec<u32>) -> Self {
        assert!(
            indices.iter().all(|i| (*i as usize) < vertices.len()),
            "mesh index out of range ({} vertices)",
            vertices.len()
        );
        Self { vertices, indices }
    }

    /// A mesh drawn as a plain triangle list, three vertices per triangle.
    pub fn from_vertices(vertices: Vec<MeshVertex>) -> Self {
        let indices = (0..vertices.len() as u32).collect();
        Self { vertices, indices }
    }

    /// Unit cube centered on the origin: 24 vertices (4 per face so each
    /// face has its own normal) and 36 indices.
    pub fn cube() -> Self {
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        ];
        let corners = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];

        let mut vertices = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, u, v) in faces {
            let base = vertices.len() as u32;
            for [cu, cv] in corners {
                let position = (normal + u * cu + v * cv) * 0.5;
                vertices.push(MeshVertex {
                    position: position.to_array(),
                    normal: normal.to_array(),
                    uv: [(cu + 1.0) * 0.5, (cv + 1.0) * 0.5],
                });
            }
            indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        Self { vertices, indices }
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
}

/// GPU-resident mesh plus optional texture.
#[derive(Debug)]
pub struct MeshRenderer {
    vertex_buffer: BufferId,
    index_buffer: BufferId,
    index_count: u32,
    pub texture: Option<Texture>,
}

impl MeshRenderer {
    /// Upload `mesh` into new backend buffers.
    pub fn new<B: RenderBackend>(backend: &mut B, mesh: &Mesh) -> Result<Self, ResourceError> {
        let vertex_bytes: &[u8] = bytemuck::cast_slice(mesh.vertices());
        let index_bytes: &[u8] = bytemuck::cast_slice(mesh.indices());

        let vertex_buffer = backend.create_buffer(BufferKind::Vertex, vertex_bytes.len().max(4) as u64)?;
        let index_buffer = match backend.create_buffer(BufferKind::Index, index_bytes.len().max(4) as u64) {
            Ok(buffer) => buffer,
            Err(e) => {
                backend.destroy_buffer(vertex_buffer);
                return Err(e);
            }
        };
        if !vertex_bytes.is_empty() {
            backend.upload_buffer(vertex_buffer, 0, vertex_bytes);
        }
        if !index_bytes.is_empty() {
            backend.upload_buffer(index_buffer, 0, index_bytes);
        }

        Ok(Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices().len() as u32,
            texture: None,
        })
    }

    pub fn with_texture(mut self, texture: Texture) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn vertex_buffer(&self) -> BufferId {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> BufferId {
        self.index_buffer
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    /// Release the GPU buffers. The texture is not owned and stays alive.
    pub fn destroy<B: RenderBackend>(self, backend: &mut B) {
        backend.destroy_buffer(self.vertex_buffer);
        backend.destroy_buffer(self.index_buffer);
    }
}
