//! # Batcher — CPU Staging for One Draw Call
//!
//! Geometry is appended to plain `Vec`s while a frame is being recorded.
//! Nothing touches the GPU until the renderer flushes, at which point the
//! whole batch goes up in one upload per buffer and is drawn with a single
//! indexed draw call.
//!
//! ```text
//! push_vertices / push_indices      (CPU only, any number of times)
//!            │
//!            ▼
//!       flush_data ──▶ grow GPU buffers if needed, upload both arrays
//!            │
//!            ▼
//!          draw ─────▶ one draw_indexed over the flushed indices
//!            │
//!            ▼
//!          clear ────▶ empty the Vecs, keep their capacity
//! ```
//!
//! The three steps always run together. Indices are relative to the first
//! vertex of the current batch, so a partial cycle would leave indices
//! pointing at the wrong vertices.
//!
//! GPU buffers only ever grow. When a batch outgrows them they are
//! reallocated to the next power of two of the required size.

use super::vertex::Vertex2d;
use crate::error::ResourceError;
use crate::render::{BufferId, BufferKind, Program, RenderBackend};

/// Default batch capacity in quads.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

const VERTEX_SIZE: u64 = std::mem::size_of::<Vertex2d>() as u64;
const INDEX_SIZE: u64 = std::mem::size_of::<u32>() as u64;

pub struct Batcher {
    vertices: Vec<Vertex2d>,
    indices: Vec<u32>,
    vertex_buffer: BufferId,
    index_buffer: BufferId,
    flushed_indices: u32,
}

impl Batcher {
    /// Create a batcher whose GPU buffers initially hold `quads` quads.
    pub fn new<B: RenderBackend>(backend: &mut B, quads: usize) -> Result<Self, ResourceError> {
        let quads = quads.max(1);
        let vertex_buffer = backend.create_buffer(BufferKind::Vertex, quads as u64 * 4 * VERTEX_SIZE)?;
        let index_buffer = backend.create_buffer(BufferKind::Index, quads as u64 * 6 * INDEX_SIZE)?;
        Ok(Self {
            vertices: Vec::with_capacity(quads * 4),
            indices: Vec::with_capacity(quads * 6),
            vertex_buffer,
            index_buffer,
            flushed_indices: 0,
        })
    }

    pub fn push_vertices(&mut self, vertices: &[Vertex2d]) {
        self.vertices.extend_from_slice(vertices);
    }

    pub fn push_vertex(&mut self, vertex: Vertex2d) {
        self.vertices.push(vertex);
    }

    /// Indices are relative to the start of the batch; use
    /// [`vertex_offset`](Self::vertex_offset) before pushing vertices to
    /// find the base.
    pub fn push_indices(&mut self, indices: &[u32]) {
        debug_assert!(
            indices.iter().all(|i| (*i as usize) < self.vertices.len()),
            "index refers to a vertex that hasn't been pushed"
        );
        self.indices.extend_from_slice(indices);
    }

    /// Index the next pushed vertex will have.
    pub fn vertex_offset(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn vertices(&self) -> &[Vertex2d] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn vertex_buffer(&self) -> BufferId {
        self.vertex_buffer
    }

    pub fn index_buffer(&self) -> BufferId {
        self.index_buffer
    }

    /// Grow GPU buffers if the batch no longer fits, then upload it.
    pub fn flush_data<B: RenderBackend>(&mut self, backend: &mut B) -> Result<(), ResourceError> {
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&self.vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(&self.indices);

        ensure_capacity(backend, self.vertex_buffer, vertex_bytes.len() as u64, "vertex")?;
        ensure_capacity(backend, self.index_buffer, index_bytes.len() as u64, "index")?;

        if !vertex_bytes.is_empty() {
            backend.upload_buffer(self.vertex_buffer, 0, vertex_bytes);
        }
        if !index_bytes.is_empty() {
            backend.upload_buffer(self.index_buffer, 0, index_bytes);
        }
        self.flushed_indices = self.indices.len() as u32;
        Ok(())
    }

    /// Draw everything uploaded by the last [`flush_data`](Self::flush_data).
    /// Returns whether a draw call was issued.
    pub fn draw<B: RenderBackend>(&mut self, backend: &mut B, program: Program) -> bool {
        if self.flushed_indices == 0 {
            return false;
        }
        backend.draw_indexed(program, self.vertex_buffer, self.index_buffer, self.flushed_indices);
        true
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
        self.flushed_indices = 0;
    }

    /// Release the GPU buffers.
    pub fn destroy<B: RenderBackend>(self, backend: &mut B) {
        backend.destroy_buffer(self.vertex_buffer);
        backend.destroy_buffer(self.index_buffer);
    }
}

fn ensure_capacity<B: RenderBackend>(
    backend: &mut B,
    buffer: BufferId,
    required: u64,
    label: &str,
) -> Result<(), ResourceError> {
    let current = backend.buffer_size(buffer);
    if required <= current {
        return Ok(());
    }
    let size = required.next_power_of_two();
    log::info!("growing {label} buffer: {current} -> {size} bytes");
    backend.allocate_buffer(buffer, size)
}
