//! The seam between the renderers and a graphics API.
//!
//! Renderers only ever talk to [`RenderBackend`]: they allocate and fill
//! buffers, bind textures to numbered slots, set named uniforms, and issue
//! indexed triangle-list draws. Resources are owned by the backend and
//! referred to by small copyable ids.

use std::fmt;

use crate::error::ResourceError;
use crate::math::{Color, Mat4, Vec2};

/// Upper bound on simultaneously bound textures for a 2D batch.
pub const MAX_TEXTURE_SLOTS: usize = 32;

/// Uniform names understood by every backend.
pub mod uniforms {
    /// `mat4`: camera `projection * view`.
    pub const PROJECTION_VIEW: &str = "u_projection_view";
    /// `mat4`: per-draw model matrix (3D only).
    pub const MODEL: &str = "u_model";
    /// `int[]`: sampler unit for each texture slot.
    pub const TEXTURES: &str = "u_textures";
}

/// Handle to a GPU buffer owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub(crate) u32);

/// Handle to an offscreen render target owned by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RenderTargetId(pub(crate) u32);

/// Identity of a GPU texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub(crate) u32);

/// A texture handle: identity plus pixel size. Two handles are equal when
/// they refer to the same GPU texture.
#[derive(Clone, Copy)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
}

impl Texture {
    pub(crate) fn new(id: TextureId, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

impl PartialEq for Texture {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Texture {}

impl std::hash::Hash for Texture {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Texture({}, {}x{})", self.id.0, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Vertex,
    /// `u32` indices.
    Index,
}

/// Which shader program a uniform or draw targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Program {
    /// Batched 2D geometry with up to [`MAX_TEXTURE_SLOTS`] textures.
    Sprite2d,
    /// One mesh per draw with a model matrix and one texture.
    Mesh3d,
}

/// Everything the renderers need from a graphics API.
///
/// Calls are executed in order. A draw sees every upload, uniform and
/// binding issued before it.
pub trait RenderBackend {
    // ── Buffers ─────────────────────────────────────────────────────────

    fn create_buffer(&mut self, kind: BufferKind, size: u64) -> Result<BufferId, ResourceError>;

    /// Reallocate `buffer` with a new size. Previous contents are lost.
    fn allocate_buffer(&mut self, buffer: BufferId, size: u64) -> Result<(), ResourceError>;

    /// Current allocation size in bytes.
    fn buffer_size(&self, buffer: BufferId) -> u64;

    /// Write `data` at byte `offset`. The range must fit the allocation.
    fn upload_buffer(&mut self, buffer: BufferId, offset: u64, data: &[u8]);

    fn destroy_buffer(&mut self, buffer: BufferId);

    // ── Textures ────────────────────────────────────────────────────────

    /// Create an RGBA8 texture. Rows are top-first.
    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<Texture, ResourceError>;

    fn destroy_texture(&mut self, texture: Texture);

    /// Bind `texture` to sampler slot `slot`.
    fn bind_texture(&mut self, slot: u32, texture: &Texture);

    fn unbind_texture(&mut self, slot: u32);

    /// How many texture slots a 2D batch may use on this backend.
    fn max_texture_slots(&self) -> usize {
        MAX_TEXTURE_SLOTS
    }

    // ── Uniforms ────────────────────────────────────────────────────────

    fn set_mat4(&mut self, program: Program, name: &str, value: &Mat4);

    fn set_int_array(&mut self, program: Program, name: &str, values: &[i32]);

    // ── Drawing ─────────────────────────────────────────────────────────

    /// Draw `index_count` indices from `indices` as a triangle list.
    fn draw_indexed(&mut self, program: Program, vertices: BufferId, indices: BufferId, index_count: u32);

    // ── Render targets ──────────────────────────────────────────────────

    /// # Panics
    ///
    /// If either dimension is zero.
    fn create_render_target(&mut self, width: u32, height: u32) -> Result<RenderTargetId, ResourceError>;

    /// # Panics
    ///
    /// If either dimension is zero.
    fn resize_render_target(&mut self, target: RenderTargetId, width: u32, height: u32) -> Result<(), ResourceError>;

    fn render_target_size(&self, target: RenderTargetId) -> (u32, u32);

    /// Direct subsequent clears and draws into `target`.
    fn bind_render_target(&mut self, target: RenderTargetId);

    /// Return to the backend's default target.
    fn unbind_render_target(&mut self);

    /// Clear the bound target's color (and depth, if any).
    fn clear(&mut self, color: Color);
}

/// Render targets must have a non-zero size.
pub(crate) fn assert_target_size(width: u32, height: u32) {
    assert!(
        width > 0 && height > 0,
        "render target size must be non-zero, got {width}x{height}"
    );
}

/// RGBA8 data must be exactly `width * height * 4` bytes and non-empty.
pub(crate) fn validate_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<(), ResourceError> {
    use crate::error::ResourceKind;

    if width == 0 || height == 0 {
        return Err(ResourceError::new(
            ResourceKind::Texture,
            format!("zero-size texture {width}x{height}"),
        ));
    }
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(ResourceError::new(
            ResourceKind::Texture,
            format!("expected {expected} bytes of RGBA data, got {}", rgba.len()),
        ));
    }
    Ok(())
}
