//! Graphics backends.
//!
//! [`RenderBackend`] is the narrow interface the batchers and renderers
//! draw through. Two implementations ship with the crate:
//!
//! - [`WgpuBackend`]: real GPU rendering into offscreen targets.
//! - [`HeadlessBackend`]: in-memory, records every call. Used by tests.

pub mod backend;
pub mod gpu;
pub mod headless;
mod stats;

pub use backend::{
    BufferId, BufferKind, MAX_TEXTURE_SLOTS, Program, RenderBackend, RenderTargetId, Texture,
    TextureId, uniforms,
};
pub use gpu::{BackendConfig, WgpuBackend};
pub use headless::{Command, HeadlessBackend};
pub use stats::RenderStats;
