//! # 2D Batched Rendering
//!
//! Quads, triangles and ellipses from any number of transforms and up to
//! [`MAX_TEXTURE_SLOTS`](crate::render::MAX_TEXTURE_SLOTS) textures are
//! flattened into one vertex buffer and drawn with one indexed draw call.
//!
//! ```text
//! Renderer2d
//!   ├── TextureSlots   texture → slot, flush when full
//!   ├── EllipseCache   unit-circle rings per segment count
//!   └── Batcher        Vec<Vertex2d> + Vec<u32> → GPU buffers → draw
//! ```
//!
//! A frame costs one draw call, plus one more for every additional
//! [`MAX_TEXTURE_SLOTS`](crate::render::MAX_TEXTURE_SLOTS) distinct
//! textures, in the order they were first used.
//!
//! ## Comparison
//!
//! - **Bevy**: sprites are extracted to a render world, sorted and batched
//!   by texture; batches break on every texture change.
//! - **MonoGame SpriteBatch**: one texture per batch; `Deferred` mode
//!   batches consecutive draws with the same texture.

mod batcher;
mod ellipse;
mod renderer;
mod shape;
mod slots;
mod sprite;
mod vertex;

pub use batcher::{Batcher, DEFAULT_BATCH_SIZE};
pub use ellipse::{EllipseCache, MAX_SEGMENTS, MIN_SEGMENTS, clamp_segments, default_segments};
pub use renderer::{Renderer2d, RendererConfig};
pub use shape::{Shape2d, ShapeRenderer};
pub use slots::TextureSlots;
pub use sprite::{PixelRect, Sprite, SpriteRenderer};
pub use vertex::{NO_TEXTURE, Vertex2d};

pub use crate::render::RenderStats;
