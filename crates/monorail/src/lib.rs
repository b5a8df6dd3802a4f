//! # Monorail — Batched 2D/3D Rendering Core
//!
//! Transform hierarchies, cameras with lazily rebuilt matrices, a sprite
//! batcher that multiplexes up to 32 textures per draw call, a forward mesh
//! renderer, and a small scene layer tying them to entities.
//!
//! Start with `use monorail::prelude::*`, create a backend
//! ([`WgpuBackend`](render::WgpuBackend) or
//! [`HeadlessBackend`](render::HeadlessBackend)), then a
//! [`Scene2d`](scene::Scene2d) and a [`Renderer2d`](render2d::Renderer2d).

pub mod camera;
pub mod error;
pub mod hierarchy;
pub mod logging;
pub mod math;
pub mod prelude;
pub mod render;
pub mod render2d;
pub mod render3d;
pub mod scene;
