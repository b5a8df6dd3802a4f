//! # Render3d — Forward Mesh Rendering
//!
//! Unbatched: every [`MeshRenderer`] keeps its own vertex and index buffers
//! on the GPU and is drawn with its world matrix as the `u_model` uniform.
//!
//! ```text
//! begin(camera) ──▶ u_projection_view
//! draw_mesh     ──▶ u_model, bind texture → slot 0, draw_indexed, unbind
//! end
//! ```
//!
//! Depth testing and back-face culling are part of the backend's mesh
//! program.

mod mesh;
mod renderer;

pub use mesh::{Mesh, MeshRenderer, MeshVertex};
pub use renderer::Renderer3d;
