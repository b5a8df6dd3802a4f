//! Convenience re-exports: `use monorail::prelude::*` for the common items.

pub use crate::camera::{Camera, Camera2d, Camera3d, Projection, ZoomRange};
pub use crate::error::{HierarchyError, ResourceError, ResourceKind};
pub use crate::hierarchy::{Hierarchy, TransformId, Transforms2d, Transforms3d};
pub use crate::logging::{LoggingConfig, init_logging};
pub use crate::math::{Color, Mat4, Quat, Rect, Transform2d, Transform3d, Vec2, Vec3, Vec4};
pub use crate::render::{
    BackendConfig, HeadlessBackend, RenderBackend, RenderStats, RenderTargetId, Texture,
    WgpuBackend,
};
pub use crate::render2d::{
    PixelRect, Renderer2d, RendererConfig, Shape2d, ShapeRenderer, Sprite, SpriteRenderer,
};
pub use crate::render3d::{Mesh, MeshRenderer, Renderer3d};
pub use crate::scene::{Entity, Registry, Scene, Scene2d, Scene3d, Tag};
