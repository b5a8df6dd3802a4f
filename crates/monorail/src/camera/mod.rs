//! # Cameras
//!
//! A camera turns world coordinates into clip space. It doesn't own a
//! position of its own: it points at a node in a transform hierarchy and
//! reads that node's world pose.
//!
//! ## Derived State
//!
//! ```text
//!  transform revision ──▶ view dirty ──┐
//!  zoom change ─────────▶ view dirty ──┼──▶ update() ──▶ view, projection,
//!  resolution change ───▶ proj dirty ──┘                 projection_view,
//!                                                        (2D) bounds
//! ```
//!
//! Matrices are rebuilt lazily on first read after something changed. The
//! camera notices transform movement by comparing the node's revision
//! counter with the last one it saw, so no subscription is needed.
//!
//! ## Zoom
//!
//! Zoom comes in two forms: a normalized value in `[-1, 1]` for sliders and
//! a raw multiplier of the visible area clamped to the camera's
//! [`ZoomRange`]. Setting either updates both.
//!
//! ## Comparison
//!
//! - **Bevy**: `Camera` + `OrthographicProjection` components with
//!   `GlobalTransform` supplied by the transform propagation system.
//! - **Nez / MonoGame**: `Camera` component with the same raw/normalized
//!   zoom split and lazily rebuilt matrices.

mod camera2d;
mod camera3d;
mod zoom;

pub use camera2d::Camera2d;
pub use camera3d::{Camera3d, Projection};
pub use zoom::{DEFAULT_MAX_ZOOM, DEFAULT_MIN_ZOOM, ZoomRange, ZoomRangeError};

use crate::hierarchy::{Hierarchy, Pose, TransformId};
use crate::math::{Mat4, Vec2};

/// What renderers need from a camera.
pub trait Camera {
    /// The pose type of the hierarchy the camera's transform lives in.
    type Pose: Pose;

    fn transform(&self) -> TransformId;

    /// `projection * view`, rebuilt first if anything changed.
    fn projection_view(&mut self, transforms: &mut Hierarchy<Self::Pose>) -> Mat4;

    fn resolution(&self) -> Vec2;

    fn set_resolution(&mut self, resolution: Vec2);

    /// Normalized zoom in `[-1, 1]`.
    fn zoom(&self) -> f32;

    fn set_zoom(&mut self, zoom: f32);

    /// Raw zoom multiplier in `[min, max]`.
    fn raw_zoom(&self) -> f32;

    fn set_raw_zoom(&mut self, raw: f32);
}

/// Which camera matrices are stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MatrixDirty {
    pub view: bool,
    pub projection: bool,
}

impl MatrixDirty {
    pub const CLEAN: Self = Self {
        view: false,
        projection: false,
    };
    pub const ALL: Self = Self {
        view: true,
        projection: true,
    };

    pub fn any(self) -> bool {
        self.view || self.projection
    }
}
