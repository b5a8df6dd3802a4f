//! Perspective / orthographic 3D camera.

use super::{Camera, MatrixDirty, ZoomRange};
use crate::hierarchy::{TransformId, Transforms3d};
use crate::math::{Mat4, Transform3d, Vec2, Vec3};

/// Projection model for a [`Camera3d`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// `fov_y` is the vertical field of view in radians at raw zoom 1.
    Perspective { fov_y: f32, near: f32, far: f32 },
    /// One world unit per pixel at raw zoom 1.
    Orthographic { near: f32, far: f32 },
}

impl Default for Projection {
    fn default() -> Self {
        Projection::Perspective {
            fov_y: std::f32::consts::PI / 8.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

/// A camera looking down the -Z axis of its transform, +Y up.
#[derive(Debug, Clone)]
pub struct Camera3d {
    transform: TransformId,
    resolution: Vec2,
    projection_kind: Projection,
    zoom_range: ZoomRange,
    raw_zoom: f32,

    dirty: MatrixDirty,
    seen_revision: Option<u64>,
    view: Mat4,
    projection: Mat4,
    projection_view: Mat4,
}

impl Camera3d {
    pub fn new(transform: TransformId, resolution: Vec2) -> Self {
        Self {
            transform,
            resolution,
            projection_kind: Projection::default(),
            zoom_range: ZoomRange::default(),
            raw_zoom: 1.0,
            dirty: MatrixDirty::ALL,
            seen_revision: None,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            projection_view: Mat4::IDENTITY,
        }
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.set_projection(projection);
        self
    }

    pub fn projection_kind(&self) -> Projection {
        self.projection_kind
    }

    pub fn set_projection(&mut self, projection: Projection) {
        if projection != self.projection_kind {
            self.projection_kind = projection;
            self.dirty.projection = true;
        }
    }

    pub fn set_transform(&mut self, transform: TransformId) {
        self.transform = transform;
        self.seen_revision = None;
        self.dirty.view = true;
    }

    pub fn update(&mut self, transforms: &mut Transforms3d) {
        if self.seen_revision != Some(transforms.revision(self.transform)) {
            self.dirty.view = true;
        }
        if !self.dirty.any() {
            return;
        }

        if self.dirty.view {
            let pose = transforms.world(self.transform);
            self.seen_revision = Some(transforms.revision(self.transform));
            let forward = pose.rotation * Vec3::NEG_Z;
            let up = if forward.dot(Vec3::Y).abs() > 0.999 { Vec3::Z } else { Vec3::Y };
            self.view = Mat4::look_to_rh(pose.position, forward, up);
        }
        if self.dirty.projection {
            let size = self.resolution.max(Vec2::ONE);
            self.projection = match self.projection_kind {
                Projection::Perspective { fov_y, near, far } => {
                    let fov = (fov_y * self.raw_zoom).clamp(0.01, std::f32::consts::PI - 0.01);
                    Mat4::perspective_rh(fov, size.x / size.y, near, far)
                }
                Projection::Orthographic { near, far } => {
                    let half = size * 0.5 * self.raw_zoom;
                    Mat4::orthographic_rh(-half.x, half.x, -half.y, half.y, near, far)
                }
            };
        }

        self.projection_view = self.projection * self.view;
        self.dirty = MatrixDirty::CLEAN;
    }

    pub fn view(&mut self, transforms: &mut Transforms3d) -> Mat4 {
        self.update(transforms);
        self.view
    }

    pub fn projection(&mut self, transforms: &mut Transforms3d) -> Mat4 {
        self.update(transforms);
        self.projection
    }
}

impl Camera for Camera3d {
    type Pose = Transform3d;

    fn transform(&self) -> TransformId {
        self.transform
    }

    fn projection_view(&mut self, transforms: &mut Transforms3d) -> Mat4 {
        self.update(transforms);
        self.projection_view
    }

    fn resolution(&self) -> Vec2 {
        self.resolution
    }

    fn set_resolution(&mut self, resolution: Vec2) {
        if resolution != self.resolution {
            self.resolution = resolution;
            self.dirty.projection = true;
        }
    }

    fn zoom(&self) -> f32 {
        self.zoom_range.normalized(self.raw_zoom)
    }

    fn set_zoom(&mut self, zoom: f32) {
        let raw = self.zoom_range.raw(zoom);
        self.set_raw_zoom(raw);
    }

    fn raw_zoom(&self) -> f32 {
        self.raw_zoom
    }

    fn set_raw_zoom(&mut self, raw: f32) {
        let raw = self.zoom_range.clamp_raw(raw);
        if raw != self.raw_zoom {
            self.raw_zoom = raw;
            self.dirty.projection = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Quat, Vec4};

    fn setup() -> (Transforms3d, Camera3d) {
        let mut transforms = Transforms3d::new();
        let eye = transforms.insert(Transform3d::from_xyz(0.0, 0.0, 10.0));
        (transforms, Camera3d::new(eye, Vec2::new(800.0, 600.0)))
    }

    #[test]
    fn target_ahead_projects_to_center() {
        let (mut t, mut cam) = setup();
        let clip = cam.projection_view(&mut t) * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(clip.w > 0.0);
        assert!((clip.x / clip.w).abs() < 1e-5 && (clip.y / clip.w).abs() < 1e-5);
        let depth = clip.z / clip.w;
        assert!((0.0..=1.0).contains(&depth));
    }

    #[test]
    fn point_behind_camera_has_negative_w() {
        let (mut t, mut cam) = setup();
        let clip = cam.projection_view(&mut t) * Vec4::new(0.0, 0.0, 20.0, 1.0);
        assert!(clip.w < 0.0);
    }

    #[test]
    fn rotation_changes_view() {
        let (mut t, mut cam) = setup();
        let before = cam.view(&mut t);
        t.set_rotation(cam.transform(), Quat::from_rotation_y(0.5));
        assert!(!cam.view(&mut t).abs_diff_eq(before, 1e-6));
    }

    #[test]
    fn zoom_widens_perspective() {
        let (mut t, mut cam) = setup();
        let narrow = cam.projection(&mut t);
        cam.set_zoom(-0.5);
        let wide = cam.projection(&mut t);
        // Larger fov → smaller focal scale on Y.
        assert!(wide.y_axis.y < narrow.y_axis.y);
    }

    #[test]
    fn orthographic_maps_pixels() {
        let (mut t, mut cam) = setup();
        cam.set_projection(Projection::Orthographic { near: 0.1, far: 100.0 });
        let clip = cam.projection_view(&mut t) * Vec4::new(400.0, 300.0, 0.0, 1.0);
        assert!((clip.x - 1.0).abs() < 1e-5 && (clip.y - 1.0).abs() < 1e-5);
    }
}
