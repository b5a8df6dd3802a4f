//! Orthographic 2D camera.
//!
//! One world unit is one pixel at raw zoom 1, the origin of the view is the
//! camera's position, and +Y points up. Screen coordinates (for
//! [`screen_to_world`](Camera2d::screen_to_world)) start at the top-left
//! with +Y down.

use super::{Camera, MatrixDirty, ZoomRange};
use crate::hierarchy::{TransformId, Transforms2d};
use crate::math::{Mat4, Rect, Transform2d, Vec2, Vec3};

#[derive(Debug, Clone)]
pub struct Camera2d {
    transform: TransformId,
    resolution: Vec2,
    zoom_range: ZoomRange,
    raw_zoom: f32,

    dirty: MatrixDirty,
    seen_revision: Option<u64>,
    rotation: f32,
    model: Mat4,
    view: Mat4,
    projection: Mat4,
    projection_view: Mat4,
    bounds: Option<Rect>,
}

impl Camera2d {
    pub fn new(transform: TransformId, resolution: Vec2) -> Self {
        Self {
            transform,
            resolution,
            zoom_range: ZoomRange::default(),
            raw_zoom: 1.0,
            dirty: MatrixDirty::ALL,
            seen_revision: None,
            rotation: 0.0,
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            projection_view: Mat4::IDENTITY,
            bounds: None,
        }
    }

    pub fn with_zoom_range(mut self, range: ZoomRange) -> Self {
        self.set_zoom_range(range);
        self
    }

    /// Follow a different transform node.
    pub fn set_transform(&mut self, transform: TransformId) {
        self.transform = transform;
        self.seen_revision = None;
        self.dirty.view = true;
    }

    pub fn zoom_range(&self) -> ZoomRange {
        self.zoom_range
    }

    /// Change the zoom limits, re-clamping the current raw zoom.
    pub fn set_zoom_range(&mut self, range: ZoomRange) {
        self.zoom_range = range;
        self.set_raw_zoom(self.raw_zoom);
    }

    /// Recompute whatever is stale.
    pub fn update(&mut self, transforms: &mut Transforms2d) {
        if self.seen_revision != Some(transforms.revision(self.transform)) {
            self.dirty.view = true;
        }
        if !self.dirty.any() {
            return;
        }

        if self.dirty.view {
            let pose: Transform2d = transforms.world(self.transform);
            self.seen_revision = Some(transforms.revision(self.transform));
            self.rotation = pose.rotation;
            self.model = Mat4::from_translation(pose.position.extend(0.0))
                * Mat4::from_rotation_z(pose.rotation)
                * Mat4::from_scale(Vec3::new(self.raw_zoom, self.raw_zoom, 1.0));
            self.view = self.model.inverse();
        }
        if self.dirty.projection {
            let half = self.resolution.max(Vec2::ONE) * 0.5;
            self.projection = Mat4::orthographic_rh(-half.x, half.x, -half.y, half.y, -1.0, 1.0);
        }

        self.projection_view = self.projection * self.view;
        self.bounds = None;
        self.dirty = MatrixDirty::CLEAN;
    }

    pub fn view(&mut self, transforms: &mut Transforms2d) -> Mat4 {
        self.update(transforms);
        self.view
    }

    pub fn projection(&mut self, transforms: &mut Transforms2d) -> Mat4 {
        self.update(transforms);
        self.projection
    }

    /// World-space rectangle covering everything the camera can see.
    ///
    /// When the camera is rotated the visible area is a rotated rectangle,
    /// so all four screen corners are unprojected and enclosed.
    pub fn bounds(&mut self, transforms: &mut Transforms2d) -> Rect {
        self.update(transforms);
        if let Some(bounds) = self.bounds {
            return bounds;
        }

        let res = self.resolution;
        let bounds = if self.rotation != 0.0 {
            Rect::enclosing(&[
                self.unproject(Vec2::ZERO),
                self.unproject(Vec2::new(res.x, 0.0)),
                self.unproject(res),
                self.unproject(Vec2::new(0.0, res.y)),
            ])
        } else {
            Rect::enclosing(&[self.unproject(Vec2::ZERO), self.unproject(res)])
        };
        self.bounds = Some(bounds);
        bounds
    }

    /// Convert a screen position (pixels, top-left origin, +Y down) into
    /// world space.
    pub fn screen_to_world(&mut self, transforms: &mut Transforms2d, screen: Vec2) -> Vec2 {
        self.update(transforms);
        self.unproject(screen)
    }

    /// Inverse of [`screen_to_world`](Self::screen_to_world).
    pub fn world_to_screen(&mut self, transforms: &mut Transforms2d, world: Vec2) -> Vec2 {
        self.update(transforms);
        let local = self.view.transform_point3(world.extend(0.0));
        Vec2::new(local.x + self.resolution.x * 0.5, self.resolution.y * 0.5 - local.y)
    }

    fn unproject(&self, screen: Vec2) -> Vec2 {
        let centered = Vec3::new(
            screen.x - self.resolution.x * 0.5,
            self.resolution.y * 0.5 - screen.y,
            0.0,
        );
        self.model.transform_point3(centered).truncate()
    }
}

impl Camera for Camera2d {
    type Pose = Transform2d;

    fn transform(&self) -> TransformId {
        self.transform
    }

    fn projection_view(&mut self, transforms: &mut Transforms2d) -> Mat4 {
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
            self.bounds = None;
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
            self.dirty.view = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec4;

    const EPS: f32 = 1e-3;

    fn setup(resolution: Vec2) -> (Transforms2d, Camera2d) {
        let mut transforms = Transforms2d::new();
        let eye = transforms.insert(Transform2d::IDENTITY);
        (transforms, Camera2d::new(eye, resolution))
    }

    fn rect_close(a: Rect, b: Rect) -> bool {
        (a.min() - b.min()).length() < EPS && (a.max() - b.max()).length() < EPS
    }

    #[test]
    fn bounds_at_origin() {
        let (mut t, mut cam) = setup(Vec2::new(200.0, 200.0));
        assert_eq!(cam.bounds(&mut t), Rect::new(-100.0, -100.0, 200.0, 200.0));
    }

    #[test]
    fn bounds_follow_transform() {
        let (mut t, mut cam) = setup(Vec2::new(200.0, 100.0));
        cam.bounds(&mut t);
        t.set_position(cam.transform(), Vec2::new(1000.0, -50.0));
        assert!(rect_close(cam.bounds(&mut t), Rect::new(900.0, -100.0, 200.0, 100.0)));
    }

    #[test]
    fn bounds_follow_parent_of_transform() {
        let mut t = Transforms2d::new();
        let rig = t.insert(Transform2d::IDENTITY);
        let eye = t.insert_child(rig, Transform2d::IDENTITY).unwrap();
        let mut cam = Camera2d::new(eye, Vec2::new(20.0, 20.0));
        cam.bounds(&mut t);
        t.set_local_position(rig, Vec2::new(5.0, 5.0));
        assert!(rect_close(cam.bounds(&mut t), Rect::new(-5.0, -5.0, 20.0, 20.0)));
    }

    #[test]
    fn rotated_bounds_enclose_all_corners() {
        let (mut t, mut cam) = setup(Vec2::new(200.0, 200.0));
        t.set_rotation(cam.transform(), std::f32::consts::FRAC_PI_4);
        let half = 100.0 * std::f32::consts::SQRT_2;
        assert!(rect_close(
            cam.bounds(&mut t),
            Rect::new(-half, -half, 2.0 * half, 2.0 * half)
        ));
    }

    #[test]
    fn zoom_scales_visible_area() {
        let (mut t, mut cam) = setup(Vec2::new(200.0, 200.0));
        cam.set_raw_zoom(2.0);
        assert!(rect_close(cam.bounds(&mut t), Rect::new(-200.0, -200.0, 400.0, 400.0)));
        assert!(cam.zoom() < 0.0);
    }

    #[test]
    fn zoom_round_trips_and_stays_in_range() {
        let (_, mut cam) = setup(Vec2::new(10.0, 10.0));
        let range = cam.zoom_range();
        for step in 0..=20 {
            let x = -1.0 + step as f32 * 0.1;
            cam.set_zoom(x);
            assert!((cam.zoom() - x).abs() < 1e-4, "{x} -> {}", cam.zoom());
            assert!(cam.raw_zoom() >= range.min() && cam.raw_zoom() <= range.max());
        }
        cam.set_raw_zoom(1000.0);
        assert_eq!(cam.raw_zoom(), range.max());
    }

    #[test]
    fn screen_to_world_inverts_world_to_screen() {
        let (mut t, mut cam) = setup(Vec2::new(640.0, 480.0));
        t.set_position(cam.transform(), Vec2::new(30.0, -12.0))
            .set_rotation(cam.transform(), 0.6);
        cam.set_zoom(-0.3);

        assert!((cam.screen_to_world(&mut t, Vec2::new(320.0, 240.0)) - Vec2::new(30.0, -12.0)).length() < EPS);
        let world = Vec2::new(100.0, 40.0);
        let screen = cam.world_to_screen(&mut t, world);
        assert!((cam.screen_to_world(&mut t, screen) - world).length() < EPS);
    }

    #[test]
    fn projection_view_centers_camera_position() {
        let (mut t, mut cam) = setup(Vec2::new(200.0, 100.0));
        t.set_position(cam.transform(), Vec2::new(50.0, 50.0));
        let pv = cam.projection_view(&mut t);
        let clip = pv * Vec4::new(50.0, 50.0, 0.0, 1.0);
        assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5);
        let edge = pv * Vec4::new(150.0, 100.0, 0.0, 1.0);
        assert!((edge.x - 1.0).abs() < 1e-5 && (edge.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn resolution_change_invalidates_bounds() {
        let (mut t, mut cam) = setup(Vec2::new(200.0, 200.0));
        cam.bounds(&mut t);
        cam.set_resolution(Vec2::new(400.0, 100.0));
        assert_eq!(cam.bounds(&mut t), Rect::new(-200.0, -50.0, 400.0, 100.0));
    }
}
