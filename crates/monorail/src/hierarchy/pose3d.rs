//! 3D poses: `Mat4` matrices, quaternion rotation.

use super::{Hierarchy, ParentFrame, Pose, TransformId};
use crate::math::{Mat4, Quat, Transform3d, Vec3};

impl Pose for Transform3d {
    type Matrix = Mat4;

    const IDENTITY_MATRIX: Mat4 = Mat4::IDENTITY;

    fn local_matrix(&self) -> Mat4 {
        self.matrix()
    }

    fn compose(parent: &Mat4, local: &Mat4) -> Mat4 {
        *parent * *local
    }

    fn inverse(matrix: &Mat4) -> Mat4 {
        matrix.inverse()
    }

    fn to_world(&self, parent: &Self, world_matrix: &Mat4) -> Self {
        Self {
            position: world_matrix.w_axis.truncate(),
            rotation: (parent.rotation * self.rotation).normalize(),
            scale: parent.scale * self.scale,
        }
    }

    fn to_local(world: &Self, parent: &ParentFrame<Self>) -> Self {
        Self {
            position: parent.world_to_local.transform_point3(world.position),
            rotation: (parent.world.rotation.inverse() * world.rotation).normalize(),
            scale: divide_scale(world.scale, parent.world.scale),
        }
    }
}

fn divide_scale(world: Vec3, parent: Vec3) -> Vec3 {
    let div = |w: f32, p: f32| if p == 0.0 { 0.0 } else { w / p };
    Vec3::new(div(world.x, parent.x), div(world.y, parent.y), div(world.z, parent.z))
}

impl Hierarchy<Transform3d> {
    pub fn position(&mut self, id: TransformId) -> Vec3 {
        self.world(id).position
    }

    pub fn set_position(&mut self, id: TransformId, position: Vec3) -> &mut Self {
        let mut world = self.world(id);
        world.position = position;
        let local = self.relative_local(id, &world).position;
        self.update_local(id, |pose| pose.position = local)
    }

    pub fn rotation(&mut self, id: TransformId) -> Quat {
        self.world(id).rotation
    }

    pub fn set_rotation(&mut self, id: TransformId, rotation: Quat) -> &mut Self {
        let mut world = self.world(id);
        world.rotation = rotation;
        let local = self.relative_local(id, &world).rotation;
        self.update_local(id, |pose| pose.rotation = local)
    }

    pub fn scale(&mut self, id: TransformId) -> Vec3 {
        self.world(id).scale
    }

    pub fn set_scale(&mut self, id: TransformId, scale: Vec3) -> &mut Self {
        let mut world = self.world(id);
        world.scale = scale;
        let local = self.relative_local(id, &world).scale;
        self.update_local(id, |pose| pose.scale = local)
    }

    pub fn local_position(&self, id: TransformId) -> Vec3 {
        self.local(id).position
    }

    pub fn set_local_position(&mut self, id: TransformId, position: Vec3) -> &mut Self {
        self.update_local(id, |pose| pose.position = position)
    }

    pub fn local_rotation(&self, id: TransformId) -> Quat {
        self.local(id).rotation
    }

    pub fn set_local_rotation(&mut self, id: TransformId, rotation: Quat) -> &mut Self {
        self.update_local(id, |pose| pose.rotation = rotation)
    }

    pub fn local_scale(&self, id: TransformId) -> Vec3 {
        self.local(id).scale
    }

    pub fn set_local_scale(&mut self, id: TransformId, scale: Vec3) -> &mut Self {
        self.update_local(id, |pose| pose.scale = scale)
    }

    /// World-space forward direction (-Z rotated by the world rotation).
    pub fn forward(&mut self, id: TransformId) -> Vec3 {
        self.rotation(id) * Vec3::NEG_Z
    }

    /// Rotate so that forward points at `target` (world space).
    pub fn look_at(&mut self, id: TransformId, target: Vec3, up: Vec3) -> &mut Self {
        let eye = self.position(id);
        if (target - eye).length_squared() < f32::EPSILON {
            return self;
        }
        let view = Mat4::look_at_rh(eye, target, up);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        self.set_rotation(id, rotation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::Transforms3d;

    const EPS: f32 = 1e-4;

    #[test]
    fn child_inherits_parent_transform() {
        let mut t = Transforms3d::new();
        let parent = t.insert(Transform3d::from_xyz(100.0, 0.0, 0.0));
        let child = t.insert_child(parent, Transform3d::from_xyz(10.0, 0.0, 0.0)).unwrap();
        assert!((t.position(child) - Vec3::new(110.0, 0.0, 0.0)).length() < EPS);

        let expected = t.world_matrix(parent) * t.local_matrix(child);
        assert!(t.world_matrix(child).abs_diff_eq(expected, EPS));
    }

    #[test]
    fn world_rotation_divides_out_parent() {
        let mut t = Transforms3d::new();
        let spin = Quat::from_rotation_y(0.7);
        let parent = t.insert(Transform3d::IDENTITY.with_rotation(spin));
        let child = t.insert_child(parent, Transform3d::IDENTITY).unwrap();

        let target = Quat::from_rotation_x(0.3);
        t.set_rotation(child, target);
        assert!(t.rotation(child).abs_diff_eq(target, EPS));
        assert!(t.local_rotation(child).abs_diff_eq(spin.inverse() * target, EPS));
    }

    #[test]
    fn reparent_round_trip() {
        let mut t = Transforms3d::new();
        let parent = t.insert(
            Transform3d::from_xyz(1.0, 2.0, 3.0)
                .with_rotation(Quat::from_rotation_z(1.1))
                .with_scale(2.0),
        );
        let child = t.insert(Transform3d::from_xyz(-4.0, 5.0, 0.5));
        let before = t.position(child);
        t.set_parent(child, Some(parent), true).unwrap();
        assert!((t.position(child) - before).length() < EPS);
    }

    #[test]
    fn look_at_points_forward_at_target() {
        let mut t = Transforms3d::new();
        let eye = t.insert(Transform3d::from_xyz(0.0, 0.0, 10.0));
        t.look_at(eye, Vec3::new(10.0, 0.0, 10.0), Vec3::Y);
        assert!((t.forward(eye) - Vec3::X).length() < EPS);
    }
}
