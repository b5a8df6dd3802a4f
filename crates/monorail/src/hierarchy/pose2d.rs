//! 2D poses: `Affine2` matrices, angle rotation.

use super::{Hierarchy, ParentFrame, Pose, TransformId};
use crate::math::{Affine2, Transform2d, Vec2};

impl Pose for Transform2d {
    type Matrix = Affine2;

    const IDENTITY_MATRIX: Affine2 = Affine2::IDENTITY;

    fn local_matrix(&self) -> Affine2 {
        self.matrix()
    }

    fn compose(parent: &Affine2, local: &Affine2) -> Affine2 {
        *parent * *local
    }

    fn inverse(matrix: &Affine2) -> Affine2 {
        matrix.inverse()
    }

    fn to_world(&self, parent: &Self, world_matrix: &Affine2) -> Self {
        Self {
            position: world_matrix.translation,
            rotation: parent.rotation + self.rotation,
            scale: parent.scale * self.scale,
        }
    }

    fn to_local(world: &Self, parent: &ParentFrame<Self>) -> Self {
        Self {
            position: parent.world_to_local.transform_point2(world.position),
            rotation: world.rotation - parent.world.rotation,
            scale: divide_scale(world.scale, parent.world.scale),
        }
    }
}

/// Component-wise `world / parent`, with 0 where the parent scale is 0.
fn divide_scale(world: Vec2, parent: Vec2) -> Vec2 {
    let div = |w: f32, p: f32| if p == 0.0 { 0.0 } else { w / p };
    Vec2::new(div(world.x, parent.x), div(world.y, parent.y))
}

/// Per-component accessors. World getters refresh caches, so they take
/// `&mut self`.
impl Hierarchy<Transform2d> {
    pub fn position(&mut self, id: TransformId) -> Vec2 {
        self.world(id).position
    }

    pub fn set_position(&mut self, id: TransformId, position: Vec2) -> &mut Self {
        let mut world = self.world(id);
        world.position = position;
        let local = self.relative_local(id, &world).position;
        self.update_local(id, |pose| pose.position = local)
    }

    /// World rotation in radians.
    pub fn rotation(&mut self, id: TransformId) -> f32 {
        self.world(id).rotation
    }

    pub fn set_rotation(&mut self, id: TransformId, radians: f32) -> &mut Self {
        let mut world = self.world(id);
        world.rotation = radians;
        let local = self.relative_local(id, &world).rotation;
        self.update_local(id, |pose| pose.rotation = local)
    }

    pub fn scale(&mut self, id: TransformId) -> Vec2 {
        self.world(id).scale
    }

    pub fn set_scale(&mut self, id: TransformId, scale: Vec2) -> &mut Self {
        let mut world = self.world(id);
        world.scale = scale;
        let local = self.relative_local(id, &world).scale;
        self.update_local(id, |pose| pose.scale = local)
    }

    pub fn local_position(&self, id: TransformId) -> Vec2 {
        self.local(id).position
    }

    pub fn set_local_position(&mut self, id: TransformId, position: Vec2) -> &mut Self {
        self.update_local(id, |pose| pose.position = position)
    }

    pub fn local_rotation(&self, id: TransformId) -> f32 {
        self.local(id).rotation
    }

    pub fn set_local_rotation(&mut self, id: TransformId, radians: f32) -> &mut Self {
        self.update_local(id, |pose| pose.rotation = radians)
    }

    pub fn local_scale(&self, id: TransformId) -> Vec2 {
        self.local(id).scale
    }

    pub fn set_local_scale(&mut self, id: TransformId, scale: Vec2) -> &mut Self {
        self.update_local(id, |pose| pose.scale = scale)
    }

    /// Move by `delta` in parent space.
    pub fn translate(&mut self, id: TransformId, delta: Vec2) -> &mut Self {
        self.update_local(id, |pose| pose.position += delta)
    }

    pub fn rotate(&mut self, id: TransformId, radians: f32) -> &mut Self {
        self.update_local(id, |pose| pose.rotation += radians)
    }
}
