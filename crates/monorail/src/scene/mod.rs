//! # Scene — Entities, Transforms, and a Camera
//!
//! A scene is the glue between the [`Registry`], a transform
//! [`Hierarchy`], and a renderer. Every entity created through the scene
//! gets a [`TransformId`] component pointing at its node and a [`Tag`].
//! One entity holds the camera.
//!
//! ## Frame
//!
//! ```text
//! update(delta, f) ──▶ f mutates components and transforms
//! render(backend, renderer)
//!   ├─ bind render target, clear
//!   ├─ renderer.begin(camera)
//!   ├─ for each entity with TransformId + renderer component:
//!   │     world pose ──▶ draw (culled against camera bounds in 2D)
//!   ├─ renderer.end()                 ← always runs, even after a draw error
//!   └─ unbind render target
//! ```
//!
//! ## Comparison
//!
//! - **Bevy**: `World` + `Commands`; the render graph extracts entities
//!   instead of the scene iterating them.
//! - **Unity**: `Scene` owning `GameObject`s, each with a `Transform`.
//!   [`Scene::create_entity`] mirrors `new GameObject()` including the
//!   default `"GameObject"` tag.

mod entity;
mod registry;

pub use entity::Entity;
pub use registry::Registry;

use std::collections::HashMap;

use crate::camera::{Camera, Camera2d, Camera3d};
use crate::error::{HierarchyError, ResourceError};
use crate::hierarchy::{Hierarchy, Pose, TransformId};
use crate::math::{Color, Vec2};
use crate::render::{RenderBackend, RenderTargetId};
use crate::render2d::{Renderer2d, ShapeRenderer, SpriteRenderer};
use crate::render3d::{MeshRenderer, Renderer3d};

/// A free-form label. New entities are tagged `"GameObject"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(pub String);

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Tag {
    fn default() -> Self {
        Self::new("GameObject")
    }
}

/// A 2D scene drawn through [`Renderer2d`].
pub type Scene2d = Scene<Camera2d>;
/// A 3D scene drawn through [`Renderer3d`].
pub type Scene3d = Scene<Camera3d>;

pub struct Scene<C: Camera> {
    registry: Registry,
    transforms: Hierarchy<C::Pose>,
    /// Reverse of each entity's `TransformId` component.
    owners: HashMap<TransformId, Entity>,
    camera: Entity,
    target: RenderTargetId,
    resolution: (u32, u32),
    elapsed: f32,
    pub clear_color: Color,
}

impl<C: Camera + 'static> Scene<C> {
    fn with_camera<B: RenderBackend>(
        backend: &mut B,
        resolution: (u32, u32),
        make_camera: impl FnOnce(TransformId, Vec2) -> C,
    ) -> Result<Self, ResourceError> {
        let (width, height) = resolution;
        let target = backend.create_render_target(width, height)?;

        let mut scene = Self {
            registry: Registry::new(),
            transforms: Hierarchy::new(),
            owners: HashMap::new(),
            camera: Entity {
                index: 0,
                generation: 0,
            },
            target,
            resolution,
            elapsed: 0.0,
            clear_color: Color::BLACK,
        };
        let camera = scene.create_entity(None);
        let transform = scene.transform(camera);
        let size = Vec2::new(width as f32, height as f32);
        scene.registry.insert(camera, make_camera(transform, size));
        scene.registry.insert(camera, Tag::new("Camera"));
        scene.camera = camera;

        log::info!("Scene created at {width}x{height}");
        Ok(scene)
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn transforms(&self) -> &Hierarchy<C::Pose> {
        &self.transforms
    }

    pub fn transforms_mut(&mut self) -> &mut Hierarchy<C::Pose> {
        &mut self.transforms
    }

    pub fn camera_entity(&self) -> Entity {
        self.camera
    }

    pub fn camera(&self) -> &C {
        self.registry
            .get::<C>(self.camera)
            .unwrap_or_else(|| panic!("scene camera component was removed from {}", self.camera))
    }

    pub fn camera_mut(&mut self) -> &mut C {
        let camera = self.camera;
        self.registry
            .get_mut::<C>(camera)
            .unwrap_or_else(|| panic!("scene camera component was removed from {camera}"))
    }

    pub fn target(&self) -> RenderTargetId {
        self.target
    }

    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    /// Seconds accumulated by [`update`](Self::update).
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// The transform node of `entity`.
    ///
    /// # Panics
    ///
    /// If the entity is dead or wasn't created through the scene.
    pub fn transform(&self, entity: Entity) -> TransformId {
        *self
            .registry
            .get::<TransformId>(entity)
            .unwrap_or_else(|| panic!("entity {entity} has no transform"))
    }

    /// The entity owning transform node `id`.
    pub fn entity_of(&self, id: TransformId) -> Option<Entity> {
        self.owners.get(&id).copied()
    }

    // ── Entities ────────────────────────────────────────────────────────

    /// Create an entity with an identity transform and the default
    /// [`Tag`]. Under a parent, the new node keeps its identity world pose.
    ///
    /// # Panics
    ///
    /// If `parent` is dead.
    pub fn create_entity(&mut self, parent: Option<Entity>) -> Entity {
        let parent_transform = parent.map(|parent| self.transform(parent));

        let entity = self.registry.create_entity();
        let id = self.transforms.insert(C::Pose::default());
        if let Some(parent_transform) = parent_transform {
            // A fresh root can't be an ancestor of anything.
            self.transforms
                .set_parent(id, Some(parent_transform), true)
                .unwrap_or_else(|err| panic!("cannot parent new entity: {err}"));
        }

        self.registry.insert(entity, id);
        self.registry.insert(entity, Tag::default());
        self.owners.insert(id, entity);
        entity
    }

    /// Reparent `entity`, keeping its world pose.
    pub fn set_parent(&mut self, entity: Entity, parent: Option<Entity>) -> Result<(), HierarchyError> {
        let id = self.transform(entity);
        let parent = parent.map(|parent| self.transform(parent));
        self.transforms.set_parent(id, parent, true)
    }

    pub fn parent(&self, entity: Entity) -> Option<Entity> {
        let parent = self.transforms.parent(self.transform(entity))?;
        self.entity_of(parent)
    }

    pub fn children(&self, entity: Entity) -> Vec<Entity> {
        self.transforms
            .children(self.transform(entity))
            .iter()
            .filter_map(|id| self.entity_of(*id))
            .collect()
    }

    /// Delete `entity` together with every entity below it in the
    /// transform tree. Returns `false` if the entity was already dead or
    /// the subtree holds the scene camera.
    pub fn delete_entity(&mut self, entity: Entity) -> bool {
        let Some(&id) = self.registry.get::<TransformId>(entity) else {
            return false;
        };
        let camera = self.transform(self.camera);
        if id == camera || self.transforms.is_ancestor(id, camera) {
            log::warn!("Refusing to delete {entity}: its subtree holds the scene camera");
            return false;
        }

        for dead in self.transforms.remove_recursive(id) {
            if let Some(owner) = self.owners.remove(&dead) {
                self.registry.delete_entity(owner);
            }
        }
        true
    }

    // ── Frame ───────────────────────────────────────────────────────────

    /// Resize the camera and the render target. Zero or unchanged sizes
    /// are ignored.
    pub fn set_resolution<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        width: u32,
        height: u32,
    ) -> Result<(), ResourceError> {
        if width == 0 || height == 0 {
            log::warn!("Ignoring zero-size scene resolution {width}x{height}");
            return Ok(());
        }
        if (width, height) == self.resolution {
            return Ok(());
        }
        backend.resize_render_target(self.target, width, height)?;
        self.camera_mut()
            .set_resolution(Vec2::new(width as f32, height as f32));
        self.resolution = (width, height);
        Ok(())
    }

    /// Advance the scene clock by `delta` seconds and run `update`.
    pub fn update(&mut self, delta: f32, update: impl FnOnce(&mut Self, f32)) {
        self.elapsed += delta;
        update(self, delta);
    }
}

impl Scene<Camera2d> {
    /// Create a scene with a camera at the origin and a render target of
    /// `resolution` pixels.
    ///
    /// # Panics
    ///
    /// If either dimension is zero.
    pub fn new<B: RenderBackend>(backend: &mut B, resolution: (u32, u32)) -> Result<Self, ResourceError> {
        Self::with_camera(backend, resolution, Camera2d::new)
    }

    /// Draw every entity with a [`SpriteRenderer`] or [`ShapeRenderer`]
    /// into the scene's render target.
    pub fn render<B: RenderBackend>(&mut self, backend: &mut B, renderer: &mut Renderer2d) -> Result<(), ResourceError> {
        backend.bind_render_target(self.target);
        backend.clear(self.clear_color);

        let Self {
            registry,
            transforms,
            camera,
            ..
        } = self;
        let camera = registry
            .get_mut::<Camera2d>(*camera)
            .unwrap_or_else(|| panic!("scene camera component was removed"));
        renderer.begin(backend, camera, transforms);

        let drawn = registry.view::<TransformId>().try_for_each(|(entity, &id)| {
            let world = transforms.world(id);
            if let Some(sprite) = registry.get::<SpriteRenderer>(entity) {
                sprite.render(renderer, backend, &world)?;
            }
            if let Some(shape) = registry.get::<ShapeRenderer>(entity) {
                shape.render(renderer, backend, &world)?;
            }
            Ok::<(), ResourceError>(())
        });

        let ended = renderer.end(backend);
        backend.unbind_render_target();
        drawn.and(ended)
    }
}

impl Scene<Camera3d> {
    /// Create a scene with a perspective camera at the origin looking down
    /// -Z and a render target of `resolution` pixels.
    ///
    /// # Panics
    ///
    /// If either dimension is zero.
    pub fn new<B: RenderBackend>(backend: &mut B, resolution: (u32, u32)) -> Result<Self, ResourceError> {
        Self::with_camera(backend, resolution, Camera3d::new)
    }

    /// Draw every entity with a [`MeshRenderer`] into the scene's render
    /// target.
    pub fn render<B: RenderBackend>(&mut self, backend: &mut B, renderer: &mut Renderer3d) {
        backend.bind_render_target(self.target);
        backend.clear(self.clear_color);

        let Self {
            registry,
            transforms,
            camera,
            ..
        } = self;
        let camera = registry
            .get_mut::<Camera3d>(*camera)
            .unwrap_or_else(|| panic!("scene camera component was removed"));
        renderer.begin(backend, camera, transforms);

        for (_, &id, mesh) in registry.view2::<TransformId, MeshRenderer>() {
            let model = transforms.world_matrix(id);
            renderer.draw_mesh(backend, mesh, &model);
        }

        renderer.end();
        backend.unbind_render_target();
    }
}

impl<C: Camera> std::fmt::Debug for Scene<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("entities", &self.registry.len())
            .field("transforms", &self.transforms.len())
            .field("camera", &self.camera)
            .field("resolution", &self.resolution)
            .finish()
    }
}
