//! # Hierarchy — Parent/Child Transform Trees
//!
//! Every renderable thing has a pose relative to its parent. The world pose
//! of a node is its local pose composed with every ancestor's, so moving a
//! parent moves the whole subtree. This module stores those trees in an
//! arena and computes world-space values lazily.
//!
//! ## Storage
//!
//! Nodes live in a `Vec` of slots addressed by [`TransformId`] (index +
//! generation, like an entity handle). Parent and child links are ids, never
//! references, so reparenting and removal can't leave dangling pointers and
//! the cycle check is a bounded walk up the parent chain.
//!
//! ```text
//! slots: [ root ]──children──▶[ arm ]──children──▶[ hand ]
//!           ▲                   │ ▲                  │
//!           └──────parent───────┘ └──────parent──────┘
//! ```
//!
//! ## Lazy Recompute
//!
//! Writes only flip [`DirtyFlags`]; reads do the math. Changing a node's
//! local pose marks the node fully dirty and walks its subtree marking every
//! descendant's world-derived caches stale. The walk stops at subtrees that
//! are already dirty, so a burst of edits costs one traversal. Reading a
//! world value first refreshes the dirty part of the ancestor chain, top
//! down, then the node itself. That is why world getters take `&mut self`.
//!
//! ## Change Tracking
//!
//! Each node carries a `revision` that increments once per clean → dirty
//! transition (its own or an ancestor's). Observers such as cameras remember
//! the last revision they saw and rebuild when it differs. Nothing is
//! subscribed, so there is nothing to unsubscribe when a node goes away.
//!
//! ## Matrix Convention
//!
//! glam is column-major with column vectors: `world = parent_world * local`.

mod dirty;
mod pose2d;
mod pose3d;

pub use dirty::DirtyFlags;

use std::fmt;

use crate::error::HierarchyError;
use crate::math::{Transform2d, Transform3d};

/// 2D transform hierarchy.
pub type Transforms2d = Hierarchy<Transform2d>;
/// 3D transform hierarchy.
pub type Transforms3d = Hierarchy<Transform3d>;

/// A local pose type the hierarchy knows how to compose.
pub trait Pose: Copy + PartialEq + fmt::Debug + Default {
    type Matrix: Copy + fmt::Debug;

    const IDENTITY_MATRIX: Self::Matrix;

    /// Matrix of this pose on its own (translate * rotate * scale).
    fn local_matrix(&self) -> Self::Matrix;

    /// `parent * local`.
    fn compose(parent: &Self::Matrix, local: &Self::Matrix) -> Self::Matrix;

    fn inverse(matrix: &Self::Matrix) -> Self::Matrix;

    /// World pose of a node whose local pose is `self`, given the parent's
    /// world pose and the node's already-composed world matrix.
    fn to_world(&self, parent: &Self, world_matrix: &Self::Matrix) -> Self;

    /// The local pose that produces `world` under `parent`.
    fn to_local(world: &Self, parent: &ParentFrame<Self>) -> Self;
}

/// A parent's world pose plus the matrix taking world space into its
/// local space.
#[derive(Debug, Clone, Copy)]
pub struct ParentFrame<P: Pose> {
    pub world: P,
    pub world_to_local: P::Matrix,
}

/// Handle to a node in a [`Hierarchy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransformId {
    index: u32,
    generation: u32,
}

struct Node<P: Pose> {
    local: P,
    parent: Option<TransformId>,
    children: Vec<TransformId>,
    dirty: DirtyFlags,
    revision: u64,
    local_matrix: P::Matrix,
    world_matrix: P::Matrix,
    world: P,
    world_to_local: P::Matrix,
    world_inverse: P::Matrix,
}

impl<P: Pose> Node<P> {
    fn new(local: P) -> Self {
        Self {
            local,
            parent: None,
            children: Vec::new(),
            dirty: DirtyFlags::ALL,
            revision: 0,
            local_matrix: P::IDENTITY_MATRIX,
            world_matrix: P::IDENTITY_MATRIX,
            world: local,
            world_to_local: P::IDENTITY_MATRIX,
            world_inverse: P::IDENTITY_MATRIX,
        }
    }
}

struct Slot<P: Pose> {
    generation: u32,
    node: Option<Node<P>>,
}

/// An arena of transform nodes linked into trees.
pub struct Hierarchy<P: Pose> {
    slots: Vec<Slot<P>>,
    free: Vec<u32>,
    len: usize,
}

impl<P: Pose> Default for Hierarchy<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Pose> Hierarchy<P> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: TransformId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate over the ids of all live nodes.
    pub fn ids(&self) -> impl Iterator<Item = TransformId> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node.as_ref().map(|_| TransformId {
                index: index as u32,
                generation: slot.generation,
            })
        })
    }

    // ── Structure ───────────────────────────────────────────────────────

    /// Add a root node with the given local pose.
    pub fn insert(&mut self, local: P) -> TransformId {
        self.len += 1;
        let node = Some(Node::new(local));
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = node;
            TransformId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node,
            });
            TransformId {
                index,
                generation: 0,
            }
        }
    }

    /// Add a node under `parent`. `local` is interpreted relative to the
    /// parent.
    pub fn insert_child(&mut self, parent: TransformId, local: P) -> Result<TransformId, HierarchyError> {
        if !self.contains(parent) {
            return Err(HierarchyError::StaleHandle(parent));
        }
        let id = self.insert(local);
        self.node_mut(id).parent = Some(parent);
        self.node_mut(parent).children.push(id);
        Ok(id)
    }

    /// Remove a node. Its children become roots and keep their world pose.
    /// Returns the removed node's local pose, or `None` for a stale id.
    pub fn remove(&mut self, id: TransformId) -> Option<P> {
        if !self.contains(id) {
            return None;
        }
        for child in self.node(id).children.clone() {
            let world = self.world(child);
            let node = self.node_mut(child);
            node.parent = None;
            node.local = world;
            self.invalidate(child);
        }
        self.node_mut(id).children.clear();
        self.unlink(id);

        let slot = &mut self.slots[id.index as usize];
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.len -= 1;
        Some(node.local)
    }

    /// Remove a node and its whole subtree. Returns the removed ids,
    /// parents before children.
    pub fn remove_recursive(&mut self, id: TransformId) -> Vec<TransformId> {
        if !self.contains(id) {
            return Vec::new();
        }
        let mut removed = vec![id];
        removed.extend(self.descendants(id));
        self.unlink(id);
        for &dead in &removed {
            let slot = &mut self.slots[dead.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(dead.index);
        }
        self.len -= removed.len();
        removed
    }

    /// Reparent `id`. With `retain_world`, the local pose is recomputed so
    /// the world pose is unchanged; otherwise the local pose is kept and
    /// the world pose follows the new parent.
    ///
    /// Fails if `parent` is `id` or one of its descendants.
    pub fn set_parent(
        &mut self,
        id: TransformId,
        parent: Option<TransformId>,
        retain_world: bool,
    ) -> Result<(), HierarchyError> {
        if !self.contains(id) {
            return Err(HierarchyError::StaleHandle(id));
        }
        if let Some(parent) = parent {
            if !self.contains(parent) {
                return Err(HierarchyError::StaleHandle(parent));
            }
            if parent == id || self.is_ancestor(id, parent) {
                return Err(HierarchyError::Cycle { child: id, parent });
            }
        }
        if self.node(id).parent == parent {
            return Ok(());
        }

        let world = retain_world.then(|| self.world(id));

        self.unlink(id);
        self.node_mut(id).parent = parent;
        if let Some(parent) = parent {
            self.node_mut(parent).children.push(id);
        }

        if let Some(world) = world {
            let local = self.relative_local(id, &world);
            self.node_mut(id).local = local;
        }
        self.invalidate(id);
        Ok(())
    }

    pub fn parent(&self, id: TransformId) -> Option<TransformId> {
        self.node(id).parent
    }

    pub fn children(&self, id: TransformId) -> &[TransformId] {
        &self.node(id).children
    }

    /// All descendants of `id` in depth-first pre-order, excluding `id`.
    pub fn descendants(&self, id: TransformId) -> Vec<TransformId> {
        let mut out = Vec::new();
        let mut stack: Vec<TransformId> = self.node(id).children.iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.node(next).children.iter().rev().copied());
        }
        out
    }

    /// Whether `ancestor` appears on `id`'s parent chain.
    pub fn is_ancestor(&self, ancestor: TransformId, id: TransformId) -> bool {
        let mut cursor = self.node(id).parent;
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.node(current).parent;
        }
        false
    }

    // ── Local space ─────────────────────────────────────────────────────

    pub fn local(&self, id: TransformId) -> P {
        self.node(id).local
    }

    /// Replace the local pose. A no-op if nothing changed.
    pub fn set_local(&mut self, id: TransformId, local: P) -> &mut Self {
        let node = self.node_mut(id);
        if node.local != local {
            node.local = local;
            self.invalidate(id);
        }
        self
    }

    /// Edit the local pose in place.
    pub fn update_local(&mut self, id: TransformId, edit: impl FnOnce(&mut P)) -> &mut Self {
        let mut local = self.local(id);
        edit(&mut local);
        self.set_local(id, local)
    }

    pub fn local_matrix(&mut self, id: TransformId) -> P::Matrix {
        let node = self.node_mut(id);
        if node.dirty.contains(DirtyFlags::LOCAL_MATRIX) {
            node.local_matrix = node.local.local_matrix();
            node.dirty.remove(DirtyFlags::LOCAL_MATRIX);
        }
        node.local_matrix
    }

    // ── World space ─────────────────────────────────────────────────────

    pub fn world(&mut self, id: TransformId) -> P {
        self.refresh(id);
        self.node(id).world
    }

    /// Set the world pose, deriving the local pose from the parent.
    pub fn set_world(&mut self, id: TransformId, world: P) -> &mut Self {
        let local = self.relative_local(id, &world);
        self.set_local(id, local)
    }

    pub fn world_matrix(&mut self, id: TransformId) -> P::Matrix {
        self.refresh(id);
        self.node(id).world_matrix
    }

    /// Matrix taking world space into this node's parent space, i.e. the
    /// inverse of the parent's world matrix. Identity for roots.
    pub fn world_to_local_matrix(&mut self, id: TransformId) -> P::Matrix {
        self.refresh(id);
        if self.node(id).dirty.contains(DirtyFlags::WORLD_TO_LOCAL) {
            let parent = self.node(id).parent;
            let matrix = match parent {
                Some(parent) => self.world_inverse_matrix(parent),
                None => P::IDENTITY_MATRIX,
            };
            let node = self.node_mut(id);
            node.world_to_local = matrix;
            node.dirty.remove(DirtyFlags::WORLD_TO_LOCAL);
        }
        self.node(id).world_to_local
    }

    /// Inverse of [`world_matrix`](Self::world_matrix).
    pub fn world_inverse_matrix(&mut self, id: TransformId) -> P::Matrix {
        self.refresh(id);
        let node = self.node_mut(id);
        if node.dirty.contains(DirtyFlags::WORLD_INVERSE) {
            node.world_inverse = P::inverse(&node.world_matrix);
            node.dirty.remove(DirtyFlags::WORLD_INVERSE);
        }
        node.world_inverse
    }

    /// The parent's world frame, or `None` for roots.
    pub fn parent_frame(&mut self, id: TransformId) -> Option<ParentFrame<P>> {
        let parent = self.node(id).parent?;
        Some(ParentFrame {
            world: self.world(parent),
            world_to_local: self.world_inverse_matrix(parent),
        })
    }

    /// The local pose `id` would need for its world pose to be `world`.
    pub fn relative_local(&mut self, id: TransformId, world: &P) -> P {
        match self.parent_frame(id) {
            Some(frame) => P::to_local(world, &frame),
            None => *world,
        }
    }

    // ── Change tracking ─────────────────────────────────────────────────

    /// Increments once each time the node goes from clean to dirty.
    pub fn revision(&self, id: TransformId) -> u64 {
        self.node(id).revision
    }

    /// Whether the cached world values need recomputing.
    pub fn is_dirty(&self, id: TransformId) -> bool {
        self.node(id).dirty.contains(DirtyFlags::WORLD_MATRIX)
    }

    pub fn dirty_flags(&self, id: TransformId) -> DirtyFlags {
        self.node(id).dirty
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn get(&self, id: TransformId) -> Option<&Node<P>> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    fn node(&self, id: TransformId) -> &Node<P> {
        self.get(id)
            .unwrap_or_else(|| panic!("stale transform handle {id:?}"))
    }

    fn node_mut(&mut self, id: TransformId) -> &mut Node<P> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .unwrap_or_else(|| panic!("stale transform handle {id:?}"))
    }

    fn unlink(&mut self, id: TransformId) {
        if let Some(parent) = self.node_mut(id).parent.take() {
            self.node_mut(parent).children.retain(|child| *child != id);
        }
    }

    /// Mark `id` fully dirty and, on a clean → dirty transition, mark every
    /// descendant's world caches stale.
    fn invalidate(&mut self, id: TransformId) {
        let node = self.node_mut(id);
        let was_clean = !node.dirty.contains(DirtyFlags::WORLD_MATRIX);
        node.dirty = DirtyFlags::ALL;
        if !was_clean {
            return;
        }
        node.revision += 1;

        let mut stack = node.children.clone();
        while let Some(child) = stack.pop() {
            let node = self.node_mut(child);
            if node.dirty.contains(DirtyFlags::WORLD_MATRIX) {
                continue;
            }
            node.dirty.insert(DirtyFlags::WORLD);
            node.revision += 1;
            stack.extend_from_slice(&node.children);
        }
    }

    /// Bring the world caches of `id` and its dirty ancestors up to date.
    fn refresh(&mut self, id: TransformId) {
        if !self.is_dirty(id) {
            return;
        }
        let mut chain = vec![id];
        let mut cursor = self.node(id).parent;
        while let Some(current) = cursor {
            if !self.is_dirty(current) {
                break;
            }
            chain.push(current);
            cursor = self.node(current).parent;
        }
        for current in chain.into_iter().rev() {
            self.recompute(current);
        }
    }

    fn recompute(&mut self, id: TransformId) {
        let local_matrix = self.local_matrix(id);
        let parent = self.node(id).parent.map(|parent| {
            let parent = self.node(parent);
            (parent.world, parent.world_matrix)
        });

        let node = self.node_mut(id);
        match parent {
            Some((parent_world, parent_matrix)) => {
                node.world_matrix = P::compose(&parent_matrix, &local_matrix);
                node.world = node.local.to_world(&parent_world, &node.world_matrix);
            }
            None => {
                node.world_matrix = local_matrix;
                node.world = node.local;
            }
        }
        node.dirty.remove(DirtyFlags::WORLD_MATRIX | DirtyFlags::WORLD_POSE);
    }
}
