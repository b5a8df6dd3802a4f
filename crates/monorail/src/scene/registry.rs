//! # Registry — Entities and Their Components
//!
//! One column per component type, keyed by `TypeId`. A column is a
//! `Vec<Option<T>>` indexed by entity slot, so iteration order is slot order
//! and every lookup is a bounds check plus a generation check.
//!
//! ```text
//!                slot 0   slot 1   slot 2
//! TransformId    [ Some ,  Some  ,  Some ]
//! Tag            [ Some ,  Some  ,  Some ]
//! SpriteRenderer [ None ,  Some  ,  None ]
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::entity::{Entity, EntityAllocator};

// ── Columns ─────────────────────────────────────────────────────────────

trait AnyColumn: Any {
    fn clear_slot(&mut self, index: u32);
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

struct Column<T>(Vec<Option<T>>);

impl<T: 'static> Column<T> {
    fn get(&self, index: u32) -> Option<&T> {
        self.0.get(index as usize).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.0.get_mut(index as usize).and_then(Option::as_mut)
    }

    fn set(&mut self, index: u32, value: T) -> Option<T> {
        let index = index as usize;
        if index >= self.0.len() {
            self.0.resize_with(index + 1, || None);
        }
        self.0[index].replace(value)
    }

    fn take(&mut self, index: u32) -> Option<T> {
        self.0.get_mut(index as usize).and_then(Option::take)
    }
}

impl<T: 'static> AnyColumn for Column<T> {
    fn clear_slot(&mut self, index: u32) {
        self.take(index);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// ── Registry ────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct Registry {
    entities: EntityAllocator,
    columns: HashMap<TypeId, Box<dyn AnyColumn>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_entity(&mut self) -> Entity {
        self.entities.allocate()
    }

    /// Delete `entity` and drop all of its components. Returns `false` if it
    /// was already gone.
    pub fn delete_entity(&mut self, entity: Entity) -> bool {
        if !self.entities.deallocate(entity) {
            return false;
        }
        for column in self.columns.values_mut() {
            column.clear_slot(entity.index);
        }
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    pub fn len(&self) -> usize {
        self.entities.alive_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.entities.iter()
    }

    /// Attach `component`, returning the previous value of that type.
    ///
    /// # Panics
    ///
    /// If `entity` has been deleted.
    pub fn insert<T: 'static>(&mut self, entity: Entity, component: T) -> Option<T> {
        assert!(self.is_alive(entity), "insert on deleted entity {entity}");
        self.columns
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(Column::<T>(Vec::new())))
            .as_any_mut()
            .downcast_mut::<Column<T>>()
            .and_then(|column| column.set(entity.index, component))
    }

    pub fn remove<T: 'static>(&mut self, entity: Entity) -> Option<T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.column_mut::<T>()?.take(entity.index)
    }

    pub fn get<T: 'static>(&self, entity: Entity) -> Option<&T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.column::<T>()?.get(entity.index)
    }

    pub fn get_mut<T: 'static>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.is_alive(entity) {
            return None;
        }
        self.column_mut::<T>()?.get_mut(entity.index)
    }

    pub fn has<T: 'static>(&self, entity: Entity) -> bool {
        self.get::<T>(entity).is_some()
    }

    /// Every live entity carrying a `T`, in slot order.
    pub fn view<T: 'static>(&self) -> impl Iterator<Item = (Entity, &T)> + '_ {
        self.entities()
            .filter_map(move |entity| self.get::<T>(entity).map(|component| (entity, component)))
    }

    /// Every live entity carrying both an `A` and a `B`, in slot order.
    pub fn view2<A: 'static, B: 'static>(&self) -> impl Iterator<Item = (Entity, &A, &B)> + '_ {
        self.entities().filter_map(move |entity| {
            let a = self.get::<A>(entity)?;
            let b = self.get::<B>(entity)?;
            Some((entity, a, b))
        })
    }

    fn column<T: 'static>(&self) -> Option<&Column<T>> {
        self.columns
            .get(&TypeId::of::<T>())?
            .as_any()
            .downcast_ref::<Column<T>>()
    }

    fn column_mut<T: 'static>(&mut self) -> Option<&mut Column<T>> {
        self.columns
            .get_mut(&TypeId::of::<T>())?
            .as_any_mut()
            .downcast_mut::<Column<T>>()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("entities", &self.len())
            .field("columns", &self.columns.len())
            .finish()
    }
}
