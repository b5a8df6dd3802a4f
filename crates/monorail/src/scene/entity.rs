//! # Entity — Generational Handles
//!
//! An [`Entity`] is an index plus a generation. When an entity is deleted
//! its slot is recycled and the generation bumped, so handles kept from
//! before the delete stop matching instead of silently pointing at the new
//! occupant.
//!
//! ```text
//! Entity { index: 5, generation: 0 }  ← first allocation
//! Entity { index: 5, generation: 1 }  ← after recycle
//! ```

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Entity {
    /// Slot index. Useful for diagnostics, not as a stable identity.
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Hands out entity ids and recycles freed slots.
///
/// ```text
/// generations: [0, 1, 0, 2, 0]   ← one generation per slot ever allocated
/// free_list:   [1, 3]            ← slots available for reuse
/// ```
#[derive(Debug, Default)]
pub(crate) struct EntityAllocator {
    generations: Vec<u32>,
    free_list: Vec<u32>,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> Entity {
        if let Some(index) = self.free_list.pop() {
            // Generation was already bumped on deallocate.
            Entity {
                index,
                generation: self.generations[index as usize],
            }
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            Entity { index, generation: 0 }
        }
    }

    /// Free `entity`'s slot. Returns `false` if the handle was already stale.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.generations[entity.index as usize] += 1;
        self.free_list.push(entity.index);
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        self.generations
            .get(entity.index as usize)
            .is_some_and(|generation| *generation == entity.generation)
    }

    pub fn alive_count(&self) -> usize {
        self.generations.len() - self.free_list.len()
    }

    /// Every live entity, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        let mut free = self.free_list.clone();
        free.sort_unstable();
        self.generations
            .iter()
            .enumerate()
            .filter(move |(index, _)| free.binary_search(&(*index as u32)).is_err())
            .map(|(index, generation)| Entity {
                index: index as u32,
                generation: *generation,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recycle_bumps_generation() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        let e1 = alloc.allocate();
        assert_eq!((e0.index, e1.index), (0, 1));

        assert!(alloc.deallocate(e0));
        assert!(!alloc.is_alive(e0));
        assert!(!alloc.deallocate(e0));

        let reused = alloc.allocate();
        assert_eq!(reused.index, 0);
        assert_eq!(reused.generation, 1);
        assert_ne!(reused, e0);
    }

    #[test]
    fn iter_skips_free_slots() {
        let mut alloc = EntityAllocator::new();
        let entities: Vec<Entity> = (0..4).map(|_| alloc.allocate()).collect();
        alloc.deallocate(entities[1]);
        alloc.deallocate(entities[3]);
        assert_eq!(alloc.alive_count(), 2);
        assert_eq!(alloc.iter().collect::<Vec<_>>(), vec![entities[0], entities[2]]);
    }
}
