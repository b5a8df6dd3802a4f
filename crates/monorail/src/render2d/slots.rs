//! Texture slot table for a 2D batch.
//!
//! A batch can sample from a fixed number of textures at once. Textures are
//! assigned to slots in the order they are first used within the batch. A
//! texture that is already resident keeps its slot. When every slot is
//! taken, the renderer must flush before a new texture can be assigned.

use crate::render::Texture;

#[derive(Debug)]
pub struct TextureSlots {
    slots: Vec<Option<Texture>>,
    offset: usize,
}

impl TextureSlots {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0 && capacity < u8::MAX as usize, "invalid texture slot count {capacity}");
        Self {
            slots: vec![None; capacity],
            offset: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_full(&self) -> bool {
        self.offset == self.slots.len()
    }

    /// Slot holding `texture`, if resident.
    pub fn find(&self, texture: &Texture) -> Option<usize> {
        self.slots[..self.offset]
            .iter()
            .position(|slot| slot.as_ref() == Some(texture))
    }

    /// Put `texture` in the next free slot and return it.
    ///
    /// # Panics
    ///
    /// If the table is full.
    pub fn push(&mut self, texture: Texture) -> usize {
        assert!(!self.is_full(), "texture slots exhausted");
        let slot = self.offset;
        self.slots[slot] = Some(texture);
        self.offset += 1;
        slot
    }

    /// Resident textures in slot order.
    pub fn resident(&self) -> impl Iterator<Item = &Texture> {
        self.slots[..self.offset].iter().flatten()
    }

    pub fn reset(&mut self) {
        self.slots.fill(None);
        self.offset = 0;
    }
}
