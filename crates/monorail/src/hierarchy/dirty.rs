use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Which cached values of a transform node are stale.
///
/// ```text
/// bit  flag            recomputed from
/// 0    LOCAL_MATRIX    local pose
/// 1    WORLD_MATRIX    parent world matrix * local matrix
/// 2    WORLD_POSE      world matrix + parent world pose
/// 3    WORLD_TO_LOCAL  inverse of parent world matrix
/// 4    WORLD_INVERSE   inverse of world matrix
/// ```
///
/// A node is considered *dirty* while `WORLD_MATRIX` is set. Every dirty
/// node's descendants are dirty too, which is what lets invalidation stop
/// at the first already-dirty subtree.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct DirtyFlags(u8);

impl DirtyFlags {
    pub const CLEAN: Self = Self(0);
    pub const LOCAL_MATRIX: Self = Self(1 << 0);
    pub const WORLD_MATRIX: Self = Self(1 << 1);
    pub const WORLD_POSE: Self = Self(1 << 2);
    pub const WORLD_TO_LOCAL: Self = Self(1 << 3);
    pub const WORLD_INVERSE: Self = Self(1 << 4);

    /// Everything derived from the ancestor chain.
    pub const WORLD: Self = Self(
        Self::WORLD_MATRIX.0 | Self::WORLD_POSE.0 | Self::WORLD_TO_LOCAL.0 | Self::WORLD_INVERSE.0,
    );
    pub const ALL: Self = Self(Self::LOCAL_MATRIX.0 | Self::WORLD.0);

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    pub fn is_clean(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for DirtyFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DirtyFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for DirtyFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DirtyFlags({:#07b})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_remove() {
        let mut flags = DirtyFlags::CLEAN;
        assert!(flags.is_clean());
        flags.insert(DirtyFlags::WORLD_TO_LOCAL);
        assert!(flags.contains(DirtyFlags::WORLD_TO_LOCAL));
        assert!(!flags.contains(DirtyFlags::WORLD_MATRIX));
        flags |= DirtyFlags::ALL;
        assert!(flags.contains(DirtyFlags::WORLD | DirtyFlags::LOCAL_MATRIX));
        flags.remove(DirtyFlags::WORLD);
        assert_eq!(flags, DirtyFlags::LOCAL_MATRIX);
    }
}
