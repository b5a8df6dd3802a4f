//! Error types.
//!
//! Only conditions a caller can reasonably handle are errors. Frame-lifecycle
//! misuse (drawing outside `begin`/`end`, beginning twice) is a bug in the
//! calling code and panics instead.

use std::fmt;

use crate::hierarchy::TransformId;

/// Errors from restructuring a transform hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HierarchyError {
    /// `parent` is `child` itself or one of its descendants.
    Cycle {
        child: TransformId,
        parent: TransformId,
    },
    /// The handle refers to a node that was removed.
    StaleHandle(TransformId),
}

impl fmt::Display for HierarchyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HierarchyError::Cycle { child, parent } => write!(
                f,
                "cannot parent {child:?} to {parent:?}: the new parent is a descendant"
            ),
            HierarchyError::StaleHandle(id) => write!(f, "stale transform handle {id:?}"),
        }
    }
}

impl std::error::Error for HierarchyError {}

/// The category of GPU object that failed to be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Device,
    Buffer,
    Texture,
    RenderTarget,
    Shader,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Device => "device",
            ResourceKind::Buffer => "buffer",
            ResourceKind::Texture => "texture",
            ResourceKind::RenderTarget => "render target",
            ResourceKind::Shader => "shader",
        };
        f.write_str(name)
    }
}

/// A GPU resource could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceError {
    pub kind: ResourceKind,
    pub reason: String,
}

impl ResourceError {
    pub fn new(kind: ResourceKind, reason: impl Into<String>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to create {}: {}", self.kind, self.reason)
    }
}

impl std::error::Error for ResourceError {}
