/// Counters for the current (or last finished) frame. Reset by `begin`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub draw_calls: u32,
    pub vertices: u32,
    pub indices: u32,
    /// Primitives that were submitted and emitted.
    pub primitives: u32,
    /// Primitives skipped by culling.
    pub culled: u32,
}
