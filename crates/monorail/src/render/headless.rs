//! A [`RenderBackend`] that keeps everything in memory and records what it
//! was asked to do.
//!
//! Useful for tests and for running scenes without a GPU: buffer contents
//! are real byte vectors, and every state change and draw is appended to a
//! command log that can be inspected afterwards.

use super::backend::{
    BufferId, BufferKind, MAX_TEXTURE_SLOTS, Program, RenderBackend, RenderTargetId, Texture,
    TextureId, assert_target_size, validate_rgba,
};
use crate::error::{ResourceError, ResourceKind};
use crate::math::{Color, Mat4};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Upload {
        buffer: BufferId,
        offset: u64,
        len: usize,
    },
    Allocate {
        buffer: BufferId,
        size: u64,
    },
    BindTexture {
        slot: u32,
        texture: TextureId,
    },
    UnbindTexture {
        slot: u32,
    },
    SetMat4 {
        program: Program,
        name: String,
        value: Mat4,
    },
    SetIntArray {
        program: Program,
        name: String,
        values: Vec<i32>,
    },
    Draw {
        program: Program,
        index_count: u32,
        /// Texture bound to each slot at the time of the draw.
        textures: Vec<Option<TextureId>>,
    },
    BindTarget(RenderTargetId),
    UnbindTarget,
    Clear(Color),
}

struct HeadlessBuffer {
    kind: BufferKind,
    data: Vec<u8>,
}

/// In-memory recording backend.
pub struct HeadlessBackend {
    buffers: Vec<Option<HeadlessBuffer>>,
    textures: Vec<Option<(u32, u32)>>,
    targets: Vec<(u32, u32)>,
    slots: Vec<Option<TextureId>>,
    bound_target: Option<RenderTargetId>,
    commands: Vec<Command>,
    max_texture_slots: usize,
    max_buffer_size: u64,
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::with_texture_slots(MAX_TEXTURE_SLOTS)
    }

    /// Pretend the device supports only `slots` textures per batch.
    pub fn with_texture_slots(slots: usize) -> Self {
        Self {
            buffers: Vec::new(),
            textures: Vec::new(),
            targets: Vec::new(),
            slots: vec![None; slots],
            bound_target: None,
            commands: Vec::new(),
            max_texture_slots: slots,
            max_buffer_size: u64::MAX,
        }
    }

    /// Fail any later buffer creation or growth past `bytes`, the way a
    /// device runs into its buffer size limit.
    pub fn set_max_buffer_size(&mut self, bytes: u64) {
        self.max_buffer_size = bytes;
    }

    fn check_buffer_size(&self, size: u64) -> Result<usize, ResourceError> {
        if size > self.max_buffer_size {
            return Err(ResourceError::new(
                ResourceKind::Buffer,
                format!("{size} bytes exceeds the {} byte limit", self.max_buffer_size),
            ));
        }
        usize::try_from(size)
            .map_err(|_| ResourceError::new(ResourceKind::Buffer, format!("{size} bytes is too large")))
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    /// Recorded draws as `(program, index_count)`.
    pub fn draws(&self) -> Vec<(Program, u32)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Draw {
                    program,
                    index_count,
                    ..
                } => Some((*program, *index_count)),
                _ => None,
            })
            .collect()
    }

    pub fn draw_calls(&self) -> usize {
        self.draws().len()
    }

    /// Raw contents of a buffer.
    pub fn buffer_data(&self, buffer: BufferId) -> &[u8] {
        &self.buffer(buffer).data
    }

    pub fn buffer_kind(&self, buffer: BufferId) -> BufferKind {
        self.buffer(buffer).kind
    }

    /// Texture currently bound to `slot`.
    pub fn bound_texture(&self, slot: u32) -> Option<TextureId> {
        self.slots.get(slot as usize).copied().flatten()
    }

    pub fn bound_render_target(&self) -> Option<RenderTargetId> {
        self.bound_target
    }

    /// Number of live textures.
    pub fn texture_count(&self) -> usize {
        self.textures.iter().flatten().count()
    }

    fn buffer(&self, buffer: BufferId) -> &HeadlessBuffer {
        self.buffers
            .get(buffer.0 as usize)
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("unknown buffer {buffer:?}"))
    }

    fn buffer_mut(&mut self, buffer: BufferId) -> &mut HeadlessBuffer {
        self.buffers
            .get_mut(buffer.0 as usize)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("unknown buffer {buffer:?}"))
    }

    fn target_mut(&mut self, target: RenderTargetId) -> &mut (u32, u32) {
        self.targets
            .get_mut(target.0 as usize)
            .unwrap_or_else(|| panic!("unknown render target {target:?}"))
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_buffer(&mut self, kind: BufferKind, size: u64) -> Result<BufferId, ResourceError> {
        let len = self.check_buffer_size(size)?;
        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(Some(HeadlessBuffer {
            kind,
            data: vec![0; len],
        }));
        Ok(id)
    }

    fn allocate_buffer(&mut self, buffer: BufferId, size: u64) -> Result<(), ResourceError> {
        let len = self.check_buffer_size(size)?;
        self.buffer_mut(buffer).data = vec![0; len];
        self.commands.push(Command::Allocate { buffer, size });
        Ok(())
    }

    fn buffer_size(&self, buffer: BufferId) -> u64 {
        self.buffer(buffer).data.len() as u64
    }

    fn upload_buffer(&mut self, buffer: BufferId, offset: u64, data: &[u8]) {
        let target = &mut self.buffer_mut(buffer).data;
        let start = offset as usize;
        let end = start + data.len();
        assert!(
            end <= target.len(),
            "upload of {} bytes at {offset} overflows buffer of {} bytes",
            data.len(),
            target.len()
        );
        target[start..end].copy_from_slice(data);
        self.commands.push(Command::Upload {
            buffer,
            offset,
            len: data.len(),
        });
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        if let Some(slot) = self.buffers.get_mut(buffer.0 as usize) {
            *slot = None;
        }
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<Texture, ResourceError> {
        validate_rgba(width, height, rgba)?;
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(Some((width, height)));
        Ok(Texture::new(id, width, height))
    }

    fn destroy_texture(&mut self, texture: Texture) {
        if let Some(slot) = self.textures.get_mut(texture.id().0 as usize) {
            *slot = None;
        }
    }

    fn bind_texture(&mut self, slot: u32, texture: &Texture) {
        let index = slot as usize;
        assert!(index < self.slots.len(), "texture slot {slot} out of range");
        self.slots[index] = Some(texture.id());
        self.commands.push(Command::BindTexture {
            slot,
            texture: texture.id(),
        });
    }

    fn unbind_texture(&mut self, slot: u32) {
        if let Some(bound) = self.slots.get_mut(slot as usize) {
            *bound = None;
        }
        self.commands.push(Command::UnbindTexture { slot });
    }

    fn max_texture_slots(&self) -> usize {
        self.max_texture_slots
    }

    fn set_mat4(&mut self, program: Program, name: &str, value: &Mat4) {
        self.commands.push(Command::SetMat4 {
            program,
            name: name.to_owned(),
            value: *value,
        });
    }

    fn set_int_array(&mut self, program: Program, name: &str, values: &[i32]) {
        self.commands.push(Command::SetIntArray {
            program,
            name: name.to_owned(),
            values: values.to_vec(),
        });
    }

    fn draw_indexed(&mut self, program: Program, vertices: BufferId, indices: BufferId, index_count: u32) {
        assert_eq!(self.buffer(vertices).kind, BufferKind::Vertex, "not a vertex buffer");
        assert_eq!(self.buffer(indices).kind, BufferKind::Index, "not an index buffer");
        assert!(
            index_count as usize * 4 <= self.buffer(indices).data.len(),
            "draw of {index_count} indices overruns the index buffer"
        );
        self.commands.push(Command::Draw {
            program,
            index_count,
            textures: self.slots.clone(),
        });
    }

    fn create_render_target(&mut self, width: u32, height: u32) -> Result<RenderTargetId, ResourceError> {
        assert_target_size(width, height);
        let id = RenderTargetId(self.targets.len() as u32);
        self.targets.push((width, height));
        Ok(id)
    }

    fn resize_render_target(&mut self, target: RenderTargetId, width: u32, height: u32) -> Result<(), ResourceError> {
        assert_target_size(width, height);
        *self.target_mut(target) = (width, height);
        Ok(())
    }

    fn render_target_size(&self, target: RenderTargetId) -> (u32, u32) {
        self.targets
            .get(target.0 as usize)
            .copied()
            .unwrap_or_else(|| panic!("unknown render target {target:?}"))
    }

    fn bind_render_target(&mut self, target: RenderTargetId) {
        self.bound_target = Some(target);
        self.commands.push(Command::BindTarget(target));
    }

    fn unbind_render_target(&mut self) {
        self.bound_target = None;
        self.commands.push(Command::UnbindTarget);
    }

    fn clear(&mut self, color: Color) {
        self.commands.push(Command::Clear(color));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploads_land_in_buffer() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend.create_buffer(BufferKind::Vertex, 8).unwrap();
        backend.upload_buffer(buffer, 4, &[1, 2, 3, 4]);
        assert_eq!(backend.buffer_data(buffer), &[0, 0, 0, 0, 1, 2, 3, 4]);

        backend.allocate_buffer(buffer, 16).unwrap();
        assert_eq!(backend.buffer_size(buffer), 16);
        assert!(backend.buffer_data(buffer).iter().all(|b| *b == 0));
    }

    #[test]
    fn buffer_limit_rejects_growth() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend.create_buffer(BufferKind::Index, 8).unwrap();
        backend.set_max_buffer_size(8);
        let err = backend.allocate_buffer(buffer, 16).unwrap_err();
        assert_eq!(err.kind, ResourceKind::Buffer);
        assert_eq!(backend.buffer_size(buffer), 8);
        assert!(backend.create_buffer(BufferKind::Vertex, 9).is_err());
    }

    #[test]
    #[should_panic(expected = "overflows")]
    fn upload_past_end_panics() {
        let mut backend = HeadlessBackend::new();
        let buffer = backend.create_buffer(BufferKind::Index, 4).unwrap();
        backend.upload_buffer(buffer, 0, &[0; 8]);
    }

    #[test]
    fn texture_validation() {
        let mut backend = HeadlessBackend::new();
        let err = backend.create_texture(2, 2, &[255; 4]).unwrap_err();
        assert_eq!(err.kind, ResourceKind::Texture);
        assert!(backend.create_texture(0, 1, &[]).is_err());

        let a = backend.create_texture(1, 1, &[255; 4]).unwrap();
        let b = backend.create_texture(1, 1, &[255; 4]).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, a);
        assert_eq!(backend.texture_count(), 2);
    }

    #[test]
    fn draw_snapshots_bound_textures() {
        let mut backend = HeadlessBackend::with_texture_slots(2);
        let tex = backend.create_texture(1, 1, &[0; 4]).unwrap();
        let vb = backend.create_buffer(BufferKind::Vertex, 64).unwrap();
        let ib = backend.create_buffer(BufferKind::Index, 24).unwrap();
        backend.bind_texture(1, &tex);
        backend.draw_indexed(Program::Sprite2d, vb, ib, 6);

        assert_eq!(backend.draws(), vec![(Program::Sprite2d, 6)]);
        match backend.commands().last() {
            Some(Command::Draw { textures, .. }) => assert_eq!(textures, &vec![None, Some(tex.id())]),
            other => panic!("expected draw, got {other:?}"),
        }
    }

    #[test]
    #[should_panic(expected = "non-zero")]
    fn zero_size_target_panics() {
        let mut backend = HeadlessBackend::new();
        let _ = backend.create_render_target(0, 10);
    }
}
