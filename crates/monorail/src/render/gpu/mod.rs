//! # GPU Backend — wgpu
//!
//! [`WgpuBackend`] implements [`RenderBackend`] on a wgpu device without a
//! window. Everything is drawn into offscreen render targets: the default
//! target created from [`BackendConfig`], or one created through the trait.
//! Each target has a colour texture and a `Depth32Float` depth texture.
//!
//! ## Submission Model
//!
//! ```text
//! set_mat4 ───────▶ queue.write_buffer (uniform)        ┐ applied in order
//! upload_buffer ──▶ queue.write_buffer (vertex/index)   ┘ at the next submit
//! draw_indexed ───▶ encoder: one render pass (Load/Store) ──▶ queue.submit
//! clear ──────────▶ encoder: one render pass (Clear)      ──▶ queue.submit
//! ```
//!
//! Queue writes land before the commands of the next submission, so every
//! draw sees exactly the uniforms and vertex data set before it. This keeps
//! the backend as stateful as the trait promises without recording a frame
//! graph.
//!
//! ## Texture Slots
//!
//! Slot `n` is binding `2 + n` of the sprite program. Empty slots are
//! filled with a 1x1 white texture so the bind group is always complete.
//! The bind group is rebuilt lazily after any slot changes.

mod pipeline;

use bytemuck::{Pod, Zeroable};

use self::pipeline::{DEPTH_FORMAT, ProgramPipeline, mesh_pipeline, sprite_pipeline};
use super::backend::{
    BufferId, BufferKind, MAX_TEXTURE_SLOTS, Program, RenderBackend, RenderTargetId, Texture,
    TextureId, assert_target_size, uniforms, validate_rgba,
};
use crate::error::{ResourceError, ResourceKind};
use crate::math::{Color, Mat4};

/// Settings for [`WgpuBackend`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackendConfig {
    /// Size of the default render target.
    pub width: u32,
    pub height: u32,
    /// Colour format of every render target.
    pub format: wgpu::TextureFormat,
    /// Requested texture slots for the sprite program, capped by the device.
    pub texture_slots: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            texture_slots: MAX_TEXTURE_SLOTS,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct SpriteUniforms {
    projection_view: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
struct MeshUniforms {
    projection_view: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
}

const MAT4_SIZE: u64 = std::mem::size_of::<[[f32; 4]; 4]>() as u64;

struct GpuBuffer {
    buffer: wgpu::Buffer,
    kind: BufferKind,
    size: u64,
}

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

struct GpuTarget {
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
    width: u32,
    height: u32,
}

pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,

    sprite: ProgramPipeline,
    mesh: ProgramPipeline,
    sprite_uniforms: wgpu::Buffer,
    mesh_uniforms: wgpu::Buffer,
    sampler: wgpu::Sampler,
    white: GpuTexture,

    buffers: Vec<Option<GpuBuffer>>,
    textures: Vec<Option<GpuTexture>>,
    targets: Vec<GpuTarget>,
    default_target: GpuTarget,
    bound_target: Option<RenderTargetId>,

    slots: Vec<Option<TextureId>>,
    sprite_bind_group: Option<wgpu::BindGroup>,
    mesh_bind_group: Option<wgpu::BindGroup>,
}

impl WgpuBackend {
    /// Pick an adapter, open a device and build the pipelines.
    pub fn new(config: BackendConfig) -> Result<Self, ResourceError> {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| ResourceError::new(ResourceKind::Device, e.to_string()))?;

        let info = adapter.get_info();
        log::info!("GPU adapter: {} ({:?})", info.name, info.backend);

        let supported = adapter.limits().max_sampled_textures_per_shader_stage as usize;
        let slots = config.texture_slots.min(supported).min(MAX_TEXTURE_SLOTS).max(1);
        let required_limits = wgpu::Limits {
            max_sampled_textures_per_shader_stage: slots as u32,
            ..wgpu::Limits::default()
        };

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("monorail device"),
            required_limits,
            ..Default::default()
        }))
        .map_err(|e| ResourceError::new(ResourceKind::Device, e.to_string()))?;

        Self::from_device(device, queue, config)
    }

    /// Use an existing device, e.g. one shared with a windowing layer.
    pub fn from_device(device: wgpu::Device, queue: wgpu::Queue, config: BackendConfig) -> Result<Self, ResourceError> {
        assert_target_size(config.width, config.height);

        let supported = device.limits().max_sampled_textures_per_shader_stage as usize;
        let slot_count = config.texture_slots.min(supported).min(MAX_TEXTURE_SLOTS).max(1);
        if slot_count < config.texture_slots {
            log::warn!(
                "device supports {supported} sampled textures per stage, using {slot_count} of {} requested slots",
                config.texture_slots
            );
        }

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let sprite = sprite_pipeline(&device, config.format, slot_count);
        let mesh = mesh_pipeline(&device, config.format);
        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            log::error!("Shader error: {err}");
            return Err(ResourceError::new(ResourceKind::Shader, err.to_string()));
        }

        let sprite_uniforms = uniform_buffer(&device, "sprite uniforms", std::mem::size_of::<SpriteUniforms>() as u64);
        let mesh_uniforms = uniform_buffer(&device, "mesh uniforms", std::mem::size_of::<MeshUniforms>() as u64);
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let white = upload_texture(&device, &queue, 1, 1, &[255; 4], "white texture");
        let default_target = create_target(&device, config.format, config.width, config.height);

        log::info!(
            "wgpu backend ready: {}x{} {:?}, {slot_count} texture slots",
            config.width,
            config.height,
            config.format
        );

        Ok(Self {
            device,
            queue,
            format: config.format,
            sprite,
            mesh,
            sprite_uniforms,
            mesh_uniforms,
            sampler,
            white,
            buffers: Vec::new(),
            textures: Vec::new(),
            targets: Vec::new(),
            default_target,
            bound_target: None,
            slots: vec![None; slot_count],
            sprite_bind_group: None,
            mesh_bind_group: None,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Colour view of `target`, or of the default target for `None`.
    pub fn target_view(&self, target: Option<RenderTargetId>) -> &wgpu::TextureView {
        &self.target(target).color_view
    }

    /// Copy a render target's colour back to the CPU.
    pub fn read_render_target(&self, target: Option<RenderTargetId>) -> Result<image::RgbaImage, ResourceError> {
        let target = self.target(target);
        let (width, height) = (target.width, target.height);
        let row_bytes = width * 4;
        let padded_row = padded_row_bytes(width);

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("readback buffer"),
            size: padded_row as u64 * height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("readback") });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &target.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(Some(encoder.finish()));

        let readback_error = |reason: String| ResourceError::new(ResourceKind::RenderTarget, reason);
        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let mapped = loop {
            self.device
                .poll(wgpu::PollType::Poll)
                .map_err(|e| readback_error(e.to_string()))?;
            match rx.try_recv() {
                Ok(result) => break result,
                Err(std::sync::mpsc::TryRecvError::Empty) => std::thread::yield_now(),
                Err(std::sync::mpsc::TryRecvError::Disconnected) => {
                    return Err(readback_error("map callback dropped".into()));
                }
            }
        };
        mapped.map_err(|e| readback_error(e.to_string()))?;

        let mut pixels = Vec::with_capacity((row_bytes * height) as usize);
        {
            let data = slice.get_mapped_range();
            for row in data.chunks(padded_row as usize) {
                pixels.extend_from_slice(&row[..row_bytes as usize]);
            }
        }
        staging.unmap();

        if matches!(
            self.format,
            wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb
        ) {
            for pixel in pixels.chunks_exact_mut(4) {
                pixel.swap(0, 2);
            }
        }

        image::RgbaImage::from_raw(width, height, pixels)
            .ok_or_else(|| readback_error(format!("readback size mismatch for {width}x{height}")))
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn target(&self, target: Option<RenderTargetId>) -> &GpuTarget {
        match target {
            Some(id) => self
                .targets
                .get(id.0 as usize)
                .unwrap_or_else(|| panic!("unknown render target {id:?}")),
            None => &self.default_target,
        }
    }

    fn buffer(&self, buffer: BufferId) -> &GpuBuffer {
        self.buffers
            .get(buffer.0 as usize)
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("unknown buffer {buffer:?}"))
    }

    fn texture_view(&self, texture: Option<TextureId>) -> &wgpu::TextureView {
        texture
            .and_then(|id| self.textures.get(id.0 as usize))
            .and_then(Option::as_ref)
            .map_or(&self.white.view, |t| &t.view)
    }

    fn invalidate_bind_groups(&mut self) {
        self.sprite_bind_group = None;
        self.mesh_bind_group = None;
    }

    /// Bind group for `program` reflecting the current slots.
    fn bind_group(&mut self, program: Program) -> wgpu::BindGroup {
        let cached = match program {
            Program::Sprite2d => &self.sprite_bind_group,
            Program::Mesh3d => &self.mesh_bind_group,
        };
        if let Some(group) = cached {
            return group.clone();
        }

        let group = match program {
            Program::Sprite2d => {
                let mut entries = vec![
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.sprite_uniforms.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ];
                entries.extend(self.slots.iter().enumerate().map(|(slot, texture)| wgpu::BindGroupEntry {
                    binding: 2 + slot as u32,
                    resource: wgpu::BindingResource::TextureView(self.texture_view(*texture)),
                }));
                self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("sprite bind group"),
                    layout: &self.sprite.layout,
                    entries: &entries,
                })
            }
            Program::Mesh3d => self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("mesh bind group"),
                layout: &self.mesh.layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: self.mesh_uniforms.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::TextureView(
                            self.texture_view(self.slots.first().copied().flatten()),
                        ),
                    },
                ],
            }),
        };

        match program {
            Program::Sprite2d => self.sprite_bind_group = Some(group.clone()),
            Program::Mesh3d => self.mesh_bind_group = Some(group.clone()),
        }
        group
    }

    /// Run `create` inside validation and out-of-memory error scopes.
    fn scoped<T>(&self, kind: ResourceKind, create: impl FnOnce(&wgpu::Device) -> T) -> Result<T, ResourceError> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = create(&self.device);
        let validation = pollster::block_on(self.device.pop_error_scope());
        let oom = pollster::block_on(self.device.pop_error_scope());
        match validation.or(oom) {
            Some(err) => Err(ResourceError::new(kind, err.to_string())),
            None => Ok(value),
        }
    }

    fn new_buffer(&self, kind: BufferKind, size: u64) -> Result<GpuBuffer, ResourceError> {
        let size = size.max(wgpu::COPY_BUFFER_ALIGNMENT).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        } | wgpu::BufferUsages::COPY_DST;
        let buffer = self.scoped(ResourceKind::Buffer, |device| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(match kind {
                    BufferKind::Vertex => "vertex buffer",
                    BufferKind::Index => "index buffer",
                }),
                size,
                usage,
                mapped_at_creation: false,
            })
        })?;
        Ok(GpuBuffer { buffer, kind, size })
    }

    fn write_mat4(&self, buffer: &wgpu::Buffer, offset: u64, value: &Mat4) {
        self.queue
            .write_buffer(buffer, offset, bytemuck::cast_slice(&value.to_cols_array()));
    }

    fn render_pass(&mut self, clear: Option<Color>, draw: Option<(Program, BufferId, BufferId, u32)>) {
        let bind_group = draw.map(|(program, ..)| self.bind_group(program));
        let target = self.target(self.bound_target);

        let (color_load, depth_load) = match clear {
            Some(color) => (
                wgpu::LoadOp::Clear(wgpu::Color {
                    r: color.r as f64,
                    g: color.g as f64,
                    b: color.b as f64,
                    a: color.a as f64,
                }),
                wgpu::LoadOp::Clear(1.0),
            ),
            None => (wgpu::LoadOp::Load, wgpu::LoadOp::Load),
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("monorail pass") });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("monorail pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.color_view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &target.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if let (Some((program, vertices, indices, count)), Some(bind_group)) = (draw, &bind_group) {
                let pipeline = match program {
                    Program::Sprite2d => &self.sprite.pipeline,
                    Program::Mesh3d => &self.mesh.pipeline,
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, bind_group, &[]);
                pass.set_vertex_buffer(0, self.buffer(vertices).buffer.slice(..));
                pass.set_index_buffer(self.buffer(indices).buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..count, 0, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
    }
}

impl RenderBackend for WgpuBackend {
    fn create_buffer(&mut self, kind: BufferKind, size: u64) -> Result<BufferId, ResourceError> {
        let buffer = self.new_buffer(kind, size)?;
        let id = BufferId(self.buffers.len() as u32);
        self.buffers.push(Some(buffer));
        Ok(id)
    }

    fn allocate_buffer(&mut self, buffer: BufferId, size: u64) -> Result<(), ResourceError> {
        let kind = self.buffer(buffer).kind;
        let replacement = self.new_buffer(kind, size)?;
        if let Some(old) = self.buffers[buffer.0 as usize].replace(replacement) {
            old.buffer.destroy();
        }
        Ok(())
    }

    fn buffer_size(&self, buffer: BufferId) -> u64 {
        self.buffer(buffer).size
    }

    fn upload_buffer(&mut self, buffer: BufferId, offset: u64, data: &[u8]) {
        let gpu = self.buffer(buffer);
        assert!(
            offset % wgpu::COPY_BUFFER_ALIGNMENT == 0,
            "upload offset {offset} is not 4-byte aligned"
        );
        assert!(
            offset + data.len() as u64 <= gpu.size,
            "upload of {} bytes at {offset} overflows buffer of {} bytes",
            data.len(),
            gpu.size
        );
        if data.len() as u64 % wgpu::COPY_BUFFER_ALIGNMENT == 0 {
            self.queue.write_buffer(&gpu.buffer, offset, data);
        } else {
            let mut padded = data.to_vec();
            padded.resize(padded.len().next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT as usize), 0);
            self.queue.write_buffer(&gpu.buffer, offset, &padded);
        }
    }

    fn destroy_buffer(&mut self, buffer: BufferId) {
        if let Some(gpu) = self.buffers.get_mut(buffer.0 as usize).and_then(Option::take) {
            gpu.buffer.destroy();
        }
    }

    fn create_texture(&mut self, width: u32, height: u32, rgba: &[u8]) -> Result<Texture, ResourceError> {
        validate_rgba(width, height, rgba)?;
        let (device, queue) = (&self.device, &self.queue);
        let gpu = self.scoped(ResourceKind::Texture, |_| {
            upload_texture(device, queue, width, height, rgba, "texture")
        })?;
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(Some(gpu));
        Ok(Texture::new(id, width, height))
    }

    fn destroy_texture(&mut self, texture: Texture) {
        let Some(gpu) = self.textures.get_mut(texture.id().0 as usize).and_then(Option::take) else {
            return;
        };
        for slot in self.slots.iter_mut().filter(|s| **s == Some(texture.id())) {
            *slot = None;
        }
        self.invalidate_bind_groups();
        gpu.texture.destroy();
    }

    fn bind_texture(&mut self, slot: u32, texture: &Texture) {
        let index = slot as usize;
        assert!(index < self.slots.len(), "texture slot {slot} out of range");
        if self.slots[index] != Some(texture.id()) {
            self.slots[index] = Some(texture.id());
            self.invalidate_bind_groups();
        }
    }

    fn unbind_texture(&mut self, slot: u32) {
        if let Some(bound) = self.slots.get_mut(slot as usize)
            && bound.take().is_some()
        {
            self.invalidate_bind_groups();
        }
    }

    fn max_texture_slots(&self) -> usize {
        self.slots.len()
    }

    fn set_mat4(&mut self, program: Program, name: &str, value: &Mat4) {
        match (program, name) {
            (Program::Sprite2d, uniforms::PROJECTION_VIEW) => self.write_mat4(&self.sprite_uniforms, 0, value),
            (Program::Mesh3d, uniforms::PROJECTION_VIEW) => self.write_mat4(&self.mesh_uniforms, 0, value),
            (Program::Mesh3d, uniforms::MODEL) => self.write_mat4(&self.mesh_uniforms, MAT4_SIZE, value),
            _ => log::warn!("{program:?} has no mat4 uniform '{name}'"),
        }
    }

    fn set_int_array(&mut self, program: Program, name: &str, values: &[i32]) {
        // Slot n is always binding 2 + n; only the identity mapping exists.
        let identity = values.iter().enumerate().all(|(i, v)| *v == i as i32);
        if program != Program::Sprite2d || name != uniforms::TEXTURES || !identity {
            log::warn!("ignoring int array '{name}' for {program:?}: {values:?}");
        }
    }

    fn draw_indexed(&mut self, program: Program, vertices: BufferId, indices: BufferId, index_count: u32) {
        assert_eq!(self.buffer(vertices).kind, BufferKind::Vertex, "not a vertex buffer");
        assert_eq!(self.buffer(indices).kind, BufferKind::Index, "not an index buffer");
        assert!(
            index_count as u64 * 4 <= self.buffer(indices).size,
            "draw of {index_count} indices overruns the index buffer"
        );
        self.render_pass(None, Some((program, vertices, indices, index_count)));
    }

    fn create_render_target(&mut self, width: u32, height: u32) -> Result<RenderTargetId, ResourceError> {
        assert_target_size(width, height);
        let format = self.format;
        let target = self.scoped(ResourceKind::RenderTarget, |device| {
            create_target(device, format, width, height)
        })?;
        let id = RenderTargetId(self.targets.len() as u32);
        self.targets.push(target);
        Ok(id)
    }

    fn resize_render_target(&mut self, target: RenderTargetId, width: u32, height: u32) -> Result<(), ResourceError> {
        assert_target_size(width, height);
        let format = self.format;
        let replacement = self.scoped(ResourceKind::RenderTarget, |device| {
            create_target(device, format, width, height)
        })?;
        let slot = self
            .targets
            .get_mut(target.0 as usize)
            .unwrap_or_else(|| panic!("unknown render target {target:?}"));
        let old = std::mem::replace(slot, replacement);
        old.color.destroy();
        Ok(())
    }

    fn render_target_size(&self, target: RenderTargetId) -> (u32, u32) {
        let target = self.target(Some(target));
        (target.width, target.height)
    }

    fn bind_render_target(&mut self, target: RenderTargetId) {
        assert!((target.0 as usize) < self.targets.len(), "unknown render target {target:?}");
        self.bound_target = Some(target);
    }

    fn unbind_render_target(&mut self) {
        self.bound_target = None;
    }

    fn clear(&mut self, color: Color) {
        self.render_pass(Some(color), None);
    }
}

// ── Resource helpers ────────────────────────────────────────────────────

fn uniform_buffer(device: &wgpu::Device, label: &str, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    width: u32,
    height: u32,
    rgba: &[u8],
    label: &str,
) -> GpuTexture {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture { texture, view }
}

fn create_target(device: &wgpu::Device, format: wgpu::TextureFormat, width: u32, height: u32) -> GpuTarget {
    let size = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let color = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("render target colour"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT
            | wgpu::TextureUsages::TEXTURE_BINDING
            | wgpu::TextureUsages::COPY_SRC,
        view_formats: &[],
    });
    let depth = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("render target depth"),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    GpuTarget {
        color_view: color.create_view(&wgpu::TextureViewDescriptor::default()),
        depth_view: depth.create_view(&wgpu::TextureViewDescriptor::default()),
        color,
        width,
        height,
    }
}

/// Texture-to-buffer copies need rows padded to 256 bytes.
fn padded_row_bytes(width: u32) -> u32 {
    (width * 4).next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
}
