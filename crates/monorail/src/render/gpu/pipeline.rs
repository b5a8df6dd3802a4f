//! Render pipelines for the two backend programs.
//!
//! ```text
//!            group 0
//!            ┌───────────┬─────────┬──────────────────────────┐
//! Sprite2d   │ 0 camera  │ 1 samp  │ 2..2+N  texture per slot │  no cull, no depth test
//!            ├───────────┼─────────┼──────────────────────────┤
//! Mesh3d     │ 0 pv+model│ 1 samp  │ 2       texture          │  back-face cull, depth Less
//!            └───────────┴─────────┴──────────────────────────┘
//! ```
//!
//! Texture binding arrays need a native-only device feature, so the sprite
//! shader gets one binding per slot and a `switch` over the vertex texture
//! index. Both are generated for the slot count the device allows.

use std::fmt::Write as _;

use crate::render2d::Vertex2d;
use crate::render3d::MeshVertex;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// First binding of the sprite texture slots.
const FIRST_TEXTURE_BINDING: u32 = 2;

const SPRITE_SHADER: &str = include_str!("sprite.wgsl");
const MESH_SHADER: &str = include_str!("mesh.wgsl");

pub(crate) struct ProgramPipeline {
    pub pipeline: wgpu::RenderPipeline,
    pub layout: wgpu::BindGroupLayout,
}

/// Sprite shader source with `slots` texture bindings.
pub(crate) fn sprite_shader_source(slots: usize) -> String {
    let mut bindings = String::new();
    let mut cases = String::new();
    for slot in 0..slots {
        let binding = FIRST_TEXTURE_BINDING as usize + slot;
        let _ = writeln!(
            bindings,
            "@group(0) @binding({binding}) var texture_{slot}: texture_2d<f32>;"
        );
        let _ = writeln!(
            cases,
            "        case {slot}u: {{\n            return textureSampleLevel(texture_{slot}, samp, uv, 0.0);\n        }}"
        );
    }
    SPRITE_SHADER
        .replace("//#TEXTURE_BINDINGS", &bindings)
        .replace("//#TEXTURE_SWITCH", &cases)
}

fn uniform_entry(binding: u32, visibility: wgpu::ShaderStages) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn sampler_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
        count: None,
    }
}

fn texture_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }
}

pub(crate) fn sprite_pipeline(device: &wgpu::Device, format: wgpu::TextureFormat, slots: usize) -> ProgramPipeline {
    let mut entries = vec![
        uniform_entry(0, wgpu::ShaderStages::VERTEX),
        sampler_entry(1),
    ];
    entries.extend((0..slots as u32).map(|slot| texture_entry(FIRST_TEXTURE_BINDING + slot)));

    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("sprite bind group layout"),
        entries: &entries,
    });
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("sprite shader"),
        source: wgpu::ShaderSource::Wgsl(sprite_shader_source(slots).into()),
    });

    let depth = wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: false,
        depth_compare: wgpu::CompareFunction::Always,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    };
    let primitive = wgpu::PrimitiveState {
        cull_mode: None,
        ..Default::default()
    };
    let pipeline = build(device, "sprite", &layout, &shader, Vertex2d::LAYOUT, format, primitive, depth);
    ProgramPipeline { pipeline, layout }
}

pub(crate) fn mesh_pipeline(device: &wgpu::Device, format: wgpu::TextureFormat) -> ProgramPipeline {
    let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("mesh bind group layout"),
        entries: &[
            uniform_entry(0, wgpu::ShaderStages::VERTEX),
            sampler_entry(1),
            texture_entry(2),
        ],
    });
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("mesh shader"),
        source: wgpu::ShaderSource::Wgsl(MESH_SHADER.into()),
    });

    let depth = wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: wgpu::StencilState::default(),
        bias: wgpu::DepthBiasState::default(),
    };
    let primitive = wgpu::PrimitiveState {
        front_face: wgpu::FrontFace::Ccw,
        cull_mode: Some(wgpu::Face::Back),
        ..Default::default()
    };
    let pipeline = build(device, "mesh", &layout, &shader, MeshVertex::LAYOUT, format, primitive, depth);
    ProgramPipeline { pipeline, layout }
}

#[allow(clippy::too_many_arguments)]
fn build(
    device: &wgpu::Device,
    label: &str,
    bind_group_layout: &wgpu::BindGroupLayout,
    shader: &wgpu::ShaderModule,
    vertex_layout: wgpu::VertexBufferLayout<'static>,
    format: wgpu::TextureFormat,
    primitive: wgpu::PrimitiveState,
    depth: wgpu::DepthStencilState,
) -> wgpu::RenderPipeline {
    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{label} pipeline layout")),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{label} pipeline")),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[vertex_layout],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive,
        depth_stencil: Some(depth),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
