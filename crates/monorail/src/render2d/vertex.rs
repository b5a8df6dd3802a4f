//! # Vertex2d — Per-Corner Data for Batched 2D Geometry
//!
//! Every quad, triangle and ellipse is flattened into world-space vertices
//! on the CPU, so one buffer can hold geometry from many different
//! transforms and textures. The shader only applies the camera matrix.
//!
//! ```text
//! Vertex2d (40 bytes per vertex)
//! ┌────────────┬──────────────┬───────────┬──────────┬────────┐
//! │ position   │ color        │ uv        │ tex idx  │ pad    │
//! │ [f32; 3]   │ [f32; 4]     │ [f32; 2]  │ u8       │ [u8;3] │
//! │ offset 0   │ offset 12    │ offset 28 │ 36       │ 37     │
//! │ location 0 │ location 1   │ location 2│ loc 3    │        │
//! └────────────┴──────────────┴───────────┴──────────┴────────┘
//! ```
//!
//! `texture_index` 0 means "no texture, use the color as-is". Index `n > 0`
//! samples the texture bound to slot `n - 1`. The index byte is fetched as
//! `Uint8x4` so the struct stays 4-byte aligned with explicit padding.

use bytemuck::{Pod, Zeroable};

use crate::math::{Color, Vec2, Vec3};

/// Texture index meaning "solid color".
pub const NO_TEXTURE: u8 = 0;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex2d {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
    pub texture_index: u8,
    pub _pad: [u8; 3],
}

impl Vertex2d {
    pub fn new(position: Vec3, color: Color, uv: Vec2, texture_index: u8) -> Self {
        Self {
            position: position.to_array(),
            color: color.to_array(),
            uv: uv.to_array(),
            texture_index,
            _pad: [0; 3],
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    pub fn uv(&self) -> Vec2 {
        Vec2::from_array(self.uv)
    }

    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex2d>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // color
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            },
            // uv
            wgpu::VertexAttribute {
                offset: 28,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x2,
            },
            // texture index + padding
            wgpu::VertexAttribute {
                offset: 36,
                shader_location: 3,
                format: wgpu::VertexFormat::Uint8x4,
            },
        ],
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_struct() {
        assert_eq!(std::mem::size_of::<Vertex2d>(), 40);
        assert_eq!(Vertex2d::LAYOUT.array_stride, 40);
        let v = Vertex2d::new(Vec3::new(1.0, 2.0, 3.0), Color::RED, Vec2::new(0.5, 1.0), 7);
        let bytes = bytemuck::bytes_of(&v);
        assert_eq!(bytes[36], 7);
        assert_eq!(&bytes[0..4], &1.0f32.to_ne_bytes());
        assert_eq!(&bytes[28..32], &0.5f32.to_ne_bytes());
    }
}
