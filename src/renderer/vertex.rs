//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    #[cfg(target_arch = "wasm32")]
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Expand 0xRRGGBB into RGBA floats
pub fn rgb(hex: u32, alpha: f32) -> [f32; 4] {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    [r, g, b, alpha]
}

/// Colors that are not part of a level theme
pub mod colors {
    pub const LANE_DASH: [f32; 4] = [1.0, 1.0, 1.0, 0.35];
    pub const WINDSHIELD: [f32; 4] = [0.05, 0.08, 0.15, 0.85];
    pub const SIREN_RED: [f32; 4] = [1.0, 0.1, 0.2, 1.0];
    pub const SIREN_BLUE: [f32; 4] = [0.2, 0.4, 1.0, 1.0];
    pub const SHIELD_GLOW: [f32; 4] = [1.0, 0.8, 0.0, 0.25];
    pub const OIL_SHEEN: [f32; 4] = [0.4, 0.2, 0.6, 0.35];
    pub const PAUSE_DIM: [f32; 4] = [0.0, 0.0, 0.0, 0.35];
}
