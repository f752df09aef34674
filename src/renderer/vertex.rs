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

    /// Bytes per vertex in a GPU buffer
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
}

/// Colors for surface elements
pub mod colors {
    /// Dry sand (#e6e1d5)
    pub const SAND: [u8; 3] = [230, 225, 213];
    /// Default crack stroke (#403c35)
    pub const CRACK: [f32; 4] = [0.251, 0.235, 0.208, 1.0];
    /// Dust particles (#5e5a50), alpha comes from particle life
    pub const DUST: [f32; 3] = [0.369, 0.353, 0.314];
}
