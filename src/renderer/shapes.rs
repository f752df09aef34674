//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, colors};
use crate::sim::SimState;

/// Thinnest stroke a crack tapers down to
const MIN_STROKE: f32 = 0.5;

/// Triangles per dust dot
const DOT_SEGMENTS: u32 = 8;

/// Drawing surface for crack strokes and dust
pub trait Canvas {
    /// Stroke a straight segment `a -> b`
    fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: [f32; 4]);
    /// Fill a disc
    fn dot(&mut self, center: Vec2, radius: f32, color: [f32; 4]);
}

/// Stroke width at path point `index`, tapering from `base` toward the tip
pub fn stroke_width(base: f32, index: usize, len: usize) -> f32 {
    if len == 0 {
        return base.max(MIN_STROKE);
    }
    let t = index as f32 / len as f32;
    (base * (1.0 - 0.5 * t)).max(MIN_STROKE)
}

/// Emit every crack stroke, then every dust particle, in creation order
pub fn draw(state: &SimState, canvas: &mut impl Canvas) {
    for crack in &state.cracks {
        let len = crack.path.len();
        for (i, w) in crack.path.windows(2).enumerate() {
            let width = stroke_width(crack.style.width, i, len);
            canvas.line(w[0], w[1], width, crack.style.color);
        }
    }

    for p in &state.particles {
        let [r, g, b] = colors::DUST;
        canvas.dot(p.pos, p.size, [r, g, b, p.alpha()]);
    }
}

/// Canvas that tessellates into a triangle list
#[derive(Debug, Default, Clone)]
pub struct VertexCanvas {
    pub vertices: Vec<Vertex>,
}

impl VertexCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// Raw bytes ready for a vertex buffer upload
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl Canvas for VertexCanvas {
    fn line(&mut self, a: Vec2, b: Vec2, width: f32, color: [f32; 4]) {
        self.vertices.extend(quad(a, b, width, color));
    }

    fn dot(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        self.vertices.extend(circle(center, radius, color, DOT_SEGMENTS));
    }
}

/// Generate vertices for a thick line segment (two triangles)
pub fn quad(a: Vec2, b: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (b - a).normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    let half = dir.perp() * (width * 0.5);

    let v1a = a + half;
    let v1b = a - half;
    let v2a = b + half;
    let v2b = b - half;

    vec![
        Vertex::new(v1a.x, v1a.y, color),
        Vertex::new(v1b.x, v1b.y, color),
        Vertex::new(v2a.x, v2a.y, color),
        Vertex::new(v2a.x, v2a.y, color),
        Vertex::new(v1b.x, v1b.y, color),
        Vertex::new(v2b.x, v2b.y, color),
    ]
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}
