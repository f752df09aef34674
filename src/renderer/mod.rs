//! Rendering helpers
//!
//! Everything here only reads simulation state. A host feeds the output of
//! [`draw`] into its own canvas, or uploads [`VertexCanvas`] data to the GPU.

pub mod shapes;
pub mod texture;
pub mod vertex;

pub use shapes::{Canvas, VertexCanvas, draw, stroke_width};
pub use texture::{sand_noise, sand_texture};
pub use vertex::Vertex;
