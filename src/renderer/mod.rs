//! WebGPU rendering module
//!
//! Flat-coloured triangles: walls, ball and the aim pointer.

pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use shapes::scene_vertices;
pub use vertex::Vertex;
