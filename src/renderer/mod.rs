//! Rendering module
//!
//! The scene is tessellated into flat-colored triangles on every platform;
//! only the WebGPU upload is browser-specific.

#[cfg(target_arch = "wasm32")]
pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

#[cfg(target_arch = "wasm32")]
pub use pipeline::RenderState;
pub use scene::{FrameStyle, build_frame, playfield_to_ndc, shake_offset};
pub use vertex::Vertex;
