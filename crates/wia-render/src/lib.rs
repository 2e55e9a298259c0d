//! wgpu backend for embedded canvases.
//!
//! Binds a host `CAMetalLayer` to a wgpu device and renders the built-in
//! example scenes into it.

pub mod backend;
pub mod context;
pub mod geometry;
pub mod palette;
pub mod scenes;
pub mod surface;

pub use backend::WgpuBackend;
pub use context::GpuContext;
pub use scenes::Scene;
pub use surface::{HostView, SurfaceSource};
