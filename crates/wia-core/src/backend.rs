//! The seam between the canvas lifecycle and a rendering backend.
//!
//! The canvas only sequences calls; acquiring devices, building pipelines
//! and presenting pixels is the backend's job.

use crate::error::BackendError;
use crate::example::ExampleKind;

/// Surface size in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A surface with a zero dimension cannot be configured.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Per-frame parameters handed to [`Backend::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// 1-based number of the frame about to be presented.
    pub frame: u32,
    /// Total Drive Frame calls so far, including this one.
    pub tick: u64,
    pub size: SurfaceSize,
}

/// A rendering backend bound to one surface.
pub trait Backend: Send {
    /// Example-specific GPU state (pipelines, buffers).
    type Scene: Send;

    /// Build the state for one example. Must not disturb any other scene.
    fn build_scene(&mut self, kind: ExampleKind) -> Result<Self::Scene, BackendError>;

    /// Render one frame of `scene` and present it.
    fn render(&mut self, scene: &mut Self::Scene, frame: FrameInfo) -> Result<(), BackendError>;

    /// Reconfigure the surface after the host view changed size.
    fn resize(&mut self, size: SurfaceSize) -> Result<(), BackendError>;

    /// Let a scene adapt size-dependent resources.
    fn resize_scene(&mut self, _scene: &mut Self::Scene, _size: SurfaceSize) {}

    fn surface_size(&self) -> SurfaceSize;

    /// Size of the host view in physical pixels, when the backend can
    /// measure it.
    fn view_size(&self) -> Option<SurfaceSize> {
        None
    }

    /// Release device and surface resources. Called once, before drop.
    fn release(&mut self) {}
}
