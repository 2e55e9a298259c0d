//! The wgpu implementation of the canvas backend.

use crate::context::GpuContext;
use crate::scenes::Scene;
use crate::surface::{HostView, SurfaceSource};
use wia_core::{
    Backend, BackendError, BackendErrorKind, CanvasConfig, CanvasError, ExampleKind, FrameInfo,
    SurfaceSize,
};

/// Renders examples into one host surface.
pub struct WgpuBackend {
    ctx: GpuContext,
    /// Re-measured on fit-to-view requests.
    view: HostView,
}

impl WgpuBackend {
    /// Acquire a device for `source` and configure the surface.
    ///
    /// # Safety
    /// The host view and surface behind `source` must stay alive and
    /// unmoved until the backend is released.
    ///
    /// # Errors
    /// [`CanvasError::Initialization`] when no compatible adapter, device or
    /// surface format exists.
    pub unsafe fn new(source: SurfaceSource, config: &CanvasConfig) -> Result<Self, CanvasError> {
        let ctx = unsafe { GpuContext::new(&source, config) }
            .map_err(|e| CanvasError::Initialization(format!("gpu context: {e}")))?;
        Ok(Self {
            ctx,
            view: source.view,
        })
    }
}

impl Backend for WgpuBackend {
    type Scene = Scene;

    fn build_scene(&mut self, kind: ExampleKind) -> Result<Scene, BackendError> {
        if self.ctx.is_device_lost() {
            return Err(BackendError::new(BackendErrorKind::DeviceLost, "cannot build scene"));
        }
        // Validation errors during pipeline creation surface here instead of
        // through the uncaptured error handler.
        self.ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let scene = Scene::build(&self.ctx, kind);
        match pollster::block_on(self.ctx.device.pop_error_scope()) {
            Some(err) => Err(BackendError::new(
                BackendErrorKind::Other,
                format!("building `{kind}` failed validation: {err}"),
            )),
            None => Ok(scene),
        }
    }

    fn render(&mut self, scene: &mut Scene, frame: FrameInfo) -> Result<(), BackendError> {
        if self.ctx.is_device_lost() {
            return Err(BackendError::new(BackendErrorKind::DeviceLost, "skipping frame"));
        }
        let (surface_texture, view) = self.ctx.acquire_frame()?;

        scene.prepare(&self.ctx.queue, &frame);
        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("canvas frame"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(scene.kind().name()),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(scene.clear_color(&frame)),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            scene.draw(&mut pass);
        }
        self.ctx.queue.submit(Some(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), BackendError> {
        if self.ctx.is_device_lost() {
            return Err(BackendError::new(BackendErrorKind::DeviceLost, "cannot resize"));
        }
        self.ctx.resize(size);
        Ok(())
    }

    fn resize_scene(&mut self, scene: &mut Scene, size: SurfaceSize) {
        scene.resize(size);
    }

    fn surface_size(&self) -> SurfaceSize {
        self.ctx.size()
    }

    fn view_size(&self) -> Option<SurfaceSize> {
        // SAFETY: `new` requires the view to outlive the backend.
        unsafe { self.view.physical_size() }
    }

    fn release(&mut self) {
        // Let in-flight work finish before the surface goes away.
        let _ = self.ctx.device.poll(wgpu::Maintain::Wait);
        log::debug!("released gpu context for {:?}", self.ctx.adapter.get_info().name);
    }
}
