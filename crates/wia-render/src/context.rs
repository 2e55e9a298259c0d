//! GPU context: instance, surface, adapter, device and queue for one canvas.
//!
//! Acquisition happens once at creation. Per-frame work only touches the
//! surface (acquire, present) and the queue.

use crate::surface::{SurfaceSource, initial_size};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use wia_core::{BackendError, BackendErrorKind, CanvasConfig, PowerPreference, SurfaceSize};

pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    device_lost: Arc<AtomicBool>,
}

impl GpuContext {
    /// Create a surface on `source` and acquire a compatible device.
    ///
    /// # Safety
    /// The surface behind `source` must outlive the returned context.
    pub unsafe fn new(source: &SurfaceSource, config: &CanvasConfig) -> Result<Self, BackendError> {
        // SAFETY: forwarded from the caller's contract.
        let target = unsafe { source.target()? };
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = unsafe { instance.create_surface_unsafe(target) }.map_err(|e| {
            BackendError::unsupported(format!("surface creation failed: {e}"))
        })?;

        let (adapter, device, queue) =
            pollster::block_on(request_device(&instance, &surface, config.power_preference))?;

        let device_lost = Arc::new(AtomicBool::new(false));
        let lost_flag = Arc::clone(&device_lost);
        device.set_device_lost_callback(move |reason, message| {
            log::error!("device lost ({reason:?}): {message}");
            lost_flag.store(true, Ordering::Release);
        });
        device.on_uncaptured_error(Box::new(|err: wgpu::Error| {
            log::error!("uncaptured wgpu error: {err}");
        }));

        let caps = surface.get_capabilities(&adapter);
        let format = pick_format(&caps.formats).ok_or_else(|| {
            BackendError::unsupported("surface reports no formats for this adapter")
        })?;
        let max_dim = device.limits().max_texture_dimension_2d;
        // SAFETY: the view shares the surface's lifetime contract.
        let view_size = unsafe { source.view.physical_size() };
        let size = clamp_size(initial_size(view_size, config), max_dim);
        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: present_mode(config.vsync),
            desired_maximum_frame_latency: 2,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
        };
        surface.configure(&device, &surface_config);

        let info = adapter.get_info();
        log::info!(
            "gpu context ready: {} ({:?}), format {format:?}, {}x{}",
            info.name,
            info.backend,
            size.width,
            size.height
        );

        Ok(Self {
            instance,
            surface,
            adapter,
            device,
            queue,
            config: surface_config,
            device_lost,
        })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.config.width, self.config.height)
    }

    pub fn is_device_lost(&self) -> bool {
        self.device_lost.load(Ordering::Acquire)
    }

    /// Reconfigure the surface for a new size.
    pub fn resize(&mut self, size: SurfaceSize) {
        let size = clamp_size(size, self.device.limits().max_texture_dimension_2d);
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
    }

    /// Get the next drawable. A lost or outdated surface is reconfigured and
    /// retried once.
    pub fn acquire_frame(&self) -> Result<(wgpu::SurfaceTexture, wgpu::TextureView), BackendError> {
        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                self.surface
                    .get_current_texture()
                    .map_err(surface_error)?
            }
            Err(e) => return Err(surface_error(e)),
        };
        if frame.suboptimal {
            log::debug!("presenting to a suboptimal surface");
        }
        let view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("canvas frame view"),
            ..Default::default()
        });
        // The view must not outlive the frame it was created from.
        Ok((frame, view))
    }
}

async fn request_device(
    instance: &wgpu::Instance,
    surface: &wgpu::Surface<'static>,
    power: PowerPreference,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue), BackendError> {
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: power_preference(power),
            force_fallback_adapter: false,
            compatible_surface: Some(surface),
        })
        .await
        .ok_or_else(|| BackendError::unsupported("no adapter compatible with the surface"))?;

    // Downlevel limits keep older mobile GPUs in; resolution follows the adapter.
    let limits = wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits());
    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("canvas device"),
                required_features: wgpu::Features::empty(),
                required_limits: limits,
                memory_hints: wgpu::MemoryHints::Performance,
            },
            None,
        )
        .await
        .map_err(|e| BackendError::new(BackendErrorKind::DeviceLost, format!("request_device failed: {e}")))?;
    Ok((adapter, device, queue))
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Prefer an sRGB format; fall back to whatever the surface lists first.
pub fn pick_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(wgpu::TextureFormat::is_srgb)
        .or_else(|| formats.first().copied())
}

/// `Fifo` is the one vsync mode every surface supports.
pub fn present_mode(vsync: bool) -> wgpu::PresentMode {
    if vsync {
        wgpu::PresentMode::Fifo
    } else {
        wgpu::PresentMode::AutoNoVsync
    }
}

pub fn power_preference(power: PowerPreference) -> wgpu::PowerPreference {
    match power {
        PowerPreference::LowPower => wgpu::PowerPreference::LowPower,
        PowerPreference::HighPerformance => wgpu::PowerPreference::HighPerformance,
    }
}

/// Keep each dimension within `1..=max_dim`.
pub fn clamp_size(size: SurfaceSize, max_dim: u32) -> SurfaceSize {
    SurfaceSize::new(size.width.clamp(1, max_dim.max(1)), size.height.clamp(1, max_dim.max(1)))
}

/// Classify a frame acquisition failure.
pub fn surface_error(err: wgpu::SurfaceError) -> BackendError {
    let kind = match err {
        wgpu::SurfaceError::Timeout => BackendErrorKind::Timeout,
        wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost => BackendErrorKind::SurfaceLost,
        wgpu::SurfaceError::OutOfMemory => BackendErrorKind::OutOfMemory,
        #[allow(unreachable_patterns)]
        _ => BackendErrorKind::Other,
    };
    BackendError::new(kind, err.to_string())
}
