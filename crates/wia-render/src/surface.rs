//! Where a canvas draws: the host view and its `CAMetalLayer`.

use std::ffi::c_void;
use std::ptr::NonNull;
use wia_core::{BackendError, CanvasConfig, SurfaceSize};

/// The platform view that owns the drawable surface.
#[derive(Debug, Clone, Copy)]
pub struct HostView(Option<NonNull<c_void>>);

// SAFETY: the view is only messaged for its geometry, from whichever thread
// currently holds the canvas; the host guarantees it outlives the canvas.
unsafe impl Send for HostView {}

impl HostView {
    pub fn new(view: *mut c_void) -> Self {
        Self(NonNull::new(view))
    }

    pub fn is_null(&self) -> bool {
        self.0.is_none()
    }

    /// Current size of the view in physical pixels.
    ///
    /// `None` for a null view, a view with no area, or on platforms where the
    /// view cannot be queried.
    ///
    /// # Safety
    /// A non-null view must point to a live `UIView`/`NSView`.
    pub unsafe fn physical_size(&self) -> Option<SurfaceSize> {
        let view = self.0?;
        #[cfg(target_vendor = "apple")]
        {
            let (width, height, scale) = unsafe { apple::view_metrics(view) };
            physical_size(width, height, scale)
        }
        #[cfg(not(target_vendor = "apple"))]
        {
            let _ = view;
            None
        }
    }
}

/// Scale a logical view size to whole physical pixels.
pub fn physical_size(width: f64, height: f64, scale: f64) -> Option<SurfaceSize> {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let to_px = |logical: f64| {
        let px = (logical * scale).round();
        (px.is_finite() && px >= 1.0).then(|| px.min(u32::MAX as f64) as u32)
    };
    Some(SurfaceSize::new(to_px(width)?, to_px(height)?))
}

/// Size to configure a new surface with: the view's own size when it has
/// one, the configured fallback otherwise.
pub fn initial_size(view: Option<SurfaceSize>, config: &CanvasConfig) -> SurfaceSize {
    view.filter(|size| !size.is_empty())
        .unwrap_or(SurfaceSize::new(config.width, config.height))
}

/// A `CAMetalLayer` and the view hosting it, handed over by the host.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceSource {
    pub view: HostView,
    pub layer: *mut c_void,
}

impl SurfaceSource {
    pub fn new(view: *mut c_void, layer: *mut c_void) -> Self {
        Self {
            view: HostView::new(view),
            layer,
        }
    }

    /// Translate into a wgpu surface target.
    ///
    /// # Safety
    /// The layer must stay valid for as long as the surface created from the
    /// returned target is alive.
    pub(crate) unsafe fn target(&self) -> Result<wgpu::SurfaceTargetUnsafe, BackendError> {
        if self.layer.is_null() {
            return Err(BackendError::unsupported("metal layer is null"));
        }
        metal_layer_target(self.layer)
    }
}

#[cfg(target_vendor = "apple")]
fn metal_layer_target(layer: *mut c_void) -> Result<wgpu::SurfaceTargetUnsafe, BackendError> {
    Ok(wgpu::SurfaceTargetUnsafe::CoreAnimationLayer(layer))
}

#[cfg(not(target_vendor = "apple"))]
fn metal_layer_target(_layer: *mut c_void) -> Result<wgpu::SurfaceTargetUnsafe, BackendError> {
    Err(BackendError::unsupported(
        "CAMetalLayer surfaces are only available on Apple platforms",
    ))
}

#[cfg(target_vendor = "apple")]
mod apple {
    use objc2::encode::{Encode, Encoding};
    use objc2::msg_send;
    use objc2::runtime::AnyObject;
    use std::ffi::c_void;
    use std::ptr::NonNull;

    #[cfg(target_pointer_width = "64")]
    type CGFloat = f64;
    #[cfg(not(target_pointer_width = "64"))]
    type CGFloat = f32;

    #[repr(C)]
    #[derive(Clone, Copy)]
    struct CGPoint {
        x: CGFloat,
        y: CGFloat,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    struct CGSize {
        width: CGFloat,
        height: CGFloat,
    }

    #[repr(C)]
    #[derive(Clone, Copy)]
    struct CGRect {
        origin: CGPoint,
        size: CGSize,
    }

    unsafe impl Encode for CGPoint {
        const ENCODING: Encoding =
            Encoding::Struct("CGPoint", &[CGFloat::ENCODING, CGFloat::ENCODING]);
    }

    unsafe impl Encode for CGSize {
        const ENCODING: Encoding =
            Encoding::Struct("CGSize", &[CGFloat::ENCODING, CGFloat::ENCODING]);
    }

    unsafe impl Encode for CGRect {
        const ENCODING: Encoding =
            Encoding::Struct("CGRect", &[CGPoint::ENCODING, CGSize::ENCODING]);
    }

    /// Logical frame size and backing scale of a `UIView`/`NSView`.
    ///
    /// # Safety
    /// `view` must point to a live view object.
    pub(super) unsafe fn view_metrics(view: NonNull<c_void>) -> (f64, f64, f64) {
        let view: &AnyObject = unsafe { view.cast::<AnyObject>().as_ref() };
        let frame: CGRect = unsafe { msg_send![view, frame] };

        #[cfg(target_os = "macos")]
        let scale: CGFloat = {
            let window: *mut AnyObject = unsafe { msg_send![view, window] };
            if window.is_null() {
                1.0
            } else {
                unsafe { msg_send![window, backingScaleFactor] }
            }
        };
        #[cfg(not(target_os = "macos"))]
        let scale: CGFloat = unsafe { msg_send![view, contentScaleFactor] };

        (
            f64::from(frame.size.width),
            f64::from(frame.size.height),
            f64::from(scale),
        )
    }
}
