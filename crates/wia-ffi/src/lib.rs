//! C boundary for embedding a canvas in a host view.
//!
//! Built as a `cdylib`/`staticlib` and linked into the host app; see
//! `include/wgpu_canvas.h` for the C declarations.
//!
//! The pointer handed back by the factories is an opaque token, not an
//! address: it is looked up in a generation-checked table on every call, so a
//! null, destroyed or forged handle yields an error code instead of undefined
//! behaviour. Calls on one handle must still be serialized by the host; an
//! overlapping call is rejected as busy.

use std::ffi::{CStr, c_char, c_void};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::LazyLock;
use wia_core::error::CODE_BACKEND;
use wia_core::{
    Canvas, CanvasConfig, CanvasError, CanvasRegistry, ExampleKind, HostCallback, NullSink,
    RawHandle, STATUS_OK,
};
use wia_render::{SurfaceSource, WgpuBackend};

/// Opaque canvas type; C sees `struct wgpu_canvas`.
#[repr(C)]
pub struct WgpuCanvas {
    _private: [u8; 0],
}

/// View description passed by the iOS/macOS host (`ios_view_obj_t`).
#[repr(C)]
pub struct IOSViewObj {
    /// The `UIView`/`NSView` hosting the layer.
    pub view: *mut c_void,
    /// The `CAMetalLayer` to draw into.
    pub metal_layer: *mut c_void,
    /// Frame budget; zero or negative for unbounded.
    pub maximum_frames: i32,
    /// Progress callback; may be null.
    pub callback_to_swift: Option<extern "C" fn(arg: i32)>,
}

static CANVASES: LazyLock<CanvasRegistry<WgpuBackend>> = LazyLock::new(CanvasRegistry::new);

fn init_logger() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Run `f`, turning a panic into `fallback` so it never unwinds into C.
fn guard<R>(name: &str, fallback: R, f: impl FnOnce() -> R) -> R {
    catch_unwind(AssertUnwindSafe(f)).unwrap_or_else(|_| {
        log::error!("panic in {name}");
        fallback
    })
}

/// Map a result to its status code. Errors are logged here and nowhere
/// else.
fn status<T>(name: &str, result: Result<T, CanvasError>) -> i32 {
    match result {
        Ok(_) => STATUS_OK,
        Err(e) => {
            log::error!("{name}: {e}");
            e.code()
        }
    }
}

fn to_ptr(handle: RawHandle) -> *mut WgpuCanvas {
    std::ptr::without_provenance_mut(handle.into_usize())
}

// ─── Factories ───────────────────────────────────────────────────────────────

/// # Safety
/// Same contract as [`create_wgpu_canvas`].
unsafe fn create_canvas(obj: IOSViewObj, config: CanvasConfig) -> Result<RawHandle, CanvasError> {
    let config = if obj.maximum_frames > 0 {
        config.with_max_frames(obj.maximum_frames)
    } else {
        config
    };
    log::info!("create_wgpu_canvas, maximum frames: {}", config.max_frames);

    let source = SurfaceSource::new(obj.view, obj.metal_layer);
    // SAFETY: the host keeps the view and layer alive until drop_wgpu_canvas.
    let backend = unsafe { WgpuBackend::new(source, &config)? };
    let canvas = match obj.callback_to_swift {
        Some(callback) => Canvas::create(backend, &config, HostCallback(callback))?,
        None => Canvas::create(backend, &config, NullSink)?,
    };
    CANVASES.insert(canvas)
}

fn finish_create(result: Result<RawHandle, CanvasError>) -> *mut WgpuCanvas {
    match result {
        Ok(handle) => to_ptr(handle),
        Err(e) => {
            log::error!("create_wgpu_canvas: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Create a canvas drawing into `obj.metal_layer` with default settings.
///
/// Returns null on failure.
///
/// # Safety
/// `obj.view` and `obj.metal_layer` must be valid and stay alive until the
/// returned handle is passed to [`drop_wgpu_canvas`].
#[unsafe(no_mangle)]
pub unsafe extern "C" fn create_wgpu_canvas(obj: IOSViewObj) -> *mut WgpuCanvas {
    init_logger();
    guard("create_wgpu_canvas", std::ptr::null_mut(), || {
        finish_create(unsafe { create_canvas(obj, CanvasConfig::default()) })
    })
}

/// Like [`create_wgpu_canvas`], configured from a JSON document. A null
/// `config_json` means defaults; a positive `obj.maximum_frames` overrides the
/// document's budget.
///
/// # Safety
/// As for [`create_wgpu_canvas`]; `config_json` must be null or a
/// NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn create_wgpu_canvas_with_config(
    obj: IOSViewObj,
    config_json: *const c_char,
) -> *mut WgpuCanvas {
    init_logger();
    guard("create_wgpu_canvas_with_config", std::ptr::null_mut(), || {
        let config = if config_json.is_null() {
            Ok(CanvasConfig::default())
        } else {
            // SAFETY: caller guarantees a NUL-terminated string.
            unsafe { CStr::from_ptr(config_json) }
                .to_str()
                .map_err(|e| CanvasError::Initialization(format!("config is not UTF-8: {e}")))
                .and_then(CanvasConfig::from_json)
        };
        finish_create(config.and_then(|config| unsafe { create_canvas(obj, config) }))
    })
}

// ─── Per-frame and control calls ─────────────────────────────────────────────

/// Drive one frame. Returns `0` or a negative error code.
#[unsafe(no_mangle)]
pub extern "C" fn enter_frame(canvas: *mut WgpuCanvas) -> i32 {
    guard("enter_frame", CODE_BACKEND, || {
        status("enter_frame", CANVASES.drive_frame(canvas.addr()))
    })
}

/// Switch the active example. Returns `0` or a negative error code; on error
/// the previous example stays active.
#[unsafe(no_mangle)]
pub extern "C" fn change_example(canvas: *mut WgpuCanvas, index: i32) -> i32 {
    guard("change_example", CODE_BACKEND, || {
        status("change_example", CANVASES.change_example(canvas.addr(), index))
    })
}

/// Tell the canvas its surface now measures `width` × `height` physical pixels.
#[unsafe(no_mangle)]
pub extern "C" fn resize_wgpu_canvas(canvas: *mut WgpuCanvas, width: u32, height: u32) -> i32 {
    guard("resize_wgpu_canvas", CODE_BACKEND, || {
        status("resize_wgpu_canvas", CANVASES.resize(canvas.addr(), width, height))
    })
}

/// Resize the surface to the host view's current size, re-read from the view
/// passed at creation. A no-op where the view cannot be measured.
#[unsafe(no_mangle)]
pub extern "C" fn resize_wgpu_canvas_to_view(canvas: *mut WgpuCanvas) -> i32 {
    guard("resize_wgpu_canvas_to_view", CODE_BACKEND, || {
        status("resize_wgpu_canvas_to_view", CANVASES.fit_to_view(canvas.addr()))
    })
}

/// Destroy the canvas. Calling it again on the same handle returns the
/// double-free code.
#[unsafe(no_mangle)]
pub extern "C" fn drop_wgpu_canvas(canvas: *mut WgpuCanvas) -> i32 {
    guard("drop_wgpu_canvas", CODE_BACKEND, || {
        status("drop_wgpu_canvas", CANVASES.destroy(canvas.addr()))
    })
}

// ─── Introspection ───────────────────────────────────────────────────────────

/// Number of built-in examples; valid indices are `0..count`.
#[unsafe(no_mangle)]
pub extern "C" fn wgpu_canvas_example_count() -> i32 {
    ExampleKind::COUNT as i32
}

/// Index of the active example, or a negative error code.
#[unsafe(no_mangle)]
pub extern "C" fn wgpu_canvas_active_example(canvas: *mut WgpuCanvas) -> i32 {
    guard("wgpu_canvas_active_example", CODE_BACKEND, || {
        let result = CANVASES.inspect(canvas.addr(), |c| c.active_example().index());
        match result {
            Ok(index) => index,
            Err(_) => status("wgpu_canvas_active_example", result),
        }
    })
}
