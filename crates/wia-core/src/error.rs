//! Error taxonomy for the canvas boundary.
//!
//! Every variant maps to a stable negative status code via [`CanvasError::code`],
//! which is what the C entry points hand back to the host.

use std::fmt;
use thiserror::Error;

/// Status code returned by boundary calls that succeeded.
pub const STATUS_OK: i32 = 0;
pub const CODE_INVALID_HANDLE: i32 = -1;
pub const CODE_INVALID_INDEX: i32 = -2;
pub const CODE_DOUBLE_FREE: i32 = -3;
pub const CODE_INITIALIZATION: i32 = -4;
pub const CODE_BUSY: i32 = -5;
pub const CODE_BACKEND: i32 = -6;

/// Errors surfaced by canvas operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CanvasError {
    /// The backend could not acquire a rendering context for the surface.
    #[error("canvas initialization failed: {0}")]
    Initialization(String),
    /// The handle is null, was never issued, or has been destroyed.
    #[error("invalid canvas handle")]
    InvalidHandle,
    /// The example index lies outside the built-in catalogue.
    #[error("example index {index} out of range (0..{count})")]
    InvalidIndex { index: i32, count: usize },
    /// The handle was already destroyed.
    #[error("canvas handle destroyed twice")]
    DoubleFree,
    /// Another call on the same handle is still in progress.
    #[error("canvas is busy with another call")]
    Busy,
    /// A backend operation failed on an otherwise valid canvas.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl CanvasError {
    /// Stable status code for the C boundary. Always negative.
    pub fn code(&self) -> i32 {
        match self {
            CanvasError::InvalidHandle => CODE_INVALID_HANDLE,
            CanvasError::InvalidIndex { .. } => CODE_INVALID_INDEX,
            CanvasError::DoubleFree => CODE_DOUBLE_FREE,
            CanvasError::Initialization(_) => CODE_INITIALIZATION,
            CanvasError::Busy => CODE_BUSY,
            CanvasError::Backend(_) => CODE_BACKEND,
        }
    }
}

/// Broad classification of backend failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Surface format, adapter or platform not supported.
    Unsupported,
    /// The GPU device was lost.
    DeviceLost,
    /// The surface was lost or outdated and could not be recovered this tick.
    SurfaceLost,
    OutOfMemory,
    /// Frame acquisition timed out.
    Timeout,
    Other,
}

impl BackendErrorKind {
    /// Transient failures skip one presentation; the next tick may succeed.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            BackendErrorKind::SurfaceLost | BackendErrorKind::Timeout
        )
    }
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendErrorKind::Unsupported => "unsupported",
            BackendErrorKind::DeviceLost => "device lost",
            BackendErrorKind::SurfaceLost => "surface lost",
            BackendErrorKind::OutOfMemory => "out of memory",
            BackendErrorKind::Timeout => "timeout",
            BackendErrorKind::Other => "backend error",
        };
        f.write_str(name)
    }
}

/// A failure reported by a [`crate::Backend`] implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct BackendError {
    pub kind: BackendErrorKind,
    pub message: String,
}

impl BackendError {
    pub fn new(kind: BackendErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(BackendErrorKind::Unsupported, message)
    }

    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}
