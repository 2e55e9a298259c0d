pub mod backend;
pub mod canvas;
pub mod config;
pub mod error;
pub mod example;
pub mod handle;
pub mod progress;
pub mod registry;

pub use backend::{Backend, FrameInfo, SurfaceSize};
pub use canvas::Canvas;
pub use config::{CanvasConfig, FrameBudget, PowerPreference};
pub use error::{BackendError, BackendErrorKind, CanvasError, STATUS_OK};
pub use example::ExampleKind;
pub use handle::{HandleMiss, HandleTable, RawHandle};
pub use progress::{FrameStatus, HostCallback, MAX_FRAME, NullSink, ProgressSink};
pub use registry::CanvasRegistry;
