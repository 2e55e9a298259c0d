//! The canvas handle: one live binding between a backend and a host surface.
//!
//! Lifecycle is `Active → Destroyed`. While active, frame drives and example
//! switches loop back to `Active`; destruction is terminal. Calls on a
//! destroyed canvas fail instead of touching released resources.

use crate::backend::{Backend, FrameInfo, SurfaceSize};
use crate::config::{CanvasConfig, FrameBudget};
use crate::error::CanvasError;
use crate::example::ExampleKind;
use crate::progress::{FrameStatus, MAX_FRAME, ProgressSink};

enum State<B: Backend> {
    Active {
        backend: B,
        scene: B::Scene,
        sink: Box<dyn ProgressSink>,
    },
    Destroyed,
}

/// A canvas bound to one surface through backend `B`.
pub struct Canvas<B: Backend> {
    state: State<B>,
    budget: FrameBudget,
    active: ExampleKind,
    /// Frames actually presented. Never decreases; holds at [`MAX_FRAME`].
    frames: u32,
    /// Drive Frame calls, presented or not.
    ticks: u64,
}

impl<B: Backend> Canvas<B> {
    /// Bind `backend` to a new canvas and build the configured initial example.
    ///
    /// # Errors
    /// [`CanvasError::Initialization`] when the initial scene cannot be built.
    /// The backend is released before returning.
    pub fn create(
        mut backend: B,
        config: &CanvasConfig,
        sink: impl ProgressSink + 'static,
    ) -> Result<Self, CanvasError> {
        let kind = config.initial_example;
        let scene = match backend.build_scene(kind) {
            Ok(scene) => scene,
            Err(e) => {
                backend.release();
                return Err(CanvasError::Initialization(format!(
                    "building initial example `{kind}`: {e}"
                )));
            }
        };
        let budget = config.budget();
        log::info!(
            "canvas created: example `{kind}`, budget {budget:?}, surface {:?}",
            backend.surface_size()
        );
        Ok(Self {
            state: State::Active {
                backend,
                scene,
                sink: Box::new(sink),
            },
            budget,
            active: kind,
            frames: 0,
            ticks: 0,
        })
    }

    /// Advance one tick: render and present the active example unless the
    /// budget is exhausted, then report exactly once to the sink.
    ///
    /// Presentation failures are not errors here; they are reported as
    /// [`FrameStatus::PresentFailed`] and the next tick starts clean.
    pub fn drive_frame(&mut self) -> Result<FrameStatus, CanvasError> {
        let State::Active {
            backend,
            scene,
            sink,
        } = &mut self.state
        else {
            return Err(CanvasError::InvalidHandle);
        };

        self.ticks += 1;
        let status = if self.budget.is_exhausted(self.frames) {
            log::trace!("tick {}: frame budget exhausted", self.ticks);
            FrameStatus::BudgetExhausted
        } else {
            let info = FrameInfo {
                frame: self.frames.saturating_add(1).min(MAX_FRAME),
                tick: self.ticks,
                size: backend.surface_size(),
            };
            match backend.render(scene, info) {
                Ok(()) => {
                    self.frames = info.frame;
                    log::trace!("tick {}: presented frame {}", self.ticks, self.frames);
                    FrameStatus::Presented(self.frames)
                }
                Err(e) if e.is_transient() => {
                    log::warn!("tick {}: skipped presentation: {e}", self.ticks);
                    FrameStatus::PresentFailed
                }
                Err(e) => {
                    log::error!("tick {}: render failed: {e}", self.ticks);
                    FrameStatus::PresentFailed
                }
            }
        };

        sink.report(status);
        Ok(status)
    }

    /// Switch to the example at `index`.
    ///
    /// The new scene is built before the old one is released, so a failure
    /// leaves the previous example active and intact. Selecting the active
    /// index rebuilds it from scratch.
    pub fn change_example(&mut self, index: i32) -> Result<ExampleKind, CanvasError> {
        let State::Active { backend, scene, .. } = &mut self.state else {
            return Err(CanvasError::InvalidHandle);
        };

        let kind = ExampleKind::try_from(index)?;
        let fresh = backend.build_scene(kind)?;
        let previous = std::mem::replace(scene, fresh);
        drop(previous);

        log::debug!("example changed: `{}` -> `{kind}`", self.active);
        self.active = kind;
        Ok(kind)
    }

    /// Notify the canvas that the host surface changed size.
    ///
    /// A zero dimension (minimised view) is ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), CanvasError> {
        let State::Active { backend, scene, .. } = &mut self.state else {
            return Err(CanvasError::InvalidHandle);
        };

        let size = SurfaceSize::new(width, height);
        if size.is_empty() {
            log::debug!("ignoring resize to empty surface {width}x{height}");
            return Ok(());
        }
        backend.resize(size)?;
        backend.resize_scene(scene, size);
        log::debug!("surface resized to {width}x{height}");
        Ok(())
    }

    /// Resize the surface to the host view's current size.
    ///
    /// A no-op when the backend cannot measure its view.
    pub fn fit_to_view(&mut self) -> Result<(), CanvasError> {
        let view_size = match &self.state {
            State::Active { backend, .. } => backend.view_size(),
            State::Destroyed => return Err(CanvasError::InvalidHandle),
        };
        match view_size {
            Some(size) => self.resize(size.width, size.height),
            None => {
                log::debug!("view size unavailable, keeping {:?}", self.surface_size());
                Ok(())
            }
        }
    }

    /// Release every backend resource and invalidate the canvas.
    ///
    /// # Errors
    /// [`CanvasError::DoubleFree`] if the canvas was already destroyed.
    pub fn destroy(&mut self) -> Result<(), CanvasError> {
        match std::mem::replace(&mut self.state, State::Destroyed) {
            State::Active {
                mut backend,
                scene,
                sink,
            } => {
                // The sink goes first so nothing can report during teardown.
                drop(sink);
                drop(scene);
                backend.release();
                log::info!(
                    "canvas destroyed after {} frames ({} ticks)",
                    self.frames,
                    self.ticks
                );
                Ok(())
            }
            State::Destroyed => Err(CanvasError::DoubleFree),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self.state, State::Destroyed)
    }

    /// Example rendered by the next frame drive.
    pub fn active_example(&self) -> ExampleKind {
        self.active
    }

    pub fn frames_presented(&self) -> u32 {
        self.frames
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Current surface size, or `None` once destroyed.
    pub fn surface_size(&self) -> Option<SurfaceSize> {
        match &self.state {
            State::Active { backend, .. } => Some(backend.surface_size()),
            State::Destroyed => None,
        }
    }
}

impl<B: Backend> Drop for Canvas<B> {
    fn drop(&mut self) {
        if !self.is_destroyed() {
            let _ = self.destroy();
        }
    }
}
