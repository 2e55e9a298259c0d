//! Recording backend shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use wia_core::{
    Backend, BackendError, BackendErrorKind, CanvasConfig, ExampleKind, FrameInfo, FrameStatus,
    SurfaceSize,
};

/// Everything the backend was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Build(ExampleKind),
    Render { example: ExampleKind, frame: u32 },
    Resize(SurfaceSize),
    DropScene(ExampleKind),
    Release,
}

#[derive(Default)]
pub struct Journal {
    pub calls: Vec<Call>,
    pub fail_renders: usize,
    /// What `view_size` reports; `None` models an unmeasurable view.
    pub view: Option<SurfaceSize>,
}

impl Journal {
    pub fn presented(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Render { .. }))
            .count()
    }

    pub fn live_scenes(&self) -> isize {
        let built = self.calls.iter().filter(|c| matches!(c, Call::Build(_))).count();
        let dropped = self
            .calls
            .iter()
            .filter(|c| matches!(c, Call::DropScene(_)))
            .count();
        built as isize - dropped as isize
    }

    pub fn released(&self) -> bool {
        self.calls.contains(&Call::Release)
    }
}

pub struct RecordedScene {
    kind: ExampleKind,
    journal: Arc<Mutex<Journal>>,
}

impl Drop for RecordedScene {
    fn drop(&mut self) {
        self.journal.lock().unwrap().calls.push(Call::DropScene(self.kind));
    }
}

pub struct RecordingBackend {
    pub journal: Arc<Mutex<Journal>>,
    size: SurfaceSize,
}

impl RecordingBackend {
    pub fn new() -> (Self, Arc<Mutex<Journal>>) {
        let journal = Arc::new(Mutex::new(Journal::default()));
        let backend = Self {
            journal: Arc::clone(&journal),
            size: SurfaceSize::new(800, 600),
        };
        (backend, journal)
    }
}

impl Backend for RecordingBackend {
    type Scene = RecordedScene;

    fn build_scene(&mut self, kind: ExampleKind) -> Result<RecordedScene, BackendError> {
        self.journal.lock().unwrap().calls.push(Call::Build(kind));
        Ok(RecordedScene {
            kind,
            journal: Arc::clone(&self.journal),
        })
    }

    fn render(&mut self, scene: &mut RecordedScene, frame: FrameInfo) -> Result<(), BackendError> {
        let mut journal = self.journal.lock().unwrap();
        if journal.fail_renders > 0 {
            journal.fail_renders -= 1;
            return Err(BackendError::new(BackendErrorKind::Timeout, "no drawable"));
        }
        journal.calls.push(Call::Render {
            example: scene.kind,
            frame: frame.frame,
        });
        Ok(())
    }

    fn resize(&mut self, size: SurfaceSize) -> Result<(), BackendError> {
        self.size = size;
        self.journal.lock().unwrap().calls.push(Call::Resize(size));
        Ok(())
    }

    fn surface_size(&self) -> SurfaceSize {
        self.size
    }

    fn view_size(&self) -> Option<SurfaceSize> {
        self.journal.lock().unwrap().view
    }

    fn release(&mut self) {
        self.journal.lock().unwrap().calls.push(Call::Release);
    }
}

/// Sink that appends every report to a shared vector.
pub fn collecting_sink() -> (impl FnMut(FrameStatus) + Send + 'static, Arc<Mutex<Vec<FrameStatus>>>) {
    let reports = Arc::new(Mutex::new(Vec::new()));
    let sink_reports = Arc::clone(&reports);
    let sink = move |status: FrameStatus| sink_reports.lock().unwrap().push(status);
    (sink, reports)
}

pub fn budget(max_frames: i32) -> CanvasConfig {
    CanvasConfig::default().with_max_frames(max_frames)
}
