//! Integration tests: handle-addressed canvases.
//!
//! Exercises the registry the way the C boundary does: raw integers in,
//! status out, with null, stale, forged and re-entrant handles.

mod common;

use common::{RecordingBackend, budget, collecting_sink};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Barrier, Mutex, OnceLock};
use wia_core::{
    Backend, BackendError, Canvas, CanvasConfig, CanvasError, CanvasRegistry, ExampleKind,
    FrameInfo, FrameStatus, NullSink, SurfaceSize,
};

fn register(registry: &CanvasRegistry<RecordingBackend>, max_frames: i32) -> usize {
    let (backend, _) = RecordingBackend::new();
    let canvas = Canvas::create(backend, &budget(max_frames), NullSink).unwrap();
    registry.insert(canvas).unwrap().into_usize()
}

#[test]
fn null_handle_is_invalid_everywhere() {
    let registry = CanvasRegistry::<RecordingBackend>::new();
    assert_eq!(registry.drive_frame(0), Err(CanvasError::InvalidHandle));
    assert_eq!(registry.change_example(0, 1), Err(CanvasError::InvalidHandle));
    assert_eq!(registry.resize(0, 1, 1), Err(CanvasError::InvalidHandle));
    assert_eq!(registry.destroy(0), Err(CanvasError::InvalidHandle));
}

#[test]
fn handle_scenario_end_to_end() {
    let registry = CanvasRegistry::new();
    let (backend, journal) = RecordingBackend::new();
    let (sink, reports) = collecting_sink();
    let canvas = Canvas::create(backend, &budget(3), sink).unwrap();
    let handle = registry.insert(canvas).unwrap().into_usize();

    for _ in 0..4 {
        registry.drive_frame(handle).unwrap();
    }
    assert_eq!(
        *reports.lock().unwrap(),
        vec![
            FrameStatus::Presented(1),
            FrameStatus::Presented(2),
            FrameStatus::Presented(3),
            FrameStatus::BudgetExhausted,
        ]
    );
    assert_eq!(journal.lock().unwrap().presented(), 3);

    registry.destroy(handle).unwrap();
    assert!(registry.is_empty());
    assert!(journal.lock().unwrap().released());
    assert_eq!(registry.drive_frame(handle), Err(CanvasError::InvalidHandle));
    assert_eq!(registry.change_example(handle, 0), Err(CanvasError::InvalidHandle));
    assert_eq!(registry.destroy(handle), Err(CanvasError::DoubleFree));
}

#[test]
fn stale_handle_stays_dead_after_slot_reuse() {
    let registry = CanvasRegistry::new();
    let first = register(&registry, 0);
    registry.destroy(first).unwrap();
    let second = register(&registry, 0);

    assert_ne!(first, second);
    assert_eq!(registry.drive_frame(first), Err(CanvasError::InvalidHandle));
    assert_eq!(registry.destroy(first), Err(CanvasError::DoubleFree));
    assert_eq!(registry.drive_frame(second), Ok(FrameStatus::Presented(1)));
}

#[test]
fn handles_are_independent() {
    let registry = CanvasRegistry::new();
    let a = register(&registry, 0);
    let b = register(&registry, 1);

    registry.change_example(a, 2).unwrap();
    registry.drive_frame(a).unwrap();
    registry.drive_frame(b).unwrap();
    assert_eq!(registry.drive_frame(b), Ok(FrameStatus::BudgetExhausted));
    assert_eq!(registry.drive_frame(a), Ok(FrameStatus::Presented(2)));

    assert_eq!(registry.inspect(a, |c| c.active_example()), Ok(ExampleKind::Lines));
    assert_eq!(registry.inspect(b, |c| c.active_example()), Ok(ExampleKind::Pulse));
    assert_eq!(registry.len(), 2);
}

#[test]
fn invalid_index_through_registry_keeps_example() {
    let registry = CanvasRegistry::new();
    let h = register(&registry, 0);
    registry.change_example(h, 1).unwrap();
    assert!(matches!(
        registry.change_example(h, 42),
        Err(CanvasError::InvalidIndex { index: 42, .. })
    ));
    assert_eq!(registry.inspect(h, |c| c.active_example()), Ok(ExampleKind::Polygon));
}

#[test]
fn reentrant_calls_from_the_callback_are_busy() {
    let registry: Arc<CanvasRegistry<RecordingBackend>> = Arc::new(CanvasRegistry::new());
    let handle = Arc::new(OnceLock::<usize>::new());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = {
        let registry = Arc::clone(&registry);
        let handle = Arc::clone(&handle);
        let seen = Arc::clone(&seen);
        move |_status: FrameStatus| {
            if let Some(&h) = handle.get() {
                seen.lock().unwrap().push(registry.drive_frame(h).err());
                seen.lock().unwrap().push(registry.destroy(h).err());
            }
        }
    };

    let (backend, _) = RecordingBackend::new();
    let canvas = Canvas::create(backend, &CanvasConfig::default(), sink).unwrap();
    let h = registry.insert(canvas).unwrap().into_usize();
    handle.set(h).unwrap();

    assert_eq!(registry.drive_frame(h), Ok(FrameStatus::Presented(1)));
    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some(CanvasError::Busy), Some(CanvasError::Busy)]
    );

    // The rejected destroy removed nothing; the real one still works.
    assert_eq!(registry.len(), 1);
    registry.destroy(h).unwrap();
    assert!(registry.is_empty());
}

/// Parks inside `render` until the test lets it go.
struct GatedBackend {
    entered: Arc<Barrier>,
    release: Arc<Barrier>,
}

impl Backend for GatedBackend {
    type Scene = ();

    fn build_scene(&mut self, _kind: ExampleKind) -> Result<(), BackendError> {
        Ok(())
    }

    fn render(&mut self, _scene: &mut (), _frame: FrameInfo) -> Result<(), BackendError> {
        self.entered.wait();
        self.release.wait();
        Ok(())
    }

    fn resize(&mut self, _size: SurfaceSize) -> Result<(), BackendError> {
        Ok(())
    }

    fn surface_size(&self) -> SurfaceSize {
        SurfaceSize::new(800, 600)
    }
}

#[test]
fn calls_from_another_thread_mid_render_are_busy() {
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    let backend = GatedBackend {
        entered: Arc::clone(&entered),
        release: Arc::clone(&release),
    };
    let registry = CanvasRegistry::new();
    let canvas = Canvas::create(backend, &CanvasConfig::default(), NullSink).unwrap();
    let h = registry.insert(canvas).unwrap().into_usize();

    let (rejected, driven) = std::thread::scope(|s| {
        let driver = s.spawn(|| registry.drive_frame(h));
        entered.wait();
        let rejected = vec![
            registry.drive_frame(h).err(),
            registry.change_example(h, 1).err(),
            registry.resize(h, 640, 480).err(),
            registry.destroy(h).err(),
        ];
        release.wait();
        (rejected, driver.join().unwrap())
    });

    assert_eq!(rejected, vec![Some(CanvasError::Busy); 4]);
    assert_eq!(driven, Ok(FrameStatus::Presented(1)));
    assert_eq!(registry.inspect(h, |c| c.active_example()), Ok(ExampleKind::Pulse));
    assert_eq!(registry.len(), 1);
    registry.destroy(h).unwrap();
    assert!(registry.is_empty());
}

#[test]
fn fit_to_view_through_registry() {
    let registry = CanvasRegistry::new();
    let (backend, journal) = RecordingBackend::new();
    let canvas = Canvas::create(backend, &CanvasConfig::default(), NullSink).unwrap();
    let h = registry.insert(canvas).unwrap().into_usize();

    journal.lock().unwrap().view = Some(SurfaceSize::new(1640, 2360));
    registry.fit_to_view(h).unwrap();
    assert_eq!(
        registry.inspect(h, |c| c.surface_size()),
        Ok(Some(SurfaceSize::new(1640, 2360)))
    );

    registry.destroy(h).unwrap();
    assert_eq!(registry.fit_to_view(h), Err(CanvasError::InvalidHandle));
}
