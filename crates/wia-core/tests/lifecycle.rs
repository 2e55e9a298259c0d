//! Integration tests: canvas lifecycle against a recording backend.
//!
//! Covers create/destroy, frame budgets, example switching, and use after
//! destruction.

mod common;

use common::{Call, RecordingBackend, budget, collecting_sink};
use pretty_assertions::assert_eq;
use std::sync::Mutex;
use wia_core::{
    Canvas, CanvasConfig, CanvasError, ExampleKind, FrameStatus, HostCallback, SurfaceSize,
};

// ─── Create / Destroy ────────────────────────────────────────────────────

#[test]
fn create_then_destroy_has_no_frame_side_effects() {
    let (backend, journal) = RecordingBackend::new();
    let (sink, reports) = collecting_sink();
    let mut canvas = Canvas::create(backend, &CanvasConfig::default(), sink).unwrap();
    canvas.destroy().unwrap();

    let journal = journal.lock().unwrap();
    assert_eq!(journal.presented(), 0);
    assert_eq!(journal.live_scenes(), 0, "scene leaked");
    assert!(journal.released());
    assert!(reports.lock().unwrap().is_empty());
}

#[test]
fn create_uses_configured_initial_example() {
    let (backend, journal) = RecordingBackend::new();
    let config = CanvasConfig {
        initial_example: ExampleKind::Lines,
        ..CanvasConfig::default()
    };
    let canvas = Canvas::create(backend, &config, wia_core::NullSink).unwrap();
    assert_eq!(canvas.active_example(), ExampleKind::Lines);
    assert_eq!(journal.lock().unwrap().calls, vec![Call::Build(ExampleKind::Lines)]);
}

// ─── Drive Frame ─────────────────────────────────────────────────────────

#[test]
fn unbounded_frames_report_strictly_increasing_counter() {
    let (backend, journal) = RecordingBackend::new();
    let (sink, reports) = collecting_sink();
    let mut canvas = Canvas::create(backend, &budget(0), sink).unwrap();

    for _ in 0..25 {
        canvas.drive_frame().unwrap();
    }

    let expected: Vec<FrameStatus> = (1..=25).map(FrameStatus::Presented).collect();
    assert_eq!(*reports.lock().unwrap(), expected);
    assert_eq!(journal.lock().unwrap().presented(), 25);
    assert_eq!(canvas.frames_presented(), 25);
}

#[test]
fn budget_scenario_end_to_end() {
    let (backend, journal) = RecordingBackend::new();
    let (sink, reports) = collecting_sink();
    let mut canvas = Canvas::create(backend, &budget(3), sink).unwrap();

    for _ in 0..3 {
        canvas.drive_frame().unwrap();
    }
    assert_eq!(
        *reports.lock().unwrap(),
        vec![
            FrameStatus::Presented(1),
            FrameStatus::Presented(2),
            FrameStatus::Presented(3),
        ]
    );

    assert_eq!(canvas.drive_frame().unwrap(), FrameStatus::BudgetExhausted);
    assert_eq!(reports.lock().unwrap().last(), Some(&FrameStatus::BudgetExhausted));
    assert_eq!(journal.lock().unwrap().presented(), 3, "no new pixels after budget");

    canvas.destroy().unwrap();
    assert_eq!(canvas.drive_frame(), Err(CanvasError::InvalidHandle));
    assert_eq!(canvas.change_example(1), Err(CanvasError::InvalidHandle));
    assert_eq!(reports.lock().unwrap().len(), 4, "no report after destroy");
}

#[test]
fn exhausted_budget_stays_exhausted() {
    let (backend, _) = RecordingBackend::new();
    let mut canvas = Canvas::create(backend, &budget(1), wia_core::NullSink).unwrap();
    assert_eq!(canvas.drive_frame().unwrap(), FrameStatus::Presented(1));
    for _ in 0..5 {
        assert_eq!(canvas.drive_frame().unwrap(), FrameStatus::BudgetExhausted);
    }
    // Switching examples does not refill the budget.
    canvas.change_example(2).unwrap();
    assert_eq!(canvas.drive_frame().unwrap(), FrameStatus::BudgetExhausted);
    assert_eq!(canvas.ticks(), 7);
}

#[test]
fn failed_presentations_do_not_consume_budget() {
    let (backend, journal) = RecordingBackend::new();
    let (sink, reports) = collecting_sink();
    let mut canvas = Canvas::create(backend, &budget(2), sink).unwrap();
    journal.lock().unwrap().fail_renders = 2;

    for _ in 0..5 {
        canvas.drive_frame().unwrap();
    }
    assert_eq!(
        *reports.lock().unwrap(),
        vec![
            FrameStatus::PresentFailed,
            FrameStatus::PresentFailed,
            FrameStatus::Presented(1),
            FrameStatus::Presented(2),
            FrameStatus::BudgetExhausted,
        ]
    );
}

static WIRE: Mutex<Vec<i32>> = Mutex::new(Vec::new());

extern "C" fn host_callback(arg: i32) {
    WIRE.lock().unwrap().push(arg);
}

#[test]
fn host_callback_sees_wire_codes() {
    let (backend, journal) = RecordingBackend::new();
    let mut canvas = Canvas::create(backend, &budget(2), HostCallback(host_callback)).unwrap();
    journal.lock().unwrap().fail_renders = 1;
    for _ in 0..4 {
        canvas.drive_frame().unwrap();
    }
    canvas.destroy().unwrap();

    let wire = WIRE.lock().unwrap().clone();
    assert_eq!(wire, vec![-2, 1, 2, -1]);
    let decoded: Vec<_> = wire.into_iter().map(FrameStatus::from_wire).collect();
    assert_eq!(
        decoded,
        vec![
            Some(FrameStatus::PresentFailed),
            Some(FrameStatus::Presented(1)),
            Some(FrameStatus::Presented(2)),
            Some(FrameStatus::BudgetExhausted),
        ]
    );
}

// ─── Change Example ──────────────────────────────────────────────────────

#[test]
fn out_of_range_example_keeps_prior_one() {
    let (backend, journal) = RecordingBackend::new();
    let mut canvas = Canvas::create(backend, &CanvasConfig::default(), wia_core::NullSink).unwrap();
    canvas.change_example(1).unwrap();

    for bad in [3, 99, -1, i32::MIN] {
        assert_eq!(
            canvas.change_example(bad),
            Err(CanvasError::InvalidIndex {
                index: bad,
                count: ExampleKind::COUNT
            })
        );
    }
    assert_eq!(canvas.active_example(), ExampleKind::Polygon);

    canvas.drive_frame().unwrap();
    assert_eq!(
        journal.lock().unwrap().calls.last(),
        Some(&Call::Render {
            example: ExampleKind::Polygon,
            frame: 1
        })
    );
}

#[test]
fn switch_builds_new_scene_before_dropping_old() {
    let (backend, journal) = RecordingBackend::new();
    let mut canvas = Canvas::create(backend, &CanvasConfig::default(), wia_core::NullSink).unwrap();
    assert_eq!(canvas.change_example(2).unwrap(), ExampleKind::Lines);
    canvas.drive_frame().unwrap();

    assert_eq!(
        journal.lock().unwrap().calls,
        vec![
            Call::Build(ExampleKind::Pulse),
            Call::Build(ExampleKind::Lines),
            Call::DropScene(ExampleKind::Pulse),
            Call::Render {
                example: ExampleKind::Lines,
                frame: 1
            },
        ]
    );
    assert_eq!(journal.lock().unwrap().live_scenes(), 1);
}

#[test]
fn reselecting_active_example_resets_it() {
    let (backend, journal) = RecordingBackend::new();
    let mut canvas = Canvas::create(backend, &CanvasConfig::default(), wia_core::NullSink).unwrap();
    canvas.change_example(0).unwrap();
    let calls = journal.lock().unwrap().calls.clone();
    assert_eq!(
        calls,
        vec![
            Call::Build(ExampleKind::Pulse),
            Call::Build(ExampleKind::Pulse),
            Call::DropScene(ExampleKind::Pulse),
        ]
    );
}

// ─── Resize ──────────────────────────────────────────────────────────────

#[test]
fn resize_reaches_backend_and_frame_info() {
    let (backend, journal) = RecordingBackend::new();
    let mut canvas = Canvas::create(backend, &CanvasConfig::default(), wia_core::NullSink).unwrap();
    canvas.resize(1170, 2532).unwrap();
    canvas.resize(0, 0).unwrap();

    assert_eq!(canvas.surface_size(), Some(SurfaceSize::new(1170, 2532)));
    let resizes: Vec<Call> = journal
        .lock()
        .unwrap()
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Resize(_)))
        .cloned()
        .collect();
    assert_eq!(resizes, vec![Call::Resize(SurfaceSize::new(1170, 2532))]);
}

// ─── Destroy ─────────────────────────────────────────────────────────────

#[test]
fn second_destroy_is_double_free() {
    let (backend, journal) = RecordingBackend::new();
    let mut canvas = Canvas::create(backend, &CanvasConfig::default(), wia_core::NullSink).unwrap();
    assert_eq!(canvas.destroy(), Ok(()));
    assert_eq!(canvas.destroy(), Err(CanvasError::DoubleFree));

    let releases = journal
        .lock()
        .unwrap()
        .calls
        .iter()
        .filter(|c| **c == Call::Release)
        .count();
    assert_eq!(releases, 1);
}
