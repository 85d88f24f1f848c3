use momentum_core::{
    Axis, ElementEvent, ElementEventKind, ElementId, MotionEvent, Point, PointerEventKind,
    PropertyValue, TransitionKind,
};
use momentum_state::{AnimationType, MotionOptions, MotionState};
use momentum_testing::prelude::*;

use crate::constants::{SNAP_BACK_DAMPING, SNAP_BACK_STIFFNESS};
use crate::drag::{DragConfig, DragConstraints, DragGesture};

fn drag_harness(config: DragConfig) -> (TestRuntime, DragGesture, MotionState, ElementId) {
    let runtime = TestRuntime::new();
    let element = runtime.document.create_element(None);
    let state = MotionState::new(runtime.document.clone(), runtime.engine.clone(), None);
    state.mount(element, MotionOptions::default(), false);
    let gesture = DragGesture::new(
        runtime.document.clone(),
        runtime.scheduler.clone(),
        runtime.engine.clone(),
        state.clone(),
        element,
        config,
    );
    gesture.mount();
    (runtime, gesture, state, element)
}

fn press(runtime: &TestRuntime, element: ElementId, point: Point) {
    let pointer = runtime.pointer(PointerEventKind::Down, point);
    runtime.document.emit_element_event(
        element,
        ElementEvent {
            kind: ElementEventKind::PointerDown,
            pointer: Some(pointer),
        },
    );
}

fn drag_to(runtime: &TestRuntime, point: Point) {
    runtime.pointer_after(16.0, PointerEventKind::Move, point);
    runtime.advance_frame(0.0);
}

fn release(runtime: &TestRuntime, point: Point) {
    runtime.pointer_after(16.0, PointerEventKind::Up, point);
}

/// Crosses the start threshold and moves to a (40, 20) session offset.
fn full_drag(runtime: &TestRuntime, element: ElementId) {
    press(runtime, element, Point::new(400.0, 400.0));
    drag_to(runtime, Point::new(430.0, 415.0));
    drag_to(runtime, Point::new(440.0, 420.0));
}

#[test]
fn drag_moves_the_element_with_the_pointer() {
    let (runtime, _gesture, _state, element) = drag_harness(DragConfig::default());
    full_drag(&runtime, element);

    assert_eq!(
        runtime.document.transform(element),
        Some(Point::new(40.0, 20.0))
    );
    let events = runtime.document.events_for(element);
    assert!(events.iter().any(|event| matches!(event, MotionEvent::DragStart { .. })));
    assert!(events.iter().any(|event| matches!(event, MotionEvent::Drag { .. })));
}

#[test]
fn drag_toggles_the_drag_channel() {
    let (runtime, _gesture, state, element) = drag_harness(DragConfig::default());
    assert!(!state.is_active(AnimationType::WhileDrag));

    full_drag(&runtime, element);
    assert!(state.is_active(AnimationType::WhileDrag));

    release(&runtime, Point::new(440.0, 420.0));
    assert!(!state.is_active(AnimationType::WhileDrag));
    let events = runtime.document.events_for(element);
    assert!(events.iter().any(|event| matches!(event, MotionEvent::DragEnd { .. })));
}

#[test]
fn axis_restriction_pins_the_other_axis() {
    let (runtime, _gesture, _state, element) = drag_harness(DragConfig {
        axis: Some(Axis::X),
        ..Default::default()
    });
    full_drag(&runtime, element);

    assert_eq!(
        runtime.document.transform(element),
        Some(Point::new(40.0, 0.0))
    );
}

#[test]
fn constraints_clamp_each_axis_independently() {
    let (runtime, _gesture, _state, element) = drag_harness(DragConfig {
        constraints: Some(DragConstraints {
            left: Some(-10.0),
            right: Some(10.0),
            bottom: Some(5.0),
            ..Default::default()
        }),
        ..Default::default()
    });
    full_drag(&runtime, element);

    assert_eq!(
        runtime.document.transform(element),
        Some(Point::new(10.0, 5.0))
    );
}

#[test]
fn release_commits_the_position_for_the_next_session() {
    let (runtime, gesture, _state, element) = drag_harness(DragConfig::default());
    full_drag(&runtime, element);
    release(&runtime, Point::new(440.0, 420.0));
    assert_eq!(gesture.current(), Point::new(40.0, 20.0));

    // A second drag continues from the committed position.
    full_drag(&runtime, element);
    assert_eq!(
        runtime.document.transform(element),
        Some(Point::new(80.0, 40.0))
    );
}

#[test]
fn snap_back_springs_both_axes_to_the_origin() {
    let (runtime, gesture, _state, element) = drag_harness(DragConfig {
        snap_to_origin: true,
        ..Default::default()
    });
    full_drag(&runtime, element);
    release(&runtime, Point::new(440.0, 420.0));

    for key in ["x", "y"] {
        let calls = runtime.engine.calls_for(element, key);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].target, PropertyValue::Number(0.0));
        match calls[0].transition.kind {
            TransitionKind::Spring(spring) => {
                assert_eq!(spring.stiffness, SNAP_BACK_STIFFNESS);
                assert_eq!(spring.damping, SNAP_BACK_DAMPING);
            }
            TransitionKind::Tween(_) => panic!("snap-back must be a spring"),
        }
    }
    assert_eq!(gesture.current(), Point::ZERO);
}

#[test]
fn press_mid_snap_back_resumes_from_the_spring_position() {
    let (runtime, gesture, _state, element) = drag_harness(DragConfig {
        snap_to_origin: true,
        ..Default::default()
    });
    full_drag(&runtime, element);
    release(&runtime, Point::new(440.0, 420.0));
    assert_eq!(runtime.engine.pending_count(), 2);

    // The spring has moved the element partway home when the next
    // press arrives.
    runtime.engine.set_current(element, "x", PropertyValue::Number(12.0));
    runtime.engine.set_current(element, "y", PropertyValue::Number(5.0));
    press(&runtime, element, Point::new(400.0, 400.0));

    assert_eq!(runtime.engine.pending_count(), 0);
    assert_eq!(gesture.current(), Point::new(12.0, 5.0));

    drag_to(&runtime, Point::new(430.0, 415.0));
    drag_to(&runtime, Point::new(440.0, 420.0));
    assert_eq!(
        runtime.document.transform(element),
        Some(Point::new(52.0, 25.0))
    );
}

#[test]
fn completed_snap_back_does_not_resume() {
    let (runtime, gesture, _state, element) = drag_harness(DragConfig {
        snap_to_origin: true,
        ..Default::default()
    });
    full_drag(&runtime, element);
    release(&runtime, Point::new(440.0, 420.0));
    runtime.engine.settle_all(true);

    // A stale engine value must not leak into the next session once
    // the snap-back finished.
    runtime.engine.set_current(element, "x", PropertyValue::Number(99.0));
    press(&runtime, element, Point::new(400.0, 400.0));
    assert_eq!(gesture.current(), Point::ZERO);
}

#[test]
fn unmount_ends_the_session_and_removes_listeners() {
    let (runtime, gesture, _state, element) = drag_harness(DragConfig::default());
    assert_eq!(runtime.document.listener_count(), 1);

    press(&runtime, element, Point::new(400.0, 400.0));
    assert!(runtime.document.listener_count() > 1);

    gesture.unmount();
    assert_eq!(runtime.document.listener_count(), 0);
}
