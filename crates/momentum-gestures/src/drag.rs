//! Drag gesture: pointer sessions translated into element movement.
//!
//! Consumes pan sessions to move the element with the pointer, clamping
//! each axis independently against optional constraints, driving
//! auto-scroll near container edges, and snapping back to the origin on
//! release when configured. A new press arriving mid snap-back resumes
//! from wherever the spring currently is rather than restarting from
//! the release point.

use std::cell::RefCell;
use std::rc::Rc;

use momentum_core::{
    AnimationGroup, Axis, Document, ElementEventKind, ElementId, FrameScheduler, ListenerId,
    MotionEngine, MotionEvent, Point, PointerEvent, PropertyValue, Transition,
};
use momentum_state::{AnimationType, MotionState};

use crate::auto_scroll::AutoScroller;
use crate::constants::{SNAP_BACK_DAMPING, SNAP_BACK_STIFFNESS};
use crate::pan_session::{PanHandlers, PanInfo, PanSession, PanSessionOptions};

/// Per-axis movement bounds, in the element's translation space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragConstraints {
    pub left: Option<f32>,
    pub right: Option<f32>,
    pub top: Option<f32>,
    pub bottom: Option<f32>,
}

impl DragConstraints {
    fn clamp(&self, mut point: Point) -> Point {
        if let Some(left) = self.left {
            point.x = point.x.max(left);
        }
        if let Some(right) = self.right {
            point.x = point.x.min(right);
        }
        if let Some(top) = self.top {
            point.y = point.y.max(top);
        }
        if let Some(bottom) = self.bottom {
            point.y = point.y.min(bottom);
        }
        point
    }
}

#[derive(Clone, Default)]
pub struct DragConfig {
    /// Restricts movement to one axis; `None` drags freely.
    pub axis: Option<Axis>,
    pub constraints: Option<DragConstraints>,
    /// Spring back to the origin on release.
    pub snap_to_origin: bool,
    pub transform_page_point: Option<Rc<dyn Fn(Point) -> Point>>,
}

struct DragInner {
    document: Rc<dyn Document>,
    scheduler: FrameScheduler,
    engine: Rc<dyn MotionEngine>,
    state: MotionState,
    element: ElementId,
    config: DragConfig,
    /// Committed translation; a live session's offset is relative to it.
    current: Point,
    snapping_back: bool,
    session: Option<PanSession>,
    /// Taken out during ticks so re-entrant scroll events skip nested
    /// auto-scrolling.
    auto_scroller: Option<AutoScroller>,
    down_listener: Option<ListenerId>,
}

/// One element's drag feature.
pub struct DragGesture {
    inner: Rc<RefCell<DragInner>>,
}

impl DragGesture {
    pub fn new(
        document: Rc<dyn Document>,
        scheduler: FrameScheduler,
        engine: Rc<dyn MotionEngine>,
        state: MotionState,
        element: ElementId,
        config: DragConfig,
    ) -> Self {
        let auto_scroller = AutoScroller::new(document.clone());
        Self {
            inner: Rc::new(RefCell::new(DragInner {
                document,
                scheduler,
                engine,
                state,
                element,
                config,
                current: Point::ZERO,
                snapping_back: false,
                session: None,
                auto_scroller: Some(auto_scroller),
                down_listener: None,
            })),
        }
    }

    /// Subscribes to pointer-down on the element.
    pub fn mount(&self) {
        let weak = Rc::downgrade(&self.inner);
        let (document, element) = {
            let inner = self.inner.borrow();
            (inner.document.clone(), inner.element)
        };
        let id = document.add_element_listener(
            element,
            ElementEventKind::PointerDown,
            Rc::new(move |event| {
                let Some(pointer) = event.pointer.clone() else {
                    return;
                };
                if let Some(inner) = weak.upgrade() {
                    start_session(&inner, &pointer);
                }
            }),
        );
        self.inner.borrow_mut().down_listener = Some(id);
    }

    pub fn update(&self, config: DragConfig) {
        self.inner.borrow_mut().config = config;
    }

    pub fn unmount(&self) {
        let (document, listener, session) = {
            let inner = &mut *self.inner.borrow_mut();
            (
                inner.document.clone(),
                inner.down_listener.take(),
                inner.session.take(),
            )
        };
        if let Some(id) = listener {
            document.remove_listener(id);
        }
        if let Some(session) = session {
            session.end();
        }
    }

    /// Committed translation (excluding any in-flight session offset).
    pub fn current(&self) -> Point {
        self.inner.borrow().current
    }
}

fn start_session(inner_rc: &Rc<RefCell<DragInner>>, event: &PointerEvent) {
    let weak = Rc::downgrade(inner_rc);
    let resume = {
        let inner = inner_rc.borrow();
        if inner.session.as_ref().is_some_and(|session| !session.is_ended()) {
            return;
        }
        inner
            .snapping_back
            .then(|| (inner.engine.clone(), inner.element))
    };
    if let Some((engine, element)) = resume {
        // Resume from wherever the spring currently is, not from the
        // release point. `stop` settles the snap-back handles and their
        // settle callback borrows this state, so it must run unborrowed.
        engine.stop(element, "x");
        engine.stop(element, "y");
        let inner = &mut *inner_rc.borrow_mut();
        inner.current = Point::new(
            current_number(&*engine, element, "x").unwrap_or(inner.current.x),
            current_number(&*engine, element, "y").unwrap_or(inner.current.y),
        );
        inner.snapping_back = false;
    }
    let (document, scheduler, options) = {
        let inner = inner_rc.borrow();
        (
            inner.document.clone(),
            inner.scheduler.clone(),
            PanSessionOptions {
                transform_page_point: inner.config.transform_page_point.clone(),
                snap_to_origin: inner.config.snap_to_origin,
                tracked_element: Some(inner.element),
            },
        )
    };

    let handlers = PanHandlers {
        on_start: Some(Rc::new({
            let weak = weak.clone();
            move |info: &PanInfo| {
                if let Some(inner) = weak.upgrade() {
                    on_drag_start(&inner, info);
                }
            }
        })),
        on_move: Some(Rc::new({
            let weak = weak.clone();
            move |info: &PanInfo| {
                if let Some(inner) = weak.upgrade() {
                    on_drag_move(&inner, info);
                }
            }
        })),
        on_end: Some(Rc::new(move |info: &PanInfo| {
            if let Some(inner) = weak.upgrade() {
                on_drag_end(&inner, info);
            }
        })),
        ..Default::default()
    };

    let session = PanSession::new(document, scheduler, event, handlers, options);
    inner_rc.borrow_mut().session = Some(session);
}

fn current_number(engine: &dyn MotionEngine, element: ElementId, key: &str) -> Option<f32> {
    engine.current(element, key).and_then(|value| value.as_number())
}

fn on_drag_start(inner_rc: &Rc<RefCell<DragInner>>, info: &PanInfo) {
    let (state, document, element) = {
        let inner = inner_rc.borrow();
        (inner.state.clone(), inner.document.clone(), inner.element)
    };
    state.set_active(AnimationType::WhileDrag, true);
    document.dispatch_event(element, MotionEvent::DragStart { point: info.point });
}

fn on_drag_move(inner_rc: &Rc<RefCell<DragInner>>, info: &PanInfo) {
    let (document, element, position, scroller) = {
        let inner = &mut *inner_rc.borrow_mut();
        let position = resolve_position(inner, info.offset);
        (
            inner.document.clone(),
            inner.element,
            position,
            inner.auto_scroller.take(),
        )
    };
    document.set_transform(element, position);
    if let Some(mut scroller) = scroller {
        // set_scroll fires scroll listeners synchronously, which can
        // re-enter this handler through scroll compensation; the nested
        // call sees no scroller and skips ticking.
        scroller.tick(element, info.point, info.velocity);
        inner_rc.borrow_mut().auto_scroller = Some(scroller);
    }
    document.dispatch_event(element, MotionEvent::Drag { point: info.point });
}

fn on_drag_end(inner_rc: &Rc<RefCell<DragInner>>, info: &PanInfo) {
    let (state, document, engine, element, snap) = {
        let inner = &mut *inner_rc.borrow_mut();
        inner.current = resolve_position(inner, info.offset);
        inner.session = None;
        if let Some(scroller) = &mut inner.auto_scroller {
            scroller.reset();
        }
        (
            inner.state.clone(),
            inner.document.clone(),
            inner.engine.clone(),
            inner.element,
            inner.config.snap_to_origin,
        )
    };
    state.set_active(AnimationType::WhileDrag, false);
    document.dispatch_event(element, MotionEvent::DragEnd { point: info.point });

    if snap {
        let spring = Transition::spring(SNAP_BACK_STIFFNESS, SNAP_BACK_DAMPING);
        let x = engine.animate(element, "x", PropertyValue::Number(0.0), &spring);
        let y = engine.animate(element, "y", PropertyValue::Number(0.0), &spring);
        {
            let inner = &mut *inner_rc.borrow_mut();
            inner.snapping_back = true;
            inner.current = Point::ZERO;
        }
        let weak = Rc::downgrade(inner_rc);
        AnimationGroup::join([x, y]).on_settled(move |success| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let inner = &mut *inner.borrow_mut();
            // An interrupted snap-back is resumed by the next press;
            // only a completed one clears the flag here.
            if success {
                inner.snapping_back = false;
            }
        });
    }
}

/// Committed position plus session offset, restricted to the configured
/// axis and clamped per axis against the constraints.
fn resolve_position(inner: &DragInner, offset: Point) -> Point {
    let mut position = inner.current + offset;
    match inner.config.axis {
        Some(Axis::X) => position.y = inner.current.y,
        Some(Axis::Y) => position.x = inner.current.x,
        None => {}
    }
    match &inner.config.constraints {
        Some(constraints) => constraints.clamp(position),
        None => position,
    }
}

#[cfg(test)]
#[path = "tests/drag_tests.rs"]
mod drag_tests;
