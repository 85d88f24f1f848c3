//! Single-pointer pan session.
//!
//! Converts one pointer-down plus subsequent window-level move/up/cancel
//! events into a normalized gesture stream (`on_session_start`,
//! `on_start`, `on_move`, `on_end`, `on_session_end`). Move handling is
//! throttled to one update per frame; pointer events can fire faster
//! than the render loop and over-invoking downstream handlers only
//! creates jitter.
//!
//! When a tracked element is supplied, the session also compensates for
//! scrolling during the gesture: window scroll shifts page-relative
//! pointer coordinates and is folded into the cached move point, while
//! ancestor-element scroll leaves pointer coordinates alone and instead
//! shifts the session origin, keeping offset math consistent relative
//! to the moving frame.

use std::cell::RefCell;
use std::rc::Rc;

use momentum_core::{
    Axis, Document, ElementId, FrameCallbackRegistration, FramePhase, FrameScheduler, ListenerId,
    Point, PointerEvent, PointerEventKind, ScrollTarget,
};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::constants::{PAN_START_THRESHOLD, VELOCITY_WINDOW_MS};

/// One recorded pointer position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerSample {
    pub point: Point,
    pub timestamp_ms: f64,
}

/// Snapshot of a pan gesture handed to session handlers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanInfo {
    /// Current (transformed) pointer position.
    pub point: Point,
    /// Change since the previous update.
    pub delta: Point,
    /// Change since the session origin.
    pub offset: Point,
    /// Pixels per second over the velocity lookback window.
    pub velocity: Point,
}

pub type PanHandler = Rc<dyn Fn(&PanInfo)>;

#[derive(Clone, Default)]
pub struct PanHandlers {
    /// Fires synchronously when the session is created.
    pub on_session_start: Option<PanHandler>,
    /// Fires once, when displacement first crosses the start threshold.
    pub on_start: Option<PanHandler>,
    /// Fires per frame-throttled update after the pan has started.
    pub on_move: Option<PanHandler>,
    /// Fires on pointer up/cancel, only if the pan had started.
    pub on_end: Option<PanHandler>,
    /// Fires on pointer up/cancel regardless of the threshold.
    pub on_session_end: Option<PanHandler>,
}

#[derive(Clone, Default)]
pub struct PanSessionOptions {
    /// Maps page points into a custom coordinate space before tracking.
    pub transform_page_point: Option<Rc<dyn Fn(Point) -> Point>>,
    /// End info is measured against the session origin instead of the
    /// final pointer position.
    pub snap_to_origin: bool,
    /// Enables scroll compensation for this element's scroll ancestors.
    pub tracked_element: Option<ElementId>,
}

/// Scroll offsets captured at session start, plus the deltas already
/// folded into the tracked points.
struct ScrollTracking {
    initial: FxHashMap<ScrollTarget, Point>,
    applied: FxHashMap<ScrollTarget, Point>,
}

struct SessionInner {
    document: Rc<dyn Document>,
    scheduler: FrameScheduler,
    handlers: PanHandlers,
    transform_page_point: Option<Rc<dyn Fn(Point) -> Point>>,
    snap_to_origin: bool,
    history: SmallVec<[PointerSample; 32]>,
    last_move: Option<PointerSample>,
    started: bool,
    ended: bool,
    listeners: Vec<ListenerId>,
    frame_update: Option<FrameCallbackRegistration>,
    scroll: Option<ScrollTracking>,
}

/// One pointer gesture from down to up/cancel.
///
/// Dropping the session ends it.
pub struct PanSession {
    inner: Rc<RefCell<SessionInner>>,
}

impl PanSession {
    /// Starts tracking from a pointer-down event. A non-primary pointer
    /// (second touch, secondary button) produces an inert session that
    /// never fires a handler.
    pub fn new(
        document: Rc<dyn Document>,
        scheduler: FrameScheduler,
        event: &PointerEvent,
        handlers: PanHandlers,
        options: PanSessionOptions,
    ) -> Self {
        let inner = Rc::new(RefCell::new(SessionInner {
            document: document.clone(),
            scheduler,
            handlers,
            transform_page_point: options.transform_page_point,
            snap_to_origin: options.snap_to_origin,
            history: SmallVec::new(),
            last_move: None,
            started: false,
            ended: !event.is_primary,
            listeners: Vec::new(),
            frame_update: None,
            scroll: None,
        }));
        let session = Self { inner };
        if !event.is_primary {
            return session;
        }

        let on_session_start = {
            let inner = &mut *session.inner.borrow_mut();
            let point = transform(inner, event.page);
            inner.history.push(PointerSample {
                point,
                timestamp_ms: event.timestamp_ms,
            });
            if let Some(element) = options.tracked_element {
                inner.scroll = Some(capture_scroll_offsets(&*inner.document, element));
            }
            inner.handlers.on_session_start.clone()
        };
        if let Some(on_session_start) = on_session_start {
            let info = {
                let inner = session.inner.borrow();
                let origin = inner.history[0];
                PanInfo {
                    point: origin.point,
                    delta: Point::ZERO,
                    offset: Point::ZERO,
                    velocity: Point::ZERO,
                }
            };
            on_session_start(&info);
        }

        session.subscribe(&document);
        session
    }

    fn subscribe(&self, document: &Rc<dyn Document>) {
        let weak = Rc::downgrade(&self.inner);
        let move_id = document.add_pointer_listener(
            PointerEventKind::Move,
            Rc::new({
                let weak = weak.clone();
                move |event: &PointerEvent| {
                    if let Some(inner) = weak.upgrade() {
                        handle_move(&inner, event);
                    }
                }
            }),
        );
        let up_id = document.add_pointer_listener(
            PointerEventKind::Up,
            Rc::new({
                let weak = weak.clone();
                move |event: &PointerEvent| {
                    if let Some(inner) = weak.upgrade() {
                        handle_up(&inner, event);
                    }
                }
            }),
        );
        let cancel_id = document.add_pointer_listener(
            PointerEventKind::Cancel,
            Rc::new({
                let weak = weak.clone();
                move |event: &PointerEvent| {
                    if let Some(inner) = weak.upgrade() {
                        handle_up(&inner, event);
                    }
                }
            }),
        );
        let scroll_id = if self.inner.borrow().scroll.is_some() {
            // Capture-phase so ancestor-element scrolls are observed,
            // not just the window's own.
            Some(document.add_scroll_listener(
                true,
                Rc::new(move |target: ScrollTarget| {
                    if let Some(inner) = weak.upgrade() {
                        handle_scroll(&inner, target);
                    }
                }),
            ))
        } else {
            None
        };

        let mut inner = self.inner.borrow_mut();
        inner.listeners.extend([move_id, up_id, cancel_id]);
        inner.listeners.extend(scroll_id);
    }

    pub fn is_started(&self) -> bool {
        self.inner.borrow().started
    }

    pub fn is_ended(&self) -> bool {
        self.inner.borrow().ended
    }

    /// Stops tracking: removes listeners, clears scroll tracking and
    /// cancels any pending frame update. Idempotent.
    pub fn end(&self) {
        end_session(&self.inner);
    }
}

impl Drop for PanSession {
    fn drop(&mut self) {
        end_session(&self.inner);
    }
}

fn end_session(inner_rc: &Rc<RefCell<SessionInner>>) {
    let (document, listeners) = {
        let inner = &mut *inner_rc.borrow_mut();
        if inner.ended {
            return;
        }
        inner.ended = true;
        inner.frame_update = None;
        inner.scroll = None;
        (inner.document.clone(), std::mem::take(&mut inner.listeners))
    };
    for id in listeners {
        document.remove_listener(id);
    }
}

fn transform(inner: &SessionInner, page: Point) -> Point {
    match &inner.transform_page_point {
        Some(transform) => transform(page),
        None => page,
    }
}

fn handle_move(inner_rc: &Rc<RefCell<SessionInner>>, event: &PointerEvent) {
    let scheduler = {
        let inner = &mut *inner_rc.borrow_mut();
        if inner.ended {
            return;
        }
        let point = transform(inner, event.page);
        inner.last_move = Some(PointerSample {
            point,
            timestamp_ms: event.timestamp_ms,
        });
        if inner.frame_update.is_some() {
            return;
        }
        inner.scheduler.clone()
    };
    let weak = Rc::downgrade(inner_rc);
    let registration = scheduler.post(FramePhase::Update, move |_| {
        if let Some(inner) = weak.upgrade() {
            update_point(&inner);
        }
    });
    inner_rc.borrow_mut().frame_update = Some(registration);
}

/// Frame-throttled update: folds the cached move point into history and
/// fires `on_start`/`on_move` as appropriate.
fn update_point(inner_rc: &Rc<RefCell<SessionInner>>) {
    let (info, handler) = {
        let inner = &mut *inner_rc.borrow_mut();
        inner.frame_update = None;
        if inner.ended {
            return;
        }
        let Some(sample) = inner.last_move else {
            return;
        };
        let Some(previous) = inner.history.last().copied() else {
            return;
        };
        inner.history.push(sample);
        let info = PanInfo {
            point: sample.point,
            delta: sample.point - previous.point,
            offset: sample.point - inner.history[0].point,
            velocity: velocity_from_history(&inner.history, VELOCITY_WINDOW_MS),
        };
        let crossed = !inner.started && info.offset.magnitude() >= PAN_START_THRESHOLD;
        if crossed {
            inner.started = true;
        }
        let handler = if crossed {
            inner.handlers.on_start.clone()
        } else if inner.started {
            inner.handlers.on_move.clone()
        } else {
            None
        };
        (info, handler)
    };
    if let Some(handler) = handler {
        handler(&info);
    }
}

fn handle_up(inner_rc: &Rc<RefCell<SessionInner>>, event: &PointerEvent) {
    let (info, on_end, on_session_end) = {
        let inner = &mut *inner_rc.borrow_mut();
        if inner.ended {
            return;
        }
        // No move ever arrived: nothing to report.
        let Some(last_move) = inner.last_move else {
            teardown_silently(inner);
            return;
        };
        let sample = if event.kind == PointerEventKind::Cancel {
            // The cancel event's own coordinates are unreliable; reuse
            // the last known move.
            last_move
        } else {
            PointerSample {
                point: transform(inner, event.page),
                timestamp_ms: event.timestamp_ms,
            }
        };
        let reference = if inner.snap_to_origin {
            inner.history[0]
        } else {
            sample
        };
        let previous = inner.history.last().copied().unwrap_or(sample);
        let info = PanInfo {
            point: reference.point,
            delta: sample.point - previous.point,
            offset: sample.point - inner.history[0].point,
            velocity: velocity_from_history(&inner.history, VELOCITY_WINDOW_MS),
        };
        let on_end = inner.started.then(|| inner.handlers.on_end.clone()).flatten();
        let on_session_end = inner.handlers.on_session_end.clone();
        (info, on_end, on_session_end)
    };
    end_session(inner_rc);
    if let Some(on_end) = on_end {
        on_end(&info);
    }
    if let Some(on_session_end) = on_session_end {
        on_session_end(&info);
    }
}

/// An up/cancel with no recorded moves still tears the session down.
fn teardown_silently(inner: &mut SessionInner) {
    inner.ended = true;
    inner.frame_update = None;
    inner.scroll = None;
    let listeners = std::mem::take(&mut inner.listeners);
    let document = inner.document.clone();
    for id in listeners {
        document.remove_listener(id);
    }
}

fn handle_scroll(inner_rc: &Rc<RefCell<SessionInner>>, target: ScrollTarget) {
    let recompute = {
        let inner = &mut *inner_rc.borrow_mut();
        if inner.ended {
            return;
        }
        let current = inner.document.scroll_offset(target);
        let Some(tracking) = &mut inner.scroll else {
            return;
        };
        let Some(initial) = tracking.initial.get(&target).copied() else {
            return;
        };
        let total = current - initial;
        let applied = tracking.applied.entry(target).or_insert(Point::ZERO);
        let increment = total - *applied;
        *applied = total;
        if increment == Point::ZERO {
            return;
        }
        match target {
            // Window scroll shifts page coordinates under the pointer.
            ScrollTarget::Window => {
                if let Some(last_move) = &mut inner.last_move {
                    last_move.point += increment;
                }
            }
            // Element scroll moves the frame, not the pointer: shift the
            // origin instead.
            ScrollTarget::Element(_) => {
                if let Some(origin) = inner.history.first_mut() {
                    origin.point -= increment;
                }
            }
        }
        inner.last_move.is_some()
    };
    // Recompute immediately so the dragged element does not lag a frame
    // behind the scroll.
    if recompute {
        update_point(inner_rc);
    }
}

/// Initial scroll offsets for every scrollable ancestor plus the window.
fn capture_scroll_offsets(document: &dyn Document, element: ElementId) -> ScrollTracking {
    let mut initial = FxHashMap::default();
    let mut cursor = document.parent(element);
    while let Some(ancestor) = cursor {
        let scrollable = Axis::BOTH
            .iter()
            .any(|axis| document.overflow(ancestor, *axis).is_scrollable());
        if scrollable {
            let target = ScrollTarget::Element(ancestor);
            initial.insert(target, document.scroll_offset(target));
        }
        cursor = document.parent(ancestor);
    }
    initial.insert(
        ScrollTarget::Window,
        document.scroll_offset(ScrollTarget::Window),
    );
    ScrollTracking {
        initial,
        applied: FxHashMap::default(),
    }
}

/// Velocity over a fixed lookback window, in pixels per second.
///
/// Walks backward to the oldest sample still inside the window (or the
/// first one past it) and divides displacement by elapsed time. Zero
/// elapsed time or a non-finite result yields zero on that axis.
pub fn velocity_from_history(history: &[PointerSample], window_ms: f64) -> Point {
    if history.len() < 2 {
        return Point::ZERO;
    }
    let last = history[history.len() - 1];
    let mut chosen = None;
    for sample in history.iter().rev() {
        chosen = Some(*sample);
        if last.timestamp_ms - sample.timestamp_ms > window_ms {
            break;
        }
    }
    let Some(chosen) = chosen else {
        return Point::ZERO;
    };
    let time_s = (last.timestamp_ms - chosen.timestamp_ms) / 1000.0;
    if time_s == 0.0 {
        return Point::ZERO;
    }
    let mut velocity = Point::new(
        ((last.point.x - chosen.point.x) as f64 / time_s) as f32,
        ((last.point.y - chosen.point.y) as f64 / time_s) as f32,
    );
    if !velocity.x.is_finite() {
        velocity.x = 0.0;
    }
    if !velocity.y.is_finite() {
        velocity.y = 0.0;
    }
    velocity
}

#[cfg(test)]
#[path = "tests/pan_session_tests.rs"]
mod pan_session_tests;
