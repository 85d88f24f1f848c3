//! Scripted in-memory document.
//!
//! Tests build a small element tree, script overflow/rect/scroll state,
//! and feed pointer/scroll/element events straight into the listeners
//! the code under test registered. Transforms and dispatched motion
//! events are recorded for assertions.

use std::cell::{Cell, RefCell};

use momentum_core::{
    Axis, Document, ElementEvent, ElementEventKind, ElementId, ElementListener, ListenerId,
    MotionEvent, Overflow, Point, PointerEvent, PointerEventKind, PointerListener, Rect,
    ScrollListener, ScrollTarget,
};
use rustc_hash::FxHashMap;

struct ElementRecord {
    parent: Option<ElementId>,
    overflow_x: Overflow,
    overflow_y: Overflow,
    rect: Rect,
    focus_visible: Option<bool>,
}

impl ElementRecord {
    fn new(parent: Option<ElementId>) -> Self {
        Self {
            parent,
            overflow_x: Overflow::Visible,
            overflow_y: Overflow::Visible,
            rect: Rect::default(),
            focus_visible: Some(false),
        }
    }
}

/// In-memory [`Document`] with scripted state and recorded writes.
pub struct TestDocument {
    elements: RefCell<FxHashMap<ElementId, ElementRecord>>,
    next_element: Cell<u64>,
    viewport: Cell<Rect>,
    scroll_offsets: RefCell<FxHashMap<ScrollTarget, Point>>,
    max_scrolls: RefCell<FxHashMap<(ScrollTarget, Axis), f32>>,

    next_listener: Cell<ListenerId>,
    pointer_listeners: RefCell<Vec<(ListenerId, PointerEventKind, PointerListener)>>,
    scroll_listeners: RefCell<Vec<(ListenerId, bool, ScrollListener)>>,
    element_listeners: RefCell<Vec<(ListenerId, ElementId, ElementEventKind, ElementListener)>>,

    transforms: RefCell<FxHashMap<ElementId, Point>>,
    events: RefCell<Vec<(ElementId, MotionEvent)>>,
}

impl Default for TestDocument {
    fn default() -> Self {
        Self {
            elements: RefCell::new(FxHashMap::default()),
            next_element: Cell::new(1),
            viewport: Cell::new(Rect::new(0.0, 0.0, 1024.0, 768.0)),
            scroll_offsets: RefCell::new(FxHashMap::default()),
            max_scrolls: RefCell::new(FxHashMap::default()),
            next_listener: Cell::new(1),
            pointer_listeners: RefCell::new(Vec::new()),
            scroll_listeners: RefCell::new(Vec::new()),
            element_listeners: RefCell::new(Vec::new()),
            transforms: RefCell::new(FxHashMap::default()),
            events: RefCell::new(Vec::new()),
        }
    }
}

impl TestDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_element(&self, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.next_element.get());
        self.next_element.set(id.0 + 1);
        self.elements
            .borrow_mut()
            .insert(id, ElementRecord::new(parent));
        id
    }

    pub fn set_overflow(&self, element: ElementId, axis: Axis, overflow: Overflow) {
        let mut elements = self.elements.borrow_mut();
        let record = elements.get_mut(&element).expect("unknown element");
        match axis {
            Axis::X => record.overflow_x = overflow,
            Axis::Y => record.overflow_y = overflow,
        }
    }

    pub fn set_rect(&self, element: ElementId, rect: Rect) {
        self.elements
            .borrow_mut()
            .get_mut(&element)
            .expect("unknown element")
            .rect = rect;
    }

    pub fn set_viewport(&self, rect: Rect) {
        self.viewport.set(rect);
    }

    pub fn set_scroll_offset(&self, target: ScrollTarget, offset: Point) {
        self.scroll_offsets.borrow_mut().insert(target, offset);
    }

    pub fn set_max_scroll(&self, target: ScrollTarget, axis: Axis, max: f32) {
        self.max_scrolls.borrow_mut().insert((target, axis), max);
    }

    /// `None` scripts a host that cannot answer the focus-visible query.
    pub fn set_focus_visible(&self, element: ElementId, visible: Option<bool>) {
        self.elements
            .borrow_mut()
            .get_mut(&element)
            .expect("unknown element")
            .focus_visible = visible;
    }

    /// Feeds a window-level pointer event to matching listeners.
    pub fn emit_pointer(&self, event: PointerEvent) {
        // Snapshot so listeners can subscribe/unsubscribe re-entrantly.
        let listeners: Vec<PointerListener> = self
            .pointer_listeners
            .borrow()
            .iter()
            .filter(|(_, kind, _)| *kind == event.kind)
            .map(|(_, _, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }

    /// Feeds a scroll event. Non-capture listeners only see the window's
    /// own scroll, as on a real page.
    pub fn emit_scroll(&self, target: ScrollTarget) {
        let listeners: Vec<ScrollListener> = self
            .scroll_listeners
            .borrow()
            .iter()
            .filter(|(_, capture, _)| *capture || target == ScrollTarget::Window)
            .map(|(_, _, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(target);
        }
    }

    pub fn emit_element_event(&self, element: ElementId, event: ElementEvent) {
        let listeners: Vec<ElementListener> = self
            .element_listeners
            .borrow()
            .iter()
            .filter(|(_, target, kind, _)| *target == element && *kind == event.kind)
            .map(|(_, _, _, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }

    /// Last transform written to the element, if any.
    pub fn transform(&self, element: ElementId) -> Option<Point> {
        self.transforms.borrow().get(&element).copied()
    }

    /// All motion events dispatched so far, in order.
    pub fn events(&self) -> Vec<(ElementId, MotionEvent)> {
        self.events.borrow().clone()
    }

    pub fn events_for(&self, element: ElementId) -> Vec<MotionEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|(target, _)| *target == element)
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn clear_events(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn listener_count(&self) -> usize {
        self.pointer_listeners.borrow().len()
            + self.scroll_listeners.borrow().len()
            + self.element_listeners.borrow().len()
    }

    fn next_listener_id(&self) -> ListenerId {
        let id = self.next_listener.get();
        self.next_listener.set(id + 1);
        id
    }
}

impl Document for TestDocument {
    fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.elements.borrow().get(&element).and_then(|record| record.parent)
    }

    fn overflow(&self, element: ElementId, axis: Axis) -> Overflow {
        let elements = self.elements.borrow();
        let record = match elements.get(&element) {
            Some(record) => record,
            None => return Overflow::Visible,
        };
        match axis {
            Axis::X => record.overflow_x,
            Axis::Y => record.overflow_y,
        }
    }

    fn scroll_offset(&self, target: ScrollTarget) -> Point {
        self.scroll_offsets
            .borrow()
            .get(&target)
            .copied()
            .unwrap_or(Point::ZERO)
    }

    fn set_scroll(&self, target: ScrollTarget, axis: Axis, value: f32) {
        {
            let mut offsets = self.scroll_offsets.borrow_mut();
            let offset = offsets.entry(target).or_insert(Point::ZERO);
            offset.set(axis, value);
        }
        // Programmatic scrolls fire scroll events, like a real host.
        self.emit_scroll(target);
    }

    fn max_scroll(&self, target: ScrollTarget, axis: Axis) -> f32 {
        self.max_scrolls
            .borrow()
            .get(&(target, axis))
            .copied()
            .unwrap_or(0.0)
    }

    fn rect(&self, element: ElementId) -> Rect {
        self.elements
            .borrow()
            .get(&element)
            .map(|record| record.rect)
            .unwrap_or_default()
    }

    fn viewport(&self) -> Rect {
        self.viewport.get()
    }

    fn set_transform(&self, element: ElementId, translate: Point) {
        self.transforms.borrow_mut().insert(element, translate);
    }

    fn dispatch_event(&self, element: ElementId, event: MotionEvent) {
        self.events.borrow_mut().push((element, event));
    }

    fn add_pointer_listener(
        &self,
        kind: PointerEventKind,
        listener: PointerListener,
    ) -> ListenerId {
        let id = self.next_listener_id();
        self.pointer_listeners.borrow_mut().push((id, kind, listener));
        id
    }

    fn add_scroll_listener(&self, capture: bool, listener: ScrollListener) -> ListenerId {
        let id = self.next_listener_id();
        self.scroll_listeners.borrow_mut().push((id, capture, listener));
        id
    }

    fn add_element_listener(
        &self,
        element: ElementId,
        kind: ElementEventKind,
        listener: ElementListener,
    ) -> ListenerId {
        let id = self.next_listener_id();
        self.element_listeners
            .borrow_mut()
            .push((id, element, kind, listener));
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.pointer_listeners
            .borrow_mut()
            .retain(|(listener, _, _)| *listener != id);
        self.scroll_listeners
            .borrow_mut()
            .retain(|(listener, _, _)| *listener != id);
        self.element_listeners
            .borrow_mut()
            .retain(|(listener, _, _, _)| *listener != id);
    }

    fn is_focus_visible(&self, element: ElementId) -> Option<bool> {
        self.elements
            .borrow()
            .get(&element)
            .and_then(|record| record.focus_visible)
    }
}
