//! Host-document seam.
//!
//! Momentum never touches a real DOM directly; everything it needs from
//! the host — parent chains, scroll offsets, overflow, rects, transform
//! writes, event dispatch, listener subscription — goes through the
//! [`Document`] trait. The production binding implements it over the
//! platform document; tests implement it over a scripted tree.

use std::rc::Rc;

use crate::geometry::{Axis, Point, Rect};
use crate::value::TargetMap;

/// Opaque handle to a host element. The host owns element lifetimes;
/// Momentum only ever uses ids for lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

/// A scrollable frame: either a concrete element or the window itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScrollTarget {
    Window,
    Element(ElementId),
}

/// Computed overflow of an element on one axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Overflow {
    Visible,
    Hidden,
    Auto,
    Scroll,
}

impl Overflow {
    /// `auto` and `scroll` create a scroll container; the others do not.
    pub fn is_scrollable(self) -> bool {
        matches!(self, Overflow::Auto | Overflow::Scroll)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    Down,
    Move,
    Up,
    Cancel,
}

/// A window-level pointer event in page coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    /// Page-relative position (unaffected by element scroll, shifted by
    /// window scroll).
    pub page: Point,
    pub timestamp_ms: f64,
    /// False for secondary touches / non-primary buttons; sessions
    /// ignore those entirely.
    pub is_primary: bool,
}

/// Element-scoped events the gesture features subscribe to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementEventKind {
    PointerDown,
    PointerUp,
    PointerEnter,
    PointerLeave,
    FocusGained,
    FocusLost,
    ViewEnter,
    ViewLeave,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ElementEvent {
    pub kind: ElementEventKind,
    /// Present for pointer-derived events, absent for focus/view ones.
    pub pointer: Option<PointerEvent>,
}

/// Custom events Momentum dispatches back onto host elements as its
/// observable contract.
#[derive(Clone, Debug, PartialEq)]
pub enum MotionEvent {
    MotionStart { target: TargetMap },
    MotionComplete { target: TargetMap, is_exit: bool },
    DragStart { point: Point },
    Drag { point: Point },
    DragEnd { point: Point },
    ViewEnter,
    ViewLeave,
}

pub type ListenerId = u64;

pub type PointerListener = Rc<dyn Fn(&PointerEvent)>;
pub type ScrollListener = Rc<dyn Fn(ScrollTarget)>;
pub type ElementListener = Rc<dyn Fn(&ElementEvent)>;

/// Everything Momentum needs from the host document.
pub trait Document {
    fn parent(&self, element: ElementId) -> Option<ElementId>;

    fn overflow(&self, element: ElementId, axis: Axis) -> Overflow;

    fn scroll_offset(&self, target: ScrollTarget) -> Point;

    fn set_scroll(&self, target: ScrollTarget, axis: Axis, value: f32);

    /// Maximum scroll offset currently reachable on the axis.
    fn max_scroll(&self, target: ScrollTarget, axis: Axis) -> f32;

    /// Page-coordinate bounding rect of an element.
    fn rect(&self, element: ElementId) -> Rect;

    /// Visible viewport in page coordinates (the window's rect).
    fn viewport(&self) -> Rect;

    /// Writes an x/y translation onto the element.
    fn set_transform(&self, element: ElementId, translate: Point);

    fn dispatch_event(&self, element: ElementId, event: MotionEvent);

    /// Subscribes to window-level pointer events of one kind.
    fn add_pointer_listener(
        &self,
        kind: PointerEventKind,
        listener: PointerListener,
    ) -> ListenerId;

    /// Subscribes to scroll events. `capture` listeners also observe
    /// scrolls bubbling from elements; non-capture ones only the
    /// window's own scroll.
    fn add_scroll_listener(&self, capture: bool, listener: ScrollListener) -> ListenerId;

    /// Subscribes to element-scoped events (enter/leave/focus/view).
    fn add_element_listener(
        &self,
        element: ElementId,
        kind: ElementEventKind,
        listener: ElementListener,
    ) -> ListenerId;

    fn remove_listener(&self, id: ListenerId);

    /// Whether the element's focus is "focus-visible". `None` means the
    /// host cannot tell (selector unsupported); callers treat that as
    /// visible, matching default browser outline behaviour.
    fn is_focus_visible(&self, element: ElementId) -> Option<bool>;
}
