//! Edge-triggered auto-scroll while dragging.
//!
//! When the pointer nears the edge of a scrollable container (or the
//! viewport), the container is scrolled so the drag can continue past
//! what is currently visible. Speed ramps quadratically with proximity.
//! An edge only engages while the pointer is moving toward it, and the
//! scroll extent available at engagement time becomes a ceiling so
//! content growing mid-drag cannot cause runaway scrolling.

use std::rc::Rc;

use momentum_core::{Axis, Document, ElementId, Point, ScrollTarget};
use rustc_hash::FxHashMap;

use crate::constants::{EDGE_ZONE_PX, MAX_SCROLL_SPEED};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Edge {
    Start,
    End,
}

#[derive(Default)]
struct EdgeState {
    active_edge: Option<Edge>,
    /// Max scroll extent recorded when the edge engaged.
    engaged_limit: Option<f32>,
}

/// Per-drag auto-scroll driver; call [`tick`] once per pointer update.
///
/// [`tick`]: AutoScroller::tick
pub struct AutoScroller {
    document: Rc<dyn Document>,
    states: FxHashMap<(ScrollTarget, Axis), EdgeState>,
}

impl AutoScroller {
    pub fn new(document: Rc<dyn Document>) -> Self {
        Self {
            document,
            states: FxHashMap::default(),
        }
    }

    /// Scrolls the nearest scrollable ancestor on each axis when the
    /// pointer sits inside its edge zone.
    pub fn tick(&mut self, element: ElementId, pointer: Point, velocity: Point) {
        for axis in Axis::BOTH {
            self.tick_axis(element, axis, pointer, velocity);
        }
    }

    /// Clears all engaged edges, e.g. on drag end.
    pub fn reset(&mut self) {
        self.states.clear();
    }

    fn tick_axis(&mut self, element: ElementId, axis: Axis, pointer: Point, velocity: Point) {
        let target = nearest_scrollable(&*self.document, element, axis);
        let bounds = match target {
            ScrollTarget::Element(container) => self.document.rect(container),
            ScrollTarget::Window => self.document.viewport(),
        };

        let start_distance = pointer.get(axis) - bounds.start(axis);
        let end_distance = bounds.end(axis) - pointer.get(axis);
        let candidate = if start_distance < EDGE_ZONE_PX {
            Some((Edge::Start, start_distance))
        } else if end_distance < EDGE_ZONE_PX {
            Some((Edge::End, end_distance))
        } else {
            None
        };

        let state = self.states.entry((target, axis)).or_default();
        let Some((edge, distance)) = candidate else {
            // Leaving the zone disengages and forgets the ceiling.
            state.active_edge = None;
            state.engaged_limit = None;
            return;
        };

        if state.active_edge != Some(edge) {
            // Only engage while the pointer is moving toward the edge;
            // brushing the zone on the way out must not scroll.
            let toward = match edge {
                Edge::Start => velocity.get(axis) < 0.0,
                Edge::End => velocity.get(axis) > 0.0,
            };
            if !toward {
                return;
            }
            state.active_edge = Some(edge);
            state.engaged_limit = Some(self.document.max_scroll(target, axis));
        }

        let intensity = 1.0 - (distance.max(0.0) / EDGE_ZONE_PX);
        let speed = MAX_SCROLL_SPEED * intensity * intensity;
        let current = self.document.scroll_offset(target).get(axis);
        let next = match edge {
            Edge::Start => (current - speed).max(0.0),
            Edge::End => {
                let limit = state.engaged_limit.unwrap_or(0.0);
                (current + speed).min(limit)
            }
        };
        if next != current {
            self.document.set_scroll(target, axis, next);
        }
    }
}

/// Nearest ancestor that scrolls on the axis, falling back to the
/// window.
fn nearest_scrollable(document: &dyn Document, element: ElementId, axis: Axis) -> ScrollTarget {
    let mut cursor = document.parent(element);
    while let Some(ancestor) = cursor {
        if document.overflow(ancestor, axis).is_scrollable() {
            return ScrollTarget::Element(ancestor);
        }
        cursor = document.parent(ancestor);
    }
    ScrollTarget::Window
}

#[cfg(test)]
#[path = "tests/auto_scroll_tests.rs"]
mod auto_scroll_tests;
