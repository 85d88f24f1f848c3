use std::rc::Rc;

use momentum_core::{Axis, Document, ElementId, Overflow, Point, Rect, ScrollTarget};
use momentum_testing::prelude::*;

use crate::auto_scroll::AutoScroller;

/// A 200x200 scroll container with 500px of vertical scroll range and a
/// draggable child inside it.
fn scroll_harness() -> (Rc<TestDocument>, ElementId, ElementId) {
    let document = Rc::new(TestDocument::new());
    let container = document.create_element(None);
    document.set_overflow(container, Axis::Y, Overflow::Auto);
    document.set_rect(container, Rect::new(0.0, 0.0, 200.0, 200.0));
    document.set_max_scroll(ScrollTarget::Element(container), Axis::Y, 500.0);
    let element = document.create_element(Some(container));
    (document, container, element)
}

fn offset_y(document: &TestDocument, container: ElementId) -> f32 {
    document.scroll_offset(ScrollTarget::Element(container)).y
}

#[test]
fn speed_ramps_quadratically_with_edge_proximity() {
    let (document, container, element) = scroll_harness();
    let mut scroller = AutoScroller::new(document.clone());

    // 10px from the bottom edge: intensity 0.8, speed 25 * 0.64 = 16.
    scroller.tick(element, Point::new(100.0, 190.0), Point::new(0.0, 50.0));
    assert!((offset_y(&document, container) - 16.0).abs() < 1e-3);
}

#[test]
fn pointer_outside_the_edge_zone_does_not_scroll() {
    let (document, container, element) = scroll_harness();
    let mut scroller = AutoScroller::new(document.clone());

    scroller.tick(element, Point::new(100.0, 100.0), Point::new(0.0, 50.0));
    assert_eq!(offset_y(&document, container), 0.0);
}

#[test]
fn edge_engages_only_while_moving_toward_it() {
    let (document, container, element) = scroll_harness();
    let mut scroller = AutoScroller::new(document.clone());

    // In the bottom edge zone but moving up: brushing the zone on the
    // way out must not scroll.
    scroller.tick(element, Point::new(100.0, 190.0), Point::new(0.0, -50.0));
    assert_eq!(offset_y(&document, container), 0.0);

    scroller.tick(element, Point::new(100.0, 190.0), Point::new(0.0, 50.0));
    assert!(offset_y(&document, container) > 0.0);
}

#[test]
fn engaged_edge_keeps_scrolling_without_further_movement() {
    let (document, container, element) = scroll_harness();
    let mut scroller = AutoScroller::new(document.clone());
    let pointer = Point::new(100.0, 200.0);

    scroller.tick(element, pointer, Point::new(0.0, 50.0));
    // Holding still at the edge: later ticks carry zero velocity.
    scroller.tick(element, pointer, Point::ZERO);
    scroller.tick(element, pointer, Point::ZERO);
    // Distance 0 means full speed, 25px per tick.
    assert_eq!(offset_y(&document, container), 75.0);
}

#[test]
fn scrolling_is_capped_at_the_extent_seen_on_engagement() {
    let (document, container, element) = scroll_harness();
    let mut scroller = AutoScroller::new(document.clone());
    let pointer = Point::new(100.0, 200.0);

    scroller.tick(element, pointer, Point::new(0.0, 50.0));
    // Content grows mid-drag; the ceiling recorded at engagement holds.
    document.set_max_scroll(ScrollTarget::Element(container), Axis::Y, 1000.0);
    for _ in 0..40 {
        scroller.tick(element, pointer, Point::ZERO);
    }
    assert_eq!(offset_y(&document, container), 500.0);
}

#[test]
fn leaving_the_zone_disengages_and_forgets_the_ceiling() {
    let (document, container, element) = scroll_harness();
    let mut scroller = AutoScroller::new(document.clone());
    let edge = Point::new(100.0, 200.0);

    scroller.tick(element, edge, Point::new(0.0, 50.0));
    scroller.tick(element, Point::new(100.0, 100.0), Point::ZERO);

    // Re-engaging after the content grew picks up the new extent.
    document.set_max_scroll(ScrollTarget::Element(container), Axis::Y, 1000.0);
    scroller.tick(element, edge, Point::new(0.0, 50.0));
    for _ in 0..50 {
        scroller.tick(element, edge, Point::ZERO);
    }
    assert_eq!(offset_y(&document, container), 1000.0);
}

#[test]
fn start_edge_scrolls_back_and_floors_at_zero() {
    let (document, container, element) = scroll_harness();
    document.set_scroll_offset(ScrollTarget::Element(container), Point::new(0.0, 30.0));
    let mut scroller = AutoScroller::new(document.clone());
    let pointer = Point::new(100.0, 5.0);

    // 5px from the top: intensity 0.9, speed 25 * 0.81 = 20.25.
    scroller.tick(element, pointer, Point::new(0.0, -50.0));
    assert!((offset_y(&document, container) - 9.75).abs() < 1e-3);

    scroller.tick(element, pointer, Point::ZERO);
    assert_eq!(offset_y(&document, container), 0.0);
}

#[test]
fn reset_clears_engagement() {
    let (document, container, element) = scroll_harness();
    let mut scroller = AutoScroller::new(document.clone());
    let pointer = Point::new(100.0, 200.0);

    scroller.tick(element, pointer, Point::new(0.0, 50.0));
    let scrolled = offset_y(&document, container);
    scroller.reset();

    // After a reset the edge must re-qualify; zero velocity fails the
    // toward-the-edge check.
    scroller.tick(element, pointer, Point::ZERO);
    assert_eq!(offset_y(&document, container), scrolled);
}

#[test]
fn falls_back_to_the_window_without_a_scrollable_ancestor() {
    let document = Rc::new(TestDocument::new());
    let element = document.create_element(None);
    document.set_max_scroll(ScrollTarget::Window, Axis::X, 300.0);
    let mut scroller = AutoScroller::new(document.clone());

    // 24px from the viewport's right edge, moving right.
    scroller.tick(element, Point::new(1000.0, 400.0), Point::new(80.0, 0.0));
    let offset = document.scroll_offset(ScrollTarget::Window);
    assert!((offset.x - 25.0 * 0.52 * 0.52).abs() < 1e-3);
    assert_eq!(offset.y, 0.0);
}
