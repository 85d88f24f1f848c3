//! Combined test runtime: document, engine, clock and frame scheduler.

use std::cell::Cell;
use std::rc::Rc;

use momentum_core::{FrameScheduler, Point, PointerEvent, PointerEventKind};

use crate::document::TestDocument;
use crate::engine::TestEngine;

/// Everything an integration test needs, with a manually advanced
/// clock driving the frame scheduler.
pub struct TestRuntime {
    pub scheduler: FrameScheduler,
    pub document: Rc<TestDocument>,
    pub engine: Rc<TestEngine>,
    now_ms: Cell<f64>,
}

impl Default for TestRuntime {
    fn default() -> Self {
        Self {
            scheduler: FrameScheduler::new(),
            document: Rc::new(TestDocument::new()),
            engine: Rc::new(TestEngine::new()),
            now_ms: Cell::new(0.0),
        }
    }
}

impl TestRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> f64 {
        self.now_ms.get()
    }

    /// Advances the clock and runs one scheduler frame.
    pub fn advance_frame(&self, dt_ms: f64) {
        self.now_ms.set(self.now_ms.get() + dt_ms);
        self.scheduler.run_frame(self.now_ms.get());
    }

    pub fn advance_frames(&self, frames: usize, dt_ms: f64) {
        for _ in 0..frames {
            self.advance_frame(dt_ms);
        }
    }

    /// A primary pointer event stamped with the current clock.
    pub fn pointer(&self, kind: PointerEventKind, page: Point) -> PointerEvent {
        PointerEvent {
            kind,
            page,
            timestamp_ms: self.now(),
            is_primary: true,
        }
    }

    /// Advances the clock by `dt_ms` and emits a pointer event at the
    /// new time, without running a frame.
    pub fn pointer_after(&self, dt_ms: f64, kind: PointerEventKind, page: Point) {
        self.now_ms.set(self.now_ms.get() + dt_ms);
        self.document.emit_pointer(self.pointer(kind, page));
    }
}
