//! Phase-ordered frame scheduler.
//!
//! High-frequency inputs (pointer moves, scroll events) are throttled to
//! one update per frame by posting a callback here instead of doing work
//! inline. Phases run in a fixed order so DOM-style reads are batched
//! ahead of writes within a single frame.

use std::cell::RefCell;
use std::rc::Rc;

/// Phases of a single frame, drained in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FramePhase {
    Read,
    Update,
    PreRender,
    Render,
    PostRender,
}

impl FramePhase {
    const ALL: [FramePhase; 5] = [
        FramePhase::Read,
        FramePhase::Update,
        FramePhase::PreRender,
        FramePhase::Render,
        FramePhase::PostRender,
    ];

    fn index(self) -> usize {
        match self {
            FramePhase::Read => 0,
            FramePhase::Update => 1,
            FramePhase::PreRender => 2,
            FramePhase::Render => 3,
            FramePhase::PostRender => 4,
        }
    }
}

pub type FrameCallbackId = u64;

type FrameCallback = Box<dyn FnOnce(f64)>;

struct PhaseQueue {
    entries: Vec<(FrameCallbackId, FrameCallback)>,
}

struct SchedulerInner {
    next_id: FrameCallbackId,
    queues: [PhaseQueue; 5],
}

/// Single-threaded frame callback registry.
///
/// Callbacks are one-shot; recurring work re-posts itself. Callbacks
/// posted while a frame is running fire on the *next* frame, even for a
/// phase that has not run yet this frame.
#[derive(Clone)]
pub struct FrameScheduler {
    inner: Rc<RefCell<SchedulerInner>>,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerInner {
                next_id: 1,
                queues: [
                    PhaseQueue { entries: Vec::new() },
                    PhaseQueue { entries: Vec::new() },
                    PhaseQueue { entries: Vec::new() },
                    PhaseQueue { entries: Vec::new() },
                    PhaseQueue { entries: Vec::new() },
                ],
            })),
        }
    }

    /// Posts a one-shot callback for the given phase of the next frame.
    pub fn post(
        &self,
        phase: FramePhase,
        callback: impl FnOnce(f64) + 'static,
    ) -> FrameCallbackRegistration {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.queues[phase.index()]
            .entries
            .push((id, Box::new(callback)));
        FrameCallbackRegistration::new(self.clone(), id)
    }

    pub fn cancel(&self, id: FrameCallbackId) {
        for queue in self.inner.borrow_mut().queues.iter_mut() {
            queue.entries.retain(|(entry_id, _)| *entry_id != id);
        }
    }

    /// Runs one frame: drains every phase in order with the given
    /// timestamp (milliseconds). Callbacks posted during the frame are
    /// deferred to the next one.
    pub fn run_frame(&self, time_ms: f64) {
        let mut pending: [Vec<(FrameCallbackId, FrameCallback)>; 5] =
            [Vec::new(), Vec::new(), Vec::new(), Vec::new(), Vec::new()];
        {
            let mut inner = self.inner.borrow_mut();
            for phase in FramePhase::ALL {
                pending[phase.index()] =
                    std::mem::take(&mut inner.queues[phase.index()].entries);
            }
        }
        for phase in FramePhase::ALL {
            for (_, callback) in pending[phase.index()].drain(..) {
                callback(time_ms);
            }
        }
    }

    /// Whether any callback is waiting for the next frame.
    pub fn has_pending(&self) -> bool {
        self.inner
            .borrow()
            .queues
            .iter()
            .any(|queue| !queue.entries.is_empty())
    }
}

/// Handle to a posted frame callback. Dropping the registration cancels
/// the callback if it has not fired yet.
pub struct FrameCallbackRegistration {
    scheduler: FrameScheduler,
    id: Option<FrameCallbackId>,
}

impl FrameCallbackRegistration {
    fn new(scheduler: FrameScheduler, id: FrameCallbackId) -> Self {
        Self {
            scheduler,
            id: Some(id),
        }
    }

    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.scheduler.cancel(id);
        }
    }
}

impl Drop for FrameCallbackRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.scheduler.cancel(id);
        }
    }
}
