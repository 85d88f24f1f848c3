//! Recording motion engine.
//!
//! Records every `animate` call and hands back pending handles the test
//! settles explicitly. Starting a second animation on an `(element,
//! key)` pair settles the superseded handle unsuccessfully, matching
//! the engine contract.

use std::cell::RefCell;

use momentum_core::{
    AnimationHandle, ElementId, MotionEngine, PropertyValue, Transition,
};
use rustc_hash::FxHashMap;

/// One recorded `animate` invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimateCall {
    pub element: ElementId,
    pub key: String,
    pub target: PropertyValue,
    pub transition: Transition,
}

struct Pending {
    handle: AnimationHandle,
    target: PropertyValue,
}

#[derive(Default)]
pub struct TestEngine {
    calls: RefCell<Vec<AnimateCall>>,
    pending: RefCell<FxHashMap<(ElementId, String), Pending>>,
    current: RefCell<FxHashMap<(ElementId, String), PropertyValue>>,
}

impl TestEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the value `current` reports for a property.
    pub fn set_current(&self, element: ElementId, key: &str, value: PropertyValue) {
        self.current
            .borrow_mut()
            .insert((element, key.to_string()), value);
    }

    pub fn calls(&self) -> Vec<AnimateCall> {
        self.calls.borrow().clone()
    }

    pub fn calls_for(&self, element: ElementId, key: &str) -> Vec<AnimateCall> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.element == element && call.key == key)
            .cloned()
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Settles one in-flight animation. On success the property's
    /// current value becomes the animation target.
    pub fn settle(&self, element: ElementId, key: &str, success: bool) {
        let pending = self
            .pending
            .borrow_mut()
            .remove(&(element, key.to_string()));
        if let Some(pending) = pending {
            if success {
                self.current
                    .borrow_mut()
                    .insert((element, key.to_string()), pending.target);
            }
            pending.handle.settle(success);
        }
    }

    /// Settles every in-flight animation at once.
    pub fn settle_all(&self, success: bool) {
        let drained: Vec<((ElementId, String), Pending)> =
            self.pending.borrow_mut().drain().collect();
        for (slot, pending) in drained {
            if success {
                self.current.borrow_mut().insert(slot, pending.target.clone());
            }
            pending.handle.settle(success);
        }
    }
}

impl MotionEngine for TestEngine {
    fn animate(
        &self,
        element: ElementId,
        key: &str,
        target: PropertyValue,
        transition: &Transition,
    ) -> AnimationHandle {
        self.calls.borrow_mut().push(AnimateCall {
            element,
            key: key.to_string(),
            target: target.clone(),
            transition: transition.clone(),
        });
        let handle = AnimationHandle::pending();
        let superseded = self.pending.borrow_mut().insert(
            (element, key.to_string()),
            Pending {
                handle: handle.clone(),
                target,
            },
        );
        if let Some(superseded) = superseded {
            superseded.handle.settle(false);
        }
        handle
    }

    fn current(&self, element: ElementId, key: &str) -> Option<PropertyValue> {
        self.current
            .borrow()
            .get(&(element, key.to_string()))
            .cloned()
    }

    fn stop(&self, element: ElementId, key: &str) {
        let pending = self
            .pending
            .borrow_mut()
            .remove(&(element, key.to_string()));
        if let Some(pending) = pending {
            pending.handle.settle(false);
        }
    }
}
