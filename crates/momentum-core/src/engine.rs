//! Motion engine seam and animation completion plumbing.
//!
//! The engine is a black box that owns interpolation, easing and spring
//! math. Momentum only ever asks it to start, read or stop per-property
//! animations; completion flows back through [`AnimationHandle`]
//! callbacks and is composed with [`AnimationGroup`] joins.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::document::ElementId;
use crate::transition::Transition;
use crate::value::PropertyValue;

/// External interpolation engine.
///
/// Starting a new animation on an `(element, key)` pair that is already
/// animating interrupts the prior one; the superseded handle settles
/// unsuccessfully. There is no other cancellation primitive.
pub trait MotionEngine {
    fn animate(
        &self,
        element: ElementId,
        key: &str,
        target: PropertyValue,
        transition: &Transition,
    ) -> AnimationHandle;

    /// Current value of a property, animated or at rest.
    fn current(&self, element: ElementId, key: &str) -> Option<PropertyValue>;

    /// Stops any in-flight animation on the property, leaving it at its
    /// current value. The handle settles unsuccessfully.
    fn stop(&self, element: ElementId, key: &str);
}

struct HandleInner {
    settled: Cell<bool>,
    success: Cell<bool>,
    callbacks: RefCell<Vec<Box<dyn FnOnce(bool)>>>,
}

/// Completion token for one started animation.
///
/// Engine implementations keep a clone and call [`settle`] exactly once
/// when the animation finishes or is interrupted; later calls are
/// ignored.
///
/// [`settle`]: AnimationHandle::settle
#[derive(Clone)]
pub struct AnimationHandle {
    inner: Rc<HandleInner>,
}

impl AnimationHandle {
    pub fn pending() -> Self {
        Self {
            inner: Rc::new(HandleInner {
                settled: Cell::new(false),
                success: Cell::new(false),
                callbacks: RefCell::new(Vec::new()),
            }),
        }
    }

    /// A handle that already finished successfully.
    pub fn settled() -> Self {
        let handle = Self::pending();
        handle.settle(true);
        handle
    }

    pub fn is_settled(&self) -> bool {
        self.inner.settled.get()
    }

    /// Marks the animation finished. Idempotent; the first call wins.
    pub fn settle(&self, success: bool) {
        if self.inner.settled.replace(true) {
            return;
        }
        self.inner.success.set(success);
        let callbacks = std::mem::take(&mut *self.inner.callbacks.borrow_mut());
        for callback in callbacks {
            callback(success);
        }
    }

    /// Runs the callback when the animation settles, immediately if it
    /// already has.
    pub fn on_settled(&self, callback: impl FnOnce(bool) + 'static) {
        if self.inner.settled.get() {
            callback(self.inner.success.get());
        } else {
            self.inner.callbacks.borrow_mut().push(Box::new(callback));
        }
    }
}

/// Join of several animation handles: settles once every member has,
/// successfully only if every member was. The `Promise.all` analogue.
#[derive(Clone)]
pub struct AnimationGroup {
    handle: AnimationHandle,
}

impl AnimationGroup {
    /// An empty, already-settled group.
    pub fn settled() -> Self {
        Self {
            handle: AnimationHandle::settled(),
        }
    }

    pub fn join(handles: impl IntoIterator<Item = AnimationHandle>) -> Self {
        let handles: Vec<AnimationHandle> = handles.into_iter().collect();
        if handles.is_empty() {
            return Self::settled();
        }

        let result = AnimationHandle::pending();
        let pending = Rc::new(Cell::new(handles.len()));
        let all_ok = Rc::new(Cell::new(true));
        for handle in &handles {
            let result = result.clone();
            let pending = Rc::clone(&pending);
            let all_ok = Rc::clone(&all_ok);
            handle.on_settled(move |success| {
                if !success {
                    all_ok.set(false);
                }
                pending.set(pending.get() - 1);
                if pending.get() == 0 {
                    result.settle(all_ok.get());
                }
            });
        }
        Self { handle: result }
    }

    pub fn is_settled(&self) -> bool {
        self.handle.is_settled()
    }

    pub fn on_settled(&self, callback: impl FnOnce(bool) + 'static) {
        self.handle.on_settled(callback);
    }

    /// Sequences another group after this one. The continuation only
    /// runs once this group settles; the result settles when the
    /// continuation's group does.
    pub fn then(&self, next: impl FnOnce() -> AnimationGroup + 'static) -> AnimationGroup {
        let result = AnimationHandle::pending();
        let result_in = result.clone();
        self.handle.on_settled(move |first_ok| {
            let follow = next();
            follow.on_settled(move |second_ok| {
                result_in.settle(first_ok && second_ok);
            });
        });
        AnimationGroup { handle: result }
    }

    /// Merges several groups into one.
    pub fn all(groups: impl IntoIterator<Item = AnimationGroup>) -> AnimationGroup {
        Self::join(groups.into_iter().map(|group| group.handle))
    }
}
