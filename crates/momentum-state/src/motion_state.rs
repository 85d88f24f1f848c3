//! Per-element motion state and the mounted-state registry.
//!
//! A `MotionState` owns one element's animation bookkeeping: the seven
//! channel states, the base (rest) and current target values, and tree
//! edges to parent/child states for variant propagation and staggering.
//! Tree edges are weak in both directions; the consumer (and the
//! [`MountedStates`] registry) own the states, the host owns the
//! elements.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use momentum_core::{
    AnimationGroup, Document, ElementId, MotionEngine, PropertyValue, TargetMap,
};
use rustc_hash::FxHashMap;

use crate::animate_updates::{animate_updates, AnimateUpdates};
use crate::animation_state::{
    AnimationState, AnimationType, ResolutionOutcome, ResolveInput,
};
use crate::options::MotionOptions;
use crate::targets::{resolve_variant, VariantTarget, Variants};

pub(crate) struct StateInner {
    pub(crate) document: Rc<dyn Document>,
    pub(crate) engine: Rc<dyn MotionEngine>,
    pub(crate) element: Option<ElementId>,
    pub(crate) options: MotionOptions,
    pub(crate) animation: AnimationState,
    /// Resolved rest values keys fall back to when every channel drops
    /// them.
    pub(crate) base_target: TargetMap,
    /// Values currently animated toward, keyed per property.
    pub(crate) target: TargetMap,
    pub(crate) parent: Option<Weak<RefCell<StateInner>>>,
    pub(crate) children: Vec<Weak<RefCell<StateInner>>>,
    /// Changes computed during `set_active` propagation, consumed by
    /// the parent's orchestration pass.
    pub(crate) pending: Option<ResolutionOutcome>,
    /// Bumped whenever new animation work starts; settle callbacks from
    /// a superseded generation are ignored.
    pub(crate) generation: u64,
    pub(crate) initial_render_done: bool,
}

/// Handle to one element's motion state. Cheap to clone; all clones
/// share the same state.
#[derive(Clone)]
pub struct MotionState {
    pub(crate) inner: Rc<RefCell<StateInner>>,
}

impl MotionState {
    pub fn new(
        document: Rc<dyn Document>,
        engine: Rc<dyn MotionEngine>,
        parent: Option<&MotionState>,
    ) -> Self {
        let state = Self {
            inner: Rc::new(RefCell::new(StateInner {
                document,
                engine,
                element: None,
                options: MotionOptions::default(),
                animation: AnimationState::new(),
                base_target: TargetMap::default(),
                target: TargetMap::default(),
                parent: parent.map(|parent| Rc::downgrade(&parent.inner)),
                children: Vec::new(),
                pending: None,
                generation: 0,
                initial_render_done: false,
            })),
        };
        if let Some(parent) = parent {
            parent
                .inner
                .borrow_mut()
                .children
                .push(Rc::downgrade(&state.inner));
        }
        state
    }

    pub(crate) fn from_inner(inner: Rc<RefCell<StateInner>>) -> Self {
        Self { inner }
    }

    /// Binds the state to an element and runs the mount animation pass
    /// (unless `skip_animate`, which only primes the bookkeeping).
    pub fn mount(
        &self,
        element: ElementId,
        options: MotionOptions,
        skip_animate: bool,
    ) -> AnimationGroup {
        {
            let mut inner = self.inner.borrow_mut();
            assert!(
                inner.element.is_none(),
                "motion state is already mounted; unmount it first"
            );
            inner.element = Some(element);
            inner.options = options;
            // The base channel is always on; overlays toggle around it.
            inner.animation.set_active_flag(AnimationType::Animate, true);
        }
        let variants = self.effective_variants();
        let custom = self.effective_custom();
        {
            let inner = &mut *self.inner.borrow_mut();
            // Rest values come from `initial` (label or object form).
            if let Some(initial) = inner.options.initial.clone() {
                if let Some(resolved) = resolve_variant(&initial, &variants, custom.as_ref()) {
                    inner.base_target = resolved.values;
                }
            }
        }
        if skip_animate {
            self.bookkeeping_pass(&variants, None);
            AnimationGroup::settled()
        } else {
            animate_updates(self, AnimateUpdates::default())
        }
    }

    /// Replaces the element's options and re-resolves animations.
    pub fn update(&self, options: MotionOptions) -> AnimationGroup {
        {
            let mut inner = self.inner.borrow_mut();
            assert!(inner.element.is_some(), "motion state is not mounted");
            inner.options = options;
        }
        animate_updates(self, AnimateUpdates::default())
    }

    /// Unbinds from the element. With `unmount_children`, the whole
    /// subtree detaches first (depth-first).
    pub fn unmount(&self, unmount_children: bool) {
        if unmount_children {
            for child in self.children() {
                child.unmount(true);
            }
        }
        let parent = {
            let mut inner = self.inner.borrow_mut();
            assert!(inner.element.is_some(), "motion state is not mounted");
            inner.element = None;
            inner.animation.reset();
            inner.pending = None;
            inner.target.clear();
            inner.base_target.clear();
            inner.initial_render_done = false;
            inner.parent.take()
        };
        if let Some(parent) = parent.and_then(|weak| weak.upgrade()) {
            let this = Rc::downgrade(&self.inner);
            parent
                .borrow_mut()
                .children
                .retain(|child| !child.ptr_eq(&this));
        }
    }

    /// Toggles one animation channel.
    ///
    /// No-op when the flag is unchanged (returns an already-settled
    /// group). Otherwise the flag propagates to variant children first,
    /// depth-first, so children are already mid-transition when the
    /// local re-evaluation runs; protection is cleared across the
    /// subtree afterwards.
    pub fn set_active(&self, animation_type: AnimationType, is_active: bool) -> AnimationGroup {
        if self.is_active(animation_type) == is_active {
            return AnimationGroup::settled();
        }
        for child in self.children() {
            child.set_active_propagated(animation_type, is_active);
        }
        self.inner
            .borrow_mut()
            .animation
            .set_active_flag(animation_type, is_active);
        let group = animate_updates(
            self,
            AnimateUpdates {
                changed_type: Some(animation_type),
                is_exit: animation_type == AnimationType::Exit && is_active,
                ..Default::default()
            },
        );
        self.clear_protection();
        group
    }

    /// Flag flip plus bookkeeping for a child reached through a
    /// parent's `set_active`; engine dispatch is deferred so the parent
    /// can apply stagger delays during orchestration.
    fn set_active_propagated(&self, animation_type: AnimationType, is_active: bool) {
        for child in self.children() {
            child.set_active_propagated(animation_type, is_active);
        }
        if self.is_active(animation_type) == is_active {
            return;
        }
        self.inner
            .borrow_mut()
            .animation
            .set_active_flag(animation_type, is_active);
        let variants = self.effective_variants();
        self.bookkeeping_pass(&variants, Some(animation_type));
    }

    /// Runs the state machine and stores the outcome for a later
    /// orchestration pass instead of dispatching it.
    fn bookkeeping_pass(&self, variants: &Variants, changed_type: Option<AnimationType>) {
        let custom = self.effective_custom();
        let inner = &mut *self.inner.borrow_mut();
        let outcome = inner.animation.animate_changes(
            &ResolveInput {
                options: &inner.options,
                variants,
                custom: custom.as_ref(),
                base_target: &inner.base_target,
                is_initial_render: !inner.initial_render_done,
            },
            changed_type,
        );
        inner.initial_render_done = true;
        inner.pending = if outcome.is_empty() {
            None
        } else {
            Some(outcome)
        };
    }

    /// Resolves animations and dispatches them; see
    /// [`animate_updates`](crate::animate_updates).
    pub fn animate_updates_with(&self, config: AnimateUpdates) -> AnimationGroup {
        animate_updates(self, config)
    }

    pub fn is_active(&self, animation_type: AnimationType) -> bool {
        self.inner.borrow().animation.is_active(animation_type)
    }

    pub fn element(&self) -> Option<ElementId> {
        self.inner.borrow().element
    }

    pub fn base_target(&self) -> TargetMap {
        self.inner.borrow().base_target.clone()
    }

    pub fn target(&self) -> TargetMap {
        self.inner.borrow().target.clone()
    }

    pub fn options(&self) -> MotionOptions {
        self.inner.borrow().options.clone()
    }

    pub(crate) fn generation(&self) -> u64 {
        self.inner.borrow().generation
    }

    /// Live children, pruning dropped ones.
    pub(crate) fn children(&self) -> Vec<MotionState> {
        let mut inner = self.inner.borrow_mut();
        inner.children.retain(|child| child.strong_count() > 0);
        inner
            .children
            .iter()
            .filter_map(Weak::upgrade)
            .map(MotionState::from_inner)
            .collect()
    }

    /// Variants with parent-chain inheritance: the element's own labels
    /// win, missing ones resolve through ancestors. The explicit
    /// accessor computes the inherited view on demand.
    pub(crate) fn effective_variants(&self) -> Variants {
        let mut variants = self.inner.borrow().options.variants.clone();
        let mut cursor = self
            .inner
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade);
        while let Some(parent) = cursor {
            let parent_ref = parent.borrow();
            for (label, variant) in &parent_ref.options.variants {
                variants
                    .entry(label.clone())
                    .or_insert_with(|| variant.clone());
            }
            cursor = parent_ref.parent.as_ref().and_then(Weak::upgrade);
        }
        variants
    }

    /// `custom` data with parent-chain inheritance.
    pub(crate) fn effective_custom(&self) -> Option<PropertyValue> {
        if let Some(custom) = self.inner.borrow().options.custom.clone() {
            return Some(custom);
        }
        let mut cursor = self
            .inner
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade);
        while let Some(parent) = cursor {
            let parent_ref = parent.borrow();
            if let Some(custom) = parent_ref.options.custom.clone() {
                return Some(custom);
            }
            cursor = parent_ref.parent.as_ref().and_then(Weak::upgrade);
        }
        None
    }

    fn clear_protection(&self) {
        self.inner.borrow_mut().animation.clear_protection();
        for child in self.children() {
            child.clear_protection();
        }
    }
}

/// Registry mapping host elements to their motion states for the
/// application lifetime. Lookup only; the host owns element lifetimes
/// and must unregister on teardown.
#[derive(Default)]
pub struct MountedStates {
    map: RefCell<FxHashMap<ElementId, MotionState>>,
}

impl MountedStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a mounted state. Exactly one state may own an element
    /// at a time; a second registration is an integration bug.
    pub fn register(&self, element: ElementId, state: MotionState) {
        let previous = self.map.borrow_mut().insert(element, state);
        assert!(
            previous.is_none(),
            "element {element:?} already has a mounted motion state"
        );
    }

    pub fn unregister(&self, element: ElementId) -> Option<MotionState> {
        self.map.borrow_mut().remove(&element)
    }

    pub fn get(&self, element: ElementId) -> Option<MotionState> {
        self.map.borrow().get(&element).cloned()
    }

    pub fn len(&self) -> usize {
        self.map.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.borrow().is_empty()
    }
}

#[cfg(test)]
#[path = "tests/motion_state_tests.rs"]
mod motion_state_tests;
