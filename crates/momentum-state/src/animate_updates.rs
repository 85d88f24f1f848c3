//! Animation update orchestration.
//!
//! Takes the state machine's decided changes (or a direct target),
//! builds per-property animation factories, and sequences them against
//! child staggering and `when` ordering before handing each property to
//! the external engine. Animation failures are swallowed here:
//! animations are best-effort visual effects and must never crash the
//! host application.

use std::rc::Rc;

use momentum_core::{
    AnimationGroup, AnimationHandle, Document, MotionEngine, MotionEvent, PropertyValue,
    TargetMap, Transition, When,
};

use crate::animation_state::{AnimationDefinition, AnimationType, ResolutionOutcome, ResolveInput};
use crate::motion_state::MotionState;
use crate::targets::TargetAndTransition;

/// Configuration for one orchestration pass.
#[derive(Clone, Default)]
pub struct AnimateUpdates {
    /// Explicit target, bypassing state-driven resolution.
    pub direct: Option<TargetAndTransition>,
    /// Beats the element's shared `transition` option.
    pub transition_override: Option<Transition>,
    /// The channel whose active flag just changed, if any.
    pub changed_type: Option<AnimationType>,
    /// Marks the resulting `motioncomplete` event as an exit.
    pub is_exit: bool,
    /// Stagger/delay offset applied by the parent's orchestration.
    pub extra_delay: f32,
}

/// Resolves and dispatches one update cycle for `state`.
///
/// Factories are deferred as thunks so `when` ordering can postpone
/// engine calls until the other side of the sequence settles; stagger
/// turns into per-key transition delay before dispatch. Returns a group
/// that settles when every started animation (own and children's) has.
pub(crate) fn animate_updates(state: &MotionState, config: AnimateUpdates) -> AnimationGroup {
    let variants = state.effective_variants();
    let custom = state.effective_custom();

    // Resolve phase: decide the work, snapshot everything the dispatch
    // phase needs, release the borrow before touching engine/document.
    let (element, document, engine, factories, combined, shared, generation) = {
        let inner = &mut *state.inner.borrow_mut();
        let element = inner
            .element
            .expect("cannot animate an unmounted motion state");

        let outcome = if let Some(direct) = config.direct.clone() {
            ResolutionOutcome {
                definitions: vec![AnimationDefinition {
                    channel: None,
                    values: direct.values,
                    transition: direct.transition,
                }],
            }
        } else if let Some(pending) = inner.pending.take() {
            pending
        } else {
            inner.animation.animate_changes(
                &ResolveInput {
                    options: &inner.options,
                    variants: &variants,
                    custom: custom.as_ref(),
                    base_target: &inner.base_target,
                    is_initial_render: !inner.initial_render_done,
                },
                config.changed_type,
            )
        };
        inner.initial_render_done = true;

        let shared = config
            .transition_override
            .clone()
            .or_else(|| inner.options.transition.clone())
            .unwrap_or_default();

        let mut factories: Vec<(String, PropertyValue, Transition)> = Vec::new();
        let mut combined = TargetMap::default();
        for definition in &outcome.definitions {
            let definition_shared = definition
                .transition
                .clone()
                .unwrap_or_else(|| shared.clone());
            for (key, value) in &definition.values {
                combined.insert(key.clone(), value.clone());
                // Already at (or animating toward) this value.
                if inner.target.get(key) == Some(value) {
                    continue;
                }
                // Record the rest value the first time a key animates
                // so removal can fall back to it later.
                if !inner.base_target.contains_key(key) {
                    if let Some(current) = inner.engine.current(element, key) {
                        inner.base_target.insert(key.clone(), current);
                    }
                }
                let mut transition = definition_shared.for_key(key);
                transition.delay += config.extra_delay;
                inner.target.insert(key.clone(), value.clone());
                factories.push((key.clone(), value.clone(), transition));
            }
        }

        if !factories.is_empty() {
            inner.generation += 1;
        }
        (
            element,
            inner.document.clone(),
            inner.engine.clone(),
            factories,
            combined,
            shared,
            inner.generation,
        )
    };

    let has_work = !factories.is_empty();
    let children = state.children();

    let engine_for_own = engine.clone();
    let own = move || {
        let handles: Vec<AnimationHandle> = factories
            .into_iter()
            .map(|(key, value, transition)| engine_for_own.animate(element, &key, value, &transition))
            .collect();
        AnimationGroup::join(handles)
    };

    let child_count = children.len();
    let stagger = shared.stagger_children;
    let direction = shared.stagger_direction;
    let base_child_delay = config.extra_delay + shared.delay_children;
    let changed_type = config.changed_type;
    let is_exit = config.is_exit;
    let kids = move || {
        if children.is_empty() {
            return AnimationGroup::settled();
        }
        AnimationGroup::all(children.into_iter().enumerate().map(|(index, child)| {
            let stagger_delay = if direction == -1 {
                (child_count - 1 - index) as f32 * stagger
            } else {
                index as f32 * stagger
            };
            child.animate_updates_with(AnimateUpdates {
                changed_type,
                is_exit,
                extra_delay: base_child_delay + stagger_delay,
                ..Default::default()
            })
        }))
    };

    if has_work {
        document.dispatch_event(element, MotionEvent::MotionStart {
            target: combined.clone(),
        });
    }

    let group = if !has_work {
        kids()
    } else {
        match shared.when {
            None => AnimationGroup::all([own(), kids()]),
            Some(When::BeforeChildren) => own().then(kids),
            Some(When::AfterChildren) => kids().then(own),
        }
    };

    if has_work {
        let weak = Rc::downgrade(&state.inner);
        group.on_settled(move |success| {
            if !success {
                // Best-effort policy: an interrupted or failed cycle is
                // not an error, it just never completes.
                log::debug!("animation cycle did not settle cleanly; motioncomplete suppressed");
                return;
            }
            let Some(inner) = weak.upgrade() else {
                return;
            };
            // Listeners may re-enter the state; dispatch unborrowed.
            let dispatch = {
                let inner = inner.borrow();
                // A newer cycle superseded this one.
                if inner.generation != generation {
                    return;
                }
                inner.element.map(|element| (inner.document.clone(), element))
            };
            if let Some((document, element)) = dispatch {
                document.dispatch_event(element, MotionEvent::MotionComplete {
                    target: combined,
                    is_exit,
                });
            }
        });
    }

    group
}
