use momentum_core::value::target_map;
use momentum_core::{ElementEvent, ElementEventKind, ElementId, MotionEvent};
use momentum_state::{AnimationType, MotionOptions, MotionState, VariantTarget};
use momentum_testing::prelude::*;

use crate::drag::DragConfig;
use crate::features::{
    FeatureBundle, FeatureContext, FeatureError, FeatureManager, FeatureMode, FeatureRegistry,
};

fn feature_harness() -> (TestRuntime, FeatureContext, ElementId) {
    let runtime = TestRuntime::new();
    let element = runtime.document.create_element(None);
    let state = MotionState::new(runtime.document.clone(), runtime.engine.clone(), None);
    let options = MotionOptions {
        animate: Some(VariantTarget::values(target_map([("opacity", 1.0f32)]))),
        while_hover: Some(VariantTarget::values(target_map([("opacity", 0.5f32)]))),
        while_press: Some(VariantTarget::values(target_map([("scale", 0.9f32)]))),
        while_focus: Some(VariantTarget::values(target_map([("opacity", 0.8f32)]))),
        while_in_view: Some(VariantTarget::values(target_map([("x", 10.0f32)]))),
        ..Default::default()
    };
    state.mount(element, options, false);
    runtime.engine.settle_all(true);
    runtime.engine.clear_calls();
    runtime.document.clear_events();

    let context = FeatureContext {
        document: runtime.document.clone(),
        scheduler: runtime.scheduler.clone(),
        engine: runtime.engine.clone(),
        state,
        element,
    };
    (runtime, context, element)
}

fn emit(runtime: &TestRuntime, element: ElementId, kind: ElementEventKind) {
    runtime.document.emit_element_event(
        element,
        ElementEvent {
            kind,
            pointer: None,
        },
    );
}

#[test]
fn hover_feature_toggles_the_hover_channel() {
    let (runtime, context, element) = feature_harness();
    let state = context.state.clone();
    let mut manager = FeatureManager::new(
        context,
        &FeatureBundle {
            hover: true,
            ..Default::default()
        },
    );
    manager.mount_all();

    emit(&runtime, element, ElementEventKind::PointerEnter);
    assert!(state.is_active(AnimationType::WhileHover));
    let calls = runtime.engine.calls_for(element, "opacity");
    assert_eq!(calls.last().unwrap().target, 0.5f32.into());

    emit(&runtime, element, ElementEventKind::PointerLeave);
    assert!(!state.is_active(AnimationType::WhileHover));
    let calls = runtime.engine.calls_for(element, "opacity");
    assert_eq!(calls.last().unwrap().target, 1.0f32.into());
}

#[test]
fn press_feature_toggles_the_press_channel() {
    let (runtime, context, element) = feature_harness();
    let state = context.state.clone();
    let mut manager = FeatureManager::new(
        context,
        &FeatureBundle {
            press: true,
            ..Default::default()
        },
    );
    manager.mount_all();

    emit(&runtime, element, ElementEventKind::PointerDown);
    assert!(state.is_active(AnimationType::WhilePress));

    emit(&runtime, element, ElementEventKind::PointerUp);
    assert!(!state.is_active(AnimationType::WhilePress));
}

#[test]
fn focus_activates_only_when_focus_is_visible() {
    let (runtime, context, element) = feature_harness();
    let state = context.state.clone();
    let mut manager = FeatureManager::new(
        context,
        &FeatureBundle {
            focus: true,
            ..Default::default()
        },
    );
    manager.mount_all();

    // Pointer-driven focus is not focus-visible; no outline, no channel.
    runtime.document.set_focus_visible(element, Some(false));
    emit(&runtime, element, ElementEventKind::FocusGained);
    assert!(!state.is_active(AnimationType::WhileFocus));

    runtime.document.set_focus_visible(element, Some(true));
    emit(&runtime, element, ElementEventKind::FocusGained);
    assert!(state.is_active(AnimationType::WhileFocus));

    emit(&runtime, element, ElementEventKind::FocusLost);
    assert!(!state.is_active(AnimationType::WhileFocus));
}

#[test]
fn focus_fails_open_when_the_host_cannot_tell() {
    let (runtime, context, element) = feature_harness();
    let state = context.state.clone();
    let mut manager = FeatureManager::new(
        context,
        &FeatureBundle {
            focus: true,
            ..Default::default()
        },
    );
    manager.mount_all();

    runtime.document.set_focus_visible(element, None);
    emit(&runtime, element, ElementEventKind::FocusGained);
    assert!(state.is_active(AnimationType::WhileFocus));
}

#[test]
fn in_view_feature_redispatches_view_events() {
    let (runtime, context, element) = feature_harness();
    let state = context.state.clone();
    let mut manager = FeatureManager::new(
        context,
        &FeatureBundle {
            in_view: true,
            ..Default::default()
        },
    );
    manager.mount_all();

    emit(&runtime, element, ElementEventKind::ViewEnter);
    assert!(state.is_active(AnimationType::WhileInView));
    let events = runtime.document.events_for(element);
    assert!(events.contains(&MotionEvent::ViewEnter));

    emit(&runtime, element, ElementEventKind::ViewLeave);
    assert!(!state.is_active(AnimationType::WhileInView));
    let events = runtime.document.events_for(element);
    assert!(events.contains(&MotionEvent::ViewLeave));
}

#[test]
fn strict_registry_errors_without_a_bundle() {
    let (_runtime, context, _element) = feature_harness();
    let registry = FeatureRegistry::new(FeatureMode::Strict);
    let result = FeatureManager::from_registry(&registry, context);
    assert!(matches!(result, Err(FeatureError::BundleMissing)));
}

#[test]
fn lazy_registry_mounts_nothing_until_the_bundle_arrives() {
    let (_runtime, context, _element) = feature_harness();
    let registry = FeatureRegistry::new(FeatureMode::Lazy);

    let manager = FeatureManager::from_registry(&registry, context.clone())
        .expect("lazy mode tolerates a missing bundle");
    assert!(manager.is_empty());

    registry.provide(FeatureBundle {
        hover: true,
        press: true,
        ..Default::default()
    });
    let manager = FeatureManager::from_registry(&registry, context).unwrap();
    assert_eq!(manager.len(), 2);
}

#[test]
fn bundle_is_provided_exactly_once() {
    let registry = FeatureRegistry::new(FeatureMode::Lazy);
    registry.provide(FeatureBundle {
        hover: true,
        ..Default::default()
    });
    // The second provide is ignored.
    registry.provide(FeatureBundle {
        press: true,
        ..Default::default()
    });

    let bundle = registry.bundle().unwrap().unwrap();
    assert!(bundle.hover);
    assert!(!bundle.press);
}

#[test]
fn manager_builds_one_feature_per_enabled_flag() {
    let (_runtime, context, _element) = feature_harness();
    let manager = FeatureManager::new(
        context,
        &FeatureBundle {
            hover: true,
            press: true,
            focus: true,
            in_view: true,
            drag: Some(DragConfig::default()),
        },
    );
    assert_eq!(manager.len(), 5);
}

#[test]
fn unmount_all_removes_every_listener() {
    let (runtime, context, _element) = feature_harness();
    let mut manager = FeatureManager::new(
        context,
        &FeatureBundle {
            hover: true,
            press: true,
            focus: true,
            in_view: true,
            drag: Some(DragConfig::default()),
        },
    );
    manager.mount_all();
    assert_eq!(runtime.document.listener_count(), 9);

    manager.unmount_all();
    assert_eq!(runtime.document.listener_count(), 0);
}
