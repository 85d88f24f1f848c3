//! Gesture features and their lifecycle.
//!
//! Each feature binds host events to one animation channel: hover,
//! press, focus-visible, in-view and drag. Features are a closed set of
//! variants behind one lifecycle surface; a [`FeatureManager`] holds an
//! element's features and dispatches mount/update/unmount uniformly.
//!
//! Which features an application uses is declared up front in a
//! [`FeatureBundle`] handed to the [`FeatureRegistry`]. In strict mode
//! a missing bundle is a configuration error surfaced to the caller;
//! nothing else in this crate fails loudly.

use std::cell::RefCell;
use std::rc::Rc;

use momentum_core::{
    Document, ElementEventKind, ElementId, FrameScheduler, ListenerId, MotionEngine, MotionEvent,
};
use momentum_state::{AnimationType, MotionState};
use thiserror::Error;

use crate::drag::{DragConfig, DragGesture};

#[derive(Debug, Error)]
pub enum FeatureError {
    /// Strict mode requires the bundle before any feature mounts.
    #[error("feature bundle was not provided before mounting")]
    BundleMissing,
}

/// Which features an application enables, declared at initialization.
#[derive(Clone, Default)]
pub struct FeatureBundle {
    pub hover: bool,
    pub press: bool,
    pub focus: bool,
    pub in_view: bool,
    pub drag: Option<DragConfig>,
}

/// How the registry treats a missing bundle: strict mode errors, lazy
/// mode mounts nothing until the bundle arrives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeatureMode {
    Strict,
    Lazy,
}

/// Holds the application-wide feature bundle. The bundle is provided
/// exactly once; later provides are ignored with a warning.
pub struct FeatureRegistry {
    mode: FeatureMode,
    bundle: RefCell<Option<FeatureBundle>>,
}

impl FeatureRegistry {
    pub fn new(mode: FeatureMode) -> Self {
        Self {
            mode,
            bundle: RefCell::new(None),
        }
    }

    pub fn provide(&self, bundle: FeatureBundle) {
        let mut slot = self.bundle.borrow_mut();
        if slot.is_some() {
            log::warn!("feature bundle already provided; ignoring the new one");
            return;
        }
        *slot = Some(bundle);
    }

    /// The bundle to mount with. `Ok(None)` means "not yet" in lazy
    /// mode; strict mode turns that into an error.
    pub fn bundle(&self) -> Result<Option<FeatureBundle>, FeatureError> {
        match (self.bundle.borrow().clone(), self.mode) {
            (Some(bundle), _) => Ok(Some(bundle)),
            (None, FeatureMode::Strict) => Err(FeatureError::BundleMissing),
            (None, FeatureMode::Lazy) => Ok(None),
        }
    }
}

/// Everything a feature needs to bind itself to an element.
#[derive(Clone)]
pub struct FeatureContext {
    pub document: Rc<dyn Document>,
    pub scheduler: FrameScheduler,
    pub engine: Rc<dyn MotionEngine>,
    pub state: MotionState,
    pub element: ElementId,
}

/// The closed set of gesture features.
pub enum Feature {
    Hover(ChannelFeature),
    Press(ChannelFeature),
    Focus(FocusFeature),
    InView(InViewFeature),
    Drag(DragFeature),
}

impl Feature {
    pub fn mount(&mut self, context: &FeatureContext) {
        match self {
            Feature::Hover(feature) | Feature::Press(feature) => feature.mount(context),
            Feature::Focus(feature) => feature.mount(context),
            Feature::InView(feature) => feature.mount(context),
            Feature::Drag(feature) => feature.mount(context),
        }
    }

    pub fn update(&mut self, context: &FeatureContext) {
        if let Feature::Drag(feature) = self {
            feature.update(context);
        }
    }

    pub fn unmount(&mut self, context: &FeatureContext) {
        match self {
            Feature::Hover(feature) | Feature::Press(feature) => feature.unmount(context),
            Feature::Focus(feature) => feature.unmount(context),
            Feature::InView(feature) => feature.unmount(context),
            Feature::Drag(feature) => feature.unmount(context),
        }
    }
}

/// Binds an enter/leave event pair to one animation channel; covers
/// hover and press.
pub struct ChannelFeature {
    channel: AnimationType,
    on_kind: ElementEventKind,
    off_kind: ElementEventKind,
    listeners: Vec<ListenerId>,
}

impl ChannelFeature {
    pub fn hover() -> Feature {
        Feature::Hover(Self {
            channel: AnimationType::WhileHover,
            on_kind: ElementEventKind::PointerEnter,
            off_kind: ElementEventKind::PointerLeave,
            listeners: Vec::new(),
        })
    }

    pub fn press() -> Feature {
        Feature::Press(Self {
            channel: AnimationType::WhilePress,
            on_kind: ElementEventKind::PointerDown,
            off_kind: ElementEventKind::PointerUp,
            listeners: Vec::new(),
        })
    }

    fn mount(&mut self, context: &FeatureContext) {
        let channel = self.channel;
        for (kind, active) in [(self.on_kind, true), (self.off_kind, false)] {
            let state = context.state.clone();
            let id = context.document.add_element_listener(
                context.element,
                kind,
                Rc::new(move |_| {
                    state.set_active(channel, active);
                }),
            );
            self.listeners.push(id);
        }
    }

    fn unmount(&mut self, context: &FeatureContext) {
        for id in self.listeners.drain(..) {
            context.document.remove_listener(id);
        }
    }
}

/// Focus channel gated on focus-visible. A host that cannot answer the
/// focus-visible query fails open, matching default outline behaviour.
#[derive(Default)]
pub struct FocusFeature {
    listeners: Vec<ListenerId>,
}

impl FocusFeature {
    pub fn new() -> Feature {
        Feature::Focus(Self::default())
    }

    fn mount(&mut self, context: &FeatureContext) {
        let gained = {
            let state = context.state.clone();
            let document = context.document.clone();
            let element = context.element;
            context.document.add_element_listener(
                element,
                ElementEventKind::FocusGained,
                Rc::new(move |_| {
                    let visible = document.is_focus_visible(element).unwrap_or(true);
                    if visible {
                        state.set_active(AnimationType::WhileFocus, true);
                    }
                }),
            )
        };
        let lost = {
            let state = context.state.clone();
            context.document.add_element_listener(
                context.element,
                ElementEventKind::FocusLost,
                Rc::new(move |_| {
                    state.set_active(AnimationType::WhileFocus, false);
                }),
            )
        };
        self.listeners.extend([gained, lost]);
    }

    fn unmount(&mut self, context: &FeatureContext) {
        for id in self.listeners.drain(..) {
            context.document.remove_listener(id);
        }
    }
}

/// In-view channel; additionally re-dispatches viewenter/viewleave as
/// the consumer-facing contract.
#[derive(Default)]
pub struct InViewFeature {
    listeners: Vec<ListenerId>,
}

impl InViewFeature {
    pub fn new() -> Feature {
        Feature::InView(Self::default())
    }

    fn mount(&mut self, context: &FeatureContext) {
        for (kind, active, event) in [
            (ElementEventKind::ViewEnter, true, MotionEvent::ViewEnter),
            (ElementEventKind::ViewLeave, false, MotionEvent::ViewLeave),
        ] {
            let state = context.state.clone();
            let document = context.document.clone();
            let element = context.element;
            let id = context.document.add_element_listener(
                element,
                kind,
                Rc::new(move |_| {
                    state.set_active(AnimationType::WhileInView, active);
                    document.dispatch_event(element, event.clone());
                }),
            );
            self.listeners.push(id);
        }
    }

    fn unmount(&mut self, context: &FeatureContext) {
        for id in self.listeners.drain(..) {
            context.document.remove_listener(id);
        }
    }
}

/// Drag channel; wraps [`DragGesture`].
pub struct DragFeature {
    config: DragConfig,
    gesture: Option<DragGesture>,
}

impl DragFeature {
    pub fn new(config: DragConfig) -> Feature {
        Feature::Drag(Self {
            config,
            gesture: None,
        })
    }

    fn mount(&mut self, context: &FeatureContext) {
        let gesture = DragGesture::new(
            context.document.clone(),
            context.scheduler.clone(),
            context.engine.clone(),
            context.state.clone(),
            context.element,
            self.config.clone(),
        );
        gesture.mount();
        self.gesture = Some(gesture);
    }

    fn update(&mut self, context: &FeatureContext) {
        let _ = context;
        if let Some(gesture) = &self.gesture {
            gesture.update(self.config.clone());
        }
    }

    fn unmount(&mut self, context: &FeatureContext) {
        let _ = context;
        if let Some(gesture) = self.gesture.take() {
            gesture.unmount();
        }
    }
}

/// An element's feature set, built from the bundle.
pub struct FeatureManager {
    context: FeatureContext,
    features: Vec<Feature>,
}

impl FeatureManager {
    /// Builds the manager from the registry's bundle. Strict mode with
    /// no bundle is the one loud failure in this crate.
    pub fn from_registry(
        registry: &FeatureRegistry,
        context: FeatureContext,
    ) -> Result<Self, FeatureError> {
        let bundle = registry.bundle()?.unwrap_or_default();
        Ok(Self::new(context, &bundle))
    }

    pub fn new(context: FeatureContext, bundle: &FeatureBundle) -> Self {
        let mut features = Vec::new();
        if bundle.hover {
            features.push(ChannelFeature::hover());
        }
        if bundle.press {
            features.push(ChannelFeature::press());
        }
        if bundle.focus {
            features.push(FocusFeature::new());
        }
        if bundle.in_view {
            features.push(InViewFeature::new());
        }
        if let Some(drag) = &bundle.drag {
            features.push(DragFeature::new(drag.clone()));
        }
        Self { context, features }
    }

    pub fn mount_all(&mut self) {
        for feature in &mut self.features {
            feature.mount(&self.context);
        }
    }

    pub fn update_all(&mut self) {
        for feature in &mut self.features {
            feature.update(&self.context);
        }
    }

    pub fn unmount_all(&mut self) {
        for feature in &mut self.features {
            feature.unmount(&self.context);
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/feature_tests.rs"]
mod feature_tests;
