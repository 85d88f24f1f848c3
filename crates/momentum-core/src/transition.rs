//! Transition descriptions handed to the external motion engine.
//!
//! Momentum never interpolates values itself; a [`Transition`] is plain
//! data describing how the engine should animate, plus the orchestration
//! fields (`when`, stagger) the update orchestrator consumes before
//! dispatching.

use rustc_hash::FxHashMap;

/// Easing curves understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenOptions {
    /// Duration in seconds.
    pub duration: f32,
    pub easing: Easing,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringOptions {
    pub stiffness: f32,
    pub damping: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionKind {
    Tween(TweenOptions),
    Spring(SpringOptions),
}

/// Ordering between an element's own animations and its children's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
    BeforeChildren,
    AfterChildren,
}

/// How a set of properties should animate. All times are in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub kind: TransitionKind,
    /// Delay before the animation starts.
    pub delay: f32,
    pub when: Option<When>,
    /// Per-child delay offset; children animate in a wave.
    pub stagger_children: f32,
    /// `1` staggers first-to-last, `-1` last-to-first.
    pub stagger_direction: i8,
    /// Base delay applied to every child before stagger.
    pub delay_children: f32,
    /// Per-property overrides; an entry here beats the shared settings
    /// for that property.
    pub overrides: FxHashMap<String, Transition>,
}

impl Transition {
    pub fn tween(duration: f32, easing: Easing) -> Self {
        Self::with_kind(TransitionKind::Tween(TweenOptions { duration, easing }))
    }

    pub fn spring(stiffness: f32, damping: f32) -> Self {
        Self::with_kind(TransitionKind::Spring(SpringOptions { stiffness, damping }))
    }

    fn with_kind(kind: TransitionKind) -> Self {
        Self {
            kind,
            delay: 0.0,
            when: None,
            stagger_children: 0.0,
            stagger_direction: 1,
            delay_children: 0.0,
            overrides: FxHashMap::default(),
        }
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_when(mut self, when: When) -> Self {
        self.when = Some(when);
        self
    }

    pub fn with_stagger(mut self, stagger_children: f32, stagger_direction: i8) -> Self {
        self.stagger_children = stagger_children;
        self.stagger_direction = stagger_direction;
        self
    }

    pub fn with_delay_children(mut self, delay_children: f32) -> Self {
        self.delay_children = delay_children;
        self
    }

    pub fn with_override(mut self, key: impl Into<String>, transition: Transition) -> Self {
        self.overrides.insert(key.into(), transition);
        self
    }

    /// Resolves the transition for a single property: a per-key override
    /// wins, otherwise the shared settings apply.
    pub fn for_key(&self, key: &str) -> Transition {
        self.overrides.get(key).cloned().unwrap_or_else(|| {
            let mut shared = self.clone();
            shared.overrides = FxHashMap::default();
            shared
        })
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::tween(0.3, Easing::EaseInOut)
    }
}
