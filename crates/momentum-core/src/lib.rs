//! Core primitives and collaborator seams for Momentum.
//!
//! Momentum is a declarative motion/gesture state library: consumers
//! declare per-element animation options and the library resolves which
//! properties animate under which priority channel, drives gesture
//! sessions, and delegates interpolation to an external motion engine.
//!
//! This crate holds the pieces every other Momentum crate builds on:
//! geometry, the frame scheduler, the host-document seam, the motion
//! engine seam, property values, and transitions.

pub mod document;
pub mod engine;
pub mod frame;
pub mod geometry;
pub mod transition;
pub mod value;

pub use document::{
    Document, ElementEvent, ElementEventKind, ElementId, ElementListener, ListenerId,
    MotionEvent, Overflow, PointerEvent, PointerEventKind, PointerListener, ScrollListener,
    ScrollTarget,
};
pub use engine::{AnimationGroup, AnimationHandle, MotionEngine};
pub use frame::{FrameCallbackId, FrameCallbackRegistration, FramePhase, FrameScheduler};
pub use geometry::{Axis, Point, Rect};
pub use transition::{Easing, SpringOptions, Transition, TransitionKind, TweenOptions, When};
pub use value::{PropertyValue, TargetMap};
