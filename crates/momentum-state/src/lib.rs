//! Animation state resolution and per-element motion state.
//!
//! The heart of Momentum: seven prioritized animation channels per
//! element, a state machine deciding which properties each channel
//! claims or releases when options or flags change, and the
//! orchestration that turns those decisions into engine dispatches with
//! parent/child staggering.

pub mod animate_updates;
pub mod animation_state;
pub mod motion_state;
pub mod options;
pub mod targets;

pub use animate_updates::AnimateUpdates;
pub use animation_state::{
    AnimationDefinition, AnimationState, AnimationType, ResolutionOutcome, ResolveInput,
    PRIORITY_ORDER, RESOLUTION_ORDER,
};
pub use motion_state::{MotionState, MountedStates};
pub use options::MotionOptions;
pub use targets::{
    resolve_variant, TargetAndTransition, TargetResolver, VariantTarget, Variants,
};
