//! Gesture sessions and features for Momentum.
//!
//! Pointer pan sessions with velocity tracking and scroll compensation,
//! edge-triggered auto-scroll, the drag gesture, and the feature layer
//! that binds host events to animation channels.

pub mod auto_scroll;
pub mod constants;
pub mod drag;
pub mod features;
pub mod pan_session;

pub use auto_scroll::AutoScroller;
pub use drag::{DragConfig, DragConstraints, DragGesture};
pub use features::{
    ChannelFeature, DragFeature, Feature, FeatureBundle, FeatureContext, FeatureError,
    FeatureManager, FeatureMode, FeatureRegistry, FocusFeature, InViewFeature,
};
pub use pan_session::{
    velocity_from_history, PanHandlers, PanInfo, PanSession, PanSessionOptions, PointerSample,
};
