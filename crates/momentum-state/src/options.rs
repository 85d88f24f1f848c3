//! Per-element animation options, the declarative input surface.

use momentum_core::{PropertyValue, Transition};

use crate::animation_state::AnimationType;
use crate::targets::{VariantTarget, Variants};

/// Everything a consumer declares for one animatable element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MotionOptions {
    /// Starting values. `Bool(false)` disables the mount animation and
    /// renders `animate` values directly.
    pub initial: Option<VariantTarget>,
    pub animate: Option<VariantTarget>,
    pub while_in_view: Option<VariantTarget>,
    pub while_focus: Option<VariantTarget>,
    pub while_hover: Option<VariantTarget>,
    pub while_press: Option<VariantTarget>,
    pub while_drag: Option<VariantTarget>,
    pub exit: Option<VariantTarget>,
    pub variants: Variants,
    pub transition: Option<Transition>,
    /// Arbitrary data handed to resolver-function variants.
    pub custom: Option<PropertyValue>,
    /// Forces the mount animation even when `initial` would skip it.
    pub animate_on_mount: bool,
}

impl MotionOptions {
    pub fn target_for(&self, animation_type: AnimationType) -> Option<&VariantTarget> {
        match animation_type {
            AnimationType::Animate => self.animate.as_ref(),
            AnimationType::WhileInView => self.while_in_view.as_ref(),
            AnimationType::WhileFocus => self.while_focus.as_ref(),
            AnimationType::WhileHover => self.while_hover.as_ref(),
            AnimationType::WhilePress => self.while_press.as_ref(),
            AnimationType::WhileDrag => self.while_drag.as_ref(),
            AnimationType::Exit => self.exit.as_ref(),
        }
    }
}
