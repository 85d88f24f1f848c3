//! The animation state machine.
//!
//! Given the active animation channels and each channel's declared
//! target, decides the minimal animation work for one cycle: which
//! properties change, to what value, owned by which channel. A property
//! animates under at most one active channel per pass; keys an earlier
//! channel claims are protected from later ones, and keys no channel
//! defines anymore fall back to the element's base values.

use momentum_core::{PropertyValue, TargetMap, Transition};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::options::MotionOptions;
use crate::targets::{resolve_variant, TargetAndTransition, VariantTarget, Variants};

/// The seven animation priority channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationType {
    Animate,
    WhileInView,
    WhileFocus,
    WhileHover,
    WhilePress,
    WhileDrag,
    Exit,
}

impl AnimationType {
    pub const COUNT: usize = 7;

    pub fn index(self) -> usize {
        match self {
            AnimationType::Animate => 0,
            AnimationType::WhileInView => 1,
            AnimationType::WhileFocus => 2,
            AnimationType::WhileHover => 3,
            AnimationType::WhilePress => 4,
            AnimationType::WhileDrag => 5,
            AnimationType::Exit => 6,
        }
    }
}

/// Channels from highest to lowest priority.
pub const PRIORITY_ORDER: [AnimationType; AnimationType::COUNT] = [
    AnimationType::Animate,
    AnimationType::WhileInView,
    AnimationType::WhileFocus,
    AnimationType::WhileHover,
    AnimationType::WhilePress,
    AnimationType::WhileDrag,
    AnimationType::Exit,
];

/// The order `animate_changes` visits channels in.
///
/// This ordering is part of the observable contract and must never be
/// derived by reversing [`PRIORITY_ORDER`]: `Exit` is visited first
/// and `Animate` last, so `Animate`'s protected set accumulates every
/// key an active overlay already claimed this pass.
pub const RESOLUTION_ORDER: [AnimationType; AnimationType::COUNT] = [
    AnimationType::Exit,
    AnimationType::WhileDrag,
    AnimationType::WhilePress,
    AnimationType::WhileHover,
    AnimationType::WhileFocus,
    AnimationType::WhileInView,
    AnimationType::Animate,
];

/// Bookkeeping for one channel.
#[derive(Debug, Default)]
pub struct TypeState {
    pub is_active: bool,
    /// Keys this channel must not touch this pass because another
    /// channel already owns them, plus this channel's own unchanged
    /// keys. Transient; cleared after every `set_active` cycle.
    pub protected_keys: FxHashSet<String>,
    /// Keys this channel claimed for animation this pass.
    pub needs_animating: FxHashMap<String, bool>,
    pub prev_resolved_values: TargetMap,
    pub prev_target: Option<VariantTarget>,
}

impl TypeState {
    pub fn reset(&mut self) {
        self.is_active = false;
        self.protected_keys.clear();
        self.needs_animating.clear();
        self.prev_resolved_values.clear();
        self.prev_target = None;
    }
}

/// One batch entry handed to the update orchestrator: the values a
/// channel wants animated, with the variant's own transition if any.
/// `channel: None` marks the synthesized removal-fallback batch.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationDefinition {
    pub channel: Option<AnimationType>,
    pub values: TargetMap,
    pub transition: Option<Transition>,
}

#[derive(Debug, Default)]
pub struct ResolutionOutcome {
    pub definitions: Vec<AnimationDefinition>,
}

impl ResolutionOutcome {
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// Inputs for one resolution pass.
pub struct ResolveInput<'a> {
    pub options: &'a MotionOptions,
    /// Variants with parent-chain inheritance already applied.
    pub variants: &'a Variants,
    /// `custom` data with parent-chain inheritance already applied.
    pub custom: Option<&'a PropertyValue>,
    pub base_target: &'a TargetMap,
    pub is_initial_render: bool,
}

#[derive(Debug, Default)]
pub struct AnimationState {
    states: [TypeState; AnimationType::COUNT],
}

impl AnimationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, animation_type: AnimationType) -> &TypeState {
        &self.states[animation_type.index()]
    }

    pub fn state_mut(&mut self, animation_type: AnimationType) -> &mut TypeState {
        &mut self.states[animation_type.index()]
    }

    pub fn is_active(&self, animation_type: AnimationType) -> bool {
        self.state(animation_type).is_active
    }

    pub fn set_active_flag(&mut self, animation_type: AnimationType, is_active: bool) {
        self.state_mut(animation_type).is_active = is_active;
    }

    /// Protection is transient per evaluation cycle.
    pub fn clear_protection(&mut self) {
        for state in &mut self.states {
            state.protected_keys.clear();
        }
    }

    pub fn reset(&mut self) {
        for state in &mut self.states {
            state.reset();
        }
    }

    /// Runs one resolution pass over every channel, lowest priority
    /// first (see [`RESOLUTION_ORDER`]).
    ///
    /// `changed_type` is the channel whose active flag was just
    /// toggled, if any; its new flag value must already be set.
    pub fn animate_changes(
        &mut self,
        input: &ResolveInput<'_>,
        changed_type: Option<AnimationType>,
    ) -> ResolutionOutcome {
        let skip_initial = input.is_initial_render
            && !input.options.animate_on_mount
            && initial_skips_animation(input.options);

        let mut encountered: FxHashSet<String> = FxHashSet::default();
        let mut removed: FxHashSet<String> = FxHashSet::default();
        let mut definitions: Vec<AnimationDefinition> = Vec::new();

        for animation_type in RESOLUTION_ORDER {
            let type_state = &mut self.states[animation_type.index()];
            type_state.needs_animating.clear();
            type_state.protected_keys = encountered.clone();

            let active_delta =
                (changed_type == Some(animation_type)).then_some(type_state.is_active);
            let just_activated = active_delta == Some(true);

            let target = input.options.target_for(animation_type).cloned();

            // Controls handles are opaque and booleans are component
            // toggles; neither is resolved here.
            if matches!(
                target,
                Some(VariantTarget::Controls) | Some(VariantTarget::Bool(_))
            ) {
                type_state.prev_target = target;
                continue;
            }
            if target.is_none() && type_state.prev_target.is_none() && active_delta.is_none() {
                continue;
            }

            let target_changed = match (&type_state.prev_target, &target) {
                (None, None) => false,
                (Some(prev), Some(next)) => prev != next,
                _ => true,
            };

            // Inactive channels contribute no values, so everything they
            // previously resolved becomes a removal candidate.
            let resolved = if type_state.is_active {
                target
                    .as_ref()
                    .and_then(|target| resolve_variant(target, input.variants, input.custom))
                    .unwrap_or_default()
            } else {
                TargetAndTransition::default()
            };

            let mut should_animate = just_activated || (target_changed && type_state.is_active);

            let mut keys: Vec<&String> = type_state.prev_resolved_values.keys().collect();
            for key in resolved.values.keys() {
                if !type_state.prev_resolved_values.contains_key(key) {
                    keys.push(key);
                }
            }
            let keys: Vec<String> = keys.into_iter().cloned().collect();

            let mut claimed: Vec<String> = Vec::new();
            for key in keys {
                if type_state.protected_keys.contains(&key) {
                    continue;
                }
                let next = resolved.values.get(&key);
                let prev = type_state.prev_resolved_values.get(&key);
                match (next, prev) {
                    (Some(next_value), prev_value) if prev_value != Some(next_value) => {
                        // Changed to a defined value.
                        removed.remove(&key);
                        claimed.push(key);
                        should_animate = true;
                    }
                    (None, Some(_)) => {
                        // Dropped by this channel; fallback candidate.
                        removed.insert(key);
                    }
                    (Some(_), _) if removed.contains(&key) => {
                        // Reappeared after an earlier channel dropped it.
                        removed.remove(&key);
                        claimed.push(key);
                        should_animate = true;
                    }
                    (Some(_), _) => {
                        // Unchanged; owned quietly.
                        type_state.protected_keys.insert(key);
                    }
                    (None, None) => {}
                }
            }
            for key in &claimed {
                type_state.needs_animating.insert(key.clone(), true);
            }

            type_state.prev_target = target;
            type_state.prev_resolved_values = resolved.values.clone();
            if type_state.is_active {
                encountered.extend(resolved.values.keys().cloned());
            }

            if should_animate && !skip_initial && !claimed.is_empty() {
                let values: TargetMap = claimed
                    .iter()
                    .filter_map(|key| {
                        resolved
                            .values
                            .get(key)
                            .map(|value| (key.clone(), value.clone()))
                    })
                    .collect();
                definitions.push(AnimationDefinition {
                    channel: Some(animation_type),
                    values,
                    transition: resolved.transition.clone(),
                });
            }
        }

        // Keys still marked removed get a synthesized fallback back to
        // the element's rest value, or an explicit unset if none is
        // known.
        if !removed.is_empty() && !skip_initial {
            let values: TargetMap = removed
                .into_iter()
                .map(|key| {
                    let fallback = input
                        .base_target
                        .get(&key)
                        .cloned()
                        .unwrap_or(PropertyValue::Unset);
                    (key, fallback)
                })
                .collect();
            definitions.push(AnimationDefinition {
                channel: None,
                values,
                transition: None,
            });
        }

        ResolutionOutcome { definitions }
    }
}

/// Whether `initial` suppresses the mount animation: `initial: false`,
/// or `initial` identical to `animate`.
fn initial_skips_animation(options: &MotionOptions) -> bool {
    match (&options.initial, &options.animate) {
        (Some(VariantTarget::Bool(false)), _) => true,
        (Some(initial), Some(animate)) => initial == animate,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use momentum_core::value::target_map;

    fn input<'a>(
        options: &'a MotionOptions,
        base: &'a TargetMap,
        initial_render: bool,
    ) -> ResolveInput<'a> {
        ResolveInput {
            options,
            variants: &options.variants,
            custom: options.custom.as_ref(),
            base_target: base,
            is_initial_render: initial_render,
        }
    }

    #[test]
    fn resolution_order_is_pinned() {
        // Not a reverse of PRIORITY_ORDER by construction; the array
        // is pinned verbatim.
        assert_eq!(
            RESOLUTION_ORDER,
            [
                AnimationType::Exit,
                AnimationType::WhileDrag,
                AnimationType::WhilePress,
                AnimationType::WhileHover,
                AnimationType::WhileFocus,
                AnimationType::WhileInView,
                AnimationType::Animate,
            ]
        );
        assert_eq!(PRIORITY_ORDER[0], AnimationType::Animate);
        assert_eq!(PRIORITY_ORDER[6], AnimationType::Exit);
    }

    #[test]
    fn changed_values_are_claimed_for_animation() {
        let mut machine = AnimationState::new();
        let mut options = MotionOptions {
            animate: Some(VariantTarget::values(target_map([("x", 10.0f32)]))),
            ..Default::default()
        };
        machine.set_active_flag(AnimationType::Animate, true);

        let base = TargetMap::default();
        let outcome = machine.animate_changes(&input(&options, &base, false), None);
        assert_eq!(outcome.definitions.len(), 1);
        assert_eq!(
            outcome.definitions[0].values.get("x"),
            Some(&PropertyValue::Number(10.0))
        );

        // Unchanged on the next pass: no work.
        let outcome = machine.animate_changes(&input(&options, &base, false), None);
        assert!(outcome.is_empty());

        // New value: claimed again.
        options.animate = Some(VariantTarget::values(target_map([("x", 30.0f32)])));
        let outcome = machine.animate_changes(&input(&options, &base, false), None);
        assert_eq!(outcome.definitions.len(), 1);
    }

    #[test]
    fn active_overlay_protects_keys_from_animate() {
        let mut machine = AnimationState::new();
        let options = MotionOptions {
            animate: Some(VariantTarget::values(target_map([
                ("x", 0.0f32),
                ("opacity", 1.0f32),
            ]))),
            while_hover: Some(VariantTarget::values(target_map([("x", 50.0f32)]))),
            ..Default::default()
        };
        machine.set_active_flag(AnimationType::Animate, true);
        let base = TargetMap::default();
        machine.animate_changes(&input(&options, &base, false), None);

        // Hover activates and claims `x`.
        machine.set_active_flag(AnimationType::WhileHover, true);
        let outcome = machine.animate_changes(
            &input(&options, &base, false),
            Some(AnimationType::WhileHover),
        );
        assert_eq!(outcome.definitions.len(), 1);
        assert_eq!(outcome.definitions[0].channel, Some(AnimationType::WhileHover));
        assert!(outcome.definitions[0].values.contains_key("x"));

        // `x` is claimed by hover only; Animate's pass saw it protected.
        let hover = machine.state(AnimationType::WhileHover);
        let animate = machine.state(AnimationType::Animate);
        assert!(hover.needs_animating.get("x").copied().unwrap_or(false));
        assert!(!animate.needs_animating.get("x").copied().unwrap_or(false));
        assert!(animate.protected_keys.contains("x"));
    }

    #[test]
    fn claims_are_exclusive_across_active_channels() {
        let mut machine = AnimationState::new();
        let options = MotionOptions {
            animate: Some(VariantTarget::values(target_map([("x", 0.0f32)]))),
            while_hover: Some(VariantTarget::values(target_map([("x", 50.0f32)]))),
            while_press: Some(VariantTarget::values(target_map([("x", 80.0f32)]))),
            ..Default::default()
        };
        machine.set_active_flag(AnimationType::Animate, true);
        machine.set_active_flag(AnimationType::WhileHover, true);
        machine.set_active_flag(AnimationType::WhilePress, true);
        let base = TargetMap::default();
        machine.animate_changes(&input(&options, &base, false), None);

        let claimants: Vec<AnimationType> = PRIORITY_ORDER
            .into_iter()
            .filter(|ty| {
                machine
                    .state(*ty)
                    .needs_animating
                    .get("x")
                    .copied()
                    .unwrap_or(false)
            })
            .collect();
        // Press is visited before hover and animate, so it owns `x`.
        assert_eq!(claimants, vec![AnimationType::WhilePress]);
    }

    #[test]
    fn deactivation_falls_back_to_base_value() {
        let mut machine = AnimationState::new();
        let options = MotionOptions {
            while_hover: Some(VariantTarget::values(target_map([("x", 20.0f32)]))),
            ..Default::default()
        };
        let base = target_map([("x", 5.0f32)]);

        machine.set_active_flag(AnimationType::WhileHover, true);
        machine.animate_changes(&input(&options, &base, false), Some(AnimationType::WhileHover));

        machine.set_active_flag(AnimationType::WhileHover, false);
        let outcome = machine.animate_changes(
            &input(&options, &base, false),
            Some(AnimationType::WhileHover),
        );

        let fallback = outcome
            .definitions
            .iter()
            .find(|definition| definition.channel.is_none())
            .expect("fallback definition");
        assert_eq!(fallback.values.get("x"), Some(&PropertyValue::Number(5.0)));
    }

    #[test]
    fn deactivation_without_base_value_unsets() {
        let mut machine = AnimationState::new();
        let options = MotionOptions {
            while_hover: Some(VariantTarget::values(target_map([("scale", 1.2f32)]))),
            ..Default::default()
        };
        let base = TargetMap::default();

        machine.set_active_flag(AnimationType::WhileHover, true);
        machine.animate_changes(&input(&options, &base, false), Some(AnimationType::WhileHover));
        machine.set_active_flag(AnimationType::WhileHover, false);
        let outcome = machine.animate_changes(
            &input(&options, &base, false),
            Some(AnimationType::WhileHover),
        );

        let fallback = outcome
            .definitions
            .iter()
            .find(|definition| definition.channel.is_none())
            .unwrap();
        assert_eq!(fallback.values.get("scale"), Some(&PropertyValue::Unset));
    }

    #[test]
    fn reclaim_beats_removal_fallback() {
        // Exit drops `opacity` on deactivation, but Animate still
        // defines it: Animate reclaims instead of a fallback firing.
        let mut machine = AnimationState::new();
        let options = MotionOptions {
            animate: Some(VariantTarget::values(target_map([("opacity", 1.0f32)]))),
            exit: Some(VariantTarget::values(target_map([("opacity", 0.0f32)]))),
            ..Default::default()
        };
        let base = TargetMap::default();
        machine.set_active_flag(AnimationType::Animate, true);
        machine.animate_changes(&input(&options, &base, false), None);

        machine.set_active_flag(AnimationType::Exit, true);
        machine.animate_changes(&input(&options, &base, false), Some(AnimationType::Exit));

        machine.set_active_flag(AnimationType::Exit, false);
        let outcome =
            machine.animate_changes(&input(&options, &base, false), Some(AnimationType::Exit));

        assert!(outcome
            .definitions
            .iter()
            .all(|definition| definition.channel.is_some()));
        let animate = outcome
            .definitions
            .iter()
            .find(|definition| definition.channel == Some(AnimationType::Animate))
            .expect("animate reclaims the key");
        assert_eq!(
            animate.values.get("opacity"),
            Some(&PropertyValue::Number(1.0))
        );
    }

    #[test]
    fn initial_false_skips_first_render() {
        let mut machine = AnimationState::new();
        let options = MotionOptions {
            initial: Some(VariantTarget::Bool(false)),
            animate: Some(VariantTarget::values(target_map([("x", 10.0f32)]))),
            ..Default::default()
        };
        machine.set_active_flag(AnimationType::Animate, true);
        let base = TargetMap::default();

        let outcome = machine.animate_changes(&input(&options, &base, true), None);
        assert!(outcome.is_empty());

        // Later renders animate as usual once values change.
        let options = MotionOptions {
            animate: Some(VariantTarget::values(target_map([("x", 25.0f32)]))),
            ..options
        };
        let outcome = machine.animate_changes(&input(&options, &base, false), None);
        assert_eq!(outcome.definitions.len(), 1);
    }

    #[test]
    fn animate_on_mount_overrides_initial_skip() {
        let mut machine = AnimationState::new();
        let options = MotionOptions {
            initial: Some(VariantTarget::Bool(false)),
            animate: Some(VariantTarget::values(target_map([("x", 10.0f32)]))),
            animate_on_mount: true,
            ..Default::default()
        };
        machine.set_active_flag(AnimationType::Animate, true);
        let base = TargetMap::default();

        let outcome = machine.animate_changes(&input(&options, &base, true), None);
        assert_eq!(outcome.definitions.len(), 1);
    }

    #[test]
    fn boolean_and_controls_targets_are_skipped() {
        let mut machine = AnimationState::new();
        let options = MotionOptions {
            animate: Some(VariantTarget::Controls),
            while_hover: Some(VariantTarget::Bool(true)),
            ..Default::default()
        };
        machine.set_active_flag(AnimationType::Animate, true);
        machine.set_active_flag(AnimationType::WhileHover, true);
        let base = TargetMap::default();

        let outcome = machine.animate_changes(&input(&options, &base, false), None);
        assert!(outcome.is_empty());
    }
}
