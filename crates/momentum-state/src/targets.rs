//! Variant targets and their resolution into flat property maps.

use std::fmt;
use std::rc::Rc;

use momentum_core::{PropertyValue, TargetMap, Transition};
use rustc_hash::FxHashMap;

/// A resolved set of target values plus an optional transition that
/// came with the variant definition.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TargetAndTransition {
    pub values: TargetMap,
    pub transition: Option<Transition>,
}

impl TargetAndTransition {
    pub fn new(values: TargetMap) -> Self {
        Self {
            values,
            transition: None,
        }
    }

    pub fn with_transition(mut self, transition: Transition) -> Self {
        self.transition = Some(transition);
        self
    }
}

/// Named, reusable target definitions referenced by label.
pub type Variants = FxHashMap<String, TargetAndTransition>;

/// Function variant: receives the element's `custom` data and produces
/// a target.
pub type TargetResolver = Rc<dyn Fn(Option<&PropertyValue>) -> TargetAndTransition>;

/// What a consumer may declare for one animation channel.
#[derive(Clone)]
pub enum VariantTarget {
    /// Booleans are declarative toggles handled by the component layer;
    /// the state machine skips them.
    Bool(bool),
    /// A variant label looked up in the element's `variants`.
    Label(String),
    /// Several labels merged left to right.
    Labels(Vec<String>),
    /// A direct target object.
    Values(TargetAndTransition),
    /// A function of the element's `custom` data.
    Resolver(TargetResolver),
    /// An external animation-controls handle; opaque, never resolved
    /// here.
    Controls,
}

impl VariantTarget {
    pub fn label(label: impl Into<String>) -> Self {
        VariantTarget::Label(label.into())
    }

    pub fn labels(labels: impl IntoIterator<Item = &'static str>) -> Self {
        VariantTarget::Labels(labels.into_iter().map(str::to_owned).collect())
    }

    pub fn values(values: TargetMap) -> Self {
        VariantTarget::Values(TargetAndTransition::new(values))
    }
}

impl fmt::Debug for VariantTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariantTarget::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            VariantTarget::Label(label) => f.debug_tuple("Label").field(label).finish(),
            VariantTarget::Labels(labels) => f.debug_tuple("Labels").field(labels).finish(),
            VariantTarget::Values(values) => f.debug_tuple("Values").field(values).finish(),
            VariantTarget::Resolver(_) => f.write_str("Resolver(..)"),
            VariantTarget::Controls => f.write_str("Controls"),
        }
    }
}

impl PartialEq for VariantTarget {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (VariantTarget::Bool(a), VariantTarget::Bool(b)) => a == b,
            (VariantTarget::Label(a), VariantTarget::Label(b)) => a == b,
            (VariantTarget::Labels(a), VariantTarget::Labels(b)) => a == b,
            (VariantTarget::Values(a), VariantTarget::Values(b)) => a == b,
            // Function identity; a new closure counts as a new target.
            (VariantTarget::Resolver(a), VariantTarget::Resolver(b)) => Rc::ptr_eq(a, b),
            (VariantTarget::Controls, VariantTarget::Controls) => true,
            _ => false,
        }
    }
}

/// Resolves a declared target into a flat property map.
///
/// Returns `None` for booleans and controls handles, which the state
/// machine skips. Label lists merge left to right: later labels win on
/// conflicting keys and the last transition present wins.
pub fn resolve_variant(
    target: &VariantTarget,
    variants: &Variants,
    custom: Option<&PropertyValue>,
) -> Option<TargetAndTransition> {
    match target {
        VariantTarget::Bool(_) | VariantTarget::Controls => None,
        VariantTarget::Label(label) => variants.get(label).cloned(),
        VariantTarget::Labels(labels) => {
            let mut merged = TargetAndTransition::default();
            for label in labels {
                if let Some(variant) = variants.get(label) {
                    merged
                        .values
                        .extend(variant.values.iter().map(|(k, v)| (k.clone(), v.clone())));
                    if variant.transition.is_some() {
                        merged.transition = variant.transition.clone();
                    }
                } else {
                    log::warn!("unknown variant label `{label}`");
                }
            }
            Some(merged)
        }
        VariantTarget::Values(values) => Some(values.clone()),
        VariantTarget::Resolver(resolver) => Some(resolver(custom)),
    }
}
