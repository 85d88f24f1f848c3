//! Animatable property values.

use rustc_hash::FxHashMap;

/// A single animatable property value.
///
/// Numbers cover transforms and dimensioned properties; text covers
/// keyword values the engine resolves itself (`"block"`, colors, etc).
/// `Unset` asks the engine to clear the property back to its stylesheet
/// value; it is what removed keys fall back to when no base value is
/// known.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Number(f32),
    Text(String),
    Unset,
}

impl PropertyValue {
    pub fn number(value: f32) -> Self {
        PropertyValue::Number(value)
    }

    pub fn text(value: impl Into<String>) -> Self {
        PropertyValue::Text(value.into())
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            PropertyValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Number(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_owned())
    }
}

/// Property name to value map, e.g. `{"x": 10.0, "opacity": 1.0}`.
pub type TargetMap = FxHashMap<String, PropertyValue>;

/// Builds a [`TargetMap`] from `(key, value)` pairs.
pub fn target_map<V: Into<PropertyValue>>(
    pairs: impl IntoIterator<Item = (&'static str, V)>,
) -> TargetMap {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value.into()))
        .collect()
}
